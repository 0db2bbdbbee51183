use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use textwire::endpoint::{Dispatch, EndpointError, Messenger, MessengerConfig};
use textwire::frame::{fragment_cost, PacketConfig, PacketEncoder, TokenMode};
use textwire::serial::{
    ArraySerializer, ByteBuffer, Float64, Int32, MapSerializer, ObjectSerializer,
    OptionalSerializer, SetSerializer, Str, UInt8, Unit, VarInt64,
};
use textwire::transport::{Delivery, LoopbackTransport, NullTransport};

fn config_with_budget(budget: usize) -> MessengerConfig {
    MessengerConfig {
        packet: PacketConfig { budget },
        ..MessengerConfig::default()
    }
}

fn collector<V: 'static>() -> (
    Rc<RefCell<Vec<V>>>,
    impl FnMut(V) -> Result<(), textwire::endpoint::HandlerError>,
) {
    let store = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&store);
    (store, move |value| {
        sink.borrow_mut().push(value);
        Ok(())
    })
}

#[test]
fn five_ints_in_one_fragment_sum_to_fifteen() {
    let wire = LoopbackTransport::new();
    let mut sender = Messenger::new(wire.clone());
    let mut receiver = Messenger::new(NullTransport);
    let (got, sink) = collector::<Vec<i32>>();
    receiver.listen("numbers", ArraySerializer::new(Int32), sink);

    let receipt = sender
        .send("numbers", &ArraySerializer::new(Int32), &vec![1, 2, 3, 4, 5])
        .unwrap();
    assert_eq!(receipt.fragments, 1);

    for delivery in wire.drain() {
        receiver.on_delivery(&delivery).unwrap();
    }
    let sum: i32 = got.borrow().iter().flatten().sum();
    assert_eq!(sum, 15);
}

#[test]
fn shuffled_fragments_of_interleaved_messages() {
    let wire = LoopbackTransport::new();
    let mut sender = Messenger::with_config(wire.clone(), config_with_budget(5)).unwrap();
    let mut receiver = Messenger::new(NullTransport);
    let (got, sink) = collector::<String>();
    receiver.listen("log", Str, sink);

    sender.send("log", &Str, &"first line of text".to_string()).unwrap();
    sender.send("log", &Str, &"second".to_string()).unwrap();
    let deliveries = wire.drain();

    // Interleave: odd positions first, then even, in reverse.
    let mut order: Vec<&Delivery> = deliveries.iter().skip(1).step_by(2).collect();
    order.extend(deliveries.iter().step_by(2).rev());
    for delivery in order {
        receiver.on_delivery(delivery).unwrap();
    }

    let mut messages = got.borrow().clone();
    messages.sort();
    assert_eq!(messages, ["first line of text", "second"]);
    assert_eq!(receiver.pending(), 0);
}

#[test]
fn every_fragment_fits_the_budget() {
    let payload: Vec<u8> = (0..=255u8).chain((0..=255u8).rev()).chain([7]).collect();
    for budget in [4, 5, 7, 16, 100] {
        let encoder = PacketEncoder::new(budget).unwrap();
        let mut buf = ByteBuffer::from_bytes(&payload);
        let fragments = encoder.encode(&mut buf);
        assert!(fragments.iter().all(|f| fragment_cost(f) <= budget), "budget {budget}");
        assert_eq!(encoder.decode(&fragments).unwrap().as_written(), payload.as_slice());
    }
}

#[test]
fn rich_object_crosses_the_wire() {
    #[derive(Debug, Clone, PartialEq)]
    struct Inventory {
        owner: String,
        motto: Option<String>,
        items: BTreeMap<String, i64>,
        tags: BTreeSet<String>,
        weight: f64,
        raw: Vec<u8>,
    }

    let schema = || {
        ObjectSerializer::builder()
            .field("owner", Str, |i: &Inventory| &i.owner)
            .field("motto", OptionalSerializer::new(Str), |i: &Inventory| &i.motto)
            .field("items", MapSerializer::btree_map(Str, VarInt64), |i: &Inventory| &i.items)
            .field("tags", SetSerializer::btree_set(Str), |i: &Inventory| &i.tags)
            .field("weight", Float64, |i: &Inventory| &i.weight)
            .field("raw", ArraySerializer::new(UInt8), |i: &Inventory| &i.raw)
            .build(|f| {
                Ok(Inventory {
                    owner: f.take("owner")?,
                    motto: f.take("motto")?,
                    items: f.take("items")?,
                    tags: f.take("tags")?,
                    weight: f.take("weight")?,
                    raw: f.take("raw")?,
                })
            })
    };

    let inventory = Inventory {
        owner: "Zoë 🦀".to_string(),
        motto: None,
        items: BTreeMap::from([("torch".to_string(), 3), ("debt".to_string(), -40)]),
        tags: BTreeSet::from(["heavy".to_string(), "wet".to_string()]),
        weight: 12.5,
        raw: (0..200).collect(),
    };

    let wire = LoopbackTransport::new();
    let mut sender = Messenger::with_config(wire.clone(), config_with_budget(64)).unwrap();
    let mut receiver = Messenger::new(NullTransport);
    let (got, sink) = collector::<Inventory>();
    receiver.listen("inv", schema(), sink);

    let receipt = sender.send("inv", &schema(), &inventory).unwrap();
    assert!(receipt.fragments > 1);
    for delivery in wire.drain().into_iter().rev() {
        receiver.on_delivery(&delivery).unwrap();
    }
    assert_eq!(got.borrow().as_slice(), [inventory]);
}

#[test]
fn conflicting_duplicate_is_reported() {
    let wire = LoopbackTransport::new();
    let mut sender = Messenger::with_config(wire.clone(), config_with_budget(4)).unwrap();
    let mut receiver = Messenger::new(NullTransport);
    sender.send("c", &Str, &"abcdef".to_string()).unwrap();
    let deliveries = wire.drain();

    receiver.on_delivery(&deliveries[0]).unwrap();
    assert_eq!(receiver.on_delivery(&deliveries[0]).unwrap(), Dispatch::Duplicate);

    let forged = Delivery::new(deliveries[0].route.clone(), "FFFF");
    let err = receiver.on_delivery(&forged).unwrap_err();
    assert!(matches!(err, EndpointError::ConflictingFragment { index: 0, .. }));
    assert_eq!(receiver.pending(), 0);
}

#[test]
fn lenient_receiver_ignores_garbage_between_messages() {
    let wire = LoopbackTransport::new();
    let mut sender = Messenger::new(wire.clone());
    let config = MessengerConfig {
        token_mode: TokenMode::Lenient,
        ..MessengerConfig::default()
    };
    let mut receiver = Messenger::with_config(NullTransport, config).unwrap();
    let (got, sink) = collector::<String>();
    receiver.listen("t", Str, sink);

    sender.send("t", &Str, &"ok".to_string()).unwrap();
    assert_eq!(receiver.on_message("(0xZZ):(0x00)", "").unwrap(), Dispatch::Dropped);
    for delivery in wire.drain() {
        receiver.on_delivery(&delivery).unwrap();
    }
    assert_eq!(*got.borrow(), ["ok"]);
}

#[test]
fn pacer_sees_every_unit_kind() {
    use std::sync::{Arc, Mutex};

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let mut buf = ByteBuffer::new().with_pacer(move |unit| {
        if let Ok(mut units) = log.lock() {
            units.push(unit);
        }
    });

    use textwire::serial::Serializer;
    ArraySerializer::new(Str)
        .serialize(&vec!["hi".to_string()], &mut buf)
        .unwrap();
    PacketEncoder::default().encode(&mut buf);

    let units = seen.lock().unwrap();
    for kind in [Unit::Element, Unit::CodeUnit, Unit::VarintByte, Unit::PacketUnit] {
        assert!(units.contains(&kind), "missing {kind:?}");
    }
}

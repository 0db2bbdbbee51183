//! Typed binary serialization and fragmented messaging over text-only channels.
//!
//! textwire moves structured values across a boundary that only accepts
//! short printable strings. Values are serialized to bytes, the bytes are
//! packed into budget-capped text fragments, and each fragment travels with
//! a route naming its endpoint, message and position.
//!
//! # Crate Structure
//!
//! - [`serial`]: ByteBuffer and the composable `Serializer` framework
//! - [`transport`]: the host delivery seam and in-memory transports
//! - [`frame`]: packetizer, hex tokens, fragment headers and routes
//! - [`endpoint`]: subscriptions, reassembly and the `Messenger`
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use textwire::endpoint::Messenger;
//! use textwire::serial::{ArraySerializer, Int32};
//! use textwire::transport::{LoopbackTransport, NullTransport};
//!
//! let wire = LoopbackTransport::new();
//! let mut sender = Messenger::new(wire.clone());
//! let mut receiver = Messenger::new(NullTransport);
//!
//! let total = Rc::new(Cell::new(0));
//! let seen = Rc::clone(&total);
//! receiver.listen("sum", ArraySerializer::new(Int32), move |values: Vec<i32>| {
//!     seen.set(values.iter().sum::<i32>());
//!     Ok(())
//! });
//!
//! sender.send("sum", &ArraySerializer::new(Int32), &vec![1, 2, 3, 4, 5]).unwrap();
//! for delivery in wire.drain() {
//!     receiver.on_delivery(&delivery).unwrap();
//! }
//! assert_eq!(total.get(), 15);
//! ```

/// Re-export serialization types.
pub mod serial {
    pub use textwire_serial::*;
}

/// Re-export transport types.
pub mod transport {
    pub use textwire_transport::*;
}

/// Re-export packetizer, token and route types.
pub mod frame {
    pub use textwire_frame::*;
}

/// Re-export messaging types.
pub mod endpoint {
    pub use textwire_endpoint::*;
}

pub use textwire_endpoint::{Dispatch, Messenger, MessengerConfig, SendReceipt, Subscription};
pub use textwire_serial::{ByteBuffer, Serializer};

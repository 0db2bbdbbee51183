//! Sending and receiving typed messages over a [`Transport`].
//!
//! A [`Messenger`] owns everything one side of the boundary needs: the
//! transport, the packetizer, endpoint subscriptions and pending
//! reassembly state. It is single-threaded and holds no locks; callers that
//! need sharing wrap it themselves.

use textwire_frame::{
    encode_endpoint, encode_header, new_guid, parse_route, FragmentHeader, PacketConfig,
    PacketEncoder, TokenMode, PROTOCOL_VERSION, ROUTE_SEPARATOR,
};
use textwire_serial::{
    deserialize_exact, serialize_to_buffer, ByteBuffer, SerialError, Serializer,
};
use textwire_transport::{Delivery, Transport};
use tracing::{debug, warn};

use crate::error::{EndpointError, HandlerError, Result, SubscriberFailure};
use crate::manager::{EndpointManager, Subscription};
use crate::reassembly::{MessageKey, Progress, ReassemblyConfig, Reassembler};

type Handler = Box<dyn FnMut(&mut ByteBuffer) -> std::result::Result<(), HandlerError>>;

/// Messenger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessengerConfig {
    pub packet: PacketConfig,
    pub reassembly: ReassemblyConfig,
    /// Version stamped into outgoing headers and expected on incoming ones.
    pub protocol_version: String,
    pub token_mode: TokenMode,
    /// Reject fragments whose header version differs from `protocol_version`.
    pub reject_foreign_versions: bool,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            packet: PacketConfig::default(),
            reassembly: ReassemblyConfig::default(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            token_mode: TokenMode::Strict,
            reject_foreign_versions: true,
        }
    }
}

/// What a successful send put on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub guid: String,
    pub fragments: usize,
}

/// Outcome of handing one inbound fragment to [`Messenger::on_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Fragment stored; the message is still incomplete.
    Pending {
        received: usize,
        expected: Option<u32>,
    },
    /// Fragment repeated one already held.
    Duplicate,
    /// Message completed and every subscriber accepted it.
    Delivered {
        endpoint: String,
        guid: String,
        subscribers: usize,
    },
    /// Message completed but nobody listens on its endpoint.
    Unhandled { endpoint: String, guid: String },
    /// Route did not decode and the lenient token mode discarded it.
    Dropped,
}

/// One side of a fragmented, text-routed message channel.
pub struct Messenger<T> {
    transport: T,
    config: MessengerConfig,
    encoder: PacketEncoder,
    endpoints: EndpointManager<Handler>,
    reassembler: Reassembler,
}

impl<T: Transport> Messenger<T> {
    /// Messenger with the default configuration.
    pub fn new(transport: T) -> Self {
        let config = MessengerConfig::default();
        Self {
            transport,
            encoder: PacketEncoder::default(),
            endpoints: EndpointManager::new(),
            reassembler: Reassembler::new(config.reassembly.clone()),
            config,
        }
    }

    /// Fails if the fragment budget is too small.
    pub fn with_config(transport: T, config: MessengerConfig) -> Result<Self> {
        Ok(Self {
            transport,
            encoder: PacketEncoder::with_config(&config.packet)?,
            endpoints: EndpointManager::new(),
            reassembler: Reassembler::new(config.reassembly.clone()),
            config,
        })
    }

    pub fn config(&self) -> &MessengerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Serialize `value` and send it to `endpoint`, one delivery per fragment.
    pub fn send<S: Serializer + ?Sized>(
        &mut self,
        endpoint: &str,
        serializer: &S,
        value: &S::Value,
    ) -> Result<SendReceipt> {
        let mut buf = serialize_to_buffer(serializer, value)?;
        self.send_buffer(endpoint, &mut buf)
    }

    /// Send an already-serialized payload.
    ///
    /// The buffer's pacer, if any, sees one checkpoint per packet unit.
    pub fn send_buffer(&mut self, endpoint: &str, buf: &mut ByteBuffer) -> Result<SendReceipt> {
        let guid = new_guid();
        let fragments = self.encoder.encode(buf);
        let count = fragments.len();

        let mut prefix = encode_endpoint(endpoint)?;
        prefix.push(ROUTE_SEPARATOR);

        for (index, fragment) in fragments.into_iter().enumerate() {
            let index_u32 = u32::try_from(index).map_err(|_| SerialError::LengthOverflow {
                len: index,
                max: u32::MAX as usize,
            })?;
            let header = FragmentHeader {
                guid: guid.clone(),
                version: self.config.protocol_version.clone(),
                index: index_u32,
                is_final: index + 1 == count,
            };
            let route = format!("{prefix}{}", encode_header(&header)?);
            self.transport.deliver(Delivery::new(route, fragment))?;
        }

        debug!(endpoint, guid = %guid, fragments = count, "sent message");
        Ok(SendReceipt {
            guid,
            fragments: count,
        })
    }

    /// Subscribe to `endpoint`, decoding each message with `serializer`.
    ///
    /// Every subscriber decodes its own copy, so subscribers on one
    /// endpoint may use different schemas.
    pub fn listen<S, F>(&mut self, endpoint: &str, serializer: S, mut callback: F) -> Subscription
    where
        S: Serializer + 'static,
        F: FnMut(S::Value) -> std::result::Result<(), HandlerError> + 'static,
    {
        let handler: Handler = Box::new(move |buf: &mut ByteBuffer| {
            let value = deserialize_exact(&serializer, buf)?;
            callback(value)
        });
        self.endpoints.register(endpoint, handler)
    }

    /// Stop future dispatch to one subscriber. Pending messages are kept.
    pub fn unregister(&mut self, subscription: &Subscription) -> bool {
        self.endpoints.unregister(subscription).is_some()
    }

    pub fn listener_count(&self, endpoint: &str) -> usize {
        self.endpoints.listeners(endpoint).len()
    }

    /// Messages with fragments held but not yet complete.
    pub fn pending(&self) -> usize {
        self.reassembler.pending()
    }

    /// Drop pending messages older than the configured timeout.
    pub fn evict_expired(&mut self) -> Vec<MessageKey> {
        self.reassembler.evict_expired()
    }

    pub fn on_delivery(&mut self, delivery: &Delivery) -> Result<Dispatch> {
        self.on_message(&delivery.route, &delivery.payload)
    }

    /// Handle one inbound fragment.
    ///
    /// When it completes a message, the payload is decoded and every
    /// subscriber on the endpoint runs in registration order. Subscriber
    /// failures do not stop the others; they are returned together as
    /// [`EndpointError::Dispatch`].
    ///
    /// Pending messages older than the configured timeout are evicted
    /// before the fragment is looked at.
    pub fn on_message(&mut self, route: &str, payload: &str) -> Result<Dispatch> {
        self.reassembler.evict_expired();

        let route = match parse_route(route, self.config.token_mode) {
            Ok(route) => route,
            Err(err) if self.config.token_mode == TokenMode::Lenient => {
                debug!(error = %err, "dropped undecodable route");
                return Ok(Dispatch::Dropped);
            }
            Err(err) => return Err(err.into()),
        };

        let header = &route.header;
        if self.config.reject_foreign_versions && header.version != self.config.protocol_version {
            warn!(
                endpoint = %route.endpoint,
                guid = %header.guid,
                version = %header.version,
                "rejected fragment with foreign protocol version"
            );
            return Err(EndpointError::VersionMismatch {
                expected: self.config.protocol_version.clone(),
                found: header.version.clone(),
            });
        }

        let fragments = match self.reassembler.accept(&route.endpoint, header, payload)? {
            Progress::Pending { received, expected } => {
                return Ok(Dispatch::Pending { received, expected })
            }
            Progress::Duplicate => return Ok(Dispatch::Duplicate),
            Progress::Complete(fragments) => fragments,
        };

        let mut buf = self.encoder.decode(&fragments)?;
        self.dispatch(route.endpoint, header.guid.clone(), &mut buf)
    }

    fn dispatch(
        &mut self,
        endpoint: String,
        guid: String,
        buf: &mut ByteBuffer,
    ) -> Result<Dispatch> {
        let listeners = self.endpoints.listeners_mut(&endpoint);
        if listeners.is_empty() {
            debug!(endpoint = %endpoint, guid = %guid, "no subscribers for completed message");
            return Ok(Dispatch::Unhandled { endpoint, guid });
        }

        let subscribers = listeners.len();
        let mut failures = Vec::new();
        for listener in listeners.iter_mut() {
            buf.reset_read();
            let id = listener.id();
            if let Err(error) = (listener.callback_mut())(buf) {
                warn!(
                    endpoint = %endpoint,
                    guid = %guid,
                    subscriber = id,
                    error = %error,
                    "subscriber failed"
                );
                failures.push(SubscriberFailure {
                    subscriber: id,
                    error,
                });
            }
        }

        if !failures.is_empty() {
            return Err(EndpointError::Dispatch { endpoint, failures });
        }
        debug!(endpoint = %endpoint, guid = %guid, subscribers, "delivered message");
        Ok(Dispatch::Delivered {
            endpoint,
            guid,
            subscribers,
        })
    }
}

impl<T> std::fmt::Debug for Messenger<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Messenger")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints.endpoint_count())
            .field("pending", &self.reassembler.pending())
            .finish_non_exhaustive()
    }
}

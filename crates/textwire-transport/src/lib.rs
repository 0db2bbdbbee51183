//! Host transport seam for text-routed fragments.
//!
//! The fragment protocol never moves bytes itself. It hands each fragment
//! to a [`Transport`] as a [`Delivery`] and expects the host to call back
//! with the same route and payload on the receiving side. This crate holds
//! that seam plus a few ready-made hosts:
//! - [`LoopbackTransport`]: in-memory queue for tests and same-process use
//! - [`NullTransport`]: discards everything
//! - `ChannelTransport` / `DeliveryCodec`: tokio channel and line codec
//!   (behind the `async` feature)

pub mod delivery;
pub mod error;
pub mod loopback;
pub mod traits;

#[cfg(feature = "async")]
pub mod channel;
#[cfg(feature = "async")]
pub mod codec;

pub use delivery::{Delivery, FIELD_SEPARATOR};
pub use error::{Result, TransportError};
pub use loopback::LoopbackTransport;
pub use traits::{NullTransport, Transport};

#[cfg(feature = "async")]
pub use channel::{channel, ChannelTransport};
#[cfg(feature = "async")]
pub use codec::{DeliveryCodec, DEFAULT_MAX_LINE};

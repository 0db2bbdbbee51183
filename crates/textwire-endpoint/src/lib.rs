//! Typed messaging over size-capped text channels.
//!
//! A [`Messenger`] serializes a value, splits it into fragments, and hands
//! each fragment to a [`Transport`](textwire_transport::Transport) with a
//! route naming its endpoint and position. On the receiving side it
//! collects fragments in any order, rebuilds the payload, and dispatches
//! the decoded value to every subscriber registered on the endpoint.

pub mod error;
pub mod manager;
pub mod messenger;
pub mod reassembly;

#[cfg(feature = "async")]
pub mod pump;

pub use error::{EndpointError, HandlerError, Result, SubscriberFailure};
pub use manager::{EndpointManager, Listener, Subscription};
pub use messenger::{Dispatch, Messenger, MessengerConfig, SendReceipt};
pub use reassembly::{
    MessageKey, Progress, Reassembler, ReassemblyConfig, DEFAULT_MAX_PENDING,
    DEFAULT_PENDING_TIMEOUT,
};

#[cfg(feature = "async")]
pub use pump::{pump, PumpStats};

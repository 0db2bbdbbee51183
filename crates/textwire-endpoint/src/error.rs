/// Error returned by a subscriber callback.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One subscriber that failed while a message was being dispatched.
#[derive(Debug)]
pub struct SubscriberFailure {
    /// Registration id of the failing subscriber.
    pub subscriber: u64,
    pub error: HandlerError,
}

/// Errors that can occur while sending, reassembling or dispatching messages.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] textwire_transport::TransportError),

    /// Route, token or fragment error.
    #[error("frame error: {0}")]
    Frame(#[from] textwire_frame::FrameError),

    /// Payload serialization error on the sending side.
    #[error("serialization error: {0}")]
    Serial(#[from] textwire_serial::SerialError),

    /// A fragment was stamped with a different protocol version.
    #[error("protocol version mismatch (expected {expected}, got {found})")]
    VersionMismatch { expected: String, found: String },

    /// Two fragments claim the same index of one message with different content.
    #[error("conflicting fragment {index} for message {guid} on '{endpoint}'")]
    ConflictingFragment {
        endpoint: String,
        guid: String,
        index: u32,
    },

    /// Two fragments of one message both claim to be last.
    #[error("message {guid} has final fragment at both {first} and {second}")]
    FinalIndexMismatch { guid: String, first: u32, second: u32 },

    /// A fragment index lies at or beyond the known fragment count.
    #[error("fragment {index} of message {guid} is out of range (count {count})")]
    IndexOutOfRange { guid: String, index: u32, count: u32 },

    /// A final fragment index leaves no room for a fragment count.
    #[error("final fragment index {index} of message {guid} overflows the fragment count")]
    IndexOverflow { guid: String, index: u32 },

    /// A completed message lacks one of its fragments.
    #[error("message {guid} is missing fragment {index}")]
    MissingFragment { guid: String, index: u32 },

    /// One or more subscribers failed. Every subscriber still ran.
    #[error("{} subscriber(s) failed on endpoint '{endpoint}'", .failures.len())]
    Dispatch {
        endpoint: String,
        failures: Vec<SubscriberFailure>,
    },
}

pub type Result<T> = std::result::Result<T, EndpointError>;

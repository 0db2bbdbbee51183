/// Errors that can occur while handing fragments to or from the host.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The receiving side of the transport has gone away.
    #[error("transport closed")]
    Closed,

    /// The host refused the delivery.
    #[error("delivery rejected: {0}")]
    Rejected(String),

    /// A delivery line is not `route<TAB>payload`.
    #[error("malformed delivery line: {0}")]
    MalformedLine(String),

    /// A delivery line exceeds the configured maximum length.
    #[error("delivery line too long ({len} bytes, max {max})")]
    LineTooLong { len: usize, max: usize },

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

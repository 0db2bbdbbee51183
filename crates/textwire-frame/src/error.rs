use textwire_serial::SerialError;

/// Errors that can occur while packetizing or decoding fragments and tokens.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Header or endpoint bytes did not decode.
    #[error("serialization error: {0}")]
    Serial(#[from] SerialError),

    /// The fragment budget cannot hold the widest packet unit.
    #[error("fragment budget {budget} is below the minimum {min}")]
    BudgetTooSmall { budget: usize, min: usize },

    /// A fragment contains text the packetizer never produces.
    #[error("malformed fragment {index}: {reason}")]
    MalformedFragment { index: usize, reason: String },

    /// A token is missing its `(0x` / `)` wrapper or has bad hex.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A route is not `endpointToken:headerToken`.
    #[error("malformed route: {0}")]
    MalformedRoute(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;

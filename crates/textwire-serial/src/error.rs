/// Errors that can occur while serializing or deserializing values.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// A read asked for more bytes than remain between the cursors.
    #[error("buffer underflow (requested {requested} bytes, {available} available)")]
    Underflow { requested: usize, available: usize },

    /// A variable-length integer does not fit the target width.
    #[error("varint exceeds {bits}-bit range")]
    VarintOverflow { bits: u32 },

    /// A length does not fit the 32-bit length prefix.
    #[error("length {len} exceeds maximum {max}")]
    LengthOverflow { len: usize, max: usize },

    /// A decoded string is not valid UTF-16.
    #[error("invalid UTF-16 string: {0}")]
    InvalidUtf16(#[from] std::string::FromUtf16Error),

    /// An object constructor asked for a field the schema never declared.
    #[error("missing object field '{0}'")]
    MissingField(String),

    /// An object constructor asked for a field with the wrong Rust type.
    #[error("object field '{0}' has an unexpected type")]
    FieldTypeMismatch(String),

    /// Bytes remained after decoding a complete value.
    #[error("{remaining} trailing bytes after value")]
    TrailingBytes { remaining: usize },
}

pub type Result<T> = std::result::Result<T, SerialError>;

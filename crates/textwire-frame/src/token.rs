//! Parenthesized hex tokens: `(0x` + two uppercase hex digits per byte + `)`.
//!
//! Tokens carry the endpoint name and fragment header inside a route, which
//! must look like a plain identifier to the host.

use textwire_serial::ByteBuffer;
use tracing::debug;

use crate::error::{FrameError, Result};

pub const TOKEN_PREFIX: &str = "(0x";
pub const TOKEN_SUFFIX: &str = ")";

/// How to treat a token that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenMode {
    /// Fail with [`FrameError::MalformedToken`].
    #[default]
    Strict,
    /// Legacy behaviour: decode to an empty buffer. Data is silently lost.
    Lenient,
}

pub fn encode_token(bytes: &[u8]) -> String {
    format!("{TOKEN_PREFIX}{}{TOKEN_SUFFIX}", hex::encode_upper(bytes))
}

/// Decode a token, failing on any malformation.
pub fn decode_token(token: &str) -> Result<ByteBuffer> {
    let body = token
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|rest| rest.strip_suffix(TOKEN_SUFFIX))
        .ok_or_else(|| {
            FrameError::MalformedToken(format!("missing (0x...) wrapper in {token:?}"))
        })?;

    let bytes = hex::decode(body)
        .map_err(|err| FrameError::MalformedToken(format!("{err} in {token:?}")))?;
    Ok(ByteBuffer::from_bytes(&bytes))
}

/// Decode a token according to `mode`.
pub fn decode_token_with(token: &str, mode: TokenMode) -> Result<ByteBuffer> {
    match (decode_token(token), mode) {
        (Ok(buf), _) => Ok(buf),
        (Err(err), TokenMode::Lenient) => {
            debug!(error = %err, "lenient token decode produced an empty buffer");
            Ok(ByteBuffer::new())
        }
        (Err(err), TokenMode::Strict) => Err(err),
    }
}

use serde::Serialize;
use textwire_serial::{
    deserialize_exact, serialize_to_buffer, Bool, ByteBuffer, Serializer, Str, VarUint32,
};

use crate::error::Result;
use crate::token::{decode_token_with, encode_token, TokenMode};

/// Protocol version stamped into every header this crate writes.
pub const PROTOCOL_VERSION: &str = "1";

/// Length of a generated message identifier, in hex characters.
pub const GUID_LEN: usize = 8;

/// Per-fragment metadata carried in the route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FragmentHeader {
    pub guid: String,
    pub version: String,
    pub index: u32,
    pub is_final: bool,
}

impl FragmentHeader {
    /// Header stamped with [`PROTOCOL_VERSION`].
    pub fn new(guid: impl Into<String>, index: u32, is_final: bool) -> Self {
        Self {
            guid: guid.into(),
            version: PROTOCOL_VERSION.to_string(),
            index,
            is_final,
        }
    }
}

/// Wire order: guid, version, index (varuint32), is_final.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSerializer;

impl Serializer for HeaderSerializer {
    type Value = FragmentHeader;

    fn serialize(
        &self,
        header: &FragmentHeader,
        buf: &mut ByteBuffer,
    ) -> textwire_serial::Result<()> {
        Str.serialize(&header.guid, buf)?;
        Str.serialize(&header.version, buf)?;
        VarUint32.serialize(&header.index, buf)?;
        Bool.serialize(&header.is_final, buf)
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> textwire_serial::Result<FragmentHeader> {
        Ok(FragmentHeader {
            guid: Str.deserialize(buf)?,
            version: Str.deserialize(buf)?,
            index: VarUint32.deserialize(buf)?,
            is_final: Bool.deserialize(buf)?,
        })
    }
}

pub fn encode_header(header: &FragmentHeader) -> Result<String> {
    let buf = serialize_to_buffer(&HeaderSerializer, header)?;
    Ok(encode_token(buf.as_written()))
}

/// Decode a header token. Trailing bytes after the header are an error.
pub fn decode_header(token: &str, mode: TokenMode) -> Result<FragmentHeader> {
    let mut buf = decode_token_with(token, mode)?;
    Ok(deserialize_exact(&HeaderSerializer, &mut buf)?)
}

/// Fresh short message identifier: [`GUID_LEN`] lowercase hex characters.
///
/// Random, not globally unique. Collisions are caught by the reassembler
/// only when two messages disagree on a fragment.
pub fn new_guid() -> String {
    let mut guid = uuid::Uuid::new_v4().simple().to_string();
    guid.truncate(GUID_LEN);
    guid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;
    use textwire_serial::SerialError;

    #[test]
    fn header_wire_order() {
        let header = FragmentHeader::new("ab", 300, true);
        let buf = serialize_to_buffer(&HeaderSerializer, &header).unwrap();
        // "ab" -> [2, 'a', 'b'], "1" -> [1, '1'], 300 -> [0xAC, 0x02], true -> [1]
        assert_eq!(
            buf.as_written(),
            &[2, b'a', b'b', 1, b'1', 0xAC, 0x02, 1]
        );
    }

    #[test]
    fn header_token_roundtrip() {
        let header = FragmentHeader::new(new_guid(), 7, false);
        let token = encode_header(&header).unwrap();
        assert!(token.starts_with("(0x") && token.ends_with(')'));
        assert_eq!(decode_header(&token, TokenMode::Strict).unwrap(), header);
    }

    #[test]
    fn guid_shape() {
        let guid = new_guid();
        assert_eq!(guid.len(), GUID_LEN);
        assert!(guid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn truncated_header_underflows() {
        let err = decode_header("(0x02)", TokenMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Serial(SerialError::Underflow { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let header = FragmentHeader::new("g", 0, true);
        let mut token = encode_header(&header).unwrap();
        token.insert_str(token.len() - 1, "00");
        let err = decode_header(&token, TokenMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Serial(SerialError::TrailingBytes { .. })
        ));
    }

    #[test]
    fn lenient_garbage_header_still_fails_to_deserialize() {
        // An empty buffer cannot hold a header, so even lenient mode surfaces an error.
        let err = decode_header("garbage", TokenMode::Lenient).unwrap_err();
        assert!(matches!(err, FrameError::Serial(_)));
    }
}

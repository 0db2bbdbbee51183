use crate::buffer::ByteBuffer;
use crate::error::Result;
use crate::pace::Unit;
use crate::traits::Serializer;
use crate::varint::{read_len, read_varuint, write_len, write_varuint};

/// Strings as a code-unit count followed by one varuint per UTF-16 unit.
///
/// ASCII costs one byte per character and everything in the Basic
/// Multilingual Plane at most three; this is not a compact encoding for
/// large text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Str;

impl Serializer for Str {
    type Value = String;

    fn serialize(&self, value: &String, buf: &mut ByteBuffer) -> Result<()> {
        write_len(buf, value.encode_utf16().count())?;
        for unit in value.encode_utf16() {
            buf.checkpoint(Unit::CodeUnit);
            write_varuint(buf, u64::from(unit));
        }
        Ok(())
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<String> {
        let len = read_len(buf)?;
        let mut units = Vec::with_capacity(len.min(buf.remaining()));
        for _ in 0..len {
            buf.checkpoint(Unit::CodeUnit);
            units.push(read_varuint(buf, 16)? as u16);
        }
        Ok(String::from_utf16(&units)?)
    }
}

//! LEB128 variable-length integers.
//!
//! Unsigned values carry 7 payload bits per byte, least significant group
//! first, with the continuation bit (0x80) set on every byte but the last.
//! Signed values are zigzag-mapped onto unsigned ones first, so small
//! negative numbers stay short: `-1` encodes exactly like unsigned `1`.

use crate::buffer::ByteBuffer;
use crate::error::{Result, SerialError};
use crate::pace::Unit;
use crate::traits::Serializer;

/// Append `value` as unsigned LEB128. One checkpoint per byte written.
pub fn write_varuint(buf: &mut ByteBuffer, mut value: u64) {
    loop {
        buf.checkpoint(Unit::VarintByte);
        let group = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.write_u8(group);
            return;
        }
        buf.write_u8(group | 0x80);
    }
}

/// Read unsigned LEB128 that must fit in `bits` bits. One checkpoint per
/// byte read.
pub fn read_varuint(buf: &mut ByteBuffer, bits: u32) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        buf.checkpoint(Unit::VarintByte);
        let byte = buf.read_u8()?;
        let payload = u64::from(byte & 0x7F);

        if shift >= bits || (bits - shift < 7 && payload >> (bits - shift) != 0) {
            return Err(SerialError::VarintOverflow { bits });
        }
        result |= payload << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

/// Number of bytes `value` occupies as unsigned LEB128.
pub fn varuint_len(value: u64) -> usize {
    let significant = 64 - value.leading_zeros() as usize;
    significant.div_ceil(7).max(1)
}

pub fn zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

pub fn unzigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

pub fn zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn unzigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Write a collection length as a 32-bit varuint prefix.
pub fn write_len(buf: &mut ByteBuffer, len: usize) -> Result<()> {
    let len32 = u32::try_from(len).map_err(|_| SerialError::LengthOverflow {
        len,
        max: u32::MAX as usize,
    })?;
    write_varuint(buf, u64::from(len32));
    Ok(())
}

/// Read a 32-bit varuint length prefix.
pub fn read_len(buf: &mut ByteBuffer) -> Result<usize> {
    Ok(read_varuint(buf, 32)? as usize)
}

/// Unsigned 32-bit LEB128.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarUint32;

impl Serializer for VarUint32 {
    type Value = u32;

    fn serialize(&self, value: &u32, buf: &mut ByteBuffer) -> Result<()> {
        write_varuint(buf, u64::from(*value));
        Ok(())
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<u32> {
        Ok(read_varuint(buf, 32)? as u32)
    }
}

/// Signed 32-bit zigzag LEB128.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarInt32;

impl Serializer for VarInt32 {
    type Value = i32;

    fn serialize(&self, value: &i32, buf: &mut ByteBuffer) -> Result<()> {
        VarUint32.serialize(&zigzag32(*value), buf)
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<i32> {
        Ok(unzigzag32(VarUint32.deserialize(buf)?))
    }
}

/// Unsigned 64-bit LEB128.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarUint64;

impl Serializer for VarUint64 {
    type Value = u64;

    fn serialize(&self, value: &u64, buf: &mut ByteBuffer) -> Result<()> {
        write_varuint(buf, *value);
        Ok(())
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<u64> {
        read_varuint(buf, 64)
    }
}

/// Signed 64-bit zigzag LEB128.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarInt64;

impl Serializer for VarInt64 {
    type Value = i64;

    fn serialize(&self, value: &i64, buf: &mut ByteBuffer) -> Result<()> {
        VarUint64.serialize(&zigzag64(*value), buf)
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<i64> {
        Ok(unzigzag64(VarUint64.deserialize(buf)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{deserialize_exact, serialize_to_buffer};

    fn encoded<S: Serializer>(serializer: S, value: S::Value) -> Vec<u8> {
        serialize_to_buffer(&serializer, &value)
            .unwrap()
            .as_written()
            .to_vec()
    }

    #[test]
    fn boundary_127_is_one_byte_128_is_two() {
        assert_eq!(encoded(VarUint32, 127), vec![0x7F]);
        assert_eq!(encoded(VarUint32, 128), vec![0x80, 0x01]);
    }

    #[test]
    fn signed_minus_one_matches_unsigned_one() {
        assert_eq!(encoded(VarInt32, -1), encoded(VarUint32, 1));
        assert_eq!(encoded(VarInt64, -1), vec![0x01]);
    }

    #[test]
    fn zigzag_mapping() {
        assert_eq!(zigzag32(0), 0);
        assert_eq!(zigzag32(-1), 1);
        assert_eq!(zigzag32(1), 2);
        assert_eq!(zigzag32(-2), 3);
        assert_eq!(zigzag32(i32::MAX), u32::MAX - 1);
        assert_eq!(zigzag32(i32::MIN), u32::MAX);
        for v in [0, 1, -1, 63, -64, i32::MAX, i32::MIN] {
            assert_eq!(unzigzag32(zigzag32(v)), v);
        }
        for v in [0, -1, i64::MAX, i64::MIN] {
            assert_eq!(unzigzag64(zigzag64(v)), v);
        }
    }

    #[test]
    fn extremes_roundtrip() {
        let mut buf = serialize_to_buffer(&VarUint32, &u32::MAX).unwrap();
        assert_eq!(buf.len(), 5);
        assert_eq!(deserialize_exact(&VarUint32, &mut buf).unwrap(), u32::MAX);

        let mut buf = serialize_to_buffer(&VarUint64, &u64::MAX).unwrap();
        assert_eq!(buf.len(), 10);
        assert_eq!(deserialize_exact(&VarUint64, &mut buf).unwrap(), u64::MAX);

        let mut buf = serialize_to_buffer(&VarInt64, &i64::MIN).unwrap();
        assert_eq!(deserialize_exact(&VarInt64, &mut buf).unwrap(), i64::MIN);
    }

    #[test]
    fn overlong_32_bit_value_overflows() {
        // 2^32 encoded as LEB128.
        let mut buf = ByteBuffer::from_bytes(&[0x80, 0x80, 0x80, 0x80, 0x10]);
        let err = VarUint32.deserialize(&mut buf).unwrap_err();
        assert!(matches!(err, SerialError::VarintOverflow { bits: 32 }));
    }

    #[test]
    fn too_many_continuation_bytes_overflow() {
        let mut buf = ByteBuffer::from_bytes(&[0xFF; 11]);
        let err = VarUint64.deserialize(&mut buf).unwrap_err();
        assert!(matches!(err, SerialError::VarintOverflow { bits: 64 }));
    }

    #[test]
    fn missing_final_byte_underflows() {
        let mut buf = ByteBuffer::from_bytes(&[0x80]);
        let err = VarUint32.deserialize(&mut buf).unwrap_err();
        assert!(matches!(err, SerialError::Underflow { .. }));
    }

    #[test]
    fn one_checkpoint_per_byte() {
        let mut buf = ByteBuffer::new();
        write_varuint(&mut buf, 300);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.checkpoints(), 2);

        read_varuint(&mut buf, 32).unwrap();
        assert_eq!(buf.checkpoints(), 4);
    }

    #[test]
    fn varuint_len_matches_encoding() {
        for v in [0u64, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut buf = ByteBuffer::new();
            write_varuint(&mut buf, v);
            assert_eq!(varuint_len(v), buf.len(), "value {v}");
        }
    }
}

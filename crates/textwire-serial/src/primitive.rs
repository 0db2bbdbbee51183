//! Fixed-width primitive serializers.
//!
//! Multi-byte values are little-endian.

use crate::buffer::ByteBuffer;
use crate::error::Result;
use crate::traits::Serializer;

/// One byte; any nonzero byte decodes as `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bool;

impl Serializer for Bool {
    type Value = bool;

    fn serialize(&self, value: &bool, buf: &mut ByteBuffer) -> Result<()> {
        buf.write_u8(u8::from(*value));
        Ok(())
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<bool> {
        Ok(buf.read_u8()? != 0)
    }
}

macro_rules! fixed_width {
    ($(#[$doc:meta])* $name:ident => $ty:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Serializer for $name {
            type Value = $ty;

            fn serialize(&self, value: &$ty, buf: &mut ByteBuffer) -> Result<()> {
                buf.write_array(value.to_le_bytes());
                Ok(())
            }

            fn deserialize(&self, buf: &mut ByteBuffer) -> Result<$ty> {
                Ok(<$ty>::from_le_bytes(buf.read_array()?))
            }
        }
    };
}

fixed_width!(Int8 => i8);
fixed_width!(UInt8 => u8);
fixed_width!(Int16 => i16);
fixed_width!(UInt16 => u16);
fixed_width!(Int32 => i32);
fixed_width!(UInt32 => u32);
fixed_width!(
    /// IEEE 754 single precision, bit-exact (NaN payloads survive).
    Float32 => f32
);
fixed_width!(
    /// IEEE 754 double precision, bit-exact (NaN payloads survive).
    Float64 => f64
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SerialError;
    use crate::traits::{deserialize_exact, serialize_to_buffer};

    fn roundtrip<S: Serializer>(serializer: S, value: S::Value) -> S::Value {
        let mut buf = serialize_to_buffer(&serializer, &value).unwrap();
        deserialize_exact(&serializer, &mut buf).unwrap()
    }

    #[test]
    fn bool_is_one_byte_and_nonzero_is_true() {
        let buf = serialize_to_buffer(&Bool, &true).unwrap();
        assert_eq!(buf.as_written(), &[1]);

        let mut buf = ByteBuffer::from_bytes(&[0x7F]);
        assert!(Bool.deserialize(&mut buf).unwrap());
        let mut buf = ByteBuffer::from_bytes(&[0]);
        assert!(!Bool.deserialize(&mut buf).unwrap());
    }

    #[test]
    fn integer_extremes_roundtrip() {
        assert_eq!(roundtrip(Int8, i8::MIN), i8::MIN);
        assert_eq!(roundtrip(UInt8, u8::MAX), u8::MAX);
        assert_eq!(roundtrip(Int16, -12_345), -12_345);
        assert_eq!(roundtrip(UInt16, u16::MAX), u16::MAX);
        assert_eq!(roundtrip(Int32, i32::MIN), i32::MIN);
        assert_eq!(roundtrip(UInt32, u32::MAX), u32::MAX);
    }

    #[test]
    fn floats_roundtrip_bit_exact() {
        assert_eq!(roundtrip(Float32, 1.5f32), 1.5);
        assert_eq!(roundtrip(Float64, -0.0f64).to_bits(), (-0.0f64).to_bits());
        assert!(roundtrip(Float64, f64::NAN).is_nan());
    }

    #[test]
    fn int32_layout_is_little_endian() {
        let buf = serialize_to_buffer(&Int32, &1).unwrap();
        assert_eq!(buf.as_written(), &[1, 0, 0, 0]);
    }

    #[test]
    fn truncated_input_underflows() {
        let mut buf = ByteBuffer::from_bytes(&[1, 2, 3]);
        let err = Float32.deserialize(&mut buf).unwrap_err();
        assert!(matches!(err, SerialError::Underflow { requested: 4, available: 3 }));
    }
}

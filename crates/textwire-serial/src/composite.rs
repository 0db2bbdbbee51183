//! Arrays, optionals and tuples.

use crate::buffer::ByteBuffer;
use crate::error::Result;
use crate::pace::Unit;
use crate::traits::Serializer;
use crate::varint::{read_len, write_len};

/// Homogeneous sequence: varuint length, then each element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArraySerializer<S> {
    element: S,
}

impl<S> ArraySerializer<S> {
    pub fn new(element: S) -> Self {
        Self { element }
    }
}

impl<S: Serializer> Serializer for ArraySerializer<S> {
    type Value = Vec<S::Value>;

    fn serialize(&self, value: &Self::Value, buf: &mut ByteBuffer) -> Result<()> {
        write_len(buf, value.len())?;
        for item in value {
            buf.checkpoint(Unit::Element);
            self.element.serialize(item, buf)?;
        }
        Ok(())
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<Self::Value> {
        let len = read_len(buf)?;
        let mut items = Vec::with_capacity(len.min(buf.remaining()));
        for _ in 0..len {
            buf.checkpoint(Unit::Element);
            items.push(self.element.deserialize(buf)?);
        }
        Ok(items)
    }
}

/// Presence byte (0 or 1) followed by the value when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalSerializer<S> {
    inner: S,
}

impl<S> OptionalSerializer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: Serializer> Serializer for OptionalSerializer<S> {
    type Value = Option<S::Value>;

    fn serialize(&self, value: &Self::Value, buf: &mut ByteBuffer) -> Result<()> {
        match value {
            Some(inner) => {
                buf.write_u8(1);
                self.inner.serialize(inner, buf)
            }
            None => {
                buf.write_u8(0);
                Ok(())
            }
        }
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<Self::Value> {
        if buf.read_u8()? == 0 {
            return Ok(None);
        }
        self.inner.deserialize(buf).map(Some)
    }
}

// Tuples of serializers serialize tuples of values, each position in order
// with no prefix. The arity lives only in the type.
macro_rules! tuple_serializer {
    ($($s:ident : $idx:tt),+) => {
        impl<$($s: Serializer),+> Serializer for ($($s,)+) {
            type Value = ($($s::Value,)+);

            fn serialize(&self, value: &Self::Value, buf: &mut ByteBuffer) -> Result<()> {
                $( self.$idx.serialize(&value.$idx, buf)?; )+
                Ok(())
            }

            fn deserialize(&self, buf: &mut ByteBuffer) -> Result<Self::Value> {
                Ok(($( self.$idx.deserialize(buf)?, )+))
            }
        }
    };
}

tuple_serializer!(A: 0);
tuple_serializer!(A: 0, B: 1);
tuple_serializer!(A: 0, B: 1, C: 2);
tuple_serializer!(A: 0, B: 1, C: 2, D: 3);
tuple_serializer!(A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_serializer!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

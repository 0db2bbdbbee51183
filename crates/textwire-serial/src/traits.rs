use std::rc::Rc;
use std::sync::Arc;

use crate::buffer::ByteBuffer;
use crate::error::{Result, SerialError};

/// A stateless encode/decode pair for one logical schema.
///
/// Sender and receiver must use structurally identical serializers; nothing
/// about the schema travels on the wire. Composite serializers own their
/// children and delegate to them in declared order.
pub trait Serializer {
    /// The Rust value this serializer reads and writes.
    type Value;

    /// Append `value` to the buffer at its write cursor.
    fn serialize(&self, value: &Self::Value, buf: &mut ByteBuffer) -> Result<()>;

    /// Read one value from the buffer at its read cursor.
    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<Self::Value>;
}

impl<S: Serializer + ?Sized> Serializer for &S {
    type Value = S::Value;

    fn serialize(&self, value: &Self::Value, buf: &mut ByteBuffer) -> Result<()> {
        (**self).serialize(value, buf)
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<Self::Value> {
        (**self).deserialize(buf)
    }
}

impl<S: Serializer + ?Sized> Serializer for Box<S> {
    type Value = S::Value;

    fn serialize(&self, value: &Self::Value, buf: &mut ByteBuffer) -> Result<()> {
        (**self).serialize(value, buf)
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<Self::Value> {
        (**self).deserialize(buf)
    }
}

impl<S: Serializer + ?Sized> Serializer for Arc<S> {
    type Value = S::Value;

    fn serialize(&self, value: &Self::Value, buf: &mut ByteBuffer) -> Result<()> {
        (**self).serialize(value, buf)
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<Self::Value> {
        (**self).deserialize(buf)
    }
}

impl<S: Serializer + ?Sized> Serializer for Rc<S> {
    type Value = S::Value;

    fn serialize(&self, value: &Self::Value, buf: &mut ByteBuffer) -> Result<()> {
        (**self).serialize(value, buf)
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<Self::Value> {
        (**self).deserialize(buf)
    }
}

/// Serialize `value` into a fresh buffer.
pub fn serialize_to_buffer<S: Serializer + ?Sized>(
    serializer: &S,
    value: &S::Value,
) -> Result<ByteBuffer> {
    let mut buf = ByteBuffer::new();
    serializer.serialize(value, &mut buf)?;
    Ok(buf)
}

/// Deserialize one value and require that it consumes every unread byte.
pub fn deserialize_exact<S: Serializer + ?Sized>(
    serializer: &S,
    buf: &mut ByteBuffer,
) -> Result<S::Value> {
    let value = serializer.deserialize(buf)?;
    match buf.remaining() {
        0 => Ok(value),
        remaining => Err(SerialError::TrailingBytes { remaining }),
    }
}

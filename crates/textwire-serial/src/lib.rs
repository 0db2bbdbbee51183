//! Composable binary serialization over a growable cursor buffer.
//!
//! Every schema is a value implementing [`Serializer`]: primitives,
//! LEB128 varints, code-unit strings, and composites (arrays, objects,
//! tuples, optionals, maps, sets) built from child serializers. Nothing
//! about the schema is written to the wire; both sides must agree on it.
//!
//! Per-unit loops report [`Unit`] checkpoints through the buffer so a host
//! scheduler can interleave other work while large values are processed.

pub mod buffer;
pub mod collections;
pub mod composite;
pub mod error;
pub mod object;
pub mod pace;
pub mod primitive;
pub mod string;
pub mod traits;
pub mod varint;

pub use buffer::{ByteBuffer, DEFAULT_CAPACITY};
pub use collections::{MapContainer, MapSerializer, SetContainer, SetSerializer};
pub use composite::{ArraySerializer, OptionalSerializer};
pub use error::{Result, SerialError};
pub use object::{Fields, ObjectBuilder, ObjectSerializer};
pub use pace::{Pacer, Unit};
pub use primitive::{Bool, Float32, Float64, Int16, Int32, Int8, UInt16, UInt32, UInt8};
pub use string::Str;
pub use traits::{deserialize_exact, serialize_to_buffer, Serializer};
pub use varint::{VarInt32, VarInt64, VarUint32, VarUint64};

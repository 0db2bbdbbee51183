//! Positional object schemas.
//!
//! An object is written as its fields in declared order with no prefix and
//! no field names; the schema alone gives the wire its meaning. Reading
//! decodes every declared field in order, then hands the values to a
//! constructor that takes them back out by name.
//!
//! ```
//! use textwire_serial::{ObjectSerializer, Str, VarUint32};
//!
//! #[derive(Debug, PartialEq)]
//! struct Player {
//!     name: String,
//!     level: u32,
//! }
//!
//! let schema = ObjectSerializer::builder()
//!     .field("name", Str, |p: &Player| &p.name)
//!     .field("level", VarUint32, |p: &Player| &p.level)
//!     .build(|fields| {
//!         Ok(Player {
//!             name: fields.take("name")?,
//!             level: fields.take("level")?,
//!         })
//!     });
//!
//! let player = Player { name: "Steve".into(), level: 10 };
//! let mut buf = textwire_serial::serialize_to_buffer(&schema, &player).unwrap();
//! let back = textwire_serial::deserialize_exact(&schema, &mut buf).unwrap();
//! assert_eq!(back, player);
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::buffer::ByteBuffer;
use crate::error::{Result, SerialError};
use crate::traits::Serializer;

type Constructor<T> = Box<dyn Fn(&mut Fields) -> Result<T> + Send + Sync>;

trait ErasedField<T>: Send + Sync {
    fn name(&self) -> &str;
    fn write(&self, object: &T, buf: &mut ByteBuffer) -> Result<()>;
    fn read(&self, buf: &mut ByteBuffer) -> Result<Box<dyn Any>>;
}

struct Field<T, S, G> {
    name: String,
    serializer: S,
    get: G,
    object: PhantomData<fn(&T)>,
}

impl<T, S, G> ErasedField<T> for Field<T, S, G>
where
    S: Serializer + Send + Sync,
    S::Value: 'static,
    G: Fn(&T) -> &S::Value + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, object: &T, buf: &mut ByteBuffer) -> Result<()> {
        self.serializer.serialize((self.get)(object), buf)
    }

    fn read(&self, buf: &mut ByteBuffer) -> Result<Box<dyn Any>> {
        Ok(Box::new(self.serializer.deserialize(buf)?))
    }
}

/// Decoded field values of one object, in declared order.
pub struct Fields {
    values: Vec<(String, Option<Box<dyn Any>>)>,
}

impl Fields {
    /// Move a decoded field out by name.
    ///
    /// Fails if the schema never declared `name`, if it was already taken,
    /// or if `V` is not the field serializer's value type.
    pub fn take<V: 'static>(&mut self, name: &str) -> Result<V> {
        let slot = self
            .values
            .iter_mut()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.take())
            .ok_or_else(|| SerialError::MissingField(name.to_string()))?;

        slot.downcast::<V>()
            .map(|value| *value)
            .map_err(|_| SerialError::FieldTypeMismatch(name.to_string()))
    }

    /// Field names in declared order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }
}

/// Serializer for `T` assembled from named field projections.
pub struct ObjectSerializer<T> {
    fields: Vec<Box<dyn ErasedField<T>>>,
    construct: Constructor<T>,
}

impl<T: 'static> ObjectSerializer<T> {
    pub fn builder() -> ObjectBuilder<T> {
        ObjectBuilder { fields: Vec::new() }
    }
}

impl<T> ObjectSerializer<T> {
    /// Declared field names, in wire order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name())
    }
}

impl<T> Serializer for ObjectSerializer<T> {
    type Value = T;

    fn serialize(&self, value: &T, buf: &mut ByteBuffer) -> Result<()> {
        for field in &self.fields {
            field.write(value, buf)?;
        }
        Ok(())
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<T> {
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            values.push((field.name().to_string(), Some(field.read(buf)?)));
        }
        (self.construct)(&mut Fields { values })
    }
}

impl<T> fmt::Debug for ObjectSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSerializer")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects field declarations for an [`ObjectSerializer`].
pub struct ObjectBuilder<T> {
    fields: Vec<Box<dyn ErasedField<T>>>,
}

impl<T: 'static> ObjectBuilder<T> {
    /// Declare the next field on the wire.
    pub fn field<S, G>(mut self, name: impl Into<String>, serializer: S, get: G) -> Self
    where
        S: Serializer + Send + Sync + 'static,
        S::Value: 'static,
        G: Fn(&T) -> &S::Value + Send + Sync + 'static,
    {
        self.fields.push(Box::new(Field {
            name: name.into(),
            serializer,
            get,
            object: PhantomData,
        }));
        self
    }

    /// Finish the schema with the constructor used when reading.
    pub fn build<F>(self, construct: F) -> ObjectSerializer<T>
    where
        F: Fn(&mut Fields) -> Result<T> + Send + Sync + 'static,
    {
        ObjectSerializer {
            fields: self.fields,
            construct: Box::new(construct),
        }
    }
}

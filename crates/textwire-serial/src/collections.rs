//! Maps and sets over pluggable containers.
//!
//! The wire shape is the same for every container: a varuint entry count,
//! then the entries in the writer's iteration order. The reader re-inserts
//! in wire order, so an insertion-ordered container (`Vec<(K, V)>`) comes
//! back in the writer's order and a set drops duplicates on its own.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use crate::buffer::ByteBuffer;
use crate::error::Result;
use crate::pace::Unit;
use crate::traits::Serializer;
use crate::varint::{read_len, write_len};

/// A container of key/value entries that a [`MapSerializer`] can walk and
/// rebuild.
pub trait MapContainer<K, V>: Default {
    fn entry_count(&self) -> usize;
    fn entries<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>;
    fn insert_entry(&mut self, key: K, value: V);
}

impl<K: Eq + Hash, V, H: BuildHasher + Default> MapContainer<K, V> for HashMap<K, V, H> {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(self.iter())
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K: Ord, V> MapContainer<K, V> for BTreeMap<K, V> {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(self.iter())
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

/// Insertion-ordered association list. Duplicate keys are kept as written.
impl<K, V> MapContainer<K, V> for Vec<(K, V)> {
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(self.iter().map(|(key, value)| (key, value)))
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.push((key, value));
    }
}

/// A container of unique elements that a [`SetSerializer`] can walk and
/// rebuild.
pub trait SetContainer<T>: Default {
    fn element_count(&self) -> usize;
    fn elements<'a>(&'a self) -> Box<dyn Iterator<Item = &'a T> + 'a>;
    fn insert_element(&mut self, element: T);
}

impl<T: Eq + Hash, H: BuildHasher + Default> SetContainer<T> for HashSet<T, H> {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn elements<'a>(&'a self) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        Box::new(self.iter())
    }

    fn insert_element(&mut self, element: T) {
        self.insert(element);
    }
}

impl<T: Ord> SetContainer<T> for BTreeSet<T> {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn elements<'a>(&'a self) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        Box::new(self.iter())
    }

    fn insert_element(&mut self, element: T) {
        self.insert(element);
    }
}

/// Varuint entry count followed by key, value, key, value...
pub struct MapSerializer<K, V, M> {
    key: K,
    value: V,
    container: PhantomData<fn() -> M>,
}

impl<K, V, M> MapSerializer<K, V, M> {
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            container: PhantomData,
        }
    }
}

impl<K: Serializer, V: Serializer> MapSerializer<K, V, HashMap<K::Value, V::Value>> {
    pub fn hash_map(key: K, value: V) -> Self {
        Self::new(key, value)
    }
}

impl<K: Serializer, V: Serializer> MapSerializer<K, V, BTreeMap<K::Value, V::Value>> {
    pub fn btree_map(key: K, value: V) -> Self {
        Self::new(key, value)
    }
}

impl<K: Serializer, V: Serializer> MapSerializer<K, V, Vec<(K::Value, V::Value)>> {
    /// Map that preserves the writer's insertion order.
    pub fn ordered(key: K, value: V) -> Self {
        Self::new(key, value)
    }
}

impl<K, V, M> Serializer for MapSerializer<K, V, M>
where
    K: Serializer,
    V: Serializer,
    M: MapContainer<K::Value, V::Value>,
{
    type Value = M;

    fn serialize(&self, map: &M, buf: &mut ByteBuffer) -> Result<()> {
        write_len(buf, map.entry_count())?;
        for (key, value) in map.entries() {
            buf.checkpoint(Unit::Element);
            self.key.serialize(key, buf)?;
            self.value.serialize(value, buf)?;
        }
        Ok(())
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<M> {
        let len = read_len(buf)?;
        let mut map = M::default();
        for _ in 0..len {
            buf.checkpoint(Unit::Element);
            let key = self.key.deserialize(buf)?;
            let value = self.value.deserialize(buf)?;
            map.insert_entry(key, value);
        }
        Ok(map)
    }
}

impl<K: Clone, V: Clone, M> Clone for MapSerializer<K, V, M> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone(), self.value.clone())
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, M> std::fmt::Debug for MapSerializer<K, V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSerializer")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// Varuint element count followed by each element.
pub struct SetSerializer<S, C> {
    element: S,
    container: PhantomData<fn() -> C>,
}

impl<S, C> SetSerializer<S, C> {
    pub fn new(element: S) -> Self {
        Self {
            element,
            container: PhantomData,
        }
    }
}

impl<S: Serializer> SetSerializer<S, HashSet<S::Value>> {
    pub fn hash_set(element: S) -> Self {
        Self::new(element)
    }
}

impl<S: Serializer> SetSerializer<S, BTreeSet<S::Value>> {
    pub fn btree_set(element: S) -> Self {
        Self::new(element)
    }
}

impl<S, C> Serializer for SetSerializer<S, C>
where
    S: Serializer,
    C: SetContainer<S::Value>,
{
    type Value = C;

    fn serialize(&self, set: &C, buf: &mut ByteBuffer) -> Result<()> {
        write_len(buf, set.element_count())?;
        for element in set.elements() {
            buf.checkpoint(Unit::Element);
            self.element.serialize(element, buf)?;
        }
        Ok(())
    }

    fn deserialize(&self, buf: &mut ByteBuffer) -> Result<C> {
        let len = read_len(buf)?;
        let mut set = C::default();
        for _ in 0..len {
            buf.checkpoint(Unit::Element);
            set.insert_element(self.element.deserialize(buf)?);
        }
        Ok(set)
    }
}

impl<S: Clone, C> Clone for SetSerializer<S, C> {
    fn clone(&self) -> Self {
        Self::new(self.element.clone())
    }
}

impl<S: std::fmt::Debug, C> std::fmt::Debug for SetSerializer<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetSerializer")
            .field("element", &self.element)
            .finish()
    }
}

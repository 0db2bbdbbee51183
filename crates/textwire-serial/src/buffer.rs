use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::error::{Result, SerialError};
use crate::pace::{Pacer, Unit};

/// Initial capacity of a buffer created with [`ByteBuffer::new`].
pub const DEFAULT_CAPACITY: usize = 64;

/// Growable byte buffer with independent write and read cursors.
///
/// Invariant: `0 <= read_position <= len <= capacity`. Growth doubles the
/// capacity, or grows to exactly fit a request larger than that. Written
/// bytes and both cursors are preserved across growth.
pub struct ByteBuffer {
    // `data.len()` is the logical capacity; bytes past `write` are zeroed.
    data: BytesMut,
    write: usize,
    read: usize,
    pacer: Option<Box<dyn Pacer + Send>>,
    checkpoints: u64,
}

impl ByteBuffer {
    /// Create an empty buffer with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with an explicit initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::zeroed(capacity),
            write: 0,
            read: 0,
            pacer: None,
            checkpoints: 0,
        }
    }

    /// Create a buffer whose written region is a copy of `bytes`.
    ///
    /// The read cursor starts at zero.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Self::with_capacity(bytes.len());
        buf.write_slice(bytes);
        buf
    }

    /// Reserve `n` bytes for writing and return the offset of the first one.
    pub fn allocate(&mut self, n: usize) -> usize {
        let offset = self.write;
        let needed = offset + n;
        if needed > self.data.len() {
            let grown = (self.data.len() * 2).max(needed);
            self.data.resize(grown, 0);
        }
        self.write = needed;
        offset
    }

    /// Consume `n` bytes for reading and return the offset of the first one.
    pub fn advance(&mut self, n: usize) -> Result<usize> {
        let available = self.remaining();
        if n > available {
            return Err(SerialError::Underflow {
                requested: n,
                available,
            });
        }
        let offset = self.read;
        self.read += n;
        Ok(offset)
    }

    pub fn write_u8(&mut self, byte: u8) {
        let offset = self.allocate(1);
        self.data[offset] = byte;
    }

    pub fn write_slice(&mut self, bytes: &[u8]) {
        let offset = self.allocate(bytes.len());
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Write a fixed-width value, typically from `to_le_bytes`.
    pub fn write_array<const N: usize>(&mut self, bytes: [u8; N]) {
        self.write_slice(&bytes);
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let offset = self.advance(1)?;
        Ok(self.data[offset])
    }

    pub fn read_slice(&mut self, n: usize) -> Result<&[u8]> {
        let offset = self.advance(n)?;
        Ok(&self.data[offset..offset + n])
    }

    /// Read a fixed-width value, typically for `from_le_bytes`.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let offset = self.advance(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[offset..offset + N]);
        Ok(out)
    }

    /// Copy the written region out as immutable bytes.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_written())
    }

    /// The written region, regardless of the read cursor.
    pub fn as_written(&self) -> &[u8] {
        &self.data[..self.write]
    }

    /// The bytes between the read and write cursors.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.read..self.write]
    }

    /// Number of written bytes.
    pub fn len(&self) -> usize {
        self.write
    }

    pub fn is_empty(&self) -> bool {
        self.write == 0
    }

    /// Number of bytes available to read.
    pub fn remaining(&self) -> usize {
        self.write - self.read
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn read_position(&self) -> usize {
        self.read
    }

    /// Rewind the read cursor to the start of the written region.
    pub fn reset_read(&mut self) {
        self.read = 0;
    }

    /// Forget all written bytes. Capacity is kept.
    pub fn clear(&mut self) {
        self.data[..self.write].fill(0);
        self.write = 0;
        self.read = 0;
    }

    /// Install a pacer notified at every unit checkpoint.
    pub fn set_pacer(&mut self, pacer: impl Pacer + Send + 'static) {
        self.pacer = Some(Box::new(pacer));
    }

    /// Builder form of [`set_pacer`](Self::set_pacer).
    pub fn with_pacer(mut self, pacer: impl Pacer + Send + 'static) -> Self {
        self.set_pacer(pacer);
        self
    }

    /// Remove and return the installed pacer.
    pub fn take_pacer(&mut self) -> Option<Box<dyn Pacer + Send>> {
        self.pacer.take()
    }

    /// Mark a suspension point before processing one unit.
    pub fn checkpoint(&mut self, unit: Unit) {
        self.checkpoints += 1;
        if let Some(pacer) = self.pacer.as_mut() {
            pacer.checkpoint(unit);
        }
    }

    /// Total checkpoints reached on this buffer.
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ByteBuffer {
    /// Clones bytes and cursors. The pacer stays with the original.
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            write: self.write,
            read: self.read,
            pacer: None,
            checkpoints: 0,
        }
    }
}

impl PartialEq for ByteBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_written() == other.as_written()
    }
}

impl Eq for ByteBuffer {}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.write)
            .field("read_position", &self.read)
            .field("capacity", &self.data.len())
            .field("paced", &self.pacer.is_some())
            .finish()
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(&bytes)
    }
}

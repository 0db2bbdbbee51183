//! Cooperative checkpoints.
//!
//! Every loop that processes one unit of data calls
//! [`ByteBuffer::checkpoint`](crate::ByteBuffer::checkpoint) before handling
//! the unit. A host scheduler installs a [`Pacer`] on the buffer to run other
//! work between units of a large payload. Checkpoints of one operation are
//! always reported in the order the units are processed.

/// The kind of unit about to be processed at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// One LEB128 byte, written or read.
    VarintByte,
    /// One UTF-16 code unit of a string.
    CodeUnit,
    /// One element of an array, map or set.
    Element,
    /// One 16-bit unit of the text packetizer.
    PacketUnit,
}

/// Receives checkpoint notifications from a [`ByteBuffer`](crate::ByteBuffer).
pub trait Pacer {
    fn checkpoint(&mut self, unit: Unit);
}

impl<F: FnMut(Unit)> Pacer for F {
    fn checkpoint(&mut self, unit: Unit) {
        self(unit)
    }
}

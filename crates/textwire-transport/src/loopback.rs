use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

use crate::delivery::Delivery;
use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory transport that queues deliveries for a local receiver.
///
/// Clones share one queue, so a sender can own one handle while the
/// receiving side drains another.
#[derive(Debug, Clone, Default)]
pub struct LoopbackTransport {
    queue: Arc<Mutex<VecDeque<Delivery>>>,
    closed: Arc<AtomicBool>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued delivery in submission order.
    pub fn drain(&self) -> Vec<Delivery> {
        self.lock().drain(..).collect()
    }

    /// Take the oldest queued delivery.
    pub fn pop(&self) -> Option<Delivery> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Refuse all further deliveries with [`TransportError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Delivery>> {
        // A panicking holder cannot leave a VecDeque half-updated.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for LoopbackTransport {
    fn deliver(&mut self, delivery: Delivery) -> Result<()> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        trace!(route = %delivery.route, len = delivery.payload.len(), "queued delivery");
        self.lock().push_back(delivery);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_queue() {
        let receiver = LoopbackTransport::new();
        let mut sender = receiver.clone();

        sender.deliver(Delivery::new("a", "1")).unwrap();
        sender.deliver(Delivery::new("b", "2")).unwrap();

        assert_eq!(receiver.len(), 2);
        let drained = receiver.drain();
        assert_eq!(drained[0], Delivery::new("a", "1"));
        assert_eq!(drained[1], Delivery::new("b", "2"));
        assert!(sender.is_empty());
    }

    #[test]
    fn pop_is_fifo() {
        let mut transport = LoopbackTransport::new();
        transport.deliver(Delivery::new("a", "1")).unwrap();
        transport.deliver(Delivery::new("b", "2")).unwrap();
        assert_eq!(transport.pop().unwrap().route, "a");
        assert_eq!(transport.pop().unwrap().route, "b");
        assert!(transport.pop().is_none());
    }

    #[test]
    fn closed_transport_rejects() {
        let mut transport = LoopbackTransport::new();
        transport.close();
        let err = transport.deliver(Delivery::new("a", "1")).unwrap_err();
        assert!(matches!(err, TransportError::Closed));
        assert!(transport.is_empty());
    }

    #[test]
    fn works_through_mutable_reference() {
        fn send_one<T: Transport>(mut transport: T) {
            transport.deliver(Delivery::new("r", "p")).unwrap();
        }

        let mut transport = LoopbackTransport::new();
        send_one(&mut transport);
        assert_eq!(transport.len(), 1);
    }
}

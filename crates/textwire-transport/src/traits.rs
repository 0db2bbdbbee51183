use crate::delivery::Delivery;
use crate::error::Result;

/// Outbound half of the host boundary: submit one fragment for delivery.
///
/// Implementations move exactly one fragment per call and need not
/// preserve the order of calls.
pub trait Transport {
    fn deliver(&mut self, delivery: Delivery) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn deliver(&mut self, delivery: Delivery) -> Result<()> {
        (**self).deliver(delivery)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn deliver(&mut self, delivery: Delivery) -> Result<()> {
        (**self).deliver(delivery)
    }
}

/// Discards every delivery. Useful when only the local side matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn deliver(&mut self, _delivery: Delivery) -> Result<()> {
        Ok(())
    }
}

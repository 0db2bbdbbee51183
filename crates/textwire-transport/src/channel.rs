use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::delivery::Delivery;
use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Transport that forwards deliveries into a tokio unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: UnboundedSender<Delivery>,
}

impl ChannelTransport {
    pub fn new(tx: UnboundedSender<Delivery>) -> Self {
        Self { tx }
    }
}

impl Transport for ChannelTransport {
    fn deliver(&mut self, delivery: Delivery) -> Result<()> {
        self.tx.send(delivery).map_err(|_| TransportError::Closed)
    }
}

/// Create a connected transport and the receiver that observes it.
pub fn channel() -> (ChannelTransport, UnboundedReceiver<Delivery>) {
    let (tx, rx) = unbounded_channel();
    (ChannelTransport::new(tx), rx)
}

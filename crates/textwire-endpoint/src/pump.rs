use textwire_transport::{Delivery, Transport};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;

use crate::messenger::{Dispatch, Messenger};

/// Counters from one [`pump`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Deliveries taken off the channel.
    pub fragments: usize,
    /// Messages that completed and reached every subscriber.
    pub delivered: usize,
    /// Deliveries whose handling returned an error.
    pub failed: usize,
}

/// Feed inbound deliveries to `messenger` until the channel closes.
///
/// Yields to the scheduler after every fragment. Errors are logged and
/// counted; they never stop the pump.
pub async fn pump<T: Transport>(
    messenger: &mut Messenger<T>,
    mut inbound: UnboundedReceiver<Delivery>,
) -> PumpStats {
    let mut stats = PumpStats::default();

    while let Some(delivery) = inbound.recv().await {
        stats.fragments += 1;
        match messenger.on_delivery(&delivery) {
            Ok(Dispatch::Delivered { .. }) => stats.delivered += 1,
            Ok(_) => {}
            Err(err) => {
                stats.failed += 1;
                warn!(route = %delivery.route, error = %err, "inbound fragment failed");
            }
        }
        tokio::task::yield_now().await;
    }

    stats
}

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::avtransport::AVTransport;

/// Lance la tâche de relevé de position.
///
/// À chaque tick, [`AVTransport::update_position`] interroge l'`Output`. La
/// tâche s'arrête quand `cancel` est annulé.
pub fn spawn_position_poller(
    transport: Arc<AVTransport>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("⏱️ Position poller started ({} ms)", interval.as_millis());

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => transport.update_position(),
            }
        }

        info!("⏹️ Position poller stopped");
    })
}

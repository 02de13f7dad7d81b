use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::service::PitService;

/// Spawns the perpetual drain loop. Start/stop/reset act on the shared state, never
/// on this task; the caller aborts the handle at shutdown.
pub fn spawn_drain_loop(svc: Arc<PitService>, wake_every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(wake_every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            svc.drain_once().await;
        }
    })
}

use std::sync::Arc;

use log::debug;
use tokio::sync::mpsc;

use crate::{Monitor, MonitorEvent};

/// A handle used by broker integrations to feed events into a hosted
/// [Monitor].
///
/// Handles are cheap to clone, one per broker worker. Sending never blocks;
/// events are queued for the single consumer task.
#[derive(Clone)]
pub struct MonitorHandle {
    monitor: Arc<Monitor>,
    tx: mpsc::UnboundedSender<MonitorEvent>,
}

impl MonitorHandle {
    pub fn send(&self, event: MonitorEvent) {
        _ = self.tx.send(event);
    }

    /// The hosted monitor, for report queries and test run resets.
    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }
}

/// Hosts a [Monitor] as a single consumer task fed from [MonitorHandle]s.
///
/// The adapter is strictly outside the core: it only forwards queued events
/// into [Monitor::handle_event], serializing them in arrival order.
pub struct MonitorEventLoop {
    monitor: Arc<Monitor>,
    rx: mpsc::UnboundedReceiver<MonitorEvent>,
}

impl MonitorEventLoop {
    pub fn new() -> (Self, MonitorHandle) {
        Self::with_monitor(Arc::new(Monitor::new()))
    }

    pub fn with_monitor(monitor: Arc<Monitor>) -> (Self, MonitorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = MonitorHandle {
            monitor: monitor.clone(),
            tx,
        };
        (Self { monitor, rx }, handle)
    }

    /// Consumes events until every [MonitorHandle] has been dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            self.monitor.handle_event(event);
        }
        debug!("all monitor handles dropped, stopping");
    }
}

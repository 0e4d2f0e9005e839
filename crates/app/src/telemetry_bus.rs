//! Telemetry bus — fans rig telemetry out to monitors in the same process.
//!
//! The rig can outpace a slow reader. A [`TelemetryTap`] then skips the
//! oldest events, counts them and keeps reading; it never treats a lag as the
//! end of the stream.

use std::future::Future;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use gecko_domain::error::GeckoError;
use gecko_domain::telemetry::TelemetryEvent;

use crate::ports::TelemetryPublisher;

/// Broadcast of [`TelemetryEvent`]s holding up to `capacity` unread events per tap.
pub struct InProcessTelemetryBus {
    sender: broadcast::Sender<TelemetryEvent>,
}

impl InProcessTelemetryBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Tap the bus. The tap sees events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> TelemetryTap {
        TelemetryTap {
            receiver: self.sender.subscribe(),
            missed: 0,
        }
    }
}

impl TelemetryPublisher for InProcessTelemetryBus {
    fn publish(
        &self,
        event: TelemetryEvent,
    ) -> impl Future<Output = Result<(), GeckoError>> + Send {
        if let TelemetryEvent::Log(message) = &event {
            tracing::debug!(%message, "rig log");
        }
        // nobody tapped in: the event is dropped
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

/// One reader's view of the bus.
pub struct TelemetryTap {
    receiver: broadcast::Receiver<TelemetryEvent>,
    missed: u64,
}

impl TelemetryTap {
    /// Wait for the next event. `None` once every publisher is gone and the
    /// backlog is read.
    pub async fn next(&mut self) -> Option<TelemetryEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => self.fell_behind(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Everything published so far, oldest first, without waiting.
    pub fn drain(&mut self) -> Vec<TelemetryEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(skipped)) => self.fell_behind(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
            }
        }
    }

    /// Events this tap lost by falling behind.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }

    fn fell_behind(&mut self, skipped: u64) {
        self.missed += skipped;
        tracing::warn!(skipped, "telemetry reader fell behind, oldest events dropped");
    }
}

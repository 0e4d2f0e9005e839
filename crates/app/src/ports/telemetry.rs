//! Telemetry port — publish rig telemetry to interested subscribers.

use std::future::Future;

use gecko_domain::error::GeckoError;
use gecko_domain::telemetry::TelemetryEvent;

/// Publishes telemetry events (force, step counts, log lines).
pub trait TelemetryPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: TelemetryEvent)
    -> impl Future<Output = Result<(), GeckoError>> + Send;
}

impl<T: TelemetryPublisher + Send + Sync> TelemetryPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: TelemetryEvent,
    ) -> impl Future<Output = Result<(), GeckoError>> + Send {
        (**self).publish(event)
    }
}

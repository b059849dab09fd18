//! Shared state handed to every handler.

use std::sync::Arc;

use ttldelta_core::TaskDispatcher;
use ttldelta_telemetry::Metrics;

pub(crate) struct ApiState {
    pub(crate) dispatcher: Arc<dyn TaskDispatcher>,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    pub(crate) fn new(dispatcher: Arc<dyn TaskDispatcher>, telemetry: Metrics) -> Self {
        Self {
            dispatcher,
            telemetry,
        }
    }
}

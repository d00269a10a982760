//! Named UI events and the handlers registered against them.
//!
//! Front ends never call the pipeline directly. They dispatch a named event
//! with its payload (the selected [`DateRange`]) and re-render whatever chart
//! the handler returns.

use std::collections::HashMap;
use std::sync::Arc;

use crate::app::pipeline;
use crate::config::Config;
use crate::data::BeaClient;
use crate::domain::{ChartSpec, DateRange};
use crate::error::{AppError, DataError};

/// Fired when either date picker changes.
pub const DATE_RANGE_CHANGED: &str = "date-range-changed";

pub type Handler = dyn Fn(DateRange) -> Result<ChartSpec, DataError> + Send + Sync;

#[derive(Default, Clone)]
pub struct EventHandlers {
    handlers: HashMap<&'static str, Arc<Handler>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`, replacing any previous registration.
    pub fn on(
        &mut self,
        event: &'static str,
        handler: impl Fn(DateRange) -> Result<ChartSpec, DataError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.handlers.insert(event, Arc::new(handler));
        self
    }

    /// Invoke the handler registered for `event`.
    pub fn dispatch(&self, event: &str, range: DateRange) -> Result<ChartSpec, AppError> {
        let handler = self
            .handlers
            .get(event)
            .ok_or_else(|| AppError::usage(format!("No handler registered for event '{event}'.")))?;
        (**handler)(range).map_err(|err| {
            tracing::warn!(event, error = %err, "event handler failed");
            AppError::from(err)
        })
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Standard registrations: a date change re-fetches both tables from BEA and
/// rebuilds the chart.
pub fn date_range_handlers(config: &Config) -> EventHandlers {
    let bea = config.bea.clone();
    let tables = config.tables.clone();
    let mut handlers = EventHandlers::new();
    handlers.on(DATE_RANGE_CHANGED, move |range| {
        let client = BeaClient::new(&bea);
        pipeline::run_cycle(&client, &tables, &range)
    });
    handlers
}

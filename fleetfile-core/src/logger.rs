//! Event logging listener.

use std::sync::Arc;

use tracing::Level;

use crate::listener::{EventListener, RemovedFrom};
use crate::sink::{LogSink, TracingSink};
use crate::types::{AppBackend, AppCluster};

/// Writes one line per lifecycle and topology event.
pub struct EventLogger {
    sink: Arc<dyn LogSink>,
}

impl EventLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(TracingSink::shared())
    }
}

impl EventListener for EventLogger {
    fn startup(&mut self) {
        self.sink.log(Level::INFO, "startup");
    }

    fn shutdown(&mut self) {
        self.sink.log(Level::INFO, "shutdown");
    }

    fn apply(&mut self, apps: &[AppCluster]) {
        for app in apps {
            self.sink.log(Level::INFO, &format!("apply: {}", app.id));
        }
    }

    fn add_task(&mut self, task: &AppBackend, app: &AppCluster) {
        self.sink.log(
            Level::INFO,
            &format!("task add: {}: {} {}", task.state, app.id, task),
        );
    }

    fn remove_task(&mut self, task: &AppBackend, from: RemovedFrom<'_>) {
        let suffix = match from {
            RemovedFrom::Cluster(_) => "",
            RemovedFrom::Retired(_) => " (cluster retired)",
        };
        self.sink.log(
            Level::INFO,
            &format!(
                "task remove: {}: {} {}{suffix}",
                task.state,
                from.app_id(),
                task
            ),
        );
    }
}

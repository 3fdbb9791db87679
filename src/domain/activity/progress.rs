use std::fmt;
use std::sync::Arc;

/// One progress report. `increment` is in percent of the whole task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    pub message: Option<String>,
    pub increment: Option<f64>,
}

impl ProgressUpdate {
    pub fn message(message: impl Into<String>) -> Self {
        ProgressUpdate { message: Some(message.into()), increment: None }
    }

    pub fn increment(increment: f64) -> Self {
        ProgressUpdate { message: None, increment: Some(increment) }
    }

    pub fn with_increment(mut self, increment: f64) -> Self {
        self.increment = Some(increment);
        self
    }
}

pub type ProgressSink = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Cloneable handle given to running tasks for reporting progress.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Option<ProgressSink>,
}

impl ProgressReporter {
    pub fn new(sink: ProgressSink) -> Self {
        ProgressReporter { sink: Some(sink) }
    }

    /// A reporter that drops every update.
    pub fn detached() -> Self {
        ProgressReporter { sink: None }
    }

    pub fn report(&self, update: ProgressUpdate) {
        if let Some(sink) = &self.sink {
            sink(update);
        }
    }

    pub fn report_message(&self, message: impl Into<String>) {
        self.report(ProgressUpdate::message(message));
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter").field("attached", &self.sink.is_some()).finish()
    }
}

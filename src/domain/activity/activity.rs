use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::domain::activity::activity_listener::{ActivityListener, ChangeNotifier, SubscriptionId};
use crate::domain::activity::activity_options::{ActivityOptionsProvider, ActivityTreeItemOptions, ExecuteActivityOptions};
use crate::domain::activity::activity_status::ActivityStatus;
use crate::domain::activity::parsed_error::ParsedError;
use crate::domain::activity::progress::{ProgressReporter, ProgressUpdate};
use crate::domain::utils::id::ActivityId;
use crate::error::{Error, Result};

/// Type-erased task, for callers that store work before running it.
pub type ActivityTask<R> = Box<dyn FnOnce(ProgressReporter, CancellationToken) -> BoxFuture<'static, anyhow::Result<R>> + Send>;

#[derive(Debug)]
struct ActivityInner {
    status: ActivityStatus,
    message: Option<String>,
    progress: f64,
    error: Option<ParsedError>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

/// A tracked, single-use background task with an observable lifecycle.
///
/// Listeners receive a signal on every status change and on every progress
/// message change while running. They re-read [`Activity::get_state`] for the
/// current render payload.
pub struct Activity {
    id: ActivityId,
    title: String,
    inner: Arc<RwLock<ActivityInner>>,
    notifier: ChangeNotifier,
    cancellation: CancellationToken,
    options_provider: Arc<dyn ActivityOptionsProvider>,
}

impl Activity {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let options_provider = Arc::new(ExecuteActivityOptions::new(title.clone()));
        Activity::with_options_provider(title, options_provider)
    }

    pub fn with_options_provider(title: impl Into<String>, options_provider: Arc<dyn ActivityOptionsProvider>) -> Self {
        Activity {
            id: ActivityId::generate(),
            title: title.into(),
            inner: Arc::new(RwLock::new(ActivityInner {
                status: ActivityStatus::NotStarted,
                message: None,
                progress: 0.0,
                error: None,
                started_at: None,
                finished_at: None,
            })),
            notifier: ChangeNotifier::new(),
            cancellation: CancellationToken::new(),
            options_provider,
        }
    }

    pub fn get_id(&self) -> &ActivityId {
        &self.id
    }

    pub fn get_title(&self) -> &str {
        &self.title
    }

    pub fn get_status(&self) -> ActivityStatus {
        self.inner.read().expect("RwLock poisoned").status
    }

    pub fn get_message(&self) -> Option<String> {
        self.inner.read().expect("RwLock poisoned").message.clone()
    }

    /// Sum of reported increments, capped at 100.
    pub fn get_progress(&self) -> f64 {
        self.inner.read().expect("RwLock poisoned").progress
    }

    pub fn get_error(&self) -> Option<ParsedError> {
        self.inner.read().expect("RwLock poisoned").error.clone()
    }

    pub fn get_started_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().expect("RwLock poisoned").started_at
    }

    pub fn get_finished_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().expect("RwLock poisoned").finished_at
    }

    pub fn is_terminal(&self) -> bool {
        self.get_status().is_terminal()
    }

    pub fn subscribe(&self, listener: Arc<dyn ActivityListener>) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        self.notifier.unsubscribe(subscription)
    }

    pub fn get_cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Signals the running task. The activity only fails if the task reacts to it.
    pub fn cancel(&self) {
        log::info!("Cancellation requested for activity '{}' ({}).", self.title, self.id);
        self.cancellation.cancel();
    }

    pub fn is_cancellation_requested(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Current render payload. Before and during the run this is the initial
    /// state, afterwards the success or error state.
    pub fn get_state(&self) -> ActivityTreeItemOptions {
        let (status, message, error) = {
            let guard = self.inner.read().expect("RwLock poisoned");
            (guard.status, guard.message.clone(), guard.error.clone())
        };

        let mut state = match status {
            ActivityStatus::NotStarted | ActivityStatus::Running => self.options_provider.initial_state(),
            ActivityStatus::Succeeded => self.options_provider.success_state(),
            ActivityStatus::Failed => self.options_provider.error_state(&error.unwrap_or_default()),
        };

        if state.description.is_none() && status == ActivityStatus::Running {
            state.description = message;
        }
        if state.context_value.is_none() {
            state.context_value = Some(status.get_context_value().to_string());
        }
        state
    }

    /// Runs `task` once. A second call fails with `ActivityAlreadyStarted`.
    /// Task errors are recorded for display and then returned as `Error::Task`.
    /// A panicking task marks the activity failed before the panic resumes.
    pub async fn run<R, F, Fut>(&self, task: F) -> Result<R>
    where
        F: FnOnce(ProgressReporter, CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<R>>,
    {
        {
            let mut guard = self.inner.write().expect("RwLock poisoned");
            if !guard.status.can_transition_to(ActivityStatus::Running) {
                log::warn!("Activity '{}' ({}) was started twice, current status {}.", self.title, self.id, guard.status);
                return Err(Error::ActivityAlreadyStarted(self.id.clone()));
            }
            guard.status = ActivityStatus::Running;
            guard.started_at = Some(Utc::now());
        }

        tracing::info!(ActivityId = %self.id, Title = %self.title, Status = %ActivityStatus::Running, LogDescription = "Activity started");
        self.notifier.notify(&self.id, ActivityStatus::Running);

        let outcome = AssertUnwindSafe(task(self.progress_reporter(), self.cancellation.clone())).catch_unwind().await;

        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let parsed = ParsedError::new(Self::panic_message(payload.as_ref()), "Panic");
                let elapsed_ms = self.finish(ActivityStatus::Failed, Some(parsed.clone())).unwrap_or_default();
                tracing::error!(
                    ActivityId = %self.id,
                    Title = %self.title,
                    Status = %ActivityStatus::Failed,
                    ProcessingTime = elapsed_ms,
                    ErrorMessage = %parsed.message,
                    LogDescription = "Activity panicked"
                );
                self.notifier.notify(&self.id, ActivityStatus::Failed);
                std::panic::resume_unwind(payload);
            }
        };

        match result {
            Ok(value) => {
                let elapsed_ms = self.finish(ActivityStatus::Succeeded, None).unwrap_or_default();
                tracing::info!(
                    ActivityId = %self.id,
                    Title = %self.title,
                    Status = %ActivityStatus::Succeeded,
                    ProcessingTime = elapsed_ms,
                    LogDescription = "Activity succeeded"
                );
                self.notifier.notify(&self.id, ActivityStatus::Succeeded);
                Ok(value)
            }
            Err(e) => {
                let parsed = ParsedError::from_anyhow(&e);
                let elapsed_ms = self.finish(ActivityStatus::Failed, Some(parsed.clone())).unwrap_or_default();
                tracing::warn!(
                    ActivityId = %self.id,
                    Title = %self.title,
                    Status = %ActivityStatus::Failed,
                    ProcessingTime = elapsed_ms,
                    ErrorType = %parsed.error_type,
                    ErrorMessage = %parsed.message,
                    LogDescription = "Activity failed"
                );
                self.notifier.notify(&self.id, ActivityStatus::Failed);
                Err(Error::Task(self.title.clone(), e))
            }
        }
    }

    pub async fn run_boxed<R>(&self, task: ActivityTask<R>) -> Result<R> {
        self.run(task).await
    }

    /// Records the terminal status and returns the run duration in
    /// milliseconds, or `None` when the transition is not allowed.
    fn finish(&self, status: ActivityStatus, error: Option<ParsedError>) -> Option<i64> {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        if !guard.status.can_transition_to(status) {
            log::warn!("Activity '{}' ({}) can not move from {} to {}.", self.title, self.id, guard.status, status);
            return None;
        }

        let now = Utc::now();
        guard.status = status;
        guard.error = error;
        guard.finished_at = Some(now);
        Some(guard.started_at.map(|start| (now - start).num_milliseconds()).unwrap_or(0))
    }

    fn panic_message(payload: &(dyn Any + Send)) -> String {
        if let Some(message) = payload.downcast_ref::<&str>() {
            message.to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "Task panicked".to_string()
        }
    }

    fn progress_reporter(&self) -> ProgressReporter {
        let inner = self.inner.clone();
        let notifier = self.notifier.clone();
        let id = self.id.clone();

        ProgressReporter::new(Arc::new(move |update: ProgressUpdate| {
            let changed = {
                let mut guard = inner.write().expect("RwLock poisoned");
                if guard.status != ActivityStatus::Running {
                    return;
                }
                if let Some(increment) = update.increment {
                    guard.progress = (guard.progress + increment).clamp(0.0, 100.0);
                }
                match update.message {
                    Some(message) if guard.message.as_deref() != Some(message.as_str()) => {
                        guard.message = Some(message);
                        true
                    }
                    _ => false,
                }
            };

            if changed {
                notifier.notify(&id, ActivityStatus::Running);
            }
        }))
    }
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.read().expect("RwLock poisoned");
        f.debug_struct("Activity")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("status", &guard.status)
            .field("message", &guard.message)
            .field("progress", &guard.progress)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    fn record_statuses(activity: &Activity) -> Arc<Mutex<Vec<ActivityStatus>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        activity.subscribe(Arc::new(move |_: &ActivityId, status: ActivityStatus| sink.lock().unwrap().push(status)));
        seen
    }

    #[tokio::test]
    #[traced_test]
    async fn test_successful_run_logs_and_notifies() {
        let activity = Activity::new("Create app");
        let seen = record_statuses(&activity);

        let value = activity.run(|_, _| async { Ok::<_, anyhow::Error>(42) }).await.unwrap();

        assert_eq!(value, 42);
        assert_eq!(activity.get_status(), ActivityStatus::Succeeded);
        assert_eq!(*seen.lock().unwrap(), vec![ActivityStatus::Running, ActivityStatus::Succeeded]);
        assert!(activity.get_finished_at().is_some());
        assert!(logs_contain("Activity started"));
        assert!(logs_contain("Activity succeeded"));
    }

    #[tokio::test]
    async fn test_progress_after_completion_is_ignored() {
        let activity = Activity::new("Create app");
        let kept: Arc<Mutex<Option<ProgressReporter>>> = Arc::new(Mutex::new(None));

        let slot = kept.clone();
        activity
            .run(move |progress, _| async move {
                progress.report(ProgressUpdate::message("half way").with_increment(50.0));
                *slot.lock().unwrap() = Some(progress);
                Ok::<_, anyhow::Error>(())
            })
            .await
            .unwrap();

        let seen = record_statuses(&activity);
        kept.lock().unwrap().as_ref().unwrap().report_message("late");

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(activity.get_message().as_deref(), Some("half way"));
        assert_eq!(activity.get_progress(), 50.0);
    }

    #[tokio::test]
    async fn test_state_before_run_is_initial() {
        let activity = Activity::new("Azure Activity");
        let state = activity.get_state();
        assert_eq!(state.label, "Azure Activity");
        assert!(!state.has_children());
        assert_eq!(state.context_value.as_deref(), Some("activity:notStarted"));
    }

    #[tokio::test]
    async fn test_finish_rejects_invalid_transition() {
        let activity = Activity::new("Idle");
        let seen = record_statuses(&activity);

        assert_eq!(activity.finish(ActivityStatus::Succeeded, None), None);
        assert_eq!(activity.get_status(), ActivityStatus::NotStarted);
        assert!(activity.get_finished_at().is_none());

        activity.run(|_, _| async { Ok::<_, anyhow::Error>(()) }).await.unwrap();
        assert_eq!(activity.finish(ActivityStatus::Failed, Some(ParsedError::default())), None);
        assert_eq!(activity.get_status(), ActivityStatus::Succeeded);
        assert!(activity.get_error().is_none());
        assert_eq!(*seen.lock().unwrap(), vec![ActivityStatus::Running, ActivityStatus::Succeeded]);
    }

    #[tokio::test]
    async fn test_cancel_is_advisory() {
        let activity = Activity::new("Long task");
        activity.cancel();

        let result = activity.run(|_, token| async move { Ok::<_, anyhow::Error>(token.is_cancelled()) }).await.unwrap();

        assert!(result);
        assert_eq!(activity.get_status(), ActivityStatus::Succeeded);
    }
}

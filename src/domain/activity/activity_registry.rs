use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::activity::activity::{Activity, ActivityTask};
use crate::domain::activity::activity_options::ActivityOptionsProvider;
use crate::domain::activity::activity_status::ActivityStatus;
use crate::domain::utils::id::ActivityId;
use crate::error::{Error, Result};

new_key_type! {
    pub struct ActivityKey;
}

#[derive(Debug)]
struct RegistryInner {
    /// Activity storage.
    slots: SlotMap<ActivityKey, Arc<Activity>>,

    /// Lookup of the internal key by public activity id.
    id_index: HashMap<ActivityId, ActivityKey>,

    /// Registration order, used by `list`.
    order: Vec<ActivityKey>,
}

/// Session-owned collection of activities. Created by whoever owns the
/// session and passed to the code that starts activities.
#[derive(Debug, Clone)]
pub struct ActivityRegistry {
    /// All three collections are protected with a single lock.
    inner: Arc<RwLock<RegistryInner>>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(RegistryInner { slots: SlotMap::with_key(), id_index: HashMap::new(), order: Vec::new() })) }
    }

    pub fn create(&self, title: impl Into<String>) -> Arc<Activity> {
        self.register(Activity::new(title))
    }

    pub fn create_with_options(&self, title: impl Into<String>, options_provider: Arc<dyn ActivityOptionsProvider>) -> Arc<Activity> {
        self.register(Activity::with_options_provider(title, options_provider))
    }

    /// Adds an activity and returns the shared handle to it.
    pub fn register(&self, activity: Activity) -> Arc<Activity> {
        let activity = Arc::new(activity);
        let mut guard = self.inner.write().expect("RwLock poisoned");
        let key = guard.slots.insert(activity.clone());
        guard.id_index.insert(activity.get_id().clone(), key);
        guard.order.push(key);

        log::debug!("Registered activity '{}' ({}).", activity.get_title(), activity.get_id());
        activity
    }

    pub fn get(&self, id: &ActivityId) -> Option<Arc<Activity>> {
        let guard = self.inner.read().expect("RwLock poisoned");
        let key = guard.id_index.get(id)?;
        guard.slots.get(*key).cloned()
    }

    /// All registered activities in registration order.
    pub fn list(&self) -> Vec<Arc<Activity>> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.order.iter().filter_map(|key| guard.slots.get(*key).cloned()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("RwLock poisoned").slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes an activity. Running activities can not be disposed.
    pub fn dispose(&self, id: &ActivityId) -> Result<Arc<Activity>> {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        let key = *guard.id_index.get(id).ok_or_else(|| Error::ActivityNotFound(id.clone()))?;

        let is_running = guard.slots.get(key).map(|activity| activity.get_status() == ActivityStatus::Running).unwrap_or(false);
        if is_running {
            return Err(Error::ActivityStillRunning(id.clone()));
        }

        guard.id_index.remove(id);
        guard.order.retain(|k| *k != key);
        let activity = guard.slots.remove(key).ok_or_else(|| Error::ActivityNotFound(id.clone()))?;

        log::debug!("Disposed activity '{}' ({}).", activity.get_title(), id);
        Ok(activity)
    }

    /// Removes every succeeded or failed activity and returns how many were removed.
    pub fn dispose_completed(&self) -> usize {
        let mut guard = self.inner.write().expect("RwLock poisoned");
        let completed: Vec<ActivityKey> = guard.slots.iter().filter(|(_, activity)| activity.is_terminal()).map(|(key, _)| key).collect();

        for key in &completed {
            if let Some(activity) = guard.slots.remove(*key) {
                guard.id_index.remove(activity.get_id());
            }
        }
        guard.order.retain(|key| !completed.contains(key));

        completed.len()
    }

    /// Runs a stored task on a registered activity.
    pub async fn run_boxed<R>(&self, id: &ActivityId, task: ActivityTask<R>) -> Result<R> {
        let activity = self.get(id).ok_or_else(|| Error::ActivityNotFound(id.clone()))?;
        activity.run_boxed(task).await
    }
}

impl Default for ActivityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::progress::ProgressReporter;
    use futures::FutureExt;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_dispose_rules() {
        let registry = ActivityRegistry::new();
        let idle = registry.create("idle");
        let done = registry.create("done");

        done.run(|_, _| async { Ok::<_, anyhow::Error>(()) }).await.unwrap();

        assert_eq!(registry.list().len(), 2);
        assert!(registry.dispose(idle.get_id()).is_ok());
        assert!(matches!(registry.dispose(idle.get_id()), Err(Error::ActivityNotFound(_))));
        assert_eq!(registry.dispose_completed(), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_running_activity_can_not_be_disposed() {
        let registry = ActivityRegistry::new();
        let activity = registry.create("busy");
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let runner = {
            let activity = activity.clone();
            tokio::spawn(async move {
                activity
                    .run(|_, _| async move {
                        release_rx.await?;
                        Ok::<_, anyhow::Error>(())
                    })
                    .await
            })
        };

        while activity.get_status() != ActivityStatus::Running {
            tokio::task::yield_now().await;
        }
        assert!(matches!(registry.dispose(activity.get_id()), Err(Error::ActivityStillRunning(_))));

        release_tx.send(()).unwrap();
        runner.await.unwrap().unwrap();
        assert!(registry.dispose(activity.get_id()).is_ok());
    }

    #[tokio::test]
    async fn test_run_boxed_by_id() {
        let registry = ActivityRegistry::new();
        let id = registry.create("boxed").get_id().clone();

        let task: ActivityTask<u32> = Box::new(|progress: ProgressReporter, _: CancellationToken| {
            async move {
                progress.report_message("working");
                Ok::<_, anyhow::Error>(7)
            }
            .boxed()
        });

        assert_eq!(registry.run_boxed(&id, task).await.unwrap(), 7);
        assert_eq!(registry.get(&id).unwrap().get_status(), ActivityStatus::Succeeded);
    }
}

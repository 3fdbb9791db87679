use slotmap::{SlotMap, new_key_type};
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::domain::activity::activity_status::ActivityStatus;
use crate::domain::utils::id::ActivityId;

new_key_type! {
    pub struct SubscriptionId;
}

/// Receives a signal whenever an activity's status or progress message
/// changes. Implementations re-read the activity for details.
pub trait ActivityListener: Send + Sync {
    fn on_activity_change(&self, activity_id: &ActivityId, status: ActivityStatus);
}

impl<F> ActivityListener for F
where
    F: Fn(&ActivityId, ActivityStatus) + Send + Sync,
{
    fn on_activity_change(&self, activity_id: &ActivityId, status: ActivityStatus) {
        self(activity_id, status)
    }
}

/// Subscription list with synchronous fan-out. Listeners are invoked outside
/// the lock, so a listener may subscribe or unsubscribe while being notified.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    listeners: Arc<RwLock<SlotMap<SubscriptionId, Arc<dyn ActivityListener>>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn ActivityListener>) -> SubscriptionId {
        let mut guard = self.listeners.write().expect("RwLock poisoned");
        guard.insert(listener)
    }

    /// Returns false when the subscription was already removed.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let mut guard = self.listeners.write().expect("RwLock poisoned");
        guard.remove(subscription).is_some()
    }

    pub fn get_listener_count(&self) -> usize {
        self.listeners.read().expect("RwLock poisoned").len()
    }

    pub fn notify(&self, activity_id: &ActivityId, status: ActivityStatus) {
        let listeners: Vec<Arc<dyn ActivityListener>> = {
            let guard = self.listeners.read().expect("RwLock poisoned");
            guard.values().cloned().collect()
        };

        for listener in listeners {
            listener.on_activity_change(activity_id, status);
        }
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier").field("listeners", &self.get_listener_count()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_unsubscribed_listener_is_not_called() {
        let notifier = ChangeNotifier::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let sink = calls.clone();
        let first = notifier.subscribe(Arc::new(move |_: &ActivityId, status: ActivityStatus| sink.lock().unwrap().push(("first", status))));
        let sink = calls.clone();
        notifier.subscribe(Arc::new(move |_: &ActivityId, status: ActivityStatus| sink.lock().unwrap().push(("second", status))));

        let id = ActivityId::generate();
        notifier.notify(&id, ActivityStatus::Running);
        assert!(notifier.unsubscribe(first));
        assert!(!notifier.unsubscribe(first));
        notifier.notify(&id, ActivityStatus::Succeeded);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2], ("second", ActivityStatus::Succeeded));
        assert_eq!(notifier.get_listener_count(), 1);
    }
}

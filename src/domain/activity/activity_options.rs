use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::domain::activity::parsed_error::ParsedError;
use crate::domain::utils::id::ActivityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ThemeIcon {
    Loading,
    Pass,
    Error,
    Custom(String),
}

impl ThemeIcon {
    pub fn get_id(&self) -> &str {
        match self {
            ThemeIcon::Loading => "loading~spin",
            ThemeIcon::Pass => "pass",
            ThemeIcon::Error => "error",
            ThemeIcon::Custom(id) => id,
        }
    }
}

/// Leaf shown beneath an activity node when the host expands it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityChildItem {
    pub id: String,
    pub label: String,
    pub icon: Option<ThemeIcon>,
    pub context_value: Option<String>,
}

impl ActivityChildItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        ActivityChildItem { id: id.into(), label: label.into(), icon: None, context_value: None }
    }

    pub fn with_icon(mut self, icon: ThemeIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_context_value(mut self, context_value: impl Into<String>) -> Self {
        self.context_value = Some(context_value.into());
        self
    }
}

pub type ChildrenProducer = Arc<dyn Fn(&ActivityId) -> Vec<ActivityChildItem> + Send + Sync>;

/// Render payload of an activity for one lifecycle state. Children are
/// produced lazily, only when the host asks for them.
#[derive(Clone)]
pub struct ActivityTreeItemOptions {
    pub label: String,
    pub description: Option<String>,
    pub icon: Option<ThemeIcon>,
    pub context_value: Option<String>,
    children: Option<ChildrenProducer>,
}

impl ActivityTreeItemOptions {
    pub fn new(label: impl Into<String>) -> Self {
        ActivityTreeItemOptions { label: label.into(), description: None, icon: None, context_value: None, children: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: ThemeIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_context_value(mut self, context_value: impl Into<String>) -> Self {
        self.context_value = Some(context_value.into());
        self
    }

    pub fn with_children(mut self, children: ChildrenProducer) -> Self {
        self.children = Some(children);
        self
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn get_children(&self, activity_id: &ActivityId) -> Vec<ActivityChildItem> {
        match &self.children {
            Some(producer) => producer(activity_id),
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for ActivityTreeItemOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityTreeItemOptions")
            .field("label", &self.label)
            .field("description", &self.description)
            .field("icon", &self.icon)
            .field("context_value", &self.context_value)
            .field("has_children", &self.has_children())
            .finish()
    }
}

/// Per-kind projection of an activity's lifecycle into render payloads.
pub trait ActivityOptionsProvider: Send + Sync {
    fn initial_state(&self) -> ActivityTreeItemOptions;
    fn success_state(&self) -> ActivityTreeItemOptions;
    fn error_state(&self, error: &ParsedError) -> ActivityTreeItemOptions;
}

/// Default provider for generic "execute" activities. The error state
/// exposes the captured message as its single child.
#[derive(Clone)]
pub struct ExecuteActivityOptions {
    title: String,
    success_children: Option<ChildrenProducer>,
}

impl ExecuteActivityOptions {
    pub fn new(title: impl Into<String>) -> Self {
        ExecuteActivityOptions { title: title.into(), success_children: None }
    }

    pub fn with_success_children(mut self, children: ChildrenProducer) -> Self {
        self.success_children = Some(children);
        self
    }
}

impl ActivityOptionsProvider for ExecuteActivityOptions {
    fn initial_state(&self) -> ActivityTreeItemOptions {
        ActivityTreeItemOptions::new(self.title.clone()).with_icon(ThemeIcon::Loading)
    }

    fn success_state(&self) -> ActivityTreeItemOptions {
        let options = ActivityTreeItemOptions::new(self.title.clone()).with_icon(ThemeIcon::Pass);
        match &self.success_children {
            Some(children) => options.with_children(children.clone()),
            None => options,
        }
    }

    fn error_state(&self, error: &ParsedError) -> ActivityTreeItemOptions {
        let message = error.message.clone();
        let children: ChildrenProducer = Arc::new(move |activity_id: &ActivityId| {
            vec![
                ActivityChildItem::new(format!("{}-error", activity_id), message.clone())
                    .with_icon(ThemeIcon::Error)
                    .with_context_value("activity:error"),
            ]
        });

        ActivityTreeItemOptions::new(self.title.clone()).with_icon(ThemeIcon::Error).with_children(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_state_has_message_child() {
        let options = ExecuteActivityOptions::new("Deploy");
        let error = ParsedError::new("disk full", "Error");
        let state = options.error_state(&error);

        let id = ActivityId::new("a-1");
        let children = state.get_children(&id);
        assert_eq!(state.label, "Deploy");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].label, "disk full");
        assert_eq!(children[0].id, "a-1-error");
    }

    #[test]
    fn test_initial_state_has_no_children() {
        let options = ExecuteActivityOptions::new("Deploy");
        let state = options.initial_state();
        assert!(!state.has_children());
        assert_eq!(state.icon.as_ref().map(ThemeIcon::get_id), Some("loading~spin"));
    }
}

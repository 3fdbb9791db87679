use serde::{Deserialize, Serialize};

pub const DEFAULT_ACTIVITY_TITLE: &str = "Azure Activity";
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Settings for the picker and the activity shown after a pick.
/// Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerSettingsDto {
    pub skip_if_one: bool,
    pub hide_step_count: bool,
    pub activity_title: String,
    pub page_size: usize,
}

impl Default for PickerSettingsDto {
    fn default() -> Self {
        PickerSettingsDto { skip_if_one: true, hide_step_count: false, activity_title: DEFAULT_ACTIVITY_TITLE.to_string(), page_size: DEFAULT_PAGE_SIZE }
    }
}

use serde::de::DeserializeOwned;
use std::fs;

use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// This function reads a file from `file_path`, attempts to parse it
/// as JSON, and returns an instance of `T`.
///
/// Errors are automatically converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let data = fs::read_to_string(file_path).map_err(Error::IoError)?;
    parse_json_str(&data)
}

pub fn parse_json_str<T: DeserializeOwned>(data: &str) -> Result<T> {
    let parsed_data: T = serde_json::from_str(data).map_err(Error::DeserializationError)?;
    Ok(parsed_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::hierarchy_dto::HierarchyDto;
    use crate::api::settings_dto::PickerSettingsDto;

    #[test]
    fn test_parse_hierarchy_with_defaults() {
        let json = r#"{ "nodes": [ { "id": "sub-1", "label": "Production", "children": [ { "id": "rg-1", "label": "web" } ] } ] }"#;
        let dto: HierarchyDto = parse_json_str(json).unwrap();

        assert_eq!(dto.nodes.len(), 1);
        assert!(dto.nodes[0].context_values.is_empty());
        assert_eq!(dto.nodes[0].children[0].id, "rg-1");
        assert!(!dto.nodes[0].fail_children);
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: PickerSettingsDto = parse_json_str(r#"{ "hide_step_count": true }"#).unwrap();

        assert!(settings.hide_step_count);
        assert!(settings.skip_if_one);
        assert_eq!(settings.activity_title, "Azure Activity");
    }

    #[test]
    fn test_malformed_json_is_deserialization_error() {
        let result: Result<HierarchyDto> = parse_json_str("{ nodes: ");
        assert!(matches!(result, Err(Error::DeserializationError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<HierarchyDto> = parse_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}

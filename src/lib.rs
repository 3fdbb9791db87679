use crate::api::hierarchy_dto::HierarchyDto;
use crate::api::settings_dto::PickerSettingsDto;
use crate::domain::tree::in_memory_tree::InMemoryTreeDataSource;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod cli;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads a hierarchy JSON file into a paged in-memory data source.
pub fn load_hierarchy(file_path: &str, page_size: usize) -> Result<InMemoryTreeDataSource> {
    let root_dto: HierarchyDto = parse_json_file::<HierarchyDto>(file_path)?;
    log::info!("Hierarchy file '{}' parsed successfully.", file_path);

    let source = InMemoryTreeDataSource::from_dto(root_dto, page_size)?;

    Ok(source)
}

/// Loads picker settings, falling back to the defaults when no file is given.
pub fn load_settings(file_path: Option<&str>) -> Result<PickerSettingsDto> {
    match file_path {
        Some(path) => {
            let settings = parse_json_file::<PickerSettingsDto>(path)?;
            log::info!("Picker settings loaded from '{}'.", path);
            Ok(settings)
        }
        None => Ok(PickerSettingsDto::default()),
    }
}

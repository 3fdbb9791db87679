pub mod hierarchy_dto;
pub mod settings_dto;

pub mod activity;
pub mod activity_listener;
pub mod activity_options;
pub mod activity_registry;
pub mod activity_status;
pub mod parsed_error;
pub mod progress;

pub mod execute_step;
pub mod prompt_step;
pub mod wizard;
pub mod wizard_context;

pub mod activity;
pub mod picker;
pub mod tree;
pub mod utils;
pub mod wizard;

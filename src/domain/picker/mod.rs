pub mod context_value_pick_step;
pub mod predicate;
pub mod quick_pick;
pub mod recursive_search_step;
pub mod resource_pick_chain;
pub mod scripted_prompter;

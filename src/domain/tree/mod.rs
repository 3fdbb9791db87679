pub mod in_memory_tree;
pub mod node_kind;
pub mod tree_data_source;
pub mod tree_node;

#![allow(dead_code)]

use std::sync::Arc;

use resource_tree_wizard::api::hierarchy_dto::{HierarchyDto, NodeDto};
use resource_tree_wizard::domain::picker::scripted_prompter::{ScriptedAnswer, ScriptedPrompter};
use resource_tree_wizard::domain::tree::in_memory_tree::InMemoryTreeDataSource;

pub fn source(nodes: Vec<NodeDto>, page_size: usize) -> Arc<InMemoryTreeDataSource> {
    Arc::new(InMemoryTreeDataSource::from_dto(HierarchyDto { nodes }, page_size).unwrap())
}

pub fn prompter(answers: Vec<ScriptedAnswer>) -> Arc<ScriptedPrompter> {
    Arc::new(ScriptedPrompter::new(answers))
}

pub fn labels(answers: &[&str]) -> Vec<ScriptedAnswer> {
    answers.iter().map(|label| ScriptedAnswer::label(*label)).collect()
}

pub fn app(id: &str) -> NodeDto {
    NodeDto::new(id, id).with_kind("application").with_context_values(&["app"])
}

pub fn group(id: &str, children: Vec<NodeDto>) -> NodeDto {
    NodeDto::new(id, id).with_kind("resourceGroup").with_context_values(&["group"]).with_children(children)
}

pub fn folder(id: &str, children: Vec<NodeDto>) -> NodeDto {
    NodeDto::new(id, id).with_kind("folder").with_children(children)
}

pub fn file(id: &str) -> NodeDto {
    NodeDto::new(id, id).with_kind("file")
}

pub fn subscription(id: &str, children: Vec<NodeDto>) -> NodeDto {
    NodeDto::new(id, id).with_kind("subscription").with_context_values(&["subscription"]).with_children(children)
}

pub fn resource_group(id: &str, children: Vec<NodeDto>) -> NodeDto {
    NodeDto::new(id, id).with_kind("resourceGroup").with_context_values(&["resourceGroup"]).with_children(children)
}

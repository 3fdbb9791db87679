use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::picker::context_value_pick_step::ParentSelection;
use crate::domain::picker::predicate::{MatchOutcome, NodePredicate};
use crate::domain::picker::quick_pick::{EXPAND_DESCRIPTION, LOAD_MORE_LABEL, PickOutcome, QuickPickEntry};
use crate::domain::tree::tree_data_source::TreeDataSource;
use crate::domain::tree::tree_node::{ContinuationToken, TreeNode};
use crate::domain::wizard::prompt_step::PromptStep;
use crate::domain::wizard::wizard_context::WizardContext;
use crate::error::{Error, Result};

/// Child listings one reachability probe may fetch before it gives up and
/// offers the branch as expandable.
pub const PROBE_FETCH_BUDGET: usize = 32;

#[derive(Debug, Clone)]
enum Candidate<N> {
    Pick(N),
    Expand(N),
}

impl<N: TreeNode> Candidate<N> {
    fn to_entry(&self) -> QuickPickEntry {
        match self {
            Candidate::Pick(node) => {
                let entry = QuickPickEntry::new(node.get_label());
                match node.get_description() {
                    Some(description) => entry.with_description(description),
                    None => entry,
                }
            }
            Candidate::Expand(node) => QuickPickEntry::new(format!("▸ {}", node.get_label())).with_description(EXPAND_DESCRIPTION),
        }
    }
}

/// One depth of the search. `parent` is `None` for the hierarchy root.
#[derive(Debug)]
struct Level<N> {
    parent: Option<N>,
    candidates: Vec<Candidate<N>>,
    continuation: Option<ContinuationToken>,
    /// Set when the search went one level deeper from here without asking.
    descended_automatically: bool,
    /// Index of the expand candidate the level below was opened from.
    expanded: Option<usize>,
}

/// Result of a bounded reachability probe below one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    Found,
    Unreachable,
    /// The budget ran out or a listing failed. The branch stays expandable and
    /// any listing error surfaces once the user opens it.
    Unknown,
}

/// Walks the hierarchy below a start node until the user (or the
/// skip-if-one rule) settles on a node matching the predicate.
///
/// Every level offers the matching children plus one expand entry per
/// non-matching child that may still lead to a match. Children keep the
/// order of the data source. A branch that turns out empty once opened is
/// dropped from its parent. Back returns to the last level the user actually
/// chose from; above the first level it becomes a wizard back.
pub struct RecursiveSearchStep<S: TreeDataSource> {
    name: String,
    data_source: Arc<S>,
    predicate: NodePredicate<S::Node>,
    skip_if_one: bool,
    placeholder: String,
    start: ParentSelection,
}

impl<S: TreeDataSource> RecursiveSearchStep<S> {
    pub fn new(data_source: Arc<S>, predicate: NodePredicate<S::Node>) -> Self {
        RecursiveSearchStep {
            name: "recursive-search".to_string(),
            data_source,
            predicate,
            skip_if_one: true,
            placeholder: "Select a resource".to_string(),
            start: ParentSelection::LastPicked,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_skip_if_one(mut self, skip_if_one: bool) -> Self {
        self.skip_if_one = skip_if_one;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Searches from the hierarchy root instead of the previously picked node.
    pub fn from_root(mut self) -> Self {
        self.start = ParentSelection::Root;
        self
    }

    async fn load_level(&self, parent: Option<S::Node>, token: &CancellationToken) -> Result<Level<S::Node>> {
        let mut level = Level { parent, candidates: Vec::new(), continuation: None, descended_automatically: false, expanded: None };
        self.load_page(&mut level, token).await?;

        while level.candidates.is_empty() && level.continuation.is_some() {
            self.load_page(&mut level, token).await?;
        }
        Ok(level)
    }

    /// Appends the next page of `level`. Non-matching children whose probe
    /// proves them empty are dropped.
    async fn load_page(&self, level: &mut Level<S::Node>, token: &CancellationToken) -> Result<()> {
        if token.is_cancelled() {
            return Err(Error::UserCancelled);
        }

        let page = self.data_source.get_children(level.parent.as_ref(), level.continuation.take()).await?;
        for child in page.nodes {
            match self.predicate.matches(&child) {
                MatchOutcome::Match => level.candidates.push(Candidate::Pick(child)),
                MatchOutcome::Indeterminate => match self.probe(&child, token).await? {
                    Reach::Found | Reach::Unknown => level.candidates.push(Candidate::Expand(child)),
                    Reach::Unreachable => log::trace!("Pruned branch '{}' without reachable match.", child.get_label()),
                },
                MatchOutcome::NoMatch => {}
            }
        }
        level.continuation = page.continuation;
        Ok(())
    }

    /// Depth-first probe below `node`, stopping at the first match or after
    /// `PROBE_FETCH_BUDGET` listings.
    async fn probe(&self, node: &S::Node, token: &CancellationToken) -> Result<Reach> {
        let mut visited: HashSet<_> = HashSet::new();
        let mut stack = vec![node.clone()];
        let mut fetches = 0;

        while let Some(current) = stack.pop() {
            if !visited.insert(current.get_id().clone()) {
                continue;
            }

            let mut continuation = None;
            loop {
                if token.is_cancelled() {
                    return Err(Error::UserCancelled);
                }
                if fetches == PROBE_FETCH_BUDGET {
                    log::debug!("Probe below '{}' ran out of budget, keeping it expandable.", node.get_label());
                    return Ok(Reach::Unknown);
                }
                fetches += 1;

                let page = match self.data_source.get_children(Some(&current), continuation).await {
                    Ok(page) => page,
                    Err(e) if e.is_user_cancelled() => return Err(e),
                    Err(e) => {
                        log::warn!("Probe below '{}' failed, keeping it expandable: {}", node.get_label(), e);
                        return Ok(Reach::Unknown);
                    }
                };
                for child in page.nodes {
                    match self.predicate.matches(&child) {
                        MatchOutcome::Match => return Ok(Reach::Found),
                        MatchOutcome::Indeterminate => stack.push(child),
                        MatchOutcome::NoMatch => {}
                    }
                }

                continuation = page.continuation;
                if continuation.is_none() {
                    break;
                }
            }
        }

        Ok(Reach::Unreachable)
    }

    /// Removes an empty level and the expand entry in its parent that led to it.
    fn drop_empty_level(levels: &mut Vec<Level<S::Node>>) {
        levels.pop();
        if let Some(parent) = levels.last_mut() {
            if let Some(index) = parent.expanded.take() {
                parent.candidates.remove(index);
            }
        }
    }

    /// Pops the current level and every level that was passed automatically.
    /// Returns false when no level the user chose from is left.
    fn pop_to_prompted_level(levels: &mut Vec<Level<S::Node>>) -> bool {
        levels.pop();
        while levels.last().is_some_and(|level| level.descended_automatically) {
            levels.pop();
        }
        !levels.is_empty()
    }
}

#[async_trait]
impl<S: TreeDataSource + 'static> PromptStep<S::Node> for RecursiveSearchStep<S> {
    fn get_name(&self) -> &str {
        &self.name
    }

    async fn prompt(&self, context: &mut WizardContext<S::Node>) -> Result<()> {
        let token = context.get_cancellation_token();
        let start = self.start.resolve(&*context);
        let start_label = start.as_ref().map(|node| node.get_label().to_string()).unwrap_or_else(|| "<root>".to_string());
        let mut levels = vec![self.load_level(start, &token).await?];

        loop {
            let depth = levels.len() - 1;
            let user_drilled = levels[..depth].iter().any(|level| !level.descended_automatically);
            let skip = self.skip_if_one || user_drilled;

            let Some(level) = levels.last_mut() else {
                return Err(Error::NoResourceFound(format!("no match below '{}'", start_label)));
            };

            if level.candidates.is_empty() {
                if level.continuation.is_some() {
                    self.load_page(level, &token).await?;
                    continue;
                }
                if depth > 0 {
                    log::debug!("Level {} of '{}' holds no match, dropping it from its parent.", depth, self.name);
                    Self::drop_empty_level(&mut levels);
                    continue;
                }
                return Err(Error::NoResourceFound(format!("no match below '{}'", start_label)));
            }

            if skip && level.candidates.len() == 1 {
                if level.continuation.is_some() {
                    self.load_page(level, &token).await?;
                    continue;
                }

                match level.candidates[0].clone() {
                    Candidate::Pick(node) => {
                        log::debug!("Search '{}' auto-selected '{}' at depth {}.", self.name, node.get_label(), depth);
                        context.push_picked_node(node);
                        return Ok(());
                    }
                    Candidate::Expand(node) => {
                        log::debug!("Search '{}' auto-expanded '{}' at depth {}.", self.name, node.get_label(), depth);
                        level.descended_automatically = true;
                        level.expanded = Some(0);
                        let next = self.load_level(Some(node), &token).await?;
                        levels.push(next);
                        continue;
                    }
                }
            }

            let mut entries: Vec<QuickPickEntry> = level.candidates.iter().map(Candidate::to_entry).collect();
            if level.continuation.is_some() {
                entries.push(QuickPickEntry::new(LOAD_MORE_LABEL));
            }

            match context.ui.pick(&self.placeholder, entries, user_drilled).await? {
                PickOutcome::Picked(index) if index < level.candidates.len() => match level.candidates[index].clone() {
                    Candidate::Pick(node) => {
                        context.push_picked_node(node);
                        return Ok(());
                    }
                    Candidate::Expand(node) => {
                        level.descended_automatically = false;
                        level.expanded = Some(index);
                        let next = self.load_level(Some(node), &token).await?;
                        levels.push(next);
                    }
                },
                PickOutcome::Picked(_) => self.load_page(level, &token).await?,
                PickOutcome::Back => {
                    if depth == 0 || !Self::pop_to_prompted_level(&mut levels) {
                        return Err(Error::GoBack);
                    }
                    log::debug!("Search '{}' went back to depth {}.", self.name, levels.len() - 1);
                }
            }
        }
    }
}

//! Open/closed folder state.
//!
//! Each folder is either closed or open; only [`expand`](ExpansionState::expand),
//! [`collapse`](ExpansionState::collapse), [`expand_all`](ExpansionState::expand_all)
//! and [`collapse_all`](ExpansionState::collapse_all) move it between the two.
//! Collapsing a folder only hides its subtree: folders below it keep their
//! own open flag and reappear as they were when the parent is reopened.

use std::collections::BTreeSet;

use crate::index::TreeIndex;
use crate::node::NodeId;

/// The set of open folder ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    open: BTreeSet<NodeId>,
}

impl ExpansionState {
    /// All folders closed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit set of open ids.
    ///
    /// The ids are taken as given; call [`sanitize`](Self::sanitize) to
    /// reconcile them against a tree.
    #[must_use]
    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        Self {
            open: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Initial open set for a freshly mounted tree.
    ///
    /// A folder starts open when it is flagged initially open, or when any
    /// descendant is selected or flagged initially open, so that initial
    /// selections are visible without extra clicks. With `single_root`, only
    /// the first qualifying root-level folder in document order stays open.
    #[must_use]
    pub fn seed(tree: &TreeIndex, selected: &BTreeSet<NodeId>, single_root: bool) -> Self {
        let entries = tree.entries();
        let mut wants_open = vec![false; entries.len()];
        // Reverse pre-order: every child is settled before its parent.
        for (slot, entry) in entries.iter().enumerate().rev() {
            if !entry.is_folder() {
                continue;
            }
            wants_open[slot] = entry.initially_open
                || entry.children.iter().any(|&child| {
                    wants_open[child] || selected.contains(entries[child].id.as_str())
                });
        }

        let mut state = Self {
            open: entries
                .iter()
                .zip(&wants_open)
                .filter(|(entry, open)| **open && entry.is_expandable())
                .map(|(entry, _)| entry.id.clone())
                .collect(),
        };
        if single_root {
            state.keep_first_open_root(tree);
        }
        state
    }

    /// Open folder ids.
    #[must_use]
    pub fn open_ids(&self) -> &BTreeSet<NodeId> {
        &self.open
    }

    /// Whether the folder is open.
    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    /// Open a folder. Returns `true` when the open set changed.
    ///
    /// With `single_root` and a root-level target, every other root-level
    /// folder is closed first; folders nested below those roots keep their
    /// own state. Ids that are not expandable folders in `tree` are ignored.
    pub fn expand(&mut self, tree: &TreeIndex, id: &str, single_root: bool) -> bool {
        let Some(slot) = tree.slot(id) else {
            return false;
        };
        let entry = tree.entry(slot);
        if !entry.is_expandable() {
            return false;
        }

        let mut changed = false;
        if single_root && entry.parent.is_none() {
            changed |= self.close_roots_except(tree, Some(slot));
        }
        changed |= self.open.insert(entry.id.clone());
        changed
    }

    /// Close a folder. Returns `true` when the open set changed.
    pub fn collapse(&mut self, id: &str) -> bool {
        self.open.remove(id)
    }

    /// Open every expandable folder in the tree.
    pub fn expand_all(&mut self, tree: &TreeIndex) -> bool {
        let before = self.open.len();
        self.open.extend(
            tree.entries()
                .iter()
                .filter(|entry| entry.is_expandable())
                .map(|entry| entry.id.clone()),
        );
        self.open.len() != before
    }

    /// Close every folder.
    pub fn collapse_all(&mut self) -> bool {
        let changed = !self.open.is_empty();
        self.open.clear();
        changed
    }

    /// Drop ids that no longer name an expandable folder in `tree` and
    /// re-apply the single-root constraint. Returns `true` when the open set
    /// changed.
    pub fn sanitize(&mut self, tree: &TreeIndex, single_root: bool) -> bool {
        let before = self.open.len();
        self.open.retain(|id| tree.is_expandable(id.as_str()));
        let mut changed = self.open.len() != before;
        if single_root {
            changed |= self.keep_first_open_root(tree);
        }
        changed
    }

    fn keep_first_open_root(&mut self, tree: &TreeIndex) -> bool {
        let first_open = tree.root_slots().iter().copied().find(|&slot| {
            let entry = tree.entry(slot);
            entry.is_expandable() && self.open.contains(entry.id.as_str())
        });
        match first_open {
            Some(keep) => self.close_roots_except(tree, Some(keep)),
            None => false,
        }
    }

    fn close_roots_except(&mut self, tree: &TreeIndex, keep: Option<usize>) -> bool {
        let mut changed = false;
        for &slot in tree.root_slots() {
            if Some(slot) != keep {
                changed |= self.open.remove(tree.entry(slot).id.as_str());
            }
        }
        changed
    }
}

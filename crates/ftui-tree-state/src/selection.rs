//! Selection state under a fixed [`SelectionMode`].
//!
//! # Cascading rules
//!
//! [`SelectionMode::DefaultCascading`] keeps three coupled rules true after
//! every mutation:
//!
//! 1. **Push-down**: a selected folder has every descendant selected.
//! 2. **Pull-up**: a folder with at least one child is selected iff all of
//!    its direct children are selected. This can cascade through several
//!    ancestor levels at once.
//! 3. **Select-all**: [`all_selected`](SelectionState::all_selected) holds
//!    iff the tree has roots and every root is selected.
//!
//! Both cascade passes are single linear scans over the pre-order index:
//! push-down walks forward (parents before children), pull-up walks backward
//! (children before parents).
//!
//! Unselecting removes the target, every ancestor (rule 2 no longer holds for
//! them) and, for folders, every descendant. Any direct unselect clears the
//! select-all flag immediately, even when the rules alone would not yet have
//! flipped it: a "select all" checkbox must never stay checked the moment the
//! user unchecks something.

use std::collections::BTreeSet;

use crate::error::{Result, TreeStateError};
use crate::index::TreeIndex;
use crate::node::NodeId;

/// Synthetic id standing for "every node is selected".
///
/// [`SelectionState`] tracks the sentinel as a flag; this id only appears in
/// [`SelectionState::ids_with_sentinel`].
pub const SELECT_ALL_ID: &str = "_TreeStateSelectAll_";

/// Selection policy, fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SelectionMode {
    /// Selection is disabled.
    #[default]
    None,
    /// Each select/unselect touches exactly its target. Select-all is not
    /// available; hosts manage anything beyond single rows themselves.
    Independent,
    /// Multi-select with push-down, pull-up and a select-all flag.
    DefaultCascading,
    /// At most one selected row; selecting replaces the previous row.
    Single,
}

impl SelectionMode {
    /// Whether rows can be selected at all.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether rows can be unselected directly.
    #[must_use]
    pub const fn supports_unselect(self) -> bool {
        matches!(self, Self::Independent | Self::DefaultCascading)
    }

    /// Whether select-all and unselect-all are available.
    #[must_use]
    pub const fn supports_select_all(self) -> bool {
        matches!(self, Self::DefaultCascading)
    }
}

/// Selected ids plus the derived select-all flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    mode: SelectionMode,
    selected: BTreeSet<NodeId>,
    all_selected: bool,
}

impl SelectionState {
    /// Nothing selected.
    #[must_use]
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: BTreeSet::new(),
            all_selected: false,
        }
    }

    /// Start from an explicit set of selected ids.
    ///
    /// The ids are taken as given; call [`sanitize`](Self::sanitize) to
    /// reconcile them against a tree and the mode's rules.
    #[must_use]
    pub fn from_ids<I, T>(mode: SelectionMode, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let mut selected: BTreeSet<NodeId> = ids.into_iter().map(Into::into).collect();
        let all_selected = selected.remove(SELECT_ALL_ID);
        Self {
            mode,
            selected,
            all_selected: all_selected && mode.supports_select_all(),
        }
    }

    /// Initial selection for a freshly mounted tree, from the nodes'
    /// initially-selected flags.
    ///
    /// Single mode keeps only the first flagged node in document order.
    /// Cascading mode applies push-down and pull-up to the flagged nodes, or
    /// starts from everything when `all_initially_selected` is set.
    #[must_use]
    pub fn seed(tree: &TreeIndex, mode: SelectionMode, all_initially_selected: bool) -> Self {
        let flagged = tree
            .entries()
            .iter()
            .filter(|entry| entry.initially_selected)
            .map(|entry| entry.id.clone());

        let mut state = Self::new(mode);
        match mode {
            SelectionMode::None => {}
            SelectionMode::Independent => state.selected.extend(flagged),
            SelectionMode::Single => state.selected.extend(flagged.take(1)),
            SelectionMode::DefaultCascading => {
                if all_initially_selected {
                    state.select_every_node(tree);
                } else {
                    state.selected.extend(flagged);
                }
                state.cascade(tree);
            }
        }
        state
    }

    /// Active selection mode.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Selected node ids (never contains [`SELECT_ALL_ID`]).
    #[must_use]
    pub fn selected_ids(&self) -> &BTreeSet<NodeId> {
        &self.selected
    }

    /// Whether the node is selected.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Whether the select-all sentinel is set.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.all_selected
    }

    /// The selected ids with [`SELECT_ALL_ID`] included when the sentinel is
    /// set.
    #[must_use]
    pub fn ids_with_sentinel(&self) -> BTreeSet<NodeId> {
        let mut ids = self.selected.clone();
        if self.all_selected {
            ids.insert(NodeId::from(SELECT_ALL_ID));
        }
        ids
    }

    /// Select a node. Returns `true` when the selection changed.
    ///
    /// # Errors
    ///
    /// [`TreeStateError::Configuration`] when selection is disabled.
    pub fn select(&mut self, tree: &TreeIndex, id: &str) -> Result<bool> {
        if !self.mode.is_enabled() {
            return Err(TreeStateError::configuration("select", self.mode));
        }
        let Some(slot) = tree.slot(id) else {
            return Ok(false);
        };
        let node = &tree.entry(slot).id;

        Ok(match self.mode {
            SelectionMode::None => false,
            SelectionMode::Independent => self.selected.insert(node.clone()),
            SelectionMode::Single => {
                if self.selected.len() == 1 && self.selected.contains(id) {
                    false
                } else {
                    self.selected.clear();
                    self.selected.insert(node.clone());
                    true
                }
            }
            SelectionMode::DefaultCascading => {
                let before = (self.selected.len(), self.all_selected);
                self.selected.insert(node.clone());
                self.cascade(tree);
                before != (self.selected.len(), self.all_selected)
            }
        })
    }

    /// Unselect a node. Returns `true` when the selection changed.
    ///
    /// # Errors
    ///
    /// [`TreeStateError::Configuration`] when the mode has no unselect
    /// action (disabled or single select).
    pub fn unselect(&mut self, tree: &TreeIndex, id: &str) -> Result<bool> {
        if !self.mode.supports_unselect() {
            return Err(TreeStateError::configuration("unselect", self.mode));
        }
        let Some(slot) = tree.slot(id) else {
            return Ok(false);
        };

        if self.mode == SelectionMode::Independent {
            return Ok(self.selected.remove(id));
        }

        let before = (self.selected.len(), self.all_selected);
        self.selected.remove(id);
        for ancestor in tree.ancestor_slots(slot) {
            self.selected.remove(tree.entry(ancestor).id.as_str());
        }
        if tree.entry(slot).is_folder() {
            for descendant in tree.descendant_slots(slot) {
                self.selected.remove(tree.entry(descendant).id.as_str());
            }
        }
        self.all_selected = false;
        Ok(before != (self.selected.len(), self.all_selected))
    }

    /// Select every node and set the select-all flag.
    ///
    /// # Errors
    ///
    /// [`TreeStateError::Configuration`] outside cascading mode.
    pub fn select_all(&mut self, tree: &TreeIndex) -> Result<bool> {
        if !self.mode.supports_select_all() {
            return Err(TreeStateError::configuration("select_all", self.mode));
        }
        let before = (self.selected.len(), self.all_selected);
        self.select_every_node(tree);
        self.cascade(tree);
        Ok(before != (self.selected.len(), self.all_selected))
    }

    /// Clear every selection and the select-all flag.
    ///
    /// # Errors
    ///
    /// [`TreeStateError::Configuration`] outside cascading mode.
    pub fn unselect_all(&mut self) -> Result<bool> {
        if !self.mode.supports_select_all() {
            return Err(TreeStateError::configuration("unselect_all", self.mode));
        }
        let changed = !self.selected.is_empty() || self.all_selected;
        self.selected.clear();
        self.all_selected = false;
        Ok(changed)
    }

    /// Reconcile against a (possibly changed) tree.
    ///
    /// Ids that left the tree are dropped. Single mode keeps at most the
    /// first remaining id in document order. Cascading mode re-runs the
    /// cascade so children that appeared under a selected folder become
    /// selected; while the select-all flag is set, every newly appeared node
    /// is selected too. Returns `true` when the selection changed.
    pub fn sanitize(&mut self, tree: &TreeIndex) -> bool {
        let before = (self.selected.clone(), self.all_selected);
        self.selected.retain(|id| tree.contains(id.as_str()));

        match self.mode {
            SelectionMode::None => {
                self.selected.clear();
                self.all_selected = false;
            }
            SelectionMode::Independent => self.all_selected = false,
            SelectionMode::Single => {
                self.all_selected = false;
                if self.selected.len() > 1 {
                    let first = tree
                        .iter()
                        .find(|id| self.selected.contains(id.as_str()))
                        .cloned();
                    self.selected.clear();
                    self.selected.extend(first);
                }
            }
            SelectionMode::DefaultCascading => {
                if self.all_selected {
                    self.select_every_node(tree);
                }
                self.cascade(tree);
            }
        }
        before != (self.selected.clone(), self.all_selected)
    }

    fn select_every_node(&mut self, tree: &TreeIndex) {
        self.selected.extend(tree.iter().cloned());
    }

    /// Push-down then pull-up, then recompute the select-all flag.
    ///
    /// Only ever adds ids; removals are the job of `unselect`.
    fn cascade(&mut self, tree: &TreeIndex) {
        let entries = tree.entries();
        let mut flags: Vec<bool> = entries
            .iter()
            .map(|entry| self.selected.contains(entry.id.as_str()))
            .collect();

        for slot in 0..entries.len() {
            if let Some(parent) = entries[slot].parent
                && flags[parent]
            {
                flags[slot] = true;
            }
        }

        for slot in (0..entries.len()).rev() {
            let entry = &entries[slot];
            if !flags[slot]
                && entry.is_folder()
                && !entry.children.is_empty()
                && entry.children.iter().all(|&child| flags[child])
            {
                flags[slot] = true;
            }
        }

        self.selected.extend(
            entries
                .iter()
                .zip(&flags)
                .filter(|(_, selected)| **selected)
                .map(|(entry, _)| entry.id.clone()),
        );

        let roots = tree.root_slots();
        self.all_selected = !roots.is_empty() && roots.iter().all(|&root| flags[root]);
    }
}

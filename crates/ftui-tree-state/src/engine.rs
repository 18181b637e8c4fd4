//! Tree state facade.
//!
//! [`TreeEngine`] is the single unit a host binds to. It receives one
//! [`Action`] at a time together with the current tree snapshot, routes it
//! to the expansion or selection manager, recomputes the visible rows and
//! hands back an immutable [`EngineState`] inside a [`Transition`].
//!
//! # Ownership
//!
//! With [`TreeConfig::owns_state`] set (the default) the engine keeps the
//! state between calls: [`mount`](TreeEngine::mount) once, then
//! [`apply`](TreeEngine::apply). Otherwise the host stores each
//! [`EngineState`] itself and calls [`reduce`](TreeEngine::reduce). Both
//! paths run the same transition logic.
//!
//! # Tree changes
//!
//! The host may replace or augment the tree between actions (for example
//! when a folder's children are loaded after it is expanded). Every
//! transition first reconciles the state against the supplied tree: ids
//! that left the tree are dropped, cascading selection flows into new
//! children, and the visible rows are recomputed.
//!
//! # Example
//!
//! ```
//! use ftui_tree_state::{Action, SelectionMode, TreeConfig, TreeEngine, TreeIndex, TreeNode};
//!
//! let tree = TreeIndex::from_roots(&[TreeNode::folder("f1")
//!     .child(TreeNode::item("a"))
//!     .child(TreeNode::item("b"))]);
//! let mut engine = TreeEngine::new(
//!     TreeConfig::new().selection_mode(SelectionMode::DefaultCascading),
//! );
//!
//! engine.apply(&tree, Action::expand("f1")).unwrap();
//! let t = engine.apply(&tree, Action::select("f1")).unwrap();
//! assert!(t.state.is_selected("a"));
//! assert!(t.state.all_selected());
//! assert_eq!(t.state.visible_ids().len(), 3);
//! ```

use std::collections::BTreeSet;

#[cfg(feature = "tracing")]
use web_time::Instant;

use crate::config::{Capabilities, TreeConfig};
use crate::error::{Result, TreeStateError};
use crate::expansion::ExpansionState;
use crate::index::TreeIndex;
use crate::node::NodeId;
use crate::selection::{SELECT_ALL_ID, SelectionMode, SelectionState};
use crate::visibility;

/// A user action submitted by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Open a folder.
    Expand(NodeId),
    /// Close a folder.
    Collapse(NodeId),
    /// Open every folder.
    ExpandAll,
    /// Close every folder.
    CollapseAll,
    /// Select a row.
    Select(NodeId),
    /// Unselect a row.
    Unselect(NodeId),
    /// Check the "select all" affordance.
    SelectAll,
    /// Uncheck the "select all" affordance.
    UnselectAll,
}

impl Action {
    /// `Action::Expand` from any id-like value.
    #[must_use]
    pub fn expand(id: impl Into<NodeId>) -> Self {
        Self::Expand(id.into())
    }

    /// `Action::Collapse` from any id-like value.
    #[must_use]
    pub fn collapse(id: impl Into<NodeId>) -> Self {
        Self::Collapse(id.into())
    }

    /// `Action::Select` from any id-like value.
    #[must_use]
    pub fn select(id: impl Into<NodeId>) -> Self {
        Self::Select(id.into())
    }

    /// `Action::Unselect` from any id-like value.
    #[must_use]
    pub fn unselect(id: impl Into<NodeId>) -> Self {
        Self::Unselect(id.into())
    }

    /// Short stable name, used in errors and trace fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Expand(_) => "expand",
            Self::Collapse(_) => "collapse",
            Self::ExpandAll => "expand_all",
            Self::CollapseAll => "collapse_all",
            Self::Select(_) => "select",
            Self::Unselect(_) => "unselect",
            Self::SelectAll => "select_all",
            Self::UnselectAll => "unselect_all",
        }
    }

    /// The node the action targets, if any.
    #[must_use]
    pub fn target(&self) -> Option<&NodeId> {
        match self {
            Self::Expand(id) | Self::Collapse(id) | Self::Select(id) | Self::Unselect(id) => {
                Some(id)
            }
            _ => None,
        }
    }

    /// Whether the action changes selection rather than expansion.
    #[must_use]
    pub const fn is_selection(&self) -> bool {
        matches!(
            self,
            Self::Select(_) | Self::Unselect(_) | Self::SelectAll | Self::UnselectAll
        )
    }

    /// The capability a host must offer for this action.
    #[must_use]
    pub const fn capability(&self) -> Capabilities {
        match self {
            Self::Expand(_) => Capabilities::EXPAND,
            Self::Collapse(_) => Capabilities::COLLAPSE,
            Self::ExpandAll => Capabilities::EXPAND_ALL,
            Self::CollapseAll => Capabilities::COLLAPSE_ALL,
            Self::Select(_) => Capabilities::SELECT,
            Self::Unselect(_) => Capabilities::UNSELECT,
            Self::SelectAll => Capabilities::SELECT_ALL,
            Self::UnselectAll => Capabilities::UNSELECT_ALL,
        }
    }
}

/// Rows whose rendering may change after a transition.
///
/// This is an optimization hint for incremental re-render; rendering every
/// row is always correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affected {
    /// Whole-tree action: re-render everything.
    All,
    /// Only these rows (and their subtrees) need re-rendering.
    Ids(BTreeSet<NodeId>),
}

impl Affected {
    fn none() -> Self {
        Self::Ids(BTreeSet::new())
    }

    /// Whether the row with `id` should be re-rendered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.contains(id),
        }
    }

    /// Whether the whole tree is affected.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Immutable snapshot of open, selected and visible rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    expansion: ExpansionState,
    selection: SelectionState,
    visible: Vec<NodeId>,
}

impl EngineState {
    fn new(tree: &TreeIndex, expansion: ExpansionState, selection: SelectionState) -> Self {
        let visible = visibility::compute_visible(tree, expansion.open_ids());
        Self {
            expansion,
            selection,
            visible,
        }
    }

    /// Open folder ids.
    #[must_use]
    pub fn open_ids(&self) -> &BTreeSet<NodeId> {
        self.expansion.open_ids()
    }

    /// Selected ids, without the select-all sentinel.
    #[must_use]
    pub fn selected_ids(&self) -> &BTreeSet<NodeId> {
        self.selection.selected_ids()
    }

    /// Selected ids including [`SELECT_ALL_ID`] when every root is selected.
    #[must_use]
    pub fn ids_with_sentinel(&self) -> BTreeSet<NodeId> {
        self.selection.ids_with_sentinel()
    }

    /// Visible ids in pre-order.
    #[must_use]
    pub fn visible_ids(&self) -> &[NodeId] {
        &self.visible
    }

    /// Whether the select-all sentinel is set.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.selection.all_selected()
    }

    /// Selection policy this state was built under.
    #[must_use]
    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.mode()
    }

    /// Expansion manager view.
    #[must_use]
    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    /// Selection manager view.
    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Whether the folder is open.
    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        self.expansion.is_open(id)
    }

    /// Whether the row is selected.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    /// Whether the row is visible.
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.iter().any(|v| v.as_str() == id)
    }

    /// The visible row after `id`.
    #[must_use]
    pub fn next_visible(&self, id: &str) -> Option<&NodeId> {
        visibility::next_visible(&self.visible, id)
    }

    /// First visible selected row: the scroll-into-view target on mount.
    #[must_use]
    pub fn first_visible_selection(&self) -> Option<&NodeId> {
        visibility::first_visible_selection(&self.visible, self.selection.selected_ids())
    }

    /// Capture the persistable part of this state.
    #[must_use]
    pub fn save_state(&self) -> TreePersistState {
        TreePersistState {
            open_ids: self.expansion.open_ids().clone(),
            selected_ids: self.selection.selected_ids().clone(),
            all_selected: self.selection.all_selected(),
        }
    }
}

/// Persistable state for a tree view.
///
/// Visible rows are not stored; they are recomputed from the tree on
/// restore.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TreePersistState {
    /// Open folder ids.
    pub open_ids: BTreeSet<NodeId>,
    /// Selected ids.
    pub selected_ids: BTreeSet<NodeId>,
    /// Select-all sentinel.
    #[cfg_attr(feature = "state-persistence", serde(default))]
    pub all_selected: bool,
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the action.
    pub state: EngineState,
    /// Rows whose rendering may have changed.
    pub affected: Affected,
    /// Whether the open or selected sets differ from the input state.
    pub changed: bool,
}

/// Stateful facade over expansion, selection and visibility.
#[derive(Debug, Clone)]
pub struct TreeEngine {
    config: TreeConfig,
    state: Option<EngineState>,
}

impl TreeEngine {
    /// Create an engine. Nothing is seeded until the first tree arrives.
    #[must_use]
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Actions the configuration permits.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.config.capabilities()
    }

    /// Whether "expand all" is offered (not under single-root expansion).
    #[must_use]
    pub fn can_expand_all(&self) -> bool {
        self.capabilities().contains(Capabilities::EXPAND_ALL)
    }

    /// Initial state for a freshly mounted tree.
    ///
    /// Selection is seeded first so that folders containing initial
    /// selections start open.
    #[must_use]
    pub fn seed(&self, tree: &TreeIndex) -> EngineState {
        let selection = SelectionState::seed(
            tree,
            self.config.selection_mode,
            self.config.all_initially_selected,
        );
        let expansion = ExpansionState::seed(
            tree,
            selection.selected_ids(),
            self.config.single_root_expansion,
        );
        EngineState::new(tree, expansion, selection)
    }

    /// Seed and keep the initial state.
    ///
    /// # Errors
    ///
    /// [`TreeStateError::StateNotOwned`] when the host owns state.
    pub fn mount(&mut self, tree: &TreeIndex) -> Result<&EngineState> {
        self.ensure_owned()?;
        let seeded = self.seed(tree);
        Ok(self.state.insert(seeded))
    }

    /// The kept state, if mounted.
    #[must_use]
    pub fn state(&self) -> Option<&EngineState> {
        self.state.as_ref()
    }

    /// Apply an action to the kept state, mounting first if needed.
    ///
    /// # Errors
    ///
    /// [`TreeStateError::StateNotOwned`] when the host owns state, and
    /// [`TreeStateError::Configuration`] when the selection mode does not
    /// support the action. A rejected action leaves the kept state as it
    /// was.
    pub fn apply(&mut self, tree: &TreeIndex, action: Action) -> Result<Transition> {
        self.ensure_owned()?;
        let transition = match &self.state {
            Some(state) => self.reduce(tree, state, action)?,
            None => {
                let seeded = self.seed(tree);
                self.reduce(tree, &seeded, action)?
            }
        };
        self.state = Some(transition.state.clone());
        Ok(transition)
    }

    /// Reconcile the kept state after the host changed the tree.
    ///
    /// # Errors
    ///
    /// [`TreeStateError::StateNotOwned`] when the host owns state.
    pub fn refresh(&mut self, tree: &TreeIndex) -> Result<&EngineState> {
        self.ensure_owned()?;
        let next = match &self.state {
            Some(state) => self.reconcile(tree, state),
            None => self.seed(tree),
        };
        Ok(self.state.insert(next))
    }

    /// Rebuild a state from persisted sets, enforcing the configuration's
    /// rules against the current tree. An owning engine keeps the result.
    pub fn restore_state(&mut self, tree: &TreeIndex, saved: TreePersistState) -> EngineState {
        let TreePersistState {
            open_ids,
            selected_ids,
            all_selected,
        } = saved;
        let sentinel = all_selected.then(|| NodeId::from(SELECT_ALL_ID));
        let raw = EngineState {
            expansion: ExpansionState::from_ids(open_ids),
            selection: SelectionState::from_ids(
                self.config.selection_mode,
                selected_ids.into_iter().chain(sentinel),
            ),
            visible: Vec::new(),
        };
        let restored = self.reconcile(tree, &raw);
        if self.config.owns_state {
            self.state = Some(restored.clone());
        }
        restored
    }

    /// Re-apply every invariant to `state` against `tree`.
    ///
    /// Drops ids that left the tree, re-enforces single-root expansion and
    /// the selection mode's rules, and recomputes the visible rows.
    #[must_use]
    pub fn reconcile(&self, tree: &TreeIndex, state: &EngineState) -> EngineState {
        let mut expansion = state.expansion.clone();
        expansion.sanitize(tree, self.config.single_root_expansion);
        let mut selection = state.selection.clone();
        selection.sanitize(tree);
        EngineState::new(tree, expansion, selection)
    }

    /// Compute the transition for `action` from a host-held state.
    ///
    /// # Errors
    ///
    /// [`TreeStateError::Configuration`] when the selection mode does not
    /// support the action.
    pub fn reduce(
        &self,
        tree: &TreeIndex,
        state: &EngineState,
        action: Action,
    ) -> Result<Transition> {
        #[cfg(feature = "tracing")]
        let apply_start = Instant::now();
        #[cfg(feature = "tracing")]
        let apply_span = tracing::debug_span!(
            "tree_state.apply",
            action = action.name(),
            visible_count = tracing::field::Empty,
            selected_count = tracing::field::Empty,
            changed = tracing::field::Empty,
            apply_duration_us = tracing::field::Empty,
        );
        #[cfg(feature = "tracing")]
        let _apply_guard = apply_span.enter();

        let single_root = self.config.single_root_expansion;
        let base = self.reconcile(tree, state);
        let mut expansion = base.expansion.clone();
        let mut selection = base.selection.clone();

        let outcome = match &action {
            Action::Expand(id) => {
                expansion.expand(tree, id.as_str(), single_root);
                Ok(Affected::Ids(chain_of(tree, id)))
            }
            Action::Collapse(id) => {
                expansion.collapse(id.as_str());
                Ok(Affected::Ids(chain_of(tree, id)))
            }
            Action::ExpandAll if single_root => {
                #[cfg(feature = "tracing")]
                tracing::debug!(message = "tree_state.noop", reason = "expand_all unavailable");
                Ok(Affected::none())
            }
            Action::ExpandAll => {
                expansion.expand_all(tree);
                Ok(Affected::All)
            }
            Action::CollapseAll => {
                expansion.collapse_all();
                Ok(Affected::All)
            }
            Action::Select(id) => {
                let previous = (selection.mode() == SelectionMode::Single)
                    .then(|| selection.selected_ids().first().cloned())
                    .flatten();
                selection.select(tree, id.as_str()).map(|_| {
                    let mut affected = selection_chain(tree, &base.visible, id);
                    if let Some(previous) = previous.filter(|p| p != id) {
                        affected.extend(selection_chain(tree, &base.visible, &previous));
                    }
                    Affected::Ids(affected)
                })
            }
            Action::Unselect(id) => selection
                .unselect(tree, id.as_str())
                .map(|_| Affected::Ids(selection_chain(tree, &base.visible, id))),
            Action::SelectAll => selection.select_all(tree).map(|_| Affected::All),
            Action::UnselectAll => selection.unselect_all().map(|_| Affected::All),
        };

        let affected = match outcome {
            Ok(affected) => affected,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    message = "tree_state.rejected",
                    action = action.name(),
                    mode = ?self.config.selection_mode
                );
                return Err(err);
            }
        };

        let changed = expansion != state.expansion || selection != state.selection;
        let next = if expansion == base.expansion {
            EngineState {
                visible: base.visible,
                expansion,
                selection,
            }
        } else {
            EngineState::new(tree, expansion, selection)
        };

        #[cfg(feature = "tracing")]
        {
            let elapsed_us = apply_start.elapsed().as_micros() as u64;
            apply_span.record("visible_count", next.visible.len() as u64);
            apply_span.record("selected_count", next.selected_ids().len() as u64);
            apply_span.record("changed", changed);
            apply_span.record("apply_duration_us", elapsed_us);
            if !changed {
                tracing::debug!(message = "tree_state.noop", action = action.name());
            }
        }

        Ok(Transition {
            state: next,
            affected,
            changed,
        })
    }

    fn ensure_owned(&self) -> Result<()> {
        if self.config.owns_state {
            Ok(())
        } else {
            Err(TreeStateError::StateNotOwned)
        }
    }
}

/// `id` plus every ancestor up to and including its root.
fn chain_of(tree: &TreeIndex, id: &NodeId) -> BTreeSet<NodeId> {
    let mut out = BTreeSet::new();
    out.insert(id.clone());
    out.extend(tree.ancestors(id.as_str()).cloned());
    out
}

/// Chain of `id` plus the chain of the row right below it: that row's
/// border styling depends on whether the row above it is selected.
fn selection_chain(tree: &TreeIndex, visible: &[NodeId], id: &NodeId) -> BTreeSet<NodeId> {
    let mut out = chain_of(tree, id);
    if let Some(next) = visibility::next_visible(visible, id.as_str()) {
        out.extend(chain_of(tree, next));
    }
    out
}

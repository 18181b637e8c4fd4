//! Engine-owned index over one snapshot of the host tree.
//!
//! # Design
//!
//! The host hands over an ordered forest of [`TreeNode`]s. Every query the
//! engine makes (children of a folder, the ancestor chain of a row, the set
//! of root folders) is answered from a flat arena built once per snapshot:
//!
//! ```text
//! entries: [ f1, a, b, f2, c ]      document (pre-order) order
//! slots:   { "f1" -> 0, "a" -> 1, ... }
//! entry:   { id, kind, parent, children, depth, flags }
//! ```
//!
//! Because the arena is in pre-order, a forward scan visits parents before
//! children and a reverse scan visits children before parents. The cascade
//! passes in [`selection`](crate::selection) rely on both properties and
//! never recurse.
//!
//! Construction uses an explicit stack, so arbitrarily deep trees cannot
//! overflow the call stack. When an id occurs more than once, the first
//! occurrence in document order wins and the later node (with its subtree)
//! is skipped.

use ahash::AHashMap;

use crate::node::{NodeId, NodeKind, TreeNode};

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) depth: usize,
    pub(crate) initially_open: bool,
    pub(crate) initially_selected: bool,
    pub(crate) empty: bool,
}

impl Entry {
    #[inline]
    pub(crate) fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Folder that can be opened: not an empty placeholder.
    #[inline]
    pub(crate) fn is_expandable(&self) -> bool {
        self.is_folder() && !(self.empty && self.children.is_empty())
    }
}

/// Read-only index over a tree snapshot.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    entries: Vec<Entry>,
    slots: AHashMap<NodeId, usize>,
    roots: Vec<usize>,
}

impl TreeIndex {
    /// Build an index from the root-level nodes of a tree.
    #[must_use]
    pub fn from_roots(roots: &[TreeNode]) -> Self {
        let mut index = Self::default();
        let mut stack: Vec<(&TreeNode, Option<usize>, usize)> = roots
            .iter()
            .rev()
            .map(|node| (node, None, 0))
            .collect();

        while let Some((node, parent, depth)) = stack.pop() {
            if index.slots.contains_key(node.id().as_str()) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    message = "tree_state.duplicate_id",
                    id = node.id().as_str(),
                    depth
                );
                continue;
            }

            let slot = index.entries.len();
            index.entries.push(Entry {
                id: node.id().clone(),
                kind: node.kind(),
                parent,
                children: Vec::new(),
                depth,
                initially_open: node.is_initially_open(),
                initially_selected: node.is_initially_selected(),
                empty: node.is_empty_folder(),
            });
            index.slots.insert(node.id().clone(), slot);
            match parent {
                Some(parent) => index.entries[parent].children.push(slot),
                None => index.roots.push(slot),
            }

            for child in node.children().iter().rev() {
                stack.push((child, Some(slot), depth + 1));
            }
        }

        index
    }

    // ── crate-internal slot access ──────────────────────────────────────

    #[inline]
    pub(crate) fn slot(&self, id: &str) -> Option<usize> {
        self.slots.get(id).copied()
    }

    #[inline]
    pub(crate) fn entry(&self, slot: usize) -> &Entry {
        &self.entries[slot]
    }

    #[inline]
    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[inline]
    pub(crate) fn root_slots(&self) -> &[usize] {
        &self.roots
    }

    /// Slots of the strict ancestors of `slot`, nearest first.
    pub(crate) fn ancestor_slots(&self, slot: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.entries[slot].parent, move |&s| self.entries[s].parent)
    }

    /// Slots of the strict descendants of `slot`, in document order.
    ///
    /// Pre-order layout makes a subtree one contiguous run of the arena.
    pub(crate) fn descendant_slots(&self, slot: usize) -> std::ops::Range<usize> {
        let depth = self.entries[slot].depth;
        let end = self.entries[slot + 1..]
            .iter()
            .position(|entry| entry.depth <= depth)
            .map_or(self.entries.len(), |offset| slot + 1 + offset);
        slot + 1..end
    }

    // ── public reader API ───────────────────────────────────────────────

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` names a node in this snapshot.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Kind of the node, if present.
    #[must_use]
    pub fn kind(&self, id: &str) -> Option<NodeKind> {
        self.slot(id).map(|slot| self.entries[slot].kind)
    }

    /// Whether `id` names a folder. Unknown ids are not folders.
    #[must_use]
    pub fn is_folder(&self, id: &str) -> bool {
        self.kind(id).is_some_and(NodeKind::is_folder)
    }

    /// Whether `id` names a folder that can be opened.
    ///
    /// Folders marked empty that have no children are not expandable.
    #[must_use]
    pub fn is_expandable(&self, id: &str) -> bool {
        self.slot(id)
            .is_some_and(|slot| self.entries[slot].is_expandable())
    }

    /// Whether `id` names a root-level node.
    #[must_use]
    pub fn is_root(&self, id: &str) -> bool {
        self.slot(id)
            .is_some_and(|slot| self.entries[slot].parent.is_none())
    }

    /// Nesting depth of the node (roots are depth 0).
    #[must_use]
    pub fn depth(&self, id: &str) -> Option<usize> {
        self.slot(id).map(|slot| self.entries[slot].depth)
    }

    /// Root-level nodes in document order.
    pub fn roots(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.roots.iter().map(|&slot| &self.entries[slot].id)
    }

    /// Direct children of `id` in document order. Empty for items and
    /// unknown ids.
    pub fn children_of(&self, id: &str) -> impl Iterator<Item = &NodeId> + '_ {
        self.slot(id)
            .map(|slot| self.entries[slot].children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&slot| &self.entries[slot].id)
    }

    /// Parent of `id`, `None` for roots and unknown ids.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&NodeId> {
        let slot = self.slot(id)?;
        self.entries[slot]
            .parent
            .map(|parent| &self.entries[parent].id)
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: &str) -> impl Iterator<Item = &NodeId> + '_ {
        self.slot(id)
            .into_iter()
            .flat_map(move |slot| self.ancestor_slots(slot))
            .map(|slot| &self.entries[slot].id)
    }

    /// Strict descendants of `id` in document order.
    pub fn descendants(&self, id: &str) -> impl Iterator<Item = &NodeId> + '_ {
        let range = self
            .slot(id)
            .map_or(0..0, |slot| self.descendant_slots(slot));
        self.entries[range].iter().map(|entry| &entry.id)
    }

    /// The root-level folder enclosing `id` (or `id` itself when it is a
    /// root folder). `None` for root items and unknown ids.
    #[must_use]
    pub fn root_folder_of(&self, id: &str) -> Option<&NodeId> {
        let slot = self.slot(id)?;
        let root = self.ancestor_slots(slot).last().unwrap_or(slot);
        let entry = &self.entries[root];
        entry.is_folder().then_some(&entry.id)
    }

    /// Every folder id in document order.
    pub fn folders(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.is_folder())
            .map(|entry| &entry.id)
    }

    /// Every node id in document order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.entries.iter().map(|entry| &entry.id)
    }
}

impl From<&[TreeNode]> for TreeIndex {
    fn from(roots: &[TreeNode]) -> Self {
        Self::from_roots(roots)
    }
}

impl From<&Vec<TreeNode>> for TreeIndex {
    fn from(roots: &Vec<TreeNode>) -> Self {
        Self::from_roots(roots)
    }
}

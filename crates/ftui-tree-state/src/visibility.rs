//! Flattened visible-row resolution.
//!
//! A node is visible iff every folder above it is open. The visible sequence
//! is the pre-order walk of the tree that skips the contents of closed
//! folders, so for a fixed tree and open set it always equals document order
//! restricted to reachable rows.

use std::collections::BTreeSet;

use crate::index::TreeIndex;
use crate::node::NodeId;

/// Compute the visible ids for `tree` given the open folder set.
///
/// Items are never descended into. Folders are descended into only when
/// their id is in `open`.
#[must_use]
pub fn compute_visible(tree: &TreeIndex, open: &BTreeSet<NodeId>) -> Vec<NodeId> {
    let entries = tree.entries();
    let mut visible = Vec::with_capacity(tree.root_slots().len());
    let mut slot = 0;
    // Pre-order arena: a closed folder's subtree is one contiguous run that
    // can be skipped in a single jump.
    while slot < entries.len() {
        let entry = &entries[slot];
        visible.push(entry.id.clone());
        if entry.is_folder() && !open.contains(entry.id.as_str()) {
            slot = tree.descendant_slots(slot).end;
        } else {
            slot += 1;
        }
    }
    visible
}

/// The visible row immediately after `id`.
///
/// Returns `None` when `id` is the last visible row or not visible at all.
#[must_use]
pub fn next_visible<'a>(visible: &'a [NodeId], id: &str) -> Option<&'a NodeId> {
    let position = visible.iter().position(|v| v.as_str() == id)?;
    visible.get(position + 1)
}

/// Whether `id` is the first visible row.
#[must_use]
pub fn is_first_visible(visible: &[NodeId], id: &str) -> bool {
    visible.first().is_some_and(|first| first.as_str() == id)
}

/// First visible row that is selected, if any.
///
/// Tree views scroll this row into view when they are first mounted.
#[must_use]
pub fn first_visible_selection<'a>(
    visible: &'a [NodeId],
    selected: &BTreeSet<NodeId>,
) -> Option<&'a NodeId> {
    visible.iter().find(|id| selected.contains(id.as_str()))
}

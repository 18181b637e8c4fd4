//! Host-supplied tree nodes.
//!
//! A [`TreeNode`] is the description of one row the host wants to show:
//! an identity, a [`NodeKind`], ordered children and the flags that are
//! consulted once when a tree view is mounted.
//!
//! # Example
//!
//! ```
//! use ftui_tree_state::{NodeKind, TreeNode};
//!
//! let docs = TreeNode::folder("docs")
//!     .initially_open(true)
//!     .child(TreeNode::item("readme"))
//!     .child(TreeNode::item("changelog").initially_selected(true));
//!
//! assert_eq!(docs.id().as_str(), "docs");
//! assert_eq!(docs.kind(), NodeKind::Folder);
//! assert_eq!(docs.children().len(), 2);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Stable identity of a node, unique across the whole tree.
///
/// Cloning is a reference-count bump. Sets of ids can be queried with a
/// plain `&str` because `NodeId` borrows as `str`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create an id from any string-like value.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Whether a node can hold children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Expandable container.
    Folder,
    /// Leaf row.
    #[default]
    Item,
}

impl NodeKind {
    /// `true` for [`NodeKind::Folder`].
    #[inline]
    #[must_use]
    pub const fn is_folder(self) -> bool {
        matches!(self, Self::Folder)
    }
}

/// A node in the host's tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    id: NodeId,
    kind: NodeKind,
    children: Vec<TreeNode>,
    initially_open: bool,
    initially_selected: bool,
    empty: bool,
}

impl TreeNode {
    fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            children: Vec::new(),
            initially_open: false,
            initially_selected: false,
            empty: false,
        }
    }

    /// Create a folder node.
    #[must_use]
    pub fn folder(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Folder)
    }

    /// Create a leaf item node.
    #[must_use]
    pub fn item(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Item)
    }

    /// Add a child node.
    ///
    /// Items never hold children; a child added to an item is dropped.
    #[must_use]
    pub fn child(mut self, node: TreeNode) -> Self {
        if self.kind.is_folder() {
            self.children.push(node);
        }
        self
    }

    /// Set children from a vec.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<TreeNode>) -> Self {
        if self.kind.is_folder() {
            self.children = nodes;
        }
        self
    }

    /// Set children from possibly sparse slots.
    ///
    /// Hosts that populate folders asynchronously may hand over placeholder
    /// slots; `None` entries are skipped.
    #[must_use]
    pub fn with_child_slots<I>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = Option<TreeNode>>,
    {
        if self.kind.is_folder() {
            self.children = slots.into_iter().flatten().collect();
        }
        self
    }

    /// Open this folder when the tree view is first mounted.
    #[must_use]
    pub fn initially_open(mut self, open: bool) -> Self {
        self.initially_open = open && self.kind.is_folder();
        self
    }

    /// Select this node when the tree view is first mounted.
    #[must_use]
    pub fn initially_selected(mut self, selected: bool) -> Self {
        self.initially_selected = selected;
        self
    }

    /// Mark a folder as having no content.
    ///
    /// An empty folder without children cannot be expanded. A folder that is
    /// merely not populated yet should leave this unset.
    #[must_use]
    pub fn empty(mut self, empty: bool) -> Self {
        self.empty = empty && self.kind.is_folder();
        self
    }

    /// Node identity.
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Folder or item.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Whether this node is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Whether the folder starts open.
    #[must_use]
    pub fn is_initially_open(&self) -> bool {
        self.initially_open
    }

    /// Whether the node starts selected.
    #[must_use]
    pub fn is_initially_selected(&self) -> bool {
        self.initially_selected
    }

    /// Whether the folder is marked as empty.
    #[must_use]
    pub fn is_empty_folder(&self) -> bool {
        self.empty
    }
}

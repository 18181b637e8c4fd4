#![forbid(unsafe_code)]

//! Headless state for FrankenTUI tree views.
//!
//! This crate owns what a tree view *knows* and nothing about how it is
//! drawn: which folders are open, which rows are selected, and which rows
//! are currently visible. Hosts describe their tree with [`TreeNode`],
//! index each snapshot with [`TreeIndex`] and drive a [`TreeEngine`] with
//! [`Action`]s.
//!
//! # Example
//!
//! ```
//! use ftui_tree_state::{
//!     Action, SelectionMode, TreeConfig, TreeEngine, TreeIndex, TreeNode,
//! };
//!
//! let tree = TreeIndex::from_roots(&[
//!     TreeNode::folder("src")
//!         .child(TreeNode::item("main.rs"))
//!         .child(TreeNode::item("lib.rs")),
//!     TreeNode::item("Cargo.toml"),
//! ]);
//!
//! let mut engine = TreeEngine::new(
//!     TreeConfig::new().selection_mode(SelectionMode::DefaultCascading),
//! );
//! let state = engine.mount(&tree).unwrap();
//! assert_eq!(state.visible_ids().len(), 2);
//!
//! let t = engine.apply(&tree, Action::expand("src")).unwrap();
//! assert_eq!(t.state.visible_ids().len(), 4);
//!
//! let t = engine.apply(&tree, Action::select("main.rs")).unwrap();
//! let t2 = engine.apply(&tree, Action::select("lib.rs")).unwrap();
//! assert!(!t.state.is_selected("src"));
//! assert!(t2.state.is_selected("src"));
//! ```
//!
//! # Feature flags
//!
//! - `tracing`: a `tree_state.apply` span per transition plus debug events
//!   for no-ops and rejected actions.
//! - `state-persistence`: serde derives on [`TreePersistState`],
//!   [`NodeId`] and [`SelectionMode`].

pub mod config;
pub mod engine;
pub mod error;
pub mod expansion;
pub mod index;
pub mod node;
pub mod selection;
pub mod visibility;

pub use config::{Capabilities, TreeConfig};
pub use engine::{Action, Affected, EngineState, Transition, TreeEngine, TreePersistState};
pub use error::{Result, TreeStateError};
pub use expansion::ExpansionState;
pub use index::TreeIndex;
pub use node::{NodeId, NodeKind, TreeNode};
pub use selection::{SELECT_ALL_ID, SelectionMode, SelectionState};

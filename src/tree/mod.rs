//! Tree projection of the flat node set.
//!
//! `builder` turns persisted records into nested [`TreeNode`]s; `edit` applies
//! structural changes to an already-built forest (used by the client cache).

pub mod builder;
pub mod edit;
pub mod node;

pub use builder::{build_forest, build_subtree};
pub use node::{Forest, TreeNode};

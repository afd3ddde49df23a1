//! Grove: Hierarchical File/Folder Explorer
//!
//! A persisted forest of folders and files addressed by id. The store keeps
//! flat parent-pointer records, the tree builder turns them into nested
//! views, the mutation engine applies creates, renames and cascading deletes,
//! and the client cache shows edits optimistically until the server answers.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod server;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod view;
pub mod wire;

pub use client::{ExplorerSession, ExplorerTransport, HttpTransport, LocalTransport, TreeCache};
pub use engine::{MutationEngine, NodeEdit};
pub use error::{ApiError, StorageError};
pub use store::{MemoryNodeStore, Node, NodeStore, SledNodeStore};
pub use tree::{build_forest, Forest, TreeNode};
pub use types::NodeId;
pub use view::{ViewAction, ViewState};

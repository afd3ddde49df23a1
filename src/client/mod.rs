//! Client side of the explorer: tree cache, optimistic patches, transports
//! and the session tying them together.

pub mod cache;
pub mod patch;
pub mod session;
pub mod transport;

pub use cache::{CacheSnapshot, LoadStatus, Settlement, TreeCache};
pub use patch::{OperationId, OptimisticPatch, PatchParent, PatchState};
pub use session::ExplorerSession;
pub use transport::{ExplorerTransport, HttpTransport, LocalTransport};

//! Sled-backed node store.
//!
//! Two trees: `nodes` maps id -> bincode record, `children` is the parent
//! index keyed by `parent segment | created_at | id`. Both are written in one
//! sled transaction, so a single store call is never half-applied.

use super::{order_nodes, MonotonicClock, NewNode, Node, NodeStore, NodeUpdate};
use crate::error::StorageError;
use crate::types::{NodeId, Timestamp};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;
use tracing::warn;

const NODES_TREE: &str = "nodes";
const CHILDREN_TREE: &str = "children";

const ROOT_SEGMENT: u8 = 0x00;
const CHILD_SEGMENT: u8 = 0x01;
/// Never valid UTF-8, so it cannot occur inside an id
const SEGMENT_END: u8 = 0xff;

/// Durable node store
pub struct SledNodeStore {
    db: sled::Db,
    nodes: sled::Tree,
    children: sled::Tree,
    clock: MonotonicClock,
}

impl SledNodeStore {
    /// Open (or create) a store at `path`
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Store backed by a throwaway database, removed on drop
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let nodes = db.open_tree(NODES_TREE)?;
        let children = db.open_tree(CHILDREN_TREE)?;

        let mut newest: Option<Timestamp> = None;
        for entry in nodes.iter() {
            let (_, value) = entry?;
            let node: Node = bincode::deserialize(&value)?;
            if newest.map_or(true, |ts| node.created_at > ts) {
                newest = Some(node.created_at);
            }
        }

        Ok(Self {
            db,
            nodes,
            children,
            clock: MonotonicClock::starting_after(newest),
        })
    }

    fn decode(value: &[u8]) -> Result<Node, StorageError> {
        Ok(bincode::deserialize(value)?)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

fn parent_segment(parent_id: Option<&NodeId>) -> Vec<u8> {
    match parent_id {
        None => vec![ROOT_SEGMENT],
        Some(id) => {
            let mut key = Vec::with_capacity(id.as_bytes().len() + 2);
            key.push(CHILD_SEGMENT);
            key.extend_from_slice(id.as_bytes());
            key.push(SEGMENT_END);
            key
        }
    }
}

fn index_key(node: &Node) -> Result<Vec<u8>, StorageError> {
    let nanos = node.created_at.timestamp_nanos_opt().ok_or_else(|| {
        StorageError::Serialization(format!(
            "created_at out of range for node {}",
            node.id
        ))
    })?;
    // Flip the sign bit so byte order matches numeric order
    let ordered = (nanos as u64) ^ (1 << 63);

    let mut key = parent_segment(node.parent_id.as_ref());
    key.extend_from_slice(&ordered.to_be_bytes());
    key.extend_from_slice(node.id.as_bytes());
    Ok(key)
}

fn transaction_error(err: TransactionError<()>) -> StorageError {
    match err {
        TransactionError::Storage(e) => StorageError::Database(e),
        TransactionError::Abort(()) => {
            StorageError::Unavailable("node store transaction aborted".to_string())
        }
    }
}

impl NodeStore for SledNodeStore {
    fn get(&self, id: &NodeId) -> Result<Node, StorageError> {
        match self.nodes.get(id.as_bytes())? {
            Some(value) => Self::decode(&value),
            None => Err(StorageError::NotFound(id.clone())),
        }
    }

    fn get_children(&self, parent_id: &NodeId) -> Result<Vec<Node>, StorageError> {
        let mut children = Vec::new();
        for entry in self.children.scan_prefix(parent_segment(Some(parent_id))) {
            let (_, child_id) = entry?;
            match self.nodes.get(&child_id)? {
                Some(value) => children.push(Self::decode(&value)?),
                None => warn!(
                    parent_id = %parent_id,
                    child_id = %String::from_utf8_lossy(&child_id),
                    "Parent index references a missing node"
                ),
            }
        }
        Ok(children)
    }

    fn get_all(&self) -> Result<Vec<Node>, StorageError> {
        let mut nodes = Vec::new();
        for entry in self.nodes.iter() {
            let (_, value) = entry?;
            nodes.push(Self::decode(&value)?);
        }
        order_nodes(&mut nodes);
        Ok(nodes)
    }

    fn insert(&self, fields: NewNode) -> Result<Node, StorageError> {
        let node = Node {
            id: NodeId::generate(),
            name: fields.name,
            is_folder: fields.is_folder,
            parent_id: fields.parent_id,
            content: fields.content,
            created_at: self.clock.next(),
        };
        let encoded = bincode::serialize(&node)?;
        let child_key = index_key(&node)?;

        (&self.nodes, &self.children)
            .transaction(|(nodes, children)| {
                nodes.insert(node.id.as_bytes(), encoded.as_slice())?;
                children.insert(child_key.as_slice(), node.id.as_bytes())?;
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(transaction_error)?;
        self.flush()?;
        Ok(node)
    }

    fn update(&self, id: &NodeId, update: NodeUpdate) -> Result<Node, StorageError> {
        let mut node = self.get(id)?;
        update.apply_to(&mut node);
        let encoded = bincode::serialize(&node)?;
        self.nodes.insert(id.as_bytes(), encoded)?;
        self.flush()?;
        Ok(node)
    }

    fn delete(&self, id: &NodeId) -> Result<(), StorageError> {
        let node = self.get(id)?;
        let child_key = index_key(&node)?;

        (&self.nodes, &self.children)
            .transaction(|(nodes, children)| {
                nodes.remove(node.id.as_bytes())?;
                children.remove(child_key.as_slice())?;
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(transaction_error)?;
        self.flush()?;
        Ok(())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.nodes.len())
    }
}

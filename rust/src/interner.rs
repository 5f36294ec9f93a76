//! Task name index.
//!
//! Maps task names to dense integer node IDs so the passes can work on plain vectors.

use rustc_hash::FxHashMap;

/// Dense node ID (u32 for compact storage and fast hashing).
pub type NodeId = u32;

/// Bidirectional mapping between task names and node IDs.
///
/// IDs are handed out in insertion order, so iterating `0..len()` replays the
/// order in which tasks were defined.
#[derive(Debug, Clone)]
pub struct TaskNameIndex {
    to_id: FxHashMap<String, NodeId>,
    names: Vec<String>,
}

impl TaskNameIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Register a new name.
    ///
    /// Returns `Err(existing_id)` if the name is already registered; the first
    /// registration is never replaced.
    pub fn insert(&mut self, name: &str) -> Result<NodeId, NodeId> {
        if let Some(&id) = self.to_id.get(name) {
            return Err(id);
        }
        let id = self.names.len() as NodeId;
        self.names.push(name.to_string());
        self.to_id.insert(name.to_string(), id);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.to_id.get(name).copied()
    }

    #[inline]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(id as usize).map(|s| s.as_str())
    }

    /// All names in ID order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for TaskNameIndex {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

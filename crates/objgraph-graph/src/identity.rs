use crate::NodeId;
use objgraph_core::Value;
use std::collections::HashMap;

/// Maps explored values to node ids.
///
/// Reference values are keyed by the address of their shared allocation. The
/// registry keeps every value it has seen alive until it is dropped, so an
/// address can never be recycled by an unrelated value during one exploration.
/// Scalars and errors are never interned.
#[derive(Default)]
pub struct IdentityRegistry {
    by_address: HashMap<usize, NodeId>,
    values: HashMap<NodeId, Value>,
    arena: Vec<Value>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing id of `value`, if it was registered and not forgotten.
    pub fn lookup(&self, value: &Value) -> Option<NodeId> {
        value
            .address()
            .and_then(|addr| self.by_address.get(&addr).copied())
    }

    pub fn register(&mut self, id: NodeId, value: &Value) {
        if let Some(addr) = value.address() {
            self.by_address.insert(addr, id);
        }
        self.values.insert(id, value.clone());
        self.arena.push(value.clone());
    }

    /// Drops the id mapping; the value itself stays retained.
    pub fn forget(&mut self, id: NodeId) {
        if let Some(value) = self.values.remove(&id) {
            if let Some(addr) = value.address() {
                if self.by_address.get(&addr) == Some(&id) {
                    self.by_address.remove(&addr);
                }
            }
        }
    }

    pub fn value(&self, id: NodeId) -> Option<&Value> {
        self.values.get(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of values kept alive, including forgotten ones.
    pub fn retained(&self) -> usize {
        self.arena.len()
    }
}

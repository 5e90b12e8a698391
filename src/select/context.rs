use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::dom::NodeId;

/// A key-value bag threaded through a selection.
///
/// User entries are never touched by the engine and remain visible to
/// custom selectors. The driver derives a per-selection copy carrying its
/// own bookkeeping, so the caller's context is never mutated in place.
#[derive(Clone, Debug, Default)]
pub struct Context {
    values: HashMap<String, String>,
    origin: Option<NodeId>,
    memo: Rc<RefCell<HashMap<usize, Rc<HashSet<NodeId>>>>>,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    /// Set a user entry, returning any prior value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Read a user entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The selection scope origin, present only in driver-derived copies.
    pub(crate) fn origin(&self) -> Option<NodeId> {
        self.origin
    }

    /// Derive the per-selection copy used during one driver walk.
    pub(crate) fn derive(&self, origin: NodeId) -> Context {
        Context {
            values: self.values.clone(),
            origin: Some(origin),
            memo: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Fetch a node-set computed earlier in this selection.
    pub(crate) fn nodeset_memo(&self, key: usize) -> Option<Rc<HashSet<NodeId>>> {
        self.memo.borrow().get(&key).cloned()
    }

    /// Store a node-set for the rest of this selection.
    pub(crate) fn store_nodeset_memo(&self, key: usize, set: Rc<HashSet<NodeId>>) {
        self.memo.borrow_mut().insert(key, set);
    }
}

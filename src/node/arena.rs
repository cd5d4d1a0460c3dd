//! Node storage.
//!
//! The arena owns every node created during a session. Nodes are never
//! freed individually: dropping a chain from all containers leaves its nodes
//! in the arena, so a [`NodeRef`] can not dangle.

use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{NodeKind, NodeRef, NodeType, Variant};
use crate::errors::{BindError, Result};

/// Source of process-unique node identities.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A node: identity, chain links and body.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: u64,
    pub(crate) next: Option<NodeRef>,
    pub(crate) prev: Option<NodeRef>,
    pub kind: NodeKind,
}

impl Node {
    /// Identity, unique within the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn next(&self) -> Option<NodeRef> {
        self.next
    }

    pub fn prev(&self) -> Option<NodeRef> {
        self.prev
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }
}

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new, unlinked node.
    pub fn alloc(&mut self, kind: impl Into<NodeKind>) -> NodeRef {
        let kind = kind.into();
        let r = NodeRef(self.nodes.len() as u32);
        let id = fresh_id();
        crate::log::trace!(node = %r, id, kind = kind.node_type().name(), "alloc node");
        self.nodes.push(Node {
            id,
            next: None,
            prev: None,
            kind,
        });
        r
    }

    /// Zero-valued node of the variant called `name`.
    pub fn create(&mut self, name: &str) -> Result<NodeRef> {
        let ty = NodeType::from_name(name)
            .ok_or_else(|| BindError::unknown_variant(name, &NodeType::NAMES))?;
        Ok(self.alloc(ty.instantiate()))
    }

    pub fn get(&self, r: NodeRef) -> Option<&Node> {
        self.nodes.get(r.index())
    }

    pub fn kind(&self, r: NodeRef) -> &NodeKind {
        &self[r].kind
    }

    pub fn kind_mut(&mut self, r: NodeRef) -> &mut NodeKind {
        &mut self[r].kind
    }

    pub fn next(&self, r: NodeRef) -> Option<NodeRef> {
        self[r].next
    }

    pub fn prev(&self, r: NodeRef) -> Option<NodeRef> {
        self[r].prev
    }

    /// Raw link write; callers keep both directions consistent.
    pub(crate) fn set_next(&mut self, r: NodeRef, next: Option<NodeRef>) {
        self[r].next = next;
    }

    pub(crate) fn set_prev(&mut self, r: NodeRef, prev: Option<NodeRef>) {
        self[r].prev = prev;
    }

    /// Number of nodes ever allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk a chain from `head` following `next` links.
    pub fn iter(&self, head: Option<NodeRef>) -> Chain<'_> {
        Chain {
            arena: self,
            cur: head,
            budget: self.nodes.len(),
        }
    }
}

impl Index<NodeRef> for NodeArena {
    type Output = Node;

    fn index(&self, r: NodeRef) -> &Node {
        &self.nodes[r.index()]
    }
}

impl IndexMut<NodeRef> for NodeArena {
    fn index_mut(&mut self, r: NodeRef) -> &mut Node {
        &mut self.nodes[r.index()]
    }
}

/// Forward iterator over a chain.
///
/// Stops after as many steps as the arena has nodes, so a chain closed into
/// a ring through raw `next` writes can not hang the caller.
pub struct Chain<'a> {
    arena: &'a NodeArena,
    cur: Option<NodeRef>,
    budget: usize,
}

impl Iterator for Chain<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let cur = self.cur?;
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;
        self.cur = self.arena.get(cur).and_then(|n| n.next);
        Some(cur)
    }
}

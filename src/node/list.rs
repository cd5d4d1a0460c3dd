//! Chain operations. Every operation takes and returns chain heads.

use std::collections::HashSet;

use super::{NodeArena, NodeKind, NodeRef, Variant};
use crate::errors::{BindError, Result};

impl NodeArena {
    /// Splice the chain starting at `new` after `cur`.
    ///
    /// `cur == None` prepends; `head == None` yields `new`. Returns the
    /// head of the resulting chain.
    pub fn insert_after(
        &mut self,
        head: Option<NodeRef>,
        cur: Option<NodeRef>,
        new: Option<NodeRef>,
    ) -> Result<Option<NodeRef>> {
        let Some(new) = new else {
            return Ok(head);
        };
        let Some(head) = head else {
            self.detach_prev(new);
            return Ok(Some(new));
        };
        let last = self.check_splice(head, cur, new)?;
        self.detach_prev(new);

        let Some(cur) = cur else {
            self.link(last, head);
            crate::log::debug!(new = %new, head = %head, "prepend chain");
            return Ok(Some(new));
        };
        let after = self.next(cur);
        self.link(cur, new);
        self.set_next(last, after);
        if let Some(after) = after {
            self.set_prev(after, Some(last));
        }
        crate::log::debug!(new = %new, cur = %cur, "insert chain after");
        Ok(Some(head))
    }

    /// Splice the chain starting at `new` before `cur`.
    ///
    /// `cur == head` makes `new` the head; `cur == None` appends at the
    /// tail; `head == None` yields `new`.
    pub fn insert_before(
        &mut self,
        head: Option<NodeRef>,
        cur: Option<NodeRef>,
        new: Option<NodeRef>,
    ) -> Result<Option<NodeRef>> {
        let Some(new) = new else {
            return Ok(head);
        };
        let Some(head) = head else {
            self.detach_prev(new);
            return Ok(Some(new));
        };
        let last = self.check_splice(head, cur, new)?;
        self.detach_prev(new);

        let Some(cur) = cur else {
            if let Some(tail) = self.tail(Some(head)) {
                self.link(tail, new);
            }
            crate::log::debug!(new = %new, head = %head, "append chain");
            return Ok(Some(head));
        };
        let before = self.prev(cur);
        self.link(last, cur);
        match before {
            Some(before) if cur != head => {
                self.link(before, new);
                crate::log::debug!(new = %new, cur = %cur, "insert chain before");
                Ok(Some(head))
            }
            _ => {
                crate::log::debug!(new = %new, head = %head, "prepend chain");
                Ok(Some(new))
            }
        }
    }

    /// Unlink `cur` from the chain at `head` and clear its own links.
    pub fn delete(&mut self, head: Option<NodeRef>, cur: Option<NodeRef>) -> Option<NodeRef> {
        let Some(cur) = cur else {
            return head;
        };
        let head = head?;
        let prev = self.prev(cur);
        let next = self.next(cur);
        if let Some(prev) = prev {
            self.set_next(prev, next);
        }
        if let Some(next) = next {
            self.set_prev(next, prev);
        }
        self.set_next(cur, None);
        self.set_prev(cur, None);
        crate::log::debug!(node = %cur, "delete from chain");
        if cur == head { next } else { Some(head) }
    }

    /// Deep copy of a chain, including owned sub-chains, with fresh ids.
    pub fn copy_list(&mut self, head: Option<NodeRef>) -> Option<NodeRef> {
        let originals: Vec<NodeRef> = self.iter(head).collect();
        let mut copy_head = None;
        let mut prev: Option<NodeRef> = None;
        for original in originals {
            let mut kind = self.kind(original).clone();
            for (key, sub) in kind.sub_chains() {
                let copied = self.copy_list(sub);
                if let Some(slot) = kind.sub_chain_mut(key) {
                    *slot = copied;
                }
            }
            let copy = self.alloc(kind);
            match prev {
                Some(p) => self.link(p, copy),
                None => copy_head = Some(copy),
            }
            prev = Some(copy);
        }
        copy_head
    }

    /// Last node of the chain.
    pub fn tail(&self, head: Option<NodeRef>) -> Option<NodeRef> {
        self.iter(head).last()
    }

    /// Number of nodes in the chain.
    pub fn chain_len(&self, head: Option<NodeRef>) -> usize {
        self.iter(head).count()
    }

    /// Replace the sub-chain stored under `key` of `container` and return
    /// the previous one, now owned by the caller.
    pub fn adopt_list(
        &mut self,
        container: NodeRef,
        key: &str,
        new_head: Option<NodeRef>,
    ) -> Result<Option<NodeRef>> {
        let variant = self.kind(container).node_type().name();
        if !self.kind(container).has_sub_chain(key) {
            return Err(BindError::unknown_key(
                variant,
                key,
                &self.kind(container).keys(),
            ));
        }
        if self.reachable(new_head).contains(&container) {
            return Err(BindError::ChainIntegrity {
                message: format!("a {variant} can not contain itself"),
            });
        }
        if let Some(new_head) = new_head {
            self.detach_prev(new_head);
        }
        let old = match self.kind_mut(container).sub_chain_mut(key) {
            Some(slot) => std::mem::replace(slot, new_head),
            None => None,
        };
        crate::log::debug!(container = %container, key, "adopt sub-chain");
        Ok(old)
    }

    /// Every node reachable from `head` through `next` links and sub-chains,
    /// at any depth.
    pub fn reachable(&self, head: Option<NodeRef>) -> HashSet<NodeRef> {
        let mut seen = HashSet::new();
        let mut pending: Vec<NodeRef> = head.into_iter().collect();
        while let Some(start) = pending.pop() {
            for r in self.iter(Some(start)) {
                if !seen.insert(r) {
                    break;
                }
                pending.extend(self.kind(r).sub_chains().into_iter().filter_map(|(_, sub)| sub));
            }
        }
        seen
    }

    /// `a.next = b` and `b.prev = a`.
    fn link(&mut self, a: NodeRef, b: NodeRef) {
        self.set_next(a, Some(b));
        self.set_prev(b, Some(a));
    }

    /// Cut the link from `r` back into whatever chain it was taken from.
    fn detach_prev(&mut self, r: NodeRef) {
        if let Some(prev) = self.prev(r) {
            if self.next(prev) == Some(r) {
                self.set_next(prev, None);
            }
            self.set_prev(r, None);
        }
    }

    /// Validate splicing the chain at `new` into the chain at `head` next to
    /// `cur`. Returns the tail of the inserted chain.
    ///
    /// Neither chain may reach the other through links or nested
    /// sub-chains, so the result stays acyclic at every depth.
    fn check_splice(
        &self,
        head: NodeRef,
        cur: Option<NodeRef>,
        new: NodeRef,
    ) -> Result<NodeRef> {
        let inserted = self.reachable(Some(new));
        let mut cur_seen = cur.is_none();
        for r in self.iter(Some(head)) {
            if inserted.contains(&r) {
                return Err(BindError::ChainIntegrity {
                    message: format!("node {r} is already part of the inserted chain"),
                });
            }
            cur_seen |= Some(r) == cur;
        }
        if !cur_seen {
            return Err(BindError::ChainIntegrity {
                message: "the reference node is not part of the chain".to_string(),
            });
        }
        let target = self.reachable(Some(head));
        if let Some(r) = self.iter(Some(new)).find(|r| target.contains(r)) {
            return Err(BindError::ChainIntegrity {
                message: format!("node {r} is already part of the target chain"),
            });
        }
        Ok(self.tail(Some(new)).unwrap_or(new))
    }
}

impl NodeKind {
    fn has_sub_chain(&self, key: &str) -> bool {
        self.sub_chains().iter().any(|(k, _)| *k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Glyph, HList, Kern};
    use crate::types::ScaledPoint;

    fn kern(arena: &mut NodeArena, pt: i64) -> NodeRef {
        arena.alloc(Kern {
            kern: ScaledPoint::pt(pt),
        })
    }

    /// Forward walk, asserting the backward walk mirrors it.
    fn walk(arena: &NodeArena, head: Option<NodeRef>) -> Vec<NodeRef> {
        let forward: Vec<_> = arena.iter(head).collect();
        if let Some(first) = forward.first() {
            assert_eq!(arena.prev(*first), None, "head has a prev link");
        }
        let mut backward = Vec::new();
        let mut cur = arena.tail(head);
        while let Some(r) = cur {
            backward.push(r);
            cur = arena.prev(r);
        }
        backward.reverse();
        assert_eq!(forward, backward);
        forward
    }

    #[test]
    fn insert_after_builds_chain() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let b = kern(&mut arena, 2);
        let c = kern(&mut arena, 3);
        let head = arena.insert_after(None, None, Some(a)).unwrap();
        let head = arena.insert_after(head, Some(a), Some(c)).unwrap();
        let head = arena.insert_after(head, Some(a), Some(b)).unwrap();
        assert_eq!(walk(&arena, head), [a, b, c]);
    }

    #[test]
    fn insert_after_none_prepends() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let b = kern(&mut arena, 2);
        let head = arena.insert_after(Some(a), None, Some(b)).unwrap();
        assert_eq!(walk(&arena, head), [b, a]);
    }

    #[test]
    fn insert_before_head_and_tail() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let b = kern(&mut arena, 2);
        let c = kern(&mut arena, 3);
        let head = arena.insert_before(Some(b), Some(b), Some(a)).unwrap();
        assert_eq!(head, Some(a));
        let head = arena.insert_before(head, None, Some(c)).unwrap();
        assert_eq!(walk(&arena, head), [a, b, c]);
    }

    #[test]
    fn insert_before_middle() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let b = kern(&mut arena, 2);
        let c = kern(&mut arena, 3);
        let head = arena.insert_after(Some(a), Some(a), Some(c)).unwrap();
        let head = arena.insert_before(head, Some(c), Some(b)).unwrap();
        assert_eq!(walk(&arena, head), [a, b, c]);
    }

    #[test]
    fn splices_whole_chain() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let d = kern(&mut arena, 4);
        let b = kern(&mut arena, 2);
        let c = kern(&mut arena, 3);
        let head = arena.insert_after(Some(a), Some(a), Some(d)).unwrap();
        let inner = arena.insert_after(Some(b), Some(b), Some(c)).unwrap();
        let head = arena.insert_after(head, Some(a), inner).unwrap();
        assert_eq!(walk(&arena, head), [a, b, c, d]);
    }

    #[test]
    fn nil_base_cases() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        assert_eq!(arena.insert_after(Some(a), Some(a), None).unwrap(), Some(a));
        assert_eq!(arena.insert_before(None, None, None).unwrap(), None);
        assert_eq!(arena.delete(Some(a), None), Some(a));
        assert_eq!(arena.delete(None, Some(a)), None);
        assert_eq!(arena.tail(None), None);
        assert_eq!(arena.copy_list(None), None);
    }

    #[test]
    fn delete_head_middle_tail() {
        let mut arena = NodeArena::new();
        let nodes: Vec<_> = (1..=4).map(|i| kern(&mut arena, i)).collect();
        let mut head = Some(nodes[0]);
        for pair in nodes.windows(2) {
            head = arena.insert_after(head, Some(pair[0]), Some(pair[1])).unwrap();
        }
        let head = arena.delete(head, Some(nodes[0]));
        assert_eq!(head, Some(nodes[1]));
        let head = arena.delete(head, Some(nodes[2]));
        let head = arena.delete(head, Some(nodes[3]));
        assert_eq!(walk(&arena, head), [nodes[1]]);
        assert_eq!(arena.next(nodes[2]), None);
        assert_eq!(arena.prev(nodes[2]), None);
    }

    #[test]
    fn rejects_cycles() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let b = kern(&mut arena, 2);
        let head = arena.insert_after(Some(a), Some(a), Some(b)).unwrap();
        let err = arena.insert_after(head, Some(b), Some(a)).unwrap_err();
        assert!(matches!(err, BindError::ChainIntegrity { .. }));
        assert_eq!(walk(&arena, head), [a, b]);
    }

    #[test]
    fn rejects_foreign_reference_node() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let stray = kern(&mut arena, 2);
        let b = kern(&mut arena, 3);
        let err = arena.insert_before(Some(a), Some(stray), Some(b)).unwrap_err();
        assert!(matches!(err, BindError::ChainIntegrity { .. }));
    }

    #[test]
    fn donor_chain_stays_well_formed() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let b = kern(&mut arena, 2);
        let x = kern(&mut arena, 9);
        let donor = arena.insert_after(Some(a), Some(a), Some(b)).unwrap();
        let target = arena.insert_after(Some(x), Some(x), Some(b)).unwrap();
        assert_eq!(walk(&arena, donor), [a]);
        assert_eq!(walk(&arena, target), [x, b]);
    }

    #[test]
    fn copy_is_independent() {
        let mut arena = NodeArena::new();
        let g = arena.alloc(Glyph {
            components: "A".into(),
            ..Glyph::default()
        });
        let k = kern(&mut arena, 2);
        let inner = arena.insert_after(Some(g), Some(g), Some(k)).unwrap();
        let b = arena.alloc(HList {
            list: inner,
            ..HList::default()
        });

        let copy = arena.copy_list(Some(b)).unwrap();
        assert_ne!(copy, b);
        assert_ne!(arena[copy].id(), arena[b].id());
        let NodeKind::HList(copied_box) = arena.kind(copy).clone() else {
            panic!("copy changed the variant");
        };
        let copied_inner: Vec<_> = arena.iter(copied_box.list).collect();
        assert_eq!(copied_inner.len(), 2);
        assert!(copied_inner.iter().all(|r| *r != g && *r != k));

        if let NodeKind::Glyph(glyph) = arena.kind_mut(copied_inner[0]) {
            glyph.components = "B".into();
        }
        let NodeKind::Glyph(original) = arena.kind(g) else {
            panic!("expected a glyph");
        };
        assert_eq!(original.components, "A");
    }

    #[test]
    fn adopt_returns_old_list() {
        let mut arena = NodeArena::new();
        let a = kern(&mut arena, 1);
        let b = kern(&mut arena, 2);
        let boxed = arena.alloc(HList {
            list: Some(a),
            ..HList::default()
        });
        let old = arena.adopt_list(boxed, "list", Some(b)).unwrap();
        assert_eq!(old, Some(a));
        assert!(matches!(arena.kind(boxed), NodeKind::HList(h) if h.list == Some(b)));

        let err = arena.adopt_list(boxed, "pre", None).unwrap_err();
        assert!(matches!(err, BindError::UnknownKey { .. }));
        let err = arena.adopt_list(boxed, "list", Some(boxed)).unwrap_err();
        assert!(matches!(err, BindError::ChainIntegrity { .. }));
    }

    #[test]
    fn discs_can_not_contain_each_other() {
        let mut arena = NodeArena::new();
        let d1 = arena.create("disc").unwrap();
        let d2 = arena.create("disc").unwrap();
        let d3 = arena.create("disc").unwrap();
        arena.adopt_list(d1, "replace", Some(d2)).unwrap();
        let err = arena.adopt_list(d2, "replace", Some(d1)).unwrap_err();
        assert!(matches!(err, BindError::ChainIntegrity { .. }));

        arena.adopt_list(d2, "pre", Some(d3)).unwrap();
        let err = arena.adopt_list(d3, "post", Some(d1)).unwrap_err();
        assert!(matches!(err, BindError::ChainIntegrity { .. }));

        assert_eq!(arena.reachable(Some(d1)).len(), 3);
        let copy = arena.copy_list(Some(d1));
        assert_eq!(arena.reachable(copy).len(), 3);
    }

    #[test]
    fn box_and_its_list_stay_apart() {
        let mut arena = NodeArena::new();
        let k = kern(&mut arena, 1);
        let boxed = arena.alloc(HList {
            list: Some(k),
            ..HList::default()
        });
        let err = arena.insert_after(Some(k), Some(k), Some(boxed)).unwrap_err();
        assert!(matches!(err, BindError::ChainIntegrity { .. }));
        assert_eq!(walk(&arena, Some(k)), [k]);

        let err = arena.insert_before(Some(boxed), None, Some(k)).unwrap_err();
        assert!(matches!(err, BindError::ChainIntegrity { .. }));
        assert_eq!(walk(&arena, Some(boxed)), [boxed]);
    }

    #[test]
    fn deleting_a_box_keeps_its_list() {
        let mut arena = NodeArena::new();
        let (a, b) = (kern(&mut arena, 1), kern(&mut arena, 2));
        let inner = arena.insert_after(Some(a), Some(a), Some(b)).unwrap();
        let boxed = arena.alloc(HList {
            list: inner,
            ..HList::default()
        });
        let (x, y) = (kern(&mut arena, 8), kern(&mut arena, 9));
        let mut head = Some(x);
        head = arena.insert_after(head, Some(x), Some(boxed)).unwrap();
        head = arena.insert_after(head, Some(boxed), Some(y)).unwrap();

        let head = arena.delete(head, Some(boxed));
        assert_eq!(walk(&arena, head), [x, y]);
        assert!(matches!(arena.kind(boxed), NodeKind::HList(h) if h.list == Some(a)));
        assert_eq!(walk(&arena, Some(a)), [a, b]);
    }
}

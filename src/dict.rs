// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Edge dictionary: the ordered set of active regions crossing the sweep line.
//
// The order is defined by a comparator that is evaluated at the current sweep
// event, so it cannot be baked into the structure. Every ordered operation
// takes the comparator as an argument instead.
//
// Nodes are threaded twice. A circular doubly linked list through a head node
// whose key is `None` gives constant-time neighbours. A treap over the same
// nodes, balanced by hashed insertion-order priorities, gives logarithmic
// searches. The head is never part of the tree.

use crate::bucketalloc::BucketAlloc;

/// Handle to a dictionary node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The head node. It is both the position before the first key and the
    /// position after the last one.
    pub const HEAD: NodeId = NodeId(0);

    /// Missing tree link.
    const NIL: NodeId = NodeId(u32::MAX);
}

struct DictNode<K> {
    key: Option<K>,
    next: NodeId,
    prev: NodeId,
    parent: NodeId,
    left: NodeId,
    right: NodeId,
    priority: u32,
}

pub struct Dict<K> {
    nodes: BucketAlloc<DictNode<K>>,
    root: NodeId,
    inserted: u32,
}

/// Scrambles an insertion counter into a treap priority. Deterministic, so
/// the same input always builds the same tree.
fn priority(seq: u32) -> u32 {
    let mut x = seq.wrapping_add(1).wrapping_mul(0x9E37_79B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^ (x >> 16)
}

impl<K: Copy> Dict<K> {
    pub fn new() -> Self {
        let mut nodes = BucketAlloc::new();
        let head = nodes.alloc(DictNode {
            key: None,
            next: NodeId::HEAD,
            prev: NodeId::HEAD,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
            priority: 0,
        });
        debug_assert_eq!(head, NodeId::HEAD.0);
        Dict {
            nodes,
            root: NodeId::NIL,
            inserted: 0,
        }
    }

    /// Inserts `key` in order, searching backwards from the end.
    pub fn insert<F>(&mut self, key: K, leq: F) -> NodeId
    where
        F: FnMut(K, K) -> bool,
    {
        self.insert_before(NodeId::HEAD, key, leq)
    }

    /// Inserts `key` just after the nearest node preceding `node` whose key
    /// is `<= key`, or first if there is none.
    pub fn insert_before<F>(&mut self, node: NodeId, key: K, mut leq: F) -> NodeId
    where
        F: FnMut(K, K) -> bool,
    {
        let after = self.last_leq_before(node, key, &mut leq);
        self.insert_after(after, key)
    }

    /// Unlinks `node` and releases its slot.
    pub fn remove(&mut self, node: NodeId) {
        debug_assert_ne!(node, NodeId::HEAD);
        let (next, prev) = {
            let n = self.node(node);
            (n.next, n.prev)
        };
        self.nodes[next.0].prev = prev;
        self.nodes[prev.0].next = next;

        // Rotate the node down to a leaf, then cut it off.
        loop {
            let (left, right) = {
                let n = self.node(node);
                (n.left, n.right)
            };
            let child = match (left == NodeId::NIL, right == NodeId::NIL) {
                (true, true) => break,
                (false, true) => left,
                (true, false) => right,
                (false, false) if self.node(left).priority > self.node(right).priority => left,
                (false, false) => right,
            };
            self.rotate_up(child);
        }
        let parent = self.node(node).parent;
        self.replace_child(parent, node, NodeId::NIL);
        self.nodes.free(node.0);
    }

    /// Returns the first node whose key is `>= key`, or the head if none.
    pub fn search<F>(&self, key: K, mut leq: F) -> NodeId
    where
        F: FnMut(K, K) -> bool,
    {
        let mut found = NodeId::HEAD;
        let mut x = self.root;
        while x != NodeId::NIL {
            let n = self.node(x);
            match n.key {
                Some(k) if leq(key, k) => {
                    found = x;
                    x = n.left;
                }
                _ => x = n.right,
            }
        }
        found
    }

    #[inline]
    pub fn key(&self, node: NodeId) -> Option<K> {
        self.node(node).key
    }

    #[inline]
    pub fn min(&self) -> NodeId {
        self.node(NodeId::HEAD).next
    }

    #[inline]
    pub fn max(&self) -> NodeId {
        self.node(NodeId::HEAD).prev
    }

    #[inline]
    pub fn succ(&self, node: NodeId) -> NodeId {
        self.node(node).next
    }

    #[inline]
    pub fn pred(&self, node: NodeId) -> NodeId {
        self.node(node).prev
    }

    /// Number of keys, not counting the head.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn node(&self, node: NodeId) -> &DictNode<K> {
        &self.nodes[node.0]
    }

    fn is_leq<F>(&self, node: NodeId, key: K, leq: &mut F) -> bool
    where
        F: FnMut(K, K) -> bool,
    {
        match self.node(node).key {
            Some(k) => leq(k, key),
            None => false,
        }
    }

    /// The nearest node before `node` whose key is `<= key`, or the head.
    fn last_leq_before<F>(&self, node: NodeId, key: K, leq: &mut F) -> NodeId
    where
        F: FnMut(K, K) -> bool,
    {
        // Almost always the direct predecessor.
        let prev = self.node(node).prev;
        if prev == NodeId::HEAD || self.is_leq(prev, key, leq) {
            return prev;
        }
        if node == NodeId::HEAD {
            return self.last_leq_in(self.root, key, leq).unwrap_or(NodeId::HEAD);
        }

        // Everything before `node` is its left subtree plus, for each
        // ancestor reached from the right, that ancestor and its left
        // subtree. Visit those nearest first.
        if let Some(found) = self.last_leq_in(self.node(node).left, key, leq) {
            return found;
        }
        let mut child = node;
        loop {
            let parent = self.node(child).parent;
            if parent == NodeId::NIL {
                return NodeId::HEAD;
            }
            if self.node(parent).right == child {
                if self.is_leq(parent, key, leq) {
                    return parent;
                }
                if let Some(found) = self.last_leq_in(self.node(parent).left, key, leq) {
                    return found;
                }
            }
            child = parent;
        }
    }

    /// The last node of the subtree at `root` whose key is `<= key`.
    fn last_leq_in<F>(&self, root: NodeId, key: K, leq: &mut F) -> Option<NodeId>
    where
        F: FnMut(K, K) -> bool,
    {
        let mut found = None;
        let mut x = root;
        while x != NodeId::NIL {
            if self.is_leq(x, key, leq) {
                found = Some(x);
                x = self.node(x).right;
            } else {
                x = self.node(x).left;
            }
        }
        found
    }

    /// Links a new node right after `after` in both threadings.
    fn insert_after(&mut self, after: NodeId, key: K) -> NodeId {
        let next = self.node(after).next;
        let new = NodeId(self.nodes.alloc(DictNode {
            key: Some(key),
            next,
            prev: after,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
            priority: priority(self.inserted),
        }));
        self.inserted = self.inserted.wrapping_add(1);
        self.nodes[after.0].next = new;
        self.nodes[next.0].prev = new;

        if self.root == NodeId::NIL {
            self.root = new;
        } else if after != NodeId::HEAD && self.node(after).right == NodeId::NIL {
            self.nodes[after.0].right = new;
            self.nodes[new.0].parent = after;
        } else {
            // `next` is the leftmost node of the subtree right of `after`
            // (of the whole tree when `after` is the head), so it has no
            // left child.
            debug_assert_eq!(self.node(next).left, NodeId::NIL);
            self.nodes[next.0].left = new;
            self.nodes[new.0].parent = next;
        }

        loop {
            let parent = self.node(new).parent;
            if parent == NodeId::NIL || self.node(parent).priority >= self.node(new).priority {
                break;
            }
            self.rotate_up(new);
        }
        new
    }

    /// Rotates `x` above its parent, keeping the in-order sequence.
    fn rotate_up(&mut self, x: NodeId) {
        let p = self.node(x).parent;
        let g = self.node(p).parent;
        if self.node(p).left == x {
            let moved = self.node(x).right;
            self.nodes[p.0].left = moved;
            if moved != NodeId::NIL {
                self.nodes[moved.0].parent = p;
            }
            self.nodes[x.0].right = p;
        } else {
            let moved = self.node(x).left;
            self.nodes[p.0].right = moved;
            if moved != NodeId::NIL {
                self.nodes[moved.0].parent = p;
            }
            self.nodes[x.0].left = p;
        }
        self.nodes[p.0].parent = x;
        self.nodes[x.0].parent = g;
        self.replace_child(g, p, x);
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent == NodeId::NIL {
            self.root = new;
        } else if self.node(parent).left == old {
            self.nodes[parent.0].left = new;
        } else {
            self.nodes[parent.0].right = new;
        }
    }

    /// Depth of the deepest node; zero when empty.
    #[cfg(test)]
    fn height(&self) -> usize {
        fn depth<K: Copy>(d: &Dict<K>, x: NodeId) -> usize {
            if x == NodeId::NIL {
                0
            } else {
                1 + depth(d, d.node(x).left).max(depth(d, d.node(x).right))
            }
        }
        depth(self, self.root)
    }

    /// Asserts that the tree's in-order walk is the list order and that
    /// priorities and parent links are consistent.
    #[cfg(test)]
    fn check(&self) {
        fn walk<K: Copy>(d: &Dict<K>, x: NodeId, out: &mut Vec<NodeId>) {
            if x == NodeId::NIL {
                return;
            }
            let n = d.node(x);
            for c in [n.left, n.right] {
                if c != NodeId::NIL {
                    assert_eq!(d.node(c).parent, x);
                    assert!(d.node(c).priority <= n.priority);
                }
            }
            walk(d, n.left, out);
            out.push(x);
            walk(d, n.right, out);
        }
        let mut in_order = Vec::new();
        walk(self, self.root, &mut in_order);
        let mut listed = Vec::new();
        let mut node = self.min();
        while node != NodeId::HEAD {
            listed.push(node);
            node = self.succ(node);
        }
        assert_eq!(in_order, listed);
        assert_eq!(listed.len(), self.len());
    }
}

impl<K: Copy> Default for Dict<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leq(a: i32, b: i32) -> bool {
        a <= b
    }

    fn keys(d: &Dict<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut node = d.min();
        while let Some(k) = d.key(node) {
            out.push(k);
            node = d.succ(node);
        }
        out
    }

    #[test]
    fn empty_dictionary_points_at_head() {
        let d: Dict<i32> = Dict::new();
        assert_eq!(d.min(), NodeId::HEAD);
        assert_eq!(d.max(), NodeId::HEAD);
        assert!(d.is_empty());
        assert_eq!(d.key(NodeId::HEAD), None);
    }

    #[test]
    fn inserts_keep_order() {
        let mut d = Dict::new();
        for k in [5, 1, 4, 2, 3] {
            d.insert(k, leq);
        }
        assert_eq!(keys(&d), vec![1, 2, 3, 4, 5]);
        assert_eq!(d.key(d.max()), Some(5));
        assert_eq!(d.len(), 5);
    }

    #[test]
    fn insert_before_walks_back_from_hint() {
        let mut d = Dict::new();
        let n10 = d.insert(10, leq);
        let n30 = d.insert(30, leq);
        let n20 = d.insert_before(n30, 20, leq);
        assert_eq!(d.pred(n20), n10);
        assert_eq!(d.succ(n20), n30);
        // A hint that is too low still lands right after the walk stops.
        let n5 = d.insert_before(n10, 5, leq);
        assert_eq!(d.min(), n5);
    }

    #[test]
    fn remove_relinks_neighbours_and_recycles() {
        let mut d = Dict::new();
        d.insert(1, leq);
        let n2 = d.insert(2, leq);
        d.insert(3, leq);
        d.remove(n2);
        assert_eq!(keys(&d), vec![1, 3]);
        let again = d.insert(2, leq);
        assert_eq!(again, n2);
        assert_eq!(keys(&d), vec![1, 2, 3]);
    }

    #[test]
    fn search_returns_first_not_less() {
        let mut d = Dict::new();
        for k in [1, 3, 5] {
            d.insert(k, leq);
        }
        assert_eq!(d.key(d.search(2, leq)), Some(3));
        assert_eq!(d.key(d.search(3, leq)), Some(3));
        assert_eq!(d.search(6, leq), NodeId::HEAD);
    }

    #[test]
    fn far_hint_finds_the_nearest_smaller_key() {
        let mut d = Dict::new();
        let nodes: Vec<NodeId> = (1..=100).map(|k| d.insert(k * 10, leq)).collect();
        let n = d.insert_before(nodes[89], 155, leq);
        assert_eq!(d.key(d.pred(n)), Some(150));
        assert_eq!(d.key(d.succ(n)), Some(160));
        let first = d.insert_before(nodes[50], 3, leq);
        assert_eq!(d.min(), first);
        d.check();
    }

    #[test]
    fn tree_matches_list_through_churn() {
        let mut d = Dict::new();
        let mut live = Vec::new();
        for i in 0..2000u32 {
            let k = (i.wrapping_mul(7919) % 1009) as i32;
            // Any node at or above the first key `>= k` is a valid hint.
            let mut hint = d.search(k, leq);
            for _ in 0..i % 5 {
                if hint != NodeId::HEAD {
                    hint = d.succ(hint);
                }
            }
            live.push(d.insert_before(hint, k, leq));
            if i % 3 == 2 {
                let victim = live.swap_remove((i as usize * 31) % live.len());
                d.remove(victim);
            }
            if i % 97 == 0 {
                d.check();
            }
        }
        d.check();
        let k = keys(&d);
        assert!(k.windows(2).all(|w| w[0] <= w[1]));
        while let Some(node) = live.pop() {
            d.remove(node);
        }
        assert!(d.is_empty());
        assert_eq!(d.min(), NodeId::HEAD);
    }

    #[test]
    fn searches_take_logarithmic_comparisons() {
        // Keys arriving in sweep order are the worst case for an unbalanced
        // structure.
        let n = 1 << 14;
        let mut d = Dict::new();
        for k in 0..n {
            d.insert(k, leq);
        }
        d.check();
        assert!(d.height() <= 64, "height {}", d.height());

        for target in [0, 1, n / 3, n - 1, n] {
            let mut calls = 0;
            let node = d.search(target, |a, b| {
                calls += 1;
                a <= b
            });
            assert_eq!(d.key(node), if target < n { Some(target) } else { None });
            assert!(calls <= 64, "{} comparisons to find {}", calls, target);
        }

        // A hint far above the insertion point.
        let mut calls = 0;
        d.insert_before(d.max(), -1, |a, b| {
            calls += 1;
            a <= b
        });
        assert_eq!(d.key(d.min()), Some(-1));
        assert!(calls <= 2 * 64 * 64, "{} comparisons for a far hint", calls);
    }

    #[test]
    fn comparator_may_carry_state() {
        // Reverse order through a captured flag.
        let descending = true;
        let cmp = |a: i32, b: i32| if descending { a >= b } else { a <= b };
        let mut d = Dict::new();
        for k in [2, 9, 4] {
            d.insert(k, cmp);
        }
        assert_eq!(keys(&d), vec![9, 4, 2]);
    }
}

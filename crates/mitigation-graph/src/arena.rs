use std::collections::HashMap;

use mitigation_common::AttackNode;

#[derive(Default)]
struct Cache {
    before: Option<Vec<i64>>,
    after: Option<Vec<i64>>,
}

struct Entry {
    node: AttackNode,
    cache: Cache,
}

/// An in-memory attack-graph chain addressed by integer node ids rather than
/// owned references (spec §9: "arena-allocated nodes addressed by integer
/// handles ... avoids cyclic ownership").
///
/// `all_before`/`all_after` results are cached per node; the cache for a
/// node's whole chain is invalidated whenever `detach` or `then` changes that
/// chain's structure.
#[derive(Default)]
pub struct GraphArena {
    entries: HashMap<i64, Entry>,
}

impl GraphArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: AttackNode) {
        self.entries.insert(node.id, Entry { node, cache: Cache::default() });
    }

    pub fn get(&self, id: i64) -> Option<&AttackNode> {
        self.entries.get(&id).map(|e| &e.node)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut AttackNode> {
        self.entries.get_mut(&id).map(|e| &mut e.node)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Walks `prv` from `id` to the chain head.
    pub fn first(&self, mut id: i64) -> i64 {
        while let Some(prv) = self.get(id).and_then(|n| n.prv) {
            id = prv;
        }
        id
    }

    /// Walks `nxt` from `id` to the chain tail.
    pub fn last(&self, mut id: i64) -> i64 {
        while let Some(nxt) = self.get(id).and_then(|n| n.nxt) {
            id = nxt;
        }
        id
    }

    /// Ancestors of `id`, nearest first, walking `prv`.
    pub fn all_before(&mut self, id: i64) -> Vec<i64> {
        if let Some(cached) = self.entries.get(&id).and_then(|e| e.cache.before.clone()) {
            return cached;
        }
        let mut result = Vec::new();
        let mut cur = self.get(id).and_then(|n| n.prv);
        while let Some(node_id) = cur {
            result.push(node_id);
            cur = self.get(node_id).and_then(|n| n.prv);
        }
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.cache.before = Some(result.clone());
        }
        result
    }

    /// Descendants of `id`, nearest first, walking `nxt`.
    pub fn all_after(&mut self, id: i64) -> Vec<i64> {
        if let Some(cached) = self.entries.get(&id).and_then(|e| e.cache.after.clone()) {
            return cached;
        }
        let mut result = Vec::new();
        let mut cur = self.get(id).and_then(|n| n.nxt);
        while let Some(node_id) = cur {
            result.push(node_id);
            cur = self.get(node_id).and_then(|n| n.nxt);
        }
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.cache.after = Some(result.clone());
        }
        result
    }

    /// The full chain `id` belongs to: ancestors, `id` itself, descendants.
    pub fn all(&mut self, id: i64) -> Vec<i64> {
        let mut out = self.all_before(id);
        out.reverse();
        out.push(id);
        out.extend(self.all_after(id));
        out
    }

    /// Detaches `id` from its neighbours and invalidates every cache in the
    /// chain it used to belong to.
    pub fn detach(&mut self, id: i64) {
        let chain = self.all(id);
        let (prv, nxt) = match self.get(id) {
            Some(n) => (n.prv, n.nxt),
            None => return,
        };
        if let Some(p) = prv {
            if let Some(p_node) = self.get_mut(p) {
                p_node.nxt = nxt;
            }
        }
        if let Some(n) = nxt {
            if let Some(n_node) = self.get_mut(n) {
                n_node.prv = prv;
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.prv = None;
            node.nxt = None;
        }
        for chain_id in chain {
            self.invalidate(chain_id);
        }
        self.invalidate(id);
    }

    /// Links `next` after `id` and invalidates the merged chain's caches.
    pub fn then(&mut self, id: i64, next: i64) {
        if let Some(node) = self.get_mut(id) {
            node.nxt = Some(next);
        }
        if let Some(node) = self.get_mut(next) {
            node.prv = Some(id);
        }
        for chain_id in self.all(id) {
            self.invalidate(chain_id);
        }
    }

    fn invalidate(&mut self, id: i64) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.cache.before = None;
            entry.cache.after = None;
        }
    }
}

//! Union-Find (Disjoint Set Union) over terms
//!
//! Path compression plus union by rank, O(α(n)) per operation. Terms get a
//! dense id the first time they are seen; ids follow first appearance, which
//! keeps every numbering derived from the sets deterministic.

use crate::features::state::domain::Term;
use rustc_hash::FxHashMap;

/// Union-Find over dense `u32` ids
#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    /// Parent pointers (self-loop = root)
    parent: Vec<u32>,

    /// Rank (tree height upper bound) for union by rank
    rank: Vec<u8>,

    /// Number of disjoint sets
    set_count: usize,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            rank: vec![0; n],
            set_count: n,
        }
    }

    /// Ensure `x` exists, growing the structure with singletons
    pub fn make_set(&mut self, x: u32) {
        let old_len = self.parent.len();
        let new_len = x as usize + 1;
        if new_len > old_len {
            self.parent.extend(old_len as u32..new_len as u32);
            self.rank.resize(new_len, 0);
            self.set_count += new_len - old_len;
        }
    }

    /// Representative of `x`, compressing the path behind it
    pub fn find(&mut self, x: u32) -> u32 {
        if x as usize >= self.parent.len() {
            self.make_set(x);
            return x;
        }
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut current = x;
        while self.parent[current as usize] != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    /// Merge the sets of `x` and `y`; returns the new representative
    pub fn union(&mut self, x: u32, y: u32) -> u32 {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return root_x;
        }

        let (rx, ry) = (root_x as usize, root_y as usize);
        let root = match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => {
                self.parent[rx] = root_y;
                root_y
            }
            std::cmp::Ordering::Greater => {
                self.parent[ry] = root_x;
                root_x
            }
            std::cmp::Ordering::Equal => {
                self.parent[ry] = root_x;
                self.rank[rx] += 1;
                root_x
            }
        };
        self.set_count -= 1;
        root
    }

    pub fn connected(&mut self, x: u32, y: u32) -> bool {
        self.find(x) == self.find(y)
    }

    /// Number of disjoint sets
    pub fn count(&self) -> usize {
        self.set_count
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Union-Find keyed by terms
#[derive(Debug, Clone, Default)]
pub struct TermUnionFind {
    ids: FxHashMap<Term, u32>,
    terms: Vec<Term>,
    uf: UnionFind,
}

impl TermUnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `term`, registering it as a singleton on first sight
    pub fn insert(&mut self, term: &Term) -> u32 {
        if let Some(&id) = self.ids.get(term) {
            return id;
        }
        let id = self.terms.len() as u32;
        self.ids.insert(term.clone(), id);
        self.terms.push(term.clone());
        self.uf.make_set(id);
        id
    }

    pub fn union(&mut self, a: &Term, b: &Term) {
        let (x, y) = (self.insert(a), self.insert(b));
        self.uf.union(x, y);
    }

    pub fn connected(&mut self, a: &Term, b: &Term) -> bool {
        let (x, y) = (self.insert(a), self.insert(b));
        self.uf.connected(x, y)
    }

    /// Registered terms in first-appearance order
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Representative id of a registered term
    pub fn root_of(&mut self, term: &Term) -> Option<u32> {
        let id = *self.ids.get(term)?;
        Some(self.uf.find(id))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of disjoint sets
    pub fn count(&self) -> usize {
        self.uf.count()
    }
}

//! Simplex and complex containers.

use std::collections::HashSet;

use crate::space::{PointRegistry, VertexId};

/// Pairwise edge of a simplex, by position inside the simplex.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub length: f64,
    pub a: usize,
    pub b: usize,
}

/// Unordered set of distinct vertices plus the refinement stop flag.
///
/// Equality is structural: same vertex set, regardless of order or flag.
#[derive(Clone, Debug)]
pub struct Simplex {
    vertices: Vec<VertexId>,
    terminal: bool,
}

impl Simplex {
    pub fn new(vertices: Vec<VertexId>) -> Self {
        Self {
            vertices,
            terminal: false,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: VertexId) -> bool {
        self.vertices.contains(&id)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn mark_terminal(&mut self) {
        self.terminal = true;
    }

    /// Copy of `self` with the vertex at position `pos` swapped for `id`.
    pub fn with_vertex(&self, pos: usize, id: VertexId) -> Simplex {
        let mut vertices = self.vertices.clone();
        vertices[pos] = id;
        Simplex::new(vertices)
    }

    /// Order-independent identity of the vertex set.
    pub fn key(&self) -> Vec<VertexId> {
        let mut k = self.vertices.clone();
        k.sort_unstable();
        k
    }

    /// All pairwise edges, longest first. Ties keep pair order.
    pub fn sorted_edges(&self, registry: &PointRegistry) -> Vec<Edge> {
        let n = self.vertices.len();
        let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for a in 0..n {
            for b in (a + 1)..n {
                let length = registry
                    .coords(self.vertices[a])
                    .distance(registry.coords(self.vertices[b]));
                edges.push(Edge { length, a, b });
            }
        }
        edges.sort_by(|x, y| y.length.total_cmp(&x.length));
        edges
    }
}

impl PartialEq for Simplex {
    fn eq(&self, other: &Self) -> bool {
        self.vertices.len() == other.vertices.len()
            && self.vertices.iter().all(|v| other.vertices.contains(v))
    }
}

impl Eq for Simplex {}

/// Pending swap of one simplex for its two children.
#[derive(Clone, Debug)]
pub struct Replacement {
    pub index: usize,
    pub children: [Simplex; 2],
}

/// Working set of simplices.
///
/// Invariants:
/// - no two members are structurally equal;
/// - members are only removed by `apply`, which inserts their children.
#[derive(Clone, Debug, Default)]
pub struct SimplexComplex {
    simplices: Vec<Simplex>,
    keys: HashSet<Vec<VertexId>>,
}

impl SimplexComplex {
    /// Build from a cover, dropping structural duplicates.
    pub fn from_cover(cover: Vec<Simplex>) -> Self {
        let mut out = Self::default();
        for s in cover {
            out.insert(s);
        }
        out
    }

    /// Insert `s` unless an equal simplex is already present.
    pub fn insert(&mut self, s: Simplex) -> bool {
        if !self.keys.insert(s.key()) {
            return false;
        }
        self.simplices.push(s);
        true
    }

    /// Apply replacements collected during one scan.
    ///
    /// Indices refer to positions before any replacement of the batch.
    pub fn apply(&mut self, replacements: Vec<Replacement>) {
        if replacements.is_empty() {
            return;
        }
        let mut removed = vec![false; self.simplices.len()];
        for r in &replacements {
            removed[r.index] = true;
        }
        let mut idx = 0;
        let keys = &mut self.keys;
        self.simplices.retain(|s| {
            let keep = !removed[idx];
            idx += 1;
            if !keep {
                keys.remove(&s.key());
            }
            keep
        });
        for r in replacements {
            for child in r.children {
                self.insert(child);
            }
        }
    }

    pub fn mark_terminal(&mut self, index: usize) {
        self.simplices[index].mark_terminal();
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Simplex {
        &self.simplices[index]
    }

    pub fn len(&self) -> usize {
        self.simplices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Simplex> {
        self.simplices.iter()
    }

    /// True if some simplex uses `id`.
    pub fn covers(&self, id: VertexId) -> bool {
        self.simplices.iter().any(|s| s.contains(id))
    }

    pub fn terminal_count(&self) -> usize {
        self.simplices.iter().filter(|s| s.is_terminal()).count()
    }
}

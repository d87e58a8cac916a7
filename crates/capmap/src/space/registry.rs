//! Vertex arena keyed by coordinates.

use std::collections::HashMap;

use super::Coords;

/// Elevation of a vertex that has not been measured yet.
pub const UNMEASURED: u64 = 0;

/// Handle into a `PointRegistry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// A point of the reduced space plus its measured capacity.
#[derive(Clone, Debug)]
pub struct Vertex {
    pub coords: Coords,
    /// Maximum stable workload; `UNMEASURED` until the oracle ran here.
    pub elevation: u64,
}

impl Vertex {
    #[inline]
    pub fn is_measured(&self) -> bool {
        self.elevation != UNMEASURED
    }
}

/// Owns every vertex of a run; at most one vertex per coordinate tuple.
///
/// Vertices are never removed, and ids stay valid for the registry's lifetime.
#[derive(Clone, Debug, Default)]
pub struct PointRegistry {
    vertices: Vec<Vertex>,
    index: HashMap<Coords, VertexId>,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of the vertex at `coords`, creating it if needed.
    pub fn register(&mut self, coords: Coords) -> VertexId {
        if let Some(&id) = self.index.get(&coords) {
            return id;
        }
        let id = VertexId(self.vertices.len());
        self.index.insert(coords.clone(), id);
        self.vertices.push(Vertex {
            coords,
            elevation: UNMEASURED,
        });
        id
    }

    pub fn lookup(&self, coords: &Coords) -> Option<VertexId> {
        self.index.get(coords).copied()
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    #[inline]
    pub fn coords(&self, id: VertexId) -> &Coords {
        &self.vertices[id.0].coords
    }

    #[inline]
    pub fn elevation(&self, id: VertexId) -> u64 {
        self.vertices[id.0].elevation
    }

    pub fn set_elevation(&mut self, id: VertexId, elevation: u64) {
        self.vertices[id.0].elevation = elevation;
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i), v))
    }
}

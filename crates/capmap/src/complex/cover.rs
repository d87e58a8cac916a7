//! Initial cover of the bounding-box corners.

use crate::space::{have_common_edge, PointRegistry, VertexId};

use super::types::Simplex;

/// Seed plus every point of `points` that shares a box edge with it.
pub fn build_simplex(seed: VertexId, points: &[VertexId], registry: &PointRegistry) -> Simplex {
    let origin = registry.coords(seed);
    let mut vertices = vec![seed];
    vertices.extend(
        points
            .iter()
            .copied()
            .filter(|&p| have_common_edge(registry.coords(p), origin)),
    );
    Simplex::new(vertices)
}

/// Smallest point (first-difference order) not used by any simplex of `cover`.
///
/// Among equal candidates the first one in `points` wins.
pub fn next_seed(
    points: &[VertexId],
    cover: &[Simplex],
    registry: &PointRegistry,
) -> Option<VertexId> {
    let mut best: Option<VertexId> = None;
    for &p in points {
        if cover.iter().any(|s| s.contains(p)) {
            continue;
        }
        match best {
            Some(b) if !registry.coords(p).precedes(registry.coords(b)) => {}
            _ => best = Some(p),
        }
    }
    best
}

/// Cover every point of `points` (the box corners) with corner simplices.
///
/// Each step seeds on the smallest uncovered corner, so every new simplex
/// brings at least one new corner and the loop ends after at most `2^d` steps.
pub fn init_cover(registry: &PointRegistry, points: &[VertexId]) -> Vec<Simplex> {
    let mut cover = Vec::new();
    while let Some(seed) = next_seed(points, &cover, registry) {
        cover.push(build_simplex(seed, points, registry));
    }
    cover
}

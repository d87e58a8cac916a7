//! Simplicial complex over the reduced space.
//!
//! Purpose
//! - Hold the working set of simplices (vertex-id tuples of size `d + 1`)
//!   that the refinement loop subdivides.
//! - Build the initial cover of the bounding-box corners: one simplex per
//!   seed corner, made of the seed and its axis neighbours.
//!
//! Notes
//! - The initial cover is a point cover, not a measure-preserving
//!   triangulation of the box interior; refinement supplies the accuracy.
//! - Simplices hold `VertexId`s only; coordinates and elevations live in the
//!   `PointRegistry`.

mod cover;
mod types;

pub use cover::{build_simplex, init_cover, next_seed};
pub use types::{Edge, Replacement, Simplex, SimplexComplex};

#[cfg(test)]
mod tests;

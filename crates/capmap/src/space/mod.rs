//! Integer sizing space: coordinates, bounding-box corners and midpoints.
//!
//! Purpose
//! - Points of the reduced parameter space are integer tuples (one entry per
//!   active dimension). Arithmetic is explicit (`add`, `sub`, `floor_div`,
//!   `distance`); nothing relies on operator dispatch.
//! - Vertices live in a single arena (`PointRegistry`) and are referenced by
//!   `VertexId`, so an elevation written once is seen by every simplex.
//!
//! Conventions
//! - Division is floor division (`div_euclid`), matching the midpoint rule
//!   `floor((a + b) / 2)` for non-negative sizes.
//! - Edge length is the Euclidean distance over coordinates only.

mod registry;

pub use registry::{PointRegistry, Vertex, VertexId, UNMEASURED};

use std::fmt;
use std::hash::{Hash, Hasher};

use nalgebra::DVector;

/// Closed integer interval `[min, max]` of one dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bound {
    pub min: i64,
    pub max: i64,
}

impl Bound {
    #[inline]
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// No room to search: corners coincide, or the axis is empty (`max < min`).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.min >= self.max
    }
}

/// Integer point of the reduced space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coords(DVector<i64>);

impl Coords {
    pub fn new(values: Vec<i64>) -> Self {
        Self(DVector::from_vec(values))
    }

    pub fn from_slice(values: &[i64]) -> Self {
        Self(DVector::from_column_slice(values))
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[i64] {
        self.0.as_slice()
    }

    #[inline]
    pub fn get(&self, axis: usize) -> i64 {
        self.0[axis]
    }

    pub fn add(&self, other: &Coords) -> Coords {
        debug_assert_eq!(self.dim(), other.dim());
        Coords(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Coords) -> Coords {
        debug_assert_eq!(self.dim(), other.dim());
        Coords(&self.0 - &other.0)
    }

    /// Component-wise floor division.
    pub fn floor_div(&self, divisor: i64) -> Coords {
        Coords(self.0.map(|x| x.div_euclid(divisor)))
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: &Coords) -> f64 {
        self.sub(other).0.map(|x| x as f64).norm()
    }

    /// Number of axes on which `self` and `other` differ.
    pub fn differing_axes(&self, other: &Coords) -> usize {
        self.sub(other).0.iter().filter(|&&x| x != 0).count()
    }

    /// True if `self` is strictly smaller at the first differing coordinate.
    ///
    /// Equal points do not precede each other, so a scan keeps the first one
    /// it met.
    pub fn precedes(&self, other: &Coords) -> bool {
        self.as_slice()
            .iter()
            .zip(other.as_slice())
            .find(|(a, b)| a != b)
            .is_some_and(|(a, b)| a < b)
    }
}

impl Hash for Coords {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.as_slice().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, ")")
    }
}

/// Corner of the bounding box selected by `mask`: bit `d` picks `max` on axis `d`.
pub fn make_corner(bounds: &[Bound], mask: usize) -> Coords {
    let values = bounds
        .iter()
        .enumerate()
        .map(|(d, b)| if mask & (1 << d) != 0 { b.max } else { b.min })
        .collect();
    Coords::new(values)
}

/// All `2^d` corners in mask order (mask 0 first).
pub fn corners(bounds: &[Bound]) -> Vec<Coords> {
    (0..1usize << bounds.len())
        .map(|mask| make_corner(bounds, mask))
        .collect()
}

/// `floor((a + b) / 2)` component-wise.
pub fn midpoint(a: &Coords, b: &Coords) -> Coords {
    a.add(b).floor_div(2)
}

/// Two corners share a box edge iff they differ on exactly one axis.
///
/// A point shares no edge with itself.
pub fn have_common_edge(a: &Coords, b: &Coords) -> bool {
    a.differing_axes(b) == 1
}

#[cfg(test)]
mod tests;

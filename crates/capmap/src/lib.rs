//! Adaptive capacity-boundary search.
//!
//! The crate measures, for a monitored platform, the largest workload
//! ("services count") that stays stable at a point of the sizing space, and
//! builds a piecewise-linear map of that capacity by refining a simplicial
//! cover of the bounding box only where interpolation disagrees with reality.
//!
//! Layout
//! - `space`: integer coordinates, corners, midpoints and the vertex arena.
//! - `complex`: simplices and the initial corner cover.
//! - `oracle`: binary search of the maximum stable workload at a vertex.
//! - `refine`: longest-edge subdivision until a fixed point.
//! - `sizing`: bounds document, reduced space, deployments and descriptors.
//! - `stability`, `platform`, `sim`: the probe side (live or simulated).
//! - `sink`, `explore`: result rows and the end-to-end driver.

pub mod complex;
pub mod error;
pub mod explore;
pub mod oracle;
pub mod platform;
pub mod refine;
pub mod sim;
pub mod sink;
pub mod sizing;
pub mod space;
pub mod stability;

pub use error::{Error, Result};

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for callers driving a run.
pub mod prelude {
    pub use crate::complex::{init_cover, Simplex, SimplexComplex};
    pub use crate::explore::{Exploration, Explorer};
    pub use crate::oracle::{CapacityOracle, WorkloadRange};
    pub use crate::platform::{LivePlatform, Platform, PlatformCfg};
    pub use crate::refine::{RefineCfg, RefinementEngine};
    pub use crate::sim::SimulatedPlatform;
    pub use crate::sink::{LineSink, MemorySink, ResultSink};
    pub use crate::sizing::{Deployment, DeploymentDescriptor, SizingBounds, ReducedSpace};
    pub use crate::space::{Bound, Coords, PointRegistry, VertexId};
    pub use crate::stability::{StabilityCfg, StabilityCheck, StabilityTracker};
}

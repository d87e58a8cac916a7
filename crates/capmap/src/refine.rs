//! Refinement engine: longest-edge subdivision driven by measurements.
//!
//! One pass visits every non-terminal simplex:
//! - longest edge below `min_edge_length` → terminal;
//! - otherwise measure the edge midpoint and compare with the linear
//!   prediction `floor((e(u) + e(v)) / 2)`; on exact agreement → terminal;
//! - on disagreement, replace the simplex by its two halves.
//!
//! Replacements are collected during the scan and applied afterwards, so the
//! scan never sees a half-updated complex. Edge lengths only shrink and
//! short simplices stop, which bounds the number of passes.

use tracing::{debug, info};

use crate::complex::{Replacement, Simplex, SimplexComplex};
use crate::error::{Error, Result};
use crate::oracle::{CapacityOracle, WorkloadRange};
use crate::platform::Platform;
use crate::sink::ResultSink;
use crate::space::{midpoint, PointRegistry};

#[derive(Clone, Copy, Debug)]
pub struct RefineCfg {
    /// Simplices whose longest edge is shorter than this are not refined.
    pub min_edge_length: f64,
    /// Safety cap on passes for a whole exploration.
    pub max_passes: usize,
}

impl Default for RefineCfg {
    fn default() -> Self {
        Self {
            min_edge_length: 10.0,
            max_passes: 1_000,
        }
    }
}

/// Why a simplex stopped being refined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    ShortEdges,
    /// The midpoint coincides with a vertex of the simplex.
    ZeroLengthSplit,
    /// Linear interpolation matched the measurement.
    Interpolated,
}

enum Step {
    Stop(StopReason),
    Split(Replacement),
}

#[derive(Clone, Debug)]
pub struct RefinementEngine {
    cfg: RefineCfg,
}

impl RefinementEngine {
    pub fn new(cfg: RefineCfg) -> Result<Self> {
        if !(cfg.min_edge_length.is_finite() && cfg.min_edge_length > 0.0) {
            return Err(Error::invalid_settings(format!(
                "minimum edge length must be positive, got {}",
                cfg.min_edge_length
            )));
        }
        Ok(Self { cfg })
    }

    pub fn cfg(&self) -> &RefineCfg {
        &self.cfg
    }

    /// One pass over `complex`. Returns true if any simplex was subdivided.
    ///
    /// Every newly measured midpoint is registered and recorded in `sink`.
    pub fn refine<P: Platform, S: ResultSink + ?Sized>(
        &self,
        complex: &mut SimplexComplex,
        registry: &mut PointRegistry,
        oracle: &mut CapacityOracle<P>,
        sink: &mut S,
        range: WorkloadRange,
    ) -> Result<bool> {
        let mut replacements = Vec::new();
        for idx in 0..complex.len() {
            if complex.get(idx).is_terminal() {
                continue;
            }
            let simplex = complex.get(idx).clone();
            match self.step(&simplex, idx, registry, oracle, sink, range)? {
                Step::Stop(reason) => {
                    debug!(simplex = idx, ?reason, "terminal");
                    complex.mark_terminal(idx);
                }
                Step::Split(r) => replacements.push(r),
            }
        }
        let changed = !replacements.is_empty();
        if changed {
            info!(split = replacements.len(), "refinement pass");
        }
        complex.apply(replacements);
        Ok(changed)
    }

    fn step<P: Platform, S: ResultSink + ?Sized>(
        &self,
        simplex: &Simplex,
        idx: usize,
        registry: &mut PointRegistry,
        oracle: &mut CapacityOracle<P>,
        sink: &mut S,
        range: WorkloadRange,
    ) -> Result<Step> {
        let Some(edge) = simplex.sorted_edges(registry).first().copied() else {
            return Ok(Step::Stop(StopReason::ShortEdges));
        };
        if edge.length < self.cfg.min_edge_length {
            return Ok(Step::Stop(StopReason::ShortEdges));
        }
        let (u, v) = (simplex.vertices()[edge.a], simplex.vertices()[edge.b]);
        let mid_coords = midpoint(registry.coords(u), registry.coords(v));
        let existing = registry.lookup(&mid_coords);
        if existing.is_some_and(|id| simplex.contains(id)) {
            return Ok(Step::Stop(StopReason::ZeroLengthSplit));
        }
        let predicted = (registry.elevation(u) + registry.elevation(v)) / 2;
        let (mid, measured) = match existing {
            Some(id) if registry.vertex(id).is_measured() => (id, registry.elevation(id)),
            _ => {
                let id = registry.register(mid_coords);
                let measured = oracle.measure(registry, id, range);
                sink.record(&oracle.space().materialize(registry.coords(id), measured))?;
                (id, measured)
            }
        };
        debug!(
            simplex = idx,
            edge = edge.length,
            mid = %registry.coords(mid),
            predicted,
            measured,
            "midpoint"
        );
        if measured == predicted {
            return Ok(Step::Stop(StopReason::Interpolated));
        }
        Ok(Step::Split(Replacement {
            index: idx,
            children: [simplex.with_vertex(edge.a, mid), simplex.with_vertex(edge.b, mid)],
        }))
    }
}

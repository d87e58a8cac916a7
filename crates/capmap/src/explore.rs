//! End-to-end exploration: corners, cover, corner measurements, refinement.

use tracing::{info, warn};

use crate::complex::{init_cover, SimplexComplex};
use crate::error::Result;
use crate::oracle::{CapacityOracle, WorkloadRange};
use crate::platform::Platform;
use crate::refine::{RefineCfg, RefinementEngine};
use crate::sink::ResultSink;
use crate::sizing::ReducedSpace;
use crate::space::{corners, Coords, PointRegistry, VertexId};

/// Summary of a finished run.
#[derive(Clone, Debug)]
pub struct Exploration {
    /// Every vertex with its elevation, in registration order.
    pub points: Vec<(Coords, u64)>,
    pub corners: usize,
    pub simplices: usize,
    pub terminal: usize,
    pub probes: u64,
    pub passes: usize,
    /// False if the pass cap stopped refinement early.
    pub converged: bool,
}

impl Exploration {
    /// `c1;c2;...;elevation` per point.
    pub fn listing(&self) -> Vec<String> {
        self.points
            .iter()
            .map(|(c, e)| {
                let mut parts: Vec<String> = c.as_slice().iter().map(i64::to_string).collect();
                parts.push(e.to_string());
                parts.join(";")
            })
            .collect()
    }
}

/// Owns the run state: registry, complex, oracle and sink.
pub struct Explorer<P: Platform, S: ResultSink> {
    registry: PointRegistry,
    complex: SimplexComplex,
    corner_ids: Vec<VertexId>,
    oracle: CapacityOracle<P>,
    engine: RefinementEngine,
    sink: S,
    range: WorkloadRange,
    passes: usize,
}

impl<P: Platform, S: ResultSink> Explorer<P, S> {
    pub fn new(space: ReducedSpace, platform: P, sink: S, range: WorkloadRange, cfg: RefineCfg) -> Result<Self> {
        let engine = RefinementEngine::new(cfg)?;
        let mut registry = PointRegistry::new();
        let corner_ids: Vec<VertexId> = corners(&space.bounds())
            .into_iter()
            .map(|c| registry.register(c))
            .collect();
        let complex = SimplexComplex::from_cover(init_cover(&registry, &corner_ids));
        info!(
            dims = ?space.active_names(),
            corners = corner_ids.len(),
            simplices = complex.len(),
            "initial cover"
        );
        Ok(Self {
            registry,
            complex,
            corner_ids,
            oracle: CapacityOracle::new(space, platform),
            engine,
            sink,
            range,
            passes: 0,
        })
    }

    pub fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    pub fn complex(&self) -> &SimplexComplex {
        &self.complex
    }

    pub fn corner_ids(&self) -> &[VertexId] {
        &self.corner_ids
    }

    pub fn oracle(&self) -> &CapacityOracle<P> {
        &self.oracle
    }

    /// Measure every corner that has no elevation yet and record it.
    pub fn measure_corners(&mut self) -> Result<()> {
        for &id in &self.corner_ids {
            if self.registry.vertex(id).is_measured() {
                continue;
            }
            let elevation = self.oracle.measure(&mut self.registry, id, self.range);
            let row = self
                .oracle
                .space()
                .materialize(self.registry.coords(id), elevation);
            self.sink.record(&row)?;
        }
        Ok(())
    }

    /// One refinement pass; true if the complex changed.
    pub fn refine_once(&mut self) -> Result<bool> {
        self.passes += 1;
        self.engine.refine(
            &mut self.complex,
            &mut self.registry,
            &mut self.oracle,
            &mut self.sink,
            self.range,
        )
    }

    /// Corners, then refinement until no simplex splits.
    pub fn run(&mut self) -> Result<Exploration> {
        self.measure_corners()?;
        let mut converged = true;
        while self.refine_once()? {
            if self.passes >= self.engine.cfg().max_passes {
                warn!(passes = self.passes, "pass cap reached; stopping refinement");
                converged = false;
                break;
            }
        }
        self.sink.flush()?;
        let summary = self.summary(converged);
        info!(
            points = summary.points.len(),
            simplices = summary.simplices,
            probes = summary.probes,
            passes = summary.passes,
            "exploration finished"
        );
        Ok(summary)
    }

    fn summary(&self, converged: bool) -> Exploration {
        Exploration {
            points: self
                .registry
                .iter()
                .map(|(_, v)| (v.coords.clone(), v.elevation))
                .collect(),
            corners: self.corner_ids.len(),
            simplices: self.complex.len(),
            terminal: self.complex.terminal_count(),
            probes: self.oracle.probes(),
            passes: self.passes,
            converged,
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

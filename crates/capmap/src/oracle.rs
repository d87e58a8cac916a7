//! Capacity oracle: binary search of the maximum stable workload at a point.
//!
//! Each candidate costs one full probe (deploy, start, wait for stability),
//! so the search is bounded by `ceil(log2(max - min))` probes. The platform
//! answers with a plain boolean; infrastructure failures already count as
//! "unstable" on that side.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::sizing::ReducedSpace;
use crate::space::{Coords, PointRegistry, VertexId};

/// Inclusive workload search interval.
///
/// Invariant: `1 <= min <= max`; 0 is the "unmeasured" sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkloadRange {
    pub min: u64,
    pub max: u64,
}

impl WorkloadRange {
    pub fn new(min: u64, max: u64) -> Result<Self> {
        if min == 0 {
            return Err(Error::invalid_settings("minimum workload must be at least 1"));
        }
        if max < min {
            return Err(Error::invalid_settings(format!(
                "workload range [{min}, {max}] is empty"
            )));
        }
        Ok(Self { min, max })
    }

    /// Upper bound on probes for one search: `ceil(log2(max - min))`.
    pub fn max_probes(&self) -> u32 {
        let span = self.max - self.min;
        if span <= 1 {
            0
        } else {
            u64::BITS - (span - 1).leading_zeros()
        }
    }
}

/// Bisect `range` with `is_stable`; returns the accepted workload and probe count.
///
/// Stable candidates move the lower end up, unstable ones move the upper end
/// down. After the loop the accepted value is one below the last failing
/// candidate, the last stable candidate, or `min` if nothing was probed.
pub fn search_max_stable(range: WorkloadRange, mut is_stable: impl FnMut(u64) -> bool) -> (u64, u32) {
    let (mut lo, mut hi) = (range.min, range.max);
    let mut last: Option<(u64, bool)> = None;
    let mut probes = 0;
    while hi - lo > 1 {
        let candidate = lo + (hi - lo) / 2;
        let ok = is_stable(candidate);
        probes += 1;
        if ok {
            lo = candidate;
        } else {
            hi = candidate;
        }
        last = Some((candidate, ok));
    }
    let accepted = match last {
        Some((candidate, false)) => candidate - 1,
        Some((candidate, true)) => candidate,
        None => lo,
    };
    (accepted, probes)
}

/// Measures elevations by probing a platform.
pub struct CapacityOracle<P: Platform> {
    space: ReducedSpace,
    platform: P,
    probes: u64,
}

impl<P: Platform> CapacityOracle<P> {
    pub fn new(space: ReducedSpace, platform: P) -> Self {
        Self {
            space,
            platform,
            probes: 0,
        }
    }

    pub fn space(&self) -> &ReducedSpace {
        &self.space
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Probes issued since construction.
    pub fn probes(&self) -> u64 {
        self.probes
    }

    /// Search the capacity at `coords` without touching any registry.
    pub fn measure_coords(&mut self, coords: &Coords, range: WorkloadRange) -> u64 {
        let space = &self.space;
        let platform = &mut self.platform;
        let (accepted, probes) = search_max_stable(range, |candidate| {
            let deployment = space.materialize(coords, candidate);
            let ok = platform.probe(&deployment);
            debug!(point = %coords, candidate, ok, "probe");
            ok
        });
        self.probes += u64::from(probes);
        info!(point = %coords, capacity = accepted, probes, "measured");
        accepted
    }

    /// Measure vertex `id` and store the result as its elevation.
    ///
    /// Always searches, even if the vertex already carries an elevation.
    pub fn measure(&mut self, registry: &mut PointRegistry, id: VertexId, range: WorkloadRange) -> u64 {
        let coords = registry.coords(id).clone();
        let elevation = self.measure_coords(&coords, range);
        registry.set_elevation(id, elevation);
        elevation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedPlatform;
    use crate::sizing::{Dimension, SizingBounds};
    use proptest::prelude::*;

    fn threshold(t: u64) -> impl FnMut(u64) -> bool {
        move |w| w < t
    }

    #[test]
    fn range_validation() {
        assert!(WorkloadRange::new(0, 10).is_err());
        assert!(WorkloadRange::new(5, 4).is_err());
        assert!(WorkloadRange::new(4, 4).is_ok());
    }

    #[test]
    fn max_probes_is_ceil_log2() {
        let r = |lo, hi| WorkloadRange::new(lo, hi).unwrap().max_probes();
        assert_eq!(r(1, 1), 0);
        assert_eq!(r(1, 2), 0);
        assert_eq!(r(1, 3), 1);
        assert_eq!(r(1, 9), 3);
        assert_eq!(r(1, 10), 4);
        assert_eq!(r(1, 1025), 10);
    }

    #[test]
    fn converges_below_threshold() {
        let range = WorkloadRange::new(1, 100).unwrap();
        let (accepted, probes) = search_max_stable(range, threshold(50));
        assert_eq!(accepted, 49);
        assert!(probes <= range.max_probes());
    }

    #[test]
    fn adjacent_bounds_return_min_without_probing() {
        let range = WorkloadRange::new(7, 8).unwrap();
        let (accepted, probes) = search_max_stable(range, |_| panic!("no probe expected"));
        assert_eq!((accepted, probes), (7, 0));
    }

    #[test]
    fn threshold_outside_range_clamps() {
        let range = WorkloadRange::new(10, 20).unwrap();
        assert_eq!(search_max_stable(range, |_| false).0, 10);
        assert_eq!(search_max_stable(range, |_| true).0, 19);
    }

    #[test]
    fn measure_sets_shared_elevation_and_remeasures() {
        let bounds = SizingBounds::new(
            vec![Dimension::count("host", 1, 10), Dimension::count("users", 1, 15)],
            10_000,
        )
        .unwrap();
        let space = bounds.reduce(&["host", "users"]).unwrap();
        let mut oracle = CapacityOracle::new(space, SimulatedPlatform::new(9000));
        let mut reg = PointRegistry::new();
        let id = reg.register(Coords::from_slice(&[10, 1]));
        let range = WorkloadRange::new(1, 10_000).unwrap();

        assert_eq!(oracle.measure(&mut reg, id, range), 900);
        let alias = reg.register(Coords::from_slice(&[10, 1]));
        assert_eq!(reg.elevation(alias), 900);
        let first = oracle.probes();
        assert!(first > 0 && first <= u64::from(range.max_probes()));

        oracle.measure(&mut reg, alias, range);
        assert!(oracle.probes() > first);
    }

    proptest! {
        #[test]
        fn bisection_finds_threshold(lo in 1u64..500, span in 0u64..5000, t in 0u64..6000) {
            let range = WorkloadRange::new(lo, lo + span).unwrap();
            let (accepted, probes) = search_max_stable(range, threshold(t));
            prop_assert!(probes <= range.max_probes());
            let expected = if t <= range.min {
                range.min
            } else if t > range.max {
                range.max.saturating_sub(1).max(range.min)
            } else {
                t - 1
            };
            prop_assert_eq!(accepted, expected);
        }
    }
}

//! Explore a two-dimensional sizing space against the simulated platform.
//!
//! Usage:
//!   cargo run -p capmap --example simulated_run -- [budget]
//!
//! Prints one `host;users;capacity` line per measured point.

use capmap::prelude::*;
use capmap::sizing::Dimension;

fn main() -> capmap::Result<()> {
    let budget = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(9000u64);
    let bounds = SizingBounds::new(
        vec![Dimension::count("host", 1, 10), Dimension::count("users", 1, 15)],
        10_000,
    )?;
    let space = bounds.reduce(&["host", "users"])?;
    let range = WorkloadRange::new(1, bounds.max_workload())?;
    let mut explorer = Explorer::new(
        space,
        SimulatedPlatform::new(budget),
        MemorySink::default(),
        range,
        RefineCfg::default(),
    )?;
    let summary = explorer.run()?;
    for line in summary.listing() {
        println!("{line}");
    }
    eprintln!(
        "points={} simplices={} probes={} passes={}",
        summary.points.len(),
        summary.simplices,
        summary.probes,
        summary.passes
    );
    Ok(())
}

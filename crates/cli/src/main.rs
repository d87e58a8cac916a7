mod provenance;
mod table;

use anyhow::{Context, Result};
use capmap::prelude::*;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::provenance::Payload;
use crate::table::TableSink;

#[derive(Parser)]
#[command(name = "capmap")]
#[command(about = "Map the maximum stable workload across a sizing space")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Explore against the live platform (provisioning commands + stats documents)
    Run(RunArgs),
    /// Explore against the synthetic capacity model
    Simulate(SimArgs),
    /// Print a stored results table
    Show {
        path: PathBuf,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Args, Clone, Debug)]
struct ExploreArgs {
    /// Sizing bounds in injector data.yaml format
    #[arg(long, default_value = "data.yaml")]
    bounds: PathBuf,
    /// Dimensions to explore; the rest stay at their maximum
    #[arg(long, value_delimiter = ',', default_value = "host,users")]
    active: Vec<String>,
    /// Simplices whose longest edge is shorter than this are final
    #[arg(long, default_value_t = 10.0)]
    min_edge: f64,
    /// Smallest workload tried by the search
    #[arg(long, default_value_t = 1)]
    min_workload: u64,
    /// Results table (.parquet or .csv); omitted or "-" prints rows to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
struct RunArgs {
    #[command(flatten)]
    explore: ExploreArgs,
    /// Injector console
    #[arg(long, default_value = "../bin/console")]
    console: PathBuf,
    /// Where the provisioning descriptor is written
    #[arg(long, default_value = "new_config.yaml")]
    descriptor: PathBuf,
    #[arg(long, default_value = "/var/lib/centreon-engine/central-module-master-stats.json")]
    engine_stats: PathBuf,
    #[arg(long, default_value = "/var/lib/centreon-broker/central-broker-master-stats.json")]
    broker_stats: PathBuf,
    #[arg(long, default_value = "/var/lib/centreon-broker/central-rrd-master-stats.json")]
    rrd_stats: PathBuf,
    /// Seconds allowed for one stability check
    #[arg(long, default_value_t = 500)]
    timeout: u64,
    /// Seconds between stats samples
    #[arg(long, default_value_t = 10)]
    poll: u64,
    #[arg(long, default_value_t = 3)]
    confirmations: u32,
    /// Largest projected backlog drain (seconds) still counted as settled
    #[arg(long, default_value_t = 10)]
    settle: i64,
}

#[derive(Args, Clone, Debug)]
struct SimArgs {
    #[command(flatten)]
    explore: ExploreArgs,
    /// Largest stable `product(factors) * workload`
    #[arg(long, default_value_t = 9000)]
    budget: u64,
    /// Dimensions in the product; defaults to the active ones
    #[arg(long, value_delimiter = ',')]
    factors: Option<Vec<String>>,
    /// Probability that a stable probe reports unstable
    #[arg(long, default_value_t = 0.0)]
    flake: f64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl RunArgs {
    fn platform_cfg(&self) -> PlatformCfg {
        let mut cfg = PlatformCfg {
            console: self.console.clone(),
            descriptor_path: self.descriptor.clone(),
            health_files: vec![
                ("engine".into(), self.engine_stats.clone()),
                ("broker".into(), self.broker_stats.clone()),
                ("rrd".into(), self.rrd_stats.clone()),
            ],
            ..PlatformCfg::default()
        };
        cfg.stability.timeout = Duration::from_secs(self.timeout);
        cfg.stability.poll_interval = Duration::from_secs(self.poll);
        cfg.stability.confirmations = self.confirmations;
        cfg.stability.settle_drain_secs = self.settle;
        cfg
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run(args) => run(args),
        Action::Simulate(args) => simulate(args).map(|_| ()),
        Action::Show { path, limit } => show(&path, limit),
    }
}

fn run(args: RunArgs) -> Result<()> {
    tracing::info!(
        bounds = %args.explore.bounds.display(),
        active = ?args.explore.active,
        console = %args.console.display(),
        "run"
    );
    let params = json!({
        "mode": "live",
        "explore": explore_params(&args.explore),
        "console": args.console,
        "descriptor": args.descriptor,
        "timeout_secs": args.timeout,
        "poll_secs": args.poll,
        "confirmations": args.confirmations,
        "settle_secs": args.settle,
    });
    let platform = LivePlatform::from_cfg(args.platform_cfg());
    let summary = explore(&args.explore, platform, params)?;
    print_listing(&summary)?;
    Ok(())
}

fn simulate(args: SimArgs) -> Result<Exploration> {
    let factors = args.factors.clone().unwrap_or_else(|| args.explore.active.clone());
    tracing::info!(
        bounds = %args.explore.bounds.display(),
        active = ?args.explore.active,
        budget = args.budget,
        flake = args.flake,
        "simulate"
    );
    let params = json!({
        "mode": "simulated",
        "explore": explore_params(&args.explore),
        "budget": args.budget,
        "factors": factors,
        "flake": args.flake,
        "seed": args.seed,
    });
    let platform = SimulatedPlatform::new(args.budget)
        .with_factors(factors)
        .with_flakiness(args.flake, args.seed);
    let summary = explore(&args.explore, platform, params)?;
    print_listing(&summary)?;
    Ok(summary)
}

fn show(path: &Path, limit: Option<u32>) -> Result<()> {
    tracing::info!(path = %path.display(), ?limit, "show");
    let df = table::read_table(path, limit)?;
    println!("{df}");
    Ok(())
}

fn explore<P: Platform>(args: &ExploreArgs, platform: P, params: Value) -> Result<Exploration> {
    let bounds = SizingBounds::from_file(&args.bounds)
        .with_context(|| format!("loading bounds {}", args.bounds.display()))?;
    let space = bounds.reduce(&args.active)?;
    let range = WorkloadRange::new(args.min_workload, bounds.max_workload())?;
    let cfg = RefineCfg {
        min_edge_length: args.min_edge,
        ..RefineCfg::default()
    };
    match args.out.as_deref().filter(|p| *p != Path::new("-")) {
        Some(path) => {
            let sink = TableSink::create(path)?;
            let mut explorer = Explorer::new(space, platform, sink, range, cfg)?;
            let summary = explorer.run()?;
            let payload = Payload {
                params,
                summary: summary_json(&summary),
            };
            provenance::write_sidecar(path, &payload)?;
            Ok(summary)
        }
        None => {
            let mut explorer = Explorer::new(space, platform, LineSink::stdout(), range, cfg)?;
            Ok(explorer.run()?)
        }
    }
}

fn explore_params(args: &ExploreArgs) -> Value {
    json!({
        "bounds": args.bounds,
        "active": args.active,
        "min_edge": args.min_edge,
        "min_workload": args.min_workload,
        "out": args.out,
    })
}

fn summary_json(summary: &Exploration) -> Value {
    json!({
        "points": summary.points.len(),
        "corners": summary.corners,
        "simplices": summary.simplices,
        "terminal": summary.terminal,
        "probes": summary.probes,
        "passes": summary.passes,
        "converged": summary.converged,
    })
}

/// Separates the final listing from rows streamed to stdout during the run.
const LISTING_SEPARATOR: &str = "####";

fn print_listing(summary: &Exploration) -> Result<()> {
    let stdout = io::stdout();
    write_listing(&mut stdout.lock(), summary)?;
    Ok(())
}

fn write_listing(out: &mut impl Write, summary: &Exploration) -> io::Result<()> {
    writeln!(out, "{LISTING_SEPARATOR}")?;
    for line in summary.listing() {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const DATA: &str = "
poller:
  count: 1
timeperiod:
  count: 5
host:
  count: 10
service:
  count: 10000
user:
  administrators: 2
  editors: 4
  users: 15
";

    #[test]
    fn defaults_match_library_cfg() {
        let cmd = Cmd::try_parse_from(["capmap", "run"]).unwrap();
        let Action::Run(args) = cmd.action else {
            panic!("expected run");
        };
        assert_eq!(args.explore.active, ["host", "users"]);
        assert_eq!(args.explore.min_edge, RefineCfg::default().min_edge_length);
        let cfg = args.platform_cfg();
        let defaults = PlatformCfg::default();
        assert_eq!(cfg.console, defaults.console);
        assert_eq!(cfg.descriptor_path, defaults.descriptor_path);
        assert_eq!(cfg.health_files, defaults.health_files);
        assert_eq!(cfg.stability.timeout, defaults.stability.timeout);
        assert_eq!(cfg.stability.poll_interval, defaults.stability.poll_interval);
        assert_eq!(cfg.stability.confirmations, defaults.stability.confirmations);
        assert_eq!(cfg.stability.settle_drain_secs, defaults.stability.settle_drain_secs);
    }

    #[test]
    fn active_list_splits_on_commas() {
        let cmd = Cmd::try_parse_from(["capmap", "simulate", "--active", "host,kpi,poller"]).unwrap();
        let Action::Simulate(args) = cmd.action else {
            panic!("expected simulate");
        };
        assert_eq!(args.explore.active, ["host", "kpi", "poller"]);
        assert!(args.factors.is_none());
    }

    #[test]
    fn simulate_writes_table_and_manifest() {
        let dir = tempdir().unwrap();
        let bounds = dir.path().join("data.yaml");
        fs::write(&bounds, DATA).unwrap();
        let out = dir.path().join("runs/hosts.csv");
        let cmd = Cmd::try_parse_from([
            "capmap",
            "simulate",
            "--bounds",
            bounds.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ])
        .unwrap();
        let Action::Simulate(args) = cmd.action else {
            panic!("expected simulate");
        };
        let summary = simulate(args).unwrap();
        assert!(summary.converged);
        assert!(summary.points.len() >= 5);
        assert!(summary.listing().iter().any(|l| l == "5;8;225"));

        let df = table::read_table(&out, None).unwrap();
        assert_eq!(df.height(), summary.points.len());
        let manifest: Value =
            serde_json::from_slice(&fs::read(dir.path().join("runs/hosts.provenance.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["params"]["mode"], "simulated");
        assert_eq!(manifest["summary"]["points"], summary.points.len());
    }

    #[test]
    fn unknown_dimension_aborts_before_probing() {
        let dir = tempdir().unwrap();
        let bounds = dir.path().join("data.yaml");
        fs::write(&bounds, DATA).unwrap();
        let cmd = Cmd::try_parse_from([
            "capmap",
            "simulate",
            "--bounds",
            bounds.to_str().unwrap(),
            "--active",
            "host,nope",
            "--out",
            dir.path().join("r.csv").to_str().unwrap(),
        ])
        .unwrap();
        let Action::Simulate(args) = cmd.action else {
            panic!("expected simulate");
        };
        assert!(simulate(args).is_err());
        assert!(!dir.path().join("r.csv").exists());
    }

    #[test]
    fn listing_follows_a_separator_line() {
        let summary = Exploration {
            points: vec![
                (Coords::from_slice(&[1, 1]), 9000),
                (Coords::from_slice(&[5, 8]), 225),
            ],
            corners: 1,
            simplices: 0,
            terminal: 0,
            probes: 14,
            passes: 1,
            converged: true,
        };
        let mut out = Vec::new();
        write_listing(&mut out, &summary).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "####\n1;1;9000\n5;8;225\n");
    }

    #[test]
    fn missing_bounds_file_is_reported() {
        let dir = tempdir().unwrap();
        let args = ExploreArgs {
            bounds: dir.path().join("absent.yaml"),
            active: vec!["host".into()],
            min_edge: 10.0,
            min_workload: 1,
            out: None,
        };
        let err = explore(&args, SimulatedPlatform::new(10), Value::Null).unwrap_err();
        assert!(format!("{err:#}").contains("absent.yaml"));
    }
}

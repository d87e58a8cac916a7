//! Probe side: the monitored platform and the commands that reconfigure it.
//!
//! A probe is strictly sequential: write descriptor, stop, purge, inject,
//! start, then wait for stability. Command failures are logged and otherwise
//! ignored; a bad provision surfaces as a failed stability check.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::sizing::Deployment;
use crate::stability::{Clock, FileHealthSource, HealthSource, StabilityCfg, StabilityCheck, SystemClock};

/// A system that can be deployed at a sizing and asked whether it holds.
pub trait Platform {
    /// Deploy `deployment`, start it, and report whether it stays stable.
    fn probe(&mut self, deployment: &Deployment) -> bool;
}

impl<P: Platform + ?Sized> Platform for &mut P {
    fn probe(&mut self, deployment: &Deployment) -> bool {
        (**self).probe(deployment)
    }
}

/// Populates the platform's configuration.
pub trait Provisioner {
    /// Remove everything injected by earlier probes.
    fn purge(&mut self) -> Result<()>;
    /// Inject the configuration described by the file at `descriptor`.
    fn inject(&mut self, descriptor: &Path) -> Result<()>;
}

/// Starts and stops the monitored services.
pub trait Lifecycle {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

/// Program plus arguments, run to completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a whitespace-separated command line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn run(&self) -> Result<()> {
        debug!(command = %self, "run");
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|e| self.failure(e.to_string()))?;
        if !status.success() {
            return Err(self.failure(format!("exit status {:?}", status.code())));
        }
        Ok(())
    }

    fn failure(&self, reason: String) -> Error {
        Error::Command {
            command: self.to_string(),
            reason,
        }
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// The injector console: `<console> centreon:inject-data -p | -c <file>`.
#[derive(Clone, Debug)]
pub struct InjectorProvisioner {
    console: PathBuf,
}

impl InjectorProvisioner {
    const SUBCOMMAND: &'static str = "centreon:inject-data";

    pub fn new(console: impl Into<PathBuf>) -> Self {
        Self {
            console: console.into(),
        }
    }

    fn base(&self) -> CommandLine {
        CommandLine::new(self.console.to_string_lossy(), [Self::SUBCOMMAND])
    }

    pub fn purge_command(&self) -> CommandLine {
        self.base().with_arg("-p")
    }

    pub fn inject_command(&self, descriptor: &Path) -> CommandLine {
        self.base()
            .with_arg("-c")
            .with_arg(descriptor.to_string_lossy())
    }
}

impl Provisioner for InjectorProvisioner {
    fn purge(&mut self) -> Result<()> {
        self.purge_command().run()
    }

    fn inject(&mut self, descriptor: &Path) -> Result<()> {
        self.inject_command(descriptor).run()
    }
}

/// Service control through two fixed command lines.
#[derive(Clone, Debug)]
pub struct ServiceLifecycle {
    pub start: CommandLine,
    pub stop: CommandLine,
}

impl Default for ServiceLifecycle {
    fn default() -> Self {
        Self {
            start: CommandLine::new("systemctl", ["start", "cbd", "centengine"]),
            stop: CommandLine::new("systemctl", ["stop", "cbd", "centengine"]),
        }
    }
}

impl Lifecycle for ServiceLifecycle {
    fn start(&mut self) -> Result<()> {
        self.start.run()
    }

    fn stop(&mut self) -> Result<()> {
        self.stop.run()
    }
}

/// Paths and commands of a live platform.
#[derive(Clone, Debug)]
pub struct PlatformCfg {
    pub console: PathBuf,
    pub descriptor_path: PathBuf,
    /// Stats documents as `(component name, path)`.
    pub health_files: Vec<(String, PathBuf)>,
    pub lifecycle: ServiceLifecycle,
    pub stability: StabilityCfg,
}

impl Default for PlatformCfg {
    fn default() -> Self {
        Self {
            console: PathBuf::from("../bin/console"),
            descriptor_path: PathBuf::from("new_config.yaml"),
            health_files: vec![
                (
                    "engine".into(),
                    "/var/lib/centreon-engine/central-module-master-stats.json".into(),
                ),
                (
                    "broker".into(),
                    "/var/lib/centreon-broker/central-broker-master-stats.json".into(),
                ),
                (
                    "rrd".into(),
                    "/var/lib/centreon-broker/central-rrd-master-stats.json".into(),
                ),
            ],
            lifecycle: ServiceLifecycle::default(),
            stability: StabilityCfg::default(),
        }
    }
}

/// Real platform: provisioning commands plus the stability check.
pub struct LivePlatform<V: Provisioner, L: Lifecycle, C: Clock = SystemClock> {
    provisioner: V,
    lifecycle: L,
    check: StabilityCheck<C>,
    descriptor_path: PathBuf,
}

impl LivePlatform<InjectorProvisioner, ServiceLifecycle, SystemClock> {
    pub fn from_cfg(cfg: PlatformCfg) -> Self {
        let sources: Vec<Box<dyn HealthSource>> = cfg
            .health_files
            .into_iter()
            .map(|(name, path)| Box::new(FileHealthSource::new(name, path)) as Box<dyn HealthSource>)
            .collect();
        Self::new(
            InjectorProvisioner::new(cfg.console),
            cfg.lifecycle,
            StabilityCheck::new(sources, cfg.stability, SystemClock),
            cfg.descriptor_path,
        )
    }
}

impl<V: Provisioner, L: Lifecycle, C: Clock> LivePlatform<V, L, C> {
    pub fn new(provisioner: V, lifecycle: L, check: StabilityCheck<C>, descriptor_path: PathBuf) -> Self {
        Self {
            provisioner,
            lifecycle,
            check,
            descriptor_path,
        }
    }

    pub fn check(&self) -> &StabilityCheck<C> {
        &self.check
    }

    fn write_descriptor(&self, deployment: &Deployment) -> Result<()> {
        let yaml = deployment.descriptor().to_yaml()?;
        std::fs::write(&self.descriptor_path, yaml)?;
        Ok(())
    }
}

fn log_step(step: &str, outcome: Result<()>) {
    if let Err(e) = outcome {
        warn!(step, error = %e, "probe step failed");
    }
}

impl<V: Provisioner, L: Lifecycle, C: Clock> Platform for LivePlatform<V, L, C> {
    fn probe(&mut self, deployment: &Deployment) -> bool {
        // A stale descriptor would be injected silently; count it as unstable.
        if let Err(e) = self.write_descriptor(deployment) {
            warn!(error = %e, path = %self.descriptor_path.display(), "cannot write descriptor");
            return false;
        }
        log_step("stop", self.lifecycle.stop());
        log_step("purge", self.provisioner.purge());
        log_step("inject", self.provisioner.inject(&self.descriptor_path));
        self.check.reset();
        log_step("start", self.lifecycle.start());
        self.check.wait_stable()
    }
}

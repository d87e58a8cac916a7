//! Sizing model: bounds document, reduced space, deployments and descriptors.
//!
//! Purpose
//! - Read the injector's sizing document (object kind → count) into ordered
//!   dimensions with `[min, max]` bounds and a maximum workload.
//! - Select the active dimensions explored geometrically; the others stay at
//!   their maximum whenever a vertex is turned into a deployment.
//! - A `Deployment` is both the provisioning input and the result row, so a
//!   recorded row always maps back to a descriptor.
//!
//! Document conventions
//! - `poller` is a flag dimension `[0, 1]`; `poller == 1` means hosts are
//!   dispatched on the central server.
//! - `user` expands into `administrators`, `editors` and `users`, each `[1, n]`.
//! - `service.count` is the workload ceiling, not a dimension.
//! - Every other key `k` is a dimension `[1, k.count]`, in document order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::space::{Bound, Coords};

/// Name of the workload column and document key.
pub const WORKLOAD_KEY: &str = "service";
const FLAG_KEY: &str = "poller";
const USER_KEY: &str = "user";
const USER_ROLES: [&str; 3] = ["administrators", "editors", "users"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DimensionKind {
    Count,
    Flag,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub kind: DimensionKind,
    pub bound: Bound,
}

impl Dimension {
    pub fn count(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            kind: DimensionKind::Count,
            bound: Bound::new(min, max),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DimensionKind::Flag,
            bound: Bound::new(0, 1),
        }
    }
}

/// Every configured dimension plus the workload ceiling.
#[derive(Clone, Debug)]
pub struct SizingBounds {
    dimensions: Vec<Dimension>,
    max_workload: u64,
}

impl SizingBounds {
    /// Names must be unique and `max_workload >= 1`.
    ///
    /// A section with `max < min` (e.g. `count: 0`) is accepted: it can only
    /// be inactive, where it is deployed at its maximum. `reduce` rejects it.
    pub fn new(dimensions: Vec<Dimension>, max_workload: u64) -> Result<Self> {
        for (i, d) in dimensions.iter().enumerate() {
            if dimensions[..i].iter().any(|o| o.name == d.name) {
                return Err(Error::invalid_bounds(format!("duplicate dimension {}", d.name)));
            }
        }
        if max_workload == 0 {
            return Err(Error::invalid_bounds("service count must be at least 1"));
        }
        Ok(Self {
            dimensions,
            max_workload,
        })
    }

    /// Parse the YAML sizing document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(text)?;
        let Value::Mapping(map) = doc else {
            return Err(Error::invalid_bounds("top level must be a mapping"));
        };
        let mut dimensions = Vec::new();
        let mut max_workload = 1;
        for (key, value) in &map {
            let name = key
                .as_str()
                .ok_or_else(|| Error::invalid_bounds(format!("non-string key {key:?}")))?;
            match name {
                FLAG_KEY => dimensions.push(Dimension::flag(name)),
                USER_KEY => {
                    for role in USER_ROLES {
                        dimensions.push(Dimension::count(role, 1, int_field(value, name, role)?));
                    }
                }
                WORKLOAD_KEY => {
                    let count = int_field(value, name, "count")?;
                    max_workload = u64::try_from(count).map_err(|_| {
                        Error::invalid_bounds(format!("service count {count} is negative"))
                    })?;
                }
                _ => dimensions.push(Dimension::count(name, 1, int_field(value, name, "count")?)),
            }
        }
        Self::new(dimensions, max_workload)
    }

    /// Read the sizing document at `path`. Failure here aborts a run.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::BoundsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn max_workload(&self) -> u64 {
        self.max_workload
    }

    /// Keep `active` (in the given order) for the geometric search.
    pub fn reduce<S: AsRef<str>>(&self, active: &[S]) -> Result<ReducedSpace> {
        if active.is_empty() {
            return Err(Error::invalid_settings("at least one active dimension is required"));
        }
        let mut indices = Vec::with_capacity(active.len());
        for name in active {
            let name = name.as_ref();
            let idx = self
                .dimensions
                .iter()
                .position(|d| d.name == name)
                .ok_or_else(|| Error::UnknownDimension(name.to_string()))?;
            if indices.contains(&idx) {
                return Err(Error::invalid_settings(format!("{name} selected twice")));
            }
            let bound = self.dimensions[idx].bound;
            if bound.is_degenerate() {
                return Err(Error::invalid_bounds(format!(
                    "active dimension {name} has no extent: [{}, {}]",
                    bound.min, bound.max
                )));
            }
            indices.push(idx);
        }
        Ok(ReducedSpace {
            dimensions: self.dimensions.clone(),
            active: indices,
        })
    }
}

/// Integer or numeric string, as the injector accepts both.
fn int_field(value: &Value, section: &str, field: &str) -> Result<i64> {
    value
        .get(field)
        .and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .ok_or_else(|| Error::invalid_bounds(format!("{section}.{field} must be an integer")))
}

/// Active subset of the sizing dimensions.
#[derive(Clone, Debug)]
pub struct ReducedSpace {
    dimensions: Vec<Dimension>,
    active: Vec<usize>,
}

impl ReducedSpace {
    /// Number of active dimensions.
    pub fn dim(&self) -> usize {
        self.active.len()
    }

    pub fn active_names(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|&i| self.dimensions[i].name.as_str())
            .collect()
    }

    /// Bounds of the active dimensions, in active order.
    pub fn bounds(&self) -> Vec<Bound> {
        self.active.iter().map(|&i| self.dimensions[i].bound).collect()
    }

    /// Full deployment for `coords` at `workload`; inactive dimensions at max.
    pub fn materialize(&self, coords: &Coords, workload: u64) -> Deployment {
        debug_assert_eq!(coords.dim(), self.active.len());
        let counts = self
            .dimensions
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let value = match self.active.iter().position(|&a| a == i) {
                    Some(axis) => coords.get(axis),
                    None => d.bound.max,
                };
                (d.name.clone(), value)
            })
            .collect();
        Deployment { counts, workload }
    }

    /// Active coordinates of a deployment row, if it names every active dimension.
    pub fn coords_of(&self, deployment: &Deployment) -> Option<Coords> {
        let values = self
            .active
            .iter()
            .map(|&i| deployment.get(&self.dimensions[i].name))
            .collect::<Option<Vec<_>>>()?;
        Some(Coords::new(values))
    }
}

/// One concrete sizing: every dimension's count plus the workload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    counts: Vec<(String, i64)>,
    workload: u64,
}

impl Deployment {
    pub fn new(counts: Vec<(String, i64)>, workload: u64) -> Self {
        Self { counts, workload }
    }

    pub fn counts(&self) -> &[(String, i64)] {
        &self.counts
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.counts
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    pub fn workload(&self) -> u64 {
        self.workload
    }

    /// `name=value` pairs joined by `;`, workload last.
    pub fn to_line(&self) -> String {
        let mut parts: Vec<String> = self
            .counts
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect();
        parts.push(format!("{WORKLOAD_KEY}={}", self.workload));
        parts.join(";")
    }

    pub fn descriptor(&self) -> DeploymentDescriptor {
        let n = |name: &str| self.get(name).unwrap_or(0);
        let count = |name: &str| CountSection { count: n(name) };
        DeploymentDescriptor {
            poller: PollerSection {
                hosts_on_central: n(FLAG_KEY) == 1,
            },
            timeperiod: count("timeperiod"),
            contact: count("contact"),
            command: CommandSection {
                count: n("command"),
                metrics: Range::new(1, 30),
            },
            host: count("host"),
            service: CountSection {
                count: i64::try_from(self.workload).unwrap_or(i64::MAX),
            },
            metaservice: count("metaservice"),
            hostgroup: HostMembers {
                count: n("hostgroup"),
                hosts: Range::new(0, 200),
            },
            servicegroup: ServiceMembers {
                count: n("servicegroup"),
                services: Range::new(0, 300),
            },
            host_category: HostMembers {
                count: n("host_category"),
                hosts: Range::new(0, 10),
            },
            service_category: HostMembers {
                count: n("service_category"),
                hosts: Range::new(0, 30),
            },
            ba: count("ba"),
            kpi: count("kpi"),
            host_disco_job: CountSection { count: 0 },
            acl_resource: AclResourceSection {
                count: n("acl_resource"),
                hosts: 100,
                servicegroups: 1000,
            },
            acl_group: AclGroupSection {
                count: n("acl_group"),
                resources: 3,
            },
            user: UserSection {
                administrators: n("administrators"),
                editors: n("editors"),
                users: n("users"),
            },
        }
    }
}

/// Document consumed by the provisioning step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentDescriptor {
    pub poller: PollerSection,
    pub timeperiod: CountSection,
    pub contact: CountSection,
    pub command: CommandSection,
    pub host: CountSection,
    pub service: CountSection,
    pub metaservice: CountSection,
    pub hostgroup: HostMembers,
    pub servicegroup: ServiceMembers,
    pub host_category: HostMembers,
    pub service_category: HostMembers,
    pub ba: CountSection,
    pub kpi: CountSection,
    pub host_disco_job: CountSection,
    pub acl_resource: AclResourceSection,
    pub acl_group: AclGroupSection,
    pub user: UserSection,
}

impl DeploymentDescriptor {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerSection {
    #[serde(rename = "hostsOnCentral")]
    pub hosts_on_central: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSection {
    pub count: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSection {
    pub count: i64,
    pub metrics: Range,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMembers {
    pub count: i64,
    pub hosts: Range,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMembers {
    pub count: i64,
    pub services: Range,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclResourceSection {
    pub count: i64,
    pub hosts: i64,
    pub servicegroups: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclGroupSection {
    pub count: i64,
    pub resources: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSection {
    pub administrators: i64,
    pub editors: i64,
    pub users: i64,
}

//! Run manifest written next to a results table.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Serialize)]
struct Callsite {
    file: String,
    line: u32,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    code_rev: String,
    capmap_version: &'static str,
    callsite: Callsite,
    params: &'a Value,
    summary: &'a Value,
    outputs: Vec<String>,
}

/// What a run was asked to do and what it found.
pub struct Payload {
    pub params: Value,
    pub summary: Value,
}

/// Write `<stem>.provenance.json` beside `artifact`; returns its path.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: &Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    let caller = Location::caller();
    let manifest = Manifest {
        code_rev: code_rev(),
        capmap_version: capmap::VERSION,
        callsite: Callsite {
            file: caller.file().to_string(),
            line: caller.line(),
        },
        params: &payload.params,
        summary: &payload.summary,
        outputs: vec![artifact.to_string_lossy().into_owned()],
    };
    fs::write(&path, serde_json::to_vec_pretty(&manifest)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "provenance");
    Ok(path)
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("results"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`.
pub fn code_rev() -> String {
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .into_iter()
        .chain(std::env::var("GIT_COMMIT").ok())
        .find(|rev| !rev.is_empty())
        .or_else(git_head)
        .unwrap_or_else(|| "unknown".to_string())
}

fn git_head() -> Option<String> {
    let output = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_table() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/runs/hosts.parquet")),
            Path::new("/tmp/runs/hosts.provenance.json")
        );
        assert_eq!(
            sidecar_path(Path::new("out.csv")),
            Path::new("out.provenance.json")
        );
    }

    #[test]
    fn manifest_carries_params_and_summary() {
        let dir = tempdir().unwrap();
        let table = dir.path().join("r.csv");
        fs::write(&table, "host,service\n1,9000\n").unwrap();
        let payload = Payload {
            params: json!({"active": ["host", "users"], "min_edge": 10.0}),
            summary: json!({"points": 5, "probes": 70}),
        };
        let path = write_sidecar(&table, &payload).unwrap();
        let doc: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(doc["outputs"][0], table.to_string_lossy().as_ref());
        assert_eq!(doc["params"]["active"][1], "users");
        assert_eq!(doc["summary"]["probes"], 70);
        assert_eq!(doc["capmap_version"], capmap::VERSION);
        assert!(doc["callsite"]["file"].as_str().unwrap().ends_with("provenance.rs"));
        assert!(!doc["code_rev"].as_str().unwrap().is_empty());
    }
}

//! Health documents published by the monitored components.

use std::path::PathBuf;

use serde_json::Value;

use crate::error::{Error, Result};

const ENDPOINT_PREFIX: &str = "endpoint ";
const QUEUE_ENABLED: &str = "queue_file_enabled";
const QUEUE: &str = "queue_file";
const EXPECTED_AT: &str = "file_expected_terminated_at";

/// Anything that yields one health document per read.
pub trait HealthSource {
    fn name(&self) -> &str;
    fn read(&mut self) -> Result<Value>;
}

/// JSON stats file rewritten periodically by a component.
#[derive(Clone, Debug)]
pub struct FileHealthSource {
    name: String,
    path: PathBuf,
}

impl FileHealthSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl HealthSource for FileHealthSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> Result<Value> {
        let bytes = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Backlog state of each endpoint in `doc`: `Some(seconds until drain)` if
/// its queue file is enabled, `None` otherwise.
pub fn backlog_readings(source: &str, doc: &Value, now: i64) -> Result<Vec<(String, Option<i64>)>> {
    let Value::Object(map) = doc else {
        return Err(Error::HealthSource {
            source_name: source.to_string(),
            reason: "document is not an object".into(),
        });
    };
    let mut out = Vec::new();
    for (key, entry) in map {
        if !key.starts_with(ENDPOINT_PREFIX) {
            continue;
        }
        let enabled = entry.get(QUEUE_ENABLED).and_then(Value::as_bool) == Some(true);
        if !enabled {
            out.push((key.clone(), None));
            continue;
        }
        let expected = entry
            .get(QUEUE)
            .and_then(|q| q.get(EXPECTED_AT))
            .and_then(as_epoch)
            .ok_or_else(|| Error::HealthSource {
                source_name: source.to_string(),
                reason: format!("{key}: queue file without {EXPECTED_AT}"),
            })?;
        out.push((key.clone(), Some(expected - now)));
    }
    Ok(out)
}

fn as_epoch(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

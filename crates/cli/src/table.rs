//! Tabular result storage.
//!
//! Every recorded row is kept in memory and the whole table is rewritten
//! (temp file + rename) after each row, so an interrupted run still leaves
//! every measured point on disk.

use anyhow::{bail, Context, Result};
use capmap::sink::ResultSink;
use capmap::sizing::{Deployment, WORKLOAD_KEY};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Parquet,
    Csv,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("parquet") => Ok(Self::Parquet),
            Some("csv") => Ok(Self::Csv),
            _ => bail!("unsupported table extension: {} (use .parquet or .csv)", path.display()),
        }
    }
}

pub struct TableSink {
    path: PathBuf,
    format: TableFormat,
    rows: Vec<Deployment>,
}

impl TableSink {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = TableFormat::from_path(&path)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating output dir {}", parent.display()))?;
            }
        }
        Ok(Self {
            path,
            format,
            rows: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[Deployment] {
        &self.rows
    }

    /// One `i64` column per dimension, in row order, then the workload.
    pub fn frame(&self) -> PolarsResult<DataFrame> {
        let Some(first) = self.rows.first() else {
            return Ok(DataFrame::default());
        };
        let mut columns: Vec<Series> = first
            .counts()
            .iter()
            .enumerate()
            .map(|(i, (name, _))| {
                let values: Vec<i64> = self.rows.iter().map(|r| r.counts()[i].1).collect();
                Series::new(name.as_str().into(), values)
            })
            .collect();
        let workload: Vec<u64> = self.rows.iter().map(Deployment::workload).collect();
        columns.push(Series::new(WORKLOAD_KEY.into(), workload));
        DataFrame::new(columns)
    }

    fn write(&self) -> Result<()> {
        let mut df = self.frame()?;
        let tmp = self.path.with_extension("partial");
        let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        match self.format {
            TableFormat::Parquet => {
                ParquetWriter::new(file).finish(&mut df)?;
            }
            TableFormat::Csv => {
                CsvWriter::new(file).include_header(true).finish(&mut df)?;
            }
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl ResultSink for TableSink {
    fn record(&mut self, row: &Deployment) -> capmap::Result<()> {
        self.rows.push(row.clone());
        tracing::debug!(rows = self.rows.len(), path = %self.path.display(), "table");
        self.write()
            .map_err(|e| capmap::Error::Sink(format!("{e:#}")))
    }
}

/// Load a stored table, optionally keeping only the first `limit` rows.
pub fn read_table(path: &Path, limit: Option<IdxSize>) -> Result<DataFrame> {
    let lf = match TableFormat::from_path(path)? {
        TableFormat::Parquet => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
        TableFormat::Csv => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()?,
    };
    let lf = match limit {
        Some(n) => lf.limit(n),
        None => lf,
    };
    lf.collect()
        .with_context(|| format!("reading {}", path.display()))
}

//! Result sinks: one row per measured vertex.
//!
//! Rows are full `Deployment`s (every dimension plus the measured workload),
//! so anything written here can be fed back to the provisioning step.

use std::io::{self, Stdout, Write};

use crate::error::{Error, Result};
use crate::sizing::Deployment;

pub trait ResultSink {
    fn record(&mut self, row: &Deployment) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn record(&mut self, row: &Deployment) -> Result<()> {
        (**self).record(row)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn record(&mut self, row: &Deployment) -> Result<()> {
        (**self).record(row)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Line-oriented text: `name=value;...;service=N` per row.
pub struct LineSink<W: Write> {
    out: W,
}

impl LineSink<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for LineSink<W> {
    fn record(&mut self, row: &Deployment) -> Result<()> {
        writeln!(self.out, "{}", row.to_line()).map_err(|e| Error::Sink(e.to_string()))
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(|e| Error::Sink(e.to_string()))
    }
}

/// Keeps rows in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<Deployment>,
}

impl ResultSink for MemorySink {
    fn record(&mut self, row: &Deployment) -> Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }
}

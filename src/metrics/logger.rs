use crate::network::{Record, RecordRow};
use anyhow::Result;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One row per simulated trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRow {
    pub scenario: String,
    pub arrival_rate: f64,
    pub trial: u32,
    pub observations: usize,
    pub lower: Option<f64>,
    pub mean: Option<f64>,
    pub upper: Option<f64>,
}

pub struct TrialLogger {
    writer: Writer<File>,
}

impl TrialLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_batch(&mut self, rows: &[TrialRow]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Dumps raw visit records, one CSV row each.
pub fn write_records(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for record in records {
        writer.serialize(RecordRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

use std::path::{Path, PathBuf};

use crate::{record::Record, Result};

/// Receives the full set of stories recovered so far every time a checkpoint is due.
/// Called from the blocking pool, so implementations are free to do synchronous I/O.
pub trait CheckpointSink: Send + Sync + 'static {
    fn write_checkpoint(&self, records: &[Record]) -> Result<()>;
}

/// Overwrites a single CSV file with each checkpoint.
///
/// The snapshot is written to a sibling `.tmp` file first and renamed over the
/// previous checkpoint, so a killed process never leaves a half-written file behind.
/// Nothing reads the checkpoint back.
#[derive(Debug, Clone)]
pub struct CsvCheckpoint {
    path: PathBuf,
}

impl CsvCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointSink for CsvCheckpoint {
    fn write_checkpoint(&self, records: &[Record]) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        write_csv(&tmp, records)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Writes `records` as CSV with the `id,title,country,state,category,story` header.
/// The header is written even when there are no records.
pub fn write_csv(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(Record::HEADERS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

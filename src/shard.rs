//! Worker-owned gzip CSV shard files.
//!
//! A shard is one worker's slice of one job's extracted rows:
//! `<dir>/<JOB_UPPER>.<worker-id>.csv.gz`, a gzip-compressed CSV with a
//! single header line of upper-cased column names. Each worker owns a
//! disjoint filename by construction, so no cross-worker locking is needed
//! to keep the header-once invariant.

use crate::error::{Error, Result};
use crate::source::RowBatch;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Shard filename extension.
pub const SHARD_EXT: &str = "csv.gz";

/// Appends batches of rows to one worker's shard file for one job.
///
/// The header record is written exactly once, when the first batch creates
/// the file. Every call appends an independent gzip member, so the shard
/// stays a valid gzip stream across batches (decompressors concatenate
/// members). The existence check and the append are two separate opens, not
/// an atomic pair: correctness relies on each `(job, worker)` pair having a
/// single owner, which the extraction pool guarantees.
pub struct ShardWriter {
    path: PathBuf,
    header: Vec<String>,
}

impl ShardWriter {
    /// Create a writer for `(job, worker_id)` under `dir`.
    ///
    /// `job_upper` is the upper-cased job name; the file itself is created
    /// lazily on the first write.
    pub fn new(dir: &Path, job_upper: &str, worker_id: usize, header: Vec<String>) -> Self {
        let path = dir.join(format!("{job_upper}.{worker_id}.{SHARD_EXT}"));
        Self { path, header }
    }

    /// Path of the shard file this writer owns.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one batch, writing the header first if the shard does not
    /// exist yet.
    ///
    /// # Errors
    /// Returns [`Error::ShardWrite`] on any I/O or serialization failure.
    pub fn write_batch(&self, rows: &RowBatch) -> Result<()> {
        if !self.path.exists() {
            self.append(std::iter::once(self.header.clone()))
                .map_err(|e| self.write_error(e))?;
        }
        let rendered = rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_field().into_owned()).collect());
        self.append(rendered).map_err(|e| self.write_error(e))
    }

    /// Append one gzip member containing `records` as CSV.
    ///
    /// Quoting is `NonNumeric`: numeric-looking fields stay bare, everything
    /// else is double-quoted, matching the generated file format options
    /// (`FIELD_OPTIONALLY_ENCLOSED_BY = '\042'`, `NULL_IF = ('')`).
    fn append(
        &self,
        records: impl Iterator<Item = Vec<String>>,
    ) -> std::result::Result<(), csv::Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let gz = GzEncoder::new(file, Compression::default());
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::NonNumeric)
            .from_writer(gz);
        for record in records {
            writer.write_record(&record)?;
        }
        writer.flush()?;
        let gz = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        gz.finish()?;
        Ok(())
    }

    fn write_error(&self, source: csv::Error) -> Error {
        Error::ShardWrite {
            path: self.path.clone(),
            source,
        }
    }
}

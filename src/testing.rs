//! In-memory fakes for exercising the pipeline without real drivers.
//!
//! [`MemorySource`] stands in for the relational source and understands the
//! probe wrapper, and [`RecordingWarehouse`] logs every statement it is
//! asked to execute, tagged with the session that ran it. Both are used by
//! this crate's integration tests and are exported for embedders testing
//! their own wiring.

use crate::error::{Error, Result};
use crate::executor::{WarehouseClient, WarehouseSession};
use crate::source::{ColumnDescriptor, RowBatch, RowCursor, SourceClient};
use crate::value::Value;
use flate2::read::MultiGzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An in-memory source: a set of queries with canned schemas and rows.
#[derive(Default)]
pub struct MemorySource {
    tables: HashMap<String, (Vec<ColumnDescriptor>, Vec<Vec<Value>>)>,
    failing: HashSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a query with its result schema and rows.
    pub fn insert(
        &mut self,
        query: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
        rows: Vec<Vec<Value>>,
    ) {
        self.tables.insert(query.into(), (columns, rows));
    }

    /// Make `query` fail on execution, including its probe form.
    pub fn fail_query(&mut self, query: impl Into<String>) {
        self.failing.insert(query.into());
    }
}

impl SourceClient for MemorySource {
    fn execute(&self, query: &str) -> Result<Box<dyn RowCursor + '_>> {
        // A probe wraps the job query; strip the wrapper and return the
        // schema with zero rows, like a driver would.
        let inner = query
            .strip_prefix("select * from (")
            .and_then(|rest| rest.strip_suffix(") subquery WHERE 0=1"));
        let key = inner.unwrap_or(query);
        if self.failing.contains(key) {
            return Err(Error::SourceQuery(format!("query rejected: {key}")));
        }
        let (columns, rows) = self
            .tables
            .get(key)
            .ok_or_else(|| Error::SourceQuery(format!("unknown query: {key}")))?;
        let rows = if inner.is_some() { Vec::new() } else { rows.clone() };
        Ok(Box::new(MemoryCursor {
            columns: columns.clone(),
            rows,
            pos: 0,
        }))
    }
}

struct MemoryCursor {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<Value>>,
    pos: usize,
}

impl RowCursor for MemoryCursor {
    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn fetch(&mut self, max: usize) -> Result<RowBatch> {
        let end = (self.pos + max).min(self.rows.len());
        let batch = self.rows[self.pos..end].to_vec();
        self.pos = end;
        Ok(batch)
    }
}

/// A warehouse that records statements instead of executing them.
///
/// Each session gets a distinct id so tests can assert that the staging and
/// load phases ran on separate sessions.
#[derive(Default, Clone)]
pub struct RecordingWarehouse {
    log: Arc<Mutex<Vec<(usize, String)>>>,
    next_session: Arc<AtomicUsize>,
    fail_containing: Arc<Mutex<Option<String>>>,
}

impl RecordingWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any statement containing `needle` fail.
    pub fn fail_containing(&self, needle: impl Into<String>) {
        *self.fail_containing.lock().unwrap() = Some(needle.into());
    }

    /// Every executed statement, in execution order.
    pub fn statements(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(_, stmt)| stmt.clone())
            .collect()
    }

    /// Every executed statement with the id of the session that ran it.
    pub fn sessions(&self) -> Vec<(usize, String)> {
        self.log.lock().unwrap().clone()
    }
}

impl WarehouseClient for RecordingWarehouse {
    fn session(&self) -> Result<Box<dyn WarehouseSession + '_>> {
        let id = self.next_session.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingSession {
            id,
            warehouse: self.clone(),
        }))
    }
}

struct RecordingSession {
    id: usize,
    warehouse: RecordingWarehouse,
}

impl WarehouseSession for RecordingSession {
    fn execute(&mut self, statement: &str) -> Result<()> {
        if let Some(needle) = self.warehouse.fail_containing.lock().unwrap().as_deref()
            && statement.contains(needle)
        {
            return Err(Error::WarehouseStatement {
                statement: statement.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.warehouse
            .log
            .lock()
            .unwrap()
            .push((self.id, statement.to_string()));
        Ok(())
    }
}

/// Read a gzip CSV shard back as raw records, header included.
///
/// Shards are written as concatenated gzip members (one per batch), so the
/// reader has to be multi-member aware.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed as CSV.
pub fn read_shard(path: &Path) -> Result<Vec<Vec<String>>> {
    let map_err = |source: csv::Error| Error::ShardWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| map_err(e.into()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(MultiGzDecoder::new(file));
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(map_err)?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

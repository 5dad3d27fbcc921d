//! Source-side interfaces: client and cursor traits, schema probing, and
//! batched row streaming.
//!
//! The actual database driver lives outside this crate. Embedders implement
//! [`SourceClient`] and [`RowCursor`] over their driver of choice; the
//! pipeline only ever sees ordered column metadata and batches of
//! [`Value`](crate::value::Value) rows. [`crate::testing::MemorySource`]
//! provides an in-memory implementation for tests.

use crate::error::Result;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of rows per fetched batch.
pub const BATCH_SIZE: usize = 500;

/// Canonical type-identity token reported by the source driver for one
/// result column.
///
/// The set is closed on purpose: a driver must normalize whatever its
/// native metadata says into one of these tokens, and the type-mapping
/// configuration is keyed by the same tokens. Unknown tokens are rejected
/// when the mapping file is loaded, not at some later row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Boolean,
    Integer,
    BigInt,
    Float,
    Decimal,
    Text,
    Date,
    Time,
    Timestamp,
    Uuid,
    Binary,
}

impl SourceType {
    /// The lowercase token used in the type-mapping configuration.
    pub fn token(&self) -> &'static str {
        match self {
            SourceType::Boolean => "boolean",
            SourceType::Integer => "integer",
            SourceType::BigInt => "bigint",
            SourceType::Float => "float",
            SourceType::Decimal => "decimal",
            SourceType::Text => "text",
            SourceType::Date => "date",
            SourceType::Time => "time",
            SourceType::Timestamp => "timestamp",
            SourceType::Uuid => "uuid",
            SourceType::Binary => "binary",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Ordered column metadata for one result column.
///
/// Column order is significant end to end: the shard header, the generated
/// column definitions, and the positional SELECT list are all derived from
/// the same probed `Vec<ColumnDescriptor>`, in the same order. Loading
/// binds columns by ordinal position, so a divergence anywhere would
/// silently corrupt the loaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub source_type: SourceType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            source_type,
        }
    }
}

/// An ordered batch of rows, each row an ordered sequence of cells.
pub type RowBatch = Vec<Vec<Value>>;

/// A live, executing source query.
///
/// Forward-only: fetched rows are gone, and a cursor cannot be rewound.
pub trait RowCursor: Send {
    /// Ordered result-set metadata for this cursor.
    fn columns(&self) -> &[ColumnDescriptor];

    /// Fetch up to `max` rows. An empty batch signals end of results.
    ///
    /// # Errors
    /// Returns [`Error::SourceQuery`](crate::Error::SourceQuery) if the driver or connection fails
    /// mid-fetch.
    fn fetch(&mut self, max: usize) -> Result<RowBatch>;
}

/// An opaque source database client that can execute queries.
pub trait SourceClient {
    /// Execute `query` and return a cursor over its results.
    ///
    /// # Errors
    /// Returns [`Error::SourceQuery`](crate::Error::SourceQuery) if the query is invalid or the
    /// connection drops.
    fn execute(&self, query: &str) -> Result<Box<dyn RowCursor + '_>>;
}

/// Probe the result schema of `query` without fetching any rows.
///
/// The query is wrapped as `select * from (<query>) subquery WHERE 0=1`, so
/// only result metadata comes back. Runs once per job, before extraction;
/// the returned descriptors drive the shard header, the type-mapping
/// coverage check, and the generated load statements.
///
/// # Errors
/// Returns [`Error::SourceQuery`](crate::Error::SourceQuery) if the wrapped query fails. This is fatal
/// for the run; there is no partial-schema fallback.
pub fn probe_schema(client: &dyn SourceClient, query: &str) -> Result<Vec<ColumnDescriptor>> {
    let probe = format!("select * from ({query}) subquery WHERE 0=1");
    let cursor = client.execute(&probe)?;
    Ok(cursor.columns().to_vec())
}

/// A lazy, finite, forward-only sequence of row batches over a live cursor.
///
/// Each `next()` blocks on the driver for up to [`BATCH_SIZE`] rows; an
/// empty fetch terminates the sequence. Nothing is buffered ahead of the
/// consumer, so the source is never over-read while downstream work is in
/// progress. Not restartable: stream a query again by executing it again.
pub struct RowStreamer<'a> {
    cursor: Box<dyn RowCursor + 'a>,
    done: bool,
}

impl<'a> RowStreamer<'a> {
    pub fn new(cursor: Box<dyn RowCursor + 'a>) -> Self {
        Self {
            cursor,
            done: false,
        }
    }
}

impl Iterator for RowStreamer<'_> {
    type Item = Result<RowBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.fetch(BATCH_SIZE) {
            Ok(batch) if batch.is_empty() => {
                self.done = true;
                None
            }
            Ok(batch) => Some(Ok(batch)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_tokens_round_trip() -> std::result::Result<(), serde_json::Error> {
        for ty in [
            SourceType::Boolean,
            SourceType::BigInt,
            SourceType::Decimal,
            SourceType::Timestamp,
        ] {
            let json = serde_json::to_string(&ty)?;
            assert_eq!(json, format!("\"{}\"", ty.token()));
            let back: SourceType = serde_json::from_str(&json)?;
            assert_eq!(back, ty);
        }
        Ok(())
    }
}

//! Error types for the extract/load pipeline.
//!
//! Every variant here is fatal to the whole run: there is no per-job
//! isolation, no retry, and no partial-success reporting. The only
//! locally-absorbed condition in the crate is the normal end-of-results
//! signal from a row stream, which is not an error.

use crate::source::SourceType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error kinds for a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid job, connection, or mapping definitions.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A schema probe or extraction query failed against the source.
    #[error("source query failed: {0}")]
    SourceQuery(String),

    /// A probed source type has no configured warehouse type. Loading with
    /// a guessed type would corrupt the warehouse schema, so there is no
    /// silent fallback.
    #[error("no target type mapped for source type `{0}`")]
    UnmappedType(SourceType),

    /// I/O or serialization failure while writing a shard file.
    #[error("shard write failed at {}: {source}", path.display())]
    ShardWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A generated statement failed on the warehouse.
    #[error("warehouse statement failed: {statement}: {message}")]
    WarehouseStatement { statement: String, message: String },
}

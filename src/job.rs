//! Job definitions: one configured source-query-to-target-table unit.

use serde::Deserialize;

/// One configured extraction/load unit.
///
/// Jobs are immutable once loaded and are processed strictly in the order
/// they appear in the job file.
#[derive(Debug, Clone)]
pub struct Job {
    /// Job name, unique within a run. Doubles as the stage name and the
    /// shard filename prefix (upper-cased in both cases).
    pub name: String,
    /// Source extraction query, run verbatim against the source.
    pub query: String,
    /// Where the extracted rows land in the warehouse.
    pub target: LoadTarget,
}

/// Target warehouse location for one job.
///
/// Names are stored as configured and upper-cased when rendered as
/// warehouse identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadTarget {
    pub database: String,
    pub schema: String,
    pub table: String,
}

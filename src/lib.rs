//! # Snowlift
//!
//! A **batch extract-and-load pipeline** that moves tabular data from a
//! relational source into a cloud warehouse. For each configured job it
//! probes the source schema, streams query results in bounded batches,
//! serializes and gzip-compresses them concurrently into sharded CSV files,
//! derives the target table schema from a static type-mapping table, and
//! executes the statements that stage the files and bulk-load them into a
//! table.
//!
//! ## Quick Start
//!
//! ```no_run
//! use snowlift::{RunConfig, SourceParams, WarehouseParams, load_jobs, load_type_map};
//! use std::collections::HashMap;
//!
//! # fn drivers() -> (Box<dyn snowlift::SourceClient>, Box<dyn snowlift::WarehouseClient>) { unimplemented!() }
//! # fn main() -> snowlift::Result<()> {
//! let vars: HashMap<String, String> = std::env::vars().collect();
//! let config = RunConfig {
//!     source: SourceParams {
//!         driver: "ODBC Driver 18 for SQL Server".into(),
//!         server: "db.internal".into(),
//!         trusted_connection: true,
//!         username: None,
//!         password: None,
//!     },
//!     warehouse: WarehouseParams {
//!         account: "acme-prod".into(),
//!         user: "LOADER".into(),
//!         password: "…".into(),
//!         database: "ANALYTICS".into(),
//!         load_warehouse: "LOAD_WH".into(),
//!     },
//!     jobs: load_jobs(&std::fs::read_to_string("job_list.json").unwrap(), &vars)?,
//!     type_map: load_type_map(&std::fs::read_to_string("type_conversion.json").unwrap())?,
//! };
//!
//! // Source and warehouse drivers are supplied by the embedder.
//! let (source, warehouse) = drivers();
//! snowlift::run(&config, source.as_ref(), warehouse.as_ref())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline Shape
//!
//! Per job, strictly in job-file order:
//!
//! 1. **Probe** — [`probe_schema`] wraps the extraction query in a zero-row
//!    subselect and captures the ordered column metadata.
//! 2. **Stream** — [`RowStreamer`] pulls batches of up to [`BATCH_SIZE`]
//!    rows from the live cursor, with strict pull-based backpressure.
//! 3. **Shard** — [`ParallelExtractor`] hands each batch to a fixed worker
//!    pool; every worker appends to its own gzip CSV shard
//!    (`<JOB>.<worker>.csv.gz`) with the header written exactly once.
//! 4. **Plan** — [`build_load_plan`] turns the probed schema, the
//!    [`TypeMapper`], and the shard directory into an ordered statement
//!    list, split into a staging and a load phase.
//!
//! After all jobs are extracted, [`LoadExecutor`] runs every job's staging
//! statements and then every job's load statements, on separate warehouse
//! sessions.
//!
//! Column order is the load-bearing invariant: the shard header, the
//! generated column definitions, and the positional `t.$1..$N` SELECT list
//! are all derived from the same probed [`ColumnDescriptor`] list. All
//! errors are fatal to the whole run; see [`Error`].
//!
//! Real database drivers stay outside the crate, behind [`SourceClient`]
//! and [`WarehouseClient`]. The [`testing`] module has in-memory fakes.

pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod job;
pub mod plan;
pub mod run;
pub mod shard;
pub mod source;
pub mod testing;
pub mod typemap;
pub mod value;

pub use config::{RunConfig, SourceParams, WarehouseParams, load_jobs, load_type_map, substitute_vars};
pub use error::{Error, Result};
pub use executor::{LoadExecutor, WarehouseClient, WarehouseSession};
pub use extract::ParallelExtractor;
pub use job::{Job, LoadTarget};
pub use plan::{FILE_FORMAT_NAME, LoadPlan, build_load_plan, quote_ident};
pub use run::run;
pub use shard::{SHARD_EXT, ShardWriter};
pub use source::{
    BATCH_SIZE, ColumnDescriptor, RowBatch, RowCursor, RowStreamer, SourceClient, SourceType,
    probe_schema,
};
pub use typemap::TypeMapper;
pub use value::Value;

//! Warehouse statement generation for one job.
//!
//! A [`LoadPlan`] is an ordered list of statements split into two
//! sub-sequences. The staging phase builds warehouse-side scaffolding and
//! uploads the shard files; the load phase materializes the target table
//! from the stage and drops it. The split is structural rather than an
//! index into one list, because the two-phase executor depends on it.

use crate::error::Result;
use crate::job::Job;
use crate::shard::SHARD_EXT;
use crate::source::ColumnDescriptor;
use crate::typemap::TypeMapper;
use std::path::Path;

/// Name of the shared CSV file format created once per database.
pub const FILE_FORMAT_NAME: &str = "SNOWLIFT_CSV";

/// File format matching the shard serialization exactly: comma-delimited,
/// double-quote-optionally-enclosed, header line skipped, empty string as
/// NULL. Divergence between this and [`crate::shard::ShardWriter`] corrupts
/// loads silently, so both sides are fixed.
const CREATE_FILE_FORMAT: &str = r"CREATE FILE FORMAT IF NOT EXISTS SNOWLIFT_CSV
    COMPRESSION = 'AUTO'
    FIELD_DELIMITER = ','
    RECORD_DELIMITER = '\n'
    SKIP_HEADER = 1
    FIELD_OPTIONALLY_ENCLOSED_BY = '\042'
    TRIM_SPACE = FALSE
    ERROR_ON_COLUMN_COUNT_MISMATCH = TRUE
    ESCAPE = 'NONE'
    ESCAPE_UNENCLOSED_FIELD = '\134'
    DATE_FORMAT = 'AUTO'
    TIMESTAMP_FORMAT = 'AUTO'
    NULL_IF = ('');";

/// Quote an identifier for the warehouse: upper-cased, double-quoted, with
/// embedded quotes doubled.
///
/// Every identifier that originates in job configuration goes through here;
/// nothing user-provided is concatenated into a statement raw.
pub fn quote_ident(name: &str) -> String {
    let upper = name.to_uppercase();
    format!("\"{}\"", upper.replace('"', "\"\""))
}

/// The ordered statements for one job, split at the stage/load boundary.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    /// Scaffolding and upload: create database/schema/file format/stage,
    /// then PUT the job's shard files.
    pub staging: Vec<String>,
    /// Materialization: re-assert context, create the target table from the
    /// stage by ordinal position, drop the stage.
    pub load: Vec<String>,
}

/// Build the [`LoadPlan`] for one job.
///
/// Column definitions and the positional SELECT list are derived from
/// `columns` in probe order, which is also the shard header order: `t.$1`
/// always refers to the first probed column.
///
/// # Errors
/// Returns [`Error::UnmappedType`](crate::Error::UnmappedType) if any
/// column's source type has no configured warehouse type.
pub fn build_load_plan(
    job: &Job,
    columns: &[ColumnDescriptor],
    mapper: &TypeMapper,
    shard_dir: &Path,
    load_warehouse: &str,
) -> Result<LoadPlan> {
    let database = quote_ident(&job.target.database);
    let schema = quote_ident(&job.target.schema);
    let table = quote_ident(&job.target.table);
    let stage = quote_ident(&job.name);
    let stage_prefix = job.name.to_uppercase();

    let column_defs = columns
        .iter()
        .map(|c| Ok(format!("{} {}", quote_ident(&c.name), mapper.target_type(c.source_type)?)))
        .collect::<Result<Vec<_>>>()?
        .join(",\n");
    let select_list = (1..=columns.len())
        .map(|n| format!("t.${n}"))
        .collect::<Vec<_>>()
        .join(",\n ");

    // PUT paths always use forward slashes, whatever the local OS says.
    let dir = shard_dir.to_string_lossy().replace('\\', "/");

    let staging = vec![
        format!("CREATE DATABASE IF NOT EXISTS {database};"),
        format!("USE DATABASE {database};"),
        format!("CREATE SCHEMA IF NOT EXISTS {schema};"),
        format!("USE SCHEMA {schema};"),
        CREATE_FILE_FORMAT.to_string(),
        format!("CREATE OR REPLACE STAGE {stage} FILE_FORMAT = {FILE_FORMAT_NAME};"),
        format!("PUT 'file://{dir}/{stage_prefix}.*.{SHARD_EXT}' @{stage} parallel=8;"),
    ];
    let load = vec![
        format!("USE DATABASE {database};"),
        format!("USE SCHEMA {schema};"),
        format!("USE WAREHOUSE {};", quote_ident(load_warehouse)),
        format!(
            "CREATE OR REPLACE TABLE {schema}.{table}\n({column_defs}\n) AS SELECT\n {select_list}\nFROM @{stage} t;"
        ),
        format!("DROP STAGE {stage};"),
    ];

    Ok(LoadPlan { staging, load })
}

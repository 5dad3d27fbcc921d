//! Whole-run orchestration: probe every job, extract each into shards, then
//! stage and load everything in two phases.

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::executor::{LoadExecutor, WarehouseClient};
use crate::extract::ParallelExtractor;
use crate::plan::{LoadPlan, build_load_plan};
use crate::source::{RowStreamer, SourceClient, probe_schema};
use crate::typemap::TypeMapper;
use tracing::info;

/// Execute one complete run.
///
/// Order of operations:
/// 1. Probe every job's schema and check type-mapping coverage, before any
///    extraction. A bad probe or an unmapped type therefore aborts the run
///    with no shard written and no warehouse statement executed.
/// 2. Per job, in job-list order: stream the extraction query in batches
///    into worker-owned gzip CSV shards under a run-scoped temp directory,
///    then generate the job's load plan from the probed schema.
/// 3. Hand all plans to the two-phase executor: every job's staging
///    statements, then every job's load statements.
///
/// The temp directory outlives the staging phase (the PUT statements read
/// from it) and is removed when this function returns, success or not.
/// There is no rollback of warehouse-side objects: a failure mid-run can
/// leave a stage, file format, or partially-created table behind.
///
/// # Errors
/// Any error is fatal to the whole run; remaining jobs are not attempted.
pub fn run(
    config: &RunConfig,
    source: &dyn SourceClient,
    warehouse: &dyn WarehouseClient,
) -> Result<()> {
    config.source.validate()?;
    let mapper = TypeMapper::new(config.type_map.clone());
    let extractor = ParallelExtractor::default();

    // Probe everything up front so schema or mapping problems surface
    // before the first shard is written.
    let mut schemas = Vec::with_capacity(config.jobs.len());
    for job in &config.jobs {
        let columns = probe_schema(source, &job.query)?;
        mapper.check_coverage(&columns)?;
        schemas.push(columns);
    }

    let tempdir = tempfile::tempdir().map_err(|e| Error::ShardWrite {
        path: std::env::temp_dir(),
        source: e.into(),
    })?;

    let mut plans: Vec<(String, LoadPlan)> = Vec::with_capacity(config.jobs.len());
    for (job, columns) in config.jobs.iter().zip(&schemas) {
        info!("Extracting {}", job.name);
        let header: Vec<String> = columns.iter().map(|c| c.name.to_uppercase()).collect();
        let cursor = source.execute(&job.query)?;
        extractor.extract(tempdir.path(), &job.name, &header, RowStreamer::new(cursor))?;
        let plan = build_load_plan(
            job,
            columns,
            &mapper,
            tempdir.path(),
            &config.warehouse.load_warehouse,
        )?;
        plans.push((job.name.clone(), plan));
    }

    LoadExecutor::new(warehouse).execute(&plans)
}

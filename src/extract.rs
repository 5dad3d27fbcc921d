//! Bounded worker pool turning a job's row batches into shard files.

use crate::error::Result;
use crate::shard::ShardWriter;
use crate::source::RowBatch;
use std::path::Path;
use std::sync::mpsc::sync_channel;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::debug;

/// Dispatches row batches to a fixed-size worker pool for serialization.
///
/// One pool serves one job at a time; jobs are never extracted
/// concurrently. Each worker keeps a stable index for the life of the pool
/// and owns the shard file named after it, so a job produces at most
/// `workers` shards and every shard has a single writer.
///
/// Batches move over a rendezvous channel: the controller blocks on each
/// hand-off until a worker takes the batch, so no more than one batch is in
/// flight beyond what the pool is already writing. That bounds memory to
/// O(workers × batch size) and keeps the source from being over-read while
/// shard writes are in progress.
pub struct ParallelExtractor {
    workers: usize,
}

impl Default for ParallelExtractor {
    /// Pool sized to the machine's available parallelism.
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl ParallelExtractor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drain `batches` into shard files for `job_name` under `dir`, blocking
    /// until every dispatched batch is written before returning.
    ///
    /// `header` is the upper-cased column-name record each worker stamps
    /// once onto its own shard.
    ///
    /// # Errors
    /// The first failure wins: a source error from `batches` or an
    /// [`Error::ShardWrite`](crate::Error::ShardWrite) from any worker fails
    /// the whole job. Partially written shards are left for the temp
    /// directory's own teardown.
    pub fn extract(
        &self,
        dir: &Path,
        job_name: &str,
        header: &[String],
        batches: impl Iterator<Item = Result<RowBatch>>,
    ) -> Result<()> {
        let job_upper = job_name.to_uppercase();
        thread::scope(|scope| {
            let (tx, rx) = sync_channel::<RowBatch>(0);
            let rx = Arc::new(Mutex::new(rx));

            let mut handles = Vec::with_capacity(self.workers);
            for worker_id in 0..self.workers {
                let rx = Arc::clone(&rx);
                let writer = ShardWriter::new(dir, &job_upper, worker_id, header.to_vec());
                handles.push(scope.spawn(move || -> Result<()> {
                    loop {
                        // Hold the receiver lock only for the hand-off, so
                        // another worker can rendezvous with the controller
                        // while this one is writing.
                        let batch = { rx.lock().unwrap().recv() };
                        match batch {
                            Ok(rows) => {
                                debug!(
                                    worker = worker_id,
                                    rows = rows.len(),
                                    shard = %writer.path().display(),
                                    "writing batch"
                                );
                                writer.write_batch(&rows)?;
                            }
                            // Channel closed: the job's stream is drained.
                            Err(_) => return Ok(()),
                        }
                    }
                }));
            }
            // The workers hold the only receiver references from here on, so
            // a send fails fast once every worker has exited.
            drop(rx);

            let mut first_err = None;
            for batch in batches {
                match batch {
                    Ok(rows) => {
                        // Send fails only when every worker has exited, which
                        // means one of them already hit an error.
                        if tx.send(rows).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        first_err = Some(e);
                        break;
                    }
                }
            }
            drop(tx);

            for handle in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        if first_err.is_none() {
                            first_err = Some(e);
                        }
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            match first_err {
                Some(e) => Err(e),
                None => Ok(()),
            }
        })
    }
}

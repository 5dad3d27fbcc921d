//! Two-phase execution of load plans against the warehouse.

use crate::error::Result;
use crate::plan::LoadPlan;
use tracing::{debug, info};

/// A live warehouse session that can execute statements.
pub trait WarehouseSession {
    /// Execute one statement.
    ///
    /// # Errors
    /// Returns [`Error::WarehouseStatement`](crate::Error::WarehouseStatement)
    /// if the warehouse rejects the statement or the connection drops.
    fn execute(&mut self, statement: &str) -> Result<()>;
}

/// An opaque warehouse connection provider.
///
/// The executor opens one session per phase: staging is upload-heavy I/O,
/// loading is warehouse-compute-heavy, and the two intentionally do not
/// share a session with each other or with extraction.
pub trait WarehouseClient {
    /// Open a fresh session.
    ///
    /// # Errors
    /// Returns [`Error::WarehouseStatement`](crate::Error::WarehouseStatement)
    /// if a connection cannot be established.
    fn session(&self) -> Result<Box<dyn WarehouseSession + '_>>;
}

/// Runs every job's staging statements before any job's load statements.
///
/// Within each phase, jobs run in job-list order and each job's statements
/// run in plan order. Uploading everything first lets the compute-bound
/// table materializations batch up after all transfers have landed.
pub struct LoadExecutor<'a> {
    client: &'a dyn WarehouseClient,
}

impl<'a> LoadExecutor<'a> {
    pub fn new(client: &'a dyn WarehouseClient) -> Self {
        Self { client }
    }

    /// Execute all plans: phase one (staging) across every job, then phase
    /// two (load) across every job.
    ///
    /// # Errors
    /// The first failed statement aborts the remainder of the run, across
    /// all jobs. Already-created stages, file formats, or tables are left
    /// behind for the operator to clean up.
    pub fn execute(&self, plans: &[(String, LoadPlan)]) -> Result<()> {
        let mut session = self.client.session()?;
        for (job, plan) in plans {
            info!("Uploading {job}");
            for statement in &plan.staging {
                debug!(job = %job, %statement, "staging");
                session.execute(statement)?;
            }
        }
        drop(session);

        let mut session = self.client.session()?;
        for (job, plan) in plans {
            info!("Loading {job}");
            for statement in &plan.load {
                debug!(job = %job, %statement, "loading");
                session.execute(statement)?;
            }
        }
        for (job, _) in plans {
            info!("Completed {job}");
        }
        Ok(())
    }
}

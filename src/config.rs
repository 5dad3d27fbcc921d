//! Run configuration: connection parameters, the job list, and the
//! type-mapping table.
//!
//! Everything a run needs is constructed once at process start and passed
//! down by reference; no component reads process environment or other
//! ambient state directly. `${NAME}` tokens in the job file are substituted
//! from a caller-supplied variable map before parsing.

use crate::error::{Error, Result};
use crate::job::{Job, LoadTarget};
use crate::source::SourceType;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

/// The complete configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SourceParams,
    pub warehouse: WarehouseParams,
    /// Jobs in run order.
    pub jobs: Vec<Job>,
    /// Source-type token to warehouse type name.
    pub type_map: HashMap<SourceType, String>,
}

/// Connection parameters for the relational source.
///
/// Consumed by the embedder's [`SourceClient`](crate::SourceClient)
/// implementation; the pipeline itself never opens connections.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceParams {
    pub driver: String,
    pub server: String,
    /// When true, authentication is delegated to the ambient identity and
    /// no username/password is required.
    #[serde(default)]
    pub trusted_connection: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl SourceParams {
    /// # Errors
    /// Returns [`Error::Config`] if credentials are required but missing.
    pub fn validate(&self) -> Result<()> {
        if !self.trusted_connection && (self.username.is_none() || self.password.is_none()) {
            return Err(Error::Config(
                "source username and password are required without a trusted connection".into(),
            ));
        }
        Ok(())
    }
}

/// Connection parameters for the warehouse.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseParams {
    pub account: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Compute context selected before table materialization.
    #[serde(default = "default_load_warehouse")]
    pub load_warehouse: String,
}

fn default_load_warehouse() -> String {
    "LOAD_WH".to_string()
}

/// Substitute `${NAME}` tokens in `text` from `vars`.
///
/// # Errors
/// Returns [`Error::Config`] for a token with no entry in `vars`.
pub fn substitute_vars(text: &str, vars: &HashMap<String, String>) -> Result<String> {
    let token = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in token.captures_iter(text) {
        let m = caps.get(0).unwrap();
        let name = &caps[1];
        let value = vars
            .get(name)
            .ok_or_else(|| Error::Config(format!("undefined variable `${{{name}}}` in job file")))?;
        out.push_str(&text[last..m.start()]);
        out.push_str(value);
        last = m.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[derive(Deserialize)]
struct JobSpec {
    extract: ExtractSpec,
    load: LoadTarget,
}

#[derive(Deserialize)]
struct ExtractSpec {
    query: String,
}

/// Parse the job file: a JSON array wrapping one object keyed by job name,
/// in run order. `${NAME}` tokens are substituted from `vars` first.
///
/// ```json
/// [{
///   "orders": {
///     "extract": { "query": "select * from dbo.orders" },
///     "load": { "database": "analytics", "schema": "raw", "table": "orders" }
///   }
/// }]
/// ```
///
/// # Errors
/// Returns [`Error::Config`] on substitution failures, malformed JSON, or a
/// job missing its extract/load sections.
pub fn load_jobs(text: &str, vars: &HashMap<String, String>) -> Result<Vec<Job>> {
    let text = substitute_vars(text, vars)?;
    let mut docs: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(&text).map_err(|e| Error::Config(format!("job file: {e}")))?;
    if docs.is_empty() {
        return Err(Error::Config("job file holds no job object".into()));
    }
    let map = docs.remove(0);
    let mut jobs = Vec::with_capacity(map.len());
    for (name, spec) in map {
        let spec: JobSpec = serde_json::from_value(spec)
            .map_err(|e| Error::Config(format!("job `{name}`: {e}")))?;
        jobs.push(Job {
            name,
            query: spec.extract.query,
            target: spec.load,
        });
    }
    Ok(jobs)
}

/// Parse the type-mapping file: a JSON array wrapping one object from
/// source-type token to warehouse type name.
///
/// Unknown tokens fail here, at load time, rather than surfacing later as a
/// per-column lookup miss.
///
/// # Errors
/// Returns [`Error::Config`] on malformed JSON or an unrecognized token.
pub fn load_type_map(text: &str) -> Result<HashMap<SourceType, String>> {
    let mut docs: Vec<HashMap<SourceType, String>> =
        serde_json::from_str(text).map_err(|e| Error::Config(format!("type mapping: {e}")))?;
    if docs.is_empty() {
        return Err(Error::Config("type mapping holds no mapping object".into()));
    }
    Ok(docs.remove(0))
}

//! Source-to-warehouse type mapping.

use crate::error::{Error, Result};
use crate::source::{ColumnDescriptor, SourceType};
use std::collections::HashMap;

/// Maps a source column's type-identity token to a warehouse column type
/// name.
///
/// Loaded once per run from the static mapping configuration and shared
/// read-only across jobs and workers. A miss is [`Error::UnmappedType`] and
/// aborts the job: loading with a wrong or guessed type corrupts the
/// warehouse schema, so there is no fallback.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    map: HashMap<SourceType, String>,
}

impl TypeMapper {
    pub fn new(map: HashMap<SourceType, String>) -> Self {
        Self { map }
    }

    /// Look up the warehouse type name for `source_type`.
    ///
    /// # Errors
    /// Returns [`Error::UnmappedType`] if no mapping is configured.
    pub fn target_type(&self, source_type: SourceType) -> Result<&str> {
        self.map
            .get(&source_type)
            .map(String::as_str)
            .ok_or(Error::UnmappedType(source_type))
    }

    /// Verify every probed column has a mapping.
    ///
    /// Called right after the schema probe so an unmapped type aborts the
    /// job before any shard file is written or any warehouse statement runs.
    ///
    /// # Errors
    /// Returns [`Error::UnmappedType`] for the first uncovered column type.
    pub fn check_coverage(&self, columns: &[ColumnDescriptor]) -> Result<()> {
        for column in columns {
            self.target_type(column.source_type)?;
        }
        Ok(())
    }
}

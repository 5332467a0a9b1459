//! Persisted table boundary.
//!
//! The table is read once at the start of a run and written once at the end
//! (full-snapshot replace). A single writer is assumed. Recovery from corrupt
//! persisted state happens here, in [`load_prior`], and nowhere else.

pub mod delimited;
pub mod flat_file;
pub mod in_memory;

pub use flat_file::FlatFileRepository;
pub use in_memory::InMemoryRepository;

use crate::domain::Table;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use tracing::{info, warn};

#[async_trait]
pub trait TableRepository: Send + Sync {
    /// Human-readable location for logs
    fn location(&self) -> String;

    /// `Ok(None)` when nothing has been persisted yet.
    /// Unreadable content is reported as [`ScraperError::CorruptTable`].
    async fn load(&self) -> Result<Option<Table>>;

    /// Replaces the persisted table with `table`
    async fn save(&self, table: &Table) -> Result<()>;

    /// Moves corrupt persisted state aside before it is overwritten.
    /// Returns where it went, if anywhere.
    async fn quarantine(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Outcome of reading the previously persisted table
#[derive(Debug, Clone, PartialEq)]
pub enum PriorTable {
    Missing,
    Loaded(Table),
    /// The stored table could not be parsed and is treated as empty
    Recovered { reason: String },
}

impl PriorTable {
    pub fn was_recovered(&self) -> bool {
        matches!(self, PriorTable::Recovered { .. })
    }

    pub fn into_table(self) -> Table {
        match self {
            PriorTable::Loaded(table) => table,
            PriorTable::Missing | PriorTable::Recovered { .. } => Table::default(),
        }
    }
}

/// Loads the prior table, degrading corrupt state to an empty table.
///
/// Corruption is lossy, so it is logged as a warning and the corrupt content
/// is quarantined when the repository supports it.
pub async fn load_prior(repository: &dyn TableRepository) -> Result<PriorTable> {
    match repository.load().await {
        Ok(Some(table)) => {
            info!("Loaded {} persisted rows from {}", table.len(), repository.location());
            Ok(PriorTable::Loaded(table))
        }
        Ok(None) => {
            info!("No persisted table at {}, starting fresh", repository.location());
            Ok(PriorTable::Missing)
        }
        Err(ScraperError::CorruptTable { reason }) => {
            warn!(
                location = %repository.location(),
                %reason,
                "Persisted table is corrupt; continuing with an empty prior table (previous rows will not be merged)"
            );
            match repository.quarantine().await {
                Ok(Some(moved_to)) => warn!("Corrupt table preserved at {}", moved_to),
                Ok(None) => {}
                Err(e) => warn!("Could not preserve corrupt table: {}", e),
            }
            Ok(PriorTable::Recovered { reason })
        }
        Err(e) => Err(e),
    }
}

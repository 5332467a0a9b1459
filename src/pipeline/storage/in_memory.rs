use super::TableRepository;
use crate::domain::Table;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory table repository for development/testing
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    table: Arc<Mutex<Option<Table>>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: Table) -> Self {
        Self {
            table: Arc::new(Mutex::new(Some(table))),
            saves: Arc::new(Mutex::new(0)),
        }
    }

    /// Currently stored table, if any
    pub async fn snapshot(&self) -> Option<Table> {
        self.table.lock().await.clone()
    }

    /// Number of completed saves
    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl TableRepository for InMemoryRepository {
    fn location(&self) -> String {
        "memory://table".to_string()
    }

    async fn load(&self) -> Result<Option<Table>> {
        Ok(self.table.lock().await.clone())
    }

    async fn save(&self, table: &Table) -> Result<()> {
        *self.table.lock().await = Some(table.clone());
        *self.saves.lock().await += 1;
        debug!("Stored {} rows in memory", table.len());
        Ok(())
    }
}

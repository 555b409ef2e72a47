//! Unit of Work: hands out persistence sessions.
//!
//! Nothing holds a process-wide entity manager. The dispatcher asks the unit
//! of work for a fresh session at the start of every request and drops it at
//! the end; writes the session has not flushed are rolled back on drop.

use std::sync::Arc;

use async_trait::async_trait;

use common::{AppError, AppResult};

use super::Database;
use crate::repository::{UserRepository, UserStore};

/// Source of request-scoped repository sessions.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Open a persistence session for one request
    fn session(&self) -> Arc<dyn UserRepository>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// SeaORM-backed implementation of UnitOfWork
pub struct Persistence {
    database: Database,
}

impl Persistence {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn session(&self) -> Arc<dyn UserRepository> {
        Arc::new(UserStore::new(self.database.get_connection()))
    }

    async fn ping(&self) -> AppResult<()> {
        self.database.ping().await.map_err(AppError::from)
    }
}

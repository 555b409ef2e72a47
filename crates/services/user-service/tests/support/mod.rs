//! Shared fixtures: an in-memory user store behind the persistence seams.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{PasswordSalt, User, UserFilter};
use user_service_lib::config::{AuthorizationMode, UserServiceConfig};
use user_service_lib::infra::UnitOfWork;
use user_service_lib::repository::UserRepository;
use user_service_lib::service::UserManager;

pub const TEST_SALT: &str = "test-salt";

#[derive(Default)]
struct Table {
    rows: Vec<User>,
    next_id: i64,
}

/// In-memory repository. Writes apply immediately, `flush` only counts calls.
#[derive(Clone, Default)]
pub struct InMemoryUsers {
    table: Arc<Mutex<Table>>,
    flushes: Arc<Mutex<usize>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }

    pub fn flushes(&self) -> usize {
        *self.flushes.lock().unwrap()
    }

    /// Insert a row directly, bypassing the user model.
    pub fn seed(&self, user: User) -> User {
        let mut table = self.table.lock().unwrap();
        table.next_id += 1;
        let user = User {
            id: table.next_id,
            ..user
        };
        table.rows.push(user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by(&self, filter: &UserFilter) -> AppResult<Vec<User>> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(self.table.lock().unwrap().rows.clone())
    }

    async fn persist(&self, user: User) -> AppResult<User> {
        Ok(self.seed(user))
    }

    async fn merge(&self, user: User) -> AppResult<User> {
        let mut table = self.table.lock().unwrap();
        let row = table
            .rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AppError::NotFound)?;
        *row = user.clone();
        Ok(user)
    }

    async fn remove(&self, user: &User) -> AppResult<()> {
        let mut table = self.table.lock().unwrap();
        let before = table.rows.len();
        table.rows.retain(|u| u.id != user.id);
        if table.rows.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn flush(&self) -> AppResult<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Unit of work handing out sessions over one shared in-memory table.
#[derive(Clone, Default)]
pub struct InMemoryUnitOfWork {
    pub users: InMemoryUsers,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn session(&self) -> Arc<dyn UserRepository> {
        Arc::new(self.users.clone())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub fn salt() -> PasswordSalt {
    PasswordSalt::new(TEST_SALT)
}

pub fn manager(users: &InMemoryUsers) -> UserManager {
    UserManager::new(Arc::new(users.clone()), salt())
}

pub fn config(mode: AuthorizationMode) -> UserServiceConfig {
    let mut config = UserServiceConfig::default().with_password_salt(TEST_SALT);
    config.authorization = mode;
    config
}

pub fn member(id: i64, role: &str) -> User {
    User {
        id,
        email: format!("member{}@example.com", id),
        role: role.to_string(),
        name: format!("Member {}", id),
        ..User::default()
    }
}

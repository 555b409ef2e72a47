//! Application state for dependency injection.

use std::sync::Arc;

use domain::PasswordSalt;

use crate::authz::policy_for;
use crate::config::UserServiceConfig;
use crate::dispatch::{ActionRegistry, Dispatcher};
use crate::infra::UnitOfWork;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub uow: Arc<dyn UnitOfWork>,
}

impl AppState {
    /// Wire the standard actions and the configured policy over `uow`.
    pub fn new(config: &UserServiceConfig, uow: Arc<dyn UnitOfWork>) -> Self {
        let dispatcher = Dispatcher::new(
            ActionRegistry::standard(),
            policy_for(config.authorization),
            uow.clone(),
            PasswordSalt::new(config.password_salt()),
        );

        Self {
            dispatcher: Arc::new(dispatcher),
            uow,
        }
    }
}

//! Routes one request to its action handler.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use domain::{PasswordSalt, User};

use super::envelope::Dispatch;
use super::registry::{ActionContext, ActionRegistry};
use super::route::{ActionPath, Verb};
use crate::authz::Authorizer;
use crate::infra::UnitOfWork;
use crate::service::UserManager;

/// Transport-neutral request as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub verb: Verb,
    /// `<action>[/<id>]`, leading and trailing slashes allowed
    pub path: String,
    pub body: Option<Value>,
    pub query: HashMap<String, String>,
}

impl ActionRequest {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            body: None,
            query: HashMap::new(),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// Action dispatcher: parse, authorize, resolve, run.
pub struct Dispatcher {
    registry: ActionRegistry,
    authorizer: Arc<dyn Authorizer>,
    uow: Arc<dyn UnitOfWork>,
    salt: PasswordSalt,
}

impl Dispatcher {
    pub fn new(
        registry: ActionRegistry,
        authorizer: Arc<dyn Authorizer>,
        uow: Arc<dyn UnitOfWork>,
        salt: PasswordSalt,
    ) -> Self {
        Self {
            registry,
            authorizer,
            uow,
            salt,
        }
    }

    /// User model over a fresh persistence session.
    pub fn users(&self) -> UserManager {
        UserManager::new(self.uow.session(), self.salt.clone())
    }

    /// Dispatch `request` on behalf of `identity`.
    pub async fn dispatch(&self, identity: &User, request: ActionRequest) -> Dispatch {
        let Some(route) = ActionPath::parse(&request.path) else {
            tracing::debug!("Request names no action");
            return Dispatch::NoAction;
        };

        let permission = request.verb.permission();
        if !self.authorizer.can(identity, permission, &route.action.to_lowercase()) {
            tracing::warn!(
                action = %route.action,
                %permission,
                user_id = identity.id,
                "Action denied"
            );
            return Dispatch::Forbidden {
                action: route.action,
            };
        }

        let Some(handler) = self.registry.resolve(request.verb, &route.action) else {
            tracing::warn!(action = %route.action, verb = ?request.verb, "Action not available");
            return Dispatch::Unknown {
                action: route.action,
            };
        };

        let users = self.users();
        let ctx = ActionContext {
            id: route.id,
            body: request.body.as_ref(),
            query: &request.query,
            users: &users,
        };

        tracing::debug!(action = handler.method(), id = route.id, "Dispatching action");
        Dispatch::Handled(handler.handle(&ctx).await)
    }
}

//! Action handlers and the table that routes `(verb, action)` to them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use common::AppResult;

use super::envelope::Envelope;
use super::route::Verb;
use crate::handlers;
use crate::service::UserService;

/// Everything a handler may look at while serving one request.
pub struct ActionContext<'a> {
    /// Id from the path, `0` when absent
    pub id: i64,
    /// Decoded JSON body, if the request carried one
    pub body: Option<&'a Value>,
    /// Query string parameters
    pub query: &'a HashMap<String, String>,
    /// User model bound to this request's persistence session
    pub users: &'a dyn UserService,
}

impl ActionContext<'_> {
    /// Query parameter parsed as an id, `0` when absent or not a number
    pub fn query_id(&self) -> i64 {
        self.query
            .get("id")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Path id, falling back to the `id` query parameter
    pub fn path_or_query_id(&self) -> i64 {
        if self.id > 0 {
            self.id
        } else {
            self.query_id()
        }
    }
}

/// One named action.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Name echoed in the envelope's `method` key
    fn method(&self) -> &'static str;

    /// Envelope key holding the payload
    fn payload_key(&self) -> &'static str;

    /// Produce the payload, or the error reported in the envelope
    async fn run(&self, ctx: &ActionContext<'_>) -> AppResult<Value>;

    /// Run the action and wrap the outcome into an envelope.
    async fn handle(&self, ctx: &ActionContext<'_>) -> Envelope {
        let envelope = Envelope::new(self.method(), self.payload_key());
        envelope.complete(self.run(ctx).await)
    }
}

/// Handlers keyed by verb and lower-cased action name.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<(Verb, String), Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every user action.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Verb::Post, Arc::new(handlers::Register));
        registry.register(Verb::Get, Arc::new(handlers::Read));
        registry.register(Verb::Get, Arc::new(handlers::GetUsers));
        registry.register(Verb::Get, Arc::new(handlers::GetUser));
        registry.register(Verb::Post, Arc::new(handlers::Update));
        registry.register(Verb::Get, Arc::new(handlers::Cancel));
        registry
    }

    /// Register `handler` under its method name. A later registration for the
    /// same verb and name replaces the earlier one.
    pub fn register(&mut self, verb: Verb, handler: Arc<dyn ActionHandler>) {
        let name = handler.method().to_lowercase();
        self.handlers.insert((verb, name), handler);
    }

    /// Look up the handler for `action`, ignoring case.
    pub fn resolve(&self, verb: Verb, action: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(&(verb, action.to_lowercase())).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

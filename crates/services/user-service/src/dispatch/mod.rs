//! Action dispatcher: maps `<action>[/<id>]` requests to handlers.

mod dispatcher;
mod envelope;
mod registry;
mod route;

pub use dispatcher::{ActionRequest, Dispatcher};
pub use envelope::{to_payload, Dispatch, Envelope, Refusal};
pub use registry::{ActionContext, ActionHandler, ActionRegistry};
pub use route::{ActionPath, Verb};

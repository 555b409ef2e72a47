//! HTTP surface of the user service.

mod handlers;
mod routes;
mod state;

pub use handlers::{health_check, HealthResponse};
pub use routes::create_router;
pub use state::AppState;

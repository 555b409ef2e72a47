//! User action handlers.

mod user_actions;

pub use user_actions::{Cancel, GetUser, GetUsers, Read, Register, Update};

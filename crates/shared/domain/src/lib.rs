//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user record, its identity checks, the field-mapping conventions used
//! to read and write it from loosely-typed input, and password salting.

pub mod constants;
pub mod error;
pub mod fields;
pub mod password;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use fields::{Criterion, UserChanges, UserField, UserFilter, UserView};
pub use password::PasswordSalt;
pub use user::User;

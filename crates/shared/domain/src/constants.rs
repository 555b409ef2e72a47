//! Domain-level constants.
//!
//! These constants define business rules and well-known values.

// =============================================================================
// User Roles
// =============================================================================

/// Role of the placeholder identity that stands for "no user"
pub const ROLE_ANONYMOUS: &str = "anonymous";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// Name and email carried by the anonymous identity
pub const ANONYMOUS_NAME: &str = "anonymous";

// =============================================================================
// Persistence
// =============================================================================

/// Id of a record that was never persisted
pub const UNSAVED_ID: i64 = 0;

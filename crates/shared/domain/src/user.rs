//! User domain entity and identity checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ANONYMOUS_NAME, ROLE_ADMIN, ROLE_ANONYMOUS, UNSAVED_ID};

/// User domain entity
///
/// `id == 0` marks a record that has not been persisted. Roles are free-form
/// strings; only `anonymous` and `admin` carry meaning in this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Salted password hash as stored
    pub password: String,
    pub role: String,
    pub name: String,
    /// Maintained by the authentication layer
    pub last_login: Option<DateTime<Utc>>,
    /// Link to the payment gateway's customer record
    pub gateway_customer_id: Option<i64>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: UNSAVED_ID,
            email: String::new(),
            password: String::new(),
            role: String::new(),
            name: String::new(),
            last_login: None,
            gateway_customer_id: None,
        }
    }
}

impl User {
    /// The "no user" sentinel. Constructed on demand, never persisted.
    pub fn anonymous() -> Self {
        Self {
            id: UNSAVED_ID,
            email: ANONYMOUS_NAME.to_string(),
            role: ROLE_ANONYMOUS.to_string(),
            name: ANONYMOUS_NAME.to_string(),
            ..Self::default()
        }
    }

    /// Whether the record has been assigned an id by the database
    pub fn is_persisted(&self) -> bool {
        self.id > UNSAVED_ID
    }

    /// True for a persisted, non-anonymous identity
    pub fn is_logged_in(&self) -> bool {
        self.is_persisted() && self.role != ROLE_ANONYMOUS
    }

    /// Case-insensitive role comparison
    pub fn has_role(&self, role: &str) -> bool {
        self.role.to_lowercase() == role.to_lowercase()
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_anonymous(&self) -> bool {
        self.has_role(ROLE_ANONYMOUS)
    }

    /// Roles held by this identity (always exactly one)
    pub fn roles(&self) -> Vec<&str> {
        vec![self.role.as_str()]
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }
}

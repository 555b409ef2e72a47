//! Field mapping between loosely-typed key/value input and [`User`] records.
//!
//! Request bodies and query strings arrive as JSON-like maps. Only keys named
//! by [`UserField`] are recognized; every other key is ignored. Decoding
//! produces a [`UserChanges`] (a partial update), encoding produces a flat
//! [`UserView`], and [`UserFilter`] turns a map into exact-match criteria.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::user::User;

/// Recognized user record fields, keyed by their snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Id,
    Email,
    Password,
    Role,
    Name,
    LastLogin,
    GatewayCustomerId,
}

impl UserField {
    pub const ALL: [UserField; 7] = [
        UserField::Id,
        UserField::Email,
        UserField::Password,
        UserField::Role,
        UserField::Name,
        UserField::LastLogin,
        UserField::GatewayCustomerId,
    ];

    /// Key used in request and response maps
    pub fn key(self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Email => "email",
            UserField::Password => "password",
            UserField::Role => "role",
            UserField::Name => "name",
            UserField::LastLogin => "last_login",
            UserField::GatewayCustomerId => "gateway_customer_id",
        }
    }

    /// Resolve a map key; unknown keys yield `None`
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Whether the field may be used as an equality filter
    pub fn is_filterable(self) -> bool {
        !matches!(self, UserField::LastLogin)
    }
}

// =============================================================================
// Decode
// =============================================================================

/// Partial set of field values decoded from request input.
///
/// `None` means "absent": the field is left untouched on update and
/// defaulted on create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub gateway_customer_id: Option<i64>,
}

impl UserChanges {
    /// Decode recognized keys from a JSON object. Null values count as absent.
    pub fn from_map(map: &Map<String, Value>) -> DomainResult<Self> {
        let mut changes = Self::default();

        for (key, value) in map {
            let Some(field) = UserField::from_key(key) else {
                continue;
            };

            match field {
                UserField::Id => changes.id = integer(field, value)?,
                UserField::Email => changes.email = text(field, value)?,
                UserField::Password => changes.password = text(field, value)?,
                UserField::Role => changes.role = text(field, value)?,
                UserField::Name => changes.name = text(field, value)?,
                UserField::GatewayCustomerId => {
                    changes.gateway_customer_id = integer(field, value)?
                }
                // Maintained by the authentication layer
                UserField::LastLogin => {}
            }
        }

        Ok(changes)
    }

    /// Decode an arbitrary JSON value. `null` decodes to no changes.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Self::from_map(map),
            _ => Err(DomainError::validation("Request body must be a JSON object")),
        }
    }

    /// True when no recognized field was supplied
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Id of the record to merge into, if the input selects one.
    /// Absent or non-positive ids select the create path.
    pub fn target_id(&self) -> Option<i64> {
        self.id.filter(|id| *id > 0)
    }

    /// Apply every present field to `user`. The id is never touched.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(password) = &self.password {
            user.password = password.clone();
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
        if let Some(gateway_customer_id) = self.gateway_customer_id {
            user.gateway_customer_id = Some(gateway_customer_id);
        }
    }
}

fn invalid(field: UserField) -> DomainError {
    DomainError::validation(format!("Invalid value for field '{}'", field.key()))
}

fn text(field: UserField, value: &Value) -> DomainResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(invalid(field)),
    }
}

fn integer(field: UserField, value: &Value) -> DomainResult<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(|| invalid(field)),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(field)),
        _ => Err(invalid(field)),
    }
}

// =============================================================================
// Encode
// =============================================================================

/// Flat representation returned by every handler that yields a user.
///
/// Includes the stored password hash, never the plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub role: String,
    pub name: String,
    pub last_login: Option<DateTime<Utc>>,
    pub gateway_customer_id: Option<i64>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            password: user.password.clone(),
            role: user.role.clone(),
            name: user.name.clone(),
            last_login: user.last_login,
            gateway_customer_id: user.gateway_customer_id,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            password: user.password,
            role: user.role,
            name: user.name,
            last_login: user.last_login,
            gateway_customer_id: user.gateway_customer_id,
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Single exact-match (case-sensitive) condition on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Id(i64),
    Email(String),
    Password(String),
    Role(String),
    Name(String),
    GatewayCustomerId(i64),
}

impl Criterion {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Criterion::Id(id) => user.id == *id,
            Criterion::Email(email) => user.email == *email,
            Criterion::Password(password) => user.password == *password,
            Criterion::Role(role) => user.role == *role,
            Criterion::Name(name) => user.name == *name,
            Criterion::GatewayCustomerId(id) => user.gateway_customer_id == Some(*id),
        }
    }
}

/// Conjunction of criteria. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    criteria: Vec<Criterion>,
}

impl UserFilter {
    /// Keep only filterable, non-empty keys from `params`.
    pub fn from_params(params: &Map<String, Value>) -> DomainResult<Self> {
        let mut criteria = Vec::new();

        for (key, value) in params {
            let Some(field) = UserField::from_key(key).filter(|f| f.is_filterable()) else {
                continue;
            };
            if is_blank(value) {
                continue;
            }

            let criterion = match field {
                UserField::Id => integer(field, value)?.map(Criterion::Id),
                UserField::Email => text(field, value)?.map(Criterion::Email),
                UserField::Password => text(field, value)?.map(Criterion::Password),
                UserField::Role => text(field, value)?.map(Criterion::Role),
                UserField::Name => text(field, value)?.map(Criterion::Name),
                UserField::GatewayCustomerId => {
                    integer(field, value)?.map(Criterion::GatewayCustomerId)
                }
                UserField::LastLogin => None,
            };
            criteria.extend(criterion);
        }

        Ok(Self { criteria })
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            criteria: vec![Criterion::Email(email.into())],
        }
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, user: &User) -> bool {
        self.criteria.iter().all(|criterion| criterion.matches(user))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

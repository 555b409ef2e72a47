//! Authorization gate consulted by the dispatcher before any handler runs.

use std::fmt;
use std::sync::Arc;

use domain::User;

use crate::config::AuthorizationMode;

/// Capability required by a request, derived from its verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Read,
    Write,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Yes/no capability check for an identity on a named resource.
pub trait Authorizer: Send + Sync {
    fn can(&self, identity: &User, permission: Permission, resource: &str) -> bool;
}

/// Allows every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenPolicy;

impl Authorizer for OpenPolicy {
    fn can(&self, _identity: &User, _permission: Permission, _resource: &str) -> bool {
        true
    }
}

/// Role-based rules:
/// - admins may do anything
/// - anyone may write `register`
/// - `cancel` (a read that deletes) requires admin
/// - logged-in users may read
/// - every other write requires admin
#[derive(Debug, Clone, Default)]
pub struct RolePolicy {
    open_writes: Vec<String>,
    admin_only: Vec<String>,
}

impl RolePolicy {
    pub fn new() -> Self {
        Self {
            open_writes: vec!["register".to_string()],
            admin_only: vec!["cancel".to_string()],
        }
    }
}

fn listed(names: &[String], resource: &str) -> bool {
    names.iter().any(|name| name.eq_ignore_ascii_case(resource))
}

impl Authorizer for RolePolicy {
    fn can(&self, identity: &User, permission: Permission, resource: &str) -> bool {
        if identity.is_logged_in() && identity.is_admin() {
            return true;
        }

        if listed(&self.admin_only, resource) {
            return false;
        }

        match permission {
            Permission::Read => identity.is_logged_in(),
            Permission::Write => listed(&self.open_writes, resource),
        }
    }
}

/// Build the policy selected by configuration.
pub fn policy_for(mode: AuthorizationMode) -> Arc<dyn Authorizer> {
    match mode {
        AuthorizationMode::Open => Arc::new(OpenPolicy),
        AuthorizationMode::Role => Arc::new(RolePolicy::new()),
    }
}

//! Request verb and `<action>[/<id>]` path parsing.

use axum::http::Method;

use crate::authz::Permission;

/// Transport verb an action is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    /// Map a transport method; only GET and POST carry actions.
    pub fn from_method(method: &Method) -> Option<Self> {
        if method == Method::GET {
            Some(Verb::Get)
        } else if method == Method::POST {
            Some(Verb::Post)
        } else {
            None
        }
    }

    /// Permission the authorization gate is asked for
    pub fn permission(self) -> Permission {
        match self {
            Verb::Get => Permission::Read,
            Verb::Post => Permission::Write,
        }
    }
}

/// Parsed `<action>[/<id>]` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPath {
    /// Action name as it appeared in the path
    pub action: String,
    /// Record id from the second segment, `0` when absent or not a number
    pub id: i64,
}

impl ActionPath {
    /// Split a path into action and id. Empty paths carry no action.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return None;
        }

        let mut segments = path.split('/');
        let action = segments.next()?.to_string();
        let id = segments
            .next()
            .and_then(|segment| segment.trim().parse().ok())
            .unwrap_or(0);

        Some(Self { action, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_has_no_action() {
        assert_eq!(ActionPath::parse(""), None);
        assert_eq!(ActionPath::parse("/"), None);
    }

    #[test]
    fn test_action_without_id() {
        assert_eq!(
            ActionPath::parse("getusers"),
            Some(ActionPath {
                action: "getusers".to_string(),
                id: 0
            })
        );
    }

    #[test]
    fn test_action_with_id() {
        let route = ActionPath::parse("getuser/15").unwrap();

        assert_eq!(route.action, "getuser");
        assert_eq!(route.id, 15);
    }

    #[test]
    fn test_non_numeric_id_is_zero() {
        assert_eq!(ActionPath::parse("cancel/abc").unwrap().id, 0);
    }

    #[test]
    fn test_extra_segments_are_ignored() {
        let route = ActionPath::parse("update/3/extra").unwrap();

        assert_eq!(route.action, "update");
        assert_eq!(route.id, 3);
    }

    #[test]
    fn test_verbs_map_to_permissions() {
        assert_eq!(Verb::from_method(&Method::GET), Some(Verb::Get));
        assert_eq!(Verb::from_method(&Method::DELETE), None);
        assert_eq!(Verb::Get.permission(), Permission::Read);
        assert_eq!(Verb::Post.permission(), Permission::Write);
    }
}

//! Uniform response bodies produced by handlers and by the dispatcher.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use common::{AppError, AppResult};

/// Handler response: `{method, success, <payload key>, error_code, error_message}`.
///
/// The payload starts out as an empty string and is only replaced on success.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    method: &'static str,
    success: bool,
    payload_key: &'static str,
    payload: Value,
    error_code: u16,
    error_message: String,
}

impl Envelope {
    pub fn new(method: &'static str, payload_key: &'static str) -> Self {
        Self {
            method,
            success: false,
            payload_key,
            payload: Value::String(String::new()),
            error_code: 0,
            error_message: String::new(),
        }
    }

    /// Fill the envelope from a handler result.
    pub fn complete(mut self, result: AppResult<Value>) -> Self {
        match result {
            Ok(payload) => {
                self.success = true;
                self.payload = payload;
            }
            Err(err) => {
                tracing::debug!(method = self.method, error = %err, "Action failed");
                self.error_code = err.status().as_u16();
                self.error_message = err.envelope_message();
            }
        }
        self
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn payload_key(&self) -> &'static str {
        self.payload_key
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn error_code(&self) -> u16 {
        self.error_code
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("method", self.method)?;
        map.serialize_entry("success", &self.success)?;
        map.serialize_entry(self.payload_key, &self.payload)?;
        map.serialize_entry("error_code", &self.error_code)?;
        map.serialize_entry("error_message", &self.error_message)?;
        map.end()
    }
}

/// Serialize a handler payload.
pub fn to_payload<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::internal(format!("Encoding failed: {}", e)))
}

/// Body of the dispatcher's own refusals, which never reach a handler.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Refusal {
    pub action: String,
    pub success: bool,
    pub error_code: u16,
    pub error_message: String,
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A handler ran and produced an envelope
    Handled(Envelope),
    /// The path named no action
    NoAction,
    /// The authorization gate denied the action
    Forbidden { action: String },
    /// No handler is registered for the verb and action
    Unknown { action: String },
}

impl Dispatch {
    /// Transport status accompanying the body
    pub fn status(&self) -> StatusCode {
        match self {
            Dispatch::Handled(_) => StatusCode::OK,
            Dispatch::NoAction | Dispatch::Unknown { .. } => StatusCode::NOT_FOUND,
            Dispatch::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Refusal body, `None` for handled requests
    pub fn refusal(&self) -> Option<Refusal> {
        let (action, message) = match self {
            Dispatch::Handled(_) => return None,
            Dispatch::NoAction => ("None", "Sorry, you need to specify a valid action"),
            Dispatch::Forbidden { action } => {
                (action.as_str(), "Sorry, you don't have permission for this action")
            }
            Dispatch::Unknown { action } => (action.as_str(), "Sorry, that action is not available"),
        };

        Some(Refusal {
            action: action.to_string(),
            success: false,
            error_code: self.status().as_u16(),
            error_message: message.to_string(),
        })
    }

    /// JSON body sent to the client
    pub fn body(&self) -> AppResult<Value> {
        match self {
            Dispatch::Handled(envelope) => to_payload(envelope),
            _ => to_payload(&self.refusal()),
        }
    }
}

impl IntoResponse for Dispatch {
    fn into_response(self) -> Response {
        match self.body() {
            Ok(body) => (self.status(), Json(body)).into_response(),
            Err(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_envelope_shape() {
        let body = to_payload(&Envelope::new("getusers", "users")).unwrap();

        assert_eq!(
            body,
            json!({
                "method": "getusers",
                "success": false,
                "users": "",
                "error_code": 0,
                "error_message": ""
            })
        );
    }

    #[test]
    fn test_complete_success() {
        let envelope = Envelope::new("cancel", "user").complete(Ok(json!({ "id": 3 })));

        assert!(envelope.is_success());
        assert_eq!(envelope.payload(), &json!({ "id": 3 }));
        assert_eq!(envelope.error_code(), 0);
        assert_eq!(envelope.error_message(), "");
    }

    #[test]
    fn test_complete_failure_keeps_empty_payload() {
        let envelope = Envelope::new("update", "user")
            .complete(Err(AppError::validation("User not found.")));

        assert!(!envelope.is_success());
        assert_eq!(envelope.payload(), &json!(""));
        assert_eq!(envelope.error_code(), 400);
        assert_eq!(envelope.error_message(), "User not found.");
    }

    #[test]
    fn test_no_action_refusal() {
        let outcome = Dispatch::NoAction;

        assert_eq!(outcome.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            outcome.body().unwrap(),
            json!({
                "action": "None",
                "success": false,
                "error_code": 404,
                "error_message": "Sorry, you need to specify a valid action"
            })
        );
    }

    #[test]
    fn test_forbidden_refusal_names_action() {
        let outcome = Dispatch::Forbidden {
            action: "getUsers".to_string(),
        };
        let refusal = outcome.refusal().unwrap();

        assert_eq!(outcome.status(), StatusCode::FORBIDDEN);
        assert_eq!(refusal.action, "getUsers");
        assert_eq!(refusal.error_code, 403);
    }
}

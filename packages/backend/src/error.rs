//! Raw failure reported by the remote service.

use serde::Deserialize;

/// A failed remote call, as close to the wire as possible.
///
/// `status` is the HTTP status (0 when the request never got a response) and
/// `code` is the service-specific code: a SQLSTATE or `PGRST…` code from the
/// REST layer, or an `error_code` from the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// The request did not complete (connection refused, DNS, CORS, ...).
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(0, None, message)
    }

    /// The response arrived but could not be decoded.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(0, Some("decode"), message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, Some("PGRST116"), message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code.as_deref() == Some("PGRST116")
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self.status, 401 | 403) || self.code.as_deref() == Some("42501")
    }

    /// Unique, foreign-key, not-null and check violations (SQLSTATE class 23).
    pub fn is_constraint(&self) -> bool {
        self.status == 409 || self.code.as_deref().is_some_and(|c| c.starts_with("23"))
    }

    /// Build an error from a non-success response body.
    ///
    /// Understands the REST layer shape (`code`, `message`) and both auth layer
    /// shapes (`error_code`/`msg` and `error`/`error_description`).
    pub fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Body {
            code: Option<serde_json::Value>,
            error_code: Option<String>,
            message: Option<String>,
            msg: Option<String>,
            error: Option<String>,
            error_description: Option<String>,
        }

        let Ok(parsed) = serde_json::from_str::<Body>(body) else {
            let message = if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body.trim().to_string()
            };
            return Self::new(status, None, message);
        };

        // The auth layer sends a numeric `code` (the status) next to `error_code`.
        let code = parsed.error_code.or(match parsed.code {
            Some(serde_json::Value::String(s)) => Some(s),
            _ => None,
        });
        let code = code.or(parsed.error);
        let message = parsed
            .message
            .or(parsed.msg)
            .or(parsed.error_description)
            .or_else(|| code.clone())
            .unwrap_or_else(|| format!("request failed with status {status}"));

        Self {
            status,
            code,
            message,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::decode(e.to_string())
        } else {
            match e.status() {
                Some(status) => RemoteError::new(status.as_u16(), None, e.to_string()),
                None => RemoteError::network(e.to_string()),
            }
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::decode(e.to_string())
    }
}

//! # Error taxonomy
//!
//! Every expected failure is a value of one of these enums; nothing here is meant
//! to be thrown past the view that triggered it. The `Display` strings are written
//! for end users, so views can show them directly in a toast.
//!
//! | Type | Raised by | Typical handling |
//! |------|-----------|------------------|
//! | [`AuthError`] | [`crate::session::SessionManager`] | message on the sign-in form |
//! | [`DataError`] | every adapter in [`crate::adapters`] | error toast, list left untouched |
//! | [`UploadError`] | image uploads | error toast, nothing sent when validation fails |
//! | [`ConfigError`] | [`crate::config::AcademyConfig`] | startup failure |
//!
//! Raw [`RemoteError`]s are classified on conversion so callers match on intent
//! (not found, permission denied, constraint) rather than on status codes.

use backend::RemoteError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    WeakPassword,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Please verify your email address before signing in")]
    EmailNotConfirmed,
    #[error("An account with this email already exists")]
    AlreadyRegistered,
    #[error("This link has expired, please request a new one")]
    ExpiredLink,
    #[error("{0}")]
    Remote(String),
}

impl From<RemoteError> for AuthError {
    fn from(e: RemoteError) -> Self {
        let message = e.message.to_lowercase();
        match e.code.as_deref() {
            Some("invalid_credentials") => AuthError::InvalidCredentials,
            Some("email_not_confirmed") => AuthError::EmailNotConfirmed,
            Some("weak_password") => AuthError::WeakPassword,
            Some("user_already_exists" | "email_exists") => AuthError::AlreadyRegistered,
            Some("otp_expired" | "flow_state_expired") => AuthError::ExpiredLink,
            Some("validation_failed" | "email_address_invalid") => AuthError::InvalidEmail,
            // Older auth servers only send `invalid_grant` plus a description.
            _ if message.contains("invalid login credentials") => AuthError::InvalidCredentials,
            _ if message.contains("email not confirmed") => AuthError::EmailNotConfirmed,
            _ if message.contains("already registered") => AuthError::AlreadyRegistered,
            _ if message.contains("expired") => AuthError::ExpiredLink,
            _ => AuthError::Remote(e.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("The record no longer exists")]
    NotFound,
    #[error("You do not have permission to do that: {0}")]
    PermissionDenied(String),
    #[error("The change conflicts with existing data: {0}")]
    Constraint(String),
    #[error("You need to sign in first")]
    Unauthenticated,
    #[error("Unexpected response from the server: {0}")]
    Decode(String),
    #[error("{0}")]
    Remote(String),
}

impl From<RemoteError> for DataError {
    fn from(e: RemoteError) -> Self {
        if e.is_not_found() {
            DataError::NotFound
        } else if e.is_permission_denied() {
            DataError::PermissionDenied(e.message)
        } else if e.is_constraint() {
            DataError::Constraint(e.message)
        } else if e.code.as_deref() == Some("decode") {
            DataError::Decode(e.message)
        } else {
            DataError::Remote(e.message)
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Decode(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error("Please upload an image file (got {0})")]
    InvalidType(String),
    #[error("Please upload an image under {} MB", .limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },
    #[error("Upload failed: {0}")]
    Storage(#[from] DataError),
}

impl From<RemoteError> for UploadError {
    fn from(e: RemoteError) -> Self {
        UploadError::Storage(e.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {0}")]
    Invalid(&'static str),
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_classification() {
        let e = RemoteError::new(400, Some("invalid_credentials"), "Invalid login credentials");
        assert_eq!(AuthError::from(e), AuthError::InvalidCredentials);

        let e = RemoteError::new(400, Some("invalid_grant"), "Email not confirmed");
        assert_eq!(AuthError::from(e), AuthError::EmailNotConfirmed);

        let e = RemoteError::new(403, Some("otp_expired"), "Email link is invalid or has expired");
        assert_eq!(AuthError::from(e), AuthError::ExpiredLink);

        let e = RemoteError::network("failed to fetch");
        assert_eq!(AuthError::from(e), AuthError::Remote("failed to fetch".to_string()));
    }

    #[test]
    fn test_data_error_classification() {
        assert_eq!(DataError::from(RemoteError::not_found("0 rows")), DataError::NotFound);
        assert!(matches!(
            DataError::from(RemoteError::new(401, Some("42501"), "row-level security")),
            DataError::PermissionDenied(_)
        ));
        assert!(matches!(
            DataError::from(RemoteError::new(409, Some("23505"), "duplicate")),
            DataError::Constraint(_)
        ));
        assert!(matches!(
            DataError::from(RemoteError::decode("bad json")),
            DataError::Decode(_)
        ));
    }

    #[test]
    fn test_upload_error_messages() {
        let e = UploadError::TooLarge {
            size: 11 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        assert_eq!(e.to_string(), "Please upload an image under 10 MB");
        assert_eq!(
            UploadError::InvalidType("text/plain".to_string()).to_string(),
            "Please upload an image file (got text/plain)"
        );
    }
}

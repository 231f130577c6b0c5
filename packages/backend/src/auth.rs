//! # Auth types and the [`AuthApi`] trait
//!
//! Mirrors the password-auth surface of the hosted service. The identity types are
//! `Serialize + Deserialize + PartialEq` so they can be stored in UI signals and
//! compared for change detection.
//!
//! Change notifications are delivered over a `tokio::sync::broadcast` channel: every
//! sign-in, sign-out, token refresh and user update publishes an [`AuthChange`]
//! carrying the session that is current *after* the change.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::RemoteError;

/// Seconds before `expires_at` at which a session is already treated as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// An identity issued by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// The `full_name` given at sign-up, if any.
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata
            .get("full_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Name to show in the UI, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.full_name()
            .or(self.email.as_deref())
            .unwrap_or("Unknown user")
    }
}

/// A live authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    /// Unix timestamp (seconds) at which the access token expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Whether the access token is expired (or about to be) at `now` (unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(at) => now >= at - EXPIRY_MARGIN_SECS,
            None => false,
        }
    }

    /// Fill in `expires_at` from `expires_in` when the service omitted it.
    pub fn with_expiry_from(mut self, now: i64) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(now + self.expires_in);
        }
        self
    }
}

/// What happened to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

/// A change notification: the event and the session current after it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthChange {
    pub fn new(event: AuthEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }
}

/// Options for [`AuthApi::sign_up`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignUpOptions {
    /// Where the verification email should send the user back to.
    pub redirect_to: Option<String>,
    /// Stored as the new user's `user_metadata`.
    pub data: serde_json::Value,
}

/// Fields accepted by [`AuthApi::update_user`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Tokens carried in the URL fragment of a verification or password reset link,
/// e.g. `#access_token=..&refresh_token=..&expires_in=3600&type=recovery`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: Option<i64>,
    /// The `type` parameter: `recovery`, `signup`, `magiclink`, ...
    pub kind: Option<String>,
}

impl LinkTokens {
    /// The event a session established from this link is announced with.
    pub fn event(&self) -> AuthEvent {
        match self.kind.as_deref() {
            Some("recovery") => AuthEvent::PasswordRecovery,
            _ => AuthEvent::SignedIn,
        }
    }

    pub fn into_session(self, user: User, now: i64) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            expires_at: self.expires_at,
            user,
        }
        .with_expiry_from(now)
    }
}

/// Parse an email link's URL fragment. Accepts the fragment with or without the
/// leading `#`, or a whole URL.
///
/// `Ok(None)` when the fragment carries no tokens; the auth service's error
/// parameters (`error`, `error_code`, `error_description`) become a [`RemoteError`].
pub fn parse_link_fragment(fragment: &str) -> Result<Option<LinkTokens>, RemoteError> {
    let fragment = fragment.rsplit_once('#').map_or(fragment, |(_, f)| f);
    let params: HashMap<String, String> = fragment
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (decode(k), decode(v)))
        .collect();

    if let Some(error) = params.get("error") {
        let code = params.get("error_code").unwrap_or(error);
        let message = params
            .get("error_description")
            .cloned()
            .unwrap_or_else(|| error.clone());
        return Err(RemoteError::new(403, Some(code), message));
    }

    let Some(access_token) = params.get("access_token").filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    Ok(Some(LinkTokens {
        access_token: access_token.clone(),
        refresh_token: params.get("refresh_token").cloned().unwrap_or_default(),
        token_type: params
            .get("token_type")
            .cloned()
            .unwrap_or_else(default_token_type),
        expires_in: params
            .get("expires_in")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default(),
        expires_at: params.get("expires_at").and_then(|v| v.parse().ok()),
        kind: params.get("type").cloned(),
    }))
}

fn decode(value: &str) -> String {
    let value = value.replace('+', " ");
    match urlencoding::decode(&value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value,
    }
}

/// Password authentication against the hosted auth service.
pub trait AuthApi {
    /// Register a new identity. Returns a session only when the service signs the
    /// user in immediately (no email verification required).
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        options: SignUpOptions,
    ) -> impl Future<Output = Result<Option<Session>, RemoteError>>;

    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, RemoteError>>;

    /// Drop the local session and invalidate it remotely.
    fn sign_out(&self) -> impl Future<Output = Result<(), RemoteError>>;

    /// The current session, if any.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, RemoteError>>;

    /// Subscribe to session change notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;

    /// Send a password reset email. Succeeds whether or not the address is registered.
    fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> impl Future<Output = Result<(), RemoteError>>;

    /// Update the signed-in user.
    fn update_user(
        &self,
        attributes: UserAttributes,
    ) -> impl Future<Output = Result<User, RemoteError>>;

    /// Adopt the session carried by an email link (see [`parse_link_fragment`]) and
    /// announce it as `PasswordRecovery` or `SignedIn`. `Ok(None)` when the fragment
    /// carries no tokens.
    fn set_session_from_url(
        &self,
        fragment: &str,
    ) -> impl Future<Output = Result<Option<AuthEvent>, RemoteError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(metadata: serde_json::Value) -> User {
        User {
            id: "u1".to_string(),
            email: Some("coach@example.com".to_string()),
            user_metadata: metadata,
            created_at: None,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let named = user(serde_json::json!({ "full_name": "Grace Wanjiru" }));
        assert_eq!(named.display_name(), "Grace Wanjiru");

        let blank = user(serde_json::json!({ "full_name": "  " }));
        assert_eq!(blank.display_name(), "coach@example.com");

        let bare = user(serde_json::Value::Null);
        assert_eq!(bare.full_name(), None);
        assert_eq!(bare.display_name(), "coach@example.com");
    }

    #[test]
    fn test_session_expiry() {
        let session: Session = serde_json::from_value(serde_json::json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": { "id": "u1" }
        }))
        .unwrap();
        assert_eq!(session.token_type, "bearer");
        assert!(!session.is_expired(1_000));

        let session = session.with_expiry_from(1_000);
        assert_eq!(session.expires_at, Some(4_600));
        assert!(!session.is_expired(4_000));
        assert!(session.is_expired(4_540));
        assert!(session.is_expired(5_000));
    }

    #[test]
    fn test_recovery_link_fragment() {
        let link = "https://academy.example/account#access_token=a.b.c&expires_at=5000\
                    &expires_in=3600&refresh_token=r1&token_type=bearer&type=recovery";
        let tokens = parse_link_fragment(link).unwrap().unwrap();
        assert_eq!(tokens.access_token, "a.b.c");
        assert_eq!(tokens.refresh_token, "r1");
        assert_eq!(tokens.expires_at, Some(5_000));
        assert_eq!(tokens.event(), AuthEvent::PasswordRecovery);

        let signup = parse_link_fragment("#access_token=t&refresh_token=r&type=signup")
            .unwrap()
            .unwrap();
        assert_eq!(signup.event(), AuthEvent::SignedIn);
        assert_eq!(signup.token_type, "bearer");

        assert_eq!(parse_link_fragment("").unwrap(), None);
        assert_eq!(parse_link_fragment("#section-2").unwrap(), None);
    }

    #[test]
    fn test_expired_link_fragment() {
        let err = parse_link_fragment(
            "#error=access_denied&error_code=otp_expired\
             &error_description=Email+link+is+invalid+or+has+expired",
        )
        .unwrap_err();
        assert_eq!(err.status, 403);
        assert_eq!(err.code.as_deref(), Some("otp_expired"));
        assert_eq!(err.message, "Email link is invalid or has expired");
    }
}

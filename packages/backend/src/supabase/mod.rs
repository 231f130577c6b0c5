//! # Supabase HTTP client
//!
//! [`SupabaseClient`] implements [`AuthApi`](crate::AuthApi), [`Database`](crate::Database)
//! and [`Storage`](crate::Storage) over plain HTTP with `reqwest`, so it runs
//! unchanged in the browser (wasm) and natively.
//!
//! | Service | Prefix | Module |
//! |---------|--------|--------|
//! | GoTrue (auth) | `/auth/v1` | [`auth`] |
//! | PostgREST (tables) | `/rest/v1` | [`rest`] |
//! | Storage | `/storage/v1` | [`storage`] |
//!
//! The client keeps the current session in memory and publishes every change on a
//! broadcast channel. Requests are authorised with the session's access token when
//! one exists and with the project's anon key otherwise; the `apikey` header always
//! carries the anon key. An expired access token is refreshed before it is sent.

mod auth;
mod rest;
mod storage;

use std::sync::Arc;

use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::auth::{AuthApi, AuthChange, AuthEvent, Session};
use crate::error::RemoteError;

const EVENT_CAPACITY: usize = 32;

/// Project endpoint and public key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupabaseSettings {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,
    /// The public (anon) API key. Safe to ship to browsers.
    pub anon_key: String,
}

/// HTTP client for a Supabase project.
#[derive(Clone, Debug)]
pub struct SupabaseClient {
    http: reqwest::Client,
    settings: Arc<SupabaseSettings>,
    session: Arc<RwLock<Option<Session>>>,
    /// Held while a refresh grant is in flight so concurrent callers share one.
    refreshing: Arc<Mutex<()>>,
    events: broadcast::Sender<AuthChange>,
}

impl SupabaseClient {
    pub fn new(settings: SupabaseSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            http: reqwest::Client::new(),
            settings: Arc::new(settings),
            session: Arc::new(RwLock::new(None)),
            refreshing: Arc::new(Mutex::new(())),
            events,
        }
    }

    pub fn settings(&self) -> &SupabaseSettings {
        &self.settings
    }

    /// Absolute URL for a path relative to the project root.
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Access token of the current session, or the anon key.
    ///
    /// Goes through [`AuthApi::get_session`], so an expired token is refreshed
    /// (and `TokenRefreshed` broadcast) before it is used.
    async fn bearer(&self) -> String {
        match self.get_session().await {
            Ok(Some(session)) => session.access_token,
            Ok(None) => self.settings.anon_key.clone(),
            Err(e) => {
                tracing::warn!("could not refresh session, sending anon key: {}", e);
                self.settings.anon_key.clone()
            }
        }
    }

    /// Attach the `apikey` and `Authorization` headers.
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(self.bearer().await)
    }

    async fn store_session(&self, session: Option<Session>, event: AuthEvent) {
        *self.session.write().await = session.clone();
        // No receivers is fine: nobody is listening yet.
        let _ = self.events.send(AuthChange::new(event, session));
    }
}

/// Send a request and turn non-success statuses into [`RemoteError`]s.
async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::from_body(status.as_u16(), &body))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

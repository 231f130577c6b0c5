//! GoTrue endpoints.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use super::{now, send, SupabaseClient};
use crate::auth::{
    parse_link_fragment, AuthApi, AuthChange, AuthEvent, Session, SignUpOptions, User,
    UserAttributes,
};
use crate::error::RemoteError;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a Value,
}

impl SupabaseClient {
    async fn token_grant<B: Serialize>(&self, grant: &str, body: &B) -> Result<Session, RemoteError> {
        let request = self
            .http
            .post(self.endpoint("auth/v1/token"))
            .query(&[("grant_type", grant)])
            .header("apikey", &self.settings.anon_key)
            .json(body);
        let session: Session = send(request).await?.json().await?;
        Ok(session.with_expiry_from(now()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, RemoteError> {
        tracing::debug!("refreshing expired session");
        self.token_grant(
            "refresh_token",
            &serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }
}

impl AuthApi for SupabaseClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        options: SignUpOptions,
    ) -> Result<Option<Session>, RemoteError> {
        let mut request = self
            .http
            .post(self.endpoint("auth/v1/signup"))
            .header("apikey", &self.settings.anon_key)
            .json(&SignUpBody {
                email,
                password,
                data: &options.data,
            });
        if let Some(redirect_to) = &options.redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }

        // With email verification on, the service answers with the bare user.
        let body: Value = send(request).await?.json().await?;
        if body.get("access_token").is_none() {
            return Ok(None);
        }
        let session = serde_json::from_value::<Session>(body)?.with_expiry_from(now());
        self.store_session(Some(session.clone()), AuthEvent::SignedIn)
            .await;
        Ok(Some(session))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, RemoteError> {
        let session = self
            .token_grant("password", &Credentials { email, password })
            .await?;
        self.store_session(Some(session.clone()), AuthEvent::SignedIn)
            .await;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let previous = self.session.write().await.take();

        let result = match previous {
            Some(session) => {
                let request = self
                    .http
                    .post(self.endpoint("auth/v1/logout"))
                    .header("apikey", &self.settings.anon_key)
                    .bearer_auth(&session.access_token);
                match send(request).await {
                    Ok(_) => Ok(()),
                    // Already invalid remotely: nothing left to revoke.
                    Err(e) if matches!(e.status, 401 | 403 | 404) => Ok(()),
                    Err(e) => Err(e),
                }
            }
            None => Ok(()),
        };

        let _ = self.events.send(AuthChange::new(AuthEvent::SignedOut, None));
        result
    }

    async fn get_session(&self) -> Result<Option<Session>, RemoteError> {
        let current = self.session.read().await.clone();
        let Some(session) = current else {
            return Ok(None);
        };
        if !session.is_expired(now()) {
            return Ok(Some(session));
        }

        let _refreshing = self.refreshing.lock().await;
        // Another caller may have refreshed (or signed out) while we waited.
        let current = self.session.read().await.clone();
        let Some(session) = current else {
            return Ok(None);
        };
        if !session.is_expired(now()) {
            return Ok(Some(session));
        }

        match self.refresh(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store_session(Some(refreshed.clone()), AuthEvent::TokenRefreshed)
                    .await;
                Ok(Some(refreshed))
            }
            // Offline: keep the session and let the caller retry later.
            Err(e) if e.status == 0 => Err(e),
            Err(e) => {
                tracing::warn!("session refresh rejected, signing out locally: {}", e);
                self.store_session(None, AuthEvent::SignedOut).await;
                Ok(None)
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), RemoteError> {
        let mut request = self
            .http
            .post(self.endpoint("auth/v1/recover"))
            .header("apikey", &self.settings.anon_key)
            .json(&serde_json::json!({ "email": email }));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        send(request).await?;
        Ok(())
    }

    async fn update_user(&self, attributes: UserAttributes) -> Result<User, RemoteError> {
        let Some(mut session) = self.get_session().await? else {
            return Err(RemoteError::new(401, Some("no_authorization"), "Auth session missing!"));
        };

        let request = self
            .http
            .put(self.endpoint("auth/v1/user"))
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(&session.access_token)
            .json(&attributes);
        let user: User = send(request).await?.json().await?;

        session.user = user.clone();
        self.store_session(Some(session), AuthEvent::UserUpdated)
            .await;
        Ok(user)
    }

    async fn set_session_from_url(&self, fragment: &str) -> Result<Option<AuthEvent>, RemoteError> {
        let Some(tokens) = parse_link_fragment(fragment)? else {
            return Ok(None);
        };

        let request = self
            .http
            .get(self.endpoint("auth/v1/user"))
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(&tokens.access_token);
        let user: User = send(request).await?.json().await?;

        let event = tokens.event();
        tracing::debug!(?event, "adopting session from email link");
        self.store_session(Some(tokens.into_session(user, now())), event)
            .await;
        Ok(Some(event))
    }
}

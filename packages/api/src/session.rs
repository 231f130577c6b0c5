//! # Session manager
//!
//! Owns the client's view of "who is signed in and may they administer the site".
//!
//! The current [`AuthState`] is published on a `tokio::sync::watch` channel; the UI
//! mirrors it into a signal, tests read it with [`SessionManager::snapshot`] or wait on
//! [`SessionManager::subscribe`]. Clones of a manager share one state.
//!
//! ## Lifecycle
//!
//! [`SessionManager::run`] drives everything and must be spawned once per manager:
//!
//! 1. it subscribes to the backend's change notifications, and only then asks for the
//!    current session. The answer is applied unless a notification got there first;
//! 2. every notification is mapped to `{user, session}` without any network call. A
//!    sign-out clears the admin flag and the role loading flag in the same update that
//!    clears the user. A new user id sets `role_loading` in the same update that sets
//!    the user, so [`AuthState::is_loading`] never reports a settled state while the
//!    role is still unknown;
//! 3. a second observer resolves the admin role for each new user id. Each user change
//!    bumps a private generation counter; a lookup still in flight when the generation
//!    moves on is dropped, and a result is only applied if its generation is current.
//!    A failed lookup resolves to "not an admin".
//!
//! [`SessionManager::run_with_link`] additionally adopts the session carried by an
//! email link's URL fragment before the initial lookup. A password reset link sets
//! [`AuthState::password_recovery`] until the password is changed or the user changes;
//! an expired or invalid link is reported in [`AuthState::link_error`].
//!
//! `run` returns once the backend's change channel closes.

use std::sync::Arc;

use backend::{AuthApi, AuthEvent, Database, Session, SignUpOptions, User, UserAttributes};
use tokio::sync::{broadcast, watch};

use crate::adapters::RoleAdapter;
use crate::error::{AuthError, DataError};
use crate::models::Role;

const MIN_PASSWORD_LEN: usize = 6;

/// Snapshot of the authentication state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub is_admin: bool,
    /// The initial session lookup has not finished yet.
    pub initializing: bool,
    /// A role lookup for the current user is outstanding.
    pub role_loading: bool,
    /// Signed in through a password reset link; a new password is due.
    pub password_recovery: bool,
    /// Why the email link the site was opened with could not be used.
    pub link_error: Option<AuthError>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            session: None,
            is_admin: false,
            initializing: true,
            role_loading: false,
            password_recovery: false,
            link_error: None,
        }
    }
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        self.initializing || self.role_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Which user the role observer is resolving, and for which user change.
#[derive(Debug, Clone, Default, PartialEq)]
struct Identity {
    generation: u64,
    user_id: Option<String>,
}

pub struct SessionManager<B> {
    backend: B,
    redirect_url: Option<String>,
    admin_role: Role,
    state: Arc<watch::Sender<AuthState>>,
    identity: Arc<watch::Sender<Identity>>,
}

impl<B: Clone> Clone for SessionManager<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            redirect_url: self.redirect_url.clone(),
            admin_role: self.admin_role,
            state: self.state.clone(),
            identity: self.identity.clone(),
        }
    }
}

impl<B: AuthApi + Database + Clone> SessionManager<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        let (identity, _) = watch::channel(Identity::default());
        Self {
            backend,
            redirect_url: None,
            admin_role: Role::Admin,
            state: Arc::new(state),
            identity: Arc::new(identity),
        }
    }

    /// Where verification and reset emails link back to.
    pub fn with_redirect_url(mut self, url: Option<String>) -> Self {
        self.redirect_url = url;
        self
    }

    /// The role that counts as "admin".
    pub fn with_admin_role(mut self, role: Role) -> Self {
        self.admin_role = role;
        self
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Keep the state in sync with the backend until its change channel closes.
    pub async fn run(&self) {
        self.run_with_link(None).await
    }

    /// [`run`](Self::run), first adopting the session of the email link whose URL
    /// fragment (`#access_token=...` or `#error=...`) the site was opened with.
    pub async fn run_with_link(&self, fragment: Option<String>) {
        let changes = self.backend.subscribe();
        tokio::select! {
            _ = self.observe_changes(changes, fragment) => {
                tracing::debug!("auth change channel closed");
            }
            _ = self.observe_roles() => {}
        }
    }

    async fn observe_changes(
        &self,
        mut changes: broadcast::Receiver<backend::AuthChange>,
        fragment: Option<String>,
    ) {
        let initial = async {
            let mut recovery = false;
            let mut link_error = None;
            if let Some(fragment) = fragment.as_deref() {
                match self.backend.set_session_from_url(fragment).await {
                    Ok(event) => recovery = event == Some(AuthEvent::PasswordRecovery),
                    Err(e) => {
                        tracing::warn!("email link rejected: {}", e);
                        link_error = Some(AuthError::from(e));
                    }
                }
            }
            (self.backend.get_session().await, recovery, link_error)
        };
        tokio::pin!(initial);
        let mut initial_pending = true;
        let mut settled = false;

        loop {
            tokio::select! {
                (result, recovery, link_error) = &mut initial, if initial_pending => {
                    initial_pending = false;
                    if !settled {
                        settled = true;
                        match result {
                            Ok(session) => self.apply_session_as(session, recovery),
                            Err(e) => {
                                tracing::warn!("initial session lookup failed: {}", e);
                                self.apply_session(None);
                            }
                        }
                    } else {
                        tracing::debug!("initial session superseded by a change notification");
                    }
                    if link_error.is_some() {
                        self.state.send_modify(|state| state.link_error = link_error);
                    }
                }
                change = changes.recv() => match change {
                    Ok(change) => {
                        tracing::debug!("auth change: {:?}", change.event);
                        settled = true;
                        let recovery = change.event == AuthEvent::PasswordRecovery;
                        self.apply_session_as(change.session, recovery);
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!("missed {} auth changes, resyncing", missed);
                        settled = true;
                        match self.backend.get_session().await {
                            Ok(session) => self.apply_session(session),
                            Err(e) => tracing::warn!("resync failed, keeping current state: {}", e),
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }

    async fn observe_roles(&self) {
        let mut identity = self.identity.subscribe();
        loop {
            let current = identity.borrow_and_update().clone();
            if let Some(user_id) = current.user_id {
                let roles = RoleAdapter::new(self.backend.clone());
                tokio::select! {
                    result = roles.has_role(&user_id, self.admin_role) => {
                        self.apply_role(current.generation, result);
                    }
                    _ = identity.changed() => {
                        tracing::debug!("user changed during role lookup, dropping it");
                        continue;
                    }
                }
            }
            if identity.changed().await.is_err() {
                break;
            }
        }
    }

    /// Map a session (or its absence) onto the published state.
    fn apply_session(&self, session: Option<Session>) {
        self.apply_session_as(session, false)
    }

    /// [`apply_session`](Self::apply_session) for a session that may come from a
    /// password reset link. The recovery flag survives refreshes of the same user.
    fn apply_session_as(&self, session: Option<Session>, recovery: bool) {
        let user_id = session.as_ref().map(|s| s.user.id.clone());
        let user_changed = self.identity.borrow().user_id != user_id;

        self.state.send_modify(|state| {
            state.initializing = false;
            state.user = session.as_ref().map(|s| s.user.clone());
            state.session = session;
            if user_id.is_none() {
                state.is_admin = false;
                state.role_loading = false;
                state.password_recovery = false;
            } else if user_changed {
                state.is_admin = false;
                state.role_loading = true;
                state.password_recovery = recovery;
                state.link_error = None;
            } else if recovery {
                state.password_recovery = true;
            }
        });

        if user_changed {
            self.identity.send_modify(|identity| {
                identity.generation += 1;
                identity.user_id = user_id;
            });
        }
    }

    fn apply_role(&self, generation: u64, result: Result<bool, DataError>) {
        if self.identity.borrow().generation != generation {
            tracing::debug!("discarding role result for generation {}", generation);
            return;
        }
        let is_admin = result.unwrap_or_else(|e| {
            tracing::warn!("role lookup failed, treating user as non-admin: {}", e);
            false
        });
        self.state.send_modify(|state| {
            state.is_admin = is_admin;
            state.role_loading = false;
        });
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = check_email(email)?;
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        self.backend.sign_in_with_password(email, password).await?;
        Ok(())
    }

    /// Register an account. Whether this also signs the user in depends on the
    /// backend's email verification setting; the state follows the change channel.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<(), AuthError> {
        let email = check_email(email)?;
        check_password(password)?;

        let data = match display_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => serde_json::json!({ "full_name": name }),
            None => serde_json::json!({}),
        };
        let options = SignUpOptions {
            redirect_to: self.redirect_url.clone(),
            data,
        };
        let session = self.backend.sign_up(email, password, options).await?;
        if session.is_none() {
            tracing::info!("account created for {}, awaiting email verification", email);
        }
        Ok(())
    }

    /// Clear the local session, then ask the backend to revoke it. Never fails.
    pub async fn sign_out(&self) {
        self.apply_session(None);
        if let Err(e) = self.backend.sign_out().await {
            tracing::warn!("remote sign-out failed, session cleared locally: {}", e);
        }
    }

    /// Request a password reset email. Succeeds whether or not the account exists.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let email = check_email(email)?;
        self.backend
            .reset_password_for_email(email, self.redirect_url.as_deref())
            .await?;
        Ok(())
    }

    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        check_password(new_password)?;
        self.backend
            .update_user(UserAttributes {
                password: Some(new_password.to_string()),
                data: None,
            })
            .await?;
        self.state.send_modify(|state| state.password_recovery = false);
        Ok(())
    }
}

fn check_email(email: &str) -> Result<&str, AuthError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

fn check_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use backend::{AuthChange, Filter, MemoryBackend, Query, RemoteError};
    use serde_json::{json, Value};
    use tokio::sync::oneshot;
    use tokio::task::LocalSet;

    /// Memory backend whose role lookups can be held back or made to fail.
    #[derive(Clone, Default)]
    struct RoleGate {
        inner: MemoryBackend,
        gates: Arc<Mutex<HashMap<String, oneshot::Receiver<()>>>>,
        fail_roles: Arc<AtomicBool>,
    }

    impl RoleGate {
        /// Hold role lookups for `user` until the returned sender fires.
        fn hold(&self, user: &User) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(user.id.clone(), rx);
            tx
        }

        fn grant_admin(&self, user: &User) {
            self.inner
                .seed("user_roles", json!({ "user_id": user.id, "role": "admin" }))
                .unwrap();
        }
    }

    impl AuthApi for RoleGate {
        async fn sign_up(
            &self,
            email: &str,
            password: &str,
            options: SignUpOptions,
        ) -> Result<Option<Session>, RemoteError> {
            self.inner.sign_up(email, password, options).await
        }

        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
            self.inner.sign_in_with_password(email, password).await
        }

        async fn sign_out(&self) -> Result<(), RemoteError> {
            self.inner.sign_out().await
        }

        async fn get_session(&self) -> Result<Option<Session>, RemoteError> {
            self.inner.get_session().await
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
            self.inner.subscribe()
        }

        async fn reset_password_for_email(
            &self,
            email: &str,
            redirect_to: Option<&str>,
        ) -> Result<(), RemoteError> {
            self.inner.reset_password_for_email(email, redirect_to).await
        }

        async fn update_user(&self, attributes: UserAttributes) -> Result<User, RemoteError> {
            self.inner.update_user(attributes).await
        }

        async fn set_session_from_url(&self, fragment: &str) -> Result<Option<AuthEvent>, RemoteError> {
            self.inner.set_session_from_url(fragment).await
        }
    }

    impl Database for RoleGate {
        async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
            if table == "user_roles" {
                let user_id = query.filters.iter().find_map(|filter| match filter {
                    Filter::Eq(column, Value::String(id)) if column == "user_id" => Some(id.clone()),
                    _ => None,
                });
                let gate = user_id.and_then(|id| self.gates.lock().unwrap().remove(&id));
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                if self.fail_roles.load(Ordering::SeqCst) {
                    return Err(RemoteError::new(500, None, "role lookup failed"));
                }
            }
            self.inner.select(table, query).await
        }

        async fn count(&self, table: &str, query: &Query) -> Result<u64, RemoteError> {
            self.inner.count(table, query).await
        }

        async fn insert(&self, table: &str, row: Value) -> Result<Value, RemoteError> {
            self.inner.insert(table, row).await
        }

        async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, RemoteError> {
            self.inner.update(table, query, patch).await
        }

        async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
            self.inner.delete(table, query).await
        }
    }

    async fn wait_until(
        manager: &SessionManager<RoleGate>,
        what: &str,
        pred: impl FnMut(&AuthState) -> bool,
    ) -> AuthState {
        let mut rx = manager.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
            .unwrap()
            .clone();
        state
    }

    fn start(backend: &RoleGate) -> SessionManager<RoleGate> {
        let manager = SessionManager::new(backend.clone());
        let runner = manager.clone();
        tokio::task::spawn_local(async move { runner.run().await });
        manager
    }

    #[tokio::test]
    async fn test_anonymous_start_settles() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let manager = start(&backend);
                assert!(manager.snapshot().is_loading());

                let state = wait_until(&manager, "initial session", |s| !s.initializing).await;
                assert!(!state.is_loading());
                assert!(!state.is_authenticated());
                assert!(!state.is_admin);
            })
            .await;
    }

    #[tokio::test]
    async fn test_existing_session_is_picked_up() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let user = backend.inner.add_user("sensei@example.com", "secret1", None);
                backend.grant_admin(&user);
                backend
                    .inner
                    .sign_in_with_password("sensei@example.com", "secret1")
                    .await
                    .unwrap();

                let manager = start(&backend);
                let state = wait_until(&manager, "admin", |s| !s.is_loading()).await;
                assert_eq!(state.user.map(|u| u.id), Some(user.id));
                assert!(state.is_admin);
            })
            .await;
    }

    #[tokio::test]
    async fn test_role_loading_covers_the_gap_after_sign_in() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let user = backend.inner.add_user("sensei@example.com", "secret1", None);
                backend.grant_admin(&user);
                let manager = start(&backend);
                wait_until(&manager, "initial session", |s| !s.initializing).await;

                let release = backend.hold(&user);
                manager.sign_in("sensei@example.com", "secret1").await.unwrap();
                let state = wait_until(&manager, "user", |s| s.user.is_some()).await;
                assert!(state.role_loading);
                assert!(state.is_loading());
                assert!(!state.is_admin);

                release.send(()).unwrap();
                let state = wait_until(&manager, "role", |s| !s.role_loading).await;
                assert!(state.is_admin);
            })
            .await;
    }

    #[tokio::test]
    async fn test_role_lookup_failure_is_fail_closed() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let user = backend.inner.add_user("sensei@example.com", "secret1", None);
                backend.grant_admin(&user);
                backend.fail_roles.store(true, Ordering::SeqCst);
                let manager = start(&backend);

                manager.sign_in("sensei@example.com", "secret1").await.unwrap();
                let state = wait_until(&manager, "role", |s| s.user.is_some() && !s.role_loading).await;
                assert!(!state.is_admin);
                assert!(!state.is_loading());
            })
            .await;
    }

    #[tokio::test]
    async fn test_stale_role_result_is_discarded() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let admin = backend.inner.add_user("admin@example.com", "secret1", None);
                backend.grant_admin(&admin);
                let member = backend.inner.add_user("member@example.com", "secret2", None);
                let manager = start(&backend);
                wait_until(&manager, "initial session", |s| !s.initializing).await;

                let admin_gate = backend.hold(&admin);
                let member_gate = backend.hold(&member);
                manager.sign_in("admin@example.com", "secret1").await.unwrap();
                wait_until(&manager, "admin user", |s| s.user.is_some()).await;

                manager.sign_in("member@example.com", "secret2").await.unwrap();
                let member_id = member.id.clone();
                wait_until(&manager, "member user", |s| {
                    s.user.as_ref().is_some_and(|u| u.id == member_id)
                })
                .await;

                member_gate.send(()).unwrap();
                let state = wait_until(&manager, "member role", |s| !s.role_loading).await;
                assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some(member.id.as_str()));
                assert!(!state.is_admin);

                // The admin lookup was abandoned; letting it through changes nothing.
                let _ = admin_gate.send(());
                for _ in 0..10 {
                    tokio::task::yield_now().await;
                }
                assert_eq!(manager.snapshot(), state);
            })
            .await;
    }

    #[tokio::test]
    async fn test_apply_role_ignores_old_generation() {
        let backend = RoleGate::default();
        let first = backend.inner.add_user("a@example.com", "secret1", None);
        let second = backend.inner.add_user("b@example.com", "secret2", None);
        let manager = SessionManager::new(backend.clone());

        let session = |user: &User| Session {
            access_token: "t".to_string(),
            refresh_token: "r".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            user: user.clone(),
        };

        manager.apply_session(Some(session(&first)));
        let stale = manager.identity.borrow().generation;
        manager.apply_session(Some(session(&second)));

        manager.apply_role(stale, Ok(true));
        let state = manager.snapshot();
        assert!(!state.is_admin);
        assert!(state.role_loading);

        // Same user again (token refresh) keeps the generation.
        let current = manager.identity.borrow().generation;
        manager.apply_session(Some(session(&second)));
        assert_eq!(manager.identity.borrow().generation, current);
        manager.apply_role(current, Ok(false));
        assert!(!manager.snapshot().is_loading());
    }

    #[tokio::test]
    async fn test_sign_out_is_local_first_and_idempotent() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let user = backend.inner.add_user("sensei@example.com", "secret1", None);
                backend.grant_admin(&user);
                let manager = start(&backend);
                manager.sign_in("sensei@example.com", "secret1").await.unwrap();
                wait_until(&manager, "admin", |s| s.is_admin).await;

                backend.inner.fail_with(Some(RemoteError::network("offline")));
                manager.sign_out().await;
                let state = manager.snapshot();
                assert!(state.user.is_none());
                assert!(state.session.is_none());
                assert!(!state.is_admin);
                assert!(!state.is_loading());

                manager.sign_out().await;
                assert_eq!(manager.snapshot(), state);
            })
            .await;
    }

    #[tokio::test]
    async fn test_local_validation_runs_before_any_request() {
        let backend = RoleGate::default();
        backend.inner.fail_with(Some(RemoteError::network("offline")));
        let manager = SessionManager::new(backend);

        assert_eq!(manager.sign_in("not-an-email", "secret1").await, Err(AuthError::InvalidEmail));
        assert_eq!(manager.sign_in(" ", "secret1").await, Err(AuthError::InvalidEmail));
        assert_eq!(
            manager.sign_up("kim@example.com", "12345", None).await,
            Err(AuthError::WeakPassword)
        );
        assert_eq!(manager.update_password("abc").await, Err(AuthError::WeakPassword));
        assert_eq!(manager.reset_password("@example.com").await, Err(AuthError::InvalidEmail));
    }

    #[tokio::test]
    async fn test_remote_auth_errors_are_classified() {
        let backend = RoleGate::default();
        backend.inner.add_user("kim@example.com", "secret1", None);
        backend.inner.require_email_confirmation(true);
        let manager = SessionManager::new(backend.clone());

        assert_eq!(
            manager.sign_in("kim@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            manager.sign_up("kim@example.com", "secret1", None).await,
            Err(AuthError::AlreadyRegistered)
        );

        manager.sign_up("new@example.com", "secret1", None).await.unwrap();
        assert_eq!(
            manager.sign_in("new@example.com", "secret1").await,
            Err(AuthError::EmailNotConfirmed)
        );
        backend.inner.confirm_email("new@example.com");
        manager.sign_in("new@example.com", "secret1").await.unwrap();
    }

    #[tokio::test]
    async fn test_sign_up_stores_display_name() {
        let backend = RoleGate::default();
        backend.inner.require_email_confirmation(true);
        let manager = SessionManager::new(backend.clone());

        manager.sign_up("kim@example.com", "secret1", Some(" Kim ")).await.unwrap();
        let profiles = backend.inner.rows("profiles");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["full_name"], json!("Kim"));
        assert!(backend.inner.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_password_does_not_reveal_accounts() {
        let backend = RoleGate::default();
        let manager = SessionManager::new(backend.clone());
        manager.reset_password("nobody@example.com").await.unwrap();
        assert_eq!(backend.inner.reset_requests(), ["nobody@example.com"]);
    }

    fn start_with_link(backend: &RoleGate, fragment: &str) -> SessionManager<RoleGate> {
        let manager = SessionManager::new(backend.clone());
        let runner = manager.clone();
        let fragment = fragment.to_string();
        tokio::task::spawn_local(async move { runner.run_with_link(Some(fragment)).await });
        manager
    }

    #[tokio::test]
    async fn test_recovery_link_signs_in_for_a_new_password() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let user = backend.inner.add_user("kim@example.com", "secret1", None);
                let link = backend.inner.email_link("kim@example.com", true).unwrap();

                let manager = start_with_link(&backend, &link);
                let state = wait_until(&manager, "link session", |s| !s.is_loading()).await;
                assert_eq!(state.user.map(|u| u.id), Some(user.id));
                assert!(state.password_recovery);
                assert_eq!(state.link_error, None);

                manager.update_password("brand-new-1").await.unwrap();
                assert!(!manager.snapshot().password_recovery);
                // The user-updated notification that follows keeps it cleared.
                wait_until(&manager, "password saved", |s| {
                    s.session.as_ref().is_some() && !s.password_recovery
                })
                .await;

                manager.sign_out().await;
                manager.sign_in("kim@example.com", "brand-new-1").await.unwrap();
                let state = wait_until(&manager, "signed in", |s| s.user.is_some()).await;
                assert!(!state.password_recovery);
            })
            .await;
    }

    #[tokio::test]
    async fn test_used_link_is_reported_and_stays_anonymous() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                backend.inner.add_user("kim@example.com", "secret1", None);
                let link = backend.inner.email_link("kim@example.com", true).unwrap();
                backend.inner.set_session_from_url(&link).await.unwrap();
                backend.inner.sign_out().await.unwrap();

                let manager = start_with_link(&backend, &link);
                let state = wait_until(&manager, "link error", |s| s.link_error.is_some()).await;
                assert_eq!(state.link_error, Some(AuthError::ExpiredLink));
                assert!(!state.initializing);
                assert!(!state.is_authenticated());
                assert!(!state.password_recovery);

                manager.sign_in("kim@example.com", "secret1").await.unwrap();
                let state = wait_until(&manager, "signed in", |s| s.user.is_some()).await;
                assert_eq!(state.link_error, None);
            })
            .await;
    }

    #[tokio::test]
    async fn test_expired_link_fragment_is_classified() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let manager = start_with_link(
                    &backend,
                    "#error=access_denied&error_code=otp_expired\
                     &error_description=Email+link+is+invalid+or+has+expired",
                );
                let state = wait_until(&manager, "link error", |s| s.link_error.is_some()).await;
                assert_eq!(state.link_error, Some(AuthError::ExpiredLink));
                assert!(!state.is_authenticated());
            })
            .await;
    }

    #[tokio::test]
    async fn test_custom_admin_role_is_required_for_admin_access() {
        LocalSet::new()
            .run_until(async {
                let backend = RoleGate::default();
                let member = backend.inner.add_user("member@example.com", "secret1", None);
                let granted = backend.inner.add_user("staff@example.com", "secret2", None);
                backend
                    .inner
                    .seed("user_roles", json!({ "user_id": granted.id, "role": "user" }))
                    .unwrap();

                let manager = SessionManager::new(backend.clone()).with_admin_role(Role::User);
                let runner = manager.clone();
                tokio::task::spawn_local(async move { runner.run().await });

                manager.sign_in("member@example.com", "secret1").await.unwrap();
                let member_id = member.id.clone();
                let state = wait_until(&manager, "member settled", |s| {
                    s.user.as_ref().is_some_and(|u| u.id == member_id) && !s.is_loading()
                })
                .await;
                assert_eq!(
                    crate::guard::evaluate(&state, Some(Role::User)),
                    crate::guard::Access::Redirect(crate::guard::Redirect::AccessDenied)
                );

                manager.sign_in("staff@example.com", "secret2").await.unwrap();
                let granted_id = granted.id.clone();
                let state = wait_until(&manager, "staff settled", |s| {
                    s.user.as_ref().is_some_and(|u| u.id == granted_id) && !s.is_loading()
                })
                .await;
                assert_eq!(
                    crate::guard::evaluate(&state, Some(Role::User)),
                    crate::guard::Access::Granted
                );
            })
            .await;
    }
}

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::auth::{
    parse_link_fragment, AuthApi, AuthChange, AuthEvent, Session, SignUpOptions, User,
    UserAttributes,
};
use crate::error::RemoteError;
use crate::query::{Database, Query};
use crate::storage::Storage;

const EVENT_CAPACITY: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;

/// Column defaults applied on insert, mirroring the hosted schema.
fn column_defaults(table: &str) -> Vec<(&'static str, Value)> {
    match table {
        "students" => vec![("status", Value::from("pending"))],
        "messages" => vec![("is_read", Value::from(false))],
        "events" => vec![("is_past", Value::from(false))],
        _ => Vec::new(),
    }
}

/// Column sets that must be unique per table.
fn unique_keys(table: &str) -> &'static [&'static str] {
    match table {
        "user_roles" => &["user_id", "role"],
        "profiles" => &["user_id"],
        _ => &[],
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    require_confirmation: bool,
    session: Option<Session>,
    tables: HashMap<String, Vec<Map<String, Value>>>,
    buckets: HashMap<String, BTreeMap<String, (Vec<u8>, String)>>,
    upload_calls: usize,
    reset_requests: Vec<String>,
    /// Outstanding email-link access tokens, keyed to the account they sign in.
    links: HashMap<String, String>,
    failure: Option<RemoteError>,
}

/// In-memory backend for tests and local demo runs.
///
/// Behaves like the hosted service for everything the site relies on: password
/// accounts, change notifications, rows with generated ids and timestamps, and
/// buckets of blobs. [`fail_with`](MemoryBackend::fail_with) makes every call
/// fail until cleared.
#[derive(Clone, Debug)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<AuthChange>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            events,
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), RemoteError> {
        match &self.inner().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        // No receivers is fine: nobody is listening yet.
        let _ = self.events.send(AuthChange::new(event, session));
    }

    /// Make every subsequent call fail with `failure` (or succeed again with `None`).
    pub fn fail_with(&self, failure: Option<RemoteError>) {
        self.inner().failure = failure;
    }

    /// Require email verification before password sign-in succeeds.
    pub fn require_email_confirmation(&self, required: bool) {
        self.inner().require_confirmation = required;
    }

    /// Mark an account's email as verified.
    pub fn confirm_email(&self, email: &str) {
        if let Some(account) = self.inner().accounts.get_mut(&normalize(email)) {
            account.confirmed = true;
        }
    }

    /// Register a verified account directly, bypassing sign-up.
    pub fn add_user(&self, email: &str, password: &str, full_name: Option<&str>) -> User {
        let user = new_user(email, full_name.map(|n| serde_json::json!({ "full_name": n })));
        let mut inner = self.inner();
        inner.accounts.insert(
            normalize(email),
            Account {
                user: user.clone(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        insert_profile(&mut inner, &user);
        user
    }

    /// Insert a row directly, ignoring any injected failure.
    pub fn seed(&self, table: &str, row: Value) -> Result<Value, RemoteError> {
        insert_row(&mut self.inner(), table, row)
    }

    /// Every row currently in `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.inner()
            .tables
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Number of times [`Storage::upload`] was called.
    pub fn upload_calls(&self) -> usize {
        self.inner().upload_calls
    }

    /// Paths stored in `bucket`, sorted.
    pub fn objects(&self, bucket: &str) -> Vec<String> {
        self.inner()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Addresses password resets were requested for, in order.
    pub fn reset_requests(&self) -> Vec<String> {
        self.inner().reset_requests.clone()
    }

    /// The URL fragment of the email the service would send to `email`: a password
    /// reset link when `recovery`, a verification link otherwise. `None` for an
    /// unknown address. Each link works once.
    pub fn email_link(&self, email: &str, recovery: bool) -> Option<String> {
        let key = normalize(email);
        let mut inner = self.inner();
        if !inner.accounts.contains_key(&key) {
            return None;
        }
        let token = format!("link-{}", uuid::Uuid::new_v4().simple());
        inner.links.insert(token.clone(), key);
        let kind = if recovery { "recovery" } else { "signup" };
        Some(format!(
            "#access_token={token}&expires_in=3600&refresh_token={}&token_type=bearer&type={kind}",
            uuid::Uuid::new_v4().simple()
        ))
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn new_user(email: &str, metadata: Option<Value>) -> User {
    User {
        id: uuid::Uuid::new_v4().to_string(),
        email: Some(normalize(email)),
        user_metadata: metadata.unwrap_or(Value::Object(Map::new())),
        created_at: Some(Utc::now()),
    }
}

fn new_session(user: User) -> Session {
    Session {
        access_token: format!("memory-{}", uuid::Uuid::new_v4().simple()),
        refresh_token: uuid::Uuid::new_v4().simple().to_string(),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: None,
        user,
    }
    .with_expiry_from(Utc::now().timestamp())
}

/// Accounts get a profile row on creation, like the hosted `handle_new_user` trigger.
fn insert_profile(inner: &mut Inner, user: &User) {
    let row = serde_json::json!({
        "user_id": user.id,
        "email": user.email,
        "full_name": user.full_name(),
        "avatar_url": null,
    });
    if let Err(e) = insert_row(inner, "profiles", row) {
        tracing::debug!("profile for {} not created: {}", user.id, e);
    }
}

/// Whether two rows collide on every column of `keys`.
fn same_key(keys: &[&str], a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    !keys.is_empty() && keys.iter().all(|k| a.get(*k) == b.get(*k))
}

fn duplicate_key(table: &str) -> RemoteError {
    RemoteError::new(
        409,
        Some("23505"),
        format!("duplicate key value violates unique constraint on {table}"),
    )
}

fn insert_row(inner: &mut Inner, table: &str, row: Value) -> Result<Value, RemoteError> {
    let Value::Object(mut row) = row else {
        return Err(RemoteError::new(400, Some("PGRST102"), "expected a JSON object"));
    };

    let now = now_rfc3339();
    row.entry("id")
        .or_insert_with(|| Value::from(uuid::Uuid::new_v4().to_string()));
    row.entry("created_at")
        .or_insert_with(|| Value::from(now.clone()));
    row.entry("updated_at").or_insert_with(|| Value::from(now));
    for (column, default) in column_defaults(table) {
        row.entry(column).or_insert(default);
    }

    let rows = inner.tables.entry(table.to_string()).or_default();
    let keys = unique_keys(table);
    if rows.iter().any(|existing| same_key(keys, existing, &row)) {
        return Err(duplicate_key(table));
    }

    rows.push(row.clone());
    Ok(Value::Object(row))
}

impl AuthApi for MemoryBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        options: SignUpOptions,
    ) -> Result<Option<Session>, RemoteError> {
        self.check()?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(RemoteError::new(
                422,
                Some("weak_password"),
                "Password should be at least 6 characters.",
            ));
        }

        let session = {
            let mut inner = self.inner();
            let key = normalize(email);
            if inner.accounts.contains_key(&key) {
                return Err(RemoteError::new(
                    422,
                    Some("user_already_exists"),
                    "User already registered",
                ));
            }

            let metadata = match options.data {
                Value::Null => None,
                data => Some(data),
            };
            let user = new_user(email, metadata);
            let confirmed = !inner.require_confirmation;
            inner.accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    password: password.to_string(),
                    confirmed,
                },
            );
            insert_profile(&mut inner, &user);

            if !confirmed {
                return Ok(None);
            }
            let session = new_session(user);
            inner.session = Some(session.clone());
            session
        };

        self.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(Some(session))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, RemoteError> {
        self.check()?;
        let session = {
            let mut inner = self.inner();
            let account = inner
                .accounts
                .get(&normalize(email))
                .filter(|a| a.password == password)
                .cloned()
                .ok_or_else(|| {
                    RemoteError::new(400, Some("invalid_credentials"), "Invalid login credentials")
                })?;
            if !account.confirmed {
                return Err(RemoteError::new(
                    400,
                    Some("email_not_confirmed"),
                    "Email not confirmed",
                ));
            }
            let session = new_session(account.user);
            inner.session = Some(session.clone());
            session
        };

        self.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        self.inner().session = None;
        self.emit(AuthEvent::SignedOut, None);
        self.check()
    }

    async fn get_session(&self) -> Result<Option<Session>, RemoteError> {
        self.check()?;
        Ok(self.inner().session.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        _redirect_to: Option<&str>,
    ) -> Result<(), RemoteError> {
        self.check()?;
        self.inner().reset_requests.push(normalize(email));
        Ok(())
    }

    async fn update_user(&self, attributes: UserAttributes) -> Result<User, RemoteError> {
        self.check()?;
        let session = {
            let mut inner = self.inner();
            let Some(mut session) = inner.session.clone() else {
                return Err(RemoteError::new(401, Some("no_authorization"), "Auth session missing!"));
            };
            let key = session.user.email.as_deref().map(normalize).unwrap_or_default();
            let Some(account) = inner.accounts.get_mut(&key) else {
                return Err(RemoteError::new(404, Some("user_not_found"), "User not found"));
            };

            if let Some(password) = attributes.password {
                if password.len() < MIN_PASSWORD_LEN {
                    return Err(RemoteError::new(
                        422,
                        Some("weak_password"),
                        "Password should be at least 6 characters.",
                    ));
                }
                account.password = password;
            }
            if let Some(Value::Object(data)) = attributes.data {
                if let Value::Object(existing) = &mut account.user.user_metadata {
                    existing.extend(data);
                } else {
                    account.user.user_metadata = Value::Object(data);
                }
            }

            session.user = account.user.clone();
            inner.session = Some(session.clone());
            session
        };

        let user = session.user.clone();
        self.emit(AuthEvent::UserUpdated, Some(session));
        Ok(user)
    }

    async fn set_session_from_url(&self, fragment: &str) -> Result<Option<AuthEvent>, RemoteError> {
        self.check()?;
        let Some(tokens) = parse_link_fragment(fragment)? else {
            return Ok(None);
        };

        let event = tokens.event();
        let session = {
            let mut inner = self.inner();
            let key = inner.links.remove(&tokens.access_token).unwrap_or_default();
            let Some(account) = inner.accounts.get_mut(&key) else {
                return Err(RemoteError::new(
                    403,
                    Some("otp_expired"),
                    "Email link is invalid or has expired",
                ));
            };
            account.confirmed = true;
            let session = new_session(account.user.clone());
            inner.session = Some(session.clone());
            session
        };

        self.emit(event, Some(session));
        Ok(Some(event))
    }
}

impl Database for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
        self.check()?;
        let inner = self.inner();
        let rows = inner.tables.get(table).map(Vec::as_slice).unwrap_or_default();
        Ok(query.apply(rows).into_iter().map(Value::Object).collect())
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64, RemoteError> {
        self.check()?;
        let inner = self.inner();
        let count = inner
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, RemoteError> {
        self.check()?;
        insert_row(&mut self.inner(), table, row)
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, RemoteError> {
        self.check()?;
        let Value::Object(patch) = patch else {
            return Err(RemoteError::new(400, Some("PGRST102"), "expected a JSON object"));
        };

        let mut inner = self.inner();
        let rows = inner.tables.entry(table.to_string()).or_default();
        let now = now_rfc3339();

        // Patch a copy so a constraint violation leaves the table untouched.
        let mut patched = rows.clone();
        let mut touched = Vec::new();
        for (index, row) in patched.iter_mut().enumerate() {
            if query.matches(row) {
                row.extend(patch.clone());
                if row.contains_key("updated_at") {
                    row.insert("updated_at".to_string(), Value::from(now.clone()));
                }
                touched.push(index);
            }
        }

        let keys = unique_keys(table);
        for &index in &touched {
            let row = &patched[index];
            let clash = patched
                .iter()
                .enumerate()
                .any(|(other, existing)| other != index && same_key(keys, existing, row));
            if clash {
                return Err(duplicate_key(table));
            }
        }

        let updated = touched
            .iter()
            .map(|&index| Value::Object(patched[index].clone()))
            .collect();
        *rows = patched;
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
        self.check()?;
        let mut inner = self.inner();
        let rows = inner.tables.entry(table.to_string()).or_default();
        let (deleted, kept): (Vec<_>, Vec<_>) =
            rows.drain(..).partition(|row| query.matches(row));
        *rows = kept;
        Ok(deleted.into_iter().map(Value::Object).collect())
    }
}

impl Storage for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), RemoteError> {
        self.inner().upload_calls += 1;
        self.check()?;

        let mut inner = self.inner();
        let objects = inner.buckets.entry(bucket.to_string()).or_default();
        if objects.contains_key(path) {
            return Err(RemoteError::new(409, Some("Duplicate"), "The resource already exists"));
        }
        objects.insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("http://localhost/storage/v1/object/public/{bucket}/{path}")
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), RemoteError> {
        self.check()?;
        if let Some(objects) = self.inner().buckets.get_mut(bucket) {
            for path in paths {
                objects.remove(path);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id_timestamps_and_defaults() {
        let backend = MemoryBackend::new();
        let row = backend
            .insert(
                "students",
                json!({ "name": "Amani", "email": "a@example.com", "phone": "0700", "age": 9, "class": "kids" }),
            )
            .await
            .unwrap();

        assert!(row["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(row["created_at"].is_string());
        assert!(row["updated_at"].is_string());
        assert_eq!(row["status"], json!("pending"));
        assert_eq!(backend.rows("students").len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_return_affected_rows() {
        let backend = MemoryBackend::new();
        let row = backend
            .seed("messages", json!({ "name": "N", "email": "n@x", "message": "hi" }))
            .unwrap();
        let id = row["id"].as_str().unwrap();

        let updated = backend
            .update("messages", &Query::by_id(id), json!({ "is_read": true }))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["is_read"], json!(true));

        let deleted = backend.delete("messages", &Query::by_id(id)).await.unwrap();
        assert_eq!(deleted.len(), 1);
        let deleted = backend.delete("messages", &Query::by_id(id)).await.unwrap();
        assert!(deleted.is_empty());
        assert_eq!(backend.count("messages", &Query::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unique_roles() {
        let backend = MemoryBackend::new();
        let grant = json!({ "user_id": "u1", "role": "admin" });
        backend.insert("user_roles", grant.clone()).await.unwrap();
        let err = backend.insert("user_roles", grant).await.unwrap_err();
        assert!(err.is_constraint());
    }

    #[tokio::test]
    async fn test_sign_in_emits_change() {
        let backend = MemoryBackend::new();
        backend.add_user("sensei@example.com", "kihap-123", Some("Sensei"));
        let mut changes = backend.subscribe();

        let err = backend
            .sign_in_with_password("sensei@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("invalid_credentials"));

        let session = backend
            .sign_in_with_password("Sensei@Example.com ", "kihap-123")
            .await
            .unwrap();
        let change = changes.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedIn);
        assert_eq!(change.session.as_ref(), Some(&session));
        assert_eq!(backend.get_session().await.unwrap(), Some(session));

        backend.sign_out().await.unwrap();
        let change = changes.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedOut);
        assert!(backend.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_with_confirmation_required() {
        let backend = MemoryBackend::new();
        backend.require_email_confirmation(true);

        let session = backend
            .sign_up("new@example.com", "secret-1", SignUpOptions::default())
            .await
            .unwrap();
        assert!(session.is_none());

        let err = backend
            .sign_in_with_password("new@example.com", "secret-1")
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("email_not_confirmed"));

        backend.confirm_email("new@example.com");
        assert!(backend
            .sign_in_with_password("new@example.com", "secret-1")
            .await
            .is_ok());
        assert_eq!(backend.rows("profiles").len(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = MemoryBackend::new();
        backend.fail_with(Some(RemoteError::network("offline")));
        assert!(backend.select("coaches", &Query::new()).await.is_err());
        assert!(backend.upload("coaches", "a.png", vec![1], "image/png").await.is_err());
        assert_eq!(backend.upload_calls(), 1);

        backend.fail_with(None);
        assert!(backend.select("coaches", &Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_roundtrip() {
        let backend = MemoryBackend::new();
        backend
            .upload("gallery", "photos/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        let err = backend
            .upload("gallery", "photos/a.png", vec![4], "image/png")
            .await
            .unwrap_err();
        assert_eq!(err.status, 409);
        assert_eq!(backend.objects("gallery"), vec!["photos/a.png".to_string()]);

        backend
            .remove("gallery", &["photos/a.png".to_string(), "missing.png".to_string()])
            .await
            .unwrap();
        assert!(backend.objects("gallery").is_empty());
    }

    #[tokio::test]
    async fn test_update_respects_unique_keys() {
        let backend = MemoryBackend::new();
        backend
            .seed("user_roles", json!({ "user_id": "u1", "role": "admin" }))
            .unwrap();
        let member = backend
            .seed("user_roles", json!({ "user_id": "u1", "role": "user" }))
            .unwrap();
        let before = backend.rows("user_roles");

        let err = backend
            .update(
                "user_roles",
                &Query::by_id(member["id"].as_str().unwrap()),
                json!({ "role": "admin" }),
            )
            .await
            .unwrap_err();
        assert!(err.is_constraint());
        assert_eq!(err.code.as_deref(), Some("23505"));
        assert_eq!(backend.rows("user_roles"), before);

        // Patching a row onto its own key is not a conflict.
        let updated = backend
            .update(
                "user_roles",
                &Query::by_id(member["id"].as_str().unwrap()),
                json!({ "role": "user" }),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
    }

    #[tokio::test]
    async fn test_recovery_link_signs_in_once() {
        let backend = MemoryBackend::new();
        let user = backend.add_user("sensei@example.com", "kihap-123", None);
        assert!(backend.email_link("nobody@example.com", true).is_none());
        let link = backend.email_link("Sensei@example.com", true).unwrap();
        let mut changes = backend.subscribe();

        let event = backend.set_session_from_url(&link).await.unwrap();
        assert_eq!(event, Some(AuthEvent::PasswordRecovery));
        let change = changes.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::PasswordRecovery);
        assert_eq!(change.session.unwrap().user.id, user.id);
        assert!(backend.get_session().await.unwrap().is_some());

        let err = backend.set_session_from_url(&link).await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some("otp_expired"));
    }

    #[tokio::test]
    async fn test_verification_link_confirms_account() {
        let backend = MemoryBackend::new();
        backend.require_email_confirmation(true);
        backend
            .sign_up("new@example.com", "secret-1", SignUpOptions::default())
            .await
            .unwrap();

        let link = backend.email_link("new@example.com", false).unwrap();
        assert_eq!(
            backend.set_session_from_url(&link).await.unwrap(),
            Some(AuthEvent::SignedIn)
        );
        backend.sign_out().await.unwrap();
        assert!(backend
            .sign_in_with_password("new@example.com", "secret-1")
            .await
            .is_ok());
    }
}

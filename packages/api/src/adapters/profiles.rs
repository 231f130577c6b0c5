use backend::{AuthApi, Database, Query};

use super::Table;
use crate::error::DataError;
use crate::models::{Profile, ProfileUpdate};

const TABLE: &str = "profiles";

#[derive(Clone)]
pub struct ProfileAdapter<B> {
    backend: B,
}

impl<B: AuthApi + Database> ProfileAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn table(&self) -> Table<'_, B> {
        Table::new(&self.backend, TABLE)
    }

    async fn current_user_id(&self) -> Result<String, DataError> {
        match self.backend.get_session().await? {
            Some(session) => Ok(session.user.id),
            None => Err(DataError::Unauthenticated),
        }
    }

    /// Every account's profile, newest first. Admin users page.
    pub async fn get_all(&self) -> Result<Vec<Profile>, DataError> {
        self.table()
            .select(&Query::new().order("created_at", false))
            .await
    }

    pub async fn get_my_profile(&self) -> Result<Profile, DataError> {
        let user_id = self.current_user_id().await?;
        self.table()
            .select_one(&Query::new().eq("user_id", user_id))
            .await
    }

    pub async fn update_my_profile(&self, patch: &ProfileUpdate) -> Result<Profile, DataError> {
        let user_id = self.current_user_id().await?;
        self.table()
            .update(&Query::new().eq("user_id", user_id), patch)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::{MemoryBackend, RemoteError};

    #[tokio::test]
    async fn test_requires_a_session() {
        let profiles = ProfileAdapter::new(MemoryBackend::new());
        assert_eq!(profiles.get_my_profile().await, Err(DataError::Unauthenticated));
        assert_eq!(
            profiles.update_my_profile(&ProfileUpdate::default()).await,
            Err(DataError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_own_profile_roundtrip() {
        let backend = MemoryBackend::new();
        backend.add_user("kim@example.com", "secret1", Some("Kim"));
        backend.add_user("lee@example.com", "secret2", None);
        backend.sign_in_with_password("kim@example.com", "secret1").await.unwrap();

        let profiles = ProfileAdapter::new(backend);
        let mine = profiles.get_my_profile().await.unwrap();
        assert_eq!(mine.display_name(), "Kim");

        let patch = ProfileUpdate {
            full_name: Some(Some("Kim Otieno".to_string())),
            ..ProfileUpdate::default()
        };
        let updated = profiles.update_my_profile(&patch).await.unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Kim Otieno"));
        assert_eq!(profiles.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_backend_failures_surface_as_data_errors() {
        let backend = MemoryBackend::new();
        backend.add_user("kim@example.com", "secret1", Some("Kim"));
        backend.sign_in_with_password("kim@example.com", "secret1").await.unwrap();
        let profiles = ProfileAdapter::new(backend.clone());

        backend.fail_with(Some(RemoteError::network("offline")));
        assert!(matches!(profiles.get_all().await, Err(DataError::Remote(_))));
        assert!(matches!(profiles.get_my_profile().await, Err(DataError::Remote(_))));
        assert!(matches!(
            profiles.update_my_profile(&ProfileUpdate::default()).await,
            Err(DataError::Remote(_))
        ));

        backend.fail_with(Some(RemoteError::new(403, Some("42501"), "permission denied for table profiles")));
        assert!(matches!(profiles.get_all().await, Err(DataError::PermissionDenied(_))));

        backend.fail_with(None);
        assert_eq!(profiles.get_my_profile().await.unwrap().display_name(), "Kim");
    }
}

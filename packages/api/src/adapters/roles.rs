use backend::{Database, Query};
use serde_json::json;

use super::Table;
use crate::error::DataError;
use crate::models::{Role, UserRole};

const TABLE: &str = "user_roles";

fn grant_query(user_id: &str, role: Role) -> Query {
    Query::new().eq("user_id", user_id).eq("role", role.as_str())
}

#[derive(Clone)]
pub struct RoleAdapter<B> {
    backend: B,
}

impl<B: Database> RoleAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn table(&self) -> Table<'_, B> {
        Table::new(&self.backend, TABLE)
    }

    pub async fn has_role(&self, user_id: &str, role: Role) -> Result<bool, DataError> {
        let grants: Vec<UserRole> = self.table().select(&grant_query(user_id, role).limit(1)).await?;
        Ok(!grants.is_empty())
    }

    pub async fn list(&self) -> Result<Vec<UserRole>, DataError> {
        self.table().select(&Query::new()).await
    }

    /// Granting a role the user already holds returns the existing grant.
    pub async fn grant(&self, user_id: &str, role: Role) -> Result<UserRole, DataError> {
        match self.table().select_one(&grant_query(user_id, role)).await {
            Ok(existing) => return Ok(existing),
            Err(DataError::NotFound) => {}
            Err(e) => return Err(e),
        }
        tracing::info!("granting {} to {}", role, user_id);
        self.table()
            .insert(&json!({ "user_id": user_id, "role": role }))
            .await
    }

    pub async fn revoke(&self, user_id: &str, role: Role) -> Result<(), DataError> {
        tracing::info!("revoking {} from {}", role, user_id);
        self.table().delete(&grant_query(user_id, role)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::{MemoryBackend, RemoteError};

    #[tokio::test]
    async fn test_grant_and_revoke() {
        let roles = RoleAdapter::new(MemoryBackend::new());
        assert!(!roles.has_role("u1", Role::Admin).await.unwrap());

        let grant = roles.grant("u1", Role::Admin).await.unwrap();
        assert_eq!(grant.role, Role::Admin);
        assert!(roles.has_role("u1", Role::Admin).await.unwrap());
        assert!(!roles.has_role("u1", Role::User).await.unwrap());
        assert!(!roles.has_role("u2", Role::Admin).await.unwrap());

        assert_eq!(roles.grant("u1", Role::Admin).await.unwrap().id, grant.id);
        assert_eq!(roles.list().await.unwrap().len(), 1);

        roles.revoke("u1", Role::Admin).await.unwrap();
        assert!(!roles.has_role("u1", Role::Admin).await.unwrap());
        assert_eq!(roles.revoke("u1", Role::Admin).await, Err(DataError::NotFound));
    }

    #[tokio::test]
    async fn test_backend_failures_surface_as_data_errors() {
        let backend = MemoryBackend::new();
        let roles = RoleAdapter::new(backend.clone());
        roles.grant("u1", Role::Admin).await.unwrap();

        backend.fail_with(Some(RemoteError::network("offline")));
        assert!(matches!(roles.has_role("u1", Role::Admin).await, Err(DataError::Remote(_))));
        assert!(matches!(roles.list().await, Err(DataError::Remote(_))));
        assert!(matches!(roles.grant("u2", Role::Admin).await, Err(DataError::Remote(_))));
        assert!(matches!(roles.revoke("u1", Role::Admin).await, Err(DataError::Remote(_))));

        backend.fail_with(None);
        assert!(roles.has_role("u1", Role::Admin).await.unwrap());
        assert!(!roles.has_role("u2", Role::Admin).await.unwrap());
    }
}

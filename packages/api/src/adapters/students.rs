use backend::{Database, Query};
use serde_json::json;

use super::Table;
use crate::error::DataError;
use crate::models::{NewStudent, Student, StudentStatus};

const TABLE: &str = "students";

#[derive(Clone)]
pub struct StudentAdapter<B> {
    backend: B,
}

impl<B: Database> StudentAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn table(&self) -> Table<'_, B> {
        Table::new(&self.backend, TABLE)
    }

    /// Public Join form. New registrations start out pending.
    pub async fn register(&self, student: &NewStudent) -> Result<Student, DataError> {
        student.validate()?;
        self.table().insert(student).await
    }

    pub async fn get_all(&self) -> Result<Vec<Student>, DataError> {
        self.table()
            .select(&Query::new().order("created_at", false))
            .await
    }

    pub async fn update_status(&self, id: &str, status: StudentStatus) -> Result<Student, DataError> {
        self.table()
            .update(&Query::by_id(id), &json!({ "status": status }))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DataError> {
        self.table().delete(&Query::by_id(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassKind;
    use backend::{MemoryBackend, RemoteError};

    fn application() -> NewStudent {
        NewStudent {
            name: "Amani".to_string(),
            email: "amani@example.com".to_string(),
            phone: "0700 000 000".to_string(),
            age: 9,
            class: ClassKind::Kids,
            message: None,
        }
    }

    #[tokio::test]
    async fn test_registration_lifecycle() {
        let students = StudentAdapter::new(MemoryBackend::new());
        let student = students.register(&application()).await.unwrap();
        assert_eq!(student.status, StudentStatus::Pending);

        let approved = students
            .update_status(&student.id, StudentStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, StudentStatus::Approved);
        assert_eq!(approved.name, "Amani");

        students.delete(&student.id).await.unwrap();
        assert!(students.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_validates_before_sending() {
        let backend = MemoryBackend::new();
        let students = StudentAdapter::new(backend.clone());
        let mut student = application();
        student.phone = String::new();
        assert_eq!(students.register(&student).await, Err(DataError::MissingField("phone")));
        assert!(backend.rows(TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_update_status_of_missing_student() {
        let students = StudentAdapter::new(MemoryBackend::new());
        assert_eq!(
            students.update_status("gone", StudentStatus::Rejected).await,
            Err(DataError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_backend_failures_surface_as_data_errors() {
        let backend = MemoryBackend::new();
        let students = StudentAdapter::new(backend.clone());
        let student = students.register(&application()).await.unwrap();

        backend.fail_with(Some(RemoteError::network("offline")));
        assert!(matches!(students.register(&application()).await, Err(DataError::Remote(_))));
        assert!(matches!(students.get_all().await, Err(DataError::Remote(_))));
        assert!(matches!(
            students.update_status(&student.id, StudentStatus::Approved).await,
            Err(DataError::Remote(_))
        ));

        backend.fail_with(Some(RemoteError::new(401, None, "JWT expired")));
        assert!(matches!(students.delete(&student.id).await, Err(DataError::PermissionDenied(_))));

        backend.fail_with(None);
        let rows = students.get_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, StudentStatus::Pending);
    }
}

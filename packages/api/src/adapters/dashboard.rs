use backend::{Database, Query};

use super::Table;
use crate::error::DataError;
use crate::models::DashboardStats;

#[derive(Clone)]
pub struct DashboardAdapter<B> {
    backend: B,
}

impl<B: Database> DashboardAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Six exact counts, fetched concurrently. Any failure fails the whole set.
    pub async fn stats(&self) -> Result<DashboardStats, DataError> {
        let all = Query::new();
        let unread = Query::new().eq("is_read", false);
        let pending = Query::new().eq("status", "pending");

        let coaches = Table::new(&self.backend, "coaches");
        let events = Table::new(&self.backend, "events");
        let students = Table::new(&self.backend, "students");
        let messages = Table::new(&self.backend, "messages");

        let (coaches, events, students, messages, unread_messages, pending_students) = tokio::join!(
            coaches.count(&all),
            events.count(&all),
            students.count(&all),
            messages.count(&all),
            messages.count(&unread),
            students.count(&pending),
        );

        Ok(DashboardStats {
            coaches: coaches?,
            events: events?,
            students: students?,
            messages: messages?,
            unread_messages: unread_messages?,
            pending_students: pending_students?,
        })
    }
}

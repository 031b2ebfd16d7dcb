use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::api::{Backend, Query};
use crate::models::{ContactMessage, NewContactMessage, RecordId};
use crate::validation::validate_contact;

use super::table::{execute, TableService};
use super::FetchResult;

/// Contact form submissions and the admin inbox.
#[derive(Clone)]
pub struct ContactService {
    table: TableService<ContactMessage>,
}

impl ContactService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            table: TableService::new(backend),
        }
    }

    /// Inbox, newest first.
    pub async fn get_all(&self) -> FetchResult<Vec<ContactMessage>> {
        self.table
            .get_all(&Query::new().order("created_at", false))
            .await
    }

    /// Validate and store a submission. Invalid input never reaches the backend.
    pub async fn create(&self, input: &NewContactMessage) -> FetchResult<ContactMessage> {
        let message = match validate_contact(input) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Contact message rejected");
                return FetchResult::error_message(e);
            }
        };

        let result = self.table.create(&message).await;
        if result.is_ok() {
            info!("Contact message stored");
        }
        result
    }

    pub async fn mark_as_read(&self, id: &RecordId) -> FetchResult<ContactMessage> {
        self.table.update(id, &json!({ "is_read": true })).await
    }

    pub async fn delete(&self, id: &RecordId) -> FetchResult<()> {
        self.table.delete(id).await
    }

    /// Number of unread messages in the inbox.
    pub async fn unread_count(&self) -> FetchResult<usize> {
        let table = self.table.table();
        execute(table, "unread_count", async {
            let rows = self
                .table
                .backend()
                .select(table, &Query::new().select("id").eq("is_read", false))
                .await?;
            Ok(rows.len())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;

    fn submission() -> NewContactMessage {
        NewContactMessage::new(
            "Grace",
            "grace@example.com",
            "Collaboration",
            "Would you like to build something <together>?",
        )
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let service = ContactService::new(backend.clone());

        let mut input = submission();
        input.email = "grace".into();
        let result = service.create(&input).await;

        assert_eq!(result.error(), Some("Please enter a valid email address"));
        assert!(backend.rows("contacts").is_empty());
    }

    #[tokio::test]
    async fn test_create_stores_escaped_message() {
        let backend = Arc::new(MemoryBackend::new());
        let service = ContactService::new(backend.clone());

        let stored = service.create(&submission()).await.into_data().unwrap();
        assert_eq!(stored.message, "Would you like to build something &lt;together&gt;?");
        assert!(!stored.is_read);
        assert_eq!(backend.rows("contacts").len(), 1);
    }

    #[tokio::test]
    async fn test_inbox_workflow() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            "contacts",
            vec![
                json!({"id": 1, "name": "A", "email": "a@x.io", "subject": "s1", "message": "m", "is_read": false, "created_at": "2025-01-01T00:00:00Z"}),
                json!({"id": 2, "name": "B", "email": "b@x.io", "subject": "s2", "message": "m", "is_read": false, "created_at": "2025-02-01T00:00:00Z"}),
            ],
        );
        let service = ContactService::new(backend.clone());

        let inbox = service.get_all().await.into_data().unwrap();
        assert_eq!(inbox[0].name, "B");
        assert_eq!(service.unread_count().await.into_data(), Some(2));

        let read = service.mark_as_read(&RecordId::Int(1)).await.into_data().unwrap();
        assert!(read.is_read);
        assert_eq!(service.unread_count().await.into_data(), Some(1));

        assert!(service.delete(&RecordId::Int(2)).await.is_ok());
        assert_eq!(backend.rows("contacts").len(), 1);
    }
}

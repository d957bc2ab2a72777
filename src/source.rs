use async_trait::async_trait;
use thiserror::Error;

use crate::models::Event;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("background task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        QueryError::Database(err.to_string())
    }
}

/// Read-only access to the events and RSVP tables.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// All events, ascending by date.
    async fn list_events(&self) -> Result<Vec<Event>, QueryError>;

    /// Number of RSVPs recorded for `event_id`.
    async fn count_rsvps(&self, event_id: &str) -> Result<u64, QueryError>;
}

#[async_trait]
impl<S> EventSource for Box<S>
where
    S: EventSource + ?Sized,
{
    async fn list_events(&self) -> Result<Vec<Event>, QueryError> {
        (**self).list_events().await
    }

    async fn count_rsvps(&self, event_id: &str) -> Result<u64, QueryError> {
        (**self).count_rsvps(event_id).await
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags};
use tokio::task;

use crate::models::Event;
use crate::source::{EventSource, QueryError};

/// Local mirror of the hosted `events` and `rsvp_responses` tables.
///
/// Each query opens its own connection on the blocking pool, so concurrent
/// count queries never share a handle.
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Points at an existing database file. Nothing is created; a missing
    /// file surfaces as an error on the first query.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(path: &Path) -> rusqlite::Result<Connection> {
        Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    async fn run_blocking<T, F>(&self, query: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || query(Self::connect(&path)?))
            .await
            .map_err(|err| QueryError::Task(err.to_string()))?
            .map_err(QueryError::from)
    }
}

#[async_trait]
impl EventSource for SqliteStore {
    async fn list_events(&self) -> Result<Vec<Event>, QueryError> {
        self.run_blocking(|conn| {
            let mut stmt = conn.prepare("SELECT payload FROM events ORDER BY date ASC, id ASC")?;
            let rows = stmt.query_map([], |row| {
                let payload: String = row.get(0)?;
                serde_json::from_str::<Event>(&payload).map_err(|err| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(err),
                    )
                })
            })?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
        .await
    }

    async fn count_rsvps(&self, event_id: &str) -> Result<u64, QueryError> {
        let event_id = event_id.to_string();
        let count: i64 = self
            .run_blocking(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM rsvp_responses WHERE event_id = ?1",
                    params![event_id],
                    |row| row.get(0),
                )
            })
            .await?;
        u64::try_from(count).map_err(|err| QueryError::Parse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_event;

    const TEST_SCHEMA: &str = "CREATE TABLE events(
            id TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            date TEXT NOT NULL
        );
        CREATE TABLE rsvp_responses(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT NOT NULL
        );";

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "community_events_db_{name}_{}.sqlite",
            std::process::id()
        ))
    }

    /// Fresh database with the schema in place, plus a writable handle for
    /// seeding rows.
    fn temp_store(name: &str) -> (SqliteStore, Connection) {
        let path = temp_path(name);
        let _ = std::fs::remove_file(&path);
        let conn = Connection::open(&path).expect("create test db");
        conn.execute_batch(TEST_SCHEMA).expect("create schema");
        (SqliteStore::open(path), conn)
    }

    fn insert_event(conn: &Connection, event: &Event) {
        let payload = serde_json::to_string(event).expect("event serialization");
        conn.execute(
            "INSERT INTO events (id, payload, date) VALUES (?1, ?2, ?3)",
            params![event.id, payload, event.date],
        )
        .unwrap();
    }

    fn insert_rsvps(conn: &Connection, event_id: &str, count: usize) {
        for _ in 0..count {
            conn.execute(
                "INSERT INTO rsvp_responses (event_id) VALUES (?1)",
                params![event_id],
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn lists_events_by_date() {
        let (store, conn) = temp_store("order");
        insert_event(&conn, &sample_event("late", "2024-09-01", true));
        insert_event(&conn, &sample_event("early", "2024-01-15", false));
        insert_event(&conn, &sample_event("mid", "2024-05-20", true));

        let events = store.list_events().await.expect("list events");
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
        assert_eq!(events[0], sample_event("early", "2024-01-15", false));
    }

    #[tokio::test]
    async fn counts_rsvps_per_event() {
        let (store, conn) = temp_store("count");
        insert_rsvps(&conn, "a", 3);
        insert_rsvps(&conn, "b", 1);

        assert_eq!(store.count_rsvps("a").await.unwrap(), 3);
        assert_eq!(store.count_rsvps("b").await.unwrap(), 1);
        assert_eq!(store.count_rsvps("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_payload_is_a_database_error() {
        let (store, conn) = temp_store("malformed");
        conn.execute(
            "INSERT INTO events (id, payload, date) VALUES ('x', 'not json', '2024-01-01')",
            [],
        )
        .unwrap();

        let err = store.list_events().await.expect_err("bad payload");
        match err {
            QueryError::Database(message) => assert!(message.contains("index: 0"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_error_and_is_not_created() {
        let dir = std::env::temp_dir().join(format!(
            "community_events_missing_dir_{}",
            std::process::id()
        ));
        let path = dir.join("evnets.sqlite");
        let store = SqliteStore::open(&path);

        assert!(matches!(
            store.list_events().await,
            Err(QueryError::Database(_))
        ));
        assert!(matches!(
            store.count_rsvps("a").await,
            Err(QueryError::Database(_))
        ));
        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn queries_leave_the_file_untouched() {
        let (store, conn) = temp_store("untouched");
        insert_rsvps(&conn, "a", 2);
        drop(conn);
        let before = std::fs::read(store.path()).expect("read db");

        store.list_events().await.expect("list events");
        store.count_rsvps("a").await.expect("count");

        assert_eq!(std::fs::read(store.path()).expect("read db"), before);
    }
}

//! Database operations for the store module

use crate::crawler::ProcessedPage;
use crate::llm::Role;
use crate::store::error::DbError;
use crate::store::schema;
use crate::store::{ChatSession, ContentRecord, StoredMessage};
use libsql::{params, Connection, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Database manager for content and chat storage
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database manager
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection) -> Result<Self, DbError> {
        schema::initialize_schema(&conn).await?;
        Ok(Self { conn })
    }

    /// Create a new database manager from a path
    pub async fn new_from_path(path: &str) -> Result<Self, DbError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DbError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| DbError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn).await
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Replace all stored content with the given pages
    ///
    /// Runs as a single transaction wrapping the delete and the inserts, so
    /// readers never observe a partially-replaced (or empty) content table.
    /// Returns the number of inserted records.
    #[instrument(skip(self, pages), fields(count = pages.len()))]
    pub async fn replace_content(&self, pages: &[ProcessedPage]) -> Result<usize, DbError> {
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| DbError::Transaction(format!("Failed to start transaction: {}", e)))?;

        tx.execute("DELETE FROM contents", params![])
            .await
            .map_err(|e| DbError::Query(format!("Failed to delete contents: {}", e)))?;

        let now = Self::now();
        for page in pages {
            tx.execute(
                "INSERT INTO contents (title, content, url, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    page.title.clone(),
                    page.content.clone(),
                    page.url.clone(),
                    now,
                    now,
                ],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to insert content: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::Transaction(format!("Failed to commit transaction: {}", e)))?;

        debug!("Replaced stored content with {} records", pages.len());
        Ok(pages.len())
    }

    /// Get all content records, most recently updated first
    #[instrument(skip(self))]
    pub async fn all_content(&self) -> Result<Vec<ContentRecord>, DbError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, title, content, url, created_at, updated_at
                 FROM contents
                 ORDER BY updated_at DESC, id DESC",
                params![],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to get contents: {}", e)))?;

        let mut records = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            records.push(self.row_to_content(&row)?);
        }

        Ok(records)
    }

    /// Get the update time of the most recently updated content record
    pub async fn latest_update(&self) -> Result<Option<i64>, DbError> {
        let mut rows = self
            .conn
            .query(
                "SELECT updated_at FROM contents ORDER BY updated_at DESC LIMIT 1",
                params![],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to get latest update: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let updated_at = row
                    .get(0)
                    .map_err(|e| DbError::Data(format!("Failed to get updated_at: {}", e)))?;
                Ok(Some(updated_at))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DbError::Data(format!("Failed to get latest update: {}", e))),
        }
    }

    /// Create a new chat session
    pub async fn create_session(&self) -> Result<ChatSession, DbError> {
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            created_at: Self::now(),
            updated_at: Self::now(),
        };

        self.conn
            .execute(
                "INSERT INTO sessions (id, created_at, updated_at) VALUES (?, ?, ?)",
                params![
                    session.id.clone(),
                    session.created_at,
                    session.updated_at
                ],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to create session: {}", e)))?;

        Ok(session)
    }

    /// Get a session by id
    pub async fn get_session(&self, session_id: &str) -> Result<Option<ChatSession>, DbError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, created_at, updated_at FROM sessions WHERE id = ?",
                params![session_id],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to get session: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(self.row_to_session(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DbError::Data(format!("Failed to get session: {}", e))),
        }
    }

    /// Append a message to a session
    ///
    /// Also bumps the session's `updated_at`.
    #[instrument(skip(self, content), fields(session_id = %session_id, role = role.as_str()))]
    pub async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<StoredMessage, DbError> {
        let now = Self::now();

        self.conn
            .execute(
                "INSERT INTO messages (session_id, role, content, created_at)
                 VALUES (?, ?, ?, ?)",
                params![session_id, role.as_str(), content, now],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to append message: {}", e)))?;

        let mut rows = self
            .conn
            .query("SELECT last_insert_rowid()", params![])
            .await
            .map_err(|e| DbError::Query(format!("Failed to get last insert ID: {}", e)))?;

        let row = match rows.next().await {
            Ok(Some(row)) => row,
            Ok(None) => {
                return Err(DbError::Data(
                    "No ID returned from last_insert_rowid()".to_string(),
                ))
            }
            Err(e) => return Err(DbError::Data(format!("Failed to get ID: {}", e))),
        };

        let id: i64 = row
            .get(0)
            .map_err(|e| DbError::Data(format!("Failed to get ID: {}", e)))?;

        self.conn
            .execute(
                "UPDATE sessions SET updated_at = ? WHERE id = ?",
                params![now, session_id],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to update session: {}", e)))?;

        Ok(StoredMessage {
            id,
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Get all messages in a session, oldest first
    #[instrument(skip(self))]
    pub async fn session_messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, DbError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, session_id, role, content, created_at
                 FROM messages
                 WHERE session_id = ?
                 ORDER BY created_at ASC, id ASC",
                params![session_id],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to get messages: {}", e)))?;

        let mut messages = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            messages.push(self.row_to_message(&row)?);
        }

        Ok(messages)
    }

    /// Convert a database row to a ContentRecord
    fn row_to_content(&self, row: &Row) -> Result<ContentRecord, DbError> {
        Ok(ContentRecord {
            id: row
                .get(0)
                .map_err(|e| DbError::Data(format!("Failed to get id: {}", e)))?,
            title: row
                .get(1)
                .map_err(|e| DbError::Data(format!("Failed to get title: {}", e)))?,
            content: row
                .get(2)
                .map_err(|e| DbError::Data(format!("Failed to get content: {}", e)))?,
            url: row
                .get(3)
                .map_err(|e| DbError::Data(format!("Failed to get url: {}", e)))?,
            created_at: row
                .get(4)
                .map_err(|e| DbError::Data(format!("Failed to get created_at: {}", e)))?,
            updated_at: row
                .get(5)
                .map_err(|e| DbError::Data(format!("Failed to get updated_at: {}", e)))?,
        })
    }

    /// Convert a database row to a ChatSession
    fn row_to_session(&self, row: &Row) -> Result<ChatSession, DbError> {
        Ok(ChatSession {
            id: row
                .get(0)
                .map_err(|e| DbError::Data(format!("Failed to get id: {}", e)))?,
            created_at: row
                .get(1)
                .map_err(|e| DbError::Data(format!("Failed to get created_at: {}", e)))?,
            updated_at: row
                .get(2)
                .map_err(|e| DbError::Data(format!("Failed to get updated_at: {}", e)))?,
        })
    }

    /// Convert a database row to a StoredMessage
    fn row_to_message(&self, row: &Row) -> Result<StoredMessage, DbError> {
        let role_str: String = row
            .get(2)
            .map_err(|e| DbError::Data(format!("Failed to get role: {}", e)))?;
        let role = role_str
            .parse::<Role>()
            .map_err(DbError::Data)?;

        Ok(StoredMessage {
            id: row
                .get(0)
                .map_err(|e| DbError::Data(format!("Failed to get id: {}", e)))?,
            session_id: row
                .get(1)
                .map_err(|e| DbError::Data(format!("Failed to get session_id: {}", e)))?,
            role,
            content: row
                .get(3)
                .map_err(|e| DbError::Data(format!("Failed to get content: {}", e)))?,
            created_at: row
                .get(4)
                .map_err(|e| DbError::Data(format!("Failed to get created_at: {}", e)))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_test_db() -> (Database, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();

        let db = Database::new_from_path(&db_path).await.unwrap();
        (db, temp_dir)
    }

    fn page(title: &str, url: &str) -> ProcessedPage {
        ProcessedPage {
            title: title.to_string(),
            content: format!("Summary of {}", title),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let (db, _temp_dir) = setup_test_db().await;

        let mut rows = db
            .conn
            .query(
                "SELECT name FROM sqlite_master WHERE type='table'
                 AND name IN ('contents', 'sessions', 'messages')",
                params![],
            )
            .await
            .unwrap();

        let mut tables = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let table_name: String = row.get(0).unwrap();
            tables.push(table_name);
        }

        assert_eq!(tables.len(), 3);
    }

    #[tokio::test]
    async fn test_replace_content_round_trip() {
        let (db, _temp_dir) = setup_test_db().await;

        let first = vec![page("Old", "https://x.test/old")];
        db.replace_content(&first).await.unwrap();

        let second = vec![
            page("Home", "https://x.test/"),
            page("About", "https://x.test/about"),
        ];
        let count = db.replace_content(&second).await.unwrap();
        assert_eq!(count, 2);

        // No residue from the first run
        let records = db.all_content().await.unwrap();
        assert_eq!(records.len(), 2);
        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert!(urls.contains(&"https://x.test/"));
        assert!(urls.contains(&"https://x.test/about"));
        assert!(!urls.contains(&"https://x.test/old"));
    }

    #[tokio::test]
    async fn test_replace_content_with_empty_set() {
        let (db, _temp_dir) = setup_test_db().await;

        db.replace_content(&[page("Home", "https://x.test/")])
            .await
            .unwrap();
        db.replace_content(&[]).await.unwrap();

        assert!(db.all_content().await.unwrap().is_empty());
        assert_eq!(db.latest_update().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_latest_update() {
        let (db, _temp_dir) = setup_test_db().await;

        assert_eq!(db.latest_update().await.unwrap(), None);

        db.replace_content(&[page("Home", "https://x.test/")])
            .await
            .unwrap();

        let latest = db.latest_update().await.unwrap().unwrap();
        assert!(latest > 0);
    }

    #[tokio::test]
    async fn test_sessions_and_messages() {
        let (db, _temp_dir) = setup_test_db().await;

        let session = db.create_session().await.unwrap();
        assert!(!session.id.is_empty());

        let found = db.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.id, session.id);

        db.append_message(&session.id, Role::User, "What is this site?")
            .await
            .unwrap();
        db.append_message(&session.id, Role::Assistant, "A test site.")
            .await
            .unwrap();

        let messages = db.session_messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "What is this site?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "A test site.");
    }

    #[tokio::test]
    async fn test_unknown_session_lookup() {
        let (db, _temp_dir) = setup_test_db().await;

        let found = db.get_session("no-such-session").await.unwrap();
        assert!(found.is_none());

        let messages = db.session_messages("no-such-session").await.unwrap();
        assert!(messages.is_empty());
    }
}

//! StoryStore: SQLite WAL persistent storage for users, projects, chats and messages
//!
//! - WAL mode: non-blocking concurrent reads
//! - Foreign keys enforced between the record levels
//! - Every read scoped by owner returns `None` for records the user does not own

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub overview: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub industry: String,
}

/// Project owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub overview: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub industry: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chat, optionally attached to a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One message in a chat; bot messages carry a serialized artifact bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub message: String,
    pub is_user: bool,
    pub created_at: DateTime<Utc>,
}

/// SQLite WAL store for the record hierarchy
#[derive(Debug)]
pub struct StoryStore {
    conn: Connection,
}

impl StoryStore {
    /// Opens (or creates) the SQLite database in WAL mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Creating DB directory '{}'", parent.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Opening SQLite '{}'", path.display()))?;
        let store = Self::configure(conn)?;
        tracing::debug!(path = %path.display(), "StoryStore opened");
        Ok(store)
    }

    /// Private in-memory database, used by tests and ephemeral runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory SQLite")?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .context("Configuring SQLite WAL pragmas")?;

        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Idempotent DDL migrations
    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                email           TEXT NOT NULL UNIQUE,
                name            TEXT,
                hashed_password TEXT NOT NULL,
                created_at_ms   INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                name          TEXT NOT NULL,
                overview      TEXT NOT NULL,
                type          TEXT NOT NULL,
                industry      TEXT NOT NULL,
                user_id       INTEGER NOT NULL REFERENCES users(id),
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);

            CREATE TABLE IF NOT EXISTS chats (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                title         TEXT NOT NULL,
                user_id       INTEGER NOT NULL REFERENCES users(id),
                project_id    INTEGER REFERENCES projects(id),
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chats_user ON chats(user_id, project_id);

            CREATE TABLE IF NOT EXISTS chat_messages (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id       INTEGER NOT NULL REFERENCES chats(id),
                user_id       INTEGER NOT NULL REFERENCES users(id),
                message       TEXT NOT NULL,
                is_user       INTEGER NOT NULL DEFAULT 1,
                created_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_chat ON chat_messages(chat_id, created_at_ms);
            ",
            )
            .context("Migrating SQLite schema")?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
    ) -> Result<User> {
        let now = Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO users (email, name, hashed_password, created_at_ms)
                 VALUES (?1, ?2, ?3, ?4)",
                params![email, name, hashed_password, now],
            )
            .context("INSERT users")?;

        let id = self.conn.last_insert_rowid();
        self.find_user(id)?
            .with_context(|| format!("User {} vanished after insert", id))
    }

    pub fn find_user(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, name, hashed_password, created_at_ms FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()
            .context("SELECT users by id")
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, name, hashed_password, created_at_ms FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()
            .context("SELECT users by email")
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_project(&self, user_id: i64, project: &NewProject) -> Result<Project> {
        let now = Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO projects (name, overview, type, industry, user_id, created_at_ms, updated_at_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    project.name,
                    project.overview,
                    project.project_type,
                    project.industry,
                    user_id,
                    now
                ],
            )
            .context("INSERT projects")?;

        let id = self.conn.last_insert_rowid();
        self.get_project(user_id, id)?
            .with_context(|| format!("Project {} vanished after insert", id))
    }

    pub fn list_projects(&self, user_id: i64) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, overview, type, industry, user_id, created_at_ms, updated_at_ms
             FROM projects WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![user_id], project_from_row)
            .context("Query projects")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Collecting projects")
    }

    pub fn get_project(&self, user_id: i64, project_id: i64) -> Result<Option<Project>> {
        self.conn
            .query_row(
                "SELECT id, name, overview, type, industry, user_id, created_at_ms, updated_at_ms
                 FROM projects WHERE id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                project_from_row,
            )
            .optional()
            .context("SELECT projects")
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chats
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_chat(&self, user_id: i64, title: &str, project_id: Option<i64>) -> Result<Chat> {
        let now = Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO chats (title, user_id, project_id, created_at_ms, updated_at_ms)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![title, user_id, project_id, now],
            )
            .context("INSERT chats")?;

        let id = self.conn.last_insert_rowid();
        self.get_chat(user_id, id)?
            .with_context(|| format!("Chat {} vanished after insert", id))
    }

    /// Chats of a user, optionally restricted to one project
    pub fn list_chats(&self, user_id: i64, project_id: Option<i64>) -> Result<Vec<Chat>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, user_id, project_id, created_at_ms, updated_at_ms
             FROM chats
             WHERE user_id = ?1 AND (?2 IS NULL OR project_id = ?2)
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![user_id, project_id], chat_from_row)
            .context("Query chats")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Collecting chats")
    }

    pub fn get_chat(&self, user_id: i64, chat_id: i64) -> Result<Option<Chat>> {
        self.conn
            .query_row(
                "SELECT id, title, user_id, project_id, created_at_ms, updated_at_ms
                 FROM chats WHERE id = ?1 AND user_id = ?2",
                params![chat_id, user_id],
                chat_from_row,
            )
            .optional()
            .context("SELECT chats")
    }

    pub fn touch_chat(&self, chat_id: i64) -> Result<()> {
        self.conn
            .execute(
                "UPDATE chats SET updated_at_ms = ?1 WHERE id = ?2",
                params![Utc::now().timestamp_millis(), chat_id],
            )
            .context("UPDATE chats")?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a message and bumps the chat's `updated_at` in one transaction.
    pub fn append_message(
        &self,
        chat_id: i64,
        user_id: i64,
        message: &str,
        is_user: bool,
    ) -> Result<ChatMessage> {
        let now = Utc::now().timestamp_millis();
        let tx = self
            .conn
            .unchecked_transaction()
            .context("BEGIN chat_messages")?;
        tx.execute(
            "INSERT INTO chat_messages (chat_id, user_id, message, is_user, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![chat_id, user_id, message, is_user, now],
        )
        .context("INSERT chat_messages")?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE chats SET updated_at_ms = ?1 WHERE id = ?2",
            params![now, chat_id],
        )
        .context("UPDATE chats")?;
        tx.commit().context("COMMIT chat_messages")?;

        Ok(ChatMessage {
            id,
            chat_id,
            user_id,
            message: message.to_string(),
            is_user,
            created_at: from_millis(now),
        })
    }

    /// Messages of a chat in creation order
    pub fn list_messages(&self, chat_id: i64) -> Result<Vec<ChatMessage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, chat_id, user_id, message, is_user, created_at_ms
             FROM chat_messages WHERE chat_id = ?1
             ORDER BY created_at_ms, id",
        )?;
        let rows = stmt
            .query_map(params![chat_id], |row| {
                Ok(ChatMessage {
                    id: row.get(0)?,
                    chat_id: row.get(1)?,
                    user_id: row.get(2)?,
                    message: row.get(3)?,
                    is_user: row.get(4)?,
                    created_at: from_millis(row.get(5)?),
                })
            })
            .context("Query chat_messages")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Collecting chat messages")
    }

    /// Row counts per table
    pub fn stats(&self) -> Result<serde_json::Value> {
        let count = |table: &str| -> Result<i64> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .with_context(|| format!("COUNT {}", table))
        };

        Ok(serde_json::json!({
            "users": count("users")?,
            "projects": count("projects")?,
            "chats": count("chats")?,
            "chat_messages": count("chat_messages")?,
        }))
    }
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        hashed_password: row.get(3)?,
        created_at: from_millis(row.get(4)?),
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        overview: row.get(2)?,
        project_type: row.get(3)?,
        industry: row.get(4)?,
        user_id: row.get(5)?,
        created_at: from_millis(row.get(6)?),
        updated_at: from_millis(row.get(7)?),
    })
}

fn chat_from_row(row: &Row<'_>) -> rusqlite::Result<Chat> {
    Ok(Chat {
        id: row.get(0)?,
        title: row.get(1)?,
        user_id: row.get(2)?,
        project_id: row.get(3)?,
        created_at: from_millis(row.get(4)?),
        updated_at: from_millis(row.get(5)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> StoryStore {
        StoryStore::open_in_memory().expect("in-memory SQLite should open")
    }

    fn sample_project() -> NewProject {
        NewProject {
            name: "Checkout".to_string(),
            overview: "Faster checkout for returning customers".to_string(),
            project_type: "web".to_string(),
            industry: "retail".to_string(),
        }
    }

    #[test]
    fn test_users_are_unique_by_email() {
        let store = temp_store();
        let user = store.create_user("pm@example.com", Some("Pat"), "hash").unwrap();
        assert_eq!(user.email, "pm@example.com");

        let found = store.find_user_by_email("pm@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.hashed_password, "hash");

        assert!(store.create_user("pm@example.com", None, "other").is_err());
        assert!(store.find_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_user_serialization_hides_password() {
        let store = temp_store();
        let user = store.create_user("pm@example.com", None, "secret-hash").unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_projects_are_scoped_to_owner() {
        let store = temp_store();
        let alice = store.create_user("alice@example.com", None, "h").unwrap();
        let bob = store.create_user("bob@example.com", None, "h").unwrap();

        let project = store.create_project(alice.id, &sample_project()).unwrap();
        assert_eq!(project.project_type, "web");

        assert_eq!(store.list_projects(alice.id).unwrap().len(), 1);
        assert!(store.list_projects(bob.id).unwrap().is_empty());
        assert!(store.get_project(bob.id, project.id).unwrap().is_none());
    }

    #[test]
    fn test_chat_listing_filters_by_project() {
        let store = temp_store();
        let user = store.create_user("pm@example.com", None, "h").unwrap();
        let project = store.create_project(user.id, &sample_project()).unwrap();

        store.create_chat(user.id, "Loose chat", None).unwrap();
        let attached = store.create_chat(user.id, "Project chat", Some(project.id)).unwrap();

        assert_eq!(store.list_chats(user.id, None).unwrap().len(), 2);
        let filtered = store.list_chats(user.id, Some(project.id)).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, attached.id);
    }

    #[test]
    fn test_messages_keep_creation_order() {
        let store = temp_store();
        let user = store.create_user("pm@example.com", None, "h").unwrap();
        let chat = store.create_chat(user.id, "Backlog", None).unwrap();

        store.append_message(chat.id, user.id, "Add a logout button", true).unwrap();
        store
            .append_message(chat.id, user.id, r#"{"description":null,"story":"x","test_cases":null}"#, false)
            .unwrap();

        let messages = store.list_messages(chat.id).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user);
        assert!(!messages[1].is_user);
        assert!(messages[0].id < messages[1].id);
    }

    #[test]
    fn test_message_requires_existing_chat() {
        let store = temp_store();
        let user = store.create_user("pm@example.com", None, "h").unwrap();
        assert!(store.append_message(999, user.id, "orphan", true).is_err());
    }

    #[test]
    fn test_append_message_rolls_back_when_chat_update_fails() {
        let store = temp_store();
        let user = store.create_user("pm@example.com", None, "h").unwrap();
        let chat = store.create_chat(user.id, "Backlog", None).unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER block_chat_update BEFORE UPDATE ON chats
                 BEGIN SELECT RAISE(ABORT, 'chat updates blocked'); END;",
            )
            .unwrap();

        assert!(store.append_message(chat.id, user.id, "Add a logout button", true).is_err());
        assert!(store.list_messages(chat.id).unwrap().is_empty());

        store.conn.execute_batch("DROP TRIGGER block_chat_update;").unwrap();
        store.append_message(chat.id, user.id, "Add a logout button", true).unwrap();
        assert_eq!(store.list_messages(chat.id).unwrap().len(), 1);
    }

    #[test]
    fn test_on_disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storycrafter.db");

        {
            let store = StoryStore::open(&path).unwrap();
            store.create_user("pm@example.com", None, "h").unwrap();
        }

        let store = StoryStore::open(&path).unwrap();
        assert!(store.find_user_by_email("pm@example.com").unwrap().is_some());
        assert_eq!(store.stats().unwrap()["users"], 1);
    }
}

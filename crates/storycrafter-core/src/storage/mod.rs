//! Persistent Storage Layer: SQLite WAL
//!
//! Stores the record hierarchy behind the service:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     StoryStore                       │
//! ├──────────────────────────────────────────────────────┤
//! │  users  →  projects  →  chats  →  chat_messages      │
//! │                          (project optional)          │
//! └──────────────────────────────────────────────────────┘
//!         ↓ WAL mode: concurrent reads, serialized writes
//! ```
//!
//! A generated artifact bundle is stored as the text of one bot message.
//!
//! ```no_run
//! use storycrafter_core::storage::StoryStore;
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = StoryStore::open("storycrafter.db")?;
//! let user = store.create_user("pm@example.com", None, "$argon2id$...")?;
//! let chat = store.create_chat(user.id, "Backlog", None)?;
//! store.append_message(chat.id, user.id, "Add a logout button", true)?;
//! # Ok(())
//! # }
//! ```

pub mod store;

pub use store::{Chat, ChatMessage, NewProject, Project, StoryStore, User};

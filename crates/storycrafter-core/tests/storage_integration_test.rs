//! Storage round trips through a real on-disk database.

use storycrafter_core::storage::{NewProject, StoryStore};
use storycrafter_core::{ArtifactBundle, ArtifactKind};
use tempfile::TempDir;

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("storycrafter.db");

    let (user_id, chat_id) = {
        let store = StoryStore::open(&db_path).unwrap();
        let user = store.create_user("pm@example.com", Some("Pat"), "$argon2id$v=19$hash").unwrap();
        let project = store
            .create_project(
                user.id,
                &NewProject {
                    name: "Dashboard".to_string(),
                    overview: "Account area".to_string(),
                    project_type: "web".to_string(),
                    industry: "saas".to_string(),
                },
            )
            .unwrap();
        let chat = store.create_chat(user.id, "Logout", Some(project.id)).unwrap();
        (user.id, chat.id)
    };

    let store = StoryStore::open(&db_path).unwrap();
    let chat = store.get_chat(user_id, chat_id).unwrap().unwrap();
    assert_eq!(chat.title, "Logout");
    assert!(chat.project_id.is_some());

    let stats = store.stats().unwrap();
    assert_eq!(stats["users"], 1);
    assert_eq!(stats["chats"], 1);
}

#[test]
fn test_bot_message_carries_bundle_json() {
    let store = StoryStore::open_in_memory().unwrap();
    let user = store.create_user("pm@example.com", None, "h").unwrap();
    let chat = store.create_chat(user.id, "Backlog", None).unwrap();

    let mut bundle = ArtifactBundle::new();
    bundle.set(ArtifactKind::Story, "User Story:\nAs a user, I want to log out so that I can leave.");

    store.append_message(chat.id, user.id, "Add a logout button", true).unwrap();
    store
        .append_message(chat.id, user.id, &bundle.to_message_text().unwrap(), false)
        .unwrap();

    let messages = store.list_messages(chat.id).unwrap();
    let stored = ArtifactBundle::from_message_text(&messages[1].message).unwrap();
    assert_eq!(stored, bundle);
    assert!(stored.description.is_none());
}

#[test]
fn test_other_users_cannot_see_chats() {
    let store = StoryStore::open_in_memory().unwrap();
    let owner = store.create_user("owner@example.com", None, "h").unwrap();
    let other = store.create_user("other@example.com", None, "h").unwrap();
    let chat = store.create_chat(owner.id, "Private", None).unwrap();

    assert!(store.get_chat(other.id, chat.id).unwrap().is_none());
    assert!(store.list_chats(other.id, None).unwrap().is_empty());
}

use super::*;
use eko_core::language::Language;
use eko_core::models::{NewMessage, NewUser, Onboarding, Sender, UserKind, UserStatus};

const IMAGE: &str = "https://example.com/placeholder.webp";

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    let config = MemoryConfig {
        db_path: IN_MEMORY.to_string(),
        ..Default::default()
    };
    Store::new(&config).await.unwrap()
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        uid: Some(format!("uid-{email}")),
        email: email.to_string(),
        provider: "password".to_string(),
        image: IMAGE.to_string(),
        kind: UserKind::User,
    }
}

fn user_message(chat_id: &str, user_id: &str, text: &str) -> NewMessage {
    NewMessage {
        chat_id: chat_id.to_string(),
        user_id: user_id.to_string(),
        sender: Sender::User,
        text: text.to_string(),
        pictures: vec![],
        voices: vec![],
    }
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let store = test_store().await;
    Store::run_migrations(store.pool()).await.unwrap();
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_file_store_persists_across_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let config = MemoryConfig {
        db_path: tmp.path().join("data/eko.db").to_string_lossy().into_owned(),
        ..Default::default()
    };
    assert!(!Store::exists(&config));
    assert!(!tmp.path().join("data").exists());

    let store = Store::new(&config).await.unwrap();
    assert!(Store::exists(&config));
    let user = store.create_user(&new_user("ada@example.com")).await.unwrap();
    assert!(store.db_size().await.unwrap() > 0);
    store.pool().close().await;

    let reopened = Store::new(&config).await.unwrap();
    let found = reopened.find_user(&user.id).await.unwrap().unwrap();
    assert_eq!(found.email, "ada@example.com");
}

#[test]
fn test_in_memory_store_never_exists() {
    let config = MemoryConfig {
        db_path: IN_MEMORY.to_string(),
        ..Default::default()
    };
    assert!(!Store::exists(&config));
}

#[tokio::test]
async fn test_create_and_find_user() {
    let store = test_store().await;
    let user = store.create_user(&new_user("ada@example.com")).await.unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.name, "");
    assert_eq!(user.status, UserStatus::Active);
    assert!(user.welcome);
    assert!(!user.is_deleted);
    assert!(!user.profile_completed);
    assert_eq!(user.image, IMAGE);
    assert!(user.language.is_none());

    let by_id = store.find_user(&user.id).await.unwrap().unwrap();
    assert_eq!(by_id, user);
    let by_email = store
        .find_user_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);
    assert!(store.find_user("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let store = test_store().await;
    store.create_user(&new_user("ada@example.com")).await.unwrap();
    assert!(store.create_user(&new_user("ada@example.com")).await.is_err());
}

#[tokio::test]
async fn test_profile_updates() {
    let store = test_store().await;
    let user = store.create_user(&new_user("bo@example.com")).await.unwrap();

    let renamed = store.update_user_name(&user.id, "Bo").await.unwrap().unwrap();
    assert_eq!(renamed.name, "Bo");

    let imaged = store
        .update_user_image(&user.id, "https://example.com/bo.png")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(imaged.image, "https://example.com/bo.png");

    let welcomed = store.finish_welcome(&user.id).await.unwrap().unwrap();
    assert!(!welcomed.welcome);

    let tokened = store
        .update_notification_token(&user.id, "fcm-123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tokened.notification_token, "fcm-123");

    let french = store
        .update_language(&user.id, Language::French)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(french.language, Some(Language::French));

    assert!(store.update_user_name("missing", "x").await.unwrap().is_none());
}

#[tokio::test]
async fn test_onboarding_marks_profile_complete() {
    let store = test_store().await;
    let user = store.create_user(&new_user("cy@example.com")).await.unwrap();
    let answers = Onboarding {
        name: "Cy".to_string(),
        age: 29,
        gender: Some("other".to_string()),
        language: Language::French,
        purpose: None,
    };
    let updated = store
        .complete_onboarding(&user.id, &answers)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Cy");
    assert_eq!(updated.age, Some(29));
    assert_eq!(updated.gender.as_deref(), Some("other"));
    assert_eq!(updated.language, Some(Language::French));
    assert!(updated.purpose.is_none());
    assert!(updated.profile_completed);
}

#[tokio::test]
async fn test_soft_delete_user_anonymizes_once() {
    let store = test_store().await;
    let user = store.create_user(&new_user("di@example.com")).await.unwrap();
    store.update_notification_token(&user.id, "tok").await.unwrap();
    store.update_user_image(&user.id, "https://example.com/di.png").await.unwrap();

    assert!(store.soft_delete_user(&user.id, IMAGE).await.unwrap());
    assert!(!store.soft_delete_user(&user.id, IMAGE).await.unwrap());

    let deleted = store.find_user(&user.id).await.unwrap().unwrap();
    assert!(deleted.is_deleted);
    assert_eq!(deleted.status, UserStatus::Deleted);
    assert!(deleted.name.starts_with("deleted_user_"));
    assert_eq!(deleted.name.len(), "deleted_user_".len() + 8);
    assert!(deleted.email.ends_with("@deleted.local"));
    assert_eq!(deleted.image, IMAGE);
    assert_eq!(deleted.notification_token, "");
    assert!(deleted.deleted_at.is_some());

    // The old email is free again.
    assert!(store.find_user_by_email("di@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_chat_ownership_and_soft_delete() {
    let store = test_store().await;
    let owner = store.create_user(&new_user("ed@example.com")).await.unwrap();
    let other = store.create_user(&new_user("fa@example.com")).await.unwrap();

    let chat = store
        .create_chat(&owner.id, "Fresh Start", "first talk", false)
        .await
        .unwrap();
    assert_eq!(chat.message_count, 0);

    assert!(store.find_chat(&owner.id, &chat.id).await.unwrap().is_some());
    assert!(store.find_chat(&other.id, &chat.id).await.unwrap().is_none());

    assert!(store
        .soft_delete_chat(&other.id, &chat.id)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .soft_delete_chat(&owner.id, &chat.id)
        .await
        .unwrap()
        .is_some());
    assert!(store.find_chat(&owner.id, &chat.id).await.unwrap().is_none());
    assert!(store
        .soft_delete_chat(&owner.id, &chat.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_saved_chats_order_and_limit() {
    let store = test_store().await;
    let user = store.create_user(&new_user("gu@example.com")).await.unwrap();

    let first = store.create_chat(&user.id, "one", "", false).await.unwrap();
    let second = store.create_chat(&user.id, "two", "", false).await.unwrap();
    let third = store.create_chat(&user.id, "three", "", true).await.unwrap();

    // Activity in the first chat moves it to the top.
    let later = chrono::Utc::now() + chrono::Duration::minutes(5);
    store.touch_chat(&first.id, &later, 2).await.unwrap();

    let saved = store.saved_chats(&user.id, 100).await.unwrap();
    let ids: Vec<&str> = saved.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), third.id.as_str(), second.id.as_str()]);
    assert_eq!(saved[0].message_count, 2);

    let capped = store.saved_chats(&user.id, 2).await.unwrap();
    assert_eq!(capped.len(), 2);

    let (deleted, _) = store.soft_delete_all_chats(&user.id).await.unwrap();
    assert_eq!(deleted, 3);
    assert!(store.saved_chats(&user.id, 100).await.unwrap().is_empty());
    let (again, _) = store.soft_delete_all_chats(&user.id).await.unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_messages_recent_and_paged() {
    let store = test_store().await;
    let user = store.create_user(&new_user("ha@example.com")).await.unwrap();
    let chat = store.create_chat(&user.id, "t", "", false).await.unwrap();

    for i in 0..5 {
        store
            .insert_message(&user_message(&chat.id, &user.id, &format!("m{i}")))
            .await
            .unwrap();
    }

    let recent = store.recent_messages(&chat.id, 3).await.unwrap();
    let texts: Vec<&str> = recent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["m2", "m3", "m4"]);

    let page1 = store.conversation_page(&chat.id, 1, 2).await.unwrap();
    assert_eq!(page1.total, 5);
    let texts: Vec<&str> = page1.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["m4", "m3"]);

    let page3 = store.conversation_page(&chat.id, 3, 2).await.unwrap();
    assert_eq!(page3.messages.len(), 1);
    assert_eq!(page3.messages[0].text, "m0");

    let page9 = store.conversation_page(&chat.id, 9, 2).await.unwrap();
    assert!(page9.messages.is_empty());
    assert_eq!(page9.total, 5);

    let overflow = store.conversation_page(&chat.id, i64::MAX, 20).await.unwrap();
    assert!(overflow.messages.is_empty());
    assert_eq!(overflow.total, 5);
}

#[tokio::test]
async fn test_message_media_round_trip() {
    let store = test_store().await;
    let user = store.create_user(&new_user("io@example.com")).await.unwrap();
    let chat = store.create_chat(&user.id, "t", "", false).await.unwrap();

    let mut new = user_message(&chat.id, &user.id, "look");
    new.pictures = vec!["https://example.com/a.png".to_string()];
    new.voices = vec!["https://example.com/a.ogg".to_string()];
    let stored = store.insert_message(&new).await.unwrap();

    let found = store.find_message(&user.id, &stored.id).await.unwrap().unwrap();
    assert_eq!(found, stored);
    assert_eq!(found.pictures, new.pictures);
}

#[tokio::test]
async fn test_update_and_delete_message_ownership() {
    let store = test_store().await;
    let owner = store.create_user(&new_user("jo@example.com")).await.unwrap();
    let other = store.create_user(&new_user("ka@example.com")).await.unwrap();
    let chat = store.create_chat(&owner.id, "t", "", false).await.unwrap();
    let msg = store
        .insert_message(&user_message(&chat.id, &owner.id, "draft"))
        .await
        .unwrap();

    assert!(store
        .update_message(&other.id, &msg.id, "hijack", &[], &[])
        .await
        .unwrap()
        .is_none());

    let updated = store
        .update_message(&owner.id, &msg.id, "final", &["p".to_string()], &[])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.text, "final");
    assert_eq!(updated.pictures, vec!["p"]);

    assert!(store
        .soft_delete_message(&other.id, &msg.id)
        .await
        .unwrap()
        .is_none());
    let deleted = store
        .soft_delete_message(&owner.id, &msg.id)
        .await
        .unwrap()
        .unwrap();
    assert!(deleted.is_deleted);
    assert!(store.find_message(&owner.id, &msg.id).await.unwrap().is_none());
    assert!(store.recent_messages(&chat.id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_count_live_rows() {
    let store = test_store().await;
    let user = store.create_user(&new_user("lu@example.com")).await.unwrap();
    let gone = store.create_user(&new_user("mo@example.com")).await.unwrap();
    store.soft_delete_user(&gone.id, IMAGE).await.unwrap();
    let chat = store.create_chat(&user.id, "t", "", false).await.unwrap();
    store
        .insert_message(&user_message(&chat.id, &user.id, "hi"))
        .await
        .unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(
        stats,
        StoreStats {
            users: 1,
            chats: 1,
            messages: 1
        }
    );
    assert!(store.db_size().await.unwrap() > 0);
}

#[test]
fn test_timestamps_sort_as_text() {
    let early = chrono::DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let late = early + chrono::Duration::microseconds(1);
    assert!(format_ts(&early) < format_ts(&late));
    assert_eq!(format_ts(&early), "2026-01-02T03:04:05.000000Z");
    assert_eq!(parse_ts(&format_ts(&late)).unwrap(), late);
}

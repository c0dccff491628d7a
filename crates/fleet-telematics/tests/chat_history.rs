use fleet_telematics::chat::{
    ChatHistory, ChatRole, ChatSession, ChatStoreError, FileStore, KeyValueStore,
    CONVERSATIONS_KEY,
};
use fleet_telematics::fleet::sample;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn scratch_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("fleet-chat-{label}-{}-{nanos}", std::process::id()))
}

#[tokio::test(start_paused = true)]
async fn transcripts_survive_a_restart_through_the_file_store() {
    let dir = scratch_dir("restart");
    let snapshot = Arc::new(sample::snapshot());

    let history = ChatHistory::load(Box::new(FileStore::new(&dir))).expect("empty store loads");
    let chat = ChatSession::new(history, Arc::clone(&snapshot), Duration::from_millis(800));
    let ticket = chat
        .send("Which vehicles have poor fuel efficiency?")
        .await
        .expect("send");
    let conversation_id = ticket.conversation_id;
    let reply = ticket.reply().await.expect("reply");
    assert!(reply.content.starts_with("📈 **Fuel Efficiency Analysis:**"));

    let reloaded =
        ChatHistory::load(Box::new(FileStore::new(&dir))).expect("persisted store loads");
    let conversation = reloaded.active().expect("conversation restored");
    assert_eq!(conversation.id, conversation_id);
    assert_eq!(conversation.title, "Chat 1");
    let roles: Vec<ChatRole> = conversation
        .messages
        .iter()
        .map(|message| message.role)
        .collect();
    assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test(start_paused = true)]
async fn replies_land_in_the_conversation_they_were_sent_from() {
    let dir = scratch_dir("routing");
    let history = ChatHistory::load(Box::new(FileStore::new(&dir))).expect("store loads");
    let chat = ChatSession::new(history, Arc::new(sample::snapshot()), Duration::from_millis(800));

    let first = chat.send("show idle vehicles").await.expect("send");
    let second_conversation = chat.start_conversation().await.expect("start");
    let second = chat.send("help").await.expect("send");
    assert_eq!(second.conversation_id, second_conversation.id);
    assert_ne!(first.conversation_id, second.conversation_id);

    let first_id = first.conversation_id;
    first.reply().await.expect("first reply");
    second.reply().await.expect("second reply");

    let earlier = chat.conversation(first_id).await.expect("first conversation");
    assert_eq!(earlier.messages.len(), 2);
    assert!(earlier.messages[1]
        .content
        .starts_with("⏸️ **Idle Time Analysis:**"));
    let titles: Vec<String> = chat
        .conversations()
        .await
        .into_iter()
        .map(|conversation| conversation.title)
        .collect();
    assert_eq!(titles, vec!["Chat 2".to_string(), "Chat 1".to_string()]);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn corrupt_store_contents_are_reported() {
    let dir = scratch_dir("corrupt");
    let store = FileStore::new(&dir);
    store
        .set(CONVERSATIONS_KEY, "[{\"id\": \"oops\"}]")
        .expect("write raw value");

    let err = ChatHistory::load(Box::new(store)).expect_err("malformed history");
    assert!(matches!(err, ChatStoreError::Malformed(_)));
    let _ = std::fs::remove_dir_all(dir);
}

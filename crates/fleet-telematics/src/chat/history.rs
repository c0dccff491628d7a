use chrono::{DateTime, Utc};

use super::store::KeyValueStore;
use super::{ChatConversation, ChatMessage, ChatRole, ChatStoreError};

/// Store key holding the serialized conversation list.
pub const CONVERSATIONS_KEY: &str = "fleet_chatbot_conversations";

/// Conversation list backed by a [`KeyValueStore`]. Newest conversations come first.
#[derive(Debug)]
pub struct ChatHistory {
    store: Box<dyn KeyValueStore>,
    conversations: Vec<ChatConversation>,
    active: Option<u64>,
    last_id: u64,
}

impl ChatHistory {
    /// Reads the stored list. Missing or blank values load as an empty history; the first
    /// stored conversation becomes active.
    pub fn load(store: Box<dyn KeyValueStore>) -> Result<Self, ChatStoreError> {
        let conversations: Vec<ChatConversation> = match store.get(CONVERSATIONS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)?,
            _ => Vec::new(),
        };

        let last_id = conversations
            .iter()
            .flat_map(|conversation| {
                std::iter::once(conversation.id)
                    .chain(conversation.messages.iter().map(|message| message.id))
            })
            .max()
            .unwrap_or_default();
        let active = conversations.first().map(|conversation| conversation.id);

        tracing::debug!(conversations = conversations.len(), "chat history loaded");
        Ok(Self {
            store,
            conversations,
            active,
            last_id,
        })
    }

    pub fn conversations(&self) -> &[ChatConversation] {
        &self.conversations
    }

    pub fn conversation(&self, id: u64) -> Option<&ChatConversation> {
        self.conversations
            .iter()
            .find(|conversation| conversation.id == id)
    }

    pub fn active_id(&self) -> Option<u64> {
        self.active
    }

    pub fn active(&self) -> Option<&ChatConversation> {
        self.active.and_then(|id| self.conversation(id))
    }

    /// Prepends a new `Chat N` conversation and makes it active.
    pub fn start_conversation(&mut self) -> Result<&ChatConversation, ChatStoreError> {
        let now = Utc::now();
        let id = self.next_id(now);
        let conversation = ChatConversation {
            id,
            title: format!("Chat {}", self.conversations.len() + 1),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let previous_active = self.active;
        self.conversations.insert(0, conversation);
        self.active = Some(id);
        if let Err(err) = self.persist() {
            self.conversations.remove(0);
            self.active = previous_active;
            return Err(err);
        }
        tracing::info!(conversation = id, "chat conversation started");
        Ok(&self.conversations[0])
    }

    pub fn switch(&mut self, id: u64) -> Result<&ChatConversation, ChatStoreError> {
        let index = self.index_of(id)?;
        self.active = Some(id);
        Ok(&self.conversations[index])
    }

    /// Removes a conversation. Deleting the active one falls back to the first remaining.
    pub fn delete(&mut self, id: u64) -> Result<ChatConversation, ChatStoreError> {
        let index = self.index_of(id)?;
        let previous_active = self.active;
        let removed = self.conversations.remove(index);
        if self.active == Some(id) {
            self.active = self.conversations.first().map(|conversation| conversation.id);
        }
        if let Err(err) = self.persist() {
            self.conversations.insert(index, removed);
            self.active = previous_active;
            return Err(err);
        }
        tracing::info!(
            conversation = id,
            remaining = self.conversations.len(),
            "chat conversation deleted"
        );
        Ok(removed)
    }

    /// Appends a message to `conversation_id` and bumps its `updated_at`.
    pub fn append(
        &mut self,
        conversation_id: u64,
        role: ChatRole,
        content: impl Into<String>,
    ) -> Result<ChatMessage, ChatStoreError> {
        let index = self.index_of(conversation_id)?;
        let now = Utc::now();
        let message = ChatMessage {
            id: self.next_id(now),
            role,
            content: content.into(),
            timestamp: now,
        };

        let conversation = &mut self.conversations[index];
        let previous_update = conversation.updated_at;
        conversation.messages.push(message.clone());
        conversation.updated_at = now;
        if let Err(err) = self.persist() {
            let conversation = &mut self.conversations[index];
            conversation.messages.pop();
            conversation.updated_at = previous_update;
            return Err(err);
        }
        Ok(message)
    }

    /// Returns the active conversation id, starting a conversation when none is active.
    pub fn ensure_active(&mut self) -> Result<u64, ChatStoreError> {
        match self.active {
            Some(id) => Ok(id),
            None => Ok(self.start_conversation()?.id),
        }
    }

    /// Rewrites the full list under [`CONVERSATIONS_KEY`].
    pub fn persist(&self) -> Result<(), ChatStoreError> {
        let serialized = serde_json::to_string(&self.conversations)?;
        self.store.set(CONVERSATIONS_KEY, &serialized)
    }

    fn index_of(&self, id: u64) -> Result<usize, ChatStoreError> {
        self.conversations
            .iter()
            .position(|conversation| conversation.id == id)
            .ok_or(ChatStoreError::UnknownConversation(id))
    }

    // Millisecond timestamps, nudged forward so ids never repeat within a process.
    fn next_id(&mut self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        self.last_id = millis.max(self.last_id + 1);
        self.last_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::InMemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn history_with(store: &InMemoryStore) -> ChatHistory {
        ChatHistory::load(Box::new(store.clone())).expect("load history")
    }

    #[test]
    fn missing_or_blank_storage_loads_empty() {
        let store = InMemoryStore::new();
        assert!(history_with(&store).conversations().is_empty());

        store.set(CONVERSATIONS_KEY, "   ").expect("set");
        let history = history_with(&store);
        assert!(history.conversations().is_empty());
        assert_eq!(history.active_id(), None);
    }

    #[test]
    fn malformed_storage_is_an_error() {
        let store = InMemoryStore::new();
        store.set(CONVERSATIONS_KEY, "{not json").expect("set");
        let err = ChatHistory::load(Box::new(store)).expect_err("malformed");
        assert!(matches!(err, ChatStoreError::Malformed(_)));
    }

    #[test]
    fn new_conversations_are_prepended_and_titled_by_count() {
        let store = InMemoryStore::new();
        let mut history = history_with(&store);
        let first = history.start_conversation().expect("start").id;
        let second = history.start_conversation().expect("start").id;

        assert!(second > first);
        let titles: Vec<&str> = history
            .conversations()
            .iter()
            .map(|conversation| conversation.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Chat 2", "Chat 1"]);
        assert_eq!(history.active_id(), Some(second));
    }

    #[test]
    fn deleting_active_falls_back_to_first_remaining() {
        let store = InMemoryStore::new();
        let mut history = history_with(&store);
        let first = history.start_conversation().expect("start").id;
        let second = history.start_conversation().expect("start").id;
        history.switch(first).expect("switch");

        history.delete(first).expect("delete");
        assert_eq!(history.active_id(), Some(second));

        history.delete(second).expect("delete");
        assert_eq!(history.active_id(), None);
        assert_eq!(
            store.get(CONVERSATIONS_KEY).expect("get").as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn append_bumps_updated_at_and_survives_reload() {
        let store = InMemoryStore::new();
        let mut history = history_with(&store);
        let id = history.start_conversation().expect("start").id;
        let created = history.active().expect("active").created_at;

        let message = history
            .append(id, ChatRole::User, "Show me idle vehicles")
            .expect("append");
        let conversation = history.active().expect("active");
        assert!(conversation.updated_at >= created);
        assert_eq!(conversation.last_message(), Some(&message));

        let reloaded = history_with(&store);
        assert_eq!(reloaded.active_id(), Some(id));
        assert_eq!(reloaded.conversations(), history.conversations());
    }

    /// Accepts writes until `fail` is flipped, then reports the store as unavailable.
    #[derive(Debug, Clone, Default)]
    struct SwitchableStore {
        inner: InMemoryStore,
        fail: Arc<AtomicBool>,
    }

    impl KeyValueStore for SwitchableStore {
        fn get(&self, key: &str) -> Result<Option<String>, ChatStoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), ChatStoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ChatStoreError::Unavailable("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn failed_writes_leave_memory_matching_the_store() {
        let store = SwitchableStore::default();
        let mut history = ChatHistory::load(Box::new(store.clone())).expect("load history");
        let kept = history.start_conversation().expect("start").id;
        history
            .append(kept, ChatRole::User, "help")
            .expect("append");
        let persisted = store.get(CONVERSATIONS_KEY).expect("get");

        store.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            history.start_conversation(),
            Err(ChatStoreError::Unavailable(_))
        ));
        assert_eq!(history.conversations().len(), 1);
        assert_eq!(history.active_id(), Some(kept));

        let before = history.active().cloned().expect("active");
        assert!(history.append(kept, ChatRole::User, "show idle vehicles").is_err());
        assert_eq!(history.active(), Some(&before));

        assert!(history.delete(kept).is_err());
        assert_eq!(history.active_id(), Some(kept));
        assert_eq!(history.conversations(), std::slice::from_ref(&before));

        let serialized = serde_json::to_string(history.conversations()).expect("serialize");
        assert_eq!(persisted.as_deref(), Some(serialized.as_str()));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let store = InMemoryStore::new();
        let mut history = history_with(&store);
        assert!(matches!(
            history.switch(42),
            Err(ChatStoreError::UnknownConversation(42))
        ));
        assert!(matches!(
            history.append(42, ChatRole::User, "hi"),
            Err(ChatStoreError::UnknownConversation(42))
        ));
    }
}

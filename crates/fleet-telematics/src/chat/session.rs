use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::Instant;

use super::history::ChatHistory;
use super::{ChatConversation, ChatMessage, ChatRole, ChatStoreError};
use crate::assistant::FleetAssistant;
use crate::fleet::FleetSnapshot;

/// Pause before the assistant answers a message.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(800);

type ReplyResult = Result<ChatMessage, ChatStoreError>;

#[derive(Debug)]
struct PendingReply {
    conversation_id: u64,
    question: String,
    enqueued_at: Instant,
    respond_to: oneshot::Sender<ReplyResult>,
}

/// Handle for an assistant reply that has been queued but not yet written.
#[derive(Debug)]
pub struct ReplyTicket {
    pub conversation_id: u64,
    pub message: ChatMessage,
    receiver: oneshot::Receiver<ReplyResult>,
}

impl ReplyTicket {
    /// Waits for the assistant message to be appended to the conversation.
    pub async fn reply(self) -> ReplyResult {
        self.receiver
            .await
            .map_err(|_| ChatStoreError::Unavailable("reply worker stopped".to_string()))?
    }
}

/// Chat front end shared by the HTTP service and the REPL.
///
/// User messages are written immediately. Replies go through a single worker that drains a
/// FIFO queue, so overlapping sends resolve in the order they were made, each no earlier than
/// the configured delay after its own send.
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: Arc<Mutex<ChatHistory>>,
    queue: mpsc::UnboundedSender<PendingReply>,
}

impl ChatSession {
    /// Spawns the reply worker; must be called inside a tokio runtime.
    pub fn new(history: ChatHistory, snapshot: Arc<FleetSnapshot>, delay: Duration) -> Self {
        let history = Arc::new(Mutex::new(history));
        let (queue, pending) = mpsc::unbounded_channel();
        tokio::spawn(reply_worker(pending, Arc::clone(&history), snapshot, delay));
        Self { history, queue }
    }

    pub async fn conversations(&self) -> Vec<ChatConversation> {
        self.history.lock().await.conversations().to_vec()
    }

    pub async fn conversation(&self, id: u64) -> Option<ChatConversation> {
        self.history.lock().await.conversation(id).cloned()
    }

    pub async fn active(&self) -> Option<ChatConversation> {
        self.history.lock().await.active().cloned()
    }

    pub async fn start_conversation(&self) -> Result<ChatConversation, ChatStoreError> {
        let mut history = self.history.lock().await;
        history.start_conversation().cloned()
    }

    pub async fn switch(&self, id: u64) -> Result<ChatConversation, ChatStoreError> {
        let mut history = self.history.lock().await;
        history.switch(id).cloned()
    }

    pub async fn delete(&self, id: u64) -> Result<ChatConversation, ChatStoreError> {
        self.history.lock().await.delete(id)
    }

    /// Sends to the active conversation, starting one when none is active.
    pub async fn send(&self, input: &str) -> Result<ReplyTicket, ChatStoreError> {
        let question = normalize(input)?;
        let mut history = self.history.lock().await;
        let conversation_id = history.ensure_active()?;
        self.enqueue(&mut history, conversation_id, question)
    }

    /// Sends to a specific conversation without changing which one is active.
    pub async fn send_to(
        &self,
        conversation_id: u64,
        input: &str,
    ) -> Result<ReplyTicket, ChatStoreError> {
        let question = normalize(input)?;
        let mut history = self.history.lock().await;
        self.enqueue(&mut history, conversation_id, question)
    }

    fn enqueue(
        &self,
        history: &mut ChatHistory,
        conversation_id: u64,
        question: String,
    ) -> Result<ReplyTicket, ChatStoreError> {
        let message = history.append(conversation_id, ChatRole::User, question.clone())?;
        let (respond_to, receiver) = oneshot::channel();
        self.queue
            .send(PendingReply {
                conversation_id,
                question,
                enqueued_at: Instant::now(),
                respond_to,
            })
            .map_err(|_| ChatStoreError::Unavailable("reply worker stopped".to_string()))?;

        Ok(ReplyTicket {
            conversation_id,
            message,
            receiver,
        })
    }
}

fn normalize(input: &str) -> Result<String, ChatStoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ChatStoreError::EmptyMessage);
    }
    Ok(trimmed.to_string())
}

async fn reply_worker(
    mut pending: mpsc::UnboundedReceiver<PendingReply>,
    history: Arc<Mutex<ChatHistory>>,
    snapshot: Arc<FleetSnapshot>,
    delay: Duration,
) {
    let assistant = FleetAssistant;
    while let Some(request) = pending.recv().await {
        tokio::time::sleep_until(request.enqueued_at + delay).await;

        let answer = assistant.respond(&request.question, &snapshot.metrics, &snapshot.vehicles);
        let result = history
            .lock()
            .await
            .append(request.conversation_id, ChatRole::Assistant, answer);
        if let Err(err) = &result {
            tracing::warn!(
                conversation = request.conversation_id,
                error = %err,
                "dropping assistant reply"
            );
        }
        // The caller may have stopped waiting; the reply is already persisted.
        let _ = request.respond_to.send(result);
    }
    tracing::debug!("chat reply worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::InMemoryStore;
    use crate::fleet::sample;

    fn session(store: &InMemoryStore) -> ChatSession {
        let history = ChatHistory::load(Box::new(store.clone())).expect("load history");
        ChatSession::new(history, Arc::new(sample::snapshot()), DEFAULT_REPLY_DELAY)
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_rejected_without_side_effects() {
        let store = InMemoryStore::new();
        let chat = session(&store);
        assert!(matches!(
            chat.send("   \n").await,
            Err(ChatStoreError::EmptyMessage)
        ));
        assert!(chat.conversations().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn send_creates_a_conversation_and_replies_after_delay() {
        let store = InMemoryStore::new();
        let chat = session(&store);
        let started = Instant::now();

        let ticket = chat.send("  Show me idle vehicles  ").await.expect("send");
        assert_eq!(ticket.message.content, "Show me idle vehicles");
        assert_eq!(ticket.message.role, ChatRole::User);
        let conversation_id = ticket.conversation_id;

        let pending = chat.conversation(conversation_id).await.expect("conversation");
        assert_eq!(pending.title, "Chat 1");
        assert_eq!(pending.messages.len(), 1);

        let reply = ticket.reply().await.expect("reply");
        assert!(started.elapsed() >= DEFAULT_REPLY_DELAY);
        assert_eq!(reply.role, ChatRole::Assistant);
        assert!(reply.content.starts_with("⏸️ **Idle Time Analysis:**"));

        let stored = chat.conversation(conversation_id).await.expect("conversation");
        assert_eq!(stored.messages.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_sends_resolve_in_fire_order() {
        let store = InMemoryStore::new();
        let chat = session(&store);

        let first = chat.send("any faults?").await.expect("send");
        let second = chat.send("help").await.expect("send");
        let conversation_id = first.conversation_id;

        let second_reply = second.reply().await.expect("reply");
        let first_reply = first.reply().await.expect("reply");
        assert!(first_reply.id < second_reply.id);

        let conversation = chat.conversation(conversation_id).await.expect("conversation");
        let roles: Vec<ChatRole> = conversation
            .messages
            .iter()
            .map(|message| message.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::User,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::Assistant
            ]
        );
        assert_eq!(conversation.messages[2], first_reply);
        assert_eq!(conversation.messages[3], second_reply);
    }

    #[tokio::test(start_paused = true)]
    async fn replies_to_deleted_conversations_are_dropped() {
        let store = InMemoryStore::new();
        let chat = session(&store);

        let ticket = chat.send("fleet overview").await.expect("send");
        chat.delete(ticket.conversation_id).await.expect("delete");

        assert!(matches!(
            ticket.reply().await,
            Err(ChatStoreError::UnknownConversation(_))
        ));
        assert!(chat.conversations().await.is_empty());
    }
}

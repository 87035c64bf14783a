//! Chat responder grounded in stored content
//!
//! Answers a running conversation using the stored content records as
//! context. Each turn persists the incoming user message and the assistant
//! reply to the owning session; the assistant slot is always written, even
//! when the reply is a fallback string, so a session never ends on a
//! dangling user turn.

use crate::error::{Error, Result};
use crate::llm::{ChatCompletionRequest, ChatMessage, Client, Role};
use crate::store::{Database, StoredMessage};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Returned when no completion client is configured
pub const NOT_INITIALIZED: &str =
    "I'm sorry, I can't answer questions right now because no API key is configured.";

/// Returned when the completion request fails
pub const FAILED: &str = "Unable to retrieve the specific information at this time.";

/// Default model for chat responses
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are an assistant for this website. Answer using the provided \
context. Provide exact information from the context. If the requested information is not in \
the context, say 'Specific information not found'.";

/// One completed chat turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// The assistant's reply text
    pub message: String,

    /// Always `assistant`
    pub role: Role,

    /// The session this turn was recorded under
    pub session_id: String,

    /// Full ordered message history of the session, including this turn
    pub history: Vec<StoredMessage>,
}

/// Chat responder backed by the content store and an optional client
#[derive(Clone)]
pub struct ChatResponder {
    client: Option<Client>,
    db: Database,
    model: String,
}

impl ChatResponder {
    /// Create a new responder
    pub fn new(client: Option<Client>, db: Database) -> Self {
        Self {
            client,
            db,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a responder with a specific model
    pub fn with_model(client: Option<Client>, db: Database, model: impl Into<String>) -> Self {
        Self {
            client,
            db,
            model: model.into(),
        }
    }

    /// Answer one chat turn
    ///
    /// Resolves (or creates) the session, persists the last incoming user
    /// message, issues a grounded completion, persists the assistant reply,
    /// and returns the reply with the session's full history. Completion
    /// failures degrade to fixed strings; store failures propagate.
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn respond(
        &self,
        messages: &[ChatMessage],
        session_id: Option<&str>,
    ) -> Result<ChatReply> {
        let last = messages
            .last()
            .ok_or_else(|| Error::Chat("No messages provided".to_string()))?;

        let session_id = self.resolve_session(session_id).await?;
        let context = self.build_context().await?;

        self.db
            .append_message(&session_id, Role::User, &last.content)
            .await?;

        let reply = self.generate_reply(messages, &context).await;

        self.db
            .append_message(&session_id, Role::Assistant, &reply)
            .await?;

        let history = self.db.session_messages(&session_id).await?;

        Ok(ChatReply {
            message: reply,
            role: Role::Assistant,
            session_id,
            history,
        })
    }

    /// Use the given session if it exists, otherwise create a new one
    async fn resolve_session(&self, session_id: Option<&str>) -> Result<String> {
        if let Some(id) = session_id {
            if self.db.get_session(id).await?.is_some() {
                return Ok(id.to_string());
            }
            debug!("Session {} not found, creating a new one", id);
        }

        let session = self.db.create_session().await?;
        Ok(session.id)
    }

    /// Produce the assistant reply text, never erroring
    async fn generate_reply(&self, messages: &[ChatMessage], context: &str) -> String {
        let client = match &self.client {
            Some(client) => client,
            None => return NOT_INITIALIZED.to_string(),
        };

        let system = format!("{}\n\nContext:\n{}", SYSTEM_PROMPT, context);
        let mut request_messages = Vec::with_capacity(messages.len() + 1);
        request_messages.push(ChatMessage::system(system));
        request_messages.extend(messages.iter().cloned());

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: request_messages,
            temperature: Some(0.3),
            max_tokens: Some(500),
        };

        match client.complete(&request).await {
            Ok(response) => response.text(),
            Err(e) => {
                warn!("Chat completion failed: {}", e);
                FAILED.to_string()
            }
        }
    }

    /// Format all stored content records into a context block
    async fn build_context(&self) -> Result<String> {
        let records = self.db.all_content().await?;
        let block = records
            .iter()
            .map(|record| format!("{}:\n{}", record.title, record.content))
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ProcessedPage;
    use mockito::Server;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let db = Database::new_from_path(&db_path).await.unwrap();
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_new_session_records_both_turns() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "choices": [{"message": {"role": "assistant", "content": "It is a test site."}}]
            }"#,
            )
            .expect(1)
            .create_async()
            .await;

        let (db, _temp_dir) = setup_db().await;
        let responder = ChatResponder::new(Some(Client::for_test(server.url())), db);

        let reply = responder
            .respond(&[ChatMessage::user("What is this site?")], None)
            .await
            .unwrap();

        assert_eq!(reply.message, "It is a test site.");
        assert_eq!(reply.role, Role::Assistant);
        assert!(!reply.session_id.is_empty());
        assert_eq!(reply.history.len(), 2);
        assert_eq!(reply.history[0].role, Role::User);
        assert_eq!(reply.history[1].role, Role::Assistant);

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_context_includes_stored_content() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            }"#,
            )
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"messages": [{"role": "system"}]}"#.to_string(),
            ))
            .create_async()
            .await;

        let (db, _temp_dir) = setup_db().await;
        db.replace_content(&[ProcessedPage {
            title: "Pricing".to_string(),
            content: "Plans start at ten dollars.".to_string(),
            url: "https://x.test/pricing".to_string(),
        }])
        .await
        .unwrap();

        let responder = ChatResponder::new(Some(Client::for_test(server.url())), db);
        responder
            .respond(&[ChatMessage::user("How much does it cost?")], None)
            .await
            .unwrap();

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_uninitialized_client_persists_fallback_turn() {
        let (db, _temp_dir) = setup_db().await;
        let responder = ChatResponder::new(None, db.clone());

        let reply = responder
            .respond(&[ChatMessage::user("Hello?")], None)
            .await
            .unwrap();

        assert_eq!(reply.message, NOT_INITIALIZED);

        // Both the user turn and the fallback assistant turn are persisted
        let messages = db.session_messages(&reply.session_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Hello?");
        assert_eq!(messages[1].content, NOT_INITIALIZED);
    }

    #[tokio::test]
    async fn test_store_read_failure_propagates() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let db = Database::new_from_path(&db_path).await.unwrap();

        // Break the content table underneath the responder
        let raw = libsql::Builder::new_local(&db_path).build().await.unwrap();
        let conn = raw.connect().unwrap();
        conn.execute("DROP TABLE contents", libsql::params![])
            .await
            .unwrap();

        let responder = ChatResponder::new(None, db.clone());
        let result = responder.respond(&[ChatMessage::user("Hello?")], None).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_completion_failure_returns_fixed_string() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let (db, _temp_dir) = setup_db().await;
        let responder = ChatResponder::new(Some(Client::for_test(server.url())), db);

        let reply = responder
            .respond(&[ChatMessage::user("Hello?")], None)
            .await
            .unwrap();

        assert_eq!(reply.message, FAILED);
        assert_eq!(reply.history.len(), 2);

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_existing_session_accumulates_history() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "choices": [{"message": {"role": "assistant", "content": "reply"}}]
            }"#,
            )
            .expect(2)
            .create_async()
            .await;

        let (db, _temp_dir) = setup_db().await;
        let responder = ChatResponder::new(Some(Client::for_test(server.url())), db);

        let first = responder
            .respond(&[ChatMessage::user("First question")], None)
            .await
            .unwrap();

        let second = responder
            .respond(
                &[
                    ChatMessage::user("First question"),
                    ChatMessage::assistant("reply"),
                    ChatMessage::user("Second question"),
                ],
                Some(first.session_id.as_str()),
            )
            .await
            .unwrap();

        assert_eq!(second.session_id, first.session_id);
        assert_eq!(second.history.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_message_list_is_an_error() {
        let (db, _temp_dir) = setup_db().await;
        let responder = ChatResponder::new(None, db);

        let result = responder.respond(&[], None).await;
        assert!(matches!(result, Err(Error::Chat(_))));
    }
}

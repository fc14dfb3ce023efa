//! Senior-care chat assistant.
//!
//! Keeps per-session message history in the [`Store`], forwards it to the
//! configured [`ChatModel`], and attaches up to three facility suggestions
//! picked by a keyword scan of the user's message.
//!
//! Model failures never surface to the caller: the reply becomes a fixed
//! apology with no suggestions, and the apology is still recorded in the
//! session history.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use care_directory_core::models::{ChatMessage, ChatRole, ChatSession, Facility};
use care_directory_core::store::Store;
use care_directory_core::suggest::suggest;

use crate::llm::ChatModel;

pub const GREETING: &str = "Hi there! I'm your senior care assistant powered by Anthropic Claude. \
How can I help you today? I can answer questions about different types of care, financing \
options, or help you find facilities that match your needs in Colorado.";

pub const FALLBACK_REPLY: &str = "I'm sorry, I'm having trouble connecting to my knowledge base \
right now. Please try again in a moment, or contact our support team for assistance.";

pub const SYSTEM_PROMPT: &str = "You are a knowledgeable senior care assistant for \
SeniorLivingColorado, a platform that helps seniors and their families find appropriate care \
facilities across Colorado's Front Range.

Your role is to:
1. Answer questions about different types of senior care (Assisted Living, Memory Care, Nursing Homes, etc.)
2. Provide information about costs, insurance coverage, and financial assistance options
3. Suggest appropriate care options based on the user's described needs
4. Help users understand what to look for when evaluating facilities
5. Provide empathetic guidance throughout the senior care search process

When suggesting facilities, focus on Colorado locations, especially along the Front Range \
(Denver, Boulder, Fort Collins, Colorado Springs, etc.).

Always be empathetic, patient, and understanding - this is a difficult and emotional process \
for many families.";

/// Response body of a chat turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub suggested_facilities: Vec<Facility>,
}

pub struct Assistant {
    store: Arc<dyn Store>,
    model: Arc<dyn ChatModel>,
    suggestion_cities: Vec<String>,
}

impl Assistant {
    pub fn new(
        store: Arc<dyn Store>,
        model: Arc<dyn ChatModel>,
        suggestion_cities: Vec<String>,
    ) -> Self {
        Self {
            store,
            model,
            suggestion_cities,
        }
    }

    /// Start a session whose history holds only the greeting.
    pub async fn create_session(&self) -> Result<ChatSession> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let session = self
            .store
            .create_chat_session(&session_id, vec![ChatMessage::new(ChatRole::Assistant, GREETING)])
            .await
            .context("Failed to create chat session")?;
        tracing::debug!(session_id = %session.session_id, "chat session created");
        Ok(session)
    }

    pub async fn session(&self, session_id: &str) -> Result<Option<ChatSession>> {
        Ok(self.store.chat_session(session_id).await?)
    }

    /// Run one chat turn. An unknown `session_id` starts a new session
    /// under that id.
    ///
    /// The user message and the reply are each appended in a single store
    /// write, so overlapping turns on one session never drop a message.
    pub async fn handle_chat(&self, session_id: &str, text: &str) -> Result<ChatReply> {
        let session = self
            .store
            .append_chat_messages(session_id, vec![ChatMessage::new(ChatRole::User, text)])
            .await?;

        let reply = match self.model.complete(SYSTEM_PROMPT, &session.messages).await {
            Ok(content) => ChatReply {
                message: content,
                suggested_facilities: self.suggestions(text).await?,
            },
            Err(e) => {
                tracing::warn!(
                    provider = self.model.name(),
                    session_id,
                    error = %e,
                    "chat model call failed; replying with fallback"
                );
                ChatReply {
                    message: FALLBACK_REPLY.to_string(),
                    suggested_facilities: Vec::new(),
                }
            }
        };

        let answer = ChatMessage::new(ChatRole::Assistant, reply.message.clone());
        self.store
            .append_chat_messages(session_id, vec![answer])
            .await?;
        Ok(reply)
    }

    /// Facilities for the first candidate that finds any.
    async fn suggestions(&self, text: &str) -> Result<Vec<Facility>> {
        for candidate in suggest(text, self.suggestion_cities.as_slice()) {
            let facilities = self.store.list_facilities(&candidate.filter()).await?;
            if !facilities.is_empty() {
                return Ok(facilities);
            }
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use care_directory_core::models::{NewFacility, ServiceType};
    use care_directory_core::store::memory::InMemoryStore;
    use std::sync::Mutex;

    use crate::config::SeedConfig;
    use crate::llm::DisabledModel;
    use crate::seed::seeded_store;

    /// Returns a fixed reply and records the history it was sent.
    struct CannedModel {
        reply: String,
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ChatModel for CannedModel {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String> {
            assert_eq!(system, SYSTEM_PROMPT);
            self.seen.lock().unwrap().push(messages.len());
            Ok(self.reply.clone())
        }
    }

    fn canned(reply: &str) -> Arc<CannedModel> {
        Arc::new(CannedModel {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    async fn assistant_with(model: Arc<dyn ChatModel>) -> Assistant {
        let store = seeded_store(&SeedConfig::default()).await.unwrap();
        Assistant::new(
            store,
            model,
            vec!["Denver".to_string(), "Boulder".to_string()],
        )
    }

    #[tokio::test]
    async fn test_new_session_has_greeting() {
        let assistant = assistant_with(Arc::new(DisabledModel)).await;
        let session = assistant.create_session().await.unwrap();
        assert_eq!(session.session_id.len(), 36);
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, ChatRole::Assistant);
        assert_eq!(session.messages[0].content, GREETING);

        let other = assistant.create_session().await.unwrap();
        assert_ne!(session.session_id, other.session_id);
    }

    #[tokio::test]
    async fn test_chat_appends_and_suggests_by_service_type() {
        let model = canned("Memory care offers secure support.");
        let assistant = assistant_with(model.clone()).await;
        let session = assistant.create_session().await.unwrap();

        let reply = assistant
            .handle_chat(&session.session_id, "My father has dementia")
            .await
            .unwrap();
        assert_eq!(reply.message, "Memory care offers secure support.");
        assert!(!reply.suggested_facilities.is_empty());
        assert!(reply.suggested_facilities.len() <= 3);
        assert!(reply
            .suggested_facilities
            .iter()
            .all(|f| f.service_type == ServiceType::MemoryCare));

        let stored = assistant.session(&session.session_id).await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 3);
        assert_eq!(stored.messages[1].content, "My father has dementia");
        assert_eq!(stored.messages[2].role, ChatRole::Assistant);
        assert_eq!(*model.seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_chat_suggests_by_city() {
        let assistant = assistant_with(canned("Sure.")).await;
        let reply = assistant
            .handle_chat("fresh-session", "Anything near Denver?")
            .await
            .unwrap();
        assert_eq!(reply.suggested_facilities.len(), 1);
        assert_eq!(reply.suggested_facilities[0].city, "Denver");

        // Unknown session ids start a new, greeting-less history.
        let stored = assistant.session("fresh-session").await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let assistant = assistant_with(Arc::new(DisabledModel)).await;
        let session = assistant.create_session().await.unwrap();
        let reply = assistant
            .handle_chat(&session.session_id, "assisted living in Denver?")
            .await
            .unwrap();
        assert_eq!(reply.message, FALLBACK_REPLY);
        assert!(reply.suggested_facilities.is_empty());

        let stored = assistant.session(&session.session_id).await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 3);
        assert_eq!(stored.messages[2].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_empty_service_type_falls_back_to_city() {
        let store = Arc::new(InMemoryStore::new());
        let facility: NewFacility = serde_json::from_value(serde_json::json!({
            "name": "Front Range Assisted Living",
            "slug": "front-range-assisted-living",
            "address": "1 Colfax Ave",
            "city": "Denver",
            "state": "CO",
            "zipCode": "80202",
            "serviceType": "ASSISTED_LIVING"
        }))
        .unwrap();
        store.create_facility(facility).await.unwrap();
        let assistant = Assistant::new(
            store,
            canned("Here are some options."),
            vec!["Denver".to_string()],
        );

        let reply = assistant
            .handle_chat("s1", "My mom has dementia, options in Denver?")
            .await
            .unwrap();
        assert_eq!(reply.suggested_facilities.len(), 1);
        assert_eq!(reply.suggested_facilities[0].slug, "front-range-assisted-living");
    }

    #[tokio::test]
    async fn test_overlapping_turns_keep_every_message() {
        let assistant = Arc::new(assistant_with(canned("Noted.")).await);
        let session = assistant.create_session().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..4 {
            let assistant = assistant.clone();
            let session_id = session.session_id.clone();
            handles.push(tokio::spawn(async move {
                assistant
                    .handle_chat(&session_id, &format!("question {}", i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = assistant.session(&session.session_id).await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 1 + 4 * 2);
        let users = stored
            .messages
            .iter()
            .filter(|m| m.role == ChatRole::User)
            .count();
        assert_eq!(users, 4);
    }

    #[tokio::test]
    async fn test_no_keyword_no_suggestions() {
        let store = Arc::new(InMemoryStore::new());
        let assistant = Assistant::new(store, canned("Happy to help."), Vec::new());
        let reply = assistant
            .handle_chat("s1", "How do I pay for care?")
            .await
            .unwrap();
        assert!(reply.suggested_facilities.is_empty());
    }
}

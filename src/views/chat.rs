//! Chat widgets
//!
//! `ChatWidget` is the floating assistant panel: local messages only.
//! `ConversationView` is a user-to-user thread backed by the messaging
//! endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::dto::{ReadMessage, SendMessageRequest};
use crate::api::IncubatorClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub time: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text,
            time: Utc::now(),
        }
    }
}

// ============================================
// ASSISTANT PANEL
// ============================================

#[derive(Debug, Clone, Default)]
pub struct ChatWidget {
    pub is_open: bool,
    pub draft: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Post the trimmed draft as a user message. Blank drafts are ignored.
    pub fn send(&mut self) -> Option<&ChatMessage> {
        let text = self.draft.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.draft.clear();
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.messages.last()
    }

    pub fn add_bot_message(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::Bot, text.into()));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

// ============================================
// USER CONVERSATIONS
// ============================================

/// Thread between the signed-in user and one other user
#[derive(Debug, Clone)]
pub struct ConversationView {
    pub me: String,
    pub peer: String,
    pub draft: String,
    pub messages: Vec<ReadMessage>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ConversationView {
    pub fn new(me: impl Into<String>, peer: impl Into<String>) -> Self {
        Self {
            me: me.into(),
            peer: peer.into(),
            draft: String::new(),
            messages: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// Reload the whole thread
    pub async fn refresh(&mut self, client: &IncubatorClient) -> bool {
        self.loading = true;
        self.error = None;
        let result = client.read_conversation(&self.me, &self.peer).await;
        self.loading = false;

        match result {
            Ok(messages) => {
                tracing::debug!(count = messages.len(), peer = %self.peer, "Conversation loaded");
                self.messages = messages;
                true
            }
            Err(e) => {
                self.error = Some(e.user_message());
                false
            }
        }
    }

    /// Send the trimmed draft, then reload the thread. Blank drafts are ignored.
    pub async fn send(&mut self, client: &IncubatorClient) -> bool {
        let content = self.draft.trim().to_string();
        if content.is_empty() {
            return false;
        }

        self.error = None;
        let request = SendMessageRequest {
            sender_email: self.me.clone(),
            reciver_email: self.peer.clone(),
            content_message: content,
        };

        if let Err(e) = client.send_message(&request).await {
            self.error = Some(e.user_message());
            return false;
        }

        self.draft.clear();
        self.refresh(client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, StubResponse};
    use crate::transport::{HttpTransport, TransportConfig};
    use std::sync::Arc;

    #[test]
    fn test_widget_send_and_clear() {
        let mut chat = ChatWidget::new();
        chat.toggle();
        assert!(chat.is_open);

        chat.draft = "   ".to_string();
        assert!(chat.send().is_none());
        assert!(chat.messages.is_empty());

        chat.draft = "  hello  ".to_string();
        let sent = chat.send().cloned().unwrap();
        assert_eq!(sent.text, "hello");
        assert_eq!(sent.role, ChatRole::User);
        assert!(chat.draft.is_empty());

        chat.add_bot_message("hi there");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[1].role, ChatRole::Bot);
        assert_ne!(chat.messages[0].id, chat.messages[1].id);

        chat.clear();
        assert!(chat.messages.is_empty());
        chat.close();
        assert!(!chat.is_open);
    }

    #[tokio::test]
    async fn test_conversation_send_reloads() {
        let (base, mut requests) = serve(vec![
            StubResponse::json(200, r#"{"detail": "sent"}"#),
            StubResponse::json(
                200,
                r#"[{"sender_name": "Ana", "content": "hi"}, {"sender_name": "Bo", "content": "yo"}]"#,
            ),
        ])
        .await;
        let config = TransportConfig {
            base_url: base,
            ..TransportConfig::default()
        };
        let client = IncubatorClient::new(Arc::new(HttpTransport::new(config).unwrap()));

        let mut view = ConversationView::new("ana@mail.io", "bo@mail.io");
        view.draft = " yo ".to_string();
        assert!(view.send(&client).await);
        assert_eq!(view.messages.len(), 2);
        assert!(view.draft.is_empty());

        let send = requests.recv().await.unwrap();
        assert!(send.starts_with("POST /communication/send_message HTTP/1.1"));
        assert!(send.contains(r#""reciver_email":"bo@mail.io""#));
        assert!(send.contains(r#""content_message":"yo""#));

        let read = requests.recv().await.unwrap();
        assert!(read.starts_with("POST /communication/read_conversation HTTP/1.1"));
    }
}

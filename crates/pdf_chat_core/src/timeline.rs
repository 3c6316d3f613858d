//! crates/pdf_chat_core/src/timeline.rs
//!
//! The ordered conversation history for one document.
//!
//! A send is split in two halves so that the event loop can keep handling input
//! while the remote call is outstanding: `begin_send` runs synchronously (guards,
//! optimistic append, busy flag) and `finish_send` applies whatever the call
//! produced. `send_user_message` glues them around the call for callers that
//! simply await it.

use crate::citation::{render_content, RenderedContent};
use crate::domain::{ChatReply, Delivery, DocumentId, Message, MessageId, Role};
use crate::ports::{DocumentService, PortResult};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Content of the reply synthesized when a send fails.
pub const SEND_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// A send that has been accepted and optimistically appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub document_id: DocumentId,
    pub message_id: MessageId,
    pub text: String,
}

/// Presentation data for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: RenderedContent,
    pub timestamp: DateTime<Utc>,
    pub delivery: Delivery,
}

#[derive(Debug)]
pub struct Timeline {
    document_id: DocumentId,
    messages: Vec<Message>,
    sending: bool,
    next_local_id: u64,
}

impl Timeline {
    pub fn new(document_id: DocumentId) -> Self {
        Self {
            document_id,
            messages: Vec::new(),
            sending: false,
            next_local_id: 1,
        }
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a send is in flight. Drives the typing indicator.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Replaces the whole transcript.
    pub fn replace_history(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Best-effort restore: a failed fetch leaves an empty transcript.
    pub fn restore_history(&mut self, history: PortResult<Vec<Message>>) {
        match history {
            Ok(messages) => {
                info!(
                    "Restored {} messages for document {}.",
                    messages.len(),
                    self.document_id
                );
                self.replace_history(messages);
            }
            Err(e) => {
                warn!(
                    "Failed to fetch chat history for document {}: {}",
                    self.document_id, e
                );
                self.replace_history(Vec::new());
            }
        }
    }

    pub async fn load_history(&mut self, service: &dyn DocumentService) {
        let history = service.get_chat_history(self.document_id).await;
        self.restore_history(history);
    }

    /// Accepts a user message and appends it before any remote call is made.
    ///
    /// Returns `None` (and changes nothing) for blank text or while another send
    /// is in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<OutgoingMessage> {
        if text.trim().is_empty() || self.sending {
            return None;
        }

        let message_id = self.next_id();
        self.push(Message {
            id: message_id,
            role: Role::User,
            content: text.to_string(),
            timestamp: Utc::now(),
            citations: Vec::new(),
            delivery: Delivery::Pending,
        });
        self.sending = true;

        Some(OutgoingMessage {
            document_id: self.document_id,
            message_id,
            text: text.to_string(),
        })
    }

    /// Applies the outcome of a send started with `begin_send`.
    ///
    /// The busy flag is cleared on every path. Returns `false` when the outcome
    /// belongs to another conversation and was discarded.
    pub fn finish_send(&mut self, outgoing: &OutgoingMessage, result: PortResult<ChatReply>) -> bool {
        if outgoing.document_id != self.document_id {
            warn!(
                "Discarding reply for document {}; the active document is {}.",
                outgoing.document_id, self.document_id
            );
            return false;
        }
        self.sending = false;

        match result {
            Ok(reply) => {
                self.settle(outgoing.message_id, Delivery::Confirmed);
                let ChatReply { message, citations } = reply;
                let citations = if citations.is_empty() {
                    message.citations
                } else {
                    citations
                };
                self.push(Message {
                    id: message.id,
                    role: Role::Assistant,
                    content: message.content,
                    timestamp: message.timestamp,
                    citations,
                    delivery: Delivery::Confirmed,
                });
            }
            Err(e) => {
                error!("Error sending message: {}", e);
                self.settle(outgoing.message_id, Delivery::Failed);
                let id = self.next_id();
                self.push(Message {
                    id,
                    role: Role::Assistant,
                    content: SEND_FAILURE_MESSAGE.to_string(),
                    timestamp: Utc::now(),
                    citations: Vec::new(),
                    delivery: Delivery::Fallback,
                });
            }
        }
        true
    }

    /// Sends `text` and waits for the outcome. A no-op returning `false` when the
    /// message is rejected by the guards.
    pub async fn send_user_message(&mut self, service: &dyn DocumentService, text: &str) -> bool {
        let Some(outgoing) = self.begin_send(text) else {
            return false;
        };
        let result = service
            .send_chat_message(outgoing.document_id, &outgoing.text)
            .await;
        self.finish_send(&outgoing, result)
    }

    /// The transcript as presentation data.
    pub fn rendered(&self) -> Vec<RenderedMessage> {
        self.messages
            .iter()
            .map(|message| RenderedMessage {
                id: message.id,
                role: message.role,
                content: match message.role {
                    Role::Assistant => render_content(&message.content, &message.citations),
                    Role::User => RenderedContent::plain(&message.content),
                },
                timestamp: message.timestamp,
                delivery: message.delivery,
            })
            .collect()
    }

    fn next_id(&mut self) -> MessageId {
        let id = MessageId::Local(self.next_local_id);
        self.next_local_id += 1;
        id
    }

    // Keeps transcript timestamps non-decreasing.
    fn push(&mut self, mut message: Message) {
        if let Some(last) = self.messages.last() {
            if message.timestamp < last.timestamp {
                message.timestamp = last.timestamp;
            }
        }
        self.messages.push(message);
    }

    fn settle(&mut self, id: MessageId, delivery: Delivery) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.delivery = delivery;
        }
    }
}

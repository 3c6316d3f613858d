//! services/client/src/adapters/wire.rs
//!
//! JSON records exchanged with the backend REST API, and their conversion into
//! core domain types.

use chrono::{DateTime, Utc};
use pdf_chat_core::domain::{Citation, Delivery, Document, Message, MessageId, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Records Received FROM the Backend
//=========================================================================================

/// An entry of `GET /documents/` and the body of a successful upload.
#[derive(Deserialize, Debug, Clone)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub page_count: u32,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Document {
            id: record.id,
            title: record.title,
            page_count: record.page_count,
            uploaded_at: record.uploaded_at,
            filename: record.filename,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CitationRecord {
    pub page: u32,
    #[serde(default)]
    pub text: Option<String>,
}

impl From<CitationRecord> for Citation {
    fn from(record: CitationRecord) -> Self {
        match record.text {
            Some(text) => Citation {
                page: record.page,
                text,
            },
            None => Citation::new(record.page),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    User,
    Assistant,
}

/// A stored chat message, as returned by the history endpoint and inside chat replies.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatMessageRecord {
    pub id: Uuid,
    pub message_type: MessageType,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub citations: Vec<CitationRecord>,
}

impl From<ChatMessageRecord> for Message {
    fn from(record: ChatMessageRecord) -> Self {
        Message {
            id: MessageId::Remote(record.id),
            role: match record.message_type {
                MessageType::User => Role::User,
                MessageType::Assistant => Role::Assistant,
            },
            content: record.content,
            timestamp: record.timestamp,
            citations: record.citations.into_iter().map(Citation::from).collect(),
            delivery: Delivery::Confirmed,
        }
    }
}

/// Body of `POST /chat/`.
#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub response: ChatMessageRecord,
    #[serde(default)]
    pub citations: Vec<CitationRecord>,
}

/// Body of any failed request that explains itself.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

//=========================================================================================
// Records Sent TO the Backend
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub document_id: Uuid,
}

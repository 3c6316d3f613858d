//! crates/pdf_chat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt;
use uuid::Uuid;

/// Documents are addressed by the backend-assigned UUID.
pub type DocumentId = Uuid;

/// An uploaded PDF as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub page_count: u32,
    pub uploaded_at: DateTime<Utc>,
    pub filename: Option<String>,
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Identifies a message within one conversation.
///
/// Messages loaded from or returned by the backend carry its UUID; messages
/// created on this side (optimistic user messages, fallback replies) get a
/// number from the timeline's own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    Remote(Uuid),
    Local(u64),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Remote(id) => write!(f, "{}", id),
            MessageId::Local(n) => write!(f, "local-{}", n),
        }
    }
}

/// Lifecycle tag of a message in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Optimistically appended, the reply has not arrived yet.
    Pending,
    /// Acknowledged by the backend, or loaded from history.
    Confirmed,
    /// A user message whose send failed. It stays in the transcript.
    Failed,
    /// The synthetic reply appended after a failed send.
    Fallback,
}

/// A reference from assistant text to a page of the active document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Citation {
    /// 1-based page number. Not checked against the document's page count.
    pub page: u32,
    /// Display text, e.g. "Page 3".
    pub text: String,
}

impl Citation {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            text: format!("Page {}", page),
        }
    }

    /// The matcher that locates this citation in message content:
    /// `page`, whitespace, then the page number, case-insensitively.
    ///
    /// The phrase is matched wherever it occurs, including inside longer words
    /// and numbers ("homepage 3", "page 30").
    pub fn pattern(&self) -> Regex {
        // Only digits are interpolated, so the pattern is always valid.
        Regex::new(&format!(r"(?i)page\s+{}", self.page))
            .unwrap_or_else(|_| unreachable!("citation pattern is built from digits only"))
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub citations: Vec<Citation>,
    pub delivery: Delivery,
}

/// Where the rendering capability can stream a document's pages from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocator {
    pub document_id: DocumentId,
    pub url: String,
}

/// The backend's answer to a chat message.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub message: Message,
    pub citations: Vec<Citation>,
}

/// A file picked by the user for upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

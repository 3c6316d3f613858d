//! crates/pdf_chat_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the backend transport and the PDF rendering capability.

use async_trait::async_trait;
use crate::domain::{
    ChatReply, Document, DocumentId, DocumentLocator, FileUpload, Message,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, rendering).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The collaborator refused the request and said why.
    #[error("{0}")]
    Rejected(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentService: Send + Sync {
    // --- Document Management ---
    async fn list_documents(&self) -> PortResult<Vec<Document>>;

    /// Uploads a PDF. Callers validate the content type before invoking this.
    async fn upload_document(&self, file: FileUpload) -> PortResult<Document>;

    // --- Chat ---
    async fn get_chat_history(&self, document_id: DocumentId) -> PortResult<Vec<Message>>;

    async fn send_chat_message(&self, document_id: DocumentId, text: &str) -> PortResult<ChatReply>;

    // --- Document Bytes ---
    async fn resolve_document_source(&self, document_id: DocumentId) -> PortResult<DocumentLocator>;
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Opens the document behind `locator` and reports its page count.
    async fn load_document(&self, locator: &DocumentLocator) -> PortResult<u32>;

    /// Draws one page at the given scale.
    async fn render_page(&self, locator: &DocumentLocator, page: u32, scale: f32) -> PortResult<()>;
}

/// Callbacks fired by the core on state transitions, for the surrounding UI.
pub trait SessionObserver: Send + Sync {
    fn on_document_change(&self, _document: &Document) {}

    fn on_page_change(&self, _page: u32) {}
}

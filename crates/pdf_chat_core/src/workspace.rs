//! crates/pdf_chat_core/src/workspace.rs
//!
//! The common parent of the chat panel and the viewer.
//!
//! The workspace owns the document list, the page cursor and the active session.
//! It is the only place where the active document changes, and it swaps the
//! document, the cursor and both panels in one synchronous step before any
//! history or page is loaded for the new document.

use crate::chat::ChatPanel;
use crate::cursor::{CursorPosition, PageCursor};
use crate::domain::{ChatReply, Document, DocumentId, FileUpload};
use crate::library::DocumentLibrary;
use crate::ports::{DocumentService, PageRenderer, PortResult, SessionObserver};
use crate::timeline::OutgoingMessage;
use crate::upload::{validate_upload, UploadError};
use crate::viewer::{DocumentViewer, Navigation, Zoom};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything tied to the currently open document.
pub struct ActiveSession {
    document: Document,
    chat: ChatPanel,
    viewer: DocumentViewer,
}

impl ActiveSession {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn chat(&self) -> &ChatPanel {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatPanel {
        &mut self.chat
    }

    pub fn viewer(&self) -> &DocumentViewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut DocumentViewer {
        &mut self.viewer
    }
}

pub struct Workspace {
    service: Arc<dyn DocumentService>,
    renderer: Arc<dyn PageRenderer>,
    library: DocumentLibrary,
    cursor: PageCursor,
    active: Option<ActiveSession>,
    upload_error: Option<String>,
    upload_limit: Option<usize>,
}

impl Workspace {
    pub fn new(
        service: Arc<dyn DocumentService>,
        renderer: Arc<dyn PageRenderer>,
        observer: Option<Arc<dyn SessionObserver>>,
    ) -> Self {
        Self {
            service,
            renderer,
            library: DocumentLibrary::new(),
            cursor: PageCursor::new(observer),
            active: None,
            upload_error: None,
            upload_limit: None,
        }
    }

    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = Some(limit);
        self
    }

    /// The backend, for callers that run sends outside the workspace.
    pub fn service(&self) -> Arc<dyn DocumentService> {
        self.service.clone()
    }

    pub fn library(&self) -> &DocumentLibrary {
        &self.library
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveSession> {
        self.active.as_mut()
    }

    pub fn cursor_position(&self) -> CursorPosition {
        self.cursor.position()
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn is_active(&self, id: DocumentId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|session| session.document.id == id)
    }

    //=====================================================================================
    // Documents
    //=====================================================================================

    pub async fn refresh_documents(&mut self) -> bool {
        let service = self.service.clone();
        self.library.refresh(service.as_ref()).await
    }

    /// Validates and uploads a file, then opens it.
    ///
    /// Validation failures never reach the backend. Any failure is kept as the
    /// upload error and leaves the document list and the active session as they were.
    pub async fn upload(&mut self, file: FileUpload) -> Result<(), UploadError> {
        if let Err(e) = validate_upload(&file, self.upload_limit) {
            warn!("Rejected upload of '{}': {}", file.file_name, e);
            self.upload_error = Some(e.to_string());
            return Err(e);
        }

        self.upload_error = None;
        info!("Uploading '{}' ({} bytes)", file.file_name, file.bytes.len());
        let result = self.service.upload_document(file).await;

        match result {
            Ok(document) => {
                info!("Uploaded document {} ('{}')", document.id, document.title);
                self.library.insert_uploaded(document.clone());
                self.activate(document).await;
                Ok(())
            }
            Err(e) => {
                error!("Upload error: {}", e);
                let e = UploadError::from(e);
                self.upload_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Opens a document from the list. Returns `false` for unknown ids.
    pub async fn select_document(&mut self, id: DocumentId) -> bool {
        let Some(document) = self.library.get(id).cloned() else {
            warn!("Document {} is not in the library.", id);
            return false;
        };
        self.activate(document).await
    }

    /// Makes `document` the active one.
    ///
    /// The source locator is resolved first; if that fails nothing changes.
    pub async fn activate(&mut self, document: Document) -> bool {
        let service = self.service.clone();
        let locator = match service.resolve_document_source(document.id).await {
            Ok(locator) => locator,
            Err(e) => {
                error!("Failed to resolve the source of document {}: {}", document.id, e);
                return false;
            }
        };

        // Document, cursor and panels change together.
        self.cursor.switch_document(Some(&document));
        let chat = ChatPanel::new(document.id, self.cursor.handle());
        let viewer = DocumentViewer::new(self.renderer.clone(), self.cursor.handle(), locator);
        info!("Opened document {} ('{}')", document.id, document.title);
        let session = self.active.insert(ActiveSession {
            document,
            chat,
            viewer,
        });

        session.chat.timeline_mut().load_history(service.as_ref()).await;
        session.viewer.load().await;
        session.viewer.render().await;
        true
    }

    pub fn close_document(&mut self) {
        self.active = None;
        self.cursor.switch_document(None);
    }

    //=====================================================================================
    // Chat
    //=====================================================================================

    /// Sends `text` in the active conversation and waits for the reply.
    pub async fn send_message(&mut self, text: &str) -> bool {
        let service = self.service.clone();
        let Some(session) = self.active.as_mut() else {
            return false;
        };
        session.chat.set_draft(text);
        session.chat.send_draft(service.as_ref()).await
    }

    /// The synchronous half of a send, for event loops that await the reply elsewhere.
    pub fn begin_send(&mut self, text: &str) -> Option<OutgoingMessage> {
        let session = self.active.as_mut()?;
        session.chat.set_draft(text);
        session.chat.submit()
    }

    /// Delivers a reply started with `begin_send`. Replies for a document that
    /// is no longer active are dropped.
    pub fn complete_send(&mut self, outgoing: &OutgoingMessage, result: PortResult<ChatReply>) -> bool {
        match self.active.as_mut() {
            Some(session) if session.document.id == outgoing.document_id => {
                session.chat.complete(outgoing, result)
            }
            _ => {
                warn!(
                    "Dropping reply for document {}; it is no longer open.",
                    outgoing.document_id
                );
                false
            }
        }
    }

    /// A click on a page reference in the transcript.
    pub async fn follow_citation(&mut self, page: u32) -> bool {
        let Some(session) = self.active.as_mut() else {
            return false;
        };
        let moved = session.chat.follow_citation(page);
        session.viewer.sync_from_cursor();
        session.viewer.render().await;
        moved
    }

    //=====================================================================================
    // Viewer
    //=====================================================================================

    pub async fn navigate(&mut self, navigation: Navigation) -> bool {
        let Some(session) = self.active.as_mut() else {
            return false;
        };
        let moved = session.viewer.navigate(navigation);
        session.viewer.render().await;
        moved
    }

    pub async fn zoom_in(&mut self) -> Option<Zoom> {
        let session = self.active.as_mut()?;
        let zoom = session.viewer.zoom_in();
        session.viewer.render().await;
        Some(zoom)
    }

    pub async fn zoom_out(&mut self) -> Option<Zoom> {
        let session = self.active.as_mut()?;
        let zoom = session.viewer.zoom_out();
        session.viewer.render().await;
        Some(zoom)
    }

    pub async fn retry_load(&mut self) {
        if let Some(session) = self.active.as_mut() {
            session.viewer.retry().await;
            session.viewer.render().await;
        }
    }

    /// Brings the viewer in line with the cursor and redraws if needed.
    pub async fn refresh_view(&mut self) {
        if let Some(session) = self.active.as_mut() {
            session.viewer.sync_from_cursor();
            session.viewer.render().await;
        }
    }
}

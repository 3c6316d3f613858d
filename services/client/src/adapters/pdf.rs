//! services/client/src/adapters/pdf.rs
//!
//! This module contains the page-rendering adapter used by the terminal client.
//! It implements the `PageRenderer` port from the `core` crate.
//!
//! A terminal cannot paint PDF pages, so "rendering" here means fetching the
//! document once, opening it with MuPDF to learn its page count, and recording
//! which page is on screen at which scale. The terminal view draws the frame
//! from that record.

use crate::adapters::http::{check_status, transport};
use async_trait::async_trait;
use pdf_chat_core::domain::{DocumentId, DocumentLocator};
use pdf_chat_core::ports::{PageRenderer, PortError, PortResult};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// What the renderer last put on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub document_id: DocumentId,
    pub page: u32,
    pub scale: f32,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `PageRenderer` by streaming PDFs over HTTP.
#[derive(Clone)]
pub struct HttpPdfRenderer {
    client: Client,
    page_counts: Arc<Mutex<HashMap<DocumentId, u32>>>,
    frame: Arc<Mutex<Option<Frame>>>,
}

impl HttpPdfRenderer {
    /// Creates a new `HttpPdfRenderer`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            page_counts: Arc::new(Mutex::new(HashMap::new())),
            frame: Arc::new(Mutex::new(None)),
        }
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.frame.lock().ok().and_then(|frame| *frame)
    }
}

const PDF_MIME: &str = "application/pdf";

/// Opens a PDF from memory and returns its page count.
///
/// MuPDF resolves the cross-reference chain, so incremental updates and pages
/// stored in object streams are counted the way a viewer sees them.
pub fn count_pages(bytes: &[u8]) -> PortResult<u32> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(PortError::Unexpected(
            "The document is not a PDF file".to_string(),
        ));
    }
    let document = mupdf::Document::from_bytes(bytes, PDF_MIME)
        .map_err(|e| PortError::Unexpected(format!("Could not open the PDF: {}", e)))?;
    let pages = document
        .page_count()
        .map_err(|e| PortError::Unexpected(format!("Could not read the page tree: {}", e)))?;
    match u32::try_from(pages) {
        Ok(pages) if pages > 0 => Ok(pages),
        _ => Err(PortError::Unexpected(
            "The document has no readable pages".to_string(),
        )),
    }
}

//=========================================================================================
// `PageRenderer` Trait Implementation
//=========================================================================================

#[async_trait]
impl PageRenderer for HttpPdfRenderer {
    async fn load_document(&self, locator: &DocumentLocator) -> PortResult<u32> {
        let response = self
            .client
            .get(&locator.url)
            .send()
            .await
            .map_err(transport)?;
        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(transport)?;

        // MuPDF documents are not `Send`; open and drop them on a blocking thread.
        let pdf = bytes.clone();
        let pages = tokio::task::spawn_blocking(move || count_pages(&pdf))
            .await
            .map_err(|e| PortError::Unexpected(format!("PDF task failed: {}", e)))??;
        info!(
            "Fetched {} bytes for document {} ({} pages)",
            bytes.len(),
            locator.document_id,
            pages
        );
        if let Ok(mut counts) = self.page_counts.lock() {
            counts.insert(locator.document_id, pages);
        }
        Ok(pages)
    }

    async fn render_page(&self, locator: &DocumentLocator, page: u32, scale: f32) -> PortResult<()> {
        let known = self
            .page_counts
            .lock()
            .ok()
            .and_then(|counts| counts.get(&locator.document_id).copied());
        match known {
            None => {
                return Err(PortError::NotFound(format!(
                    "document {} is not loaded",
                    locator.document_id
                )))
            }
            Some(count) if page == 0 || page > count => {
                return Err(PortError::NotFound(format!("page {} of {}", page, count)))
            }
            Some(_) => {}
        }

        debug!("Rendering page {} at scale {}", page, scale);
        if let Ok(mut frame) = self.frame.lock() {
            *frame = Some(Frame {
                document_id: locator.document_id,
                page,
                scale,
            });
        }
        Ok(())
    }
}

//! services/client/src/terminal/mod.rs
//!
//! The interactive line-driven front-end.

pub mod command;
pub mod event_loop;
pub mod view;

pub use event_loop::{load_upload, Flow, Terminal};

use pdf_chat_core::{Document, SessionObserver};
use tracing::info;

/// Logs every document switch and page change made through the cursor.
pub struct LoggingObserver;

impl SessionObserver for LoggingObserver {
    fn on_document_change(&self, document: &Document) {
        info!(document_id = %document.id, "Active document is now '{}'", document.title);
    }

    fn on_page_change(&self, page: u32) {
        info!(page, "Page changed");
    }
}

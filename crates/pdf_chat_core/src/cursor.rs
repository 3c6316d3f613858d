//! crates/pdf_chat_core/src/cursor.rs
//!
//! The single "current page" shared by the chat panel and the document viewer.
//!
//! The `Workspace` owns the `PageCursor` and is the only place that can switch
//! documents. Everyone else gets a `PageHandle`: read access plus a bound
//! `set_page`. The document id and the page live in one watch value, so a
//! document switch and the reset to page 1 are a single observable change.

use crate::domain::{Document, DocumentId};
use crate::ports::SessionObserver;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Snapshot of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub document: Option<DocumentId>,
    pub page: u32,
    /// Highest valid page, once known.
    pub page_limit: Option<u32>,
}

impl CursorPosition {
    fn detached() -> Self {
        Self {
            document: None,
            page: 1,
            page_limit: None,
        }
    }
}

struct Shared {
    position: watch::Sender<CursorPosition>,
    observer: Option<Arc<dyn SessionObserver>>,
}

/// Owner side of the cursor.
#[derive(Clone)]
pub struct PageCursor {
    shared: Arc<Shared>,
}

impl PageCursor {
    pub fn new(observer: Option<Arc<dyn SessionObserver>>) -> Self {
        let (position, _) = watch::channel(CursorPosition::detached());
        Self {
            shared: Arc::new(Shared { position, observer }),
        }
    }

    /// Points the cursor at a new document (or none), resetting the page to 1
    /// in the same update.
    pub fn switch_document(&self, document: Option<&Document>) {
        let position = match document {
            Some(doc) => CursorPosition {
                document: Some(doc.id),
                page: 1,
                page_limit: (doc.page_count > 0).then_some(doc.page_count),
            },
            None => CursorPosition::detached(),
        };
        self.shared.position.send_replace(position);
        debug!("Cursor switched to document {:?}", position.document);

        if let (Some(doc), Some(observer)) = (document, &self.shared.observer) {
            observer.on_document_change(doc);
        }
    }

    /// A reader/writer handle for one of the views.
    pub fn handle(&self) -> PageHandle {
        PageHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn position(&self) -> CursorPosition {
        *self.shared.position.borrow()
    }
}

/// Read access plus the bound page setter, handed to the chat panel and the viewer.
#[derive(Clone)]
pub struct PageHandle {
    shared: Arc<Shared>,
}

impl PageHandle {
    pub fn position(&self) -> CursorPosition {
        *self.shared.position.borrow()
    }

    pub fn current_page(&self) -> u32 {
        self.shared.position.borrow().page
    }

    pub fn document(&self) -> Option<DocumentId> {
        self.shared.position.borrow().document
    }

    /// Receives every effective change of the cursor.
    pub fn subscribe(&self) -> watch::Receiver<CursorPosition> {
        self.shared.position.subscribe()
    }

    /// Moves the cursor. Last write wins.
    ///
    /// Returns `false` without notifying anyone when there is no active document,
    /// when `page` is 0, or when the (clamped) page is already current.
    pub fn set_page(&self, page: u32) -> bool {
        let mut applied = None;
        self.shared.position.send_if_modified(|position| {
            if position.document.is_none() || page == 0 {
                return false;
            }
            let target = match position.page_limit {
                Some(limit) => page.min(limit),
                None => page,
            };
            if target == position.page {
                return false;
            }
            position.page = target;
            applied = Some(target);
            true
        });

        match applied {
            Some(page) => {
                debug!("Cursor moved to page {}", page);
                if let Some(observer) = &self.shared.observer {
                    observer.on_page_change(page);
                }
                true
            }
            None => false,
        }
    }

    /// Records the page count reported by the renderer.
    ///
    /// A stored page past the new limit is pulled back to the last page so every
    /// reader agrees with what the viewer shows. Subscribers are not notified.
    pub fn set_page_limit(&self, document: DocumentId, limit: u32) {
        self.shared.position.send_if_modified(|position| {
            if position.document == Some(document) && limit > 0 {
                position.page_limit = Some(limit);
                if position.page > limit {
                    debug!("Cursor page {} clamped to the last page {}", position.page, limit);
                    position.page = limit;
                }
            }
            false
        });
    }
}

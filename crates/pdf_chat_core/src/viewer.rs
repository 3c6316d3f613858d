//! crates/pdf_chat_core/src/viewer.rs
//!
//! Wraps the external page renderer for the active document.
//!
//! Data flows one way between the viewer and the cursor: user gestures
//! (previous/next/thumbnail) write the cursor, and cursor changes only move the
//! viewer's local render target through `sync_from_cursor`. Loading and rendering
//! never write the cursor, so a render can never trigger another render.

use crate::cursor::PageHandle;
use crate::domain::DocumentLocator;
use crate::ports::PageRenderer;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of opening the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready { page_count: u32 },
    Failed { message: String },
}

/// Display zoom, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom(u16);

impl Zoom {
    pub const MIN: u16 = 50;
    pub const MAX: u16 = 300;
    pub const STEP: u16 = 20;

    pub fn percent(&self) -> u16 {
        self.0
    }

    pub fn scale(&self) -> f32 {
        f32::from(self.0) / 100.0
    }

    pub fn zoom_in(self) -> Self {
        Self((self.0 + Self::STEP).min(Self::MAX))
    }

    pub fn zoom_out(self) -> Self {
        Self(self.0.saturating_sub(Self::STEP).max(Self::MIN))
    }

    pub fn label(&self) -> String {
        format!("{}%", self.0)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(100)
    }
}

/// One entry of the page strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thumbnail {
    pub page: u32,
    pub active: bool,
}

/// A navigation gesture made in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
    /// A thumbnail click.
    GoTo(u32),
}

pub struct DocumentViewer {
    renderer: Arc<dyn PageRenderer>,
    cursor: PageHandle,
    locator: DocumentLocator,
    state: LoadState,
    page: u32,
    zoom: Zoom,
    rendered: Option<(u32, Zoom)>,
    page_error: Option<String>,
}

impl DocumentViewer {
    pub fn new(renderer: Arc<dyn PageRenderer>, cursor: PageHandle, locator: DocumentLocator) -> Self {
        let page = cursor.current_page();
        Self {
            renderer,
            cursor,
            locator,
            state: LoadState::Loading,
            page,
            zoom: Zoom::default(),
            rendered: None,
            page_error: None,
        }
    }

    pub fn locator(&self) -> &DocumentLocator {
        &self.locator
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// The page the viewer shows (or will show on the next render).
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn page_count(&self) -> Option<u32> {
        match self.state {
            LoadState::Ready { page_count } => Some(page_count),
            _ => None,
        }
    }

    /// Set when the last page render failed.
    pub fn page_error(&self) -> Option<&str> {
        self.page_error.as_deref()
    }

    /// Opens the document through the renderer.
    pub async fn load(&mut self) -> &LoadState {
        self.state = LoadState::Loading;
        self.rendered = None;
        info!("Loading PDF from {}", self.locator.url);

        match self.renderer.load_document(&self.locator).await {
            Ok(page_count) => {
                info!("PDF loaded successfully with {} pages", page_count);
                self.state = LoadState::Ready { page_count };
                self.cursor
                    .set_page_limit(self.locator.document_id, page_count);
                self.sync_from_cursor();
            }
            Err(e) => {
                error!("PDF load error: {}", e);
                self.state = LoadState::Failed {
                    message: format!("Failed to load PDF: {}", e),
                };
            }
        }
        &self.state
    }

    /// The user's "Try Again" action: clears the error and loads once more.
    pub async fn retry(&mut self) -> &LoadState {
        if let LoadState::Failed { message } = &self.state {
            info!("Retrying after: {}", message);
        }
        self.load().await
    }

    /// Follows a cursor change made elsewhere. Only the local render target
    /// moves; returns `true` when it did.
    pub fn sync_from_cursor(&mut self) -> bool {
        let position = self.cursor.position();
        if position.document != Some(self.locator.document_id) {
            return false;
        }

        let mut target = position.page.max(1);
        if let Some(page_count) = self.page_count() {
            if target > page_count {
                warn!(
                    "Cursor page {} is beyond the last page ({}); showing the last page.",
                    target, page_count
                );
                target = page_count;
            }
        }

        if target == self.page {
            return false;
        }
        info!("Viewer syncing to page {}", target);
        self.page = target;
        true
    }

    pub fn needs_render(&self) -> bool {
        self.page_count().is_some() && self.rendered != Some((self.page, self.zoom))
    }

    /// Draws the current page if it is not already on screen at this zoom.
    /// Returns `true` when the renderer was called successfully.
    pub async fn render(&mut self) -> bool {
        if !self.needs_render() {
            return false;
        }

        match self
            .renderer
            .render_page(&self.locator, self.page, self.zoom.scale())
            .await
        {
            Ok(()) => {
                self.rendered = Some((self.page, self.zoom));
                self.page_error = None;
                true
            }
            Err(e) => {
                error!("Failed to render page {}: {}", self.page, e);
                self.page_error = Some("Error loading page".to_string());
                false
            }
        }
    }

    pub fn can_go_previous(&self) -> bool {
        self.page_count().is_some() && self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        matches!(self.page_count(), Some(count) if self.page < count)
    }

    /// Applies a user gesture, clamped to the document's pages, and writes the
    /// cursor. Returns `true` when the page changed.
    pub fn navigate(&mut self, navigation: Navigation) -> bool {
        let Some(page_count) = self.page_count() else {
            return false;
        };
        let requested = match navigation {
            Navigation::Previous => self.page.saturating_sub(1),
            Navigation::Next => self.page.saturating_add(1),
            Navigation::GoTo(page) => page,
        };
        let target = requested.clamp(1, page_count.max(1));
        if target == self.page {
            return false;
        }

        self.page = target;
        self.cursor.set_page(target);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        self.navigate(Navigation::Previous)
    }

    pub fn next_page(&mut self) -> bool {
        self.navigate(Navigation::Next)
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        self.navigate(Navigation::GoTo(page))
    }

    pub fn zoom_in(&mut self) -> Zoom {
        self.zoom = self.zoom.zoom_in();
        self.zoom
    }

    pub fn zoom_out(&mut self) -> Zoom {
        self.zoom = self.zoom.zoom_out();
        self.zoom
    }

    /// One entry per page, only for multi-page documents.
    pub fn thumbnails(&self) -> Vec<Thumbnail> {
        match self.page_count() {
            Some(page_count) if page_count > 1 => (1..=page_count)
                .map(|page| Thumbnail {
                    page,
                    active: page == self.page,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn page_label(&self) -> String {
        match self.page_count() {
            Some(page_count) => format!("Page {} of {}", self.page, page_count),
            None => format!("Page {} of ?", self.page),
        }
    }
}

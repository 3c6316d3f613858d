//! crates/pdf_chat_core/src/chat.rs
//!
//! The chat side of an active document: the timeline, the input draft, and the
//! page handle used by citation clicks. Citation clicks are the only way this
//! panel writes the cursor.

use crate::cursor::PageHandle;
use crate::domain::{ChatReply, DocumentId};
use crate::ports::{DocumentService, PortResult};
use crate::timeline::{OutgoingMessage, RenderedMessage, Timeline};
use tracing::info;

pub struct ChatPanel {
    timeline: Timeline,
    draft: String,
    cursor: PageHandle,
}

impl ChatPanel {
    pub fn new(document_id: DocumentId, cursor: PageHandle) -> Self {
        Self {
            timeline: Timeline::new(document_id),
            draft: String::new(),
            cursor,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// The send button is enabled only for a non-blank draft while idle.
    pub fn can_submit(&self) -> bool {
        !self.draft.trim().is_empty() && !self.timeline.is_sending()
    }

    /// Submits the draft. The draft is cleared only when the send is accepted.
    pub fn submit(&mut self) -> Option<OutgoingMessage> {
        let outgoing = self.timeline.begin_send(&self.draft)?;
        self.draft.clear();
        Some(outgoing)
    }

    pub fn complete(&mut self, outgoing: &OutgoingMessage, result: PortResult<ChatReply>) -> bool {
        self.timeline.finish_send(outgoing, result)
    }

    /// Submits the draft and awaits the reply.
    pub async fn send_draft(&mut self, service: &dyn DocumentService) -> bool {
        let Some(outgoing) = self.submit() else {
            return false;
        };
        let result = service
            .send_chat_message(outgoing.document_id, &outgoing.text)
            .await;
        self.complete(&outgoing, result)
    }

    /// A click on a page reference or a "References" entry.
    pub fn follow_citation(&self, page: u32) -> bool {
        info!("Citation clicked for page {}", page);
        self.cursor.set_page(page)
    }

    pub fn rendered(&self) -> Vec<RenderedMessage> {
        self.timeline.rendered()
    }

    pub fn is_typing(&self) -> bool {
        self.timeline.is_sending()
    }
}

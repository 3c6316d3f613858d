//! End-to-end flows through the workspace with in-memory collaborators.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use pdf_chat_core::{
    Body, ChatReply, Citation, Delivery, Document, DocumentId, DocumentLocator, DocumentService,
    FileUpload, LoadState, Message, MessageId, Navigation, PageRenderer, PortError, PortResult,
    Role, SessionObserver, Span, UploadError, Workspace, SEND_FAILURE_MESSAGE,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

//=========================================================================================
// Fakes
//=========================================================================================

#[derive(Default)]
struct FakeBackend {
    documents: Mutex<Vec<Document>>,
    histories: Mutex<HashMap<DocumentId, Vec<Message>>>,
    replies: Mutex<Vec<PortResult<ChatReply>>>,
    uploads: Mutex<Vec<String>>,
    upload_result: Mutex<Option<PortResult<Document>>>,
}

impl FakeBackend {
    fn with_documents(documents: Vec<Document>) -> Arc<Self> {
        let backend = Self::default();
        *backend.documents.lock().unwrap() = documents;
        Arc::new(backend)
    }

    fn push_reply(&self, reply: PortResult<ChatReply>) {
        self.replies.lock().unwrap().push(reply);
    }
}

#[async_trait]
impl DocumentService for FakeBackend {
    async fn list_documents(&self) -> PortResult<Vec<Document>> {
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn upload_document(&self, file: FileUpload) -> PortResult<Document> {
        self.uploads.lock().unwrap().push(file.file_name.clone());
        self.upload_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(PortError::Transport("no upload scripted".to_string())))
    }

    async fn get_chat_history(&self, document_id: DocumentId) -> PortResult<Vec<Message>> {
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(&document_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_chat_message(&self, _document_id: DocumentId, _text: &str) -> PortResult<ChatReply> {
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(PortError::Transport("no reply scripted".to_string()));
        }
        replies.remove(0)
    }

    async fn resolve_document_source(&self, document_id: DocumentId) -> PortResult<DocumentLocator> {
        Ok(DocumentLocator {
            document_id,
            url: format!("memory://{}", document_id),
        })
    }
}

/// Reports each document's listed page count and records every render.
#[derive(Default)]
struct FakeRenderer {
    page_counts: Mutex<HashMap<DocumentId, u32>>,
    renders: Mutex<Vec<(DocumentId, u32)>>,
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn load_document(&self, locator: &DocumentLocator) -> PortResult<u32> {
        self.page_counts
            .lock()
            .unwrap()
            .get(&locator.document_id)
            .copied()
            .ok_or_else(|| PortError::NotFound(locator.url.clone()))
    }

    async fn render_page(&self, locator: &DocumentLocator, page: u32, _scale: f32) -> PortResult<()> {
        self.renders.lock().unwrap().push((locator.document_id, page));
        Ok(())
    }
}

#[derive(Default)]
struct Events {
    log: Mutex<Vec<String>>,
}

impl SessionObserver for Events {
    fn on_document_change(&self, document: &Document) {
        self.log.lock().unwrap().push(format!("document:{}", document.title));
    }

    fn on_page_change(&self, page: u32) {
        self.log.lock().unwrap().push(format!("page:{}", page));
    }
}

fn document(title: &str, page_count: u32) -> Document {
    Document {
        id: Uuid::new_v4(),
        title: title.to_string(),
        page_count,
        uploaded_at: Utc::now(),
        filename: Some(title.to_string()),
    }
}

fn reply(content: &str, pages: &[u32]) -> ChatReply {
    let citations: Vec<Citation> = pages.iter().map(|p| Citation::new(*p)).collect();
    ChatReply {
        message: Message {
            id: MessageId::Remote(Uuid::new_v4()),
            role: Role::Assistant,
            content: content.to_string(),
            timestamp: Utc::now(),
            citations: citations.clone(),
            delivery: Delivery::Confirmed,
        },
        citations,
    }
}

struct Harness {
    workspace: Workspace,
    backend: Arc<FakeBackend>,
    renderer: Arc<FakeRenderer>,
    events: Arc<Events>,
}

async fn harness(documents: Vec<Document>) -> Harness {
    let backend = FakeBackend::with_documents(documents.clone());
    let renderer = Arc::new(FakeRenderer::default());
    for doc in &documents {
        renderer
            .page_counts
            .lock()
            .unwrap()
            .insert(doc.id, doc.page_count);
    }
    let events = Arc::new(Events::default());
    let mut workspace = Workspace::new(
        backend.clone(),
        renderer.clone(),
        Some(events.clone() as Arc<dyn SessionObserver>),
    );
    assert!(workspace.refresh_documents().await);
    Harness {
        workspace,
        backend,
        renderer,
        events,
    }
}

//=========================================================================================
// Flows
//=========================================================================================

#[tokio::test]
async fn clicking_either_citation_marker_jumps_the_viewer() {
    let doc = document("manual.pdf", 10);
    let mut h = harness(vec![doc.clone()]).await;
    assert!(h.workspace.select_document(doc.id).await);

    h.backend
        .push_reply(Ok(reply("See page 3 and also page 3 again", &[3])));
    assert!(h.workspace.send_message("Where is setup covered?").await);

    let session = h.workspace.active().unwrap();
    let rendered = session.chat().rendered();
    assert_eq!(rendered.len(), 2);
    let Body::Linked(spans) = &rendered[1].content.body else {
        panic!("assistant reply should carry page references");
    };
    let markers: Vec<u32> = spans
        .iter()
        .filter_map(|span| match span {
            Span::PageRef { page, .. } => Some(*page),
            Span::Text(_) => None,
        })
        .collect();
    assert_eq!(markers, vec![3, 3]);

    assert!(h.workspace.follow_citation(markers[1]).await);
    assert_eq!(h.workspace.cursor_position().page, 3);
    let session = h.workspace.active().unwrap();
    assert_eq!(session.viewer().page(), 3);
    assert_eq!(h.renderer.renders.lock().unwrap().last(), Some(&(doc.id, 3)));

    // Clicking the other marker for the same page changes nothing.
    assert!(!h.workspace.follow_citation(markers[0]).await);
}

#[tokio::test]
async fn switching_documents_resets_the_cursor_before_rendering() {
    let first = document("first.pdf", 12);
    let second = document("second.pdf", 4);
    let mut h = harness(vec![first.clone(), second.clone()]).await;

    h.workspace.select_document(first.id).await;
    h.workspace.navigate(Navigation::GoTo(7)).await;
    assert_eq!(h.workspace.cursor_position().page, 7);

    h.workspace.select_document(second.id).await;
    let position = h.workspace.cursor_position();
    assert_eq!(position.document, Some(second.id));
    assert_eq!(position.page, 1);

    let renders = h.renderer.renders.lock().unwrap().clone();
    let first_render_of_second = renders.iter().find(|(id, _)| *id == second.id);
    assert_eq!(first_render_of_second, Some(&(second.id, 1)));

    let log = h.events.log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec!["document:first.pdf", "page:7", "document:second.pdf"]
    );
}

#[tokio::test]
async fn failed_send_shows_the_fallback_reply() {
    let doc = document("notes.pdf", 2);
    let mut h = harness(vec![doc.clone()]).await;
    h.workspace.select_document(doc.id).await;

    h.backend
        .push_reply(Err(PortError::Transport("502 Bad Gateway".to_string())));
    h.workspace.send_message("Hello?").await;

    let chat = h.workspace.active().unwrap().chat();
    let messages = chat.timeline().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "Hello?");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, SEND_FAILURE_MESSAGE);
    assert!(messages[1].citations.is_empty());
    assert!(!chat.is_typing());
}

#[tokio::test]
async fn second_submit_is_ignored_until_the_first_completes() {
    let doc = document("paper.pdf", 8);
    let mut h = harness(vec![doc.clone()]).await;
    h.workspace.select_document(doc.id).await;

    let first = h.workspace.begin_send("first question").unwrap();
    assert!(h.workspace.begin_send("second question").is_none());

    // Navigation and citation clicks keep working while the send is in flight.
    assert!(h.workspace.navigate(Navigation::Next).await);
    assert!(h.workspace.follow_citation(5).await);

    assert!(h.workspace.complete_send(&first, Ok(reply("Answer on page 5.", &[5]))));
    let contents: Vec<String> = h
        .workspace
        .active()
        .unwrap()
        .chat()
        .timeline()
        .messages()
        .iter()
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(contents, vec!["first question", "Answer on page 5."]);
    assert!(h.workspace.begin_send("second question").is_some());
}

#[tokio::test]
async fn replies_for_a_closed_document_are_dropped() {
    let first = document("a.pdf", 3);
    let second = document("b.pdf", 3);
    let mut h = harness(vec![first.clone(), second.clone()]).await;

    h.workspace.select_document(first.id).await;
    let outgoing = h.workspace.begin_send("question about a").unwrap();
    h.workspace.select_document(second.id).await;

    assert!(!h.workspace.complete_send(&outgoing, Ok(reply("late answer", &[]))));
    let session = h.workspace.active().unwrap();
    assert!(session.chat().timeline().messages().is_empty());
    assert!(!session.chat().is_typing());
}

#[tokio::test]
async fn non_pdf_upload_never_reaches_the_backend() {
    let doc = document("existing.pdf", 1);
    let mut h = harness(vec![doc.clone()]).await;

    let result = h
        .workspace
        .upload(FileUpload {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: Bytes::from_static(b"hello"),
        })
        .await;

    assert!(result.is_err());
    assert_eq!(h.workspace.upload_error(), Some("Please upload a PDF file"));
    assert!(h.backend.uploads.lock().unwrap().is_empty());
    assert_eq!(h.workspace.library().documents(), &[doc]);
    assert!(h.workspace.active().is_none());
}

#[tokio::test]
async fn successful_upload_is_listed_first_and_opened() {
    let existing = document("existing.pdf", 1);
    let mut h = harness(vec![existing.clone()]).await;
    let uploaded = document("fresh.pdf", 6);
    h.renderer
        .page_counts
        .lock()
        .unwrap()
        .insert(uploaded.id, 6);
    *h.backend.upload_result.lock().unwrap() = Some(Ok(uploaded.clone()));

    h.workspace
        .upload(FileUpload {
            file_name: "fresh.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.7"),
        })
        .await
        .unwrap();

    assert_eq!(h.workspace.library().documents()[0].id, uploaded.id);
    assert!(h.workspace.is_active(uploaded.id));
    assert_eq!(h.workspace.upload_error(), None);
    let viewer = h.workspace.active().unwrap().viewer();
    assert_eq!(*viewer.state(), LoadState::Ready { page_count: 6 });
}

#[tokio::test]
async fn upload_after_a_failed_one_reaches_the_backend() {
    let mut h = harness(vec![]).await;
    let pdf = || FileUpload {
        file_name: "retry.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        bytes: Bytes::from_static(b"%PDF-1.7"),
    };

    *h.backend.upload_result.lock().unwrap() =
        Some(Err(PortError::Transport("connection reset".to_string())));
    let first = h.workspace.upload(pdf()).await;
    assert_eq!(first, Err(UploadError::Failed("Failed to upload file".to_string())));

    let uploaded = document("retry.pdf", 3);
    h.renderer.page_counts.lock().unwrap().insert(uploaded.id, 3);
    *h.backend.upload_result.lock().unwrap() = Some(Ok(uploaded.clone()));
    assert_eq!(h.workspace.upload(pdf()).await, Ok(()));

    assert_eq!(h.backend.uploads.lock().unwrap().len(), 2);
    assert_eq!(h.workspace.upload_error(), None);
    assert!(h.workspace.is_active(uploaded.id));
}

#[tokio::test]
async fn failed_upload_keeps_prior_state() {
    let existing = document("existing.pdf", 2);
    let mut h = harness(vec![existing.clone()]).await;
    h.workspace.select_document(existing.id).await;
    *h.backend.upload_result.lock().unwrap() =
        Some(Err(PortError::Rejected("Only PDF files are allowed".to_string())));

    let result = h
        .workspace
        .upload(FileUpload {
            file_name: "broken.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"not really"),
        })
        .await;

    assert!(result.is_err());
    assert_eq!(h.workspace.upload_error(), Some("Only PDF files are allowed"));
    assert_eq!(h.workspace.library().documents().len(), 1);
    assert!(h.workspace.is_active(existing.id));
}

#[tokio::test]
async fn viewer_load_failure_offers_retry() {
    let doc = document("missing.pdf", 5);
    let mut h = harness(vec![doc.clone()]).await;
    h.renderer.page_counts.lock().unwrap().remove(&doc.id);

    h.workspace.select_document(doc.id).await;
    let state = h.workspace.active().unwrap().viewer().state().clone();
    assert!(matches!(state, LoadState::Failed { .. }));
    assert!(h.renderer.renders.lock().unwrap().is_empty());

    h.renderer.page_counts.lock().unwrap().insert(doc.id, 5);
    h.workspace.retry_load().await;
    let viewer = h.workspace.active().unwrap().viewer();
    assert_eq!(*viewer.state(), LoadState::Ready { page_count: 5 });
    assert_eq!(h.renderer.renders.lock().unwrap().as_slice(), &[(doc.id, 1)]);
}

#[tokio::test]
async fn out_of_range_citations_are_clamped_to_the_last_page() {
    let doc = document("short.pdf", 4);
    let mut h = harness(vec![doc.clone()]).await;
    h.workspace.select_document(doc.id).await;

    assert!(h.workspace.follow_citation(40).await);
    assert_eq!(h.workspace.cursor_position().page, 4);
    assert_eq!(h.workspace.active().unwrap().viewer().page(), 4);
}

#[tokio::test]
async fn history_is_restored_when_a_document_opens() {
    let doc = document("history.pdf", 3);
    let h = harness(vec![doc.clone()]).await;
    let Harness {
        mut workspace,
        backend,
        ..
    } = h;
    backend.histories.lock().unwrap().insert(
        doc.id,
        vec![Message {
            id: MessageId::Remote(Uuid::new_v4()),
            role: Role::Assistant,
            content: "Earlier answer citing page 2.".to_string(),
            timestamp: Utc::now(),
            citations: vec![Citation::new(2)],
            delivery: Delivery::Confirmed,
        }],
    );

    workspace.select_document(doc.id).await;
    let rendered = workspace.active().unwrap().chat().rendered();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].content.page_refs(), vec![2]);
}

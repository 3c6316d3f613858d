//! services/client/src/adapters/http.rs
//!
//! This module contains the adapter for the backend REST API.
//! It implements the `DocumentService` port from the `core` crate using `reqwest`.

use crate::adapters::wire::{
    ChatMessageRecord, ChatRequest, ChatResponse, DocumentRecord, ErrorBody,
};
use async_trait::async_trait;
use pdf_chat_core::domain::{
    ChatReply, Citation, Document, DocumentId, DocumentLocator, FileUpload, Message,
};
use pdf_chat_core::ports::{DocumentService, PortError, PortResult};
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentService` against the backend's JSON API.
#[derive(Clone)]
pub struct HttpDocumentService {
    client: Client,
    base_url: String,
}

impl HttpDocumentService {
    /// Creates a new `HttpDocumentService`. `base_url` is the API root, e.g.
    /// `http://localhost:8001/api`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Where the PDF bytes of a document are served.
    pub fn source_url(&self, document_id: DocumentId) -> String {
        self.endpoint(&format!("serve-pdf/{}/", document_id))
    }
}

//=========================================================================================
// Response Helpers
//=========================================================================================

pub(crate) fn transport(e: reqwest::Error) -> PortError {
    PortError::Transport(e.to_string())
}

/// Turns a non-success response into the matching `PortError`, keeping the
/// backend's `{"error": ...}` message when there is one.
pub(crate) async fn check_status(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error)
        .ok();

    Err(match (status, message) {
        (StatusCode::NOT_FOUND, Some(message)) => PortError::NotFound(message),
        (StatusCode::NOT_FOUND, None) => PortError::NotFound(url),
        (_, Some(message)) => PortError::Rejected(message),
        (_, None) => PortError::Transport(format!("{} returned HTTP {}", url, status)),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Unexpected(format!("Malformed response: {}", e)))
}

//=========================================================================================
// `DocumentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn list_documents(&self) -> PortResult<Vec<Document>> {
        let response = self
            .client
            .get(self.endpoint("documents/"))
            .send()
            .await
            .map_err(transport)?;
        let records: Vec<DocumentRecord> = read_json(response).await?;
        Ok(records.into_iter().map(Document::from).collect())
    }

    async fn upload_document(&self, file: FileUpload) -> PortResult<Document> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        debug!("POST upload/ '{}'", file.file_name);
        let response = self
            .client
            .post(self.endpoint("upload/"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let record: DocumentRecord = read_json(response).await?;
        Ok(record.into())
    }

    async fn get_chat_history(&self, document_id: DocumentId) -> PortResult<Vec<Message>> {
        let response = self
            .client
            .get(self.endpoint(&format!("documents/{}/chat/", document_id)))
            .send()
            .await
            .map_err(transport)?;
        let records: Vec<ChatMessageRecord> = read_json(response).await?;
        Ok(records.into_iter().map(Message::from).collect())
    }

    async fn send_chat_message(&self, document_id: DocumentId, text: &str) -> PortResult<ChatReply> {
        let request = ChatRequest {
            message: text,
            document_id,
        };
        let response = self
            .client
            .post(self.endpoint("chat/"))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let body: ChatResponse = read_json(response).await?;

        Ok(ChatReply {
            message: body.response.into(),
            citations: body.citations.into_iter().map(Citation::from).collect(),
        })
    }

    async fn resolve_document_source(&self, document_id: DocumentId) -> PortResult<DocumentLocator> {
        Ok(DocumentLocator {
            document_id,
            url: self.source_url(document_id),
        })
    }
}

//! crates/pdf_chat_core/src/library.rs
//!
//! The list of uploaded documents.

use crate::domain::{Document, DocumentId};
use crate::ports::DocumentService;
use tracing::{error, info};

#[derive(Debug, Default)]
pub struct DocumentLibrary {
    documents: Vec<Document>,
}

impl DocumentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn replace(&mut self, documents: Vec<Document>) {
        self.documents = documents;
    }

    /// Fetches the list. On failure the current list is kept and `false` returned.
    pub async fn refresh(&mut self, service: &dyn DocumentService) -> bool {
        match service.list_documents().await {
            Ok(documents) => {
                info!("Fetched {} documents.", documents.len());
                self.replace(documents);
                true
            }
            Err(e) => {
                error!("Error fetching documents: {}", e);
                false
            }
        }
    }

    /// New uploads go to the top of the list.
    pub fn insert_uploaded(&mut self, document: Document) {
        self.documents.retain(|doc| doc.id != document.id);
        self.documents.insert(0, document);
    }
}

/// The secondary line shown under a document title.
pub fn summary(document: &Document) -> String {
    format!(
        "{} pages • {}",
        document.page_count,
        document.uploaded_at.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn document(title: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            title: title.to_string(),
            page_count: 7,
            uploaded_at: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
            filename: None,
        }
    }

    #[test]
    fn uploads_are_prepended_without_duplicates() {
        let mut library = DocumentLibrary::new();
        let a = document("a.pdf");
        let b = document("b.pdf");
        library.replace(vec![a.clone()]);

        library.insert_uploaded(b.clone());
        library.insert_uploaded(a.clone());

        let titles: Vec<&str> = library.documents().iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["a.pdf", "b.pdf"]);
        assert_eq!(library.get(b.id), Some(&b));
    }

    #[test]
    fn summary_shows_pages_and_date() {
        assert_eq!(summary(&document("x.pdf")), "7 pages • 2024-03-09");
    }
}

//! crates/pdf_chat_core/src/citation.rs
//!
//! Turns assistant text plus its citation list into a sequence of typed spans.
//! Every "page N" phrase belonging to a citation becomes an inert page-reference
//! span carrying the page number; everything else stays plain text. Nothing here
//! produces markup, so presentation layers decide how a reference looks.

use crate::domain::Citation;
use regex::Regex;
use std::collections::HashSet;

/// One piece of rendered message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    /// A clickable reference. `source` is the phrase it replaced, kept so the
    /// original text can be reproduced.
    PageRef { page: u32, source: String },
}

impl Span {
    /// The text shown for this span.
    pub fn label(&self) -> String {
        match self {
            Span::Text(text) => text.clone(),
            Span::PageRef { page, .. } => format!("Page {}", page),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Content rendered without any structural wrapping.
    Plain(String),
    Linked(Vec<Span>),
}

/// Message content ready for presentation.
///
/// The inline spans and the citation list are independent renderings of the same
/// citation set: a citation whose phrase never occurs inline still appears in
/// `citations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub body: Body,
    pub citations: Vec<Citation>,
}

impl RenderedContent {
    /// Content without citation processing.
    pub fn plain(content: &str) -> Self {
        Self {
            body: Body::Plain(content.to_string()),
            citations: Vec::new(),
        }
    }

    /// Reassembles the original content.
    pub fn plain_text(&self) -> String {
        match &self.body {
            Body::Plain(text) => text.clone(),
            Body::Linked(spans) => spans
                .iter()
                .map(|span| match span {
                    Span::Text(text) => text.as_str(),
                    Span::PageRef { source, .. } => source.as_str(),
                })
                .collect(),
        }
    }

    /// Page numbers of the inline references, in reading order.
    pub fn page_refs(&self) -> Vec<u32> {
        match &self.body {
            Body::Plain(_) => Vec::new(),
            Body::Linked(spans) => spans
                .iter()
                .filter_map(|span| match span {
                    Span::PageRef { page, .. } => Some(*page),
                    Span::Text(_) => None,
                })
                .collect(),
        }
    }

    /// The "References" list: citations deduplicated by page, first occurrence wins.
    pub fn references(&self) -> Vec<&Citation> {
        let mut seen = HashSet::new();
        self.citations
            .iter()
            .filter(|citation| seen.insert(citation.page))
            .collect()
    }
}

/// Renders `content` against `citations`.
///
/// Citations are applied in the given order and each one replaces every match of
/// its pattern in the text that is still plain. References already produced are
/// never rescanned. With no citations the content comes back untouched.
pub fn render_content(content: &str, citations: &[Citation]) -> RenderedContent {
    if citations.is_empty() {
        return RenderedContent::plain(content);
    }

    let mut spans = vec![Span::Text(content.to_string())];
    for citation in citations {
        // Page 0 cannot be navigated to.
        if citation.page == 0 {
            continue;
        }
        let pattern = citation.pattern();
        spans = spans
            .into_iter()
            .flat_map(|span| split_span(span, &pattern, citation.page))
            .collect();
    }

    RenderedContent {
        body: Body::Linked(spans),
        citations: citations.to_vec(),
    }
}

fn split_span(span: Span, pattern: &Regex, page: u32) -> Vec<Span> {
    let text = match span {
        Span::Text(text) => text,
        page_ref => return vec![page_ref],
    };

    let mut out = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(&text) {
        if found.start() > last {
            out.push(Span::Text(text[last..found.start()].to_string()));
        }
        out.push(Span::PageRef {
            page,
            source: found.as_str().to_string(),
        });
        last = found.end();
    }

    if out.is_empty() {
        return vec![Span::Text(text)];
    }
    if last < text.len() {
        out.push(Span::Text(text[last..].to_string()));
    }
    out
}

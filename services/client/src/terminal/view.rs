//! services/client/src/terminal/view.rs
//!
//! Plain-text rendering of the workspace. Page references are drawn as numbered
//! markers (`[1:Page 4]`) so they can be clicked with `cite <n>`.

use pdf_chat_core::library::{summary, DocumentLibrary};
use pdf_chat_core::{
    Body, Delivery, DocumentViewer, LoadState, RenderedMessage, Role, Span, Workspace,
};
use std::fmt::Write;

pub fn library(library: &DocumentLibrary) -> String {
    if library.is_empty() {
        return "No documents yet. Use `upload <path>` to add a PDF.".to_string();
    }
    let mut out = String::from("Documents:\n");
    for (index, document) in library.documents().iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {}  ({})",
            index + 1,
            document.title,
            summary(document)
        );
    }
    out
}

/// The pages a `cite <n>` can reach in `message`: the inline markers in reading
/// order, followed by the reference list.
pub fn citation_targets(message: &RenderedMessage) -> Vec<u32> {
    let mut targets = message.content.page_refs();
    targets.extend(message.content.references().iter().map(|c| c.page));
    targets
}

/// The last assistant message, which `cite` refers to.
pub fn last_reply(messages: &[RenderedMessage]) -> Option<&RenderedMessage> {
    messages.iter().rev().find(|m| m.role == Role::Assistant)
}

fn message(out: &mut String, message: &RenderedMessage, numbered: bool) {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let status = match message.delivery {
        Delivery::Pending => " (sending…)",
        Delivery::Failed => " (not delivered)",
        Delivery::Confirmed | Delivery::Fallback => "",
    };
    let _ = write!(out, "[{}] {}{}: ", message.timestamp.format("%H:%M"), speaker, status);

    let mut marker = 0;
    match &message.content.body {
        Body::Plain(text) => out.push_str(text),
        Body::Linked(spans) => {
            for span in spans {
                match span {
                    Span::Text(text) => out.push_str(text),
                    Span::PageRef { .. } if numbered => {
                        marker += 1;
                        let _ = write!(out, "[{}:{}]", marker, span.label());
                    }
                    Span::PageRef { .. } => {
                        let _ = write!(out, "[{}]", span.label());
                    }
                }
            }
        }
    }
    out.push('\n');

    let references = message.content.references();
    if !references.is_empty() {
        out.push_str("    References:");
        for citation in references {
            if numbered {
                marker += 1;
                let _ = write!(out, " [{}:{}]", marker, citation.text);
            } else {
                let _ = write!(out, " [{}]", citation.text);
            }
        }
        out.push('\n');
    }
}

/// The conversation. Only the last assistant reply gets clickable markers.
pub fn transcript(messages: &[RenderedMessage], typing: bool) -> String {
    let mut out = String::new();
    if messages.is_empty() {
        out.push_str("No messages yet. Ask something about this document.\n");
    }
    let clickable = last_reply(messages).map(|m| m.id);
    for entry in messages {
        message(&mut out, entry, Some(entry.id) == clickable);
    }
    if typing {
        out.push_str("assistant is typing…\n");
    }
    out
}

pub fn viewer(viewer: &DocumentViewer) -> String {
    let mut out = String::new();
    match viewer.state() {
        LoadState::Loading => out.push_str("Loading PDF…\n"),
        LoadState::Failed { message } => {
            let _ = writeln!(out, "{} (type `retry` to try again)", message);
        }
        LoadState::Ready { .. } => {
            let _ = writeln!(out, "{}  zoom {}", viewer.page_label(), viewer.zoom().label());
            if let Some(error) = viewer.page_error() {
                let _ = writeln!(out, "{}", error);
            }
            let thumbnails = viewer.thumbnails();
            if !thumbnails.is_empty() {
                let strip: Vec<String> = thumbnails
                    .iter()
                    .map(|t| {
                        if t.active {
                            format!("[{}]", t.page)
                        } else {
                            t.page.to_string()
                        }
                    })
                    .collect();
                let _ = writeln!(out, "Pages: {}", strip.join(" "));
            }
        }
    }
    out
}

/// The whole screen.
pub fn screen(workspace: &Workspace) -> String {
    let mut out = String::new();
    if let Some(error) = workspace.upload_error() {
        let _ = writeln!(out, "Upload failed: {}", error);
    }
    match workspace.active() {
        None => out.push_str(&library(workspace.library())),
        Some(session) => {
            let _ = writeln!(out, "== {} ==", session.document().title);
            out.push_str(&viewer(session.viewer()));
            out.push_str("--\n");
            out.push_str(&transcript(
                &session.chat().rendered(),
                session.chat().is_typing(),
            ));
        }
    }
    out
}

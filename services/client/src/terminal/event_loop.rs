//! services/client/src/terminal/event_loop.rs
//!
//! The main control loop of the terminal client.
//!
//! Input lines and chat replies are awaited together, so page navigation and
//! citation clicks keep working while a reply is outstanding. At most one send
//! is in flight; the timeline refuses a second one until the first settles.

use crate::error::ClientError;
use crate::terminal::command::{self, Command, HELP};
use crate::terminal::view;
use bytes::Bytes;
use pdf_chat_core::{
    ChatReply, FileUpload, Navigation, OutgoingMessage, PortError, PortResult, Workspace,
};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A chat message whose reply is still being awaited.
struct PendingSend {
    outgoing: OutgoingMessage,
    handle: JoinHandle<PortResult<ChatReply>>,
}

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Reads a file from disk as an upload. The content type is guessed from the
/// extension; validation happens in the workspace.
pub async fn load_upload(path: &Path) -> Result<FileUpload, ClientError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    let content_type = if is_pdf {
        "application/pdf"
    } else {
        "application/octet-stream"
    };

    Ok(FileUpload {
        file_name,
        content_type: content_type.to_string(),
        bytes: Bytes::from(bytes),
    })
}

async fn next_reply(pending: &mut Option<PendingSend>) -> Option<(OutgoingMessage, PortResult<ChatReply>)> {
    let send = pending.as_mut()?;
    let result = match (&mut send.handle).await {
        Ok(result) => result,
        Err(e) => Err(PortError::Unexpected(format!("chat task failed: {}", e))),
    };
    let send = pending.take()?;
    Some((send.outgoing, result))
}

pub struct Terminal<W: Write> {
    workspace: Workspace,
    out: W,
    pending: Option<PendingSend>,
}

impl<W: Write> Terminal<W> {
    pub fn new(workspace: Workspace, out: W) -> Self {
        Self {
            workspace,
            out,
            pending: None,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs until `quit` or the end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R) -> Result<(), ClientError> {
        if !self.workspace.refresh_documents().await {
            writeln!(self.out, "Could not reach the document service; `list` retries.")?;
        }
        writeln!(self.out, "{}", view::screen(&self.workspace))?;
        writeln!(self.out, "Type `help` for commands.")?;

        let mut lines = input.lines();
        loop {
            tokio::select! {
                reply = next_reply(&mut self.pending), if self.pending.is_some() => {
                    if let Some((outgoing, result)) = reply {
                        self.deliver(&outgoing, result)?;
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Input closed.");
                        break;
                    };
                    if self.handle_line(&line).await? == Flow::Quit {
                        break;
                    }
                }
            }
        }

        if let Some(send) = self.pending.take() {
            warn!("Abandoning the reply to message {}.", send.outgoing.message_id);
            send.handle.abort();
        }
        Ok(())
    }

    /// Parses and executes one input line.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow, ClientError> {
        match command::parse(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                writeln!(self.out, "{}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow, ClientError> {
        debug!("Executing {:?}", command);
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                writeln!(self.out, "{}", HELP)?;
                return Ok(Flow::Continue);
            }
            Command::List => {
                if !self.workspace.refresh_documents().await {
                    writeln!(self.out, "Could not load the document list.")?;
                }
                writeln!(self.out, "{}", view::library(self.workspace.library()))?;
                return Ok(Flow::Continue);
            }
            Command::Open(n) => {
                let id = self
                    .workspace
                    .library()
                    .documents()
                    .get(n.wrapping_sub(1))
                    .map(|document| document.id);
                match id {
                    Some(id) => {
                        if !self.workspace.select_document(id).await {
                            writeln!(self.out, "Could not open that document.")?;
                        }
                    }
                    None => writeln!(self.out, "There is no document {}.", n)?,
                }
            }
            Command::Upload(path) => match load_upload(&path).await {
                Ok(file) => {
                    if let Err(e) = self.workspace.upload(file).await {
                        debug!("Upload rejected: {}", e);
                    }
                }
                Err(e) => writeln!(self.out, "Could not read {}: {}", path.display(), e)?,
            },
            Command::Ask(text) => self.ask(&text)?,
            Command::Cite(n) => self.cite(n).await?,
            Command::Next => {
                self.workspace.navigate(Navigation::Next).await;
            }
            Command::Prev => {
                self.workspace.navigate(Navigation::Previous).await;
            }
            Command::Page(page) => {
                self.workspace.navigate(Navigation::GoTo(page)).await;
            }
            Command::ZoomIn => {
                self.workspace.zoom_in().await;
            }
            Command::ZoomOut => {
                self.workspace.zoom_out().await;
            }
            Command::Retry => self.workspace.retry_load().await,
            Command::Show => {}
            Command::Close => self.workspace.close_document(),
        }

        self.workspace.refresh_view().await;
        writeln!(self.out, "{}", view::screen(&self.workspace))?;
        Ok(Flow::Continue)
    }

    fn ask(&mut self, text: &str) -> Result<(), ClientError> {
        if self.workspace.active().is_none() {
            writeln!(self.out, "Open a document first.")?;
            return Ok(());
        }
        let Some(outgoing) = self.workspace.begin_send(text) else {
            writeln!(self.out, "Still waiting for the previous reply.")?;
            return Ok(());
        };

        let service = self.workspace.service();
        let document_id = outgoing.document_id;
        let message = outgoing.text.clone();
        let handle = tokio::spawn(async move {
            service.send_chat_message(document_id, &message).await
        });
        // A reply still owed to a document that was closed since.
        if let Some(stale) = self.pending.replace(PendingSend { outgoing, handle }) {
            warn!("Abandoning the reply to message {}.", stale.outgoing.message_id);
            stale.handle.abort();
        }
        Ok(())
    }

    async fn cite(&mut self, n: usize) -> Result<(), ClientError> {
        let page = self.workspace.active().and_then(|session| {
            let messages = session.chat().rendered();
            view::last_reply(&messages)
                .and_then(|reply| view::citation_targets(reply).get(n.wrapping_sub(1)).copied())
        });
        match page {
            Some(page) => {
                self.workspace.follow_citation(page).await;
            }
            None => writeln!(self.out, "The last reply has no page marker {}.", n)?,
        }
        Ok(())
    }

    fn deliver(&mut self, outgoing: &OutgoingMessage, result: PortResult<ChatReply>) -> Result<(), ClientError> {
        if let Err(e) = &result {
            error!("Chat request failed: {}", e);
        }
        if self.workspace.complete_send(outgoing, result) {
            writeln!(self.out, "{}", view::screen(&self.workspace))?;
        }
        Ok(())
    }

    /// Waits for the outstanding reply, if any, and delivers it.
    pub async fn settle(&mut self) -> Result<bool, ClientError> {
        match next_reply(&mut self.pending).await {
            Some((outgoing, result)) => {
                self.deliver(&outgoing, result)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

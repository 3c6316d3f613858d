pub mod chat;
pub mod citation;
pub mod cursor;
pub mod domain;
pub mod library;
pub mod ports;
pub mod timeline;
pub mod upload;
pub mod viewer;
pub mod workspace;

pub use citation::{render_content, Body, RenderedContent, Span};
pub use cursor::{CursorPosition, PageCursor, PageHandle};
pub use domain::{
    ChatReply, Citation, Delivery, Document, DocumentId, DocumentLocator, FileUpload, Message,
    MessageId, Role,
};
pub use ports::{DocumentService, PageRenderer, PortError, PortResult, SessionObserver};
pub use timeline::{OutgoingMessage, RenderedMessage, Timeline, SEND_FAILURE_MESSAGE};
pub use upload::UploadError;
pub use viewer::{DocumentViewer, LoadState, Navigation, Zoom};
pub use workspace::{ActiveSession, Workspace};

pub mod http;
pub mod pdf;
pub mod wire;

pub use http::HttpDocumentService;
pub use pdf::HttpPdfRenderer;

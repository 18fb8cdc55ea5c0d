//! Helper utilities for assembling multi-page PDF documents from HTML fragments.
//!
//! The crate wraps a PDF rendering engine behind a small façade: [`DocumentBuilder`]
//! configures document metadata, margins and fonts; [`Document`] appends blank or
//! HTML-filled pages and finalizes the result to a file or to bytes.  The engine contract
//! lives in [`engine::RenderEngine`], with [`engine::PrintpdfEngine`] as the production
//! implementation.
//!
//! ```no_run
//! use html_pdf_helper::{DocumentBuilder, Orientation};
//!
//! # fn main() -> Result<(), html_pdf_helper::Error> {
//! let mut document = DocumentBuilder::new(Orientation::Portrait, "Jane Doe", "Invoice 42")
//!     .with_subject("March")
//!     .build()?;
//! document.add_html_page("<h1>Invoice 42</h1><p>Total: 1337.00</p>")?;
//! document.output_file("invoice.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod encoding;
pub mod engine;
pub mod error;

// Re-exports for convenience
pub use config::EngineConfig;
pub use document::{Document, DocumentBuilder};
pub use engine::{Orientation, OutputMode, PrintpdfEngine, RenderEngine};
pub use error::Error;

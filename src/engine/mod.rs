//! Rendering-engine abstraction.
//!
//! [`RenderEngine`] captures the contract the [`crate::Document`] façade requires from a PDF
//! rendering engine: metadata and margin setters, font configuration, page appends, HTML
//! rendering onto the current page, and a finalize operation.  The production implementation
//! is [`PrintpdfEngine`]; tests drive the façade through a recording implementation instead.

use std::path::Path;

use crate::error::Error;

pub mod printpdf;

pub use self::printpdf::PrintpdfEngine;

/// Page orientation for generated documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height.
    Landscape,
}

impl Orientation {
    /// Applies the orientation to portrait page dimensions.
    pub fn effective_dimensions(self, width: f64, height: f64) -> (f64, f64) {
        match self {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        }
    }
}

/// How a finalized document is delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Write the serialized document to the destination path.
    #[default]
    File,
    /// Hand the serialized bytes back for inline delivery, e.g. an HTTP response body
    /// served as `application/pdf`.
    Inline,
    /// Hand the serialized bytes back for delivery as a downloadable attachment; the
    /// disposition header itself is the transport layer's concern.
    Download,
}

/// Contract required from a PDF rendering engine.
///
/// Plain setters configure engine state and cannot fail; operations that touch I/O or the
/// rendering pipeline return a [`Result`] whose errors pass through to the caller
/// unmodified.  One instance corresponds to one document and is driven by a single thread.
pub trait RenderEngine {
    /// Sets the creator tag in the document properties.
    fn set_creator(&mut self, creator: &str);

    /// Sets the author in the document properties.
    fn set_author(&mut self, author: &str);

    /// Sets the title in the document properties.
    fn set_title(&mut self, title: &str);

    /// Sets the subject in the document properties.
    fn set_subject(&mut self, subject: &str);

    /// Sets the left, top and right page margins, in units.
    fn set_margins(&mut self, left: f64, top: f64, right: f64);

    /// Overrides the top margin only.
    fn set_top_margin(&mut self, margin: f64);

    /// Sets the header margin.
    fn set_header_margin(&mut self, margin: f64);

    /// Sets the footer margin.
    fn set_footer_margin(&mut self, margin: f64);

    /// Sets the default font used for page content.
    fn set_font(&mut self, family: &str, size: u32) -> Result<(), Error>;

    /// Sets the default monospaced font family.
    fn set_default_monospaced_font(&mut self, family: &str);

    /// Sets the font used for header lines.
    fn set_header_font(&mut self, family: &str, size: u32);

    /// Sets the font used for footer data.
    fn set_footer_font(&mut self, family: &str, size: u32);

    /// Sets the scale ratio applied when sizing raster images from pixel dimensions.
    fn set_image_scale(&mut self, ratio: f64);

    /// Toggles automatic pagination when content overflows a page.
    ///
    /// `bottom_margin` is the break-trigger threshold and is only meaningful while
    /// `enabled` is true.
    fn set_auto_page_break(&mut self, enabled: bool, bottom_margin: f64);

    /// Stores the header content: logo path, logo cell height and two text lines.
    fn set_header_data(&mut self, logo: &Path, logo_height: f64, line1: &str, line2: &str);

    /// Enables or disables header printing on subsequently appended pages.
    fn set_print_header(&mut self, enabled: bool);

    /// Appends a new blank page and moves the page cursor to it.
    fn add_page(&mut self) -> Result<(), Error>;

    /// Renders an HTML fragment onto the current page at the current cursor position,
    /// with automatic line breaking across the remaining page width.  Afterwards the
    /// cursor points at the last page of the document.
    ///
    /// Fails if no page has been appended yet.
    fn write_html(&mut self, html: &str) -> Result<(), Error>;

    /// Moves the page cursor to the last page of the document.
    fn last_page(&mut self);

    /// Number of pages appended so far.
    fn page_count(&self) -> usize;

    /// Finalizes the document.
    ///
    /// [`OutputMode::File`] serializes to `path` and returns `None`; the other modes
    /// return the serialized bytes for the caller to deliver.
    fn output(&mut self, path: &Path, mode: OutputMode) -> Result<Option<Vec<u8>>, Error>;
}

#[cfg(test)]
mod tests {
    use super::Orientation;

    #[test]
    fn orientation_swaps_dimensions() {
        assert_eq!(
            Orientation::Portrait.effective_dimensions(210.0, 297.0),
            (210.0, 297.0)
        );
        assert_eq!(
            Orientation::Landscape.effective_dimensions(210.0, 297.0),
            (297.0, 210.0)
        );
    }
}

//! Production rendering engine backed by `printpdf`'s HTML renderer.
//!
//! The engine keeps the document as a list of logical pages, each holding the HTML
//! fragments written onto it plus a snapshot of the page-level settings (header content,
//! top margin, page-break behavior) taken when the page was appended.  Changing a setting
//! therefore affects pages appended afterwards, never retroactively.  The single expensive
//! engine call happens at [`RenderEngine::output`] time: the pages are assembled into one
//! HTML document and handed to [`PdfDocument::from_html`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use printpdf::{GeneratePdfOptions, PdfDocument, PdfSaveOptions, PdfWarnMsg};

use crate::config::EngineConfig;
use crate::encoding;
use crate::engine::{Orientation, OutputMode, RenderEngine};
use crate::error::Error;

/// Header content shared by every page appended while header printing is on.
#[derive(Clone, Debug, PartialEq)]
struct HeaderData {
    logo: PathBuf,
    logo_height: f64,
    line1: String,
    line2: String,
}

/// One logical page and the settings it was appended under.
#[derive(Clone, Debug, Default)]
struct PageState {
    fragments: Vec<String>,
    header: Option<HeaderData>,
    top_margin: f64,
    /// Bottom padding reserved for the break threshold; zero when breaks are off.
    bottom_margin: f64,
    auto_break: bool,
}

/// [`RenderEngine`] implementation delegating layout and serialization to `printpdf`.
pub struct PrintpdfEngine {
    config: EngineConfig,
    orientation: Orientation,
    creator: String,
    author: String,
    title: String,
    subject: String,
    margin_left: f64,
    margin_top: f64,
    margin_right: f64,
    header_margin: f64,
    footer_margin: f64,
    font_family: String,
    font_size: u32,
    monospaced_font: String,
    header_font: (String, u32),
    footer_font: (String, u32),
    image_scale: f64,
    auto_break: bool,
    break_margin: f64,
    print_header: bool,
    header: Option<HeaderData>,
    pages: Vec<PageState>,
    cursor: usize,
}

impl PrintpdfEngine {
    /// Creates an engine for one document.
    ///
    /// Initialization forces the process-wide text encoding to UTF-8, the only encoding the
    /// HTML renderer consumes, and does not put the previous value back.  Callers that need
    /// the prior value restored should capture it beforehand; the [`crate::Document`]
    /// façade does exactly that.
    pub fn new(orientation: Orientation, config: EngineConfig) -> Self {
        encoding::set_internal_encoding(encoding::DEFAULT_ENCODING);

        let monospaced_font = config.monospaced_font.clone();
        let header_font = (config.header_font.clone(), config.header_font_size);
        let footer_font = (config.footer_font.clone(), config.footer_font_size);

        Self {
            config,
            orientation,
            creator: String::new(),
            author: String::new(),
            title: String::new(),
            subject: String::new(),
            margin_left: 0.0,
            margin_top: 0.0,
            margin_right: 0.0,
            header_margin: 0.0,
            footer_margin: 0.0,
            font_family: "helvetica".to_string(),
            font_size: 10,
            monospaced_font,
            header_font,
            footer_font,
            image_scale: 1.0,
            auto_break: true,
            break_margin: 0.0,
            print_header: false,
            header: None,
            pages: Vec::new(),
            cursor: 0,
        }
    }

    /// The configuration this engine was instantiated with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The configured raster-image scale ratio.
    ///
    /// The HTML renderer derives image sizes itself, so this engine only records the
    /// ratio for callers that size images through the escape-hatch handle.
    pub fn image_scale(&self) -> f64 {
        self.image_scale
    }

    /// Effective page dimensions in millimetres, orientation applied.
    fn page_dimensions(&self) -> (f64, f64) {
        let (width, height) = self.config.page_dimensions_mm();
        self.orientation.effective_dimensions(width, height)
    }

    /// Assembles the accumulated pages into the HTML document handed to the renderer.
    fn document_html(&self) -> Result<String, Error> {
        let (_, page_height) = self.page_dimensions();

        let mut body = String::new();
        for (index, page) in self.pages.iter().enumerate() {
            let mut style = format!(
                "padding: {top}mm {right}mm {bottom}mm {left}mm; box-sizing: border-box;",
                top = page.top_margin,
                right = self.margin_right,
                bottom = page.bottom_margin,
                left = self.margin_left,
            );
            if !page.auto_break {
                // Content written onto a fixed page must not spill onto a new one.
                style.push_str(&format!(
                    " height: {page_height}mm; overflow: hidden;"
                ));
            }
            if index + 1 < self.pages.len() {
                style.push_str(" page-break-after: always;");
            }

            body.push_str(&format!("<div class=\"page\" style=\"{style}\">"));
            if let Some(header) = &page.header {
                body.push_str(&self.header_html(header)?);
            }
            for fragment in &page.fragments {
                body.push_str(fragment);
            }
            body.push_str(&self.footer_html(index + 1, self.pages.len()));
            body.push_str("</div>");
        }

        Ok(format!(
            "<!DOCTYPE html><html><head><style>\
             body {{ margin: 0; font-family: '{family}'; font-size: {size}pt; }}\
             pre, code {{ font-family: '{mono}'; }}\
             </style></head><body>{body}</body></html>",
            family = self.font_family,
            size = self.font_size,
            mono = self.monospaced_font,
        ))
    }

    /// Markup for the header block printed at the top of a page.
    fn header_html(&self, header: &HeaderData) -> Result<String, Error> {
        let logo = self.logo_data_uri(&header.logo)?;
        let (family, size) = &self.header_font;
        Ok(format!(
            "<div class=\"page-header\" style=\"font-family: '{family}'; font-size: {size}pt; \
             margin-bottom: {margin}mm;\">\
             <img src=\"{logo}\" style=\"height: {height}mm;\" alt=\"\" />\
             <div>{line1}</div><div>{line2}</div></div>",
            margin = self.header_margin,
            height = header.logo_height,
            line1 = escape_html(&header.line1),
            line2 = escape_html(&header.line2),
        ))
    }

    /// Markup for the page-number footer printed on every page.
    fn footer_html(&self, page_number: usize, total: usize) -> String {
        let (family, size) = &self.footer_font;
        format!(
            "<div class=\"page-footer\" style=\"font-family: '{family}'; font-size: {size}pt; \
             margin-top: {margin}mm;\">Page {page_number} / {total}</div>",
            margin = self.footer_margin,
        )
    }

    /// Reads the logo file and embeds it as a base64 data URI.
    fn logo_data_uri(&self, path: &Path) -> Result<String, Error> {
        let bytes = fs::read(path)?;
        let mime = image::guess_format(&bytes)
            .map_err(|err| Error::Engine(err.to_string()))?
            .to_mime_type();
        Ok(format!("data:{mime};base64,{}", BASE64_STD.encode(&bytes)))
    }

    /// Runs the renderer over the assembled document and serializes the result.
    fn render(&self) -> Result<Vec<u8>, Error> {
        let html = self.document_html()?;
        let (page_width, page_height) = self.page_dimensions();

        let options = GeneratePdfOptions {
            page_width: Some(page_width as f32),
            page_height: Some(page_height as f32),
            ..GeneratePdfOptions::default()
        };

        let images = BTreeMap::new();
        let fonts = BTreeMap::new();
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();

        let mut doc = PdfDocument::from_html(&html, &images, &fonts, &options, &mut warnings)
            .map_err(|err| Error::Engine(err.to_string()))?;
        for warning in &warnings {
            log::warn!("renderer warning: {warning:?}");
        }

        doc.metadata.info.document_title = self.title.clone();
        doc.metadata.info.author = self.author.clone();
        doc.metadata.info.creator = self.creator.clone();
        doc.metadata.info.subject = self.subject.clone();

        let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
        log::debug!(
            "rendered {} logical pages into {} bytes",
            self.pages.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

impl RenderEngine for PrintpdfEngine {
    fn set_creator(&mut self, creator: &str) {
        self.creator = creator.to_string();
    }

    fn set_author(&mut self, author: &str) {
        self.author = author.to_string();
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_subject(&mut self, subject: &str) {
        self.subject = subject.to_string();
    }

    fn set_margins(&mut self, left: f64, top: f64, right: f64) {
        self.margin_left = left;
        self.margin_top = top;
        self.margin_right = right;
    }

    fn set_top_margin(&mut self, margin: f64) {
        self.margin_top = margin;
    }

    fn set_header_margin(&mut self, margin: f64) {
        self.header_margin = margin;
    }

    fn set_footer_margin(&mut self, margin: f64) {
        self.footer_margin = margin;
    }

    fn set_font(&mut self, family: &str, size: u32) -> Result<(), Error> {
        self.font_family = family.to_string();
        self.font_size = size;
        Ok(())
    }

    fn set_default_monospaced_font(&mut self, family: &str) {
        self.monospaced_font = family.to_string();
    }

    fn set_header_font(&mut self, family: &str, size: u32) {
        self.header_font = (family.to_string(), size);
    }

    fn set_footer_font(&mut self, family: &str, size: u32) {
        self.footer_font = (family.to_string(), size);
    }

    fn set_image_scale(&mut self, ratio: f64) {
        self.image_scale = ratio;
    }

    fn set_auto_page_break(&mut self, enabled: bool, bottom_margin: f64) {
        self.auto_break = enabled;
        self.break_margin = if enabled { bottom_margin } else { 0.0 };
    }

    fn set_header_data(&mut self, logo: &Path, logo_height: f64, line1: &str, line2: &str) {
        self.header = Some(HeaderData {
            logo: logo.to_path_buf(),
            logo_height,
            line1: line1.to_string(),
            line2: line2.to_string(),
        });
    }

    fn set_print_header(&mut self, enabled: bool) {
        self.print_header = enabled;
    }

    fn add_page(&mut self) -> Result<(), Error> {
        let header = if self.print_header {
            self.header.clone()
        } else {
            None
        };
        self.pages.push(PageState {
            fragments: Vec::new(),
            header,
            top_margin: self.margin_top,
            bottom_margin: self.break_margin,
            auto_break: self.auto_break,
        });
        self.cursor = self.pages.len() - 1;
        Ok(())
    }

    fn write_html(&mut self, html: &str) -> Result<(), Error> {
        let page = self.pages.get_mut(self.cursor).ok_or_else(|| {
            Error::Engine("write_html called before any page was appended".to_string())
        })?;
        page.fragments.push(html.to_string());
        self.last_page();
        Ok(())
    }

    fn last_page(&mut self) {
        if !self.pages.is_empty() {
            self.cursor = self.pages.len() - 1;
        }
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn output(&mut self, path: &Path, mode: OutputMode) -> Result<Option<Vec<u8>>, Error> {
        let bytes = self.render()?;
        match mode {
            OutputMode::File => {
                fs::write(path, &bytes)?;
                Ok(None)
            }
            OutputMode::Inline | OutputMode::Download => Ok(Some(bytes)),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::REGISTRY_TEST_LOCK;
    use std::sync::{MutexGuard, PoisonError};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    // Engine construction writes the process-wide encoding registry; serialize every
    // test here against the tests that assert on the registry.
    fn serial() -> MutexGuard<'static, ()> {
        REGISTRY_TEST_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn logo_fixture(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, PNG_MAGIC).expect("write logo fixture");
        path
    }

    fn engine() -> PrintpdfEngine {
        PrintpdfEngine::new(Orientation::Portrait, EngineConfig::default())
    }

    #[test]
    fn write_html_before_add_page_fails() {
        let _serial = serial();
        let mut engine = engine();
        let err = engine.write_html("<p>orphan</p>").unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
    }

    #[test]
    fn cursor_tracks_last_page() {
        let _serial = serial();
        let mut engine = engine();
        engine.add_page().unwrap();
        engine.add_page().unwrap();
        engine.write_html("<p>second</p>").unwrap();
        assert_eq!(engine.page_count(), 2);
        assert!(engine.pages[0].fragments.is_empty());
        assert_eq!(engine.pages[1].fragments.len(), 1);
    }

    #[test]
    fn header_applies_to_pages_appended_after_enabling() {
        let _serial = serial();
        let logo = logo_fixture("html_pdf_helper_header_logo.png");

        let mut engine = engine();
        engine.set_margins(14.0, 14.0, 14.0);
        engine.add_page().unwrap();

        engine.set_header_data(&logo, 15.0, "Acme & Co", "Quarterly report");
        engine.set_top_margin(20.0);
        engine.set_print_header(true);
        engine.add_page().unwrap();

        let html = engine.document_html().expect("assemble document");
        fs::remove_file(&logo).ok();

        assert_eq!(html.matches("page-header").count(), 1);
        assert!(html.contains("Acme &amp; Co"));
        assert!(html.contains("height: 15mm"));
        // Second page only carries the widened top margin.
        assert_eq!(html.matches("padding: 20mm").count(), 1);
        assert_eq!(html.matches("padding: 14mm").count(), 1);
    }

    #[test]
    fn disabled_auto_break_pins_the_page_height() {
        let _serial = serial();
        let mut engine = engine();
        engine.set_auto_page_break(true, 25.0);
        engine.add_page().unwrap();
        engine.set_auto_page_break(false, 0.0);
        engine.add_page().unwrap();

        let html = engine.document_html().expect("assemble document");
        assert_eq!(html.matches("overflow: hidden").count(), 1);
        assert_eq!(html.matches("height: 297mm").count(), 1);
    }

    #[test]
    fn every_page_carries_the_page_number_footer() {
        let _serial = serial();
        let mut engine = engine();
        engine.set_footer_font("helvetica", 8);
        engine.add_page().unwrap();
        engine.add_page().unwrap();

        let html = engine.document_html().expect("assemble document");
        assert_eq!(html.matches("page-footer").count(), 2);
        assert!(html.contains("Page 1 / 2"));
        assert!(html.contains("Page 2 / 2"));
    }

    #[test]
    fn landscape_swaps_rendered_page_dimensions() {
        let _serial = serial();
        let engine = PrintpdfEngine::new(Orientation::Landscape, EngineConfig::default());
        assert_eq!(engine.page_dimensions(), (297.0, 210.0));
    }

    #[test]
    fn logo_data_uri_sniffs_the_mime_type() {
        let _serial = serial();
        let logo = logo_fixture("html_pdf_helper_mime_logo.png");
        let engine = engine();
        let uri = engine.logo_data_uri(&logo).expect("encode logo");
        fs::remove_file(&logo).ok();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn missing_logo_surfaces_as_io_error() {
        let _serial = serial();
        let engine = engine();
        let err = engine
            .logo_data_uri(Path::new("/no/such/logo.png"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn escape_html_covers_reserved_characters() {
        assert_eq!(escape_html(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}

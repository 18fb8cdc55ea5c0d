//! Document construction helpers and the page-append façade.
//!
//! [`DocumentBuilder`] collects the document metadata and produces a [`Document`], a
//! stateful façade owning exactly one rendering engine.  The façade applies the crate's
//! default configuration at build time, forwards header/page/output operations to the
//! engine, and keeps the one-shot output contract honest: once [`Document::output`] has
//! run, the engine handle is released and every further operation fails with
//! [`Error::DocumentClosed`].

use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::encoding::EncodingGuard;
use crate::engine::{Orientation, OutputMode, PrintpdfEngine, RenderEngine};
use crate::error::Error;

/// Default font family applied when the builder is not told otherwise.
pub const DEFAULT_FONT_FAMILY: &str = "helvetica";

/// Default font size applied when the builder is not told otherwise.
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Uniform top/left/right margin applied to every new document, in units.
const DEFAULT_MARGIN: f64 = 14.0;

/// Top margin applied once header printing is enabled, in units.
const HEADER_TOP_MARGIN: f64 = 20.0;

/// Builder for [`Document`] instances pre-configured with the crate defaults.
pub struct DocumentBuilder {
    orientation: Orientation,
    author: String,
    title: String,
    subject: String,
    font_family: String,
    font_size: u32,
    config_file: Option<PathBuf>,
}

impl DocumentBuilder {
    /// Creates a builder with the required document metadata.
    pub fn new(
        orientation: Orientation,
        author: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            orientation,
            author: author.into(),
            title: title.into(),
            subject: String::new(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            config_file: None,
        }
    }

    /// Sets the subject shown in the document properties (default: empty).
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Overrides the default font family and size used for page content.
    pub fn with_font(mut self, family: impl Into<String>, size: u32) -> Self {
        self.font_family = family.into();
        self.font_size = size;
        self
    }

    /// Points the builder at an external configuration resource.
    ///
    /// A missing file is not an error; the engine built-in defaults apply instead.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Builds a document backed by the production [`PrintpdfEngine`].
    ///
    /// The process-wide text encoding is captured before the engine is instantiated, since
    /// engine initialization overrides it; [`Document::output`] puts the captured value
    /// back.
    pub fn build(self) -> Result<Document<PrintpdfEngine>, Error> {
        let config = self.load_config()?;
        let guard = EncodingGuard::capture();
        let engine = PrintpdfEngine::new(self.orientation, config.clone());
        self.finish(engine, config, guard)
    }

    /// Builds a document around a caller-supplied engine.
    ///
    /// The encoding capture happens here, so engines whose construction already altered
    /// the process encoding should be created after an explicit capture by the caller.
    pub fn build_with_engine<E: RenderEngine>(self, engine: E) -> Result<Document<E>, Error> {
        let config = self.load_config()?;
        let guard = EncodingGuard::capture();
        self.finish(engine, config, guard)
    }

    fn load_config(&self) -> Result<EngineConfig, Error> {
        match &self.config_file {
            Some(path) => EngineConfig::load(path),
            None => Ok(EngineConfig::default()),
        }
    }

    /// Applies the default configuration sequence and wraps the engine.
    fn finish<E: RenderEngine>(
        self,
        mut engine: E,
        config: EngineConfig,
        encoding: EncodingGuard,
    ) -> Result<Document<E>, Error> {
        if self.font_size == 0 {
            return Err(Error::InvalidFontSize);
        }

        engine.set_creator(&config.creator);
        engine.set_author(&self.author);
        engine.set_title(&self.title);
        engine.set_subject(&self.subject);

        engine.set_margins(DEFAULT_MARGIN, DEFAULT_MARGIN, DEFAULT_MARGIN);
        engine.set_header_margin(0.0);
        engine.set_footer_margin(0.0);
        engine.set_print_header(false);

        engine.set_default_monospaced_font(&config.monospaced_font);
        engine.set_image_scale(config.image_scale_ratio);
        engine.set_auto_page_break(true, config.margin_bottom);
        engine.set_font(&self.font_family, self.font_size)?;

        Ok(Document {
            engine: Some(engine),
            config,
            encoding: Some(encoding),
        })
    }
}

/// A PDF document under assembly, owning its rendering engine.
///
/// Operations follow the lifecycle `construct → (set_header)? → (page appends)* → output`.
/// `output` is terminal: afterwards the engine handle is gone and every operation returns
/// [`Error::DocumentClosed`].
pub struct Document<E: RenderEngine = PrintpdfEngine> {
    engine: Option<E>,
    config: EngineConfig,
    encoding: Option<EncodingGuard>,
}

impl<E: RenderEngine> Document<E> {
    fn engine_mut(&mut self) -> Result<&mut E, Error> {
        self.engine.as_mut().ok_or(Error::DocumentClosed)
    }

    /// Whether the document has been finalized by [`Document::output`].
    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    /// Enables header printing with a logo and two lines of text.
    ///
    /// Applies the configured header/footer fonts and margins and widens the top margin to
    /// 20 units.  Header state is global to the document and only affects pages appended
    /// afterwards, so call this before the first page if the header should appear on
    /// page 1.
    pub fn set_header(
        &mut self,
        logo: impl AsRef<Path>,
        line1: &str,
        line2: &str,
    ) -> Result<(), Error> {
        let logo_height = self.config.header_logo_height;
        let header_font = (self.config.header_font.clone(), self.config.header_font_size);
        let footer_font = (self.config.footer_font.clone(), self.config.footer_font_size);
        let header_margin = self.config.margin_header;
        let footer_margin = self.config.margin_footer;

        let engine = self.engine_mut()?;
        engine.set_header_data(logo.as_ref(), logo_height, line1, line2);
        engine.set_header_font(&header_font.0, header_font.1);
        engine.set_footer_font(&footer_font.0, footer_font.1);
        engine.set_top_margin(HEADER_TOP_MARGIN);
        engine.set_header_margin(header_margin);
        engine.set_footer_margin(footer_margin);
        engine.set_print_header(true);
        Ok(())
    }

    /// Toggles automatic pagination when content overflows a page.
    ///
    /// When enabled, the configured bottom margin is the break threshold; when disabled,
    /// the caller is responsible for manual [`Document::add_page`] calls.
    pub fn set_auto_page_break(&mut self, enabled: bool) -> Result<(), Error> {
        let threshold = if enabled { self.config.margin_bottom } else { 0.0 };
        self.engine_mut()?.set_auto_page_break(enabled, threshold);
        Ok(())
    }

    /// Appends a new blank page and moves the engine's page cursor to it.
    pub fn add_page(&mut self) -> Result<(), Error> {
        self.engine_mut()?.add_page()
    }

    /// Renders an HTML fragment onto the current page.
    pub fn write_html(&mut self, html: &str) -> Result<(), Error> {
        self.engine_mut()?.write_html(html)
    }

    /// Appends a new page filled with the given HTML fragment.
    ///
    /// Exactly equivalent to [`Document::add_page`] followed by [`Document::write_html`].
    pub fn add_html_page(&mut self, html: &str) -> Result<(), Error> {
        self.add_page()?;
        self.write_html(html)
    }

    /// Number of pages appended so far, as tracked by the engine.
    pub fn page_count(&self) -> Result<usize, Error> {
        self.engine
            .as_ref()
            .map(RenderEngine::page_count)
            .ok_or(Error::DocumentClosed)
    }

    /// Direct access to the owned rendering engine.
    ///
    /// This intentionally breaks the façade's encapsulation: callers needing engine
    /// capabilities not exposed here (custom drawing, engine-specific inspection) get the
    /// handle instead of the crate wrapping every engine feature.
    pub fn engine(&mut self) -> Result<&mut E, Error> {
        self.engine_mut()
    }

    /// Finalizes the document and delivers it per `mode`.
    ///
    /// On success the engine handle is released and the text encoding captured at build
    /// time is restored; the document is closed for good.  On failure the document stays
    /// open so the caller may retry, and the encoding is still restored when the document
    /// is eventually dropped.
    pub fn output(
        &mut self,
        path: impl AsRef<Path>,
        mode: OutputMode,
    ) -> Result<Option<Vec<u8>>, Error> {
        let engine = self.engine.as_mut().ok_or(Error::DocumentClosed)?;
        let bytes = engine.output(path.as_ref(), mode)?;

        self.engine = None;
        if let Some(guard) = self.encoding.take() {
            guard.restore();
        }
        Ok(bytes)
    }

    /// Convenience for [`Document::output`] with [`OutputMode::File`].
    pub fn output_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.output(path, OutputMode::File).map(|_| ())
    }
}

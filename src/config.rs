//! Engine-wide configuration constants, optionally loaded from a JSON resource.
//!
//! Every field has a built-in default, so a missing resource file or a partial file both
//! yield a usable configuration.  The resource format belongs to the engine layer; callers
//! normally only hand a path to [`crate::DocumentBuilder::with_config_file`].

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Constants consulted when instantiating and driving a rendering engine.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Measurement unit label for margins and heights.
    pub unit: String,
    /// Page format name: `A4`, `A5`, `LETTER` or `LEGAL` (case-insensitive).
    pub page_format: String,
    /// Creator tag embedded in the PDF document properties.
    pub creator: String,
    /// Default monospaced font family.
    pub monospaced_font: String,
    /// Scale ratio applied when sizing raster images from pixel dimensions.
    pub image_scale_ratio: f64,
    /// Bottom margin used as the automatic page break threshold.
    pub margin_bottom: f64,
    /// Header margin applied once header printing is enabled.
    pub margin_header: f64,
    /// Footer margin applied once header printing is enabled.
    pub margin_footer: f64,
    /// Font family used for header lines.
    pub header_font: String,
    /// Font size used for header lines.
    pub header_font_size: u32,
    /// Font family used for footer data.
    pub footer_font: String,
    /// Font size used for footer data.
    pub footer_font_size: u32,
    /// Height of the header logo cell, in units.
    pub header_logo_height: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unit: "mm".to_string(),
            page_format: "A4".to_string(),
            creator: "html_pdf_helper".to_string(),
            monospaced_font: "courier".to_string(),
            image_scale_ratio: 1.25,
            margin_bottom: 25.0,
            margin_header: 5.0,
            margin_footer: 10.0,
            header_font: "helvetica".to_string(),
            header_font_size: 10,
            footer_font: "helvetica".to_string(),
            footer_font_size: 8,
            header_logo_height: 15.0,
        }
    }
}

impl EngineConfig {
    /// Loads the configuration from a JSON resource file.
    ///
    /// A missing file is not an error: the built-in defaults are returned instead.  An
    /// existing file that fails to parse propagates as [`Error::Config`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "configuration resource {} not found, using built-in defaults",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(err) => return Err(Error::Io(err)),
        };

        serde_json::from_str(&raw).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Portrait page dimensions for the configured format, in millimetres.
    pub fn page_dimensions_mm(&self) -> (f64, f64) {
        match self.page_format.to_ascii_uppercase().as_str() {
            "A4" => (210.0, 297.0),
            "A5" => (148.0, 210.0),
            "LETTER" => (215.9, 279.4),
            "LEGAL" => (215.9, 355.6),
            other => {
                log::warn!("unknown page format {other:?}, falling back to A4");
                (210.0, 297.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resource_falls_back_to_defaults() {
        let config = EngineConfig::load("/definitely/not/a/real/config.json")
            .expect("missing resource must not fail");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_resource_keeps_remaining_defaults() {
        let path = std::env::temp_dir().join("html_pdf_helper_partial_config.json");
        std::fs::write(&path, r#"{ "page_format": "letter", "margin_bottom": 30.0 }"#)
            .expect("write config fixture");

        let config = EngineConfig::load(&path).expect("partial resource parses");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.page_format, "letter");
        assert_eq!(config.margin_bottom, 30.0);
        assert_eq!(config.creator, EngineConfig::default().creator);
        assert_eq!(config.header_font_size, 10);
    }

    #[test]
    fn malformed_resource_is_an_error() {
        let path = std::env::temp_dir().join("html_pdf_helper_malformed_config.json");
        std::fs::write(&path, "{ not json").expect("write config fixture");

        let err = EngineConfig::load(&path).expect_err("malformed resource must fail");
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn page_dimensions_cover_known_formats() {
        let mut config = EngineConfig::default();
        assert_eq!(config.page_dimensions_mm(), (210.0, 297.0));

        config.page_format = "letter".to_string();
        assert_eq!(config.page_dimensions_mm(), (215.9, 279.4));

        config.page_format = "unknown".to_string();
        assert_eq!(config.page_dimensions_mm(), (210.0, 297.0));
    }
}

//! The two enumerations that index the rule table, plus the static format menu.
//!
//! [`SourceKind`] is always derived from content by [`crate::sniff`].
//! [`TargetFormat`] arrives from the front end as an opaque token (`"pdf"`,
//! `"webp"`, …) and is parsed with [`str::parse`]; an unknown token is not an
//! error at the dispatch boundary, it simply yields `Unsupported`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse media kind of an input, derived purely from its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Any raster format the image crate can decode.
    Image,
    /// `%PDF` signature.
    Pdf,
    /// No binary signature and text-like bytes.
    PlainText,
    /// OOXML word-processing package.
    Docx,
    /// Everything else, including empty input.
    Unknown,
}

impl SourceKind {
    /// Every kind, in declaration order.
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Image,
        SourceKind::Pdf,
        SourceKind::PlainText,
        SourceKind::Docx,
        SourceKind::Unknown,
    ];

    /// MIME-like label, used in logs and `--inspect-only` output.
    pub fn mime_hint(self) -> &'static str {
        match self {
            SourceKind::Image => "image/*",
            SourceKind::Pdf => "application/pdf",
            SourceKind::PlainText => "text/plain",
            SourceKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            SourceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Image => "image",
            SourceKind::Pdf => "pdf",
            SourceKind::PlainText => "text",
            SourceKind::Docx => "docx",
            SourceKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Output format requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Pdf,
    Docx,
    Jpg,
    Png,
    Txt,
    Webp,
    Bmp,
    Zip,
}

impl TargetFormat {
    /// Every format, in menu order.
    pub const ALL: [TargetFormat; 8] = [
        TargetFormat::Pdf,
        TargetFormat::Docx,
        TargetFormat::Jpg,
        TargetFormat::Png,
        TargetFormat::Txt,
        TargetFormat::Webp,
        TargetFormat::Bmp,
        TargetFormat::Zip,
    ];

    /// The wire token, which doubles as the output file extension.
    pub fn token(self) -> &'static str {
        match self {
            TargetFormat::Pdf => "pdf",
            TargetFormat::Docx => "docx",
            TargetFormat::Jpg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Txt => "txt",
            TargetFormat::Webp => "webp",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Zip => "zip",
        }
    }

    /// Button label shown by chat front ends.
    pub fn label(self) -> &'static str {
        match self {
            TargetFormat::Pdf => "📄 PDF",
            TargetFormat::Docx => "📃 DOCX",
            TargetFormat::Jpg => "🖼️ JPG",
            TargetFormat::Png => "🖼️ PNG",
            TargetFormat::Txt => "📁 TXT",
            TargetFormat::Webp => "🖼️ WEBP",
            TargetFormat::Bmp => "🖼️ BMP",
            TargetFormat::Zip => "📁 ZIP",
        }
    }

    /// The raster encoder behind this format, if it is one.
    pub fn raster_format(self) -> Option<image::ImageFormat> {
        match self {
            TargetFormat::Jpg => Some(image::ImageFormat::Jpeg),
            TargetFormat::Png => Some(image::ImageFormat::Png),
            TargetFormat::Webp => Some(image::ImageFormat::WebP),
            TargetFormat::Bmp => Some(image::ImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn is_raster(self) -> bool {
        self.raster_format().is_some()
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Returned when a token names no known format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown target format '{0}'")]
pub struct UnknownFormat(pub String);

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    /// Case-insensitive; a leading `.` is tolerated so extensions parse too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().trim_start_matches('.').to_ascii_lowercase();
        TargetFormat::ALL
            .into_iter()
            .find(|f| f.token() == normalised)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

// ── Menu ─────────────────────────────────────────────────────────────────

/// Options rendered per keyboard row.
pub const MENU_COLUMNS: usize = 2;

/// Prompt shown above the menu once a file has been received.
pub const CHOOSE_FORMAT_PROMPT: &str = "✅ Choose a format to convert:";

/// One selectable button. `callback` is always the format token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuOption {
    pub label: &'static str,
    pub callback: &'static str,
}

impl From<TargetFormat> for MenuOption {
    fn from(format: TargetFormat) -> Self {
        MenuOption {
            label: format.label(),
            callback: format.token(),
        }
    }
}

/// The full static menu laid out [`MENU_COLUMNS`] per row.
pub fn menu_rows() -> Vec<Vec<MenuOption>> {
    menu_rows_for(&TargetFormat::ALL)
}

/// Lay out an arbitrary subset (e.g. only reachable targets) the same way.
pub fn menu_rows_for(formats: &[TargetFormat]) -> Vec<Vec<MenuOption>> {
    formats
        .chunks(MENU_COLUMNS)
        .map(|row| row.iter().copied().map(MenuOption::from).collect())
        .collect()
}

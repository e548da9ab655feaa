//! The conversion rule table.
//!
//! A static, exhaustively matched mapping from `(SourceKind, TargetFormat)` to
//! a named [`Procedure`]. Absence of an entry is the "unsupported combination"
//! policy: the dispatcher reports `Unsupported` and never tries a fallback.
//!
//! | Source    | Reachable targets                         |
//! |-----------|-------------------------------------------|
//! | Image     | jpg, png, bmp, webp, pdf, docx, zip       |
//! | Pdf       | jpg, png, bmp, webp, docx, txt, zip       |
//! | Docx      | txt, zip                                  |
//! | PlainText | docx, zip                                 |
//! | Unknown   | zip                                       |

use crate::format::{SourceKind, TargetFormat};
use serde::Serialize;
use std::fmt;

/// One conversion routine. Raster targets carry the encoder to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Procedure {
    /// Decode, drop alpha/palette, re-encode.
    ImageToImage(TargetFormat),
    /// Wrap a single image as a one-page PDF.
    ImageToPdf,
    /// Embed the image as a picture in a new document.
    ImageToDocx,
    /// Rasterise page 1 only.
    PdfToImage(TargetFormat),
    /// One paragraph per page.
    PdfToDocx,
    /// Concatenated page text.
    PdfToTxt,
    /// One paragraph per input line.
    TextToDocx,
    /// Paragraph texts joined by newlines.
    DocxToTxt,
    /// Single-entry archive of the untouched input.
    Zip,
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::ImageToImage(t) => write!(f, "image→{t}"),
            Procedure::ImageToPdf => f.write_str("image→pdf"),
            Procedure::ImageToDocx => f.write_str("image→docx"),
            Procedure::PdfToImage(t) => write!(f, "pdf→{t}"),
            Procedure::PdfToDocx => f.write_str("pdf→docx"),
            Procedure::PdfToTxt => f.write_str("pdf→txt"),
            Procedure::TextToDocx => f.write_str("text→docx"),
            Procedure::DocxToTxt => f.write_str("docx→txt"),
            Procedure::Zip => f.write_str("any→zip"),
        }
    }
}

/// Look up the procedure for a pair, or `None` when the pair is unsupported.
pub fn lookup(source: SourceKind, target: TargetFormat) -> Option<Procedure> {
    use SourceKind as S;
    use TargetFormat as T;

    match (source, target) {
        // Keyed by target alone; source kind is irrelevant.
        (_, T::Zip) => Some(Procedure::Zip),

        (S::Image, T::Jpg | T::Png | T::Bmp | T::Webp) => Some(Procedure::ImageToImage(target)),
        (S::Image, T::Pdf) => Some(Procedure::ImageToPdf),
        (S::Image, T::Docx) => Some(Procedure::ImageToDocx),
        (S::Image, T::Txt) => None,

        (S::Pdf, T::Jpg | T::Png | T::Bmp | T::Webp) => Some(Procedure::PdfToImage(target)),
        (S::Pdf, T::Docx) => Some(Procedure::PdfToDocx),
        (S::Pdf, T::Txt) => Some(Procedure::PdfToTxt),
        (S::Pdf, T::Pdf) => None,

        (S::Docx, T::Txt) => Some(Procedure::DocxToTxt),
        (S::Docx, _) => None,

        (S::PlainText, T::Docx) => Some(Procedure::TextToDocx),
        (S::PlainText, _) => None,

        (S::Unknown, _) => None,
    }
}

/// Targets reachable from `source`, in menu order.
pub fn reachable_targets(source: SourceKind) -> Vec<TargetFormat> {
    TargetFormat::ALL
        .into_iter()
        .filter(|&t| lookup(source, t).is_some())
        .collect()
}

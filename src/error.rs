//! Error types for the edgequake-fileconv library.
//!
//! [`ConvertError`] is the failure type of every conversion procedure. It
//! never crosses the public dispatch boundary: [`crate::dispatch`] folds it
//! into [`crate::output::ConversionResult::Failed`] after logging the detail
//! for operators. The end user only ever sees the generic message returned by
//! [`crate::output::ConversionResult::user_message`].
//!
//! "No rule exists for this pair" is deliberately *not* an error variant.
//! It is an expected outcome and is modelled as
//! [`crate::output::ConversionResult::Unsupported`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors raised while running a conversion procedure.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Reading the input or writing the output failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Image errors ──────────────────────────────────────────────────────
    /// The image crate could not decode the input.
    #[error("Failed to decode image '{path}': {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Re-encoding to the requested raster format failed.
    #[error("Failed to encode {format} image: {source}")]
    ImageEncode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The document opened but has no pages (or paragraphs) to work with.
    #[error("Document '{path}' is empty")]
    EmptyDocument { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The text layer of a page could not be read.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtraction { page: usize, detail: String },

    /// Building a new PDF (image wrapping) failed.
    #[error("Failed to build PDF: {0}")]
    PdfWrite(String),

    // ── Office / archive errors ───────────────────────────────────────────
    /// docx-rs failed to read or pack a document.
    #[error("DOCX error: {0}")]
    Docx(String),

    /// Writing the ZIP archive failed.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

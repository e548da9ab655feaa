//! Content sniffing: classify an input by its bytes, never by its name.
//!
//! Signatures are checked in a fixed order so the result is deterministic:
//!
//! ```text
//! %PDF          → Pdf
//! raster magic  → Image   (only formats this build can decode)
//! PK\x03\x04    → Docx    (if the container holds word/document.xml)
//!               → Unknown (any other ZIP)
//! text-like     → PlainText
//! otherwise     → Unknown
//! ```
//!
//! Sniffing is total: I/O failures and malformed containers fold into
//! [`SourceKind::Unknown`] and are logged at `debug` level only.

use crate::format::SourceKind;
use image::{ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

/// Bytes inspected for signatures and the text heuristic.
pub const SNIFF_PREFIX_LEN: usize = 8192;

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const DOCX_MAIN_PART: &str = "word/document.xml";

/// Raster formats the sniffer will report as [`SourceKind::Image`].
///
/// Must stay in sync with the `image` features enabled in Cargo.toml.
const DECODABLE_IMAGES: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::WebP,
    ImageFormat::Tiff,
    ImageFormat::Ico,
];

/// Classify the file at `path`.
pub fn sniff(path: &Path) -> SourceKind {
    match File::open(path) {
        Ok(file) => {
            let kind = sniff_reader(file);
            debug!("Sniffed {} as {}", path.display(), kind);
            kind
        }
        Err(e) => {
            debug!("Cannot open {} for sniffing: {}", path.display(), e);
            SourceKind::Unknown
        }
    }
}

/// Classify an in-memory buffer.
pub fn sniff_bytes(bytes: &[u8]) -> SourceKind {
    sniff_reader(Cursor::new(bytes))
}

fn sniff_reader<R: Read + Seek>(mut reader: R) -> SourceKind {
    let mut prefix = Vec::with_capacity(SNIFF_PREFIX_LEN);
    if let Err(e) = reader
        .by_ref()
        .take(SNIFF_PREFIX_LEN as u64)
        .read_to_end(&mut prefix)
    {
        debug!("Sniff read failed: {}", e);
        return SourceKind::Unknown;
    }

    if prefix.is_empty() {
        return SourceKind::Unknown;
    }
    if prefix.starts_with(PDF_MAGIC) {
        return SourceKind::Pdf;
    }
    // Short magics ("BM", "GIF8", PNM's "P1") also start ordinary text, so a
    // signature only counts once the decoder accepts the header behind it.
    match image::guess_format(&prefix) {
        Ok(format) if DECODABLE_IMAGES.contains(&format) => {
            if has_valid_image_header(&mut reader, format) {
                return SourceKind::Image;
            }
        }
        Ok(format) => debug!("Ignoring {:?} signature: no decoder compiled in", format),
        Err(_) => {}
    }
    if prefix.starts_with(ZIP_MAGIC) {
        return if is_wordprocessing_package(reader) {
            SourceKind::Docx
        } else {
            SourceKind::Unknown
        };
    }
    if looks_like_text(&prefix) {
        return SourceKind::PlainText;
    }
    SourceKind::Unknown
}

/// Let the decoder parse the header (dimensions only, no pixel data).
fn has_valid_image_header<R: Read + Seek>(reader: &mut R, format: ImageFormat) -> bool {
    if let Err(e) = reader.rewind() {
        debug!("Cannot rewind image candidate: {}", e);
        return false;
    }
    match ImageReader::with_format(BufReader::new(reader), format).into_dimensions() {
        Ok(_) => true,
        Err(e) => {
            debug!("{:?} signature but invalid header: {}", format, e);
            false
        }
    }
}

/// A ZIP is a DOCX when its central directory lists the main document part.
fn is_wordprocessing_package<R: Read + Seek>(mut reader: R) -> bool {
    if let Err(e) = reader.rewind() {
        debug!("Cannot rewind ZIP candidate: {}", e);
        return false;
    }
    match zip::ZipArchive::new(reader) {
        Ok(archive) => archive.file_names().any(|name| name == DOCX_MAIN_PART),
        Err(e) => {
            debug!("ZIP signature but unreadable archive: {}", e);
            false
        }
    }
}

/// No control bytes apart from common whitespace and ESC.
///
/// Bytes ≥ 0x80 pass so that Latin-1 or partially corrupt UTF-8 text still
/// classifies as text; undecodable sequences are dropped later.
fn looks_like_text(prefix: &[u8]) -> bool {
    prefix
        .iter()
        .all(|&b| matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b) || (b >= 0x20 && b != 0x7f))
}

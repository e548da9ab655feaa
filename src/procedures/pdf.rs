//! PDF procedures: rasterise page 1, extract the text layer.
//!
//! pdfium is not async-safe; these functions are blocking and the async
//! dispatcher runs them on the blocking pool.

use crate::config::DispatchConfig;
use crate::error::ConvertError;
use crate::format::TargetFormat;
use crate::procedures::{docx, engine, raster};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// PDF→Image: render the first page at native size (times `render_scale`).
///
/// Pages beyond the first are ignored.
pub fn render_first_page(
    input: &Path,
    target: TargetFormat,
    config: &DispatchConfig,
) -> Result<Vec<u8>, ConvertError> {
    let pdfium = engine::bind_pdfium(config)?;
    let document = open(&pdfium, input)?;
    let pages = document.pages();
    let total = pages.len() as usize;

    if total == 0 {
        return Err(ConvertError::EmptyDocument {
            path: input.to_path_buf(),
        });
    }
    if total > 1 {
        debug!("Rendering page 1 of {}; remaining pages ignored", total);
    }

    let page = pages.get(0).map_err(|e| ConvertError::RasterisationFailed {
        page: 1,
        detail: format!("{:?}", e),
    })?;

    let render_config = PdfRenderConfig::new().scale_page_by_factor(config.render_scale);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| ConvertError::RasterisationFailed {
            page: 1,
            detail: format!("{:?}", e),
        })?;

    let rendered = bitmap.as_image();
    debug!(
        "Rendered page 1 → {}x{} px",
        rendered.width(),
        rendered.height()
    );

    raster::encode(&DynamicImage::ImageRgb8(rendered.to_rgb8()), target)
}

/// PDF→DOCX: one paragraph per page, in page order.
pub fn to_docx(input: &Path, config: &DispatchConfig) -> Result<Vec<u8>, ConvertError> {
    let texts = page_texts(input, config)?;
    docx::paged_document(&texts)
}

/// PDF→TXT: page texts concatenated in order, each ending in a newline.
pub fn to_text(input: &Path, config: &DispatchConfig) -> Result<Vec<u8>, ConvertError> {
    let texts = page_texts(input, config)?;
    Ok(join_pages(&texts).into_bytes())
}

/// pdfium does not terminate a page's text; without this the last word of
/// one page runs into the first word of the next.
fn join_pages(texts: &[String]) -> String {
    let mut out = String::with_capacity(texts.iter().map(|t| t.len() + 1).sum());
    for text in texts {
        out.push_str(text);
        if !text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Plain text of every page, in document order.
pub fn page_texts(input: &Path, config: &DispatchConfig) -> Result<Vec<String>, ConvertError> {
    let pdfium = engine::bind_pdfium(config)?;
    let document = open(&pdfium, input)?;
    let pages = document.pages();

    if pages.len() == 0 {
        return Err(ConvertError::EmptyDocument {
            path: input.to_path_buf(),
        });
    }

    let texts = pages
        .iter()
        .enumerate()
        .map(|(idx, page)| {
            page.text()
                .map(|text| text.all())
                .map_err(|e| ConvertError::TextExtraction {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Extracted {} chars from {} pages",
        texts.iter().map(String::len).sum::<usize>(),
        texts.len()
    );
    Ok(texts)
}

fn open<'a>(pdfium: &'a Pdfium, input: &Path) -> Result<PdfDocument<'a>, ConvertError> {
    pdfium
        .load_pdf_from_file(input, None)
        .map_err(|e| ConvertError::CorruptPdf {
            path: input.to_path_buf(),
            detail: format!("{:?}", e),
        })
}

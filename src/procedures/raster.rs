//! Raster procedures: image→image, image→pdf, image→docx.
//!
//! Every decoded image is forced to 8-bit RGB first. Alpha and palettes are
//! discarded, so transparent regions come out black; that loss is accepted.
//! Decoding guesses the codec from the bytes, never from the file name.

use crate::config::DispatchConfig;
use crate::error::ConvertError;
use crate::format::TargetFormat;
use crate::procedures::{docx, engine};
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

const EMU_PER_INCH: f32 = 914_400.0;

/// Decode the input and drop alpha/palette.
pub fn decode_rgb(input: &Path) -> Result<DynamicImage, ConvertError> {
    let bytes = std::fs::read(input).map_err(|e| ConvertError::io(input, e))?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| ConvertError::ImageDecode {
        path: input.to_path_buf(),
        source,
    })?;
    debug!(
        "Decoded {}x{} {:?} image",
        decoded.width(),
        decoded.height(),
        decoded.color()
    );
    Ok(DynamicImage::ImageRgb8(decoded.to_rgb8()))
}

/// Encode an image in the raster format named by `target`.
pub fn encode(img: &DynamicImage, target: TargetFormat) -> Result<Vec<u8>, ConvertError> {
    let format = target.raster_format().ok_or_else(|| {
        ConvertError::Internal(format!("'{target}' is not a raster format"))
    })?;
    encode_as(img, format, target.token())
}

fn encode_as(
    img: &DynamicImage,
    format: ImageFormat,
    name: &'static str,
) -> Result<Vec<u8>, ConvertError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .map_err(|source| ConvertError::ImageEncode {
            format: name,
            source,
        })?;
    debug!("Encoded {} → {} bytes", name, buf.len());
    Ok(buf)
}

/// Image→Image: decode, force RGB, re-encode.
pub fn reencode(input: &Path, target: TargetFormat) -> Result<Vec<u8>, ConvertError> {
    let rgb = decode_rgb(input)?;
    encode(&rgb, target)
}

/// Image→PDF: one image, one page, sized at `config.image_pdf_dpi`.
pub fn wrap_in_pdf(input: &Path, config: &DispatchConfig) -> Result<Vec<u8>, ConvertError> {
    let rgb = decode_rgb(input)?;
    let (width, height) = page_size_points(rgb.width(), rgb.height(), config.image_pdf_dpi);

    let pdfium = engine::bind_pdfium(config)?;
    let pdf_err = |e: PdfiumError| ConvertError::PdfWrite(format!("{:?}", e));

    let mut document = pdfium.create_new_pdf().map_err(pdf_err)?;
    {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(width, height))
            .map_err(pdf_err)?;
        page.objects_mut()
            .create_image_object(PdfPoints::ZERO, PdfPoints::ZERO, &rgb, Some(width), Some(height))
            .map_err(pdf_err)?;
    }

    let bytes = document.save_to_bytes().map_err(pdf_err)?;
    debug!(
        "Wrapped {}x{} px image as {:.1}x{:.1} pt page",
        rgb.width(),
        rgb.height(),
        width.value,
        height.value
    );
    Ok(bytes)
}

/// Image→DOCX: embed the picture at a fixed width, aspect preserved.
pub fn embed_in_docx(input: &Path, config: &DispatchConfig) -> Result<Vec<u8>, ConvertError> {
    let rgb = decode_rgb(input)?;
    // PNG is lossless and accepted by every word processor.
    let png = encode_as(&rgb, ImageFormat::Png, "png")?;
    let (width_emu, height_emu) =
        picture_size_emu(rgb.width(), rgb.height(), config.docx_image_width_inches);
    docx::picture_document(&png, width_emu, height_emu)
}

fn page_size_points(width_px: u32, height_px: u32, dpi: f32) -> (PdfPoints, PdfPoints) {
    let points_per_px = 72.0 / dpi;
    (
        PdfPoints::new(width_px as f32 * points_per_px),
        PdfPoints::new(height_px as f32 * points_per_px),
    )
}

fn picture_size_emu(width_px: u32, height_px: u32, width_inches: f32) -> (u32, u32) {
    let width_emu = width_inches * EMU_PER_INCH;
    let height_emu = width_emu * height_px as f32 / width_px.max(1) as f32;
    (width_emu.round() as u32, height_emu.round() as u32)
}

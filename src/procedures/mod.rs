//! Conversion procedures, one per supported `(source, target)` pair.
//!
//! Each procedure reads the input path and returns the complete output as
//! bytes. Nothing touches the output location until a procedure has fully
//! succeeded, so a failure can never leave a half-written deliverable behind;
//! [`crate::output::materialise`] does the write afterwards.
//!
//! Submodules are split by the engine they drive:
//!
//! 1. [`raster`]  — image crate (re-encode, wrap in PDF, embed in DOCX)
//! 2. [`pdf`]     — pdfium (rasterise page 1, extract text)
//! 3. [`docx`]    — docx-rs (read paragraphs, build documents)
//! 4. [`archive`] — zip
//! 5. [`engine`]  — pdfium library binding

pub mod archive;
pub mod docx;
pub mod engine;
pub mod pdf;
pub mod raster;

use crate::config::DispatchConfig;
use crate::dispatch::ConversionJob;
use crate::error::ConvertError;
use crate::rules::Procedure;

/// Run `procedure` for `job` and return the output bytes.
pub fn run(
    procedure: Procedure,
    job: &ConversionJob,
    config: &DispatchConfig,
) -> Result<Vec<u8>, ConvertError> {
    let input = job.input_path.as_path();
    match procedure {
        Procedure::ImageToImage(target) => raster::reencode(input, target),
        Procedure::ImageToPdf => raster::wrap_in_pdf(input, config),
        Procedure::ImageToDocx => raster::embed_in_docx(input, config),
        Procedure::PdfToImage(target) => pdf::render_first_page(input, target, config),
        Procedure::PdfToDocx => pdf::to_docx(input, config),
        Procedure::PdfToTxt => pdf::to_text(input, config),
        Procedure::TextToDocx => docx::from_text(input),
        Procedure::DocxToTxt => docx::to_text(input),
        Procedure::Zip => archive::zip_original(input, &job.archive_entry_name()),
    }
}

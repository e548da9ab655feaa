//! # edgequake-fileconv
//!
//! Convert an uploaded file into PDF, DOCX, TXT, a raster image, or a ZIP,
//! deciding what the input *is* from its bytes rather than its name.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input path + target token
//!  │
//!  ├─ 1. Sniff     classify bytes → Image | Pdf | PlainText | Docx | Unknown
//!  ├─ 2. Lookup    static (kind, format) rule table; no entry → Unsupported
//!  ├─ 3. Invoke    exactly one procedure (image crate, pdfium, docx-rs, zip)
//!  └─ 4. Output    uniquely named file, owned by the caller → Success(path)
//!                  any error or panic along the way → Failed(reason)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_fileconv::{dispatch, output_file_name, ConversionResult, DispatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DispatchConfig::default();
//!     match dispatch("/tmp/upload-42", "txt", &config).await {
//!         ConversionResult::Success(path) => {
//!             let name = output_file_name(Some("contract.pdf"), "txt".parse()?);
//!             println!("deliver {} as {}", path.display(), name);
//!             std::fs::remove_file(path)?;
//!         }
//!         other => eprintln!("{}", other.user_message()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Supported conversions
//!
//! | Source    | Targets                             |
//! |-----------|-------------------------------------|
//! | Image     | jpg, png, bmp, webp, pdf, docx, zip |
//! | PDF       | jpg, png, bmp, webp (page 1), docx, txt, zip |
//! | DOCX      | txt, zip                            |
//! | Text      | docx, zip                           |
//! | Unknown   | zip                                 |
//!
//! PDF work needs a pdfium shared library; see [`DispatchConfig::pdfium_lib_path`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fileconv` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod output;
pub mod procedures;
pub mod rules;
pub mod sniff;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DispatchConfig, DispatchConfigBuilder};
pub use dispatch::{
    dispatch, dispatch_blocking, dispatch_job, inspect, run_job, ConversionJob, Inspection,
};
pub use error::ConvertError;
pub use format::{
    menu_rows, menu_rows_for, MenuOption, SourceKind, TargetFormat, UnknownFormat,
    CHOOSE_FORMAT_PROMPT,
};
pub use output::{
    output_file_name, ConversionResult, FAILED_MESSAGE, PHOTO_DEFAULT_NAME, SUCCESS_MESSAGE,
    UNSUPPORTED_MESSAGE,
};
pub use procedures::engine::is_pdfium_available;
pub use rules::{lookup, reachable_targets, Procedure};
pub use sniff::{sniff, sniff_bytes};

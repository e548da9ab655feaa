//! Conversion outcomes and output-file handling.

use crate::config::DispatchConfig;
use crate::error::ConvertError;
use crate::format::TargetFormat;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shown after a successful conversion.
pub const SUCCESS_MESSAGE: &str = "✅ Conversion successful!";
/// Shown when no rule covers the file/format pair.
pub const UNSUPPORTED_MESSAGE: &str =
    "❌ Conversion failed. The selected format is not supported for this file type.";
/// Shown when a rule existed but the conversion raised. Never carries the cause.
pub const FAILED_MESSAGE: &str =
    "❌ An error occurred during conversion. Please try again or use a different file.";

/// Fallback stem when the original name is missing or has no usable stem.
pub const DEFAULT_STEM: &str = "file";

/// Original name assumed for photos, which chat clients send without one.
pub const PHOTO_DEFAULT_NAME: &str = "photo.jpg";

/// Outcome of one dispatch.
///
/// `Unsupported` is an expected result, not a defect. `Failed` carries the
/// operator-facing reason; show [`ConversionResult::user_message`] to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum ConversionResult {
    /// Path to a newly created output file. The caller owns and must delete it.
    Success(PathBuf),
    /// No rule exists for the `(source, target)` pair.
    Unsupported,
    /// A rule existed but raised.
    Failed(String),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            ConversionResult::Success(path) => Some(path),
            _ => None,
        }
    }

    /// The only text suitable for end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConversionResult::Success(_) => SUCCESS_MESSAGE,
            ConversionResult::Unsupported => UNSUPPORTED_MESSAGE,
            ConversionResult::Failed(_) => FAILED_MESSAGE,
        }
    }
}

/// Display name for a delivered file: `{original stem}.{token}`.
///
/// ```rust
/// use edgequake_fileconv::{output_file_name, TargetFormat};
///
/// assert_eq!(output_file_name(Some("report.final.pdf"), TargetFormat::Txt), "report.final.txt");
/// assert_eq!(output_file_name(None, TargetFormat::Zip), "file.zip");
/// ```
pub fn output_file_name(original: Option<&str>, target: TargetFormat) -> String {
    let stem = original
        .and_then(|name| Path::new(name).file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STEM.to_string());
    format!("{}.{}", stem, target.token())
}

/// Write `bytes` to a new, uniquely named file in the configured output
/// directory and hand ownership of it to the caller.
///
/// The file only survives if every byte was written; on error the temp file
/// is removed when it drops.
pub fn materialise(
    bytes: &[u8],
    target: TargetFormat,
    config: &DispatchConfig,
) -> Result<PathBuf, ConvertError> {
    let dir = config.resolved_output_dir();
    let suffix = format!(".{}", target.token());

    let mut tmp = tempfile::Builder::new()
        .prefix("fileconv-")
        .suffix(&suffix)
        .tempfile_in(&dir)
        .map_err(|e| ConvertError::io(&dir, e))?;

    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| ConvertError::io(tmp.path(), e))?;

    let (_, path) = tmp
        .keep()
        .map_err(|e| ConvertError::io(&dir, e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

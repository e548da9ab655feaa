//! pdfium library binding.
//!
//! Resolution order (first match wins):
//!
//! 1. [`DispatchConfig::pdfium_lib_path`]
//! 2. `PDFIUM_LIB_PATH` environment variable
//! 3. the system library search path
//!
//! A path may name the shared library itself or the directory holding it.

use crate::config::DispatchConfig;
use crate::error::ConvertError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bind a fresh pdfium instance for one job.
pub fn bind_pdfium(config: &DispatchConfig) -> Result<Pdfium, ConvertError> {
    let explicit = config
        .pdfium_lib_path
        .clone()
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => {
            let lib = library_file(&path);
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib).map_err(|e| {
                ConvertError::PdfiumBindingFailed(format!("{}: {:?}", lib.display(), e))
            })?
        }
        None => Pdfium::bind_to_system_library().map_err(|e| {
            ConvertError::PdfiumBindingFailed(format!("system library: {:?}", e))
        })?,
    };

    Ok(Pdfium::new(bindings))
}

/// `true` when a pdfium library can be bound with this configuration.
pub fn is_pdfium_available(config: &DispatchConfig) -> bool {
    bind_pdfium(config).is_ok()
}

fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

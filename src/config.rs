//! Configuration for the conversion dispatcher.
//!
//! Every knob lives in [`DispatchConfig`], built via its
//! [`DispatchConfigBuilder`]. There is no configuration file: defaults are
//! compiled in and the CLI maps flags/environment variables onto the builder.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration shared by every conversion job.
///
/// # Example
/// ```rust
/// use edgequake_fileconv::DispatchConfig;
///
/// let config = DispatchConfig::builder()
///     .image_pdf_dpi(150.0)
///     .render_scale(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.render_scale, 2.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Directory receiving output files. `None` uses the OS temp directory.
    pub output_dir: Option<PathBuf>,

    /// Nominal resolution when an image is wrapped as a PDF page. Range: 36–600. Default: 100.
    ///
    /// A 1000 px wide image at 100 DPI becomes a 10 inch (720 pt) wide page.
    pub image_pdf_dpi: f32,

    /// PDF→image scale factor relative to the page's native size. Range: 0.25–8.0. Default: 1.0.
    ///
    /// At 1.0 one PDF point maps to one pixel (72 DPI).
    pub render_scale: f32,

    /// Width of the picture embedded by Image→DOCX, in inches. Range: 0.5–20. Default: 6.0.
    pub docx_image_width_inches: f32,

    /// Explicit pdfium shared library. Falls back to `PDFIUM_LIB_PATH`, then
    /// the system library search path.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            image_pdf_dpi: 100.0,
            render_scale: 1.0,
            docx_image_width_inches: 6.0,
            pdfium_lib_path: None,
        }
    }
}

impl DispatchConfig {
    /// Create a new builder for `DispatchConfig`.
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Where output files are created.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for [`DispatchConfig`].
#[derive(Debug)]
pub struct DispatchConfigBuilder {
    config: DispatchConfig,
}

impl DispatchConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn image_pdf_dpi(mut self, dpi: f32) -> Self {
        self.config.image_pdf_dpi = dpi.clamp(36.0, 600.0);
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale.clamp(0.25, 8.0);
        self
    }

    pub fn docx_image_width_inches(mut self, inches: f32) -> Self {
        self.config.docx_image_width_inches = inches.clamp(0.5, 20.0);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DispatchConfig, ConvertError> {
        let c = &self.config;
        if let Some(ref dir) = c.output_dir {
            if !is_dir(dir) {
                return Err(ConvertError::InvalidConfig(format!(
                    "Output directory '{}' does not exist or is not a directory",
                    dir.display()
                )));
            }
        }
        // `clamp` passes NaN through unchanged.
        for (name, value) in [
            ("image_pdf_dpi", c.image_pdf_dpi),
            ("render_scale", c.render_scale),
            ("docx_image_width_inches", c.docx_image_width_inches),
        ] {
            if !value.is_finite() {
                return Err(ConvertError::InvalidConfig(format!(
                    "{name} must be a finite number"
                )));
            }
        }
        Ok(self.config)
    }
}

fn is_dir(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

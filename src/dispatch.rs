//! The dispatcher: sniff → look up → invoke → materialise.
//!
//! This is the only boundary exposed to front ends. It never returns an
//! error: every procedure failure (including a panic inside a decoder) is
//! logged with full detail and folded into [`ConversionResult::Failed`].
//!
//! Each call is independent. The only shared data is the static rule table,
//! and every job writes to its own uniquely named output file, so callers may
//! run as many dispatches in parallel as they like.

use crate::config::DispatchConfig;
use crate::format::{SourceKind, TargetFormat};
use crate::output::{self, ConversionResult};
use crate::procedures;
use crate::rules::{self, Procedure};
use crate::sniff;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// One request: created per dispatch, consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionJob {
    pub input_path: PathBuf,
    pub source_kind: SourceKind,
    pub target_format: TargetFormat,
    /// Name the user gave the file, if the front end knows it.
    pub original_name: Option<String>,
}

impl ConversionJob {
    /// Build a job, sniffing the input to fix its [`SourceKind`].
    pub fn new(input_path: impl Into<PathBuf>, target_format: TargetFormat) -> Self {
        let input_path = input_path.into();
        let source_kind = sniff::sniff(&input_path);
        Self {
            input_path,
            source_kind,
            target_format,
            original_name: None,
        }
    }

    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    /// Entry name used by the ZIP procedure: the base name of the original
    /// file, else of the input path.
    pub fn archive_entry_name(&self) -> String {
        self.original_name
            .as_deref()
            .and_then(|n| Path::new(n).file_name())
            .or_else(|| self.input_path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| output::DEFAULT_STEM.to_string())
    }

    /// The rule that would handle this job, if any.
    pub fn procedure(&self) -> Option<Procedure> {
        rules::lookup(self.source_kind, self.target_format)
    }

    /// Display name for the delivered file (`{stem}.{token}`).
    pub fn output_file_name(&self) -> String {
        let fallback = self.input_path.file_name().map(|n| n.to_string_lossy());
        let original = self.original_name.as_deref().or(fallback.as_deref());
        output::output_file_name(original, self.target_format)
    }
}

/// What a front end needs to offer only valid choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub source_kind: SourceKind,
    pub mime: &'static str,
    pub reachable: Vec<TargetFormat>,
}

/// Sniff `input` and list the targets it can be converted to.
pub fn inspect(input: impl AsRef<Path>) -> Inspection {
    let source_kind = sniff::sniff(input.as_ref());
    Inspection {
        source_kind,
        mime: source_kind.mime_hint(),
        reachable: rules::reachable_targets(source_kind),
    }
}

/// Convert `input` to the format named by `target` (e.g. `"pdf"`).
///
/// Runs on tokio's blocking pool because decoders and pdfium are CPU-bound
/// and not async-safe.
///
/// # Example
/// ```rust,no_run
/// use edgequake_fileconv::{dispatch, ConversionResult, DispatchConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = DispatchConfig::default();
/// match dispatch("/tmp/upload-123", "docx", &config).await {
///     ConversionResult::Success(path) => println!("wrote {}", path.display()),
///     other => eprintln!("{}", other.user_message()),
/// }
/// # }
/// ```
pub async fn dispatch(
    input: impl AsRef<Path>,
    target: &str,
    config: &DispatchConfig,
) -> ConversionResult {
    let input = input.as_ref().to_path_buf();
    let target = target.to_string();
    let config = config.clone();
    spawn(move || dispatch_blocking(&input, &target, &config)).await
}

/// Async form of [`run_job`] for callers that built the job themselves.
pub async fn dispatch_job(job: ConversionJob, config: &DispatchConfig) -> ConversionResult {
    let config = config.clone();
    spawn(move || run_job(&job, &config)).await
}

/// Synchronous core of [`dispatch`].
pub fn dispatch_blocking(
    input: impl AsRef<Path>,
    target: &str,
    config: &DispatchConfig,
) -> ConversionResult {
    let input = input.as_ref();
    let target_format = match target.parse::<TargetFormat>() {
        Ok(f) => f,
        Err(e) => {
            info!("{}; reporting unsupported", e);
            return ConversionResult::Unsupported;
        }
    };
    run_job(&ConversionJob::new(input, target_format), config)
}

/// Look up and run the procedure for an already-sniffed job.
pub fn run_job(job: &ConversionJob, config: &DispatchConfig) -> ConversionResult {
    let start = Instant::now();
    info!(
        "Dispatching {} ({}) → {}",
        job.input_path.display(),
        job.source_kind,
        job.target_format
    );

    let Some(procedure) = job.procedure() else {
        info!(
            "No rule for {} → {}; unsupported",
            job.source_kind, job.target_format
        );
        return ConversionResult::Unsupported;
    };
    debug!("Selected procedure {}", procedure);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        procedures::run(procedure, job, config)
            .and_then(|bytes| output::materialise(&bytes, job.target_format, config))
    }));

    match outcome {
        Ok(Ok(path)) => {
            info!(
                "Converted {} via {} in {}ms → {}",
                job.input_path.display(),
                procedure,
                start.elapsed().as_millis(),
                path.display()
            );
            ConversionResult::Success(path)
        }
        Ok(Err(e)) => {
            error!(
                "Conversion {} failed for {}: {}",
                procedure,
                job.input_path.display(),
                e
            );
            ConversionResult::Failed(e.to_string())
        }
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            error!(
                "Conversion {} panicked for {}: {}",
                procedure,
                job.input_path.display(),
                reason
            );
            ConversionResult::Failed(format!("procedure panicked: {reason}"))
        }
    }
}

async fn spawn<F>(work: F) -> ConversionResult
where
    F: FnOnce() -> ConversionResult + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.unwrap_or_else(|e| {
        error!("Conversion task did not complete: {}", e);
        ConversionResult::Failed(format!("conversion task did not complete: {e}"))
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

//! CLI binary for edgequake-fileconv.
//!
//! A thin shim over the library crate: maps CLI flags to `DispatchConfig`,
//! runs one dispatch, and moves the result to its delivery name.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_fileconv::{
    dispatch_job, inspect, menu_rows, menu_rows_for, reachable_targets, ConversionJob,
    ConversionResult, DispatchConfig, SourceKind, TargetFormat, CHOOSE_FORMAT_PROMPT,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Word document to plain text (writes ./contract.txt)
  fileconv contract.docx --to txt

  # First page of a PDF as a PNG, explicit destination
  fileconv slides.pdf --to png -o cover.png

  # Uploads usually arrive without a useful name; pass the original one
  fileconv /tmp/upload-7f3a --name "Holiday Photo.heic.jpg" --to pdf

  # What can this file become?
  fileconv --inspect-only mystery.bin

  # Machine-readable result
  fileconv --json notes.txt --to docx

  # Every target format, as the two-column menu
  fileconv --list-formats

SUPPORTED CONVERSIONS:
  Source   Targets
  ───────  ──────────────────────────────────
  image    jpg, png, bmp, webp, pdf, docx, zip
  pdf      jpg, png, bmp, webp, docx, txt, zip
  docx     txt, zip
  text     docx, zip
  unknown  zip

  The source type is detected from the file's bytes; the name is ignored.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH      Path to libpdfium (file or directory). Needed for PDF work.
  FILECONV_WORK_DIR    Directory for intermediate output (default: OS temp dir)
  RUST_LOG             Override the log filter (e.g. edgequake_fileconv=debug)

EXIT STATUS:
  0  conversion succeeded
  1  conversion failed
  2  the file type cannot be converted to the requested format
"#;

/// Convert a file to PDF, DOCX, TXT, an image format, or ZIP.
#[derive(Parser, Debug)]
#[command(
    name = "fileconv",
    version,
    about = "Convert a file to PDF, DOCX, TXT, an image format, or ZIP",
    long_about = "Detect what a file really is from its content (image, PDF, Word document, \
plain text) and convert it to the requested format. Any file can be wrapped in a ZIP.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// File to convert.
    #[arg(required_unless_present = "list_formats")]
    input: Option<PathBuf>,

    /// Target format token: pdf, docx, jpg, png, txt, webp, bmp, zip.
    #[arg(short, long, env = "FILECONV_TO")]
    to: Option<String>,

    /// Write the result here instead of ./<name>.<format>.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Original file name, used for the delivered name and the ZIP entry.
    #[arg(long)]
    name: Option<String>,

    /// Directory for intermediate output.
    #[arg(long, env = "FILECONV_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Path to the pdfium shared library (file or containing directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Resolution assumed for image→PDF page sizing (36–600).
    #[arg(long, env = "FILECONV_IMAGE_DPI", default_value_t = 100.0)]
    image_dpi: f32,

    /// Scale factor for PDF page rendering (0.25–8).
    #[arg(long, env = "FILECONV_RENDER_SCALE", default_value_t = 1.0)]
    render_scale: f32,

    /// Report the detected type and reachable formats, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print the target format menu and exit.
    #[arg(long)]
    list_formats: bool,

    /// Output a JSON result instead of a message.
    #[arg(long, env = "FILECONV_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "FILECONV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FILECONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FILECONV_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Format menu ──────────────────────────────────────────────────────
    if cli.list_formats {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&menu_rows()).context("Failed to serialise menu")?
            );
        } else {
            println!("{}", CHOOSE_FORMAT_PROMPT);
            print_menu(&TargetFormat::ALL);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let input = cli
        .input
        .clone()
        .context("An input file is required")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let report = inspect(&input);
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise inspection")?
            );
        } else {
            println!("File:         {}", input.display());
            println!("Detected:     {}", report.source_kind);
            println!("MIME:         {}", report.mime);
            println!("Convertible to:");
            print_menu(&report.reachable);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(token) = cli.to.as_deref() else {
        anyhow::bail!("--to <FORMAT> is required (see --list-formats)");
    };

    // An unknown token is just another unsupported pair.
    let target: TargetFormat = match token.parse() {
        Ok(t) => t,
        Err(_) => {
            report(&cli, &ConversionResult::Unsupported, None, None);
            return Ok(ExitCode::from(2));
        }
    };

    let config = build_config(&cli)?;

    let mut job = ConversionJob::new(input.as_path(), target);
    if let Some(ref name) = cli.name {
        job = job.with_original_name(name.clone());
    }
    if job.source_kind == SourceKind::Unknown && !cli.quiet && !cli.json {
        eprintln!(
            "{}",
            dim(&format!(
                "Unrecognised content; only zip is available ({})",
                reachable_targets(SourceKind::Unknown)
                    .iter()
                    .map(|t| t.token())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        );
    }
    let destination = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(job.output_file_name()));
    if same_file(&input, &destination) {
        anyhow::bail!(
            "Refusing to overwrite the input {}; pass -o with another path",
            destination.display()
        );
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let spinner = show_progress.then(|| spinner(&job));
    let start = Instant::now();
    let result = dispatch_job(job, &config).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let delivered = match result {
        ConversionResult::Success(ref produced) => Some(
            deliver(produced, &destination)
                .with_context(|| format!("Failed to write {}", destination.display()))?,
        ),
        _ => None,
    };

    report(&cli, &result, delivered.as_deref(), Some(start));

    Ok(match result {
        ConversionResult::Success(_) => ExitCode::SUCCESS,
        ConversionResult::Unsupported => ExitCode::from(2),
        ConversionResult::Failed(_) => ExitCode::FAILURE,
    })
}

/// Map CLI args to `DispatchConfig`.
fn build_config(cli: &Cli) -> Result<DispatchConfig> {
    let mut builder = DispatchConfig::builder()
        .image_pdf_dpi(cli.image_dpi)
        .render_scale(cli.render_scale);
    if let Some(ref dir) = cli.work_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib);
    }
    builder.build().context("Invalid configuration")
}

fn spinner(job: &ConversionJob) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message(format!("{} → {}", job.source_kind, job.target_format));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Move the dispatcher's output to `destination`. The intermediate file is
/// gone afterwards whether or not delivery worked.
fn deliver(produced: &Path, destination: &Path) -> io::Result<PathBuf> {
    if std::fs::rename(produced, destination).is_ok() {
        return Ok(destination.to_path_buf());
    }
    // Different filesystem: copy, then drop the original.
    let copied = std::fs::copy(produced, destination);
    let removed = std::fs::remove_file(produced);
    copied?;
    removed?;
    Ok(destination.to_path_buf())
}

/// `true` when both paths resolve to the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn report(
    cli: &Cli,
    result: &ConversionResult,
    delivered: Option<&Path>,
    start: Option<Instant>,
) {
    if cli.json {
        let value = serde_json::json!({
            "status": result,
            "message": result.user_message(),
            "output": delivered,
        });
        match serde_json::to_string_pretty(&value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{} {e}", red("✘")),
        }
        return;
    }

    match result {
        ConversionResult::Success(_) => {
            if cli.quiet {
                return;
            }
            eprintln!("{}", green(result.user_message()));
            if let Some(path) = delivered {
                let elapsed = start.map(|s| s.elapsed().as_millis()).unwrap_or(0);
                eprintln!(
                    "   →  {}  {}",
                    bold(&path.display().to_string()),
                    dim(&format!("{elapsed}ms"))
                );
            }
        }
        ConversionResult::Unsupported => eprintln!("{}", red(result.user_message())),
        ConversionResult::Failed(reason) => {
            eprintln!("{}", red(result.user_message()));
            if cli.verbose {
                eprintln!("   {}", dim(reason));
            }
        }
    }
}

fn print_menu(formats: &[TargetFormat]) {
    if formats.is_empty() {
        println!("  {}", dim("(none)"));
        return;
    }
    for row in menu_rows_for(formats) {
        let cells: Vec<String> = row
            .iter()
            .map(|o| format!("{:<12} {}", o.label, dim(&format!("[{}]", o.callback))))
            .collect();
        println!("  {}", cells.join("    "));
    }
}

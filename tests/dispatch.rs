//! Integration tests for the dispatcher.
//!
//! Fixtures are generated at test time (image crate, docx-rs, a hand-built
//! PDF), so no files need to be checked in. Tests that exercise pdfium skip
//! when the library cannot be bound.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium cargo test --test dispatch -- --nocapture

use edgequake_fileconv::procedures::docx::paragraph_texts;
use edgequake_fileconv::{
    dispatch, dispatch_blocking, is_pdfium_available, lookup, sniff_bytes, ConversionResult,
    DispatchConfig, SourceKind, TargetFormat,
};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test when no pdfium library can be bound.
macro_rules! skip_unless_pdfium {
    ($config:expr) => {
        if !is_pdfium_available($config) {
            println!("SKIP — pdfium not found; set PDFIUM_LIB_PATH to run");
            return;
        }
    };
}

/// Route library logs through the test harness; `RUST_LOG=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Workspace {
    inputs: TempDir,
    outputs: TempDir,
    config: DispatchConfig,
}

impl Workspace {
    fn new() -> Self {
        init_tracing();
        let inputs = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        let config = DispatchConfig::builder()
            .output_dir(outputs.path())
            .build()
            .expect("valid config");
        Self {
            inputs,
            outputs,
            config,
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.inputs.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn output_count(&self) -> usize {
        std::fs::read_dir(self.outputs.path()).unwrap().count()
    }
}

/// Page 1 is US Letter portrait; later pages are landscape so a render of
/// the wrong page shows up in the output size.
fn page_size(index: usize) -> (u32, u32) {
    if index == 0 {
        (612, 792)
    } else {
        (792, 612)
    }
}

/// A valid PDF with one Helvetica text line per page.
fn minimal_pdf(pages: &[&str]) -> Vec<u8> {
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..pages.len())
                .map(|i| format!("{} 0 R", 4 + 2 * i))
                .collect::<Vec<_>>()
                .join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        let content = format!("BT /F1 24 Tf 72 400 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page_size(i).0,
            page_size(i).1,
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7) as u8, (y * 5) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn sample_docx(paragraphs: &[&str]) -> Vec<u8> {
    let docx = paragraphs.iter().fold(docx_rs::Docx::new(), |doc, text| {
        doc.add_paragraph(docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)))
    });
    let mut buf = Vec::new();
    docx.build().pack(Cursor::new(&mut buf)).unwrap();
    buf
}

/// One input per source kind.
fn samples(ws: &Workspace) -> Vec<(SourceKind, PathBuf)> {
    vec![
        (SourceKind::Image, ws.write("photo", &sample_png(40, 30))),
        (
            SourceKind::Pdf,
            ws.write("paper", &minimal_pdf(&["Page 1", "Page 2"])),
        ),
        (
            SourceKind::PlainText,
            ws.write("notes", b"first line\nsecond line\n"),
        ),
        (SourceKind::Docx, ws.write("letter", &sample_docx(&["A", "B", "C"]))),
        (
            SourceKind::Unknown,
            ws.write("blob", &[0x00, 0x01, 0x02, 0xfe, 0x7f, 0x00, 0x10, 0x11]),
        ),
    ]
}

fn needs_pdfium(kind: SourceKind, target: TargetFormat) -> bool {
    matches!(
        (kind, target),
        (SourceKind::Pdf, t) if t != TargetFormat::Zip
    ) || (kind, target) == (SourceKind::Image, TargetFormat::Pdf)
}

/// What the output of a successful conversion to `target` sniffs as.
fn expected_output_kind(target: TargetFormat) -> SourceKind {
    match target {
        TargetFormat::Pdf => SourceKind::Pdf,
        TargetFormat::Docx => SourceKind::Docx,
        TargetFormat::Txt => SourceKind::PlainText,
        TargetFormat::Zip => SourceKind::Unknown,
        _ => SourceKind::Image,
    }
}

fn unwrap_success(result: ConversionResult) -> PathBuf {
    match result {
        ConversionResult::Success(path) => path,
        other => panic!("expected success, got {other:?}"),
    }
}

fn zip_entry(path: &Path) -> (String, Vec<u8>) {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 1, "archive must hold exactly one entry");
    let mut entry = archive.by_index(0).unwrap();
    let name = entry.name().to_string();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    (name, data)
}

// ── Rule table (no pdfium) ───────────────────────────────────────────────────

#[test]
fn test_samples_sniff_as_intended() {
    let ws = Workspace::new();
    for (kind, path) in samples(&ws) {
        assert_eq!(
            sniff_bytes(&std::fs::read(&path).unwrap()),
            kind,
            "fixture {}",
            path.display()
        );
    }
}

#[test]
fn test_cross_product_outcomes() {
    let ws = Workspace::new();
    let pdfium = is_pdfium_available(&ws.config);

    for (kind, input) in samples(&ws) {
        for target in TargetFormat::ALL {
            let result = dispatch_blocking(&input, target.token(), &ws.config);
            let context = format!("{kind} → {target}");

            if lookup(kind, target).is_none() {
                assert_eq!(result, ConversionResult::Unsupported, "{context}");
                continue;
            }
            if needs_pdfium(kind, target) && !pdfium {
                assert!(
                    matches!(result, ConversionResult::Failed(_)),
                    "{context}: {result:?}"
                );
                continue;
            }

            let path = unwrap_success(result);
            let bytes = std::fs::read(&path).unwrap();
            assert_eq!(
                sniff_bytes(&bytes),
                expected_output_kind(target),
                "{context}: output sniffs wrong"
            );
            assert_eq!(
                path.extension().and_then(|e| e.to_str()),
                Some(target.token()),
                "{context}"
            );
            std::fs::remove_file(path).unwrap();
        }
    }

    assert_eq!(ws.output_count(), 0, "failed jobs must not leave outputs");
}

#[test]
fn test_zip_is_total_and_byte_identical() {
    let ws = Workspace::new();
    for (kind, input) in samples(&ws) {
        let original = std::fs::read(&input).unwrap();
        let path = unwrap_success(dispatch_blocking(&input, "zip", &ws.config));
        let (name, data) = zip_entry(&path);
        assert_eq!(Some(name.as_str()), input.file_name().and_then(|n| n.to_str()));
        assert_eq!(data, original, "zip of {kind} must be byte-identical");
    }
}

#[test]
fn test_unknown_token_is_unsupported() {
    let ws = Workspace::new();
    let input = ws.write("notes", b"hello\n");
    for token in ["gif", "", "p d f", "tar.gz"] {
        assert_eq!(
            dispatch_blocking(&input, token, &ws.config),
            ConversionResult::Unsupported,
            "token {token:?}"
        );
    }
}

#[test]
fn test_text_with_image_magic_prefix_is_still_text() {
    let ws = Workspace::new();
    for (name, body) in [
        ("log", &b"BMW service log\nOil changed at 40k\n"[..]),
        ("gif-notes", &b"GIF89a is the animated format we use\n"[..]),
    ] {
        let input = ws.write(name, body);
        assert_eq!(
            dispatch_blocking(&input, "png", &ws.config),
            ConversionResult::Unsupported,
            "{name}"
        );
        let path = unwrap_success(dispatch_blocking(&input, "docx", &ws.config));
        let paragraphs = paragraph_texts(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(paragraphs[0], std::str::from_utf8(body).unwrap().lines().next().unwrap());
    }
}

#[test]
fn test_token_case_and_dot_are_tolerated() {
    let ws = Workspace::new();
    let input = ws.write("notes", b"hello\n");
    let path = unwrap_success(dispatch_blocking(&input, ".DOCX", &ws.config));
    assert_eq!(sniff_bytes(&std::fs::read(path).unwrap()), SourceKind::Docx);
}

#[test]
fn test_empty_file_to_pdf_is_unsupported() {
    let ws = Workspace::new();
    let input = ws.write("empty.pdf", b"");
    assert_eq!(
        dispatch_blocking(&input, "pdf", &ws.config),
        ConversionResult::Unsupported
    );
}

#[test]
fn test_truncated_pdf_fails() {
    let ws = Workspace::new();
    let input = ws.write("cut.pdf", b"%PDF-1.4\n1 0 obj\n<< /Type /Cat");
    let result = dispatch_blocking(&input, "txt", &ws.config);
    assert!(matches!(result, ConversionResult::Failed(_)), "{result:?}");
    assert_eq!(ws.output_count(), 0);
}

#[test]
fn test_missing_input_zip_fails() {
    let ws = Workspace::new();
    let missing = ws.inputs.path().join("gone");
    // Sniffs Unknown, so the only reachable rule is zip, which then cannot read it.
    let result = dispatch_blocking(&missing, "zip", &ws.config);
    assert!(matches!(result, ConversionResult::Failed(_)), "{result:?}");
}

// ── Text & DOCX ──────────────────────────────────────────────────────────────

#[test]
fn test_docx_to_txt_joins_paragraphs() {
    let ws = Workspace::new();
    let input = ws.write("letter.docx", &sample_docx(&["A", "B", "C"]));
    let path = unwrap_success(dispatch_blocking(&input, "txt", &ws.config));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "A\nB\nC");
}

#[test]
fn test_text_to_docx_one_paragraph_per_line() {
    let ws = Workspace::new();
    let input = ws.write("notes.txt", b"line1\nline2\n");
    let path = unwrap_success(dispatch_blocking(&input, "docx", &ws.config));
    let paragraphs = paragraph_texts(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(paragraphs, vec!["line1", "line2"]);
}

#[test]
fn test_text_docx_text_round_trip_trims_lines() {
    let ws = Workspace::new();
    let input = ws.write("notes.txt", b"  alpha  \r\nbeta\n\ngamma");
    let docx = unwrap_success(dispatch_blocking(&input, "docx", &ws.config));
    let txt = unwrap_success(dispatch_blocking(&docx, "txt", &ws.config));
    assert_eq!(std::fs::read_to_string(txt).unwrap(), "alpha\nbeta\n\ngamma");
}

// ── Image ────────────────────────────────────────────────────────────────────

#[test]
fn test_image_to_png_keeps_dimensions() {
    let ws = Workspace::new();
    let input = ws.write("photo.jpg", &sample_png(64, 48));
    let path = unwrap_success(dispatch_blocking(&input, "png", &ws.config));
    let img = image::open(path).unwrap();
    assert_eq!((img.width(), img.height()), (64, 48));
}

#[test]
fn test_image_to_pdf_is_single_page() {
    let ws = Workspace::new();
    skip_unless_pdfium!(&ws.config);

    let input = ws.write("photo", &sample_png(200, 100));
    let path = unwrap_success(dispatch_blocking(&input, "pdf", &ws.config));
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(sniff_bytes(&bytes), SourceKind::Pdf);

    // Back through the dispatcher: the page renders to an image again.
    let rendered = unwrap_success(dispatch_blocking(&path, "png", &ws.config));
    let img = image::open(rendered).unwrap();
    assert!(img.width() > img.height(), "landscape input stays landscape");
}

// ── PDF (pdfium) ─────────────────────────────────────────────────────────────

#[test]
fn test_pdf_to_image_renders_first_page_only() {
    let ws = Workspace::new();
    skip_unless_pdfium!(&ws.config);

    let input = ws.write("deck.pdf", &minimal_pdf(&["Page 1", "Page 2", "Page 3"]));
    for token in ["png", "jpg", "bmp", "webp"] {
        let path = unwrap_success(dispatch_blocking(&input, token, &ws.config));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(sniff_bytes(&bytes), SourceKind::Image, "{token}");
        let img = image::load_from_memory(&bytes).unwrap();
        // Page 1's size at scale 1.0; pages 2 and 3 are landscape.
        assert_eq!((img.width(), img.height()), page_size(0), "{token}");
    }
}

#[test]
fn test_pdf_to_txt_keeps_page_order() {
    let ws = Workspace::new();
    skip_unless_pdfium!(&ws.config);

    let input = ws.write("doc.pdf", &minimal_pdf(&["Page 1", "Page 2", "Page 3"]));
    let path = unwrap_success(dispatch_blocking(&input, "txt", &ws.config));
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("Page 1\nPage 2"), "pages must not run together: {text:?}");
    let positions: Vec<usize> = ["Page 1", "Page 2", "Page 3"]
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("{needle} missing in {text:?}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text:?}");
}

#[test]
fn test_pdf_to_docx_one_paragraph_per_page() {
    let ws = Workspace::new();
    skip_unless_pdfium!(&ws.config);

    let input = ws.write("doc.pdf", &minimal_pdf(&["Page 1", "Page 2", "Page 3"]));
    let path = unwrap_success(dispatch_blocking(&input, "docx", &ws.config));
    let paragraphs = paragraph_texts(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(paragraphs.len(), 3);
    for (i, para) in paragraphs.iter().enumerate() {
        assert!(para.contains(&format!("Page {}", i + 1)), "{paragraphs:?}");
    }
}

#[test]
fn test_pdf_without_pages_fails() {
    let ws = Workspace::new();
    skip_unless_pdfium!(&ws.config);

    let input = ws.write("hollow.pdf", &minimal_pdf(&[]));
    for token in ["png", "txt", "docx"] {
        let result = dispatch_blocking(&input, token, &ws.config);
        assert!(matches!(result, ConversionResult::Failed(_)), "{token}: {result:?}");
    }
    assert_eq!(ws.output_count(), 0);
}

#[test]
fn test_render_scale_is_applied() {
    let ws = Workspace::new();
    let config = DispatchConfig::builder()
        .output_dir(ws.outputs.path())
        .render_scale(0.5)
        .build()
        .unwrap();
    skip_unless_pdfium!(&config);

    let input = ws.write("doc.pdf", &minimal_pdf(&["Page 1"]));
    let path = unwrap_success(dispatch_blocking(&input, "png", &config));
    let img = image::open(path).unwrap();
    assert_eq!((img.width(), img.height()), (306, 396));
}

// ── Async dispatch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_async_dispatch() {
    let ws = Workspace::new();
    let input = ws.write("letter", &sample_docx(&["hello", "world"]));
    let path = unwrap_success(dispatch(&input, "txt", &ws.config).await);
    assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\nworld");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatches_get_distinct_outputs() {
    let ws = Workspace::new();
    let mut handles = Vec::new();
    for i in 0..8 {
        let input = ws.write(&format!("note{i}"), format!("note number {i}\n").as_bytes());
        let config = ws.config.clone();
        handles.push(tokio::spawn(async move {
            (i, dispatch(&input, "zip", &config).await)
        }));
    }

    let mut outputs = Vec::new();
    for handle in handles {
        let (i, result) = handle.await.unwrap();
        let path = unwrap_success(result);
        let (name, data) = zip_entry(&path);
        assert_eq!(name, format!("note{i}"));
        assert_eq!(data, format!("note number {i}\n").into_bytes());
        outputs.push(path);
    }

    outputs.sort();
    outputs.dedup();
    assert_eq!(outputs.len(), 8, "every job must get its own output file");
}

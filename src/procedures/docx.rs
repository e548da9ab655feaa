//! DOCX procedures via docx-rs: text→docx, docx→txt, and the document
//! builders shared with the PDF and raster procedures.

use crate::error::ConvertError;
use docx_rs::{
    read_docx, BreakType, DocumentChild, Docx, Paragraph, ParagraphChild, Pic, Run, RunChild,
};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Text→DOCX: one paragraph per line, whitespace-trimmed, undecodable bytes dropped.
pub fn from_text(input: &Path) -> Result<Vec<u8>, ConvertError> {
    let bytes = std::fs::read(input).map_err(|e| ConvertError::io(input, e))?;
    let text = decode_utf8_dropping_invalid(&bytes);
    let docx = text
        .lines()
        .fold(Docx::new(), |doc, line| doc.add_paragraph(text_paragraph(line.trim())));
    pack(docx)
}

/// DOCX→TXT: body paragraph texts joined by newlines, in document order.
pub fn to_text(input: &Path) -> Result<Vec<u8>, ConvertError> {
    let bytes = std::fs::read(input).map_err(|e| ConvertError::io(input, e))?;
    let paragraphs = paragraph_texts(&bytes)?;
    debug!("Read {} paragraphs", paragraphs.len());
    Ok(paragraphs.join("\n").into_bytes())
}

/// Text of each top-level body paragraph. Tables and other blocks are skipped.
pub fn paragraph_texts(bytes: &[u8]) -> Result<Vec<String>, ConvertError> {
    let doc = read_docx(bytes).map_err(|e| ConvertError::Docx(format!("read failed: {e}")))?;
    Ok(doc
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(&para.children)),
            _ => None,
        })
        .collect())
}

/// A document with one paragraph per entry; line breaks inside an entry
/// become soft breaks so each entry stays a single paragraph.
pub fn paged_document(pages: &[String]) -> Result<Vec<u8>, ConvertError> {
    let docx = pages
        .iter()
        .fold(Docx::new(), |doc, page| doc.add_paragraph(broken_paragraph(page)));
    pack(docx)
}

/// A document holding a single picture of the given size in EMU.
pub fn picture_document(png: &[u8], width_emu: u32, height_emu: u32) -> Result<Vec<u8>, ConvertError> {
    let pic = Pic::new(png).size(width_emu, height_emu);
    let docx = Docx::new().add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)));
    pack(docx)
}

fn pack(docx: Docx) -> Result<Vec<u8>, ConvertError> {
    let mut buf = Vec::new();
    docx.build()
        .pack(Cursor::new(&mut buf))
        .map_err(|e| ConvertError::Docx(format!("pack failed: {e}")))?;
    Ok(buf)
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(xml_safe(text)))
}

fn broken_paragraph(text: &str) -> Paragraph {
    let run = text.lines().enumerate().fold(Run::new(), |run, (i, line)| {
        let run = if i > 0 {
            run.add_break(BreakType::TextWrapping)
        } else {
            run
        };
        run.add_text(xml_safe(line))
    });
    Paragraph::new().add_run(run)
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut out = String::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run_text(&run.children, &mut out),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        push_run_text(&run.children, &mut out);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn push_run_text(children: &[RunChild], out: &mut String) {
    for child in children {
        match child {
            RunChild::Text(text) => out.push_str(&text.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// Drop characters outside the XML 1.0 `Char` production (NUL, FF, ESC,
/// U+FFFE, …); Word refuses to open a part that contains them.
fn xml_safe(text: &str) -> String {
    text.chars().filter(|&c| is_xml_char(c)).collect()
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn decode_utf8_dropping_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

//! Incident report rendering: plain-text preview and PDF export.
//!
//! Both renderings consume a field snapshot, never the live session, so the
//! renderer stays a pure function of its inputs.

use std::collections::BTreeMap;
use std::io::BufWriter;

use chrono::{DateTime, Local};
use printpdf::*;
use thiserror::Error;

use crate::config::{FIRMA, LEMA, ORGANIZACION};
use crate::fields::FieldKey;

/// Suggested filename for the downloaded document.
pub const PDF_FILENAME: &str = "Reporte_ORH.pdf";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF font error: {0}")]
    Font(String),
    #[error("PDF write error: {0}")]
    Write(String),
}

/// Flatten a field snapshot into the operator-facing report text.
pub fn render_text(snapshot: &BTreeMap<FieldKey, String>, now: DateTime<Local>) -> String {
    let value = |key: FieldKey| snapshot.get(&key).map(String::as_str).unwrap_or_default();
    let line = |key: FieldKey| format!("{}: {}", key.report_label(), value(key));

    let mut out = String::new();
    out.push_str(ORGANIZACION);
    out.push('\n');
    out.push_str(&format!("FECHA: {}\n\n", now.format("%d/%m/%Y %H:%M")));

    for key in FieldKey::INFO {
        out.push_str(&line(key));
        out.push('\n');
    }

    out.push_str("\nMARCH:\n");
    for key in FieldKey::CHECKLIST {
        out.push_str(&line(key));
        out.push('\n');
    }

    out.push('\n');
    for key in FieldKey::TEXTOS {
        out.push_str(&line(key));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(LEMA);
    out.push('\n');
    out.push_str(FIRMA);
    out
}

/// Render the report as a single-page A4 PDF. Returns PDF bytes.
pub fn render_pdf(
    snapshot: &BTreeMap<FieldKey, String>,
    now: DateTime<Local>,
) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new("Reporte AME", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Font(e.to_string()))?;

    let mut y = Mm(280.0);
    for raw_line in render_text(snapshot, now).lines() {
        let text = encode_for_builtin_font(raw_line);
        let is_heading = raw_line == ORGANIZACION || raw_line == "MARCH:";
        let face = if is_heading { &bold } else { &font };
        let size = if is_heading { 13.0 } else { 11.0 };
        for wrapped in wrap_text(&text, 90) {
            layer.use_text(&wrapped, size, Mm(20.0), y, face);
            y -= Mm(6.0);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Write(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| ReportError::Write(e.to_string()))
}

/// Replace characters the builtin PDF fonts cannot encode.
///
/// The builtin fonts cover the Latin-1 repertoire; anything beyond it is
/// substituted with `?` so an exotic character in a field can never fail
/// the export.
fn encode_for_builtin_font(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 { c } else { '?' })
        .collect()
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

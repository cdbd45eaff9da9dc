use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::{error, info};
use printpdf::{
    Actions, BorderArray, BuiltinFont, ColorArray, HighlightingMode, IndirectFontRef,
    LinkAnnotation, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rect,
};

use crate::normalizer::{self, Fragment};
use crate::scraper::JobRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One document per record inside a timestamped directory.
    PerJob,
    /// One combined document with a page break between records.
    Combined,
}

pub const COMBINED_FILE_NAME: &str = "jobs.pdf";

// US letter, fixed margins, estimated glyph advance for the built-in fonts.
const PAGE_WIDTH_MM: f64 = 215.9;
const PAGE_HEIGHT_MM: f64 = 279.4;
const MARGIN_MM: f64 = 20.0;
const FONT_SIZE_PT: f64 = 11.0;
const LINE_HEIGHT_MM: f64 = 5.5;
const WRAP_COLUMNS: usize = 90;
const PT_TO_MM: f64 = 0.352_778;
const CHAR_WIDTH_MM: f64 = FONT_SIZE_PT * 0.5 * PT_TO_MM;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Link(String),
}

pub type Line = Vec<Inline>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportElement {
    Block(Vec<Line>),
    PageBreak,
}

// One self-contained visual block per record: bold-labeled title line,
// bold-labeled description body, bold-labeled link line.
pub fn job_block(record: &JobRecord) -> Vec<Line> {
    let mut lines = Vec::new();

    lines.extend(wrap_line(vec![
        Inline::Bold("Job Title:".to_string()),
        Inline::Text(record.title.clone()),
    ]));
    lines.push(Vec::new());

    lines.push(vec![Inline::Bold("Job Description:".to_string())]);
    match &record.description {
        Some(html) => {
            for fragment in normalizer::fragments(html) {
                append_fragment(&mut lines, fragment);
            }
        }
        None => lines.push(vec![Inline::Text("N/A".to_string())]),
    }
    lines.push(Vec::new());

    lines.push(vec![
        Inline::Bold("Job Link:".to_string()),
        Inline::Link(record.link.clone()),
    ]);

    lines
}

pub fn layout_report(records: &[JobRecord]) -> Vec<ReportElement> {
    let mut elements = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            elements.push(ReportElement::PageBreak);
        }
        elements.push(ReportElement::Block(job_block(record)));
    }
    elements
}

pub fn write_combined(records: &[JobRecord], path: &Path) -> Result<()> {
    let bytes = render_report("Job Report", &layout_report(records))?;
    fs::write(path, bytes).with_context(|| format!("failed to write {:?}", path))?;
    info!(
        "Successfully saved {} jobs to PDF file {:?}",
        records.len(),
        path
    );
    Ok(())
}

// One file per record in a fresh timestamped directory. File names derive
// from the raw title; a title the filesystem rejects loses that one
// artifact, already-written files stay.
pub fn write_per_job(records: &[JobRecord], site_key: &str) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let dir = PathBuf::from(format!("jobs_{}_{}", site_key, timestamp));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {:?}", dir))?;

    for (index, record) in records.iter().enumerate() {
        let path = dir.join(format!("{}_{}.pdf", record.title, index + 1));
        let block = ReportElement::Block(job_block(record));
        let written = render_report(&record.title, std::slice::from_ref(&block))
            .and_then(|bytes| {
                fs::write(&path, bytes).with_context(|| format!("failed to write {:?}", path))
            });
        match written {
            Ok(()) => info!(
                "Successfully saved job '{}' to PDF file {:?}",
                record.title, path
            ),
            Err(err) => error!("{:#}", err),
        }
    }

    Ok(dir)
}

pub fn export_json(records: &[JobRecord], path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(records).context("failed to serialize job records")?;
    fs::write(path, json).with_context(|| format!("failed to write {:?}", path))?;
    info!("Saved {} job records to {:?}", records.len(), path);
    Ok(())
}

fn append_fragment(lines: &mut Vec<Line>, fragment: Fragment) {
    match fragment {
        Fragment::Text(text) => lines.extend(wrap_line(vec![Inline::Text(text)])),
        Fragment::Bold(text) => lines.extend(wrap_line(vec![Inline::Bold(text)])),
        Fragment::Break => lines.push(Vec::new()),
        Fragment::Bullets(items) => {
            for item in items {
                lines.extend(wrap_line(vec![Inline::Text(format!("\u{2022} {}", item))]));
            }
            lines.push(Vec::new());
        }
    }
}

// Word-wraps a styled line to the page column width. Links never wrap;
// adjacent words of the same style merge into one span.
fn wrap_line(spans: Line) -> Vec<Line> {
    let mut out: Vec<Line> = Vec::new();
    let mut current: Line = Vec::new();
    let mut used = 0usize;

    for span in spans {
        let (text, bold) = match span {
            Inline::Text(text) => (text, false),
            Inline::Bold(text) => (text, true),
            Inline::Link(url) => {
                current.push(Inline::Link(url));
                continue;
            }
        };
        for word in text.split_whitespace() {
            let len = word.chars().count();
            if used > 0 && used + 1 + len > WRAP_COLUMNS {
                out.push(std::mem::take(&mut current));
                used = 0;
            }
            push_word(&mut current, word, bold);
            used = if used == 0 { len } else { used + 1 + len };
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn push_word(line: &mut Line, word: &str, bold: bool) {
    match (bold, line.last_mut()) {
        (false, Some(Inline::Text(text))) => {
            text.push(' ');
            text.push_str(word);
        }
        (true, Some(Inline::Bold(text))) => {
            text.push(' ');
            text.push_str(word);
        }
        _ => line.push(if bold {
            Inline::Bold(word.to_string())
        } else {
            Inline::Text(word.to_string())
        }),
    }
}

struct PdfRenderer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

fn render_report(title: &str, elements: &[ReportElement]) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "content");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("failed to load built-in font")?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("failed to load built-in bold font")?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut renderer = PdfRenderer {
        doc,
        layer,
        regular,
        bold,
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    for element in elements {
        match element {
            ReportElement::Block(lines) => {
                for line in lines {
                    if line.is_empty() {
                        renderer.y -= LINE_HEIGHT_MM;
                    } else {
                        renderer.draw_line(line);
                    }
                }
            }
            ReportElement::PageBreak => renderer.new_page(),
        }
    }

    renderer
        .doc
        .save_to_bytes()
        .context("failed to serialize PDF document")
}

impl PdfRenderer {
    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn draw_line(&mut self, line: &Line) {
        // Overflow pagination, distinct from the explicit page breaks.
        if self.y < MARGIN_MM {
            self.new_page();
        }

        let mut x = MARGIN_MM;
        for (index, span) in line.iter().enumerate() {
            if index > 0 {
                x += CHAR_WIDTH_MM;
            }
            match span {
                Inline::Text(text) => {
                    self.layer
                        .use_text(text.clone(), FONT_SIZE_PT as f32, Mm(x as f32), Mm(self.y as f32), &self.regular);
                    x += estimated_width(text);
                }
                Inline::Bold(text) => {
                    self.layer
                        .use_text(text.clone(), FONT_SIZE_PT as f32, Mm(x as f32), Mm(self.y as f32), &self.bold);
                    x += estimated_width(text);
                }
                Inline::Link(url) => {
                    let width = estimated_width(url);
                    self.layer
                        .use_text(url.clone(), FONT_SIZE_PT as f32, Mm(x as f32), Mm(self.y as f32), &self.regular);
                    let rect = Rect::new(
                        Mm(x as f32),
                        Mm((self.y - 1.0) as f32),
                        Mm((x + width) as f32),
                        Mm((self.y + 4.0) as f32),
                    );
                    self.layer.add_link_annotation(LinkAnnotation::new(
                        rect,
                        Some(BorderArray::default()),
                        Some(ColorArray::default()),
                        Actions::uri(url.clone()),
                        Some(HighlightingMode::Invert),
                    ));
                    x += width;
                }
            }
        }
        self.y -= LINE_HEIGHT_MM;
    }
}

fn estimated_width(text: &str) -> f64 {
    text.chars().count() as f64 * CHAR_WIDTH_MM
}

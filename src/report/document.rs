use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::fs;
use std::path::Path;

use super::rows;
use crate::ranking::RankedReport;
use crate::settings::Report;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: f32 = 50.0;
const FONT_SIZE: f32 = 9.0;
// Courier glyphs are 0.6em wide, so this fills the text block at 9pt.
const WRAP_WIDTH: usize = 90;
const INDENT: &str = "    ";

/// Plain text lines of the report, wrapped to the page width.
pub fn layout_lines(report: &RankedReport, title: &str) -> Vec<String> {
    let mut lines = vec![
        title.to_string(),
        format!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S")),
        format!(
            "Ranked candidates: {}    Skipped: {}",
            report.results.len(),
            report.skipped.len()
        ),
        String::new(),
    ];

    if report.is_empty() {
        lines.push("No resumes were processed successfully.".to_string());
    }

    for (idx, row) in rows(report).iter().enumerate() {
        lines.extend(wrap(&format!("#{}  {}", idx + 1, row.filename), ""));
        lines.extend(wrap(&format!("Score: {}%", row.score), INDENT));
        lines.extend(wrap(&row.explanation, INDENT));
        lines.extend(wrap(&format!("Matched: {}", row.matched), INDENT));
        lines.extend(wrap(&format!("Missing: {}", row.missing), INDENT));
        lines.push(String::new());
    }

    if !report.skipped.is_empty() {
        lines.push("Skipped candidates".to_string());
        for skipped in &report.skipped {
            lines.extend(wrap(
                &format!("{}: {}", skipped.filename, skipped.reason.describe()),
                INDENT,
            ));
        }
    }

    lines
}

fn wrap(text: &str, indent: &str) -> Vec<String> {
    let continuation = format!("{indent}{INDENT}");
    let mut lines = Vec::new();
    let mut current = indent.to_string();

    for word in text.split_whitespace() {
        let empty = current.trim().is_empty();
        if !empty && current.len() + word.len() + 1 > WRAP_WIDTH {
            lines.push(current);
            current = continuation.clone();
        }
        if !current.trim().is_empty() {
            current.push(' ');
        }

        // Words wider than the line are split across lines.
        let mut rest = word;
        while current.len() + rest.len() > WRAP_WIDTH {
            let room = WRAP_WIDTH.saturating_sub(current.len()).max(1);
            let cut = split_index(rest, room);
            current.push_str(&rest[..cut]);
            lines.push(current);
            current = continuation.clone();
            rest = &rest[cut..];
        }
        current.push_str(rest);
    }

    lines.push(current);
    lines
}

/// Byte index of the char boundary at most `max_chars` chars into `word`.
fn split_index(word: &str, max_chars: usize) -> usize {
    word.char_indices()
        .nth(max_chars)
        .map_or(word.len(), |(idx, _)| idx)
}

/// Standard PDF fonts only cover Latin-1; keep to printable ASCII.
fn sanitize(line: &str) -> String {
    line.chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '?' })
        .collect()
}

fn page_content(lines: &[String], leading: f32) -> Result<Vec<u8>> {
    let top = PAGE_HEIGHT as f32 - MARGIN - FONT_SIZE;
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![leading.into()]),
        Operation::new("Td", vec![MARGIN.into(), top.into()]),
    ];
    for line in lines {
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(sanitize(line))],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    Ok(Content { operations }.encode()?)
}

pub fn render_pdf(report: &RankedReport, config: &Report) -> Result<Vec<u8>> {
    let lines_per_page = config.lines_per_page.max(1);
    let leading = (PAGE_HEIGHT as f32 - 2.0 * MARGIN) / lines_per_page as f32;
    let lines = layout_lines(report, &config.title);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids: Vec<ObjectId> = Vec::new();
    for chunk in lines.chunks(lines_per_page) {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(chunk, leading)?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.into_iter().map(Object::from).collect();
    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf).context("Failed to serialize PDF report")?;
    Ok(buf)
}

pub fn save_pdf(report: &RankedReport, config: &Report, path: &Path) -> Result<()> {
    let bytes = render_pdf(report, config)?;
    fs::write(path, bytes)
        .with_context(|| format!("Failed to write PDF report '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn test_layout_lists_candidates_in_rank_order() {
        let lines = layout_lines(&sample_report(), "Ranking");
        let alice = lines.iter().position(|l| l == "#1  alice.pdf").unwrap();
        let bob = lines.iter().position(|l| l == "#2  bob, jr.pdf").unwrap();
        assert!(alice < bob);
        assert!(lines.contains(&"    Score: 82.74%".to_string()));
        assert!(lines.contains(&"    Matched: docker, python, sql".to_string()));
        assert!(lines.contains(&"    scan.pdf: could not read text".to_string()));
    }

    #[test]
    fn test_layout_empty_report() {
        let mut report = sample_report();
        report.results.clear();
        let lines = layout_lines(&report, "Ranking");
        assert!(lines.contains(&"No resumes were processed successfully.".to_string()));
    }

    #[test]
    fn test_wrap_long_lines() {
        let long = "skill ".repeat(40);
        let wrapped = wrap(&long, INDENT);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| l.len() <= WRAP_WIDTH + INDENT.len() * 2));
        assert!(wrapped[1].starts_with("        skill"));
    }

    #[test]
    fn test_wrap_splits_unbroken_words() {
        let name = format!("{}.pdf", "a".repeat(200));
        let wrapped = wrap(&format!("#1  {name}"), "");
        assert!(wrapped.len() >= 3);
        assert!(wrapped.iter().all(|l| l.len() <= WRAP_WIDTH));
        let joined: String = wrapped.iter().map(|l| l.trim()).collect();
        assert_eq!(joined, format!("#1{name}"));
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize("José (C++)"), "Jos? (C++)");
    }

    #[test]
    fn test_render_paginates() {
        let report = sample_report();
        let config = Report {
            title: "Ranking".into(),
            lines_per_page: 5,
        };
        let line_count = layout_lines(&report, &config.title).len();
        let bytes = render_pdf(&report, &config).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), line_count.div_ceil(5));
    }

    #[test]
    fn test_save_pdf_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        save_pdf(&sample_report(), &Report::default(), &path).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}

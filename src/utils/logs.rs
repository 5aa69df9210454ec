use anyhow::Result;
use console::{measure_text_width, Style};
use std::path::Path;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::SkipReason;
use crate::ranking::RankedReport;
use crate::report::{format_skills, rows, HEADERS};
use crate::scoring::{JobProfile, ScoreResult};
use crate::settings::{ScoringWeights, Settings};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;
const MAX_CELL_WIDTH: usize = 40;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

/// Installs the global `tracing` subscriber. `RUST_LOG` adds directives on
/// top of `resume_ranker=info`.
pub fn init_tracing() -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("resume_ranker=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber)?;
    Ok(())
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn rank_prefix() -> String {
    magenta().apply_to("[RANK]").to_string()
}

fn ml_prefix() -> String {
    yellow().apply_to("[ML]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_signed(value: f32) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}{:.2}", dim().apply_to(sign), value.abs())
}

fn truncate_cell(cell: &str, width: usize) -> String {
    if cell.chars().count() > width {
        format!("{}...", cell.chars().take(width - 3).collect::<String>())
    } else {
        cell.to_string()
    }
}

fn pad_cell(cell: &str, width: usize) -> String {
    let current = measure_text_width(cell);
    format!("{}{}", cell, " ".repeat(width.saturating_sub(current)))
}

pub fn log_newline() {
    println!();
}

pub fn log_header(title: &str) {
    println!("{}", bold().apply_to(title.to_uppercase()));
}

pub fn log_error(message: &str) {
    eprintln!("{} {}", red().apply_to("[ERROR]"), message);
}

pub fn log_init(job_path: &Path, resume_count: usize, settings: &Settings) {
    println!(
        "{} ranking {} resumes against {}...",
        init_prefix(),
        bold().apply_to(resume_count),
        cyan().apply_to(job_path.display()),
    );
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label("model", 1),
        dim().apply_to(settings.ml.model)
    );
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label("weights", 1),
        dim().apply_to(format!(
            "semantic {:.2} / skill {:.2}",
            settings.scoring.weights.semantic, settings.scoring.weights.skill
        ))
    );
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label("skill scope", 1),
        dim().apply_to(settings.skills.scope)
    );
    println!(
        "{}{} {}",
        tree_end(),
        pad_label("skills", 1),
        dim().apply_to(format!(
            "{} required, {} preferred",
            settings.skills.required.len(),
            settings.skills.preferred.len()
        ))
    );
}

pub fn log_ml_step(message: &str) {
    println!("{} {}", ml_prefix(), message);
}

pub fn log_ml_model_loaded(name: &str, secs: f32) {
    println!(
        "{}{} loaded in {}",
        tree_end(),
        cyan().apply_to(name),
        dim().apply_to(format!("{secs:.1}s"))
    );
}

pub fn log_ml_ready() {
    println!("{} model ready!", ml_prefix());
}

pub fn log_ml_error(error: &str) {
    println!("{} {} {}", ml_prefix(), red().apply_to("error:"), dim().apply_to(error));
}

pub fn log_rank_start(total: usize, required: usize, preferred: usize) {
    println!(
        "{} scoring {} resumes ({} required, {} preferred skills)",
        rank_prefix(),
        bold().apply_to(total),
        bold().apply_to(required),
        bold().apply_to(preferred),
    );
}

pub fn log_rank_progress(current: usize, total: usize) {
    println!(
        "{} progress: {}{}",
        rank_prefix(),
        bold().apply_to(current),
        dim().apply_to(format!("/{total}"))
    );
}

pub fn log_candidate_skipped(filename: &str, reason: &SkipReason) {
    tracing::warn!(filename, reason = %reason, "skipping resume");
    println!(
        "{} {} {}: {}",
        rank_prefix(),
        yellow().apply_to("skipped"),
        bold().apply_to(filename),
        dim().apply_to(reason.describe())
    );
}

pub fn log_no_results() {
    println!(
        "{} {}",
        rank_prefix(),
        yellow().apply_to("No resumes were processed successfully.")
    );
}

pub fn log_export_written(kind: &str, path: &Path) {
    println!(
        "{} {} report to {}",
        green().apply_to("wrote"),
        kind,
        cyan().apply_to(path.display())
    );
}

/// Plain table lines for the ranked results, at most `top` rows.
pub fn format_ranked_table(report: &RankedReport, top: Option<usize>) -> Vec<String> {
    let limit = top.unwrap_or(usize::MAX);
    let body: Vec<Vec<String>> = rows(report)
        .iter()
        .take(limit)
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![(idx + 1).to_string()];
            cells.extend(row.cells().iter().map(|c| truncate_cell(c, MAX_CELL_WIDTH)));
            cells
        })
        .collect();

    let header: Vec<String> = std::iter::once("#")
        .chain(HEADERS)
        .map(str::to_string)
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            body.iter()
                .map(|cells| measure_text_width(&cells[col]))
                .chain(std::iter::once(measure_text_width(&header[col])))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_cell(cell, *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(&header)];
    lines.push(
        widths
            .iter()
            .map(|w| TREE_HORIZ.to_string().repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(body.iter().map(|cells| render(cells)));
    lines
}

pub fn print_ranked_table(report: &RankedReport, top: Option<usize>) {
    if report.is_empty() {
        log_no_results();
        return;
    }

    println!();
    let lines = format_ranked_table(report, top);
    for (idx, line) in lines.iter().enumerate() {
        if idx == 0 {
            println!("{}", bold().apply_to(line));
        } else if idx == 1 {
            println!("{}", dim().apply_to(line));
        } else {
            println!("{line}");
        }
    }

    let hidden = report.results.len().saturating_sub(top.unwrap_or(usize::MAX));
    if hidden > 0 {
        println!("{}", dim().apply_to(format!("... {hidden} more")));
    }
    if !report.skipped.is_empty() {
        println!(
            "{} {} resumes skipped",
            yellow().apply_to("!"),
            bold().apply_to(report.skipped.len())
        );
    }
    println!();
}

pub fn log_text_sizes(job_chars: usize, resume_chars: usize) {
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label("job", 1),
        dim().apply_to(format!("{job_chars} chars"))
    );
    println!(
        "{}{} {}",
        tree_end(),
        pad_label("resume", 1),
        dim().apply_to(format!("{resume_chars} chars"))
    );
}

pub fn log_job_skills(job: &JobProfile) {
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label("required", 1),
        cyan().apply_to(format_skills(&job.required.to_set()))
    );
    println!(
        "{}{} {}",
        tree_end(),
        pad_label("preferred", 1),
        cyan().apply_to(format_skills(&job.preferred.to_set()))
    );
}

pub fn log_score_breakdown(result: &ScoreResult, weights: &ScoringWeights) {
    let b = &result.breakdown;

    println!("{}{}", tree_branch(), pad_label("skills", 1));
    println!(
        "{}{}{} {}",
        tree_indent(),
        tree_branch(),
        pad_label("matched", 2),
        green().apply_to(format_skills(&result.matched()))
    );
    println!(
        "{}{}{} {}",
        tree_indent(),
        tree_end(),
        pad_label("missing", 2),
        red().apply_to(format_skills(&result.missing))
    );

    println!("{}{}", tree_branch(), pad_label("scores", 1));
    println!(
        "{}{}{} {:.2} {}",
        tree_indent(),
        tree_branch(),
        pad_label("semantic", 2),
        b.semantic_score,
        dim().apply_to(format!("x {:.2}", weights.semantic))
    );
    println!(
        "{}{}{} {:.2} {}",
        tree_indent(),
        tree_end(),
        pad_label("skill", 2),
        b.skill_score,
        dim().apply_to(format!("x {:.2}", weights.skill))
    );

    println!("{}{}", tree_branch(), pad_label("blend", 1));
    println!(
        "{}{}{}{}",
        tree_indent(),
        tree_branch(),
        pad_label("semantic", 2),
        format_signed(b.semantic_score * weights.semantic)
    );
    println!(
        "{}{}{}{}",
        tree_indent(),
        tree_end(),
        pad_label("skill", 2),
        format_signed(b.skill_score * weights.skill)
    );

    println!(
        "{}{} {}",
        tree_end(),
        pad_label("total", 1),
        bold().apply_to(format!("{:.2}%", b.final_score))
    );
}

pub fn log_final_result(result: &ScoreResult) {
    println!(
        "{} {} {}",
        bold().apply_to(&result.filename),
        green().bold().apply_to(format!("{:.2}%", result.final_score())),
        dim().apply_to(&result.explanation)
    );
}

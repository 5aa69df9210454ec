pub mod document;
pub mod tabular;

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::ranking::RankedReport;
use crate::scoring::ScoreResult;

pub use document::{render_pdf, save_pdf};
pub use tabular::{save_csv, write_csv};

pub const HEADERS: [&str; 5] = [
    "Filename",
    "Score (%)",
    "Explanation",
    "Matched Skills",
    "Missing Skills",
];

/// One display row of the ranked table. Skill cells are sorted and
/// comma-joined, `None` when empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub filename: String,
    pub score: String,
    pub explanation: String,
    pub matched: String,
    pub missing: String,
}

impl ReportRow {
    pub fn from_result(result: &ScoreResult) -> Self {
        Self {
            filename: result.filename.clone(),
            score: format!("{:.2}", result.final_score()),
            explanation: result.explanation.clone(),
            matched: format_skills(&result.matched()),
            missing: format_skills(&result.missing),
        }
    }

    pub fn cells(&self) -> [&str; 5] {
        [
            &self.filename,
            &self.score,
            &self.explanation,
            &self.matched,
            &self.missing,
        ]
    }
}

pub fn format_skills(skills: &BTreeSet<String>) -> String {
    if skills.is_empty() {
        "None".to_string()
    } else {
        skills.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

pub fn rows(report: &RankedReport) -> Vec<ReportRow> {
    report.results.iter().map(ReportRow::from_result).collect()
}

pub fn to_json(report: &RankedReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::error::SkipReason;
    use crate::ranking::SkippedCandidate;
    use crate::scoring::ScoreBreakdown;
    use chrono::Local;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    pub fn sample_report() -> RankedReport {
        RankedReport {
            generated_at: Local::now(),
            results: vec![
                ScoreResult {
                    filename: "alice.pdf".into(),
                    breakdown: ScoreBreakdown {
                        semantic_score: 71.234,
                        skill_score: 100.0,
                        final_score: 82.7404,
                    },
                    matched_required: set(&["sql", "python"]),
                    matched_preferred: set(&["docker"]),
                    missing: BTreeSet::new(),
                    required_count: 2,
                    explanation: "2 of 2 required skills found.".into(),
                },
                ScoreResult {
                    filename: "bob, jr.pdf".into(),
                    breakdown: ScoreBreakdown {
                        semantic_score: 40.0,
                        skill_score: 0.0,
                        final_score: 24.0,
                    },
                    matched_required: BTreeSet::new(),
                    matched_preferred: BTreeSet::new(),
                    missing: set(&["sql", "python", "docker"]),
                    required_count: 2,
                    explanation: "0 of 2 required skills found.".into(),
                },
            ],
            skipped: vec![SkippedCandidate {
                filename: "scan.pdf".into(),
                reason: SkipReason::Unreadable,
            }],
        }
    }
}

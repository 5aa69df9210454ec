use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{RankError, SkipReason};
use crate::scoring::{Candidate, JobProfile, OracleHandle, ScoreResult, ScoringPipeline};
use crate::settings::Settings;
use crate::utils::{log_candidate_skipped, log_rank_progress, log_rank_start};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub filename: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedReport {
    pub generated_at: DateTime<Local>,
    pub results: Vec<ScoreResult>,
    pub skipped: Vec<SkippedCandidate>,
}

impl RankedReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Highest score first. Equal scores keep their input order.
pub fn rank(mut results: Vec<ScoreResult>) -> Vec<ScoreResult> {
    results.sort_by(|a, b| b.final_score().total_cmp(&a.final_score()));
    results
}

pub fn check_inputs(job_text: &str, candidates: &[Candidate]) -> Result<(), RankError> {
    if job_text.trim().is_empty() {
        return Err(RankError::MissingJobDescription);
    }
    if candidates.is_empty() {
        return Err(RankError::NoResumes);
    }
    Ok(())
}

/// Scores every candidate in order. Unreadable resumes and oracle failures
/// are recorded as skipped; they never stop the batch.
pub async fn rank_candidates(pipeline: &ScoringPipeline, candidates: &[Candidate]) -> RankedReport {
    let total = candidates.len();
    let mut results = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    log_rank_start(total, pipeline.job().required.len(), pipeline.job().preferred.len());

    for (idx, candidate) in candidates.iter().enumerate() {
        let outcome = if candidate.is_readable() {
            pipeline.score(candidate).await
        } else {
            Err(SkipReason::Unreadable)
        };

        match outcome {
            Ok(result) => results.push(result),
            Err(reason) => {
                log_candidate_skipped(&candidate.filename, &reason);
                skipped.push(SkippedCandidate {
                    filename: candidate.filename.clone(),
                    reason,
                });
            }
        }

        log_rank_progress(idx + 1, total);
    }

    RankedReport {
        generated_at: Local::now(),
        results: rank(results),
        skipped,
    }
}

/// One full ranking run: validates inputs and configuration, prepares the
/// job profile and ranks all candidates.
pub async fn rank_resumes(
    job_text: &str,
    candidates: &[Candidate],
    settings: &Settings,
    oracle: OracleHandle,
) -> Result<RankedReport, RankError> {
    check_inputs(job_text, candidates)?;
    settings.scoring.weights.validate()?;

    let job = JobProfile::new(job_text, &settings.skills);
    let pipeline = ScoringPipeline::new(job, settings.scoring.weights, oracle);

    Ok(rank_candidates(&pipeline, candidates).await)
}

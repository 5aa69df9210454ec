use serde::Serialize;
use std::collections::BTreeSet;

use super::normalize::normalize;
use super::oracle::OracleHandle;
use super::skills::{extract_skills, missing_skills, SkillSet};
use crate::error::SkipReason;
use crate::settings::{ScoringWeights, SkillScope, Skills};

/// The job side of every comparison, prepared once per run.
#[derive(Debug, Clone)]
pub struct JobProfile {
    pub text: String,
    pub normalized: String,
    pub required: SkillSet,
    pub preferred: SkillSet,
}

impl JobProfile {
    pub fn new(text: &str, skills: &Skills) -> Self {
        let configured_required = SkillSet::new(&skills.required);
        let configured_preferred = SkillSet::new(&skills.preferred);

        let (required, preferred) = match skills.scope {
            SkillScope::Configured => {
                let preferred = configured_preferred.retain(|s| !configured_required.contains(s));
                (configured_required, preferred)
            }
            SkillScope::JobDescription => {
                let mentioned_required = extract_skills(text, &configured_required);
                let mentioned_preferred = extract_skills(text, &configured_preferred);
                let required = configured_required.retain(|s| mentioned_required.contains(s));
                let preferred = configured_preferred
                    .retain(|s| mentioned_preferred.contains(s) && !required.contains(s));
                (required, preferred)
            }
        };

        Self {
            text: text.to_string(),
            normalized: normalize(text),
            required,
            preferred,
        }
    }

    /// Every skill the job asks for, required or preferred.
    pub fn all_skills(&self) -> BTreeSet<String> {
        let mut all = self.required.to_set();
        all.extend(self.preferred.to_set());
        all
    }
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub filename: String,
    pub text: String,
}

impl Candidate {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }

    pub fn is_readable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub semantic_score: f32,
    pub skill_score: f32,
    pub final_score: f32,
}

pub fn calculate_score(semantic_score: f32, skill_score: f32, weights: &ScoringWeights) -> ScoreBreakdown {
    let final_score = semantic_score * weights.semantic + skill_score * weights.skill;

    ScoreBreakdown {
        semantic_score,
        skill_score,
        final_score,
    }
}

/// Percentage of required skills found; an empty requirement is met.
pub fn skill_score(matched_required: usize, required: usize) -> f32 {
    if required == 0 {
        100.0
    } else {
        100.0 * matched_required as f32 / required as f32
    }
}

pub fn explain(matched_required: usize, required: usize) -> String {
    format!("{matched_required} of {required} required skills found.")
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub filename: String,
    #[serde(flatten)]
    pub breakdown: ScoreBreakdown,
    pub matched_required: BTreeSet<String>,
    pub matched_preferred: BTreeSet<String>,
    pub missing: BTreeSet<String>,
    pub required_count: usize,
    pub explanation: String,
}

impl ScoreResult {
    pub fn final_score(&self) -> f32 {
        self.breakdown.final_score
    }

    pub fn matched(&self) -> BTreeSet<String> {
        self.matched_required
            .union(&self.matched_preferred)
            .cloned()
            .collect()
    }
}

/// Everything but the similarity call: skill matching, blend and
/// explanation for one resume.
pub fn assess_resume(
    job: &JobProfile,
    filename: &str,
    resume_text: &str,
    semantic_score: f32,
    weights: &ScoringWeights,
) -> ScoreResult {
    let matched_required = extract_skills(resume_text, &job.required);
    let matched_preferred = extract_skills(resume_text, &job.preferred);

    let found: BTreeSet<String> = matched_required.union(&matched_preferred).cloned().collect();
    let missing = missing_skills(&job.all_skills(), &found);

    let skill = skill_score(matched_required.len(), job.required.len());
    let breakdown = calculate_score(semantic_score, skill, weights);

    ScoreResult {
        filename: filename.to_string(),
        breakdown,
        explanation: explain(matched_required.len(), job.required.len()),
        matched_required,
        matched_preferred,
        missing,
        required_count: job.required.len(),
    }
}

#[derive(Clone)]
pub struct ScoringPipeline {
    job: JobProfile,
    weights: ScoringWeights,
    oracle: OracleHandle,
}

impl ScoringPipeline {
    pub fn new(job: JobProfile, weights: ScoringWeights, oracle: OracleHandle) -> Self {
        Self {
            job,
            weights,
            oracle,
        }
    }

    pub fn job(&self) -> &JobProfile {
        &self.job
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scores one readable resume. The only side effect is the oracle call.
    pub async fn score(&self, candidate: &Candidate) -> Result<ScoreResult, SkipReason> {
        let semantic_score = self
            .oracle
            .similarity(self.job.normalized.clone(), normalize(&candidate.text))
            .await?;

        Ok(assess_resume(
            &self.job,
            &candidate.filename,
            &candidate.text,
            semantic_score,
            &self.weights,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::oracle::testing::scripted;

    fn skills(required: &[&str], preferred: &[&str], scope: SkillScope) -> Skills {
        Skills {
            required: required.iter().map(|s| s.to_string()).collect(),
            preferred: preferred.iter().map(|s| s.to_string()).collect(),
            scope,
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_score_calculation() {
        let weights = ScoringWeights::default();
        let score = calculate_score(50.0, 100.0, &weights);
        assert!((score.final_score - 70.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_requirement_is_satisfied() {
        assert_eq!(skill_score(0, 0), 100.0);

        let job = JobProfile::new("We need a generalist", &skills(&[], &[], SkillScope::Configured));
        let result = assess_resume(&job, "a.pdf", "no skills at all", 40.0, &ScoringWeights::default());
        assert_eq!(result.breakdown.skill_score, 100.0);
        assert_eq!(result.explanation, "0 of 0 required skills found.");
    }

    #[test]
    fn test_final_score_monotonic() {
        let weights = ScoringWeights::default();
        let steps = [0.0_f32, 10.0, 33.3, 50.0, 99.9, 100.0];
        for fixed in steps {
            for pair in steps.windows(2) {
                let lo = calculate_score(pair[0], fixed, &weights).final_score;
                let hi = calculate_score(pair[1], fixed, &weights).final_score;
                assert!(hi >= lo);

                let lo = calculate_score(fixed, pair[0], &weights).final_score;
                let hi = calculate_score(fixed, pair[1], &weights).final_score;
                assert!(hi >= lo);
            }
        }
    }

    #[test]
    fn test_keyword_only_variant() {
        let weights = ScoringWeights {
            semantic: 0.0,
            skill: 1.0,
        };
        let job = JobProfile::new(
            "Python and SQL",
            &skills(&["python", "sql"], &[], SkillScope::JobDescription),
        );
        let result = assess_resume(&job, "a.pdf", "python only", 87.0, &weights);
        assert!((result.final_score() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_job_scope_restricts_to_mentioned_skills() {
        let job = JobProfile::new(
            "Looking for a Python engineer who knows SQL. Docker is a plus.",
            &skills(&["python", "sql", "java"], &["docker", "aws"], SkillScope::JobDescription),
        );
        assert_eq!(job.required.to_set(), set(&["python", "sql"]));
        assert_eq!(job.preferred.to_set(), set(&["docker"]));
    }

    #[test]
    fn test_skill_in_both_lists_counts_as_required() {
        let job = JobProfile::new(
            "anything",
            &skills(&["python", "sql"], &["sql", "docker"], SkillScope::Configured),
        );
        assert_eq!(job.required.to_set(), set(&["python", "sql"]));
        assert_eq!(job.preferred.to_set(), set(&["docker"]));
    }

    #[test]
    fn test_end_to_end_skill_scenario() {
        let job = JobProfile::new(
            "python sql",
            &skills(&["python", "sql"], &[], SkillScope::Configured),
        );
        let weights = ScoringWeights::default();

        let a = assess_resume(&job, "a.pdf", "Python developer with SQL experience", 0.0, &weights);
        assert_eq!(a.matched(), set(&["python", "sql"]));
        assert!(a.missing.is_empty());
        assert_eq!(a.breakdown.skill_score, 100.0);

        let b = assess_resume(&job, "b.pdf", "Java developer", 0.0, &weights);
        assert!(b.matched().is_empty());
        assert_eq!(b.missing, set(&["python", "sql"]));
        assert_eq!(b.breakdown.skill_score, 0.0);
    }

    #[test]
    fn test_matched_and_missing_partition_job_skills() {
        let job = JobProfile::new(
            "",
            &skills(&["python", "sql", "aws"], &["docker", "git"], SkillScope::Configured),
        );
        let result = assess_resume(
            &job,
            "c.pdf",
            "AWS certified, uses git and python",
            55.0,
            &ScoringWeights::default(),
        );
        let matched = result.matched();
        assert!(matched.is_disjoint(&result.missing));
        let union: BTreeSet<_> = matched.union(&result.missing).cloned().collect();
        assert_eq!(union, job.all_skills());
        assert_eq!(result.explanation, "2 of 3 required skills found.");
    }

    #[tokio::test]
    async fn test_pipeline_blends_oracle_score() {
        let job = JobProfile::new(
            "Python developer with SQL",
            &skills(&["python", "sql"], &[], SkillScope::JobDescription),
        );
        let pipeline = ScoringPipeline::new(job, ScoringWeights::default(), scripted(80.0, vec![]).await);
        let result = pipeline
            .score(&Candidate::new("a.pdf", "Python developer"))
            .await
            .unwrap();

        assert_eq!(result.breakdown.semantic_score, 80.0);
        assert_eq!(result.breakdown.skill_score, 50.0);
        assert!((result.final_score() - 68.0).abs() < 0.01);
        assert_eq!(result.explanation, "1 of 2 required skills found.");
    }
}

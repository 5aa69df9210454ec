pub mod normalize;
pub mod oracle;
pub mod score;
pub mod semantic;
pub mod skills;

pub use normalize::{clean_for_matching, normalize};
pub use oracle::OracleHandle;
pub use score::{
    assess_resume, calculate_score, explain, skill_score, Candidate, JobProfile, ScoreBreakdown,
    ScoreResult, ScoringPipeline,
};
pub use semantic::{EmbeddingOracle, SimilarityOracle};
pub use skills::{extract_skills, missing_skills, SkillSet};

use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Run-level failures. These are checked before any candidate is scored.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("Please provide a job description.")]
    MissingJobDescription,

    #[error("Please provide at least one resume.")]
    NoResumes,

    #[error("Invalid scoring weights (semantic: {semantic}, skill: {skill}); weights must be finite and non-negative")]
    InvalidWeights { semantic: f32, skill: f32 },
}

/// Why a candidate was left out of the ranking.
#[derive(Debug, Clone, PartialEq, Display, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum SkipReason {
    #[strum(serialize = "unreadable")]
    Unreadable,
    #[strum(serialize = "oracle-failure")]
    OracleFailure(String),
    #[strum(serialize = "oracle-timeout")]
    OracleTimeout,
}

impl SkipReason {
    pub fn describe(&self) -> String {
        match self {
            Self::Unreadable => "could not read text".to_string(),
            Self::OracleFailure(msg) => format!("{} ({})", self, msg),
            Self::OracleTimeout => "similarity timed out".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::Unreadable.to_string(), "unreadable");
        assert_eq!(
            SkipReason::OracleFailure("nan".into()).describe(),
            "oracle-failure (nan)"
        );
    }

    #[test]
    fn test_missing_input_messages() {
        assert_eq!(
            RankError::MissingJobDescription.to_string(),
            "Please provide a job description."
        );
        assert_eq!(
            RankError::NoResumes.to_string(),
            "Please provide at least one resume."
        );
    }
}

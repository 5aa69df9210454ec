use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, OnceLock};
use strum::Display;

use crate::error::RankError;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub const DEFAULT_SETTINGS_PATH: &str = "settings.default.ron";
pub const OVERRIDE_SETTINGS_PATH: &str = "settings.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub skills: Skills,
    pub scoring: Scoring,
    pub ml: Ml,
    pub report: Report,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub required: Vec<String>,
    pub preferred: Vec<String>,
    pub scope: SkillScope,
}

/// Decides which configured skills a job actually asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SkillScope {
    /// Only the configured skills mentioned in the job description.
    #[strum(serialize = "job-description")]
    JobDescription,
    /// The configured lists as-is.
    #[strum(serialize = "configured")]
    Configured,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scoring {
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub semantic: f32,
    pub skill: f32,
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), RankError> {
        let ok = |w: f32| w.is_finite() && w >= 0.0;
        if ok(self.semantic) && ok(self.skill) {
            Ok(())
        } else {
            Err(RankError::InvalidWeights {
                semantic: self.semantic,
                skill: self.skill,
            })
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.6,
            skill: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum EmbeddingModel {
    #[strum(serialize = "all-MiniLM-L6-v2")]
    AllMiniLmL6V2,
    #[strum(serialize = "all-MiniLM-L12-v2")]
    AllMiniLmL12V2,
    #[strum(serialize = "all-distilroberta-v1")]
    AllDistilrobertaV1,
    #[strum(serialize = "paraphrase-albert-small-v2")]
    ParaphraseAlbertSmallV2,
    #[strum(serialize = "sentence-t5-base")]
    SentenceT5Base,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ml {
    pub model: EmbeddingModel,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub title: String,
    pub lines_per_page: usize,
}

static DEFAULT_SKILLS: LazyLock<Vec<String>> = LazyLock::new(|| {
    ron::from_str(include_str!("../data/skills.ron")).expect("built-in skill catalog is valid RON")
});

/// The built-in skill catalog from `data/skills.ron`.
pub fn default_skills() -> &'static [String] {
    &DEFAULT_SKILLS
}

impl Default for Skills {
    fn default() -> Self {
        Self {
            required: default_skills().to_vec(),
            preferred: Vec::new(),
            scope: SkillScope::JobDescription,
        }
    }
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }
}

impl Default for Ml {
    fn default() -> Self {
        Self {
            model: EmbeddingModel::AllMiniLmL6V2,
            timeout_secs: 120,
        }
    }
}

impl Default for Report {
    fn default() -> Self {
        Self {
            title: "Resume Ranking Report".to_string(),
            lines_per_page: 60,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skills: Skills::default(),
            scoring: Scoring::default(),
            ml: Ml::default(),
            report: Report::default(),
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Self::load_from_files)
    }

    /// Reads an explicit settings file. Unlike the implicit files, a bad
    /// path or malformed content is an error here.
    pub fn load_from(path: &Path) -> Result<Settings> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        let settings = Self::parse(&content)
            .with_context(|| format!("Failed to parse settings file '{}'", path.display()))?;
        settings.scoring.weights.validate()?;
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Settings> {
        Ok(ron::from_str(content)?)
    }

    fn load_from_files() -> Settings {
        let default_path = Path::new(DEFAULT_SETTINGS_PATH);
        let override_path = Path::new(OVERRIDE_SETTINGS_PATH);

        let mut settings = read_optional(default_path).unwrap_or_default();

        if let Some(overrides) = read_optional(override_path) {
            settings = overrides;
        }

        settings
    }
}

fn read_optional(path: &Path) -> Option<Settings> {
    if !path.exists() {
        return None;
    }
    let parsed = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| Settings::parse(&content));
    match parsed {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            None
        }
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

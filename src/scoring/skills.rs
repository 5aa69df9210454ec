use regex::Regex;
use std::collections::BTreeSet;

use super::normalize::clean_for_matching;

/// Ordered, de-duplicated list of lowercase skills with a precompiled
/// whole-word pattern per skill.
#[derive(Debug, Clone, Default)]
pub struct SkillSet {
    skills: Vec<String>,
    patterns: Vec<Regex>,
}

impl SkillSet {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = SkillSet::default();
        for skill in skills {
            set.push(skill.as_ref());
        }
        set
    }

    fn push(&mut self, raw: &str) {
        let skill = clean_for_matching(raw);
        if skill.is_empty() || self.skills.contains(&skill) {
            return;
        }
        // Like \b, but also valid next to punctuation so "c++" and
        // "node.js" can match. \W is Unicode-aware.
        let pattern = format!(r"(?:^|\W){}(?:$|\W)", regex::escape(&skill));
        match Regex::new(&pattern) {
            Ok(re) => {
                self.skills.push(skill);
                self.patterns.push(re);
            }
            Err(e) => tracing::warn!(skill = %skill, error = %e, "skipping unmatchable skill"),
        }
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(String::as_str)
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// Keeps only the skills for which `keep` holds, preserving order.
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> SkillSet {
        let (skills, patterns): (Vec<String>, Vec<Regex>) = self
            .skills
            .iter()
            .zip(self.patterns.iter())
            .filter(|(skill, _)| keep(skill))
            .map(|(skill, re)| (skill.clone(), re.clone()))
            .unzip();
        SkillSet { skills, patterns }
    }

    pub fn to_set(&self) -> BTreeSet<String> {
        self.skills.iter().cloned().collect()
    }
}

/// Skills from `skills` that occur in `text` as delimited words or phrases.
pub fn extract_skills(text: &str, skills: &SkillSet) -> BTreeSet<String> {
    let cleaned = clean_for_matching(text);
    skills
        .skills
        .iter()
        .zip(skills.patterns.iter())
        .filter(|(_, re)| re.is_match(&cleaned))
        .map(|(skill, _)| skill.clone())
        .collect()
}

pub fn missing_skills(reference: &BTreeSet<String>, found: &BTreeSet<String>) -> BTreeSet<String> {
    reference.difference(found).cloned().collect()
}

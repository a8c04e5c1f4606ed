//! Comparison and final-decision records returned by the last two stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::lenient;

/// How well one requirement is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLevel {
    High,
    Medium,
    Low,
    #[serde(rename = "None")]
    Absent,
}

/// Roll-up of a match category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallMatch {
    Strong,
    Moderate,
    Weak,
}

/// A single requirement compared against the candidate.
/// The model names the subject `skill`, `area` or `requirement` depending on the category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementMatch {
    #[serde(default, alias = "skill", alias = "area", alias = "requirement")]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient")]
    pub match_level: Option<MatchLevel>,
    #[serde(default, deserialize_with = "lenient")]
    pub details: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(default, deserialize_with = "lenient")]
    pub skill_matches: Vec<RequirementMatch>,
    #[serde(default, deserialize_with = "lenient")]
    pub experience_matches: Vec<RequirementMatch>,
    #[serde(default, deserialize_with = "lenient")]
    pub education_matches: Vec<RequirementMatch>,
    #[serde(default, deserialize_with = "lenient")]
    pub overall_skill_match: Option<OverallMatch>,
    #[serde(default, deserialize_with = "lenient")]
    pub overall_experience_match: Option<OverallMatch>,
    #[serde(default, deserialize_with = "lenient")]
    pub overall_education_match: Option<OverallMatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitScore {
    #[serde(rename = "Strong Fit")]
    StrongFit,
    #[serde(rename = "Moderate Fit")]
    ModerateFit,
    #[serde(rename = "Not a Fit")]
    NotAFit,
}

impl fmt::Display for FitScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FitScore::StrongFit => "Strong Fit",
            FitScore::ModerateFit => "Moderate Fit",
            FitScore::NotAFit => "Not a Fit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinalDecision {
    #[serde(default, deserialize_with = "lenient")]
    pub fit_score: Option<FitScore>,
    #[serde(default, deserialize_with = "lenient")]
    pub reasoning: String,
    #[serde(default, deserialize_with = "lenient")]
    pub recommendations: Vec<String>,
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::lenient;
use crate::models::research::{GithubResearch, WebResearch};

/// Structured résumé produced by semantic extraction, plus the raw text it came from.
///
/// Entries are kept as JSON values: the extraction schema names the keys but the
/// shape of each entry varies between résumés.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeData {
    #[serde(default, deserialize_with = "lenient")]
    pub education: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub work_experience: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub skills: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub certifications: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub publications: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub projects: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub online_profiles: OnlineProfiles,
    #[serde(default)]
    pub raw_text: String,
    /// Keys the model returned beyond the schema.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile links listed on the résumé. `github` is the explicit profile field the
/// locator gives priority to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnlineProfiles {
    #[serde(default, deserialize_with = "lenient")]
    pub github: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub linkedin: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Merge of everything known about the candidate, built by `createCandidateProfile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub resume_data: ResumeData,
    pub web_research: WebResearch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_research: Option<GithubResearch>,
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::lenient;
use crate::profile::scraper::ProfileScrape;
use crate::profile::ResolvedProfile;

/// Outcome of the `githubResearch` stage.
///
/// `scrape` is absent when the profile could not be scraped at all; `analysis`
/// is present only when at least one repository was available to analyse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubResearch {
    pub github_url: String,
    pub github_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape: Option<ProfileScrape>,
    /// Why the scrape produced no data, when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
}

impl GithubResearch {
    /// A research record carrying only the profile reference.
    pub fn empty(profile: &ResolvedProfile, reason: Option<String>) -> Self {
        Self {
            github_url: profile.url().to_string(),
            github_username: profile.username().to_string(),
            analysis: None,
            scrape: None,
            unavailable_reason: reason,
        }
    }

    pub fn repository_count(&self) -> usize {
        self.scrape
            .as_ref()
            .map(|s| s.repositories.len())
            .unwrap_or(0)
    }
}

/// Web-research record: search-derived findings synthesised by the model,
/// merged with whatever github research already produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebResearch {
    #[serde(default, deserialize_with = "lenient")]
    pub github_info: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub blog_posts: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub conference_appearances: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub news_mentions: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub social_profiles: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub raw_data: Map<String, Value>,
}

impl WebResearch {
    /// The github profile URL listed under `social_profiles`, if any.
    pub fn github_profile_link(&self) -> Option<&str> {
        self.social_profiles
            .get("github")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

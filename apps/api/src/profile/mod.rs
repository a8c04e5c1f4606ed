//! Candidate code-hosting profiles: discovery from text, and scraping of the public profile.
//!
//! Every profile reference flows through [`username_from_url`], so a
//! [`ResolvedProfile`]'s handle is always the one its URL yields.

pub mod fetcher;
pub mod locator;
pub mod markup;
pub mod scraper;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const GITHUB_BASE: &str = "https://github.com";

/// Captures that look like handles but are URL fragments.
const RESERVED_HANDLES: [&str; 4] = ["www", "http", "https", "com"];

static RE_PROFILE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)github\.com/([a-z0-9_-]+)").unwrap());
static RE_PAGES_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([a-z0-9_-]+)\.github\.io").unwrap());
static RE_HANDLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

pub fn is_reserved(handle: &str) -> bool {
    RESERVED_HANDLES
        .iter()
        .any(|reserved| handle.eq_ignore_ascii_case(reserved))
}

/// True for a bare, non-reserved handle such as `octocat`.
pub fn is_valid_handle(handle: &str) -> bool {
    RE_HANDLE.is_match(handle) && !is_reserved(handle)
}

/// Extracts the handle from `github.com/<handle>` or `<handle>.github.io` forms.
pub fn username_from_url(url: &str) -> Option<String> {
    [&*RE_PROFILE_PATH, &*RE_PAGES_HOST]
        .into_iter()
        .flat_map(|re| re.captures_iter(url))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|handle| !is_reserved(handle))
        .map(str::to_string)
}

pub fn canonical_profile_url(username: &str) -> String {
    format!("{GITHUB_BASE}/{username}")
}

pub(crate) fn with_scheme(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// A profile URL paired with the handle extracted from it.
///
/// Only constructible through [`ResolvedProfile::from_url`] and
/// [`ResolvedProfile::from_username`], which keep the pair consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProfile {
    url: String,
    username: String,
}

impl ResolvedProfile {
    /// Accepts any URL (scheme optional) the username extractor recognises.
    pub fn from_url(url: &str) -> Option<Self> {
        let url = with_scheme(url.trim());
        let username = username_from_url(&url)?;
        Some(Self { url, username })
    }

    /// Builds the canonical profile URL for a bare handle.
    pub fn from_username(username: &str) -> Option<Self> {
        let username = username.trim();
        if !is_valid_handle(username) {
            return None;
        }
        Self::from_url(&canonical_profile_url(username))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

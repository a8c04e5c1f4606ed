//! Profile discovery from résumé content and from search results.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::candidate::ResumeData;
use crate::profile::markup::{self, UserSearchHit};
use crate::profile::{canonical_profile_url, is_reserved, is_valid_handle, with_scheme, ResolvedProfile};
use crate::research::search::SearchHit;

static RE_FULL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(https?://(?:www\.)?github\.com/[a-z0-9_-]+)").unwrap()
});
static RE_BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(github\.com/[a-z0-9_-]+)").unwrap());
static RE_LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgithub\b:?\s*([a-z0-9_-]+)").unwrap());

/// Result URLs pointing at activity rather than a profile.
const NON_PROFILE_PATHS: [&str; 5] = ["/pulls", "/issues", "/commit", "/blob", "/tree"];

/// Explicit profile field first, then the résumé's raw text.
pub fn resolve(resume: &ResumeData) -> Option<ResolvedProfile> {
    resolve_from_structured(resume).or_else(|| resolve_from_free_text(&resume.raw_text))
}

pub fn resolve_from_structured(resume: &ResumeData) -> Option<ResolvedProfile> {
    let raw = resume.online_profiles.github.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    if is_valid_handle(raw) {
        return ResolvedProfile::from_username(raw);
    }

    let mut url = with_scheme(raw);
    let lower = url.to_ascii_lowercase();
    if !lower.starts_with("https://github.com") && !lower.starts_with("http://github.com") {
        if let Some(handle) = handle_from_labeled_text(&url) {
            url = canonical_profile_url(&handle);
        }
    }
    ResolvedProfile::from_url(&url)
}

/// Full URLs, then scheme-less URLs, then a `GitHub: handle` label.
pub fn resolve_from_free_text(text: &str) -> Option<ResolvedProfile> {
    [&*RE_FULL_URL, &*RE_BARE_URL]
        .into_iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .find_map(|m| ResolvedProfile::from_url(m.as_str()))
        .or_else(|| handle_from_labeled_text(text).and_then(|h| ResolvedProfile::from_username(&h)))
}

pub fn handle_from_labeled_text(text: &str) -> Option<String> {
    RE_LABELED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|handle| !is_reserved(handle))
        .map(str::to_string)
}

/// Picks the user-search result for `candidate_name`: exact display-name match,
/// then a display name starting with it, then the first result.
pub fn resolve_from_search_markup(html: &str, candidate_name: &str) -> Option<ResolvedProfile> {
    let hits = markup::parse_user_search_results(html);
    debug!(results = hits.len(), "Parsed user search results");
    choose_search_hit(&hits, candidate_name)
        .and_then(|hit| ResolvedProfile::from_username(&hit.username))
}

fn choose_search_hit<'a>(hits: &'a [UserSearchHit], candidate_name: &str) -> Option<&'a UserSearchHit> {
    let wanted = candidate_name.trim().to_lowercase();
    let display = |hit: &UserSearchHit| hit.display_name.trim().to_lowercase();

    hits.iter()
        .find(|hit| display(hit) == wanted)
        .or_else(|| hits.iter().find(|hit| display(hit).starts_with(&wanted)))
        .or_else(|| hits.first())
}

/// First search hit whose URL is a profile page rather than repository activity.
pub fn resolve_from_search_hits(hits: &[SearchHit]) -> Option<ResolvedProfile> {
    hits.iter()
        .map(|hit| hit.url.as_str())
        .filter(|url| is_profile_result_url(url))
        .find_map(|url| {
            crate::profile::username_from_url(url).and_then(|u| ResolvedProfile::from_username(&u))
        })
}

pub fn is_profile_result_url(url: &str) -> bool {
    url.to_ascii_lowercase().contains("github.com/")
        && !NON_PROFILE_PATHS.iter().any(|path| url.contains(path))
}

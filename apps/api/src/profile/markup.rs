//! HTML parsing for profile, repository-listing, README and user-search pages.
//!
//! Each field is located by its own selector. A selector that matches nothing
//! degrades only that field.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::profile::scraper::{RepositorySummary, UserInfo};
use crate::profile::GITHUB_BASE;

pub const README_CHAR_LIMIT: usize = 5000;
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// One entry from the user-search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSearchHit {
    pub display_name: String,
    pub username: String,
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Text content with whitespace runs collapsed; `None` when blank.
fn text_of(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    select_first(scope, css).and_then(text_of)
}

pub fn parse_profile_page(html: &str, username: &str) -> UserInfo {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let website = select_first(root, r#"a[href^="http"].Link--primary"#)
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    UserInfo {
        username: username.to_string(),
        name: first_text(root, "span.p-name.vcard-fullname")
            .unwrap_or_else(|| username.to_string()),
        bio: first_text(root, "div.p-note.user-profile-bio"),
        location: first_text(root, "span.p-label"),
        website,
    }
}

/// Parses at most `limit` public repositories from the listing tab.
pub fn parse_repository_listing(html: &str, username: &str, limit: usize) -> Vec<RepositorySummary> {
    let document = Html::parse_document(html);

    select_all(document.root_element(), "li.public")
        .into_iter()
        .take(limit)
        .filter_map(|item| parse_repository_item(item, username))
        .collect()
}

fn parse_repository_item(item: ElementRef<'_>, username: &str) -> Option<RepositorySummary> {
    let name = first_text(item, r#"a[itemprop="name codeRepository"]"#)?;

    let last_updated = select_first(item, "relative-time")
        .and_then(|t| t.value().attr("datetime"))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| t.with_timezone(&Utc));

    Some(RepositorySummary {
        url: format!("{GITHUB_BASE}/{username}/{name}"),
        description: first_text(item, r#"p[itemprop="description"]"#),
        primary_language: first_text(item, r#"span[itemprop="programmingLanguage"]"#),
        star_count: first_text(item, r#"a[href$="/stargazers"]"#)
            .map(|t| parse_count(&t))
            .unwrap_or(0),
        fork_count: first_text(item, r#"a[href$="/network/members"], a[href$="/forks"]"#)
            .map(|t| parse_count(&t))
            .unwrap_or(0),
        last_updated,
        readme: None,
        name,
    })
}

/// Rendered README text from a repository page, truncated to [`README_CHAR_LIMIT`].
pub fn parse_readme(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let article = select_first(document.root_element(), "article.markdown-body")?;

    let text = article
        .text()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!text.is_empty()).then(|| truncate_readme(text))
}

pub fn truncate_readme(text: String) -> String {
    match text.char_indices().nth(README_CHAR_LIMIT) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text,
    }
}

pub fn parse_user_search_results(html: &str) -> Vec<UserSearchHit> {
    let document = Html::parse_document(html);

    select_all(document.root_element(), r#"div[data-testid="results-list"] > div"#)
        .into_iter()
        .filter_map(|item| {
            let links = select_all(item, r#"a[class*="prc-Link-Link"]"#);
            let display_name = first_text(*links.first()?, "span")?;
            let username = first_text(*links.get(1)?, "span")?;
            Some(UserSearchHit {
                display_name,
                username,
            })
        })
        .collect()
}

/// Parses GitHub's abbreviated counters: `"1,234"`, `"1.2k"`, `"3m"`. Unparseable is 0.
pub fn parse_count(raw: &str) -> u64 {
    let cleaned = raw.trim().replace(',', "").to_ascii_lowercase();
    let (number, multiplier) = if let Some(n) = cleaned.strip_suffix('k') {
        (n, 1_000.0)
    } else if let Some(n) = cleaned.strip_suffix('m') {
        (n, 1_000_000.0)
    } else {
        return cleaned.parse().unwrap_or(0);
    };
    number
        .trim()
        .parse::<f64>()
        .map(|n| (n * multiplier).round() as u64)
        .unwrap_or(0)
}

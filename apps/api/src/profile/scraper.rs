//! Public-profile scraper: user info, a capped repository listing, and README text
//! for the first few repositories.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::profile::fetcher::{FetchError, PageFetcher};
use crate::profile::{canonical_profile_url, markup, username_from_url, GITHUB_BASE};

pub const MAX_REPOSITORIES: usize = 10;
pub const MAX_README_FETCHES: usize = 5;
pub const DEFAULT_README_DELAY: Duration = Duration::from_secs(1);

const README_BRANCHES: [&str; 2] = ["master", "main"];
const README_FILENAMES: [&str; 4] = ["README.md", "readme.md", "README", "readme"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub description: Option<String>,
    pub primary_language: Option<String>,
    pub star_count: u64,
    pub fork_count: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub url: String,
    pub readme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScrapeCompleteness {
    Complete,
    /// The profile page was read but the repository listing or one of the
    /// attempted READMEs was not.
    Partial { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileScrape {
    pub user_info: UserInfo,
    pub repositories: Vec<RepositorySummary>,
    pub completeness: ScrapeCompleteness,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no username could be derived from '{0}'")]
    InvalidProfileReference(String),

    #[error("profile page {url} is unreachable: {source}")]
    ProfileUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },
}

pub struct ProfileScraper {
    fetcher: Arc<dyn PageFetcher>,
    readme_delay: Duration,
}

impl ProfileScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            readme_delay: DEFAULT_README_DELAY,
        }
    }

    /// Pause between README fetches of consecutive repositories.
    pub fn with_readme_delay(mut self, delay: Duration) -> Self {
        self.readme_delay = delay;
        self
    }

    /// Scrapes the profile behind `profile_url`.
    ///
    /// Only an underivable username or an unreachable profile page is an error;
    /// a failed listing or a README miss yields a partial result.
    pub async fn fetch_profile(&self, profile_url: &str) -> Result<ProfileScrape, ScrapeError> {
        let username = username_from_url(profile_url)
            .ok_or_else(|| ScrapeError::InvalidProfileReference(profile_url.to_string()))?;
        let profile_page = canonical_profile_url(&username);

        let html = self
            .fetcher
            .fetch(&profile_page)
            .await
            .map_err(|source| ScrapeError::ProfileUnreachable {
                url: profile_page.clone(),
                source,
            })?;
        let user_info = markup::parse_profile_page(&html, &username);
        info!(username = %username, name = %user_info.name, "Scraped profile page");

        let listing_url = format!("{profile_page}?tab=repositories");
        let mut repositories = match self.fetcher.fetch(&listing_url).await {
            Ok(html) => markup::parse_repository_listing(&html, &username, MAX_REPOSITORIES),
            Err(e) => {
                warn!(username = %username, "Repository listing unavailable: {e}");
                return Ok(ProfileScrape {
                    user_info,
                    repositories: Vec::new(),
                    completeness: ScrapeCompleteness::Partial {
                        reason: e.to_string(),
                    },
                });
            }
        };
        info!(username = %username, count = repositories.len(), "Parsed repository listing");

        let readme_targets = repositories.len().min(MAX_README_FETCHES);
        let mut missing_readmes = Vec::new();
        for index in 0..readme_targets {
            if index > 0 && !self.readme_delay.is_zero() {
                tokio::time::sleep(self.readme_delay).await;
            }
            let repository = &mut repositories[index];
            repository.readme = self.fetch_readme(&username, &repository.name).await;
            if repository.readme.is_none() {
                debug!(repository = %repository.name, "No README found");
                missing_readmes.push(repository.name.clone());
            }
        }

        let completeness = if missing_readmes.is_empty() {
            ScrapeCompleteness::Complete
        } else {
            ScrapeCompleteness::Partial {
                reason: format!("README missing for {}", missing_readmes.join(", ")),
            }
        };
        Ok(ProfileScrape {
            user_info,
            repositories,
            completeness,
        })
    }

    /// Tries each branch and filename combination, then the repository page itself.
    async fn fetch_readme(&self, username: &str, repository: &str) -> Option<String> {
        for url in readme_candidate_urls(username, repository) {
            if let Ok(html) = self.fetcher.fetch(&url).await {
                if let Some(text) = markup::parse_readme(&html) {
                    return Some(text);
                }
            }
        }
        None
    }
}

pub fn readme_candidate_urls(username: &str, repository: &str) -> Vec<String> {
    let repository_page = format!("{GITHUB_BASE}/{username}/{repository}");
    let base = repository_page.as_str();
    let mut urls: Vec<String> = README_BRANCHES
        .iter()
        .flat_map(|branch| {
            README_FILENAMES
                .iter()
                .map(move |file| format!("{base}/blob/{branch}/{file}"))
        })
        .collect();
    urls.push(repository_page);
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::markup::tests::{profile_page, readme_page, repository_item, repository_listing};
    use crate::testing::StaticFetcher;

    fn scraper(fetcher: StaticFetcher) -> (ProfileScraper, Arc<StaticFetcher>) {
        let fetcher = Arc::new(fetcher);
        let scraper = ProfileScraper::new(fetcher.clone()).with_readme_delay(Duration::ZERO);
        (scraper, fetcher)
    }

    #[test]
    fn test_readme_candidates_order() {
        let urls = readme_candidate_urls("janed", "lexer");
        assert_eq!(urls.len(), 9);
        assert_eq!(urls[0], "https://github.com/janed/lexer/blob/master/README.md");
        assert_eq!(urls[4], "https://github.com/janed/lexer/blob/main/README.md");
        assert_eq!(urls[8], "https://github.com/janed/lexer");
    }

    #[tokio::test]
    async fn test_full_scrape_with_readme() {
        let fetcher = StaticFetcher::new()
            .with_page("https://github.com/janed", profile_page("Jane Doe", "Compilers"))
            .with_page(
                "https://github.com/janed?tab=repositories",
                repository_listing(&[repository_item("lexer", "Rust", "12")]),
            )
            .with_page(
                "https://github.com/janed/lexer/blob/main/README.md",
                readme_page("<p>A fast lexer</p>"),
            );
        let (scraper, _) = scraper(fetcher);

        let scrape = scraper
            .fetch_profile("https://www.github.com/janed/lexer")
            .await
            .unwrap();
        assert_eq!(scrape.user_info.name, "Jane Doe");
        assert_eq!(scrape.completeness, ScrapeCompleteness::Complete);
        assert_eq!(scrape.repositories.len(), 1);
        assert_eq!(scrape.repositories[0].readme.as_deref(), Some("A fast lexer"));
    }

    #[tokio::test]
    async fn test_unreachable_profile_is_an_error() {
        let (scraper, _) = scraper(StaticFetcher::new());
        let err = scraper
            .fetch_profile("https://github.com/ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::ProfileUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_invalid_reference_is_an_error() {
        let (scraper, fetcher) = scraper(StaticFetcher::new());
        let err = scraper
            .fetch_profile("https://gitlab.com/janed")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidProfileReference(_)));
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_missing_listing_is_partial() {
        let fetcher = StaticFetcher::new()
            .with_page("https://github.com/janed", profile_page("Jane Doe", "Compilers"));
        let (scraper, _) = scraper(fetcher);

        let scrape = scraper.fetch_profile("https://github.com/janed").await.unwrap();
        assert!(scrape.repositories.is_empty());
        assert!(matches!(scrape.completeness, ScrapeCompleteness::Partial { .. }));
    }

    #[tokio::test]
    async fn test_readme_miss_is_partial_but_keeps_repositories() {
        let fetcher = StaticFetcher::new()
            .with_page("https://github.com/janed", profile_page("Jane Doe", "Compilers"))
            .with_page(
                "https://github.com/janed?tab=repositories",
                repository_listing(&[
                    repository_item("lexer", "Rust", "12"),
                    repository_item("dotfiles", "Shell", "0"),
                ]),
            )
            .with_page(
                "https://github.com/janed/lexer/blob/master/README.md",
                readme_page("<p>A fast lexer</p>"),
            );
        let (scraper, _) = scraper(fetcher);

        let scrape = scraper.fetch_profile("https://github.com/janed").await.unwrap();
        assert_eq!(scrape.repositories.len(), 2);
        assert_eq!(scrape.repositories[0].readme.as_deref(), Some("A fast lexer"));
        assert!(scrape.repositories[1].readme.is_none());
        assert_eq!(
            scrape.completeness,
            ScrapeCompleteness::Partial {
                reason: "README missing for dotfiles".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_caps_on_repositories_and_readme_fetches() {
        let items: Vec<String> = (0..15)
            .map(|i| repository_item(&format!("repo{i}"), "Rust", "1"))
            .collect();
        let fetcher = StaticFetcher::new()
            .with_page("https://github.com/janed", profile_page("Jane Doe", ""))
            .with_page(
                "https://github.com/janed?tab=repositories",
                repository_listing(&items),
            );
        let fetcher = Arc::new(fetcher);
        let scraper = ProfileScraper::new(fetcher.clone()).with_readme_delay(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        let scrape = scraper.fetch_profile("https://github.com/janed").await.unwrap();

        assert_eq!(scrape.repositories.len(), MAX_REPOSITORIES);
        assert!(scrape.repositories.iter().all(|r| r.readme.is_none()));
        assert!(matches!(scrape.completeness, ScrapeCompleteness::Partial { .. }));

        let readme_requests = fetcher.requested_matching(|url| {
            url.contains("/blob/") || url.matches('/').count() == 4
        });
        let repos_touched: std::collections::HashSet<_> = readme_requests
            .iter()
            .filter_map(|url| url.split('/').nth(4))
            .collect();
        assert_eq!(repos_touched.len(), MAX_README_FETCHES);
        assert_eq!(readme_requests.len(), MAX_README_FETCHES * 9);

        // One pause between each pair of consecutive repositories.
        assert!(started.elapsed() >= Duration::from_secs((MAX_README_FETCHES - 1) as u64));
    }
}

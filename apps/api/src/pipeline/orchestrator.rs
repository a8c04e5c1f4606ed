use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, info_span, Instrument};

use crate::extraction::TextExtractor;
use crate::pipeline::error::PipelineError;
use crate::pipeline::stage::Stage;
use crate::pipeline::state::{EvaluationRequest, PipelineState};
use crate::profile::fetcher::PageFetcher;
use crate::profile::scraper::ProfileScraper;
use crate::research::search::WebSearch;
use crate::research::semantic::SemanticExtractor;

/// Drives one evaluation through the stage table.
///
/// Holds only shared collaborators; each call to [`Evaluator::evaluate`] owns
/// its own [`PipelineState`], so concurrent runs never share data.
pub struct Evaluator {
    pub(crate) extractor: TextExtractor,
    pub(crate) semantic: Arc<dyn SemanticExtractor>,
    pub(crate) search: Arc<dyn WebSearch>,
    pub(crate) fetcher: Arc<dyn PageFetcher>,
    pub(crate) scraper: ProfileScraper,
}

impl Evaluator {
    pub fn new(
        semantic: Arc<dyn SemanticExtractor>,
        search: Arc<dyn WebSearch>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            extractor: TextExtractor::new(),
            semantic,
            search,
            scraper: ProfileScraper::new(fetcher.clone()),
            fetcher,
        }
    }

    pub fn with_readme_delay(mut self, delay: Duration) -> Self {
        self.scraper = self.scraper.with_readme_delay(delay);
        self
    }

    /// Runs every stage in order until the end of the table or the first failure.
    /// Never returns an error: a failed run is a state carrying a [`StageFailure`].
    ///
    /// [`StageFailure`]: crate::pipeline::state::StageFailure
    pub async fn evaluate(&self, request: EvaluationRequest) -> PipelineState {
        let mut state = PipelineState::new(request);
        let span = info_span!(
            "evaluation",
            run_id = %state.run_id,
            candidate = %state.candidate_name()
        );

        async move {
            info!("Starting evaluation");
            let mut next = Some(Stage::INITIAL);

            while let Some(stage) = next {
                info!(stage = %stage, "Running stage");
                match self.run_stage(stage, &mut state).await {
                    Ok(()) => state.record_completed(stage),
                    Err(e) => {
                        error!(stage = %stage, "Stage failed: {e}");
                        state.record_failure(stage, format!("Error in {stage}: {e}"));
                    }
                }

                if state.is_failed() {
                    break;
                }
                next = stage.successor(&state);
            }

            info!(
                completed = state.completed_stages().len(),
                failed = state.is_failed(),
                "Evaluation finished"
            );
            state
        }
        .instrument(span)
        .await
    }

    async fn run_stage(&self, stage: Stage, state: &mut PipelineState) -> Result<(), PipelineError> {
        match stage {
            Stage::ParseResume => self.parse_resume(state).await,
            Stage::ParseJobDescription => self.parse_job_description(state).await,
            Stage::GithubResearch => self.github_research(state).await,
            Stage::WebResearch => self.web_research(state).await,
            Stage::CreateCandidateProfile => self.create_candidate_profile(state).await,
            Stage::CompareToJob => self.compare_to_job(state).await,
            Stage::GenerateDecision => self.generate_decision(state).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::models::assessment::FitScore;
    use crate::pipeline::stages::user_search_url;
    use crate::pipeline::state::tests::request;
    use crate::pipeline::state::DocumentSource;
    use crate::profile::markup::tests::{profile_page, readme_page, repository_item, repository_listing};
    use crate::profile::scraper::ScrapeCompleteness;
    use crate::research::semantic::ExtractionTask;
    use crate::testing::{ScriptedSearch, ScriptedSemantic, StaticFetcher};

    const RESUME: &str = "Jane Doe\nSenior engineer at Acme\nRust, PostgreSQL";
    const JOB: &str = "Senior Rust engineer. Must have: Rust.";

    struct Harness {
        evaluator: Evaluator,
        semantic: Arc<ScriptedSemantic>,
        search: Arc<ScriptedSearch>,
        fetcher: Arc<StaticFetcher>,
    }

    fn harness(semantic: ScriptedSemantic, search: ScriptedSearch, fetcher: StaticFetcher) -> Harness {
        let semantic = Arc::new(semantic);
        let search = Arc::new(search);
        let fetcher = Arc::new(fetcher);
        let evaluator = Evaluator::new(semantic.clone(), search.clone(), fetcher.clone())
            .with_readme_delay(Duration::ZERO);
        Harness {
            evaluator,
            semantic,
            search,
            fetcher,
        }
    }

    fn semantic_with_github(handle: &str) -> ScriptedSemantic {
        ScriptedSemantic::new().with_response(
            ExtractionTask::Resume,
            json!({"skills": ["Rust"], "online_profiles": {"github": format!("github.com/{handle}")}}),
        )
    }

    #[tokio::test]
    async fn test_run_without_profile_completes_all_seven_stages() {
        let h = harness(ScriptedSemantic::new(), ScriptedSearch::new(), StaticFetcher::new());

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        assert!(state.failure().is_none());
        assert_eq!(
            state.completed_stages(),
            &[
                Stage::ParseResume,
                Stage::ParseJobDescription,
                Stage::GithubResearch,
                Stage::WebResearch,
                Stage::CreateCandidateProfile,
                Stage::CompareToJob,
                Stage::GenerateDecision,
            ]
        );
        assert!(state.discovered_profile.is_none());
        assert!(state.github_research.is_none());
        let decision = state.final_decision.as_ref().unwrap();
        assert_eq!(decision.fit_score, Some(FitScore::StrongFit));
        assert_eq!(state.resume_profile.as_ref().unwrap().raw_text, RESUME);
        assert_eq!(state.job_requirements.as_ref().unwrap().raw_text, JOB);

        // User-search page, then the three fallback queries, then the research battery.
        assert_eq!(
            h.fetcher.requested(),
            vec![user_search_url("Jane Doe").unwrap()]
        );
        assert_eq!(h.search.queries().len(), 3 + 5);
        assert!(!h.semantic.tasks().contains(&ExtractionTask::RepositoryAnalysis));
        let web_prompt = h.semantic.prompt_for(ExtractionTask::WebResearch).unwrap();
        assert!(web_prompt.contains("No GitHub information found"));
    }

    #[tokio::test]
    async fn test_unreadable_resume_fails_before_any_stage_completes() {
        let h = harness(ScriptedSemantic::new(), ScriptedSearch::new(), StaticFetcher::new());
        let mut req = request("", Some(JOB));
        req.resume = DocumentSource {
            filename: "resume.pdf".into(),
            bytes: Bytes::from_static(b"%PDF-1.7 truncated garbage"),
        };

        let state = h.evaluator.evaluate(req).await;

        let failure = state.failure().unwrap();
        assert_eq!(failure.stage, Stage::ParseResume);
        assert!(failure.message.contains("No text could be extracted from the resume"));
        assert!(state.completed_stages().is_empty());
        assert!(h.semantic.tasks().is_empty());
        assert!(state.job_requirements.is_none());
    }

    #[tokio::test]
    async fn test_missing_job_description_halts_after_resume() {
        let h = harness(ScriptedSemantic::new(), ScriptedSearch::new(), StaticFetcher::new());

        let state = h.evaluator.evaluate(request(RESUME, None)).await;

        assert_eq!(state.completed_stages(), &[Stage::ParseResume]);
        let failure = state.failure().unwrap();
        assert_eq!(failure.stage, Stage::ParseJobDescription);
        assert!(failure.message.contains("No job description provided"));
        assert!(h.search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_semantic_failure_is_fatal_and_stops_the_trail() {
        let semantic = ScriptedSemantic::new().failing_on(ExtractionTask::Comparison);
        let h = harness(semantic, ScriptedSearch::new(), StaticFetcher::new());

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        assert_eq!(state.failure().unwrap().stage, Stage::CompareToJob);
        assert_eq!(state.completed_stages().last(), Some(&Stage::CreateCandidateProfile));
        assert!(state.final_decision.is_none());
        assert!(!h.semantic.tasks().contains(&ExtractionTask::FinalDecision));
    }

    #[tokio::test]
    async fn test_failing_web_queries_are_tolerated() {
        let search = ScriptedSearch::new()
            .failing_on("Jane Doe blog posts")
            .with_hits("Jane Doe portfolio", &["https://jane.dev"]);
        let h = harness(ScriptedSemantic::new(), search, StaticFetcher::new());

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        assert!(state.failure().is_none());
        let research = state.web_research.as_ref().unwrap();
        assert_eq!(research.raw_data["search_results"][0]["url"], "https://jane.dev");
        assert_eq!(research.blog_posts.len(), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_keeps_partial_profile_and_completes() {
        let fetcher = StaticFetcher::new()
            .with_page("https://github.com/janed", profile_page("Jane Doe", "Compilers"));
        let h = harness(semantic_with_github("janed"), ScriptedSearch::new(), fetcher);

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        assert!(state.failure().is_none());
        assert_eq!(state.completed_stages().len(), 7);
        assert_eq!(state.completed_stages()[2], Stage::GithubResearch);

        let github = state.github_research.as_ref().unwrap();
        let scrape = github.scrape.as_ref().unwrap();
        assert_eq!(scrape.user_info.name, "Jane Doe");
        assert!(scrape.repositories.is_empty());
        assert!(matches!(scrape.completeness, ScrapeCompleteness::Partial { .. }));
        assert!(github.analysis.is_none());
        assert!(state.final_decision.is_some());
        // The profile came from the résumé, so no discovery request was made.
        assert!(!h.fetcher.requested().iter().any(|u| u.contains("/search?")));
    }

    #[tokio::test]
    async fn test_readme_found_for_first_repository_only() {
        let listing = repository_listing(&[
            repository_item("lexer", "Rust", "1.2k"),
            repository_item("dotfiles", "Shell", "3"),
        ]);
        let long_readme = "x".repeat(6000);
        let fetcher = StaticFetcher::new()
            .with_page("https://github.com/janed", profile_page("Jane Doe", "Compilers"))
            .with_page("https://github.com/janed?tab=repositories", listing)
            .with_page(
                "https://github.com/janed/lexer/blob/master/README.md",
                readme_page(&format!("<p>{long_readme}</p>")),
            );
        let h = harness(semantic_with_github("janed"), ScriptedSearch::new(), fetcher);

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        let github = state.github_research.as_ref().unwrap();
        let repos = &github.scrape.as_ref().unwrap().repositories;
        assert_eq!(repos.len(), 2);
        let readme = repos[0].readme.as_deref().unwrap();
        assert!(readme.ends_with("...[truncated]"));
        assert_eq!(readme.chars().count(), 5000 + "...[truncated]".len());
        assert!(repos[1].readme.is_none());
        assert_eq!(repos[1].primary_language.as_deref(), Some("Shell"));
        assert_eq!(repos[1].star_count, 3);

        assert!(github.analysis.is_some());
        let web = state.web_research.as_ref().unwrap();
        assert_eq!(web.github_info.as_ref().unwrap()["primary_languages"], json!(["Rust"]));
        assert_eq!(web.social_profiles["github"], "https://github.com/janed");
        assert!(web.raw_data.contains_key("github"));
        let analysis_prompt = h.semantic.prompt_for(ExtractionTask::RepositoryAnalysis).unwrap();
        assert!(analysis_prompt.contains("dotfiles"));
    }

    #[tokio::test]
    async fn test_profile_discovered_by_user_search_runs_inline_research() {
        let search_page = r#"<div data-testid="results-list">
            <div>
                <a class="prc-Link-Link-1"><span>Jane Doering</span></a>
                <a class="prc-Link-Link-1"><span>jdoering</span></a>
            </div>
            <div>
                <a class="prc-Link-Link-1"><span>Jane Doe</span></a>
                <a class="prc-Link-Link-1"><span>janed</span></a>
            </div>
        </div>"#;
        let fetcher = StaticFetcher::new()
            .with_page(&user_search_url("Jane Doe").unwrap(), search_page)
            .with_page("https://github.com/janed", profile_page("Jane Doe", "Compilers"));
        let h = harness(ScriptedSemantic::new(), ScriptedSearch::new(), fetcher);

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        assert!(state.failure().is_none());
        assert_eq!(state.discovered_profile.as_ref().unwrap().username(), "janed");
        assert_eq!(
            state.completed_stages()[2..4],
            [Stage::GithubResearch, Stage::WebResearch]
        );
        assert_eq!(state.github_research.as_ref().unwrap().github_username, "janed");
        // Discovery succeeded on the page, so only the research battery hit the search API.
        assert_eq!(h.search.queries().len(), 5);
    }

    #[tokio::test]
    async fn test_inline_github_research_failure_is_attributed_to_github_research() {
        let search_page = r#"<div data-testid="results-list">
            <div>
                <a class="prc-Link-Link-1"><span>Jane Doe</span></a>
                <a class="prc-Link-Link-1"><span>janed</span></a>
            </div>
        </div>"#;
        let fetcher = StaticFetcher::new()
            .with_page(&user_search_url("Jane Doe").unwrap(), search_page)
            .with_page("https://github.com/janed", profile_page("Jane Doe", "Compilers"))
            .with_page(
                "https://github.com/janed?tab=repositories",
                repository_listing(&[repository_item("lexer", "Rust", "12")]),
            );
        let semantic = ScriptedSemantic::new().failing_on(ExtractionTask::RepositoryAnalysis);
        let h = harness(semantic, ScriptedSearch::new(), fetcher);

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        let failure = state.failure().unwrap();
        assert_eq!(failure.stage, Stage::GithubResearch);
        assert!(failure.message.starts_with("Error in githubResearch"));
        assert_eq!(
            state.completed_stages(),
            &[Stage::ParseResume, Stage::ParseJobDescription]
        );
        assert!(state.web_research.is_none());
        assert!(h.search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_profile_discovered_by_search_fallback() {
        let search = ScriptedSearch::new().with_hits(
            r#""Jane Doe" github profile"#,
            &["https://github.com/janed/lexer/issues/4", "https://github.com/janed"],
        );
        let h = harness(ScriptedSemantic::new(), search, StaticFetcher::new());

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        assert_eq!(state.discovered_profile.as_ref().unwrap().url(), "https://github.com/janed");
        // The profile page itself is not served, so research degrades to the bare reference.
        let github = state.github_research.as_ref().unwrap();
        assert!(github.unavailable_reason.is_some());
        assert!(github.scrape.is_none());
        assert!(state.failure().is_none());
    }

    #[tokio::test]
    async fn test_web_synthesis_fills_profile_only_when_unknown() {
        let semantic = ScriptedSemantic::new().with_response(
            ExtractionTask::WebResearch,
            json!({"social_profiles": {"github": "https://github.com/late-find", "twitter": "@jane"}}),
        );
        let h = harness(semantic, ScriptedSearch::new(), StaticFetcher::new());

        let state = h.evaluator.evaluate(request(RESUME, Some(JOB))).await;

        assert_eq!(state.discovered_profile.as_ref().unwrap().username(), "late-find");
        // Research already ran inline without a profile; it is not repeated.
        assert!(state.github_research.is_none());
        let web = state.web_research.as_ref().unwrap();
        assert_eq!(web.social_profiles["twitter"], "@jane");
    }

    #[tokio::test]
    async fn test_job_description_file_is_extracted_when_no_text() {
        let h = harness(ScriptedSemantic::new(), ScriptedSearch::new(), StaticFetcher::new());
        let mut req = request(RESUME, None);
        req.job_description = Some(DocumentSource {
            filename: "jd.md".into(),
            bytes: Bytes::from_static(b"# Rust engineer"),
        });

        let state = h.evaluator.evaluate(req).await;

        assert!(state.failure().is_none());
        assert_eq!(state.job_requirements.as_ref().unwrap().raw_text, "# Rust engineer");
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let h = harness(ScriptedSemantic::new(), ScriptedSearch::new(), StaticFetcher::new());
        let mut second = request(RESUME, Some(JOB));
        second.candidate_name = "Ada Lovelace".into();

        let (a, b) = tokio::join!(
            h.evaluator.evaluate(request(RESUME, Some(JOB))),
            h.evaluator.evaluate(second)
        );

        assert_ne!(a.run_id, b.run_id);
        assert_eq!(b.candidate_profile.as_ref().unwrap().name, "Ada Lovelace");
        assert_eq!(a.completed_stages().len(), 7);
        assert_eq!(b.completed_stages().len(), 7);
    }
}

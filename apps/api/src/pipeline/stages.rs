//! The seven stage functions. Each reads its inputs from the run state, writes
//! its output fields, and reports failure through `PipelineError`.

use reqwest::Url;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::assessment::{ComparisonResult, FinalDecision};
use crate::models::candidate::{CandidateProfile, ResumeData};
use crate::models::job::JobRequirements;
use crate::models::research::{GithubResearch, WebResearch};
use crate::pipeline::error::PipelineError;
use crate::pipeline::orchestrator::Evaluator;
use crate::pipeline::stage::Stage;
use crate::pipeline::state::{DocumentSource, PipelineState};
use crate::profile::scraper::ProfileScrape;
use crate::profile::{locator, ResolvedProfile, GITHUB_BASE};
use crate::research::search::SearchHit;
use crate::research::semantic::{extract_record, prompt_json, ExtractionTask};

const EMPTY_RESUME: &str =
    "No text could be extracted from the resume file. The file may be corrupted or empty.";
const NO_JOB_DESCRIPTION: &str = "No job description provided";
const EMPTY_JOB_DESCRIPTION: &str =
    "No text could be extracted from the job description. The file may be corrupted or empty.";

pub fn research_queries(candidate_name: &str) -> [String; 5] {
    [
        format!("{candidate_name} blog posts"),
        format!("{candidate_name} conference speaker"),
        format!("{candidate_name} portfolio"),
        format!(r#"site:twitter.com "{candidate_name}""#),
        format!(r#"site:stackoverflow.com "{candidate_name}""#),
    ]
}

pub fn profile_discovery_queries(candidate_name: &str) -> [String; 3] {
    [
        format!(r#""{candidate_name}" github profile"#),
        format!(r#""{candidate_name}" site:github.com"#),
        format!("{candidate_name} github"),
    ]
}

pub fn user_search_url(candidate_name: &str) -> Option<String> {
    let base = format!("{GITHUB_BASE}/search");
    Url::parse_with_params(&base, &[("q", candidate_name), ("type", "users")])
        .ok()
        .map(String::from)
}

impl Evaluator {
    pub(crate) async fn parse_resume(&self, state: &mut PipelineState) -> Result<(), PipelineError> {
        let text = self.extract_text(state.resume_source().clone()).await;
        if text.trim().is_empty() {
            return Err(PipelineError::InputMissing(EMPTY_RESUME));
        }
        info!(chars = text.len(), "Extracted résumé text");

        let mut resume: ResumeData = extract_record(
            self.semantic.as_ref(),
            ExtractionTask::Resume,
            &[("resume_text", text.clone())],
        )
        .await?;
        resume.raw_text = text;

        match locator::resolve(&resume) {
            Some(profile) => {
                info!(url = profile.url(), username = profile.username(), "Found profile in résumé");
                state.discovered_profile = Some(profile);
            }
            None => info!("No profile found in résumé"),
        }
        info!(
            skills = resume.skills.len(),
            work_experience = resume.work_experience.len(),
            "Parsed résumé"
        );
        state.resume_profile = Some(resume);
        Ok(())
    }

    pub(crate) async fn parse_job_description(
        &self,
        state: &mut PipelineState,
    ) -> Result<(), PipelineError> {
        let text = if let Some(text) = state.job_description_text() {
            info!(chars = text.len(), "Using provided job description text");
            text.to_string()
        } else if let Some(source) = state.job_description_source() {
            let text = self.extract_text(source.clone()).await;
            info!(chars = text.len(), "Extracted job description text");
            text
        } else {
            return Err(PipelineError::InputMissing(NO_JOB_DESCRIPTION));
        };
        if text.trim().is_empty() {
            return Err(PipelineError::InputMissing(EMPTY_JOB_DESCRIPTION));
        }

        let mut requirements: JobRequirements = extract_record(
            self.semantic.as_ref(),
            ExtractionTask::JobRequirements,
            &[("job_description", text.clone())],
        )
        .await?;
        requirements.raw_text = text;

        info!(core_skills = requirements.core_skills.len(), "Parsed job description");
        state.job_requirements = Some(requirements);
        Ok(())
    }

    /// Never fails on scraping problems: an unreachable or empty profile is stored
    /// as research without repositories.
    pub(crate) async fn github_research(&self, state: &mut PipelineState) -> Result<(), PipelineError> {
        let Some(profile) = state.discovered_profile.clone() else {
            info!("No profile available, skipping github research");
            state.github_research = None;
            return Ok(());
        };

        info!(url = profile.url(), "Scraping profile");
        let scrape = match self.scraper.fetch_profile(profile.url()).await {
            Ok(scrape) => scrape,
            Err(e) => {
                warn!("Profile scrape failed: {e}");
                state.github_research = Some(GithubResearch::empty(&profile, Some(e.to_string())));
                return Ok(());
            }
        };

        if scrape.repositories.is_empty() {
            info!(username = profile.username(), "No repositories to analyse");
            state.github_research = Some(GithubResearch {
                scrape: Some(scrape),
                ..GithubResearch::empty(&profile, None)
            });
            return Ok(());
        }

        info!(repositories = scrape.repositories.len(), "Analysing repositories");
        let analysis = self
            .semantic
            .extract(
                ExtractionTask::RepositoryAnalysis,
                &[
                    ("candidate_name", state.candidate_name().to_string()),
                    ("github_username", profile.username().to_string()),
                    ("github_url", profile.url().to_string()),
                    ("repository_data", prompt_json(&scrape)),
                ],
            )
            .await?;

        state.github_research = Some(GithubResearch {
            analysis: Some(analysis),
            scrape: Some(scrape),
            ..GithubResearch::empty(&profile, None)
        });
        Ok(())
    }

    pub(crate) async fn web_research(&self, state: &mut PipelineState) -> Result<(), PipelineError> {
        let candidate_name = state.candidate_name().to_string();

        if state.discovered_profile.is_none() {
            info!("No profile yet, searching by name");
            if let Some(profile) = self.discover_profile(&candidate_name).await {
                info!(url = profile.url(), "Discovered profile by name");
                state.discovered_profile = Some(profile);
            }
        }

        // Sub-call: githubResearch runs here when routing went straight to webResearch.
        if !state.has_completed(Stage::GithubResearch) {
            if let Err(e) = self.github_research(state).await {
                let stage = Stage::GithubResearch;
                state.record_failure(stage, format!("Error in {stage}: {e}"));
                return Err(e);
            }
            state.record_completed(Stage::GithubResearch);
        }

        let mut research = WebResearch::default();
        match &state.github_research {
            Some(github) => {
                info!(repositories = github.repository_count(), "Including github research");
                merge_github_research(&mut research, github);
            }
            None => info!("No github research to include"),
        }

        let mut hits: Vec<SearchHit> = Vec::new();
        for query in research_queries(&candidate_name) {
            match self.search.search(&query).await {
                Ok(found) => {
                    info!(query = %query, results = found.len(), "Web search");
                    hits.extend(found);
                }
                Err(e) => warn!(query = %query, "Web search failed: {e}"),
            }
        }
        research
            .raw_data
            .insert("search_results".to_string(), json!(hits));

        let github_data = research
            .github_info
            .as_ref()
            .map(prompt_json)
            .unwrap_or_else(|| "No GitHub information found".to_string());
        let synthesized: WebResearch = extract_record(
            self.semantic.as_ref(),
            ExtractionTask::WebResearch,
            &[
                ("candidate_name", candidate_name.clone()),
                ("search_results", prompt_json(&hits)),
                ("github_data", github_data),
            ],
        )
        .await?;

        if state.discovered_profile.is_none() {
            if let Some(profile) = synthesized.github_profile_link().and_then(ResolvedProfile::from_url) {
                info!(url = profile.url(), "Web research surfaced a profile");
                state.discovered_profile = Some(profile);
            }
        }

        research.blog_posts = synthesized.blog_posts;
        research.conference_appearances = synthesized.conference_appearances;
        research.news_mentions = synthesized.news_mentions;
        for (network, link) in synthesized.social_profiles {
            research.social_profiles.entry(network).or_insert(link);
        }

        info!(results = hits.len(), "Completed web research");
        state.web_research = Some(research);
        Ok(())
    }

    /// User-search page first, then the search-capability query variants.
    async fn discover_profile(&self, candidate_name: &str) -> Option<ResolvedProfile> {
        if let Some(url) = user_search_url(candidate_name) {
            match self.fetcher.fetch(&url).await {
                Ok(html) => {
                    if let Some(profile) = locator::resolve_from_search_markup(&html, candidate_name) {
                        return Some(profile);
                    }
                    info!("User search returned no usable results");
                }
                Err(e) => warn!("User search page unavailable: {e}"),
            }
        }

        for query in profile_discovery_queries(candidate_name) {
            match self.search.search(&query).await {
                Ok(hits) => {
                    if let Some(profile) = locator::resolve_from_search_hits(&hits) {
                        return Some(profile);
                    }
                }
                Err(e) => warn!(query = %query, "Profile search failed: {e}"),
            }
        }
        None
    }

    pub(crate) async fn create_candidate_profile(
        &self,
        state: &mut PipelineState,
    ) -> Result<(), PipelineError> {
        let resume_data = state
            .resume_profile
            .clone()
            .ok_or(PipelineError::MissingUpstream("resume_profile"))?;
        let web_research = state
            .web_research
            .clone()
            .ok_or(PipelineError::MissingUpstream("web_research"))?;

        state.candidate_profile = Some(CandidateProfile {
            name: state.candidate_name().to_string(),
            resume_data,
            web_research,
            github_research: state.github_research.clone(),
        });
        info!("Created candidate profile");
        Ok(())
    }

    pub(crate) async fn compare_to_job(&self, state: &mut PipelineState) -> Result<(), PipelineError> {
        let profile = state
            .candidate_profile
            .as_ref()
            .ok_or(PipelineError::MissingUpstream("candidate_profile"))?;
        let requirements = state
            .job_requirements
            .as_ref()
            .ok_or(PipelineError::MissingUpstream("job_requirements"))?;

        let comparison: ComparisonResult = extract_record(
            self.semantic.as_ref(),
            ExtractionTask::Comparison,
            &[
                ("candidate_name", state.candidate_name().to_string()),
                ("candidate_profile", prompt_json(profile)),
                ("job_requirements", prompt_json(requirements)),
            ],
        )
        .await?;

        info!(skill_matches = comparison.skill_matches.len(), "Compared candidate to job");
        state.comparison_result = Some(comparison);
        Ok(())
    }

    pub(crate) async fn generate_decision(&self, state: &mut PipelineState) -> Result<(), PipelineError> {
        let profile = state
            .candidate_profile
            .as_ref()
            .ok_or(PipelineError::MissingUpstream("candidate_profile"))?;
        let requirements = state
            .job_requirements
            .as_ref()
            .ok_or(PipelineError::MissingUpstream("job_requirements"))?;
        let comparison = state
            .comparison_result
            .as_ref()
            .ok_or(PipelineError::MissingUpstream("comparison_result"))?;

        let decision: FinalDecision = extract_record(
            self.semantic.as_ref(),
            ExtractionTask::FinalDecision,
            &[
                ("candidate_name", state.candidate_name().to_string()),
                ("candidate_profile", prompt_json(profile)),
                ("job_requirements", prompt_json(requirements)),
                ("comparison_result", prompt_json(comparison)),
            ],
        )
        .await?;

        match decision.fit_score {
            Some(score) => info!(fit_score = %score, "Final decision"),
            None => warn!("Final decision carries no recognised fit score"),
        }
        state.final_decision = Some(decision);
        Ok(())
    }

    /// Runs extraction off the async runtime; a panicked task yields no text.
    async fn extract_text(&self, source: DocumentSource) -> String {
        let extractor = self.extractor;
        let filename = source.filename.clone();
        match tokio::task::spawn_blocking(move || extractor.extract(&source.bytes, &source.filename)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(filename = %filename, "Extraction task failed: {e}");
                String::new()
            }
        }
    }
}

/// Copies github research into the web-research record.
fn merge_github_research(research: &mut WebResearch, github: &GithubResearch) {
    let analysis = github.analysis.as_ref();
    let primary_languages = analysis
        .and_then(|a| a.pointer("/github_profile/primary_languages"))
        .cloned()
        .unwrap_or_else(|| json!([]));
    let key_projects = analysis
        .and_then(|a| a.get("key_projects"))
        .cloned()
        .unwrap_or_else(|| json!([]));

    research.github_info = Some(json!({
        "username": github.github_username,
        "url": github.github_url,
        "primary_languages": primary_languages,
        "key_projects": key_projects,
    }));
    research
        .social_profiles
        .insert("github".to_string(), Value::String(github.github_url.clone()));
    if let Some(scrape) = &github.scrape {
        research
            .raw_data
            .insert("github".to_string(), scrape_value(scrape));
    }
}

fn scrape_value(scrape: &ProfileScrape) -> Value {
    serde_json::to_value(scrape).unwrap_or(Value::Null)
}

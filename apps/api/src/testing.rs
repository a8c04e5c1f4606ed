//! In-memory fakes for the pipeline's network seams.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::profile::fetcher::{FetchError, PageFetcher};
use crate::research::search::{SearchError, SearchHit, WebSearch};
use crate::research::semantic::{ExtractionTask, SemanticError, SemanticExtractor};

/// Serves pages from a URL map; anything else is a 404.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requested_matching(&self, predicate: impl Fn(&str) -> bool) -> Vec<String> {
        self.requested()
            .into_iter()
            .filter(|url| predicate(url))
            .collect()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Returns canned hits per query; unknown queries find nothing.
#[derive(Default)]
pub(crate) struct ScriptedSearch {
    hits: HashMap<String, Vec<SearchHit>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_hits(mut self, query: &str, urls: &[&str]) -> Self {
        let hits = urls
            .iter()
            .map(|url| SearchHit {
                url: url.to_string(),
                title: Some(format!("Result for {query}")),
                content: None,
            })
            .collect();
        self.hits.insert(query.to_string(), hits);
        self
    }

    pub(crate) fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for ScriptedSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.failing.contains(query) {
            return Err(SearchError::Api {
                status: 503,
                message: "search backend unavailable".into(),
            });
        }
        Ok(self.hits.get(query).cloned().unwrap_or_default())
    }
}

/// Answers each task with a canned record and records the prompts it was given.
pub(crate) struct ScriptedSemantic {
    responses: HashMap<ExtractionTask, Value>,
    failing: HashSet<ExtractionTask>,
    calls: Mutex<Vec<(ExtractionTask, String)>>,
}

impl ScriptedSemantic {
    pub(crate) fn new() -> Self {
        let responses = HashMap::from([
            (
                ExtractionTask::Resume,
                json!({
                    "skills": ["Rust", "PostgreSQL"],
                    "work_experience": [{"company": "Acme", "title": "Engineer"}],
                    "online_profiles": {}
                }),
            ),
            (
                ExtractionTask::JobRequirements,
                json!({"core_skills": ["Rust"], "experience_level": "senior"}),
            ),
            (
                ExtractionTask::RepositoryAnalysis,
                json!({
                    "github_profile": {"primary_languages": ["Rust"]},
                    "key_projects": [{"name": "lexer"}]
                }),
            ),
            (
                ExtractionTask::WebResearch,
                json!({"blog_posts": [{"title": "Writing a lexer"}], "social_profiles": {}}),
            ),
            (
                ExtractionTask::Comparison,
                json!({
                    "skill_matches": [{"skill": "Rust", "match_level": "High", "details": "lexer"}],
                    "overall_skill_match": "Strong"
                }),
            ),
            (
                ExtractionTask::FinalDecision,
                json!({
                    "fit_score": "Strong Fit",
                    "reasoning": "Deep Rust experience",
                    "recommendations": ["Schedule a systems design interview"]
                }),
            ),
        ]);
        Self {
            responses,
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_response(mut self, task: ExtractionTask, value: Value) -> Self {
        self.responses.insert(task, value);
        self
    }

    pub(crate) fn failing_on(mut self, task: ExtractionTask) -> Self {
        self.failing.insert(task);
        self
    }

    pub(crate) fn tasks(&self) -> Vec<ExtractionTask> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    /// The rendered prompt of the first call for `task`.
    pub(crate) fn prompt_for(&self, task: ExtractionTask) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| *t == task)
            .map(|(_, prompt)| prompt.clone())
    }
}

#[async_trait]
impl SemanticExtractor for ScriptedSemantic {
    async fn extract(
        &self,
        task: ExtractionTask,
        inputs: &[(&str, String)],
    ) -> Result<Value, SemanticError> {
        self.calls.lock().unwrap().push((task, task.render(inputs)));
        if self.failing.contains(&task) {
            return Err(SemanticError::NotAnObject {
                task,
                found: "null",
            });
        }
        Ok(self.responses.get(&task).cloned().unwrap_or_else(|| json!({})))
    }
}

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::models::assessment::{ComparisonResult, FinalDecision};
use crate::models::candidate::{CandidateProfile, ResumeData};
use crate::models::job::JobRequirements;
use crate::models::research::{GithubResearch, WebResearch};
use crate::pipeline::stage::Stage;
use crate::profile::ResolvedProfile;

/// An uploaded document: the original filename selects the extraction strategy.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub filename: String,
    pub bytes: Bytes,
}

/// Everything the caller supplies for one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub candidate_name: String,
    pub resume: DocumentSource,
    pub job_description: Option<DocumentSource>,
    pub job_description_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

/// The record threaded through every stage of one run.
///
/// Inputs are fixed at construction. The trail and the failure are only
/// changed through [`PipelineState::record_completed`] and
/// [`PipelineState::record_failure`], so once a failure is set nothing more
/// is appended.
#[derive(Debug, Serialize)]
pub struct PipelineState {
    pub run_id: Uuid,
    candidate_name: String,
    #[serde(skip)]
    resume_source: DocumentSource,
    #[serde(skip)]
    job_description_source: Option<DocumentSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_description_text: Option<String>,

    pub resume_profile: Option<ResumeData>,
    pub job_requirements: Option<JobRequirements>,
    pub discovered_profile: Option<ResolvedProfile>,
    pub github_research: Option<GithubResearch>,
    pub web_research: Option<WebResearch>,
    pub candidate_profile: Option<CandidateProfile>,
    pub comparison_result: Option<ComparisonResult>,
    pub final_decision: Option<FinalDecision>,

    completed_stages: Vec<Stage>,
    failure: Option<StageFailure>,
}

impl PipelineState {
    pub fn new(request: EvaluationRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            candidate_name: request.candidate_name,
            resume_source: request.resume,
            job_description_source: request.job_description,
            job_description_text: request.job_description_text,
            resume_profile: None,
            job_requirements: None,
            discovered_profile: None,
            github_research: None,
            web_research: None,
            candidate_profile: None,
            comparison_result: None,
            final_decision: None,
            completed_stages: Vec::new(),
            failure: None,
        }
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn resume_source(&self) -> &DocumentSource {
        &self.resume_source
    }

    pub fn job_description_source(&self) -> Option<&DocumentSource> {
        self.job_description_source.as_ref()
    }

    /// Caller-supplied job-description text, if any non-blank text was given.
    pub fn job_description_text(&self) -> Option<&str> {
        self.job_description_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    pub fn completed_stages(&self) -> &[Stage] {
        &self.completed_stages
    }

    pub fn has_completed(&self, stage: Stage) -> bool {
        self.completed_stages.contains(&stage)
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Appends `stage` to the trail unless the run has already failed.
    pub(crate) fn record_completed(&mut self, stage: Stage) {
        if self.failure.is_none() {
            self.completed_stages.push(stage);
        }
    }

    /// Records the first failure of the run; later ones are ignored.
    pub(crate) fn record_failure(&mut self, stage: Stage, message: String) {
        if self.failure.is_none() {
            self.failure = Some(StageFailure { stage, message });
        }
    }
}

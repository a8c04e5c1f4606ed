use anyhow::anyhow;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::assessment::{ComparisonResult, FitScore};
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRequirements;
use crate::models::research::WebResearch;
use crate::pipeline::stage::Stage;
use crate::pipeline::state::{DocumentSource, EvaluationRequest, PipelineState};
use crate::state::AppState;

#[derive(Serialize)]
pub struct EvaluationResponse {
    pub run_id: uuid::Uuid,
    pub candidate_name: String,
    pub fit_score: Option<FitScore>,
    pub reasoning: String,
    pub recommendations: Vec<String>,
    pub completed_stages: Vec<Stage>,
    pub detailed_analysis: DetailedAnalysis,
}

#[derive(Serialize)]
pub struct DetailedAnalysis {
    pub candidate_profile: Option<CandidateProfile>,
    pub job_requirements: Option<JobRequirements>,
    pub comparison_result: Option<ComparisonResult>,
    pub web_research: Option<WebResearch>,
}

/// POST /api/v1/evaluations
///
/// Multipart fields: `candidate_name`, `resume_file`, and optionally
/// `job_description` (text) and/or `job_description_file`.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let request = read_evaluation_request(multipart).await?;
    let run = state.evaluator.evaluate(request).await;
    into_response(run).map(Json)
}

async fn read_evaluation_request(mut multipart: Multipart) -> Result<EvaluationRequest, AppError> {
    let mut candidate_name = None;
    let mut resume = None;
    let mut job_description = None;
    let mut job_description_text = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "candidate_name" => candidate_name = Some(field.text().await?),
            "job_description" => job_description_text = Some(field.text().await?),
            "resume_file" | "job_description_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if bytes.is_empty() {
                    continue;
                }
                let source = DocumentSource { filename, bytes };
                if name == "resume_file" {
                    resume = Some(source);
                } else {
                    job_description = Some(source);
                }
            }
            other => debug!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    let candidate_name = candidate_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("candidate_name is required".into()))?;
    let resume =
        resume.ok_or_else(|| AppError::Validation("resume_file is required".into()))?;

    Ok(EvaluationRequest {
        candidate_name,
        resume,
        job_description,
        job_description_text,
    })
}

fn into_response(run: PipelineState) -> Result<EvaluationResponse, AppError> {
    if let Some(failure) = run.failure() {
        return Err(AppError::EvaluationFailed(failure.message.clone()));
    }
    let decision = run
        .final_decision
        .clone()
        .ok_or_else(|| AppError::Internal(anyhow!("evaluation finished without a final decision")))?;

    Ok(EvaluationResponse {
        run_id: run.run_id,
        candidate_name: run.candidate_name().to_string(),
        fit_score: decision.fit_score,
        reasoning: decision.reasoning,
        recommendations: decision.recommendations,
        completed_stages: run.completed_stages().to_vec(),
        detailed_analysis: DetailedAnalysis {
            candidate_profile: run.candidate_profile,
            job_requirements: run.job_requirements,
            comparison_result: run.comparison_result,
            web_research: run.web_research,
        },
    })
}

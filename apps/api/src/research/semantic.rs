use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::prompts::{EVIDENCE_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::research::prompts::*;

/// The structured record a semantic extraction call is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionTask {
    Resume,
    JobRequirements,
    RepositoryAnalysis,
    WebResearch,
    Comparison,
    FinalDecision,
}

impl ExtractionTask {
    pub fn name(self) -> &'static str {
        match self {
            ExtractionTask::Resume => "resume",
            ExtractionTask::JobRequirements => "job_requirements",
            ExtractionTask::RepositoryAnalysis => "repository_analysis",
            ExtractionTask::WebResearch => "web_research",
            ExtractionTask::Comparison => "comparison",
            ExtractionTask::FinalDecision => "final_decision",
        }
    }

    fn role(self) -> &'static str {
        match self {
            ExtractionTask::Resume | ExtractionTask::JobRequirements => DOCUMENT_ANALYST_ROLE,
            ExtractionTask::RepositoryAnalysis | ExtractionTask::WebResearch => {
                RESEARCH_ANALYST_ROLE
            }
            ExtractionTask::Comparison | ExtractionTask::FinalDecision => HIRING_ASSESSOR_ROLE,
        }
    }

    fn template(self) -> &'static str {
        match self {
            ExtractionTask::Resume => RESUME_PROMPT_TEMPLATE,
            ExtractionTask::JobRequirements => JOB_PROMPT_TEMPLATE,
            ExtractionTask::RepositoryAnalysis => REPOSITORY_PROMPT_TEMPLATE,
            ExtractionTask::WebResearch => WEB_RESEARCH_PROMPT_TEMPLATE,
            ExtractionTask::Comparison => COMPARISON_PROMPT_TEMPLATE,
            ExtractionTask::FinalDecision => DECISION_PROMPT_TEMPLATE,
        }
    }

    /// Fills the task template with `inputs`, given as `(placeholder, value)` pairs.
    pub fn render(self, inputs: &[(&str, String)]) -> String {
        inputs.iter().fold(
            self.template()
                .replace("{evidence_instruction}", EVIDENCE_INSTRUCTION),
            |prompt, (key, value)| prompt.replace(&format!("{{{key}}}"), value),
        )
    }

    pub fn system_prompt(self) -> String {
        format!("{} {}", self.role(), JSON_ONLY_SYSTEM)
    }
}

impl fmt::Display for ExtractionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("{task} extraction failed: {source}")]
    Llm {
        task: ExtractionTask,
        #[source]
        source: LlmError,
    },

    #[error("{task} extraction returned {found} instead of a JSON object")]
    NotAnObject {
        task: ExtractionTask,
        found: &'static str,
    },

    #[error("{task} record could not be decoded: {source}")]
    Decode {
        task: ExtractionTask,
        #[source]
        source: serde_json::Error,
    },
}

/// Turns unstructured text into a structured JSON record for one task.
#[async_trait]
pub trait SemanticExtractor: Send + Sync {
    async fn extract(
        &self,
        task: ExtractionTask,
        inputs: &[(&str, String)],
    ) -> Result<Value, SemanticError>;
}

/// Runs `task` and decodes the record into `T`.
pub async fn extract_record<T: DeserializeOwned>(
    extractor: &dyn SemanticExtractor,
    task: ExtractionTask,
    inputs: &[(&str, String)],
) -> Result<T, SemanticError> {
    let value = extractor.extract(task, inputs).await?;
    serde_json::from_value(value).map_err(|source| SemanticError::Decode { task, source })
}

/// Claude-backed extractor.
#[derive(Clone)]
pub struct LlmSemanticExtractor {
    llm: LlmClient,
}

impl LlmSemanticExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl SemanticExtractor for LlmSemanticExtractor {
    async fn extract(
        &self,
        task: ExtractionTask,
        inputs: &[(&str, String)],
    ) -> Result<Value, SemanticError> {
        let prompt = task.render(inputs);
        debug!(task = %task, prompt_chars = prompt.len(), "Requesting semantic extraction");

        let value: Value = self
            .llm
            .call_json(&prompt, &task.system_prompt())
            .await
            .map_err(|source| SemanticError::Llm { task, source })?;
        ensure_object(task, value)
    }
}

fn ensure_object(task: ExtractionTask, value: Value) -> Result<Value, SemanticError> {
    let found = match &value {
        Value::Object(_) => return Ok(value),
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
    };
    Err(SemanticError::NotAnObject { task, found })
}

/// Pretty JSON for embedding a record in a prompt.
pub fn prompt_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

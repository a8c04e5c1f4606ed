use thiserror::Error;

use crate::research::semantic::SemanticError;

/// Why a stage failed. Captured into the run state by the orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InputMissing(&'static str),

    #[error("external service failed: {0}")]
    ExternalService(#[from] SemanticError),

    #[error("required upstream field '{0}' is missing")]
    MissingUpstream(&'static str),
}

//! The evaluation pipeline: a fixed stage table driven by [`Evaluator`], with
//! every stage reading and writing one [`PipelineState`](state::PipelineState) per run.
//!
//! ```text
//! parseResume -> parseJobDescription
//! parseJobDescription -> githubResearch (profile discovered) | webResearch
//! githubResearch -> webResearch -> createCandidateProfile -> compareToJob -> generateDecision
//! ```

pub mod error;
pub mod handlers;
pub mod orchestrator;
pub mod stage;
pub mod stages;
pub mod state;

pub use orchestrator::Evaluator;

use std::fmt;

use serde::Serialize;

use crate::pipeline::state::PipelineState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    ParseResume,
    ParseJobDescription,
    GithubResearch,
    WebResearch,
    CreateCandidateProfile,
    CompareToJob,
    GenerateDecision,
}

/// Outgoing edge of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Next(Stage),
    /// Branch on whether a profile has been discovered.
    IfProfileDiscovered { then: Stage, otherwise: Stage },
    End,
}

impl Stage {
    pub const INITIAL: Stage = Stage::ParseResume;

    pub fn name(self) -> &'static str {
        match self {
            Stage::ParseResume => "parseResume",
            Stage::ParseJobDescription => "parseJobDescription",
            Stage::GithubResearch => "githubResearch",
            Stage::WebResearch => "webResearch",
            Stage::CreateCandidateProfile => "createCandidateProfile",
            Stage::CompareToJob => "compareToJob",
            Stage::GenerateDecision => "generateDecision",
        }
    }

    pub fn route(self) -> Route {
        match self {
            Stage::ParseResume => Route::Next(Stage::ParseJobDescription),
            Stage::ParseJobDescription => Route::IfProfileDiscovered {
                then: Stage::GithubResearch,
                otherwise: Stage::WebResearch,
            },
            Stage::GithubResearch => Route::Next(Stage::WebResearch),
            Stage::WebResearch => Route::Next(Stage::CreateCandidateProfile),
            Stage::CreateCandidateProfile => Route::Next(Stage::CompareToJob),
            Stage::CompareToJob => Route::Next(Stage::GenerateDecision),
            Stage::GenerateDecision => Route::End,
        }
    }

    /// The stage to run after this one, or `None` at the end of the run.
    pub fn successor(self, state: &PipelineState) -> Option<Stage> {
        match self.route() {
            Route::Next(next) => Some(next),
            Route::IfProfileDiscovered { then, otherwise } => {
                Some(if state.discovered_profile.is_some() {
                    then
                } else {
                    otherwise
                })
            }
            Route::End => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

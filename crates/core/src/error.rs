//! Error types for the governance pipeline.
//!
//! Errors are scoped by phase, not by cause: each one fixes the phase that
//! failed and names the first invariant that was violated. No error carries
//! user text or partial artifacts.

use crate::validation::RuleId;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The assembly phase an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    SituationClassification,
    ControlDirective,
    OutputIntent,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::SituationClassification => "SITUATION_CLASSIFICATION",
            Phase::ControlDirective => "CONTROL_DIRECTIVE",
            Phase::OutputIntent => "OUTPUT_INTENT",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Situation classification failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("state assembly failed: invariant {rule} violated")]
pub struct StateAssemblyError {
    pub rule: RuleId,
}

/// Control directive assembly failed (selection, override, or schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("orchestration assembly failed: invariant {rule} violated")]
pub struct OrchestrationAssemblyError {
    pub rule: RuleId,
}

/// Output intent assembly failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("output plan invariant violated: {rule}")]
pub struct OutputPlanInvariantViolation {
    pub rule: RuleId,
}

impl StateAssemblyError {
    pub const PHASE: Phase = Phase::SituationClassification;
}

impl OrchestrationAssemblyError {
    pub const PHASE: Phase = Phase::ControlDirective;
}

impl OutputPlanInvariantViolation {
    pub const PHASE: Phase = Phase::OutputIntent;
}

impl From<RuleId> for StateAssemblyError {
    fn from(rule: RuleId) -> Self {
        Self { rule }
    }
}

impl From<RuleId> for OrchestrationAssemblyError {
    fn from(rule: RuleId) -> Self {
        Self { rule }
    }
}

impl From<RuleId> for OutputPlanInvariantViolation {
    fn from(rule: RuleId) -> Self {
        Self { rule }
    }
}

/// The top-level error type for a full pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    StateAssembly(#[from] StateAssemblyError),

    #[error(transparent)]
    OrchestrationAssembly(#[from] OrchestrationAssemblyError),

    #[error(transparent)]
    OutputPlan(#[from] OutputPlanInvariantViolation),
}

impl Error {
    /// The phase that failed.
    pub fn phase(&self) -> Phase {
        match self {
            Error::StateAssembly(_) => StateAssemblyError::PHASE,
            Error::OrchestrationAssembly(_) => OrchestrationAssemblyError::PHASE,
            Error::OutputPlan(_) => OutputPlanInvariantViolation::PHASE,
        }
    }

    /// The first invariant that failed.
    pub fn rule(&self) -> RuleId {
        match self {
            Error::StateAssembly(e) => e.rule,
            Error::OrchestrationAssembly(e) => e.rule,
            Error::OutputPlan(e) => e.rule,
        }
    }
}

/// Name used by callers outside the core.
pub type GovernanceError = Error;

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_error_displays_rule() {
        let err = StateAssemblyError::from(RuleId("DS_NONE_DOMAIN_EXCLUSIVE"));
        assert!(err.to_string().contains("DS_NONE_DOMAIN_EXCLUSIVE"));
        assert!(err.to_string().contains("state assembly"));
    }

    #[test]
    fn top_level_error_keeps_phase_and_rule() {
        let err: Error = OrchestrationAssemblyError::from(RuleId("CP_STOP_REQUIRES_INTERVENTION")).into();
        assert_eq!(err.phase(), Phase::ControlDirective);
        assert_eq!(err.rule(), RuleId("CP_STOP_REQUIRES_INTERVENTION"));
        assert!(err.to_string().contains("orchestration"));

        let err: Error = OutputPlanInvariantViolation::from(RuleId("OP_REFUSAL_CATEGORY_PRESENT")).into();
        assert_eq!(err.phase(), Phase::OutputIntent);
        assert_eq!(err.phase().to_string(), "OUTPUT_INTENT");
    }
}

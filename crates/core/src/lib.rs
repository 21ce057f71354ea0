//! # RustedGuard Core
//!
//! Vocabulary, error taxonomy and shared infrastructure for the RustedGuard
//! governance pipeline. This crate holds no governance logic of its own. It
//! defines the closed value sets every phase reasons over, the fail-closed
//! validation engine every phase reports through, and the deterministic
//! identifier scheme every artifact is stamped with.
//!
//! ## Pipeline
//!
//! ```text
//! user_text ──▶ DecisionState ──▶ ControlPlan ──▶ OutputPlan ──▶ renderer
//!               (classify)        (assemble)      (assemble)
//! ```
//!
//! Every arrow is a pure function. Nothing here reads a clock, an RNG, or
//! shared mutable state.

pub mod error;
pub mod identity;
pub mod taxonomy;
pub mod validation;

// Re-export key types at crate root for ergonomics
pub use error::{
    Error, GovernanceError, OrchestrationAssemblyError, OutputPlanInvariantViolation, Phase, Result,
    StateAssemblyError,
};
pub use identity::{ArtifactId, ArtifactKind, DigestBuilder, TraceId, TraceIdError};
pub use validation::{Rule, RuleId, validate};

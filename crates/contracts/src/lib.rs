//! Governance artifacts: the three sealed records a pipeline run produces.
//!
//! Each artifact wraps a plain field struct ([`Situation`], [`ControlDirective`],
//! [`OutputIntent`]) that an assembler fills in. Sealing runs the artifact's
//! declared invariants through the fail-closed validation engine and stamps a
//! content-derived id bound to the upstream artifacts.
//!
//! # Chain
//!
//! ```text
//! ┌───────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ DecisionState │───▶│ ControlPlan  │───▶│  OutputPlan  │
//! │   ds:<hex>    │    │   cp:<hex>   │    │   op:<hex>   │
//! └───────────────┘    └──────────────┘    └──────────────┘
//!        │                    │                    │
//!   SITUATION_RULES    DIRECTIVE_RULES      output_rules()
//! ```
//!
//! Sealed artifacts expose no setters and do not implement `Deserialize`:
//! the only way to obtain one is through its validating constructor.

pub mod control_plan;
pub mod decision_state;
pub mod output_plan;

pub use control_plan::{ControlDirective, ControlPlan, DIRECTIVE_RULES, MAX_QUESTION_BUDGET};
pub use decision_state::{DecisionState, SITUATION_RULES, Situation};
pub use output_plan::{
    ActionSpec, ClosureSpec, OutputCheck, OutputIntent, OutputPlan, QuestionSpec, RefusalSpec,
    dominant_action, output_rules, rigor_disclosure_floor,
};

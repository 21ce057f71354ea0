//! # RustedGuard Pipeline
//!
//! The three assembly phases, each a pure function of its explicit inputs:
//!
//! ```text
//! classifier::classify(trace, text, framing)        -> DecisionState
//! control::assemble(trace, &DecisionState)          -> ControlPlan
//! output::assemble(trace, &DecisionState, &ControlPlan) -> OutputPlan
//! ```
//!
//! [`govern`] chains them and stops at the first phase that fails. Nothing
//! here holds state between calls, so any number of runs may proceed in
//! parallel.

pub mod classifier;
pub mod control;
pub mod lattice;
pub mod lexicon;
pub mod output;

use rustedguard_contracts::{ControlPlan, DecisionState, OutputPlan};
use rustedguard_core::taxonomy::IntentFraming;
use rustedguard_core::{Phase, Result, RuleId, TraceId};
use serde::Serialize;
use tracing::{debug, warn};

/// The three artifacts of one successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Governance {
    pub decision_state: DecisionState,
    pub control_plan: ControlPlan,
    pub output_plan: OutputPlan,
}

/// Run the full pipeline over one message.
///
/// Failures are logged with phase and rule id only. The message text never
/// reaches the log.
pub fn govern(
    trace: &TraceId,
    text: &str,
    framing: Option<IntentFraming>,
) -> Result<Governance> {
    let result = run(trace, text, framing);
    match &result {
        Ok(g) => debug!(
            trace_id = %trace,
            output_plan = %g.output_plan.id(),
            action = %g.output_plan.action(),
            "Governance complete"
        ),
        Err(e) => warn!(
            trace_id = %trace,
            phase = %e.phase(),
            rule = %e.rule(),
            "Governance failed closed"
        ),
    }
    result
}

fn run(trace: &TraceId, text: &str, framing: Option<IntentFraming>) -> Result<Governance> {
    let decision_state = classifier::classify(trace, text, framing)?;
    let control_plan = control::assemble(trace, &decision_state)?;
    let output_plan = output::assemble(trace, &decision_state, &control_plan)?;
    Ok(Governance {
        decision_state,
        control_plan,
        output_plan,
    })
}

/// Rule ids one phase can report or apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRules {
    pub phase: Phase,
    pub invariants: Vec<RuleId>,
    pub overrides: Vec<RuleId>,
}

/// Every rule id, grouped by phase, in evaluation order.
pub fn rule_catalog() -> Vec<PhaseRules> {
    let mut situation = vec![classifier::INPUT_NON_EMPTY];
    situation.extend(DecisionState::rule_ids());

    vec![
        PhaseRules {
            phase: Phase::SituationClassification,
            invariants: situation,
            overrides: Vec::new(),
        },
        PhaseRules {
            phase: Phase::ControlDirective,
            invariants: ControlPlan::rule_ids(),
            overrides: control::OVERRIDES.iter().map(|o| o.id).collect(),
        },
        PhaseRules {
            phase: Phase::OutputIntent,
            invariants: OutputPlan::rule_ids(),
            overrides: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustedguard_core::taxonomy::OutputAction;

    fn trace() -> TraceId {
        TraceId::new("trace-govern").unwrap()
    }

    #[test]
    fn govern_chains_ids() {
        let g = govern(&trace(), "Is it safe to climb a ladder in the rain?", None).unwrap();
        assert_eq!(g.control_plan.decision_state_id(), g.decision_state.id());
        assert_eq!(g.output_plan.control_plan_id(), g.control_plan.id());
        assert_eq!(g.output_plan.decision_state_id(), g.decision_state.id());
    }

    #[test]
    fn govern_reports_phase_on_failure() {
        let err = govern(&trace(), "", None).unwrap_err();
        assert_eq!(err.phase(), Phase::SituationClassification);
        assert_eq!(err.rule(), classifier::INPUT_NON_EMPTY);
    }

    #[test]
    fn benign_question_is_answered() {
        let g = govern(&trace(), "How do I boil an egg?", None).unwrap();
        assert_eq!(g.output_plan.action(), OutputAction::Answer);
    }

    #[test]
    fn catalog_has_no_duplicate_ids() {
        let mut all: Vec<RuleId> = rule_catalog()
            .into_iter()
            .flat_map(|p| p.invariants.into_iter().chain(p.overrides))
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
        assert!(total > 30);
    }

    #[test]
    fn governance_serializes_all_three_artifacts() {
        let g = govern(&trace(), "How do I boil an egg?", None).unwrap();
        let json = serde_json::to_value(&g).unwrap();
        assert!(json["decision_state"]["id"].as_str().unwrap().starts_with("ds:"));
        assert!(json["control_plan"]["id"].as_str().unwrap().starts_with("cp:"));
        assert_eq!(json["output_plan"]["action"], "ANSWER");
    }
}

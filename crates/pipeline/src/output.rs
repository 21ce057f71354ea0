//! Output intent assembler: DecisionState + ControlPlan to OutputPlan.
//!
//! The action is fixed first by dominance. Each output level then walks its
//! own ladder from the lowest rung. A ladder may be seeded by a level an
//! earlier ladder settled on, but never by the action. The action only
//! applies ceilings to verbosity once every ladder has settled.

use crate::lattice::{Floor, supremum};
use rustedguard_contracts::{
    ActionSpec, ClosureSpec, ControlDirective, ControlPlan, DecisionState, OutputIntent,
    OutputPlan, QuestionSpec, RefusalSpec, Situation, dominant_action, rigor_disclosure_floor,
};
use rustedguard_core::taxonomy::{
    AssumptionSurfacing, ClosureState, Confidence, ConfidenceSignaling, ConsequenceHorizon,
    FrictionPosture, OutputAction, Posture, ProximityState, Redirect, ResponsibilityScope,
    ReversibilityClass, RigorDisclosure, RigorLevel, UnknownDisclosure, UnknownSource,
    VerbosityCap,
};
use rustedguard_core::{OutputPlanInvariantViolation, RuleId, TraceId};
use std::collections::BTreeSet;
use tracing::debug;

/// The escalation triggers the output ladders read, lifted out of the
/// upstream artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triggers {
    pub has_risk: bool,
    pub critical: Option<Confidence>,
    pub proximity: ProximityState,
    pub irreversible: bool,
    pub long_horizon: bool,
    pub scope: ResponsibilityScope,
    pub unknowns: BTreeSet<UnknownSource>,
    pub rigor: RigorLevel,
    pub friction: FrictionPosture,
    pub refusal_required: bool,
    pub closed: bool,
}

impl Triggers {
    pub fn from_upstream(s: &Situation, d: &ControlDirective) -> Self {
        Self {
            has_risk: s.has_risk(),
            critical: s.critical_confidence(),
            proximity: s.proximity_state,
            irreversible: s.reversibility_class == ReversibilityClass::Irreversible,
            long_horizon: s.consequence_horizon == ConsequenceHorizon::Long,
            scope: s.responsibility_scope,
            unknowns: s.explicit_unknown_zone.clone(),
            rigor: d.rigor_level,
            friction: d.friction_posture,
            refusal_required: d.refusal_required,
            closed: d.closure_state == ClosureState::Closed,
        }
    }

    fn critical_at_least(&self, floor: Confidence) -> bool {
        self.critical.is_some_and(|c| c >= floor)
    }

    fn has_unknowns(&self) -> bool {
        !self.unknowns.is_empty()
    }
}

/// Settled ladder levels, before action ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels {
    pub posture: Posture,
    pub rigor_disclosure: RigorDisclosure,
    pub confidence_signaling: ConfidenceSignaling,
    pub assumption_surfacing: AssumptionSurfacing,
    pub unknown_disclosure: UnknownDisclosure,
    pub verbosity_cap: VerbosityCap,
}

// ── Ladders ───────────────────────────────────────────────────────────────

const POSTURE_FLOORS: &[Floor<Triggers, Posture>] = &[
    Floor::new(Posture::Guarded, |t: &Triggers| t.has_risk),
    Floor::new(Posture::Guarded, |t: &Triggers| t.rigor >= RigorLevel::High),
    Floor::new(Posture::Guarded, Triggers::has_unknowns),
    Floor::new(Posture::Guarded, |t: &Triggers| {
        t.scope >= ResponsibilityScope::ThirdParty
    }),
    Floor::new(Posture::Constrained, |t: &Triggers| {
        t.critical_at_least(Confidence::Medium) && t.proximity >= ProximityState::High
    }),
    Floor::new(Posture::Constrained, |t: &Triggers| {
        t.irreversible && t.proximity >= ProximityState::High
    }),
    Floor::new(Posture::Constrained, |t: &Triggers| {
        t.friction == FrictionPosture::Stop
    }),
    Floor::new(Posture::Constrained, |t: &Triggers| t.refusal_required),
    Floor::new(Posture::Constrained, |t: &Triggers| t.closed),
];

const RIGOR_DISCLOSURE_FLOORS: &[Floor<Triggers, RigorDisclosure>] = &[
    Floor::new(RigorDisclosure::Summary, |t: &Triggers| {
        t.rigor >= RigorLevel::Standard
    }),
    Floor::new(RigorDisclosure::Full, |t: &Triggers| t.rigor >= RigorLevel::High),
];

const CONFIDENCE_FLOORS: &[Floor<Triggers, ConfidenceSignaling>] = &[
    Floor::new(ConfidenceSignaling::Explicit, |t: &Triggers| {
        t.unknowns.contains(&UnknownSource::RiskDomain)
            || t.unknowns.contains(&UnknownSource::Proximity)
    }),
    Floor::new(ConfidenceSignaling::Guarded, |t: &Triggers| {
        t.rigor == RigorLevel::Maximal
    }),
];

const ASSUMPTION_FLOORS: &[Floor<Triggers, AssumptionSurfacing>] = &[
    Floor::new(AssumptionSurfacing::Key, Triggers::has_unknowns),
    Floor::new(AssumptionSurfacing::Key, |t: &Triggers| {
        t.scope >= ResponsibilityScope::ThirdParty
    }),
    Floor::new(AssumptionSurfacing::All, |t: &Triggers| t.unknowns.len() >= 3),
    Floor::new(AssumptionSurfacing::All, |t: &Triggers| {
        t.irreversible && t.long_horizon
    }),
];

const UNKNOWN_DISCLOSURE_FLOORS: &[Floor<Triggers, UnknownDisclosure>] = &[
    Floor::new(UnknownDisclosure::Acknowledge, Triggers::has_unknowns),
    Floor::new(UnknownDisclosure::Enumerate, |t: &Triggers| {
        t.unknowns.contains(&UnknownSource::Reversibility)
            || t.unknowns.contains(&UnknownSource::OutcomeClass)
    }),
    Floor::new(UnknownDisclosure::Enumerate, |t: &Triggers| {
        t.rigor >= RigorLevel::High && t.has_unknowns()
    }),
];

const VERBOSITY_FLOORS: &[Floor<Triggers, VerbosityCap>] = &[
    Floor::new(VerbosityCap::Standard, |t: &Triggers| t.has_risk),
    Floor::new(VerbosityCap::Extended, |t: &Triggers| t.rigor >= RigorLevel::High),
    Floor::new(VerbosityCap::Detailed, |t: &Triggers| t.rigor == RigorLevel::Maximal),
];

/// Walk every ladder. Coupled ladders are seeded by the level an earlier
/// ladder settled on.
pub fn walk_ladders(t: &Triggers) -> Levels {
    let posture = supremum(t, Posture::Baseline, POSTURE_FLOORS);
    let rigor_disclosure = supremum(t, RigorDisclosure::None, RIGOR_DISCLOSURE_FLOORS);

    let constrained = posture == Posture::Constrained;
    let confidence_signaling = supremum(
        t,
        if constrained {
            ConfidenceSignaling::Guarded
        } else {
            ConfidenceSignaling::Implicit
        },
        CONFIDENCE_FLOORS,
    );
    let assumption_surfacing = supremum(
        t,
        if constrained {
            AssumptionSurfacing::Key
        } else {
            AssumptionSurfacing::None
        },
        ASSUMPTION_FLOORS,
    );
    let unknown_disclosure = supremum(t, UnknownDisclosure::None, UNKNOWN_DISCLOSURE_FLOORS);
    let verbosity_cap = supremum(
        t,
        if rigor_disclosure == RigorDisclosure::Full {
            VerbosityCap::Extended
        } else {
            VerbosityCap::Compact
        },
        VERBOSITY_FLOORS,
    );

    Levels {
        posture,
        rigor_disclosure,
        confidence_signaling,
        assumption_surfacing,
        unknown_disclosure,
        verbosity_cap,
    }
}

/// Upper bound on verbosity for an action.
pub fn verbosity_ceiling(action: OutputAction) -> VerbosityCap {
    match action {
        OutputAction::Answer => VerbosityCap::Detailed,
        OutputAction::AskOneQuestion => VerbosityCap::Extended,
        OutputAction::Refuse => VerbosityCap::Standard,
        OutputAction::Close => VerbosityCap::Compact,
    }
}

fn action_spec(
    action: OutputAction,
    directive: &ControlDirective,
) -> Result<ActionSpec, OutputPlanInvariantViolation> {
    Ok(match action {
        OutputAction::Answer => ActionSpec::Answer,
        OutputAction::AskOneQuestion => {
            let question_class = directive
                .question_class
                .ok_or(OutputPlanInvariantViolation::from(RuleId(
                    "OP_QUESTION_SPEC_COMPLETE",
                )))?;
            ActionSpec::AskOneQuestion(QuestionSpec {
                question_class,
                max_questions: 1,
            })
        }
        OutputAction::Refuse => ActionSpec::Refuse(RefusalSpec {
            category: directive.refusal_category,
            redirect: Redirect::for_category(directive.refusal_category),
        }),
        OutputAction::Close => ActionSpec::Close(ClosureSpec {
            closure_state: directive.closure_state,
        }),
    })
}

/// Assemble and seal the OutputPlan for `state` and `control`.
pub fn assemble(
    trace: &TraceId,
    state: &DecisionState,
    control: &ControlPlan,
) -> Result<OutputPlan, OutputPlanInvariantViolation> {
    let directive = control.directive();
    let action = dominant_action(directive);

    let triggers = Triggers::from_upstream(state.situation(), directive);
    let levels = walk_ladders(&triggers);
    debug_assert!(levels.rigor_disclosure >= rigor_disclosure_floor(directive.rigor_level));

    let intent = OutputIntent {
        spec: action_spec(action, directive)?,
        posture: levels.posture,
        rigor_disclosure: levels.rigor_disclosure,
        confidence_signaling: levels.confidence_signaling,
        assumption_surfacing: levels.assumption_surfacing,
        unknown_disclosure: levels.unknown_disclosure,
        verbosity_cap: levels.verbosity_cap.min(verbosity_ceiling(action)),
    };
    debug!(
        action = %action,
        posture = %intent.posture,
        verbosity = %intent.verbosity_cap,
        unknown_disclosure = %intent.unknown_disclosure,
        "Output intent selected"
    );

    OutputPlan::new(trace, state, control, intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control;
    use rustedguard_contracts::OutputCheck;
    use rustedguard_core::taxonomy::{OutcomeClass, RiskDomain};
    use std::collections::BTreeMap;

    fn trace() -> TraceId {
        TraceId::new("trace-output").unwrap()
    }

    fn run(situation: Situation) -> OutputPlan {
        let state = DecisionState::new(&trace(), situation).unwrap();
        let plan = control::assemble(&trace(), &state).unwrap();
        assemble(&trace(), &state, &plan).unwrap()
    }

    fn calm() -> Triggers {
        Triggers::from_upstream(&Situation::baseline(), &ControlDirective::open())
    }

    #[test]
    fn baseline_reaches_every_lowest_rung() {
        let out = run(Situation::baseline());
        let intent = out.intent();
        assert_eq!(out.action(), OutputAction::Answer);
        assert_eq!(intent.posture, Posture::Baseline);
        assert_eq!(intent.rigor_disclosure, RigorDisclosure::None);
        assert_eq!(intent.confidence_signaling, ConfidenceSignaling::Implicit);
        assert_eq!(intent.assumption_surfacing, AssumptionSurfacing::None);
        assert_eq!(intent.unknown_disclosure, UnknownDisclosure::None);
        assert_eq!(intent.verbosity_cap, VerbosityCap::Compact);
    }

    #[test]
    fn near_critical_risk_is_constrained() {
        let situation = Situation {
            proximity_state: ProximityState::High,
            risk_domains: BTreeMap::from([(RiskDomain::Medical, Confidence::Medium)]),
            outcome_classes: BTreeSet::from([OutcomeClass::HealthHarm]),
            ..Situation::baseline()
        };
        let out = run(situation);
        assert_eq!(out.intent().posture, Posture::Constrained);
        assert_eq!(out.intent().confidence_signaling, ConfidenceSignaling::Guarded);
    }

    #[test]
    fn refusal_is_constrained_and_capped() {
        let situation = Situation {
            proximity_state: ProximityState::Imminent,
            risk_domains: BTreeMap::from([(RiskDomain::SelfHarm, Confidence::High)]),
            outcome_classes: BTreeSet::from([OutcomeClass::PhysicalInjury]),
            ..Situation::baseline()
        };
        let out = run(situation);
        assert_eq!(out.action(), OutputAction::Refuse);
        assert_eq!(out.intent().posture, Posture::Constrained);
        assert_eq!(out.intent().verbosity_cap, VerbosityCap::Standard);
        assert_eq!(
            out.intent().spec,
            ActionSpec::Refuse(RefusalSpec {
                category: rustedguard_core::taxonomy::RefusalCategory::SelfHarmRisk,
                redirect: Redirect::CrisisResources,
            })
        );
    }

    #[test]
    fn question_carries_its_class() {
        let situation = Situation {
            risk_domains: BTreeMap::from([(RiskDomain::Financial, Confidence::Low)]),
            outcome_classes: BTreeSet::from([OutcomeClass::FinancialLoss]),
            explicit_unknown_zone: BTreeSet::from([UnknownSource::RiskDomain]),
            ..Situation::baseline()
        };
        let out = run(situation);
        assert_eq!(out.action(), OutputAction::AskOneQuestion);
        assert!(out.intent().verbosity_cap <= VerbosityCap::Extended);
        assert_eq!(out.intent().unknown_disclosure, UnknownDisclosure::Acknowledge);
        assert_eq!(out.intent().confidence_signaling, ConfidenceSignaling::Explicit);
    }

    #[test]
    fn exit_closes_compactly() {
        let situation = Situation {
            intent_framing: Some(rustedguard_core::taxonomy::IntentFraming::Exiting),
            ..Situation::baseline()
        };
        let out = run(situation);
        assert_eq!(out.action(), OutputAction::Close);
        assert_eq!(out.intent().verbosity_cap, VerbosityCap::Compact);
        assert_eq!(
            out.intent().spec,
            ActionSpec::Close(ClosureSpec {
                closure_state: ClosureState::UserTerminated
            })
        );
    }

    #[test]
    fn plans_satisfy_their_own_invariants() {
        let out = run(Situation::baseline());
        let state = DecisionState::new(&trace(), Situation::baseline()).unwrap();
        let plan = control::assemble(&trace(), &state).unwrap();
        let check = OutputCheck {
            intent: out.intent(),
            state: &state,
            control: &plan,
        };
        assert!(rustedguard_core::validate(&check, &rustedguard_contracts::output_rules()).is_ok());
    }

    /// Every single-field raise of a trigger must leave each ladder at the
    /// same rung or higher.
    #[test]
    fn ladders_never_relax_under_added_triggers() {
        let unknown_sets = [
            BTreeSet::new(),
            BTreeSet::from([UnknownSource::RiskDomain]),
            BTreeSet::from([UnknownSource::RiskDomain, UnknownSource::Proximity]),
            BTreeSet::from([
                UnknownSource::RiskDomain,
                UnknownSource::Proximity,
                UnknownSource::Reversibility,
                UnknownSource::OutcomeClass,
            ]),
        ];
        let criticals = [None, Some(Confidence::Low), Some(Confidence::Medium), Some(Confidence::High)];

        let mut cases = Vec::new();
        for has_risk in [false, true] {
            for critical in criticals {
                for proximity in ProximityState::ALL {
                    for irreversible in [false, true] {
                        for scope in ResponsibilityScope::ALL {
                            for (u, unknowns) in unknown_sets.iter().enumerate() {
                                for rigor in RigorLevel::ALL {
                                    for refusal_required in [false, true] {
                                        cases.push((
                                            u,
                                            Triggers {
                                                has_risk,
                                                critical,
                                                proximity: *proximity,
                                                irreversible,
                                                long_horizon: irreversible,
                                                scope: *scope,
                                                unknowns: unknowns.clone(),
                                                rigor: *rigor,
                                                refusal_required,
                                                ..calm()
                                            },
                                        ));
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        for (u, base) in &cases {
            let low = walk_ladders(base);
            let mut raised = Vec::new();
            raised.push(Triggers { has_risk: true, ..base.clone() });
            raised.push(Triggers { irreversible: true, long_horizon: true, ..base.clone() });
            raised.push(Triggers { refusal_required: true, ..base.clone() });
            raised.push(Triggers { closed: true, ..base.clone() });
            raised.push(Triggers { friction: FrictionPosture::Stop, ..base.clone() });
            if let Some(next) = ProximityState::ALL.iter().find(|p| **p > base.proximity) {
                raised.push(Triggers { proximity: *next, ..base.clone() });
            }
            if let Some(next) = RigorLevel::ALL.iter().find(|r| **r > base.rigor) {
                raised.push(Triggers { rigor: *next, ..base.clone() });
            }
            if let Some(next) = ResponsibilityScope::ALL.iter().find(|s| **s > base.scope) {
                raised.push(Triggers { scope: *next, ..base.clone() });
            }
            if let Some(next) = criticals.iter().find(|c| **c > base.critical) {
                raised.push(Triggers { critical: *next, ..base.clone() });
            }
            if let Some(superset) = unknown_sets.get(u + 1) {
                raised.push(Triggers { unknowns: superset.clone(), ..base.clone() });
            }

            for higher in &raised {
                let high = walk_ladders(higher);
                assert!(high.posture >= low.posture, "{base:?} -> {higher:?}");
                assert!(high.rigor_disclosure >= low.rigor_disclosure);
                assert!(high.confidence_signaling >= low.confidence_signaling);
                assert!(high.assumption_surfacing >= low.assumption_surfacing);
                assert!(high.unknown_disclosure >= low.unknown_disclosure);
                assert!(high.verbosity_cap >= low.verbosity_cap);
            }
        }
    }

    #[test]
    fn unknowns_are_always_disclosed() {
        for source in UnknownSource::ALL {
            let t = Triggers {
                unknowns: BTreeSet::from([*source]),
                ..calm()
            };
            assert_ne!(walk_ladders(&t).unknown_disclosure, UnknownDisclosure::None);
        }
    }
}

//! Control directive assembler: DecisionState to ControlPlan.
//!
//! Selection runs in a fixed order, each step reading the DecisionState and
//! the fields chosen before it. Selection never corrects an earlier field.
//! Cross-step corrections happen only in the override pass, one named rule
//! at a time, after which the directive is sealed.

use crate::lattice::{Floor, supremum};
use rustedguard_contracts::{ControlDirective, ControlPlan, DecisionState, Situation};
use rustedguard_core::taxonomy::{
    ClosureState, Confidence, FrictionPosture, InitiativeBudget, IntentFraming, ProximityState,
    QuestionClass, RefusalCategory, ResponsibilityScope, ReversibilityClass, RigorLevel,
    RiskDomain, UnknownSource, WarningBudget,
};
use rustedguard_core::{OrchestrationAssemblyError, RuleId, TraceId};
use tracing::debug;

/// Assemble and seal the ControlPlan for `state`.
pub fn assemble(
    trace: &TraceId,
    state: &DecisionState,
) -> Result<ControlPlan, OrchestrationAssemblyError> {
    let s = state.situation();

    let rigor_level = select_rigor(s);
    let friction_posture = select_friction(s, rigor_level);
    let warning_budget = warnings_for(friction_posture);
    let clarification_required = clarification_triggered(s, rigor_level);
    let question_budget = u8::from(clarification_required);
    let question_class = (question_budget == 1).then(|| compress_question(s));
    let initiative_budget = select_initiative(rigor_level, clarification_required);
    let closure_state = detect_closure(s);
    let refusal_category = refusal_trigger(s);

    let mut directive = ControlDirective {
        rigor_level,
        friction_posture,
        closure_state,
        clarification_required,
        question_budget,
        question_class,
        initiative_budget,
        warning_budget,
        refusal_required: refusal_category != RefusalCategory::None,
        refusal_category,
        answer_allowed: false,
    };
    debug!(
        rigor = %directive.rigor_level,
        friction = %directive.friction_posture,
        closure = %directive.closure_state,
        clarification = directive.clarification_required,
        refusal = %directive.refusal_category,
        "Control directive selected"
    );

    apply_overrides(&mut directive);
    ControlPlan::new(trace, state, directive)
}

// ── 1. Rigor ──────────────────────────────────────────────────────────────

fn critical_at_medium(s: &Situation) -> bool {
    s.critical_at_least(Confidence::Medium)
}

fn proximity_high(s: &Situation) -> bool {
    s.proximity_state >= ProximityState::High
}

const RIGOR_FLOORS: &[Floor<Situation, RigorLevel>] = &[
    Floor::new(RigorLevel::Standard, Situation::has_risk),
    Floor::new(RigorLevel::High, |s: &Situation| {
        s.reversibility_class == ReversibilityClass::Irreversible
    }),
    Floor::new(RigorLevel::High, proximity_high),
    Floor::new(RigorLevel::High, critical_at_medium),
    Floor::new(RigorLevel::Maximal, |s: &Situation| {
        critical_at_medium(s) && proximity_high(s)
    }),
];

fn select_rigor(s: &Situation) -> RigorLevel {
    supremum(s, RigorLevel::Low, RIGOR_FLOORS)
}

// ── 2. Friction and warnings ──────────────────────────────────────────────

const FRICTION_FLOORS: &[Floor<Situation, FrictionPosture>] = &[
    Floor::new(FrictionPosture::Pause, |s: &Situation| {
        s.responsibility_scope == ResponsibilityScope::SystemicPublic
    }),
    Floor::new(FrictionPosture::Stop, |s: &Situation| {
        s.critical_at_least(Confidence::High) && s.proximity_state == ProximityState::Imminent
    }),
];

fn select_friction(s: &Situation, rigor: RigorLevel) -> FrictionPosture {
    let base = match rigor {
        RigorLevel::Low => FrictionPosture::None,
        RigorLevel::Standard => FrictionPosture::Soft,
        RigorLevel::High | RigorLevel::Maximal => FrictionPosture::Pause,
    };
    supremum(s, base, FRICTION_FLOORS)
}

fn warnings_for(friction: FrictionPosture) -> WarningBudget {
    match friction {
        FrictionPosture::None => WarningBudget::Zero,
        FrictionPosture::Soft | FrictionPosture::Pause => WarningBudget::One,
        FrictionPosture::Stop => WarningBudget::Two,
    }
}

// ── 3. Clarification trigger ──────────────────────────────────────────────

fn clarification_triggered(s: &Situation, rigor: RigorLevel) -> bool {
    rigor >= RigorLevel::Standard
        && s.proximity_state < ProximityState::Imminent
        && (s.is_unknown(UnknownSource::RiskDomain)
            || s.is_unknown(UnknownSource::Proximity)
            || s.is_unknown(UnknownSource::Responsibility))
}

// ── 4. Single-question compression ────────────────────────────────────────

fn compress_question(s: &Situation) -> QuestionClass {
    if s.critical_confidence().is_some() {
        return QuestionClass::SafetyCheck;
    }
    [
        (UnknownSource::RiskDomain, QuestionClass::IntentClarification),
        (UnknownSource::Proximity, QuestionClass::TimingClarification),
        (UnknownSource::Responsibility, QuestionClass::ScopeClarification),
    ]
    .into_iter()
    .find(|(source, _)| s.is_unknown(*source))
    .map_or(QuestionClass::ContextGap, |(_, class)| class)
}

// ── 5. Initiative discipline ──────────────────────────────────────────────

fn select_initiative(rigor: RigorLevel, clarification: bool) -> InitiativeBudget {
    if clarification {
        return InitiativeBudget::Zero;
    }
    match rigor {
        RigorLevel::Low => InitiativeBudget::Two,
        RigorLevel::Standard => InitiativeBudget::One,
        RigorLevel::High | RigorLevel::Maximal => InitiativeBudget::Zero,
    }
}

// ── 6. Closure detection ──────────────────────────────────────────────────

fn detect_closure(s: &Situation) -> ClosureState {
    if s.critical_at_least(Confidence::High)
        && s.proximity_state == ProximityState::Imminent
        && s.responsibility_scope == ResponsibilityScope::SystemicPublic
    {
        ClosureState::Closed
    } else if s.intent_framing == Some(IntentFraming::Exiting)
        && refusal_trigger(s) == RefusalCategory::None
    {
        // A farewell never masks a refusal.
        ClosureState::UserTerminated
    } else if s.domain_at_least(RiskDomain::PhysicalSafety, Confidence::High)
        && s.proximity_state >= ProximityState::High
        && s.responsibility_scope >= ResponsibilityScope::ThirdParty
    {
        ClosureState::Closing
    } else {
        ClosureState::Open
    }
}

// ── 7. Refusal trigger ────────────────────────────────────────────────────

fn refusal_trigger(s: &Situation) -> RefusalCategory {
    let third_party = s.responsibility_scope >= ResponsibilityScope::ThirdParty;
    let imminent = s.proximity_state == ProximityState::Imminent;

    if s.domain_at_least(RiskDomain::SelfHarm, Confidence::Medium) && proximity_high(s) {
        RefusalCategory::SelfHarmRisk
    } else if s.domain_at_least(RiskDomain::Medical, Confidence::High) && imminent {
        RefusalCategory::EmergencyReferral
    } else if s.domain_at_least(RiskDomain::PhysicalSafety, Confidence::High) && third_party {
        RefusalCategory::ThirdPartyHarm
    } else if s.domain_at_least(RiskDomain::PhysicalSafety, Confidence::High) && imminent {
        RefusalCategory::ImminentHarm
    } else if s.domain_at_least(RiskDomain::Security, Confidence::High) && third_party {
        RefusalCategory::IllegalFacilitation
    } else {
        RefusalCategory::None
    }
}

// ── 8. Overrides ──────────────────────────────────────────────────────────

/// A named cross-step correction. Fires when `applies` holds.
pub struct Override {
    pub id: RuleId,
    applies: fn(&ControlDirective) -> bool,
    apply: fn(&mut ControlDirective),
}

fn closed(d: &ControlDirective) -> bool {
    !d.closure_state.is_open()
}

fn cancel_questions(d: &mut ControlDirective) {
    d.clarification_required = false;
    d.question_budget = 0;
    d.question_class = None;
}

/// Override rules, applied in order.
pub const OVERRIDES: &[Override] = &[
    Override {
        id: RuleId("OV_CLOSURE_CANCELS_QUESTIONS"),
        applies: |d| closed(d) && (d.clarification_required || d.question_budget > 0),
        apply: cancel_questions,
    },
    Override {
        id: RuleId("OV_CLOSURE_CANCELS_WARNINGS"),
        applies: |d| closed(d) && d.warning_budget != WarningBudget::Zero,
        apply: |d| d.warning_budget = WarningBudget::Zero,
    },
    Override {
        id: RuleId("OV_CLOSURE_CANCELS_INITIATIVE"),
        applies: |d| closed(d) && d.initiative_budget != InitiativeBudget::Zero,
        apply: |d| d.initiative_budget = InitiativeBudget::Zero,
    },
    Override {
        id: RuleId("OV_REFUSAL_CANCELS_QUESTIONS"),
        applies: |d| d.refusal_required && (d.clarification_required || d.question_budget > 0),
        apply: cancel_questions,
    },
    Override {
        id: RuleId("OV_REFUSAL_CANCELS_INITIATIVE"),
        applies: |d| d.refusal_required && d.initiative_budget != InitiativeBudget::Zero,
        apply: |d| d.initiative_budget = InitiativeBudget::Zero,
    },
    Override {
        id: RuleId("OV_DERIVE_ANSWER_ALLOWED"),
        applies: |d| d.answer_allowed != d.derived_answer_allowed(),
        apply: |d| d.answer_allowed = d.derived_answer_allowed(),
    },
];

fn apply_overrides(directive: &mut ControlDirective) {
    for rule in OVERRIDES {
        if (rule.applies)(directive) {
            (rule.apply)(directive);
            debug!(rule = %rule.id, "Override applied");
        }
    }
}

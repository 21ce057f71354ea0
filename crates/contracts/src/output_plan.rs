//! OutputPlan: the bounded intent a renderer must honor.

use crate::control_plan::{ControlDirective, ControlPlan};
use crate::decision_state::{DecisionState, Situation};
use rustedguard_core::taxonomy::{
    AssumptionSurfacing, ClosureState, ConfidenceSignaling, OutputAction, Posture, QuestionClass,
    Redirect, RefusalCategory, RigorDisclosure, RigorLevel, UnknownDisclosure, VerbosityCap,
};
use rustedguard_core::validation::{Rule, RuleId, rule_ids, validate};
use rustedguard_core::{
    ArtifactId, ArtifactKind, DigestBuilder, OutputPlanInvariantViolation, TraceId,
};
use serde::Serialize;

/// The action selected by dominance over a control directive:
/// CLOSE > REFUSE > ASK_ONE_QUESTION > ANSWER.
pub fn dominant_action(directive: &ControlDirective) -> OutputAction {
    if !directive.closure_state.is_open() {
        OutputAction::Close
    } else if directive.refusal_required {
        OutputAction::Refuse
    } else if directive.question_budget == 1 {
        OutputAction::AskOneQuestion
    } else {
        OutputAction::Answer
    }
}

/// Lowest rigor disclosure a given upstream rigor level permits.
pub fn rigor_disclosure_floor(rigor: RigorLevel) -> RigorDisclosure {
    match rigor {
        RigorLevel::Low => RigorDisclosure::None,
        RigorLevel::Standard => RigorDisclosure::Summary,
        RigorLevel::High | RigorLevel::Maximal => RigorDisclosure::Full,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionSpec {
    pub question_class: QuestionClass,
    pub max_questions: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefusalSpec {
    pub category: RefusalCategory,
    pub redirect: Redirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClosureSpec {
    pub closure_state: ClosureState,
}

/// The action together with the only sub-spec that action may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "spec", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionSpec {
    Answer,
    AskOneQuestion(QuestionSpec),
    Refuse(RefusalSpec),
    Close(ClosureSpec),
}

impl ActionSpec {
    pub fn action(&self) -> OutputAction {
        match self {
            ActionSpec::Answer => OutputAction::Answer,
            ActionSpec::AskOneQuestion(_) => OutputAction::AskOneQuestion,
            ActionSpec::Refuse(_) => OutputAction::Refuse,
            ActionSpec::Close(_) => OutputAction::Close,
        }
    }
}

/// The selected output fields of an OutputPlan, before sealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputIntent {
    #[serde(flatten)]
    pub spec: ActionSpec,
    pub posture: Posture,
    pub rigor_disclosure: RigorDisclosure,
    pub confidence_signaling: ConfidenceSignaling,
    pub assumption_surfacing: AssumptionSurfacing,
    pub unknown_disclosure: UnknownDisclosure,
    pub verbosity_cap: VerbosityCap,
}

impl OutputIntent {
    pub fn action(&self) -> OutputAction {
        self.spec.action()
    }

    fn digest(&self, trace: &TraceId, state: &ArtifactId, control: &ArtifactId) -> ArtifactId {
        let mut builder = DigestBuilder::new(ArtifactKind::OutputPlan, trace)
            .upstream(state)
            .upstream(control)
            .field("action", self.action().as_str());
        builder = match self.spec {
            ActionSpec::Answer => builder,
            ActionSpec::AskOneQuestion(q) => builder
                .field("question_class", q.question_class.as_str())
                .field("max_questions", &q.max_questions.to_string()),
            ActionSpec::Refuse(r) => builder
                .field("refusal_category", r.category.as_str())
                .field("redirect", r.redirect.as_str()),
            ActionSpec::Close(c) => builder.field("closure_state", c.closure_state.as_str()),
        };
        builder
            .field("posture", self.posture.as_str())
            .field("rigor_disclosure", self.rigor_disclosure.as_str())
            .field("confidence_signaling", self.confidence_signaling.as_str())
            .field("assumption_surfacing", self.assumption_surfacing.as_str())
            .field("unknown_disclosure", self.unknown_disclosure.as_str())
            .field("verbosity_cap", self.verbosity_cap.as_str())
            .finish()
    }
}

/// An intent viewed together with the upstream artifacts it must honor.
pub struct OutputCheck<'a> {
    pub intent: &'a OutputIntent,
    pub state: &'a DecisionState,
    pub control: &'a ControlPlan,
}

impl OutputCheck<'_> {
    fn situation(&self) -> &Situation {
        self.state.situation()
    }

    fn directive(&self) -> &ControlDirective {
        self.control.directive()
    }
}

// ── Invariants ────────────────────────────────────────────────────────────

fn upstream_chain_consistent(c: &OutputCheck<'_>) -> bool {
    c.control.decision_state_id() == c.state.id()
}

fn action_matches_dominance(c: &OutputCheck<'_>) -> bool {
    c.intent.action() == dominant_action(c.directive())
}

fn question_spec_complete(c: &OutputCheck<'_>) -> bool {
    match c.intent.spec {
        ActionSpec::AskOneQuestion(q) => {
            q.max_questions == 1 && c.directive().question_class == Some(q.question_class)
        }
        _ => true,
    }
}

fn refusal_category_present(c: &OutputCheck<'_>) -> bool {
    match c.intent.spec {
        ActionSpec::Refuse(r) => r.category != RefusalCategory::None,
        _ => true,
    }
}

fn refusal_matches_control(c: &OutputCheck<'_>) -> bool {
    match c.intent.spec {
        ActionSpec::Refuse(r) => {
            r.category == c.directive().refusal_category
                && r.redirect == Redirect::for_category(r.category)
        }
        _ => true,
    }
}

fn closure_spec_complete(c: &OutputCheck<'_>) -> bool {
    match c.intent.spec {
        ActionSpec::Close(s) => {
            !s.closure_state.is_open() && s.closure_state == c.directive().closure_state
        }
        _ => true,
    }
}

fn refuse_posture_constrained(c: &OutputCheck<'_>) -> bool {
    c.intent.action() != OutputAction::Refuse || c.intent.posture == Posture::Constrained
}

fn constrained_confidence_guarded(c: &OutputCheck<'_>) -> bool {
    c.intent.posture != Posture::Constrained
        || c.intent.confidence_signaling == ConfidenceSignaling::Guarded
}

fn rigor_disclosure_floor_held(c: &OutputCheck<'_>) -> bool {
    c.intent.rigor_disclosure >= rigor_disclosure_floor(c.directive().rigor_level)
}

fn unknown_disclosure_floor_held(c: &OutputCheck<'_>) -> bool {
    !c.situation().has_unknowns() || c.intent.unknown_disclosure != UnknownDisclosure::None
}

fn question_verbosity_capped(c: &OutputCheck<'_>) -> bool {
    c.intent.action() != OutputAction::AskOneQuestion
        || c.intent.verbosity_cap < VerbosityCap::Detailed
}

/// OutputPlan invariants, in evaluation order.
pub fn output_rules<'a>() -> [Rule<OutputCheck<'a>>; 11] {
    [
        Rule::new("OP_UPSTREAM_CHAIN_CONSISTENT", upstream_chain_consistent),
        Rule::new("OP_ACTION_MATCHES_DOMINANCE", action_matches_dominance),
        Rule::new("OP_QUESTION_SPEC_COMPLETE", question_spec_complete),
        Rule::new("OP_REFUSAL_CATEGORY_PRESENT", refusal_category_present),
        Rule::new("OP_REFUSAL_MATCHES_CONTROL", refusal_matches_control),
        Rule::new("OP_CLOSURE_SPEC_COMPLETE", closure_spec_complete),
        Rule::new("OP_REFUSE_POSTURE_CONSTRAINED", refuse_posture_constrained),
        Rule::new("OP_CONSTRAINED_CONFIDENCE_GUARDED", constrained_confidence_guarded),
        Rule::new("OP_RIGOR_DISCLOSURE_FLOOR", rigor_disclosure_floor_held),
        Rule::new("OP_UNKNOWN_DISCLOSURE_FLOOR", unknown_disclosure_floor_held),
        Rule::new("OP_QUESTION_VERBOSITY_CAP", question_verbosity_capped),
    ]
}

/// A sealed, validated output intent bound to both upstream artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPlan {
    id: ArtifactId,
    decision_state_id: ArtifactId,
    control_plan_id: ArtifactId,
    #[serde(flatten)]
    intent: OutputIntent,
}

impl OutputPlan {
    /// Validate `intent` against its upstream artifacts and seal it.
    pub fn new(
        trace: &TraceId,
        state: &DecisionState,
        control: &ControlPlan,
        intent: OutputIntent,
    ) -> Result<Self, OutputPlanInvariantViolation> {
        let check = OutputCheck {
            intent: &intent,
            state,
            control,
        };
        validate(&check, &output_rules())?;
        let id = intent.digest(trace, state.id(), control.id());
        Ok(Self {
            id,
            decision_state_id: *state.id(),
            control_plan_id: *control.id(),
            intent,
        })
    }

    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    pub fn decision_state_id(&self) -> &ArtifactId {
        &self.decision_state_id
    }

    pub fn control_plan_id(&self) -> &ArtifactId {
        &self.control_plan_id
    }

    pub fn intent(&self) -> &OutputIntent {
        &self.intent
    }

    pub fn action(&self) -> OutputAction {
        self.intent.action()
    }

    pub fn rule_ids() -> Vec<RuleId> {
        rule_ids(&output_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustedguard_core::taxonomy::{Confidence, RiskDomain, UnknownSource};
    use std::collections::{BTreeMap, BTreeSet};

    fn trace() -> TraceId {
        TraceId::new("trace-op").unwrap()
    }

    fn baseline_state() -> DecisionState {
        DecisionState::new(&trace(), Situation::baseline()).unwrap()
    }

    fn control(state: &DecisionState, directive: ControlDirective) -> ControlPlan {
        ControlPlan::new(&trace(), state, directive).unwrap()
    }

    fn baseline_intent() -> OutputIntent {
        OutputIntent {
            spec: ActionSpec::Answer,
            posture: Posture::Baseline,
            rigor_disclosure: RigorDisclosure::None,
            confidence_signaling: ConfidenceSignaling::Implicit,
            assumption_surfacing: AssumptionSurfacing::None,
            unknown_disclosure: UnknownDisclosure::None,
            verbosity_cap: VerbosityCap::Compact,
        }
    }

    fn refusing_directive() -> ControlDirective {
        ControlDirective {
            rigor_level: RigorLevel::High,
            refusal_required: true,
            refusal_category: RefusalCategory::ThirdPartyHarm,
            initiative_budget: rustedguard_core::taxonomy::InitiativeBudget::Zero,
            answer_allowed: false,
            ..ControlDirective::open()
        }
    }

    fn violation(state: &DecisionState, plan: &ControlPlan, intent: OutputIntent) -> &'static str {
        OutputPlan::new(&trace(), state, plan, intent)
            .unwrap_err()
            .rule
            .as_str()
    }

    #[test]
    fn baseline_answer_is_valid() {
        let state = baseline_state();
        let plan = control(&state, ControlDirective::open());
        let out = OutputPlan::new(&trace(), &state, &plan, baseline_intent()).unwrap();
        assert_eq!(out.action(), OutputAction::Answer);
        assert_eq!(out.control_plan_id(), plan.id());
        assert_eq!(out.decision_state_id(), state.id());
    }

    #[test]
    fn dominance_ladder() {
        let mut d = ControlDirective::open();
        assert_eq!(dominant_action(&d), OutputAction::Answer);
        d.question_budget = 1;
        assert_eq!(dominant_action(&d), OutputAction::AskOneQuestion);
        d.refusal_required = true;
        assert_eq!(dominant_action(&d), OutputAction::Refuse);
        d.closure_state = ClosureState::Closing;
        assert_eq!(dominant_action(&d), OutputAction::Close);
    }

    #[test]
    fn refuse_with_none_category_is_rejected() {
        let state = baseline_state();
        let plan = control(&state, refusing_directive());
        let intent = OutputIntent {
            spec: ActionSpec::Refuse(RefusalSpec {
                category: RefusalCategory::None,
                redirect: Redirect::None,
            }),
            posture: Posture::Constrained,
            rigor_disclosure: RigorDisclosure::Full,
            confidence_signaling: ConfidenceSignaling::Guarded,
            ..baseline_intent()
        };
        assert_eq!(violation(&state, &plan, intent), "OP_REFUSAL_CATEGORY_PRESENT");
    }

    #[test]
    fn forced_answer_under_refusal_is_rejected() {
        let state = baseline_state();
        let plan = control(&state, refusing_directive());
        let intent = OutputIntent {
            rigor_disclosure: RigorDisclosure::Full,
            ..baseline_intent()
        };
        assert_eq!(violation(&state, &plan, intent), "OP_ACTION_MATCHES_DOMINANCE");
    }

    #[test]
    fn refuse_requires_constrained_posture() {
        let state = baseline_state();
        let plan = control(&state, refusing_directive());
        let intent = OutputIntent {
            spec: ActionSpec::Refuse(RefusalSpec {
                category: RefusalCategory::ThirdPartyHarm,
                redirect: Redirect::ProfessionalReferral,
            }),
            posture: Posture::Guarded,
            rigor_disclosure: RigorDisclosure::Full,
            ..baseline_intent()
        };
        assert_eq!(violation(&state, &plan, intent), "OP_REFUSE_POSTURE_CONSTRAINED");
    }

    #[test]
    fn disclosure_floors_follow_upstream() {
        let state = baseline_state();
        let plan = control(
            &state,
            ControlDirective {
                rigor_level: RigorLevel::Standard,
                initiative_budget: rustedguard_core::taxonomy::InitiativeBudget::One,
                ..ControlDirective::open()
            },
        );
        assert_eq!(
            violation(&state, &plan, baseline_intent()),
            "OP_RIGOR_DISCLOSURE_FLOOR"
        );

        let unknown_state = DecisionState::new(
            &trace(),
            Situation {
                risk_domains: BTreeMap::from([(RiskDomain::Financial, Confidence::Low)]),
                explicit_unknown_zone: BTreeSet::from([UnknownSource::RiskDomain]),
                ..Situation::baseline()
            },
        )
        .unwrap();
        let plan = control(&unknown_state, ControlDirective::open());
        assert_eq!(
            violation(&unknown_state, &plan, baseline_intent()),
            "OP_UNKNOWN_DISCLOSURE_FLOOR"
        );
    }

    #[test]
    fn mismatched_upstream_chain_is_rejected() {
        let state = baseline_state();
        let plan = control(&state, ControlDirective::open());
        let other = DecisionState::new(
            &trace(),
            Situation {
                intent_framing: Some(rustedguard_core::taxonomy::IntentFraming::Acting),
                ..Situation::baseline()
            },
        )
        .unwrap();
        assert_eq!(
            violation(&other, &plan, baseline_intent()),
            "OP_UPSTREAM_CHAIN_CONSISTENT"
        );
    }

    #[test]
    fn question_verbosity_is_capped() {
        let state = baseline_state();
        let plan = control(
            &state,
            ControlDirective {
                clarification_required: true,
                question_budget: 1,
                question_class: Some(QuestionClass::ContextGap),
                initiative_budget: rustedguard_core::taxonomy::InitiativeBudget::Zero,
                answer_allowed: false,
                ..ControlDirective::open()
            },
        );
        let intent = OutputIntent {
            spec: ActionSpec::AskOneQuestion(QuestionSpec {
                question_class: QuestionClass::ContextGap,
                max_questions: 1,
            }),
            verbosity_cap: VerbosityCap::Detailed,
            ..baseline_intent()
        };
        assert_eq!(violation(&state, &plan, intent), "OP_QUESTION_VERBOSITY_CAP");
    }

    #[test]
    fn serializes_action_and_spec() {
        let state = baseline_state();
        let plan = control(&state, refusing_directive());
        let intent = OutputIntent {
            spec: ActionSpec::Refuse(RefusalSpec {
                category: RefusalCategory::ThirdPartyHarm,
                redirect: Redirect::ProfessionalReferral,
            }),
            posture: Posture::Constrained,
            rigor_disclosure: RigorDisclosure::Full,
            confidence_signaling: ConfidenceSignaling::Guarded,
            ..baseline_intent()
        };
        let out = OutputPlan::new(&trace(), &state, &plan, intent).unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["action"], "REFUSE");
        assert_eq!(json["spec"]["category"], "THIRD_PARTY_HARM");
        assert_eq!(json["posture"], "CONSTRAINED");
        assert!(json["id"].as_str().unwrap().starts_with("op:"));
    }
}

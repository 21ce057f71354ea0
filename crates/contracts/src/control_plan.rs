//! ControlPlan: the interaction directive derived from a DecisionState.

use crate::decision_state::DecisionState;
use rustedguard_core::taxonomy::{
    ClosureState, FrictionPosture, InitiativeBudget, QuestionClass, RefusalCategory, RigorLevel,
    WarningBudget,
};
use rustedguard_core::validation::{Rule, RuleId, rule_ids, validate};
use rustedguard_core::{
    ArtifactId, ArtifactKind, DigestBuilder, OrchestrationAssemblyError, TraceId,
};
use serde::Serialize;

/// Largest question budget any plan may carry.
pub const MAX_QUESTION_BUDGET: u8 = 1;

/// The selected directive fields of a ControlPlan, before sealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlDirective {
    pub rigor_level: RigorLevel,
    pub friction_posture: FrictionPosture,
    pub closure_state: ClosureState,
    pub clarification_required: bool,
    /// 0 or 1.
    pub question_budget: u8,
    /// Present iff `question_budget == 1`.
    pub question_class: Option<QuestionClass>,
    pub initiative_budget: InitiativeBudget,
    pub warning_budget: WarningBudget,
    pub refusal_required: bool,
    /// `NONE` unless `refusal_required`.
    pub refusal_category: RefusalCategory,
    /// Derived: open, not refusing, and no question pending.
    pub answer_allowed: bool,
}

impl ControlDirective {
    /// A fully open directive with nothing active.
    pub fn open() -> Self {
        Self {
            rigor_level: RigorLevel::Low,
            friction_posture: FrictionPosture::None,
            closure_state: ClosureState::Open,
            clarification_required: false,
            question_budget: 0,
            question_class: None,
            initiative_budget: InitiativeBudget::Two,
            warning_budget: WarningBudget::Zero,
            refusal_required: false,
            refusal_category: RefusalCategory::None,
            answer_allowed: true,
        }
    }

    /// Whether any intervention (refusal, closure, clarification) is active.
    pub fn has_intervention(&self) -> bool {
        self.refusal_required || !self.closure_state.is_open() || self.clarification_required
    }

    /// The value `answer_allowed` must take given the other fields.
    pub fn derived_answer_allowed(&self) -> bool {
        self.closure_state.is_open() && !self.refusal_required && self.question_budget == 0
    }

    fn digest(&self, trace: &TraceId, upstream: &ArtifactId) -> ArtifactId {
        let budget = self.question_budget.to_string();
        DigestBuilder::new(ArtifactKind::ControlPlan, trace)
            .upstream(upstream)
            .field("rigor_level", self.rigor_level.as_str())
            .field("friction_posture", self.friction_posture.as_str())
            .field("closure_state", self.closure_state.as_str())
            .field("clarification_required", bool_str(self.clarification_required))
            .field("question_budget", &budget)
            .field(
                "question_class",
                self.question_class.map_or("", QuestionClass::as_str),
            )
            .field("initiative_budget", self.initiative_budget.as_str())
            .field("warning_budget", self.warning_budget.as_str())
            .field("refusal_required", bool_str(self.refusal_required))
            .field("refusal_category", self.refusal_category.as_str())
            .field("answer_allowed", bool_str(self.answer_allowed))
            .finish()
    }
}

fn bool_str(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

// ── Invariants ────────────────────────────────────────────────────────────

fn question_budget_bound(d: &ControlDirective) -> bool {
    d.question_budget <= MAX_QUESTION_BUDGET
}

fn question_class_matches_budget(d: &ControlDirective) -> bool {
    d.question_class.is_some() == (d.question_budget == 1)
}

fn closure_cancels_clarification(d: &ControlDirective) -> bool {
    d.closure_state.is_open() || (!d.clarification_required && d.question_budget == 0)
}

fn closure_cancels_warnings(d: &ControlDirective) -> bool {
    d.closure_state.is_open() || d.warning_budget == WarningBudget::Zero
}

fn clarification_consumes_slot(d: &ControlDirective) -> bool {
    !d.clarification_required
        || (d.question_budget == 1
            && !d.refusal_required
            && d.closure_state.is_open()
            && d.initiative_budget == InitiativeBudget::Zero)
}

fn refusal_category_matches_flag(d: &ControlDirective) -> bool {
    d.refusal_required == (d.refusal_category != RefusalCategory::None)
}

fn refusal_precludes_answer(d: &ControlDirective) -> bool {
    !d.refusal_required || !d.answer_allowed
}

fn answer_allowed_derived(d: &ControlDirective) -> bool {
    d.answer_allowed == d.derived_answer_allowed()
}

fn stop_requires_intervention(d: &ControlDirective) -> bool {
    d.friction_posture != FrictionPosture::Stop || d.has_intervention()
}

/// ControlPlan invariants, in evaluation order.
pub const DIRECTIVE_RULES: &[Rule<ControlDirective>] = &[
    Rule::new("CP_QUESTION_BUDGET_BOUND", question_budget_bound),
    Rule::new("CP_QUESTION_CLASS_MATCHES_BUDGET", question_class_matches_budget),
    Rule::new("CP_CLOSURE_CANCELS_CLARIFICATION", closure_cancels_clarification),
    Rule::new("CP_CLOSURE_CANCELS_WARNINGS", closure_cancels_warnings),
    Rule::new("CP_CLARIFICATION_CONSUMES_SLOT", clarification_consumes_slot),
    Rule::new("CP_REFUSAL_CATEGORY_MATCHES_FLAG", refusal_category_matches_flag),
    Rule::new("CP_REFUSAL_PRECLUDES_ANSWER", refusal_precludes_answer),
    Rule::new("CP_ANSWER_ALLOWED_DERIVED", answer_allowed_derived),
    Rule::new("CP_STOP_REQUIRES_INTERVENTION", stop_requires_intervention),
];

/// A sealed, validated control directive bound to its DecisionState.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlPlan {
    id: ArtifactId,
    decision_state_id: ArtifactId,
    #[serde(flatten)]
    directive: ControlDirective,
}

impl ControlPlan {
    /// Validate `directive` and seal it under an id bound to `state`.
    pub fn new(
        trace: &TraceId,
        state: &DecisionState,
        directive: ControlDirective,
    ) -> Result<Self, OrchestrationAssemblyError> {
        validate(&directive, DIRECTIVE_RULES)?;
        let id = directive.digest(trace, state.id());
        Ok(Self {
            id,
            decision_state_id: *state.id(),
            directive,
        })
    }

    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    pub fn decision_state_id(&self) -> &ArtifactId {
        &self.decision_state_id
    }

    pub fn directive(&self) -> &ControlDirective {
        &self.directive
    }

    pub fn rule_ids() -> Vec<RuleId> {
        rule_ids(DIRECTIVE_RULES)
    }
}

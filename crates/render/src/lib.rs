//! Deterministic fallback rendering.
//!
//! When no text generator is available, or its output failed verification
//! against the plan, the caller shows one of these fixed templates instead.
//! Templates are keyed only by the plan's action and bounded sub-spec
//! fields, so the same plan always renders the same text.

use rustedguard_contracts::{ActionSpec, OutputPlan};
use rustedguard_core::GovernanceError;
use rustedguard_core::taxonomy::{ClosureState, QuestionClass, Redirect, UnknownDisclosure};

/// Shown for every pipeline failure, whatever the phase.
pub const FAILURE_TEXT: &str =
    "Sorry, I can't help with that request right now. Please try rephrasing it.";

const ANSWER_TEXT: &str =
    "I don't have a complete answer available right now. Could you try again in a moment?";

const UNKNOWN_NOTE: &str = "Some details of your situation aren't clear to me yet.";

fn question_text(class: QuestionClass) -> &'static str {
    match class {
        QuestionClass::SafetyCheck => "Before we go on: are you, or is anyone else, in danger right now?",
        QuestionClass::IntentClarification => "What are you hoping to do with this?",
        QuestionClass::TimingClarification => "When is this happening, or when do you plan to act?",
        QuestionClass::ScopeClarification => "Who else would this affect besides you?",
        QuestionClass::ContextGap => "Could you tell me a bit more about your situation?",
    }
}

fn refusal_text(redirect: Redirect) -> &'static str {
    match redirect {
        Redirect::CrisisResources => concat!(
            "I can't help with this, but you don't have to go through it alone. ",
            "Please contact a local crisis line or someone you trust right now."
        ),
        Redirect::EmergencyServices => concat!(
            "I can't help with this here. ",
            "If anyone is in immediate danger, contact your local emergency services now."
        ),
        Redirect::ProfessionalReferral => concat!(
            "I can't help with this. ",
            "A qualified professional is the right person to talk to about it."
        ),
        Redirect::None => "I can't help with this request.",
    }
}

fn closure_text(state: ClosureState) -> &'static str {
    match state {
        ClosureState::UserTerminated => "Understood. Take care.",
        ClosureState::Closed => concat!(
            "I have to end this conversation here. ",
            "If anyone is in danger, contact your local emergency services."
        ),
        ClosureState::Closing | ClosureState::Open => {
            "I'm going to stop here. Please reach out to someone who can help directly."
        }
    }
}

/// The fixed template for an action and its sub-spec.
pub fn fallback_template(spec: &ActionSpec) -> &'static str {
    match spec {
        ActionSpec::Answer => ANSWER_TEXT,
        ActionSpec::AskOneQuestion(q) => question_text(q.question_class),
        ActionSpec::Refuse(r) => refusal_text(r.redirect),
        ActionSpec::Close(c) => closure_text(c.closure_state),
    }
}

/// Render `plan` as fixed fallback text.
///
/// An answer whose plan requires unknowns to be disclosed carries a short
/// note saying so.
pub fn render_fallback(plan: &OutputPlan) -> String {
    let intent = plan.intent();
    let body = fallback_template(&intent.spec);
    match intent.spec {
        ActionSpec::Answer if intent.unknown_disclosure != UnknownDisclosure::None => {
            format!("{UNKNOWN_NOTE} {body}")
        }
        _ => body.to_string(),
    }
}

/// Render a pipeline failure. The text never depends on which phase or rule
/// failed.
pub fn render_failure(_error: &GovernanceError) -> String {
    FAILURE_TEXT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustedguard_contracts::{ClosureSpec, QuestionSpec, RefusalSpec};
    use rustedguard_core::taxonomy::RefusalCategory;
    use rustedguard_core::{OrchestrationAssemblyError, RuleId, StateAssemblyError};

    #[test]
    fn every_question_class_has_one_question() {
        for class in QuestionClass::ALL {
            let text = fallback_template(&ActionSpec::AskOneQuestion(QuestionSpec {
                question_class: *class,
                max_questions: 1,
            }));
            assert_eq!(text.matches('?').count(), 1, "{class}");
        }
    }

    #[test]
    fn refusals_point_to_their_redirect() {
        let spec = ActionSpec::Refuse(RefusalSpec {
            category: RefusalCategory::SelfHarmRisk,
            redirect: Redirect::CrisisResources,
        });
        assert!(fallback_template(&spec).contains("crisis line"));

        let spec = ActionSpec::Refuse(RefusalSpec {
            category: RefusalCategory::ImminentHarm,
            redirect: Redirect::EmergencyServices,
        });
        assert!(fallback_template(&spec).contains("emergency services"));
    }

    #[test]
    fn user_termination_is_brief() {
        let spec = ActionSpec::Close(ClosureSpec {
            closure_state: ClosureState::UserTerminated,
        });
        assert_eq!(fallback_template(&spec), "Understood. Take care.");
    }

    #[test]
    fn failures_render_identically_across_phases() {
        let a: GovernanceError = StateAssemblyError::from(RuleId("DS_INPUT_NON_EMPTY")).into();
        let b: GovernanceError =
            OrchestrationAssemblyError::from(RuleId("CP_STOP_REQUIRES_INTERVENTION")).into();
        assert_eq!(render_failure(&a), render_failure(&b));
        assert!(!render_failure(&a).contains("DS_"));
    }

    #[test]
    fn rendering_follows_the_plan() {
        let trace = rustedguard_core::TraceId::new("render").unwrap();

        let ask = rustedguard_pipeline::govern(&trace, "should I buy crypto", None).unwrap();
        assert_eq!(
            render_fallback(&ask.output_plan),
            "What are you hoping to do with this?"
        );

        let answer =
            rustedguard_pipeline::govern(&trace, "I want to wipe my laptop permanently", None)
                .unwrap();
        let text = render_fallback(&answer.output_plan);
        assert!(text.starts_with(UNKNOWN_NOTE));
        assert_eq!(text, render_fallback(&answer.output_plan));

        let plain = rustedguard_pipeline::govern(&trace, "How do I boil an egg?", None).unwrap();
        assert_eq!(render_fallback(&plain.output_plan), ANSWER_TEXT);
    }
}

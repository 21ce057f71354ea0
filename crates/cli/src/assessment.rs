//! One message through guard, pipeline, audit and fallback renderer.

use rustedguard_config::AppConfig;
use rustedguard_core::taxonomy::IntentFraming;
use rustedguard_core::{Phase, RuleId, TraceId, TraceIdError};
use rustedguard_pipeline::{Governance, govern};
use rustedguard_render::{FAILURE_TEXT, render_failure, render_fallback};
use rustedguard_security::{AuditEvent, AuditLogger, GuardedInput};
use serde::Serialize;

/// What the CLI reports for one message.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Assessment {
    Governed {
        trace_id: TraceId,
        governance: Box<Governance>,
        rendered: String,
    },
    Failed {
        trace_id: TraceId,
        phase: Phase,
        rule: RuleId,
        rendered: String,
    },
    Rejected {
        trace_id: TraceId,
        reason: String,
        rendered: String,
    },
}

impl Assessment {
    pub fn rendered(&self) -> &str {
        match self {
            Assessment::Governed { rendered, .. }
            | Assessment::Failed { rendered, .. }
            | Assessment::Rejected { rendered, .. } => rendered,
        }
    }

    pub fn is_governed(&self) -> bool {
        matches!(self, Assessment::Governed { .. })
    }

    /// One-line human summary: the action taken, or why none was.
    pub fn label(&self) -> String {
        match self {
            Assessment::Governed { governance, .. } => governance.output_plan.action().to_string(),
            Assessment::Failed { rule, .. } => format!("FAILED {rule}"),
            Assessment::Rejected { .. } => "REJECTED".to_string(),
        }
    }
}

/// Guard, govern and audit one message. `audit` is `None` when auditing is
/// disabled in config.
pub fn assess(
    config: &AppConfig,
    audit: Option<&AuditLogger>,
    trace_id: TraceId,
    text: &str,
    framing: Option<IntentFraming>,
) -> Assessment {
    let input = match GuardedInput::new(text, config.input.max_chars) {
        Ok(input) => input,
        Err(e) => {
            let reason = e.to_string();
            if let Some(audit) = audit {
                audit.log(
                    &trace_id,
                    AuditEvent::InputRejected {
                        reason: reason.clone(),
                    },
                );
            }
            return Assessment::Rejected {
                trace_id,
                reason,
                rendered: FAILURE_TEXT.to_string(),
            };
        }
    };

    let result = govern(&trace_id, input.as_str(), framing);
    if let Some(audit) = audit {
        audit.log_result(&trace_id, &result);
    }

    match result {
        Ok(governance) => Assessment::Governed {
            rendered: render_fallback(&governance.output_plan),
            trace_id,
            governance: Box::new(governance),
        },
        Err(e) => Assessment::Failed {
            trace_id,
            phase: e.phase(),
            rule: e.rule(),
            rendered: render_failure(&e),
        },
    }
}

/// The audit logger the config asks for, if any.
pub fn audit_logger(config: &AppConfig) -> Option<AuditLogger> {
    config.audit.enabled.then(|| {
        AuditLogger::with_sinks(
            config.audit.max_entries,
            vec![Box::new(rustedguard_security::TracingSink)],
        )
    })
}

/// A fresh random trace id for callers that did not supply one.
pub fn new_trace_id() -> Result<TraceId, TraceIdError> {
    TraceId::new(uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustedguard_core::taxonomy::OutputAction;
    use rustedguard_security::AuditOutcome;

    fn trace(id: &str) -> TraceId {
        TraceId::new(id).unwrap()
    }

    #[test]
    fn governed_message_is_rendered_and_audited() {
        let config = AppConfig::default();
        let audit = audit_logger(&config).unwrap();
        let a = assess(&config, Some(&audit), trace("cli-1"), "How do I boil an egg?", None);

        assert!(a.is_governed());
        assert_eq!(a.label(), OutputAction::Answer.to_string());
        assert_eq!(audit.entries_by_outcome(AuditOutcome::Success).len(), 1);
    }

    #[test]
    fn oversized_message_is_rejected_before_classification() {
        let mut config = AppConfig::default();
        config.input.max_chars = 5;
        let audit = AuditLogger::new(4);
        let a = assess(&config, Some(&audit), trace("cli-2"), "far too long", None);

        assert_eq!(a.label(), "REJECTED");
        assert_eq!(a.rendered(), FAILURE_TEXT);
        assert_eq!(audit.entries_by_outcome(AuditOutcome::Denied).len(), 1);
    }

    #[test]
    fn disabled_audit_records_nothing() {
        let mut config = AppConfig::default();
        config.audit.enabled = false;
        assert!(audit_logger(&config).is_none());
        let a = assess(&config, None, trace("cli-3"), "hello", None);
        assert!(a.is_governed());
    }

    #[test]
    fn json_report_never_echoes_rejected_text() {
        let config = AppConfig::default();
        let a = assess(&config, None, trace("cli-4"), "secret\u{0007}", None);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"status\":\"rejected\""));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn generated_trace_ids_are_unique() {
        assert_ne!(new_trace_id().unwrap(), new_trace_id().unwrap());
    }
}

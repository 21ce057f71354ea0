//! Audit logging: structured records of governance outcomes.
//!
//! Entries name the trace, the artifacts and the bounded enum values a run
//! settled on. They never contain message text. Timestamps are taken here,
//! outside the deterministic pipeline.

use chrono::{DateTime, Utc};
use rustedguard_core::taxonomy::{OutputAction, Posture};
use rustedguard_core::{GovernanceError, Phase, RuleId, TraceId};
use rustedguard_pipeline::Governance;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single audit log entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub trace_id: TraceId,
    pub event: AuditEvent,
    pub outcome: AuditOutcome,
}

/// Types of auditable governance events.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// All three phases sealed
    PipelineCompleted {
        decision_state_id: String,
        control_plan_id: String,
        output_plan_id: String,
        action: OutputAction,
        posture: Posture,
    },
    /// A phase failed closed
    PhaseFailed { phase: Phase, rule: RuleId },
    /// The input guard rejected the message before classification
    InputRejected { reason: String },
}

impl AuditEvent {
    pub fn completed(governance: &Governance) -> Self {
        let output = &governance.output_plan;
        AuditEvent::PipelineCompleted {
            decision_state_id: governance.decision_state.id().to_string(),
            control_plan_id: governance.control_plan.id().to_string(),
            output_plan_id: output.id().to_string(),
            action: output.action(),
            posture: output.intent().posture,
        }
    }

    pub fn failed(error: &GovernanceError) -> Self {
        AuditEvent::PhaseFailed {
            phase: error.phase(),
            rule: error.rule(),
        }
    }

    pub fn outcome(&self) -> AuditOutcome {
        match self {
            AuditEvent::PipelineCompleted { .. } => AuditOutcome::Success,
            AuditEvent::PhaseFailed { .. } => AuditOutcome::Failure,
            AuditEvent::InputRejected { .. } => AuditOutcome::Denied,
        }
    }
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

/// Trait for audit log sinks (where events are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// In-memory audit logger holding at most `capacity` entries; the oldest
/// entry is dropped first.
pub struct AuditLogger {
    entries: Mutex<VecDeque<AuditEntry>>,
    capacity: usize,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("entry_count", &self.count())
            .field("capacity", &self.capacity)
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

const DEFAULT_CAPACITY: usize = 5000;

impl AuditLogger {
    /// Create a new audit logger with no sinks.
    pub fn new(capacity: usize) -> Self {
        Self::with_sinks(capacity, Vec::new())
    }

    /// Create a new audit logger with the given sinks.
    pub fn with_sinks(capacity: usize, sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            sinks,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<AuditEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an audit event.
    pub fn log(&self, trace_id: &TraceId, event: AuditEvent) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            trace_id: trace_id.clone(),
            outcome: event.outcome(),
            event,
        };

        {
            let mut entries = self.lock();
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }

        for sink in &self.sinks {
            sink.record(&entry);
        }
    }

    /// Record the result of one pipeline run.
    pub fn log_result(&self, trace_id: &TraceId, result: &Result<Governance, GovernanceError>) {
        let event = match result {
            Ok(governance) => AuditEvent::completed(governance),
            Err(error) => AuditEvent::failed(error),
        };
        self.log(trace_id, event);
    }

    /// Get all recorded entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Get entries filtered by outcome.
    pub fn entries_by_outcome(&self, outcome: AuditOutcome) -> Vec<AuditEntry> {
        self.lock()
            .iter()
            .filter(|e| e.outcome == outcome)
            .cloned()
            .collect()
    }

    /// Clear all stored entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Count of stored entries.
    pub fn count(&self) -> usize {
        self.lock().len()
    }
}

/// A tracing-based audit sink that logs entries via `tracing::info!`.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::info!(
            trace_id = %entry.trace_id,
            event = ?entry.event,
            outcome = ?entry.outcome,
            "AUDIT"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustedguard_pipeline::govern;
    use std::sync::Arc;

    fn trace(id: &str) -> TraceId {
        TraceId::new(id).unwrap()
    }

    #[test]
    fn log_and_retrieve_entries() {
        let logger = AuditLogger::new(10);
        let t = trace("t-1");
        logger.log_result(&t, &govern(&t, "How do I boil an egg?", None));
        logger.log_result(&t, &govern(&t, "   ", None));

        assert_eq!(logger.count(), 2);
        let entries = logger.entries();
        assert_eq!(entries[0].outcome, AuditOutcome::Success);
        assert!(matches!(
            entries[0].event,
            AuditEvent::PipelineCompleted {
                action: OutputAction::Answer,
                posture: Posture::Baseline,
                ..
            }
        ));
        assert_eq!(
            entries[1].event,
            AuditEvent::PhaseFailed {
                phase: Phase::SituationClassification,
                rule: RuleId("DS_INPUT_NON_EMPTY"),
            }
        );
    }

    #[test]
    fn filter_by_outcome() {
        let logger = AuditLogger::new(10);
        let t = trace("t-2");
        logger.log(&t, AuditEvent::InputRejected { reason: "Message is empty".into() });
        logger.log_result(&t, &govern(&t, "hello there", None));
        logger.log_result(&t, &govern(&t, "hi", None));

        assert_eq!(logger.entries_by_outcome(AuditOutcome::Success).len(), 2);
        assert_eq!(logger.entries_by_outcome(AuditOutcome::Denied).len(), 1);
        assert!(logger.entries_by_outcome(AuditOutcome::Failure).is_empty());
    }

    #[test]
    fn capacity_drops_oldest() {
        let logger = AuditLogger::new(2);
        for id in ["a", "b", "c"] {
            logger.log(&trace(id), AuditEvent::InputRejected { reason: "x".into() });
        }
        let ids: Vec<String> = logger
            .entries()
            .iter()
            .map(|e| e.trace_id.to_string())
            .collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn entries_never_contain_message_text() {
        let logger = AuditLogger::new(10);
        let t = trace("t-3");
        let text = "my neighbor keeps a gun in the garage";
        logger.log_result(&t, &govern(&t, text, None));
        let json = serde_json::to_string(&logger.entries()).unwrap();
        assert!(!json.contains("neighbor"));
        assert!(!json.contains("garage"));
        assert!(json.contains("pipeline_completed"));
    }

    #[test]
    fn custom_sink_receives_events() {
        struct TestSink {
            received: Arc<Mutex<Vec<String>>>,
        }

        impl AuditSink for TestSink {
            fn record(&self, entry: &AuditEntry) {
                self.received.lock().unwrap().push(entry.trace_id.to_string());
            }
        }

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = TestSink {
            received: received.clone(),
        };
        let logger = AuditLogger::with_sinks(4, vec![Box::new(sink), Box::new(TracingSink)]);
        logger.log(&trace("sink-1"), AuditEvent::InputRejected { reason: "x".into() });

        let sink_entries = received.lock().unwrap();
        assert_eq!(sink_entries.as_slice(), ["sink-1"]);
    }

    #[test]
    fn clear_and_debug() {
        let logger = AuditLogger::default();
        logger.log(&trace("t-4"), AuditEvent::InputRejected { reason: "x".into() });
        assert_eq!(logger.count(), 1);
        logger.clear();
        assert_eq!(logger.count(), 0);
        let debug_str = format!("{logger:?}");
        assert!(debug_str.contains("entry_count"));
        assert!(debug_str.contains("capacity"));
    }
}

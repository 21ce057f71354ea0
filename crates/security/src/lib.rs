//! Security module for RustedGuard: the upstream input guard and audit
//! logging of governance outcomes.
//!
//! Provides:
//! - **Input guard**: bounded, trimmed, control-free message text and trace ids
//! - **Audit logging**: structured records of completed and failed runs

pub mod audit;
pub mod input;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
pub use input::{GuardedInput, InputError, guard_trace_id};

//! Upstream input guard: bounded, trimmed UTF-8 message text and trace ids.

use rustedguard_core::{TraceId, TraceIdError};

/// Error returned when upstream input is rejected.
///
/// Variants never carry the rejected text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Message is empty")]
    Empty,

    #[error("Message is {len} characters, limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("Message contains a control character at position {position}")]
    ControlCharacter { position: usize },

    #[error("Trace id is {len} bytes, limit is {max}")]
    TraceIdTooLong { len: usize, max: usize },

    #[error("Invalid trace id: {0}")]
    TraceId(#[from] TraceIdError),
}

/// Message text that passed the guard: trimmed, non-empty, within the
/// character limit and free of control characters other than `\n` and `\t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedInput(String);

impl GuardedInput {
    pub fn new(text: &str, max_chars: usize) -> Result<Self, InputError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InputError::Empty);
        }

        let len = trimmed.chars().count();
        if len > max_chars {
            return Err(InputError::TooLong {
                len,
                max: max_chars,
            });
        }

        if let Some(position) = trimmed
            .chars()
            .position(|c| c.is_control() && c != '\n' && c != '\t')
        {
            return Err(InputError::ControlCharacter { position });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// Validate a caller-supplied trace id against a configured length limit
/// at or below the core's own limit.
pub fn guard_trace_id(value: &str, max_len: usize) -> Result<TraceId, InputError> {
    if value.len() > max_len {
        return Err(InputError::TraceIdTooLong {
            len: value.len(),
            max: max_len,
        });
    }
    Ok(TraceId::new(value)?)
}

//! Deterministic identifiers for assembled artifacts.
//!
//! An artifact id is a SHA-256 digest over a length-prefixed canonical
//! encoding of: the artifact kind (domain separation), the trace id, the ids
//! of the immediate upstream artifacts, and the artifact's own selected
//! fields. Identical inputs always produce identical ids. No clock or random
//! source ever enters the digest.
//!
//! Canonical text form is `<prefix>:<64 lowercase hex>`, e.g.
//! `ds:9f86d0...`.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Maximum length of a trace id in bytes.
pub const MAX_TRACE_ID_LEN: usize = 128;

const DIGEST_LEN: usize = 32;

/// Which artifact an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactKind {
    DecisionState,
    ControlPlan,
    OutputPlan,
}

impl ArtifactKind {
    /// Canonical text prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::DecisionState => "ds",
            ArtifactKind::ControlPlan => "cp",
            ArtifactKind::OutputPlan => "op",
        }
    }

    fn domain_tag(self) -> &'static [u8] {
        match self {
            ArtifactKind::DecisionState => b"rustedguard:decision_state:v1",
            ArtifactKind::ControlPlan => b"rustedguard:control_plan:v1",
            ArtifactKind::OutputPlan => b"rustedguard:output_plan:v1",
        }
    }
}

/// Errors from trace id construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceIdError {
    #[error("trace id cannot be empty")]
    Empty,

    #[error("trace id exceeds {MAX_TRACE_ID_LEN} bytes (got {0})")]
    TooLong(usize),

    #[error("trace id must be visible ASCII")]
    InvalidCharacter,
}

/// Correlation id supplied by the caller. Used only for id derivation, never
/// for classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    pub fn new(value: impl Into<String>) -> Result<Self, TraceIdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TraceIdError::Empty);
        }
        if value.len() > MAX_TRACE_ID_LEN {
            return Err(TraceIdError::TooLong(value.len()));
        }
        if !value.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(TraceIdError::InvalidCharacter);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A content-derived artifact identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId {
    kind: ArtifactKind,
    digest: [u8; DIGEST_LEN],
}

impl ArtifactId {
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), hex::encode(self.digest))
    }
}

impl fmt::Debug for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactId({self})")
    }
}

impl Serialize for ArtifactId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Incremental canonical encoder for an [`ArtifactId`].
///
/// Every value is written as `u64 big-endian length || bytes`, so no two
/// distinct field sequences can encode to the same byte stream.
pub struct DigestBuilder {
    kind: ArtifactKind,
    hasher: Sha256,
}

impl DigestBuilder {
    pub fn new(kind: ArtifactKind, trace: &TraceId) -> Self {
        let mut builder = Self {
            kind,
            hasher: Sha256::new(),
        };
        builder.write(kind.domain_tag());
        builder.write(trace.as_str().as_bytes());
        builder
    }

    /// Bind an immediate upstream artifact.
    pub fn upstream(mut self, id: &ArtifactId) -> Self {
        self.write(id.kind.prefix().as_bytes());
        self.write(&id.digest);
        self
    }

    /// Append one named field.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.write(name.as_bytes());
        self.write(value.as_bytes());
        self
    }

    /// Append a named list of values (length-prefixed as a whole).
    pub fn list<'a>(mut self, name: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let values: Vec<&str> = values.into_iter().collect();
        self.write(name.as_bytes());
        self.hasher.update((values.len() as u64).to_be_bytes());
        for value in values {
            self.write(value.as_bytes());
        }
        self
    }

    pub fn finish(self) -> ArtifactId {
        ArtifactId {
            kind: self.kind,
            digest: self.hasher.finalize().into(),
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        self.hasher.update((bytes.len() as u64).to_be_bytes());
        self.hasher.update(bytes);
    }
}

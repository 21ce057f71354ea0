//! DecisionState: the situational snapshot of one message.

use rustedguard_core::taxonomy::{
    Confidence, ConsequenceHorizon, IntentFraming, OutcomeClass, ProximityState,
    ReversibilityClass, ResponsibilityScope, RiskDomain, UnknownSource,
};
use rustedguard_core::validation::{Rule, RuleId, rule_ids, validate};
use rustedguard_core::{ArtifactId, ArtifactKind, DigestBuilder, StateAssemblyError, TraceId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The classified fields of a DecisionState, before sealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Situation {
    pub proximity_state: ProximityState,
    /// Domain → confidence. Keys are unique by construction.
    pub risk_domains: BTreeMap<RiskDomain, Confidence>,
    pub reversibility_class: ReversibilityClass,
    pub consequence_horizon: ConsequenceHorizon,
    pub responsibility_scope: ResponsibilityScope,
    pub outcome_classes: BTreeSet<OutcomeClass>,
    pub explicit_unknown_zone: BTreeSet<UnknownSource>,
    /// Effective framing (caller hint or detected exit), if any.
    pub intent_framing: Option<IntentFraming>,
}

impl Situation {
    /// The all-baseline situation: no risk, nothing unknown.
    pub fn baseline() -> Self {
        Self {
            proximity_state: ProximityState::VeryLow,
            risk_domains: BTreeMap::from([(RiskDomain::None, Confidence::High)]),
            reversibility_class: ReversibilityClass::Reversible,
            consequence_horizon: ConsequenceHorizon::Short,
            responsibility_scope: ResponsibilityScope::SelfOnly,
            outcome_classes: BTreeSet::from([OutcomeClass::Informational]),
            explicit_unknown_zone: BTreeSet::new(),
            intent_framing: None,
        }
    }

    /// Confidence recorded for `domain`, if present.
    pub fn confidence(&self, domain: RiskDomain) -> Option<Confidence> {
        self.risk_domains.get(&domain).copied()
    }

    /// Whether `domain` is present at `floor` confidence or above.
    pub fn domain_at_least(&self, domain: RiskDomain, floor: Confidence) -> bool {
        self.confidence(domain).is_some_and(|c| c >= floor)
    }

    /// Whether any real (non-NONE) risk domain was detected.
    pub fn has_risk(&self) -> bool {
        self.risk_domains.keys().any(|d| *d != RiskDomain::None)
    }

    /// Highest confidence among critical domains, if any is present.
    pub fn critical_confidence(&self) -> Option<Confidence> {
        self.risk_domains
            .iter()
            .filter(|(d, _)| d.is_critical())
            .map(|(_, c)| *c)
            .max()
    }

    pub fn critical_at_least(&self, floor: Confidence) -> bool {
        self.critical_confidence().is_some_and(|c| c >= floor)
    }

    pub fn is_unknown(&self, source: UnknownSource) -> bool {
        self.explicit_unknown_zone.contains(&source)
    }

    pub fn has_unknowns(&self) -> bool {
        !self.explicit_unknown_zone.is_empty()
    }

    fn digest(&self, trace: &TraceId) -> ArtifactId {
        let domains: Vec<String> = self
            .risk_domains
            .iter()
            .map(|(d, c)| format!("{d}={c}"))
            .collect();
        DigestBuilder::new(ArtifactKind::DecisionState, trace)
            .field("proximity_state", self.proximity_state.as_str())
            .list("risk_domains", domains.iter().map(String::as_str))
            .field("reversibility_class", self.reversibility_class.as_str())
            .field("consequence_horizon", self.consequence_horizon.as_str())
            .field("responsibility_scope", self.responsibility_scope.as_str())
            .list("outcome_classes", self.outcome_classes.iter().map(|o| o.as_str()))
            .list(
                "explicit_unknown_zone",
                self.explicit_unknown_zone.iter().map(|u| u.as_str()),
            )
            .field(
                "intent_framing",
                self.intent_framing.map_or("", IntentFraming::as_str),
            )
            .finish()
    }
}

// ── Invariants ────────────────────────────────────────────────────────────

fn risk_domains_non_empty(s: &Situation) -> bool {
    !s.risk_domains.is_empty()
}

fn none_domain_exclusive(s: &Situation) -> bool {
    !s.risk_domains.contains_key(&RiskDomain::None) || s.risk_domains.len() == 1
}

fn none_domain_very_low_proximity(s: &Situation) -> bool {
    s.has_risk() || s.proximity_state == ProximityState::VeryLow
}

fn outcome_classes_non_empty(s: &Situation) -> bool {
    !s.outcome_classes.is_empty()
}

fn informational_exclusive(s: &Situation) -> bool {
    !s.outcome_classes.contains(&OutcomeClass::Informational) || s.outcome_classes.len() == 1
}

fn irreversible_names_reversibility(s: &Situation) -> bool {
    s.reversibility_class != ReversibilityClass::Irreversible
        || s.is_unknown(UnknownSource::Reversibility)
}

fn long_horizon_names_horizon(s: &Situation) -> bool {
    s.consequence_horizon != ConsequenceHorizon::Long || s.is_unknown(UnknownSource::Horizon)
}

fn low_confidence_names_risk_domain(s: &Situation) -> bool {
    !s.risk_domains.values().any(|c| *c == Confidence::Low)
        || s.is_unknown(UnknownSource::RiskDomain)
}

fn shared_scope_names_responsibility(s: &Situation) -> bool {
    s.responsibility_scope == ResponsibilityScope::SelfOnly
        || s.is_unknown(UnknownSource::Responsibility)
}

fn unknown_outcome_names_outcome_class(s: &Situation) -> bool {
    !s.outcome_classes.contains(&OutcomeClass::UnknownOutcomeClass)
        || s.is_unknown(UnknownSource::OutcomeClass)
}

/// DecisionState invariants, in evaluation order.
pub const SITUATION_RULES: &[Rule<Situation>] = &[
    Rule::new("DS_RISK_DOMAINS_NON_EMPTY", risk_domains_non_empty),
    Rule::new("DS_NONE_DOMAIN_EXCLUSIVE", none_domain_exclusive),
    Rule::new("DS_NONE_DOMAIN_VERY_LOW_PROXIMITY", none_domain_very_low_proximity),
    Rule::new("DS_OUTCOME_CLASSES_NON_EMPTY", outcome_classes_non_empty),
    Rule::new("DS_INFORMATIONAL_EXCLUSIVE", informational_exclusive),
    Rule::new("DS_IRREVERSIBLE_NAMES_REVERSIBILITY", irreversible_names_reversibility),
    Rule::new("DS_LONG_HORIZON_NAMES_HORIZON", long_horizon_names_horizon),
    Rule::new("DS_LOW_CONFIDENCE_NAMES_RISK_DOMAIN", low_confidence_names_risk_domain),
    Rule::new("DS_SHARED_SCOPE_NAMES_RESPONSIBILITY", shared_scope_names_responsibility),
    Rule::new("DS_UNKNOWN_OUTCOME_NAMES_OUTCOME_CLASS", unknown_outcome_names_outcome_class),
];

/// A sealed, validated situational snapshot.
///
/// The only way to obtain one is [`DecisionState::new`]; its fields are
/// read-only from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionState {
    id: ArtifactId,
    #[serde(flatten)]
    situation: Situation,
}

impl DecisionState {
    /// Validate `situation` and seal it under a content-derived id.
    pub fn new(trace: &TraceId, situation: Situation) -> Result<Self, StateAssemblyError> {
        validate(&situation, SITUATION_RULES)?;
        let id = situation.digest(trace);
        Ok(Self { id, situation })
    }

    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    pub fn situation(&self) -> &Situation {
        &self.situation
    }

    pub fn rule_ids() -> Vec<RuleId> {
        rule_ids(SITUATION_RULES)
    }
}

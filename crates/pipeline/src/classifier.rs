//! Situation classifier: message text to DecisionState.
//!
//! Runs the sub-classifications in fixed order:
//!
//! 1. proximity
//! 2. risk domain
//! 3. reversibility and horizon
//! 4. responsibility scope
//! 5. outcome-class awareness
//! 7. unknown-zone consolidation (reads 1 through 5)
//!
//! Step 6 is a reserved slot and runs nothing. Each step reads only the
//! normalized text and the effective framing; consolidation is the one step
//! that reads earlier results. The assembled situation is then sealed, which
//! runs the DecisionState invariants.

use crate::lexicon::{
    DOMAIN_CUES, EXIT_CUES, IRREVERSIBLE_CUES, LONG_HORIZON_CUES, NormalizedText, OUTCOME_CUES,
    SCOPE_CUES, TEMPORAL_CUES,
};
use rustedguard_contracts::{DecisionState, Situation};
use rustedguard_core::taxonomy::{
    Confidence, ConsequenceHorizon, IntentFraming, OutcomeClass, ProximityState,
    ResponsibilityScope, ReversibilityClass, RiskDomain, UnknownSource,
};
use rustedguard_core::{RuleId, StateAssemblyError, TraceId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Precondition checked before any sub-classification runs.
pub const INPUT_NON_EMPTY: RuleId = RuleId("DS_INPUT_NON_EMPTY");

/// A step result plus whether the step could resolve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reading<T> {
    value: T,
    uncertain: bool,
}

/// Classify `text` into a sealed DecisionState.
///
/// `framing` is the caller's hint; when absent an exit phrase in the text
/// sets the framing to EXITING.
pub fn classify(
    trace: &TraceId,
    text: &str,
    framing: Option<IntentFraming>,
) -> Result<DecisionState, StateAssemblyError> {
    if text.trim().is_empty() {
        return Err(INPUT_NON_EMPTY.into());
    }
    let text = NormalizedText::new(text);

    let framing = framing.or_else(|| detect_exit(&text));
    let hazard = has_hazard(&text);

    let proximity = proximity(&text, framing, hazard);
    let risk_domains = risk_domains(&text);
    let (reversibility, horizon) = reversibility_and_horizon(&text);
    let scope = responsibility_scope(&text);
    let outcomes = outcome_classes(&text, hazard);

    let mut situation = Situation {
        proximity_state: proximity.value,
        risk_domains,
        reversibility_class: reversibility,
        consequence_horizon: horizon,
        responsibility_scope: scope,
        outcome_classes: outcomes,
        explicit_unknown_zone: BTreeSet::new(),
        intent_framing: framing,
    };
    situation.explicit_unknown_zone = consolidate_unknowns(&situation, proximity.uncertain);

    debug!(
        proximity = %situation.proximity_state,
        domains = situation.risk_domains.len(),
        reversibility = %situation.reversibility_class,
        horizon = %situation.consequence_horizon,
        scope = %situation.responsibility_scope,
        unknowns = situation.explicit_unknown_zone.len(),
        "Situation classified"
    );

    DecisionState::new(trace, situation)
}

fn detect_exit(text: &NormalizedText) -> Option<IntentFraming> {
    text.has_any(EXIT_CUES).then_some(IntentFraming::Exiting)
}

/// Whether any risk-domain cue occurs in the text.
fn has_hazard(text: &NormalizedText) -> bool {
    DOMAIN_CUES.iter().any(|c| text.has(c.phrase))
}

// ── Step 1: proximity ─────────────────────────────────────────────────────

fn proximity(
    text: &NormalizedText,
    framing: Option<IntentFraming>,
    hazard: bool,
) -> Reading<ProximityState> {
    if !hazard {
        return Reading {
            value: ProximityState::VeryLow,
            uncertain: false,
        };
    }

    let temporal = TEMPORAL_CUES
        .iter()
        .filter(|(_, phrases)| text.has_any(phrases))
        .map(|(level, _)| *level)
        .max();
    let framed = match framing {
        Some(IntentFraming::Acting) => Some(ProximityState::Medium),
        Some(IntentFraming::Planning) => Some(ProximityState::Low),
        _ => None,
    };

    match temporal.max(framed) {
        Some(value) => Reading {
            value,
            uncertain: false,
        },
        None => Reading {
            value: ProximityState::VeryLow,
            uncertain: true,
        },
    }
}

// ── Step 2: risk domain ───────────────────────────────────────────────────

fn risk_domains(text: &NormalizedText) -> BTreeMap<RiskDomain, Confidence> {
    let mut best: BTreeMap<RiskDomain, Confidence> = BTreeMap::new();
    let mut low_hits: BTreeMap<RiskDomain, usize> = BTreeMap::new();

    for cue in DOMAIN_CUES.iter().filter(|c| text.has(c.phrase)) {
        let entry = best.entry(cue.domain).or_insert(cue.confidence);
        *entry = (*entry).max(cue.confidence);
        if cue.confidence == Confidence::Low {
            *low_hits.entry(cue.domain).or_default() += 1;
        }
    }

    // Two distinct weak cues in one domain corroborate each other.
    for (domain, hits) in low_hits {
        if hits >= 2 {
            if let Some(confidence) = best.get_mut(&domain) {
                *confidence = (*confidence).max(Confidence::Medium);
            }
        }
    }

    if best.is_empty() {
        best.insert(RiskDomain::None, Confidence::High);
    }
    best
}

// ── Step 3: reversibility and horizon ─────────────────────────────────────

fn reversibility_and_horizon(text: &NormalizedText) -> (ReversibilityClass, ConsequenceHorizon) {
    let irreversible = text.has_any(IRREVERSIBLE_CUES);
    let reversibility = if irreversible {
        ReversibilityClass::Irreversible
    } else {
        ReversibilityClass::Reversible
    };
    let horizon = if irreversible || text.has_any(LONG_HORIZON_CUES) {
        ConsequenceHorizon::Long
    } else {
        ConsequenceHorizon::Short
    };
    (reversibility, horizon)
}

// ── Step 4: responsibility scope ──────────────────────────────────────────

fn responsibility_scope(text: &NormalizedText) -> ResponsibilityScope {
    SCOPE_CUES
        .iter()
        .filter(|(_, phrases)| text.has_any(phrases))
        .map(|(scope, _)| *scope)
        .fold(ResponsibilityScope::SelfOnly, Ord::max)
}

// ── Step 5: outcome-class awareness ───────────────────────────────────────

fn outcome_classes(text: &NormalizedText, hazard: bool) -> BTreeSet<OutcomeClass> {
    if !hazard {
        return BTreeSet::from([OutcomeClass::Informational]);
    }
    let matched: BTreeSet<OutcomeClass> = OUTCOME_CUES
        .iter()
        .filter(|(_, phrases)| text.has_any(phrases))
        .map(|(class, _)| *class)
        .collect();
    if matched.is_empty() {
        BTreeSet::from([OutcomeClass::UnknownOutcomeClass])
    } else {
        matched
    }
}

// ── Step 7: unknown-zone consolidation ────────────────────────────────────

fn consolidate_unknowns(situation: &Situation, proximity_uncertain: bool) -> BTreeSet<UnknownSource> {
    let mut zone = BTreeSet::new();
    if proximity_uncertain {
        zone.insert(UnknownSource::Proximity);
    }
    if situation.risk_domains.values().any(|c| *c == Confidence::Low) {
        zone.insert(UnknownSource::RiskDomain);
    }
    if situation.reversibility_class == ReversibilityClass::Irreversible {
        zone.insert(UnknownSource::Reversibility);
    }
    if situation.consequence_horizon == ConsequenceHorizon::Long {
        zone.insert(UnknownSource::Horizon);
    }
    if situation.responsibility_scope >= ResponsibilityScope::ThirdParty {
        zone.insert(UnknownSource::Responsibility);
    }
    if situation
        .outcome_classes
        .contains(&OutcomeClass::UnknownOutcomeClass)
    {
        zone.insert(UnknownSource::OutcomeClass);
    }
    zone
}

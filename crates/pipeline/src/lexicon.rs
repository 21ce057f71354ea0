//! Cue lexicons and text normalization for the situation classifier.
//!
//! Every cue is written in normalized form (lower case, words separated by a
//! single space, only `'` and `-` kept as punctuation) and matches on whole
//! word boundaries.

use rustedguard_core::taxonomy::{
    Confidence, OutcomeClass, ProximityState, ResponsibilityScope, RiskDomain,
};

/// Normalized message text. Holds the text padded with a leading and
/// trailing space so phrase lookups respect word boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    padded: String,
}

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let mapped: String = raw
            .chars()
            .flat_map(char::to_lowercase)
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' | '\u{02BC}' => '\'',
                c => c,
            })
            .map(|c| {
                if c.is_alphanumeric() || c == '\'' || c == '-' {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        let words: Vec<&str> = mapped.split_whitespace().collect();
        Self {
            padded: format!(" {} ", words.join(" ")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.padded.trim().is_empty()
    }

    /// Whether `phrase` occurs as a sequence of whole words.
    pub fn has(&self, phrase: &str) -> bool {
        self.padded.contains(&format!(" {phrase} "))
    }

    pub fn has_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.has(p))
    }
}

/// A risk-domain cue and the confidence a match carries.
#[derive(Debug, Clone, Copy)]
pub struct DomainCue {
    pub domain: RiskDomain,
    pub phrase: &'static str,
    pub confidence: Confidence,
}

const fn cue(domain: RiskDomain, phrase: &'static str, confidence: Confidence) -> DomainCue {
    DomainCue {
        domain,
        phrase,
        confidence,
    }
}

use Confidence::{High, Low, Medium};
use RiskDomain::{Financial, Legal, Medical, PhysicalSafety, Security, SelfHarm};

pub const DOMAIN_CUES: &[DomainCue] = &[
    // self harm
    cue(SelfHarm, "kill myself", High),
    cue(SelfHarm, "end my life", High),
    cue(SelfHarm, "suicide", High),
    cue(SelfHarm, "suicidal", High),
    cue(SelfHarm, "want to die", High),
    cue(SelfHarm, "hurt myself", High),
    cue(SelfHarm, "cut myself", High),
    cue(SelfHarm, "self-harm", High),
    cue(SelfHarm, "self harm", High),
    cue(SelfHarm, "don't want to live", High),
    cue(SelfHarm, "overdose", Medium),
    cue(SelfHarm, "hopeless", Low),
    cue(SelfHarm, "worthless", Low),
    // medical
    cue(Medical, "chest pain", High),
    cue(Medical, "can't breathe", High),
    cue(Medical, "cannot breathe", High),
    cue(Medical, "unconscious", High),
    cue(Medical, "seizure", High),
    cue(Medical, "stroke", High),
    cue(Medical, "overdose", High),
    cue(Medical, "allergic reaction", Medium),
    cue(Medical, "bleeding", Medium),
    cue(Medical, "dosage", Medium),
    cue(Medical, "double dose", Medium),
    cue(Medical, "medication", Low),
    cue(Medical, "prescription", Low),
    cue(Medical, "pills", Low),
    cue(Medical, "symptoms", Low),
    cue(Medical, "fever", Low),
    cue(Medical, "headache", Low),
    // physical safety
    cue(PhysicalSafety, "bomb", High),
    cue(PhysicalSafety, "explosive", High),
    cue(PhysicalSafety, "explosives", High),
    cue(PhysicalSafety, "gas leak", High),
    cue(PhysicalSafety, "carbon monoxide", High),
    cue(PhysicalSafety, "poison", High),
    cue(PhysicalSafety, "hurt him", High),
    cue(PhysicalSafety, "hurt her", High),
    cue(PhysicalSafety, "hurt them", High),
    cue(PhysicalSafety, "weapon", Medium),
    cue(PhysicalSafety, "gun", Medium),
    cue(PhysicalSafety, "attack", Medium),
    cue(PhysicalSafety, "live wire", Medium),
    cue(PhysicalSafety, "knife", Low),
    cue(PhysicalSafety, "fire", Low),
    cue(PhysicalSafety, "chainsaw", Low),
    cue(PhysicalSafety, "ladder", Low),
    // security
    cue(Security, "malware", High),
    cue(Security, "ransomware", High),
    cue(Security, "keylogger", High),
    cue(Security, "steal credentials", High),
    cue(Security, "someone's account", High),
    cue(Security, "hack", Medium),
    cue(Security, "hacking", Medium),
    cue(Security, "phishing", Medium),
    cue(Security, "exploit", Medium),
    cue(Security, "breach", Medium),
    cue(Security, "password", Low),
    cue(Security, "vulnerability", Low),
    cue(Security, "firewall", Low),
    // financial
    cue(Financial, "life savings", High),
    cue(Financial, "bankrupt", High),
    cue(Financial, "bankruptcy", High),
    cue(Financial, "mortgage", Medium),
    cue(Financial, "debt", Medium),
    cue(Financial, "wire transfer", Medium),
    cue(Financial, "invest", Low),
    cue(Financial, "investment", Low),
    cue(Financial, "loan", Low),
    cue(Financial, "crypto", Low),
    cue(Financial, "stocks", Low),
    cue(Financial, "retirement", Low),
    // legal
    cue(Legal, "arrested", High),
    cue(Legal, "tax evasion", High),
    cue(Legal, "lawsuit", Medium),
    cue(Legal, "sue", Medium),
    cue(Legal, "illegal", Medium),
    cue(Legal, "court", Medium),
    cue(Legal, "custody", Medium),
    cue(Legal, "eviction", Medium),
    cue(Legal, "contract", Low),
    cue(Legal, "lawyer", Low),
    cue(Legal, "landlord", Low),
];

/// Temporal cues, per proximity floor.
pub const TEMPORAL_CUES: &[(ProximityState, &[&str])] = &[
    (
        ProximityState::Imminent,
        &[
            "right now",
            "immediately",
            "about to",
            "as we speak",
            "this second",
            "this minute",
            "already took",
            "already taken",
        ],
    ),
    (
        ProximityState::High,
        &[
            "tonight",
            "today",
            "asap",
            "soon",
            "within the hour",
            "in an hour",
            "this afternoon",
            "this evening",
        ],
    ),
    (
        ProximityState::Medium,
        &["tomorrow", "this week", "in a few days", "next few days", "this weekend"],
    ),
    (
        ProximityState::Low,
        &["next month", "next year", "someday", "eventually", "one day", "in the future"],
    ),
];

/// Phrases that signal the user is ending the conversation.
pub const EXIT_CUES: &[&str] = &[
    "goodbye",
    "bye",
    "i'm done",
    "im done",
    "that's all",
    "thats all",
    "stop talking",
    "end this conversation",
    "end the conversation",
    "i'm leaving",
    "talk later",
];

pub const IRREVERSIBLE_CUES: &[&str] = &[
    "permanent",
    "permanently",
    "irreversible",
    "can't undo",
    "cannot undo",
    "no going back",
    "forever",
    "delete everything",
    "wipe",
    "die",
    "death",
    "kill",
    "amputate",
    "life savings",
    "quit my job",
    "sell my house",
];

pub const LONG_HORIZON_CUES: &[&str] = &[
    "long term",
    "long-term",
    "years",
    "decades",
    "lifetime",
    "retirement",
    "career",
    "rest of my life",
    "mortgage",
];

/// Responsibility cues, per scope floor.
pub const SCOPE_CUES: &[(ResponsibilityScope, &[&str])] = &[
    (
        ResponsibilityScope::SystemicPublic,
        &[
            "everyone",
            "the public",
            "crowd",
            "school",
            "hospital",
            "water supply",
            "power grid",
            "thousands",
            "community",
            "government",
            "stadium",
        ],
    ),
    (
        ResponsibilityScope::ThirdParty,
        &[
            "my child",
            "my kid",
            "my kids",
            "my son",
            "my daughter",
            "my wife",
            "my husband",
            "my partner",
            "my friend",
            "my mom",
            "my dad",
            "my mother",
            "my father",
            "my neighbor",
            "my family",
            "my boss",
            "my coworker",
            "someone",
            "someone's",
            "other people",
            "hurt him",
            "hurt her",
            "hurt them",
            "patient",
            "client",
            "employees",
        ],
    ),
];

pub const OUTCOME_CUES: &[(OutcomeClass, &[&str])] = &[
    (
        OutcomeClass::HealthHarm,
        &["sick", "illness", "overdose", "poison", "poisoning", "side effects", "infection"],
    ),
    (
        OutcomeClass::PhysicalInjury,
        &["injury", "injured", "hurt", "burn", "broken", "wound", "bleeding", "die", "death", "kill"],
    ),
    (
        OutcomeClass::FinancialLoss,
        &["lose money", "losing money", "loss", "bankrupt", "debt", "scam", "life savings"],
    ),
    (
        OutcomeClass::LegalExposure,
        &["sued", "lawsuit", "arrested", "jail", "prison", "illegal", "charged"],
    ),
    (
        OutcomeClass::PropertyDamage,
        &["damage", "destroy", "flood", "fire", "explode"],
    ),
    (
        OutcomeClass::DataCompromise,
        &["data leak", "breach", "stolen data", "hacked", "data loss", "lost files"],
    ),
    (
        OutcomeClass::ReputationalHarm,
        &["reputation", "embarrass", "fired", "humiliate"],
    ),
];

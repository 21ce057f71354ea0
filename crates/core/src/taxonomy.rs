//! Enumerated taxonomy: the closed value sets the pipeline reasons over.
//!
//! Pure vocabulary. Where a set is an escalation ladder its variants are
//! declared lowest-first and the derived `Ord` is the escalation order;
//! `ALL` lists every variant in that order so ladders can be enumerated
//! exhaustively in tests.

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant, lowest first.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ── Situation ─────────────────────────────────────────────────────────────

vocabulary! {
    /// How close in time or impact a risk is.
    pub enum ProximityState {
        VeryLow => "VERY_LOW",
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Imminent => "IMMINENT",
    }
}

vocabulary! {
    /// Closed risk-domain vocabulary. Not an escalation ladder; the order
    /// only gives sets a stable iteration order.
    pub enum RiskDomain {
        None => "NONE",
        Legal => "LEGAL",
        Financial => "FINANCIAL",
        Security => "SECURITY",
        Medical => "MEDICAL",
        PhysicalSafety => "PHYSICAL_SAFETY",
        SelfHarm => "SELF_HARM",
    }
}

impl RiskDomain {
    /// Domains where harm can be bodily and immediate.
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            RiskDomain::Medical | RiskDomain::PhysicalSafety | RiskDomain::SelfHarm
        )
    }
}

vocabulary! {
    pub enum Confidence {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

vocabulary! {
    pub enum ReversibilityClass {
        Reversible => "REVERSIBLE",
        Irreversible => "IRREVERSIBLE",
    }
}

vocabulary! {
    pub enum ConsequenceHorizon {
        Short => "SHORT",
        Long => "LONG",
    }
}

vocabulary! {
    /// Who bears the consequences.
    pub enum ResponsibilityScope {
        SelfOnly => "SELF_ONLY",
        ThirdParty => "THIRD_PARTY",
        SystemicPublic => "SYSTEMIC_PUBLIC",
    }
}

vocabulary! {
    /// Bounded outcome tags.
    pub enum OutcomeClass {
        /// No material consequence beyond information exchange.
        Informational => "INFORMATIONAL",
        HealthHarm => "HEALTH_HARM",
        PhysicalInjury => "PHYSICAL_INJURY",
        FinancialLoss => "FINANCIAL_LOSS",
        LegalExposure => "LEGAL_EXPOSURE",
        PropertyDamage => "PROPERTY_DAMAGE",
        DataCompromise => "DATA_COMPROMISE",
        ReputationalHarm => "REPUTATIONAL_HARM",
        /// A consequence is implied but could not be named.
        UnknownOutcomeClass => "UNKNOWN_OUTCOME_CLASS",
    }
}

vocabulary! {
    /// One tag per situational dimension that could not be resolved.
    pub enum UnknownSource {
        Proximity => "PROXIMITY",
        RiskDomain => "RISK_DOMAIN",
        Reversibility => "REVERSIBILITY",
        Horizon => "HORIZON",
        Responsibility => "RESPONSIBILITY",
        OutcomeClass => "OUTCOME_CLASS",
    }
}

vocabulary! {
    /// Bounded framing hint supplied by the caller or detected from the text.
    pub enum IntentFraming {
        Informational => "INFORMATIONAL",
        Hypothetical => "HYPOTHETICAL",
        Planning => "PLANNING",
        Acting => "ACTING",
        Exiting => "EXITING",
    }
}

impl std::str::FromStr for IntentFraming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentFraming::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown intent framing '{s}'"))
    }
}

// ── Control ───────────────────────────────────────────────────────────────

vocabulary! {
    pub enum RigorLevel {
        Low => "LOW",
        Standard => "STANDARD",
        High => "HIGH",
        Maximal => "MAXIMAL",
    }
}

vocabulary! {
    pub enum FrictionPosture {
        None => "NONE",
        Soft => "SOFT",
        Pause => "PAUSE",
        /// Must be backed by an active intervention.
        Stop => "STOP",
    }
}

vocabulary! {
    pub enum ClosureState {
        Open => "OPEN",
        Closing => "CLOSING",
        Closed => "CLOSED",
        UserTerminated => "USER_TERMINATED",
    }
}

impl ClosureState {
    pub fn is_open(self) -> bool {
        self == ClosureState::Open
    }
}

vocabulary! {
    pub enum QuestionClass {
        SafetyCheck => "SAFETY_CHECK",
        IntentClarification => "INTENT_CLARIFICATION",
        TimingClarification => "TIMING_CLARIFICATION",
        ScopeClarification => "SCOPE_CLARIFICATION",
        ContextGap => "CONTEXT_GAP",
    }
}

vocabulary! {
    /// Unsolicited suggestions the response may volunteer.
    pub enum InitiativeBudget {
        Zero => "ZERO",
        One => "ONE",
        Two => "TWO",
    }
}

vocabulary! {
    pub enum WarningBudget {
        Zero => "ZERO",
        One => "ONE",
        Two => "TWO",
    }
}

vocabulary! {
    pub enum RefusalCategory {
        None => "NONE",
        SelfHarmRisk => "SELF_HARM_RISK",
        EmergencyReferral => "EMERGENCY_REFERRAL",
        ThirdPartyHarm => "THIRD_PARTY_HARM",
        ImminentHarm => "IMMINENT_HARM",
        IllegalFacilitation => "ILLEGAL_FACILITATION",
    }
}

// ── Output ────────────────────────────────────────────────────────────────

vocabulary! {
    /// Ordered by dominance: a higher action wins every conflict.
    pub enum OutputAction {
        Answer => "ANSWER",
        AskOneQuestion => "ASK_ONE_QUESTION",
        Refuse => "REFUSE",
        Close => "CLOSE",
    }
}

vocabulary! {
    pub enum Posture {
        Baseline => "BASELINE",
        Guarded => "GUARDED",
        Constrained => "CONSTRAINED",
    }
}

vocabulary! {
    pub enum RigorDisclosure {
        None => "NONE",
        Summary => "SUMMARY",
        Full => "FULL",
    }
}

vocabulary! {
    pub enum ConfidenceSignaling {
        Implicit => "IMPLICIT",
        Explicit => "EXPLICIT",
        Guarded => "GUARDED",
    }
}

vocabulary! {
    pub enum AssumptionSurfacing {
        None => "NONE",
        Key => "KEY",
        All => "ALL",
    }
}

vocabulary! {
    pub enum UnknownDisclosure {
        None => "NONE",
        Acknowledge => "ACKNOWLEDGE",
        Enumerate => "ENUMERATE",
    }
}

vocabulary! {
    /// Upper bound on response length.
    pub enum VerbosityCap {
        Compact => "COMPACT",
        Standard => "STANDARD",
        Extended => "EXTENDED",
        Detailed => "DETAILED",
    }
}

vocabulary! {
    /// Where a refusal points the user.
    pub enum Redirect {
        None => "NONE",
        CrisisResources => "CRISIS_RESOURCES",
        EmergencyServices => "EMERGENCY_SERVICES",
        ProfessionalReferral => "PROFESSIONAL_REFERRAL",
    }
}

impl Redirect {
    pub fn for_category(category: RefusalCategory) -> Self {
        match category {
            RefusalCategory::None => Redirect::None,
            RefusalCategory::SelfHarmRisk => Redirect::CrisisResources,
            RefusalCategory::EmergencyReferral | RefusalCategory::ImminentHarm => {
                Redirect::EmergencyServices
            }
            RefusalCategory::ThirdPartyHarm | RefusalCategory::IllegalFacilitation => {
                Redirect::ProfessionalReferral
            }
        }
    }
}

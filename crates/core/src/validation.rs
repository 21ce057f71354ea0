//! Fail-closed validation engine.
//!
//! Every assembled artifact is checked against an ordered list of named
//! boolean predicates. The first predicate that fails stops the run and its
//! identifier is returned; nothing is aggregated and nothing is repaired.

use serde::Serialize;
use std::fmt;

/// Stable identifier of a declared invariant or override rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RuleId(pub &'static str);

impl RuleId {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A named predicate over `T`. `check` returns `true` when the invariant holds.
pub struct Rule<T: ?Sized> {
    pub id: RuleId,
    pub check: fn(&T) -> bool,
}

impl<T: ?Sized> Rule<T> {
    pub const fn new(id: &'static str, check: fn(&T) -> bool) -> Self {
        Self {
            id: RuleId(id),
            check,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish()
    }
}

/// Run `rules` in declaration order against `artifact`.
///
/// Returns the id of the first violated rule. Rules after the first failure
/// are never evaluated.
pub fn validate<T: ?Sized>(artifact: &T, rules: &[Rule<T>]) -> Result<(), RuleId> {
    for rule in rules {
        if !(rule.check)(artifact) {
            tracing::debug!(rule = %rule.id, "invariant violated");
            return Err(rule.id);
        }
    }
    Ok(())
}

/// The ids of a ruleset, in evaluation order.
pub fn rule_ids<T: ?Sized>(rules: &[Rule<T>]) -> Vec<RuleId> {
    rules.iter().map(|r| r.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn positive(x: &i32) -> bool {
        *x > 0
    }
    fn even(x: &i32) -> bool {
        x % 2 == 0
    }
    fn small(x: &i32) -> bool {
        *x < 100
    }

    const RULES: &[Rule<i32>] = &[
        Rule::new("POSITIVE", positive),
        Rule::new("EVEN", even),
        Rule::new("SMALL", small),
    ];

    #[test]
    fn passing_value_validates() {
        assert_eq!(validate(&42, RULES), Ok(()));
    }

    #[test]
    fn reports_first_violation_only() {
        // -3 violates both POSITIVE and EVEN; only the first is reported.
        assert_eq!(validate(&-3, RULES), Err(RuleId("POSITIVE")));
        assert_eq!(validate(&7, RULES), Err(RuleId("EVEN")));
        assert_eq!(validate(&102, RULES), Err(RuleId("SMALL")));
    }

    #[test]
    fn short_circuits_after_failure() {
        thread_local! {
            static CALLS: Cell<u32> = const { Cell::new(0) };
        }
        fn counted(_: &i32) -> bool {
            CALLS.with(|c| c.set(c.get() + 1));
            true
        }
        fn never(_: &i32) -> bool {
            false
        }
        let rules: &[Rule<i32>] = &[Rule::new("NEVER", never), Rule::new("COUNTED", counted)];
        assert_eq!(validate(&1, rules), Err(RuleId("NEVER")));
        assert_eq!(CALLS.with(Cell::get), 0);
    }

    #[test]
    fn empty_ruleset_accepts_everything() {
        let rules: &[Rule<i32>] = &[];
        assert!(validate(&-1, rules).is_ok());
    }

    #[test]
    fn rule_ids_preserve_order() {
        let ids = rule_ids(RULES);
        assert_eq!(ids, vec![RuleId("POSITIVE"), RuleId("EVEN"), RuleId("SMALL")]);
        assert_eq!(ids[1].to_string(), "EVEN");
    }
}

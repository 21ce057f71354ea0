//! Monotonic lattice walk over ordered levels.
//!
//! A ladder is a base level plus a list of predicate → floor pairs. The
//! result is the supremum of the base and every matching floor. Rules can
//! only raise a level, never lower it.

/// One escalation rule: when `when` holds, the level is at least `level`.
pub struct Floor<C: ?Sized, L> {
    pub level: L,
    pub when: fn(&C) -> bool,
}

impl<C: ?Sized, L> Floor<C, L> {
    pub const fn new(level: L, when: fn(&C) -> bool) -> Self {
        Self { level, when }
    }
}

/// Walk `floors` from `base` and return the highest level reached.
pub fn supremum<C: ?Sized, L: Ord + Copy>(ctx: &C, base: L, floors: &[Floor<C, L>]) -> L {
    floors
        .iter()
        .filter(|floor| (floor.when)(ctx))
        .map(|floor| floor.level)
        .fold(base, Ord::max)
}

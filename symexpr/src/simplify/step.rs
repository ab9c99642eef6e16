//! Recording of the individual rewrites performed during simplification.

use super::Phase;

/// A single rule application performed by the simplifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The phase the rule belongs to.
    pub phase: Phase,

    /// The registered name of the rule that fired.
    pub rule: &'static str,
}

/// A type that collects the steps of an algorithm.
///
/// [`StepCollector`] is implemented for the unit type `()`, which discards every step; the plain
/// [`simplify`](crate::simplify()) entry points use it so that no bookkeeping happens unless a
/// caller asks for it. A `Vec<Step>` records every step in order.
///
/// Memoized subtree results are returned without replaying the steps that originally produced
/// them, so a collected trace reflects the work actually performed by a call, not a full
/// derivation of the output.
pub trait StepCollector<S> {
    /// Adds a step to the collector.
    fn push(&mut self, step: S);
}

impl<S> StepCollector<S> for () {
    #[inline]
    fn push(&mut self, _: S) {}
}

impl<S> StepCollector<S> for Vec<S> {
    #[inline]
    fn push(&mut self, step: S) {
        self.push(step);
    }
}

//! The rule-based simplifier.
//!
//! [`Simplifier`] maps an expression to an equivalent, canonicalized, and (generally) less
//! complex expression, and its output is stable under re-application:
//! `simplify(simplify(e)) == simplify(e)`.
//!
//! # Phases
//!
//! Rules run in three ordered phases:
//!
//! 1. **Pre-rewrite**: normalizes surface syntax into the commutative form the later phases work
//!    on. With subtraction and division already expressed through `Neg` and `Invert` wrappers by
//!    the construction combinators, this mostly means pulling the sign out of negative literals.
//! 2. **Processing**: canonical reordering, exact literal folding, like-term and
//!    like-factor collection, and the algebraic identities. This phase is iterated over the whole
//!    tree until a fixed point is reached.
//! 3. **Post-format**: reintroduces the presentation forms (`a / b`, trailing divisors) the
//!    renderer uses, without undoing the processing-phase normalization.
//!
//! # Traversal
//!
//! Within a phase, the tree is simplified bottom-up: every child is fully simplified before rules
//! are tried on its parent. At each node, the highest-priority matching rule of the phase is
//! applied (ties broken by registration order), the engine re-descends into the transformed
//! result (a rewrite can expose new matches at this node or below), and the process repeats
//! until no rule matches.
//!
//! # Memoization
//!
//! Identical subtrees recur constantly in this workload: sibling terms share factors, and every
//! re-descent revisits structures that were already simplified. Each phase therefore keeps a
//! cache from input expression to simplified result, keyed by the order-independent structural
//! hash and equality of [`Expr`]. Only expressions in a middle complexity band are cached:
//! trivial inputs are cheaper to resimplify than to look up, and enormous one-off inputs would
//! only pollute the map. The cache is pure memoization, never an approximation, and it belongs to
//! the `Simplifier` instance: there is no global state, and a simplifier should not be shared
//! across threads without external locking. The recommended default is one instance per caller.
//!
//! # Termination
//!
//! The fixed-point loop terminates for the rule set shipped here, but that is a property of rule
//! authorship, not something the engine detects: a rule set in which two rules rewrite each
//! other's output forever will loop. Callers that need a hard bound can use
//! [`Simplifier::simplify_bounded`], which charges every rule application against a step budget
//! and reports [`Error::DidNotConverge`] when it runs out.

mod rules;
mod step;

pub use step::{Step, StepCollector};

use crate::error::Error;
use crate::expr::Expr;
use log::{debug, trace};
use rules::Rule;
use std::collections::HashMap;

/// The three phases of simplification, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Normalization into the commutative internal form.
    PreRewrite,

    /// Folding, collection, identities, and canonical reordering, run to a fixed point.
    Processing,

    /// Reintroduction of presentation forms for rendering.
    PostFormat,
}

const PHASES: usize = 3;

impl Phase {
    fn index(self) -> usize {
        match self {
            Self::PreRewrite => 0,
            Self::Processing => 1,
            Self::PostFormat => 2,
        }
    }
}

/// Tunables for a [`Simplifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifierOptions {
    /// Expressions below this complexity are not memoized; re-simplifying them costs less than a
    /// map lookup.
    pub memo_min_complexity: usize,

    /// Expressions above this complexity are not memoized; they are unlikely to recur and would
    /// crowd the cache.
    pub memo_max_complexity: usize,
}

impl Default for SimplifierOptions {
    fn default() -> Self {
        Self {
            memo_min_complexity: 4,
            memo_max_complexity: 256,
        }
    }
}

/// Step budget charged once per rule application.
enum StepBudget {
    Unlimited,
    Limited { remaining: u64, limit: u64 },
}

impl StepBudget {
    fn limited(limit: u64) -> Self {
        Self::Limited {
            remaining: limit,
            limit,
        }
    }

    fn spend(&mut self) -> Result<(), Error> {
        match self {
            Self::Unlimited => Ok(()),
            Self::Limited { remaining, limit } => {
                if *remaining == 0 {
                    Err(Error::DidNotConverge(*limit))
                } else {
                    *remaining -= 1;
                    Ok(())
                }
            },
        }
    }
}

/// The term-rewriting engine. Owns its rule registries and per-phase memoization caches.
///
/// Construct one per caller; see the [module documentation](self) for the concurrency model.
pub struct Simplifier {
    options: SimplifierOptions,
    caches: [HashMap<Expr, Expr>; PHASES],
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplifier {
    /// Creates a simplifier with default options.
    pub fn new() -> Self {
        Self::with_options(SimplifierOptions::default())
    }

    /// Creates a simplifier with the given options.
    pub fn with_options(options: SimplifierOptions) -> Self {
        Self {
            options,
            caches: [HashMap::new(), HashMap::new(), HashMap::new()],
        }
    }

    /// Simplifies an expression, running until a fixed point is reached.
    pub fn simplify(&mut self, expr: &Expr) -> Expr {
        self.run(expr, &mut StepBudget::Unlimited, &mut ())
            .unwrap_or_else(|_| unreachable!("an unlimited budget never reports exhaustion"))
    }

    /// Simplifies an expression, recording every applied rule in `steps`.
    pub fn simplify_with_steps(
        &mut self,
        expr: &Expr,
        steps: &mut dyn StepCollector<Step>,
    ) -> Expr {
        self.run(expr, &mut StepBudget::Unlimited, steps)
            .unwrap_or_else(|_| unreachable!("an unlimited budget never reports exhaustion"))
    }

    /// Simplifies an expression, giving up with [`Error::DidNotConverge`] if more than
    /// `max_steps` rule applications would be needed.
    pub fn simplify_bounded(&mut self, expr: &Expr, max_steps: u64) -> Result<Expr, Error> {
        self.run(expr, &mut StepBudget::limited(max_steps), &mut ())
    }

    /// Discards the memoization caches.
    pub fn clear_cache(&mut self) {
        for cache in &mut self.caches {
            cache.clear();
        }
    }

    fn run(
        &mut self,
        expr: &Expr,
        budget: &mut StepBudget,
        steps: &mut dyn StepCollector<Step>,
    ) -> Result<Expr, Error> {
        debug!("simplifying expression of complexity {}", expr.complexity());

        let mut current = self.simplify_node(Phase::PreRewrite, expr, budget, steps)?;
        loop {
            let next = self.simplify_node(Phase::Processing, &current, budget, steps)?;
            if next == current {
                break;
            }
            current = next;
        }
        let result = self.simplify_node(Phase::PostFormat, &current, budget, steps)?;

        debug!("simplified to complexity {}", result.complexity());
        Ok(result)
    }

    /// Simplifies a single node under one phase: children first, then the phase's rules at this
    /// node until none matches, re-descending after every rewrite.
    fn simplify_node(
        &mut self,
        phase: Phase,
        expr: &Expr,
        budget: &mut StepBudget,
        steps: &mut dyn StepCollector<Step>,
    ) -> Result<Expr, Error> {
        if let Some(hit) = self.cache_lookup(phase, expr) {
            return Ok(hit);
        }

        let mut current = self.simplify_children(phase, expr, budget, steps)?;
        while let Some(rule) = best_match(phase, &current) {
            budget.spend()?;
            let next = (rule.transform)(&current);
            trace!("{phase:?}: `{}` rewrote `{current}` into `{next}`", rule.name);
            steps.push(Step {
                phase,
                rule: rule.name,
            });
            current = self.simplify_children(phase, &next, budget, steps)?;
        }

        self.cache_store(phase, expr, &current);
        Ok(current)
    }

    /// Rebuilds a node with each child simplified under the given phase.
    fn simplify_children(
        &mut self,
        phase: Phase,
        expr: &Expr,
        budget: &mut StepBudget,
        steps: &mut dyn StepCollector<Step>,
    ) -> Result<Expr, Error> {
        Ok(match expr {
            Expr::Constant(_) | Expr::Variable(_) => expr.clone(),
            Expr::Unary(kind, arg) => Expr::Unary(
                *kind,
                Box::new(self.simplify_node(phase, arg, budget, steps)?),
            ),
            Expr::Sum(terms) => {
                let mut simplified = Vec::with_capacity(terms.len());
                for term in terms {
                    simplified.push(self.simplify_node(phase, term, budget, steps)?);
                }
                Expr::Sum(simplified)
            },
            Expr::Product(factors) => {
                let mut simplified = Vec::with_capacity(factors.len());
                for factor in factors {
                    simplified.push(self.simplify_node(phase, factor, budget, steps)?);
                }
                Expr::Product(simplified)
            },
            Expr::Power(base, exponent) => Expr::Power(
                Box::new(self.simplify_node(phase, base, budget, steps)?),
                Box::new(self.simplify_node(phase, exponent, budget, steps)?),
            ),
        })
    }

    fn in_memo_band(&self, expr: &Expr) -> bool {
        let complexity = expr.complexity();
        complexity >= self.options.memo_min_complexity
            && complexity <= self.options.memo_max_complexity
    }

    fn cache_lookup(&self, phase: Phase, expr: &Expr) -> Option<Expr> {
        if !self.in_memo_band(expr) {
            return None;
        }
        self.caches[phase.index()].get(expr).cloned()
    }

    fn cache_store(&mut self, phase: Phase, expr: &Expr, result: &Expr) {
        if self.in_memo_band(expr) {
            self.caches[phase.index()].insert(expr.clone(), result.clone());
        }
    }
}

/// Selects the highest-priority rule of the phase that matches the expression. Ties go to the
/// rule registered first.
fn best_match(phase: Phase, expr: &Expr) -> Option<&'static Rule> {
    let mut best: Option<(u32, &'static Rule)> = None;
    for rule in rules::phase_rules(phase) {
        if let Some(priority) = (rule.matches)(expr) {
            let better = match best {
                Some((best_priority, _)) => priority > best_priority,
                None => true,
            };
            if better {
                best = Some((priority, rule));
            }
        }
    }
    best.map(|(_, rule)| rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::UnaryKind;
    use assert_float_eq::assert_float_absolute_eq;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn var(name: &str) -> Expr {
        Expr::variable(name).unwrap()
    }

    fn simplify(expr: &Expr) -> Expr {
        Simplifier::new().simplify(expr)
    }

    fn bind(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn identity_table() {
        let x = var("x");

        assert_eq!(simplify(&(x.clone() + Expr::constant(0.0))), x);
        assert_eq!(simplify(&(x.clone() * Expr::constant(1.0))), x);
        assert_eq!(
            simplify(&(x.clone() * Expr::constant(0.0))),
            Expr::constant(0.0),
        );
        assert_eq!(
            simplify(&(x.clone() / x.clone())),
            Expr::constant(1.0),
        );
        assert_eq!(simplify(&x.clone().pow(Expr::constant(1.0))), x);
        assert_eq!(
            simplify(&x.clone().pow(Expr::constant(0.0))),
            Expr::constant(1.0),
        );
        assert_eq!(simplify(&x.clone().exp().ln()), x);
        assert_eq!(simplify(&x.clone().ln().exp()), x);
        assert_eq!(simplify(&-(-x.clone())), x);
    }

    #[test]
    fn scenario_collecting_terms() {
        // x + (1 + x) = 1 + 2x
        let expr = var("x") + (Expr::constant(1.0) + var("x"));
        assert_eq!(
            simplify(&expr),
            Expr::constant(1.0) + Expr::constant(2.0) * var("x"),
        );
    }

    #[test]
    fn scenario_scattered_literals() {
        // 1 + ((1 + ((x+1)+1)) + 1) = 5 + x
        let expr = Expr::constant(1.0)
            + ((Expr::constant(1.0) + ((var("x") + Expr::constant(1.0)) + Expr::constant(1.0)))
                + Expr::constant(1.0));
        assert_eq!(simplify(&expr), Expr::constant(5.0) + var("x"));
    }

    #[test]
    fn scenario_derivative_of_sin_cos() {
        // d/dx sin(x)cos(x), simplified, at x = 0.7
        let expr = var("x").sin() * var("x").cos();
        let derivative = simplify(&expr.derivative("x"));
        let value = derivative.eval(&bind(&[("x", 0.7)])).unwrap();
        let expected = 0.7f64.cos().powi(2) - 0.7f64.sin().powi(2);
        assert_float_absolute_eq!(value, expected, 1e-9);
    }

    #[test]
    fn scenario_exponent_cancellation() {
        // (x^2 * y^(x-1)) / x^3 / y^-1 = y^x / x
        let expr = var("x").pow(Expr::constant(2.0))
            * var("y").pow(var("x") - Expr::constant(1.0))
            / var("x").pow(Expr::constant(3.0))
            / var("y").pow(Expr::constant(-1.0));
        let simplified = simplify(&expr);
        assert_eq!(
            simplified,
            Expr::Product(vec![var("y").pow(var("x")), var("x").inv()]),
        );
        assert_eq!(simplified.to_string(), "((y^x) / x)");
    }

    #[test]
    fn scenario_full_cancellation() {
        // x + x - (x + x) = 0
        let expr = var("x") + var("x") - (var("x") + var("x"));
        assert_eq!(simplify(&expr), Expr::constant(0.0));
    }

    #[test]
    fn exactness_of_rational_literals() {
        // (1/3) * 3 = 1
        let expr = (Expr::constant(1.0) / Expr::constant(3.0)) * Expr::constant(3.0);
        assert_eq!(simplify(&expr), Expr::constant(1.0));

        // but 1/3 alone never becomes a decimal
        let third = Expr::constant(1.0) / Expr::constant(3.0);
        let simplified = simplify(&third);
        assert_eq!(simplified, Expr::constant(3.0).inv());
        assert_eq!(simplified.to_string(), "(1 / 3)");
    }

    #[test]
    fn simplification_is_idempotent() {
        let samples = [
            var("x") + (Expr::constant(1.0) + var("x")),
            var("x") * var("x").inv(),
            (var("x").pow(Expr::constant(2.0)) * var("y").pow(var("x") - Expr::constant(1.0)))
                / var("x").pow(Expr::constant(3.0)),
            var("x").sin() * var("x").cos() + var("y").exp().ln(),
            (var("a") + var("b")).derivative("a"),
            Expr::constant(2.0) / Expr::constant(6.0) + var("z"),
        ];

        for expr in samples {
            let once = simplify(&expr);
            let twice = simplify(&once);
            assert_eq!(twice, once, "simplify(simplify({expr})) drifted");
        }
    }

    #[test]
    fn simplification_preserves_value() {
        let bindings = bind(&[("x", 1.3), ("y", -0.4)]);
        let samples = [
            var("x") + (Expr::constant(1.0) + var("x")),
            var("x") * var("x").inv(),
            var("x").sin() * var("x").cos() * Expr::constant(4.0),
            var("x").pow(Expr::constant(2.0)) * var("y").pow(Expr::constant(3.0)) * var("y"),
            (var("x") + var("y")).pow(Expr::constant(3.0)) / var("x"),
            var("x").exp().ln() + var("y").cos().pow(Expr::constant(2.0)),
        ];

        for expr in samples {
            let simplified = simplify(&expr);
            let before = expr.eval(&bindings).unwrap();
            let after = simplified.eval(&bindings).unwrap();
            assert_float_absolute_eq!(before, after, 1e-9);
        }
    }

    #[test]
    fn simplification_is_commutative() {
        let a = var("a") * Expr::constant(3.0);
        let b = var("b").sin();
        assert_eq!(
            simplify(&(a.clone() + b.clone())),
            simplify(&(b.clone() + a.clone())),
        );
        assert_eq!(
            simplify(&(a.clone() * b.clone())),
            simplify(&(b * a)),
        );
    }

    #[test]
    fn derivative_is_linear_after_simplification() {
        let a = var("x").pow(Expr::constant(2.0));
        let b = var("x").sin();
        let mut simplifier = Simplifier::new();
        let combined = simplifier.simplify(&(a.clone() + b.clone()).derivative("x"));
        let separate = simplifier.simplify(&(a.derivative("x") + b.derivative("x")));
        assert_eq!(combined, separate);
    }

    #[test]
    fn canonical_order_puts_constants_first() {
        let expr = var("x") * Expr::constant(2.0);
        assert_eq!(
            simplify(&expr),
            Expr::Product(vec![Expr::constant(2.0), var("x")]),
        );
    }

    #[test]
    fn derivative_of_square_collapses() {
        let expr = var("x").pow(Expr::constant(2.0));
        assert_eq!(
            simplify(&expr.derivative("x")),
            Expr::constant(2.0) * var("x"),
        );
    }

    #[test]
    fn substitution_residue_is_flattened() {
        let outer = var("x") + var("w");
        let substituted =
            outer.with(&HashMap::from([("x".to_string(), var("y") + var("z"))]));
        let simplified = simplify(&substituted);
        assert_eq!(simplified, Expr::Sum(vec![var("w"), var("y"), var("z")]));
    }

    #[test]
    fn bounded_simplification_reports_exhaustion() {
        let expr = var("x") * Expr::constant(1.0);
        let mut simplifier = Simplifier::new();
        assert_eq!(
            simplifier.simplify_bounded(&expr, 0),
            Err(Error::DidNotConverge(0)),
        );

        let mut fresh = Simplifier::new();
        assert_eq!(fresh.simplify_bounded(&expr, 64), Ok(var("x")));
    }

    #[test]
    fn steps_record_applied_rules() {
        let expr = var("x") * Expr::constant(1.0);
        let mut steps = Vec::new();
        let result = Simplifier::new().simplify_with_steps(&expr, &mut steps);
        assert_eq!(result, var("x"));
        assert!(steps.contains(&Step {
            phase: Phase::Processing,
            rule: "multiply-one",
        }));
    }

    #[test]
    fn simplifier_instances_are_reusable() {
        let mut simplifier = Simplifier::new();
        let first = simplifier.simplify(&(var("x") + var("x")));
        let second = simplifier.simplify(&(var("x") + var("x")));
        assert_eq!(first, second);

        simplifier.clear_cache();
        let third = simplifier.simplify(&(var("x") + var("x")));
        assert_eq!(third, first);
    }

    #[test]
    fn negated_sums_stay_presentable() {
        // y - 2x keeps its subtraction rendering
        let expr = var("y") - Expr::constant(2.0) * var("x");
        let simplified = simplify(&expr);
        assert_eq!(
            simplified,
            Expr::Sum(vec![
                var("y"),
                Expr::Unary(
                    UnaryKind::Neg,
                    Box::new(Expr::Product(vec![Expr::constant(2.0), var("x")])),
                ),
            ]),
        );
        assert_eq!(simplified.to_string(), "(y - (2 * x))");
    }
}

//! Canonical reordering of associative-commutative argument lists.

use super::{contract_violation, priority, Rule};
use crate::expr::Expr;
use crate::ordering::compare;
use std::cmp::Ordering;

/// Returns true if the arguments are already in canonical order.
fn is_sorted(args: &[Expr]) -> bool {
    args.windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != Ordering::Greater)
}

/// Sorts the arguments of a sum or product into canonical order.
///
/// The sort is stable and [`compare`] is a consistent strict weak order, so sorting an
/// already-sorted list changes nothing, which is exactly the property that lets this rule
/// coexist with fixed-point iteration.
pub(crate) const CANONICAL_ORDER: Rule = Rule {
    name: "canonical-order",
    matches: |expr| match expr {
        Expr::Sum(args) | Expr::Product(args) => {
            (!is_sorted(args)).then_some(priority::REORDER)
        },
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Sum(args) => {
            let mut sorted = args.clone();
            sorted.sort_by(|a, b| compare(a, b));
            Expr::Sum(sorted)
        },
        Expr::Product(args) => {
            let mut sorted = args.clone();
            sorted.sort_by(|a, b| compare(a, b));
            Expr::Product(sorted)
        },
        _ => contract_violation("canonical-order"),
    },
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> Expr {
        Expr::variable(name).unwrap()
    }

    #[test]
    fn constants_move_to_the_front() {
        let expr = Expr::Sum(vec![var("x"), Expr::constant(2.0)]);
        assert!((CANONICAL_ORDER.matches)(&expr).is_some());
        assert_eq!(
            (CANONICAL_ORDER.transform)(&expr),
            Expr::Sum(vec![Expr::constant(2.0), var("x")]),
        );
    }

    #[test]
    fn sorted_lists_do_not_match() {
        let expr = Expr::Sum(vec![Expr::constant(2.0), var("x"), var("y")]);
        assert_eq!((CANONICAL_ORDER.matches)(&expr), None);
    }
}

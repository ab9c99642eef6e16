//! Pre-rewrite normalization rules.
//!
//! The construction combinators already express subtraction as `a + (-b)` and division as
//! `a * (1/b)`, so by the time an expression reaches the simplifier the only non-commutative
//! surface syntax left to normalize is the sign of negative literals: `-3` becomes `Neg(3)` so
//! that every later rule sees signs as explicit `Neg` wrappers and magnitudes as non-negative
//! literals. Flattening repairs any nested associative-commutative nodes that structural
//! substitution may have introduced.
//!
//! Both rules are also registered in the processing phase as a safety net, since a rewrite may
//! rebuild a subtree from raw parts.

use super::{contract_violation, priority, Rule};
use crate::expr::{Expr, UnaryKind};

/// `Sum[a, Sum[b, c], d] = Sum[a, b, c, d]`, and likewise for products.
///
/// The combinators flatten as they build, but [`Expr::with`] substitutes structurally: replacing
/// `x` with `y + z` inside `x + w` leaves a sum nested in a sum.
pub(crate) const FLATTEN_NESTED: Rule = Rule {
    name: "flatten-nested",
    matches: |expr| match expr {
        Expr::Sum(args) => args
            .iter()
            .any(|arg| matches!(arg, Expr::Sum(_)))
            .then_some(priority::FLATTEN),
        Expr::Product(args) => args
            .iter()
            .any(|arg| matches!(arg, Expr::Product(_)))
            .then_some(priority::FLATTEN),
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Sum(args) => {
            let mut flattened = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Expr::Sum(inner) => flattened.extend(inner.iter().cloned()),
                    other => flattened.push(other.clone()),
                }
            }
            Expr::Sum(flattened)
        },
        Expr::Product(args) => {
            let mut flattened = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Expr::Product(inner) => flattened.extend(inner.iter().cloned()),
                    other => flattened.push(other.clone()),
                }
            }
            Expr::Product(flattened)
        },
        _ => contract_violation("flatten-nested"),
    },
};

/// `-3` becomes `Neg(3)`: the sign of a negative literal moves into an explicit wrapper.
pub(crate) const EXTRACT_LITERAL_SIGN: Rule = Rule {
    name: "extract-literal-sign",
    matches: |expr| match expr {
        Expr::Constant(value) if *value < 0.0 => Some(priority::NORMALIZE),
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Constant(value) if *value < 0.0 => {
            Expr::Unary(UnaryKind::Neg, Box::new(Expr::constant(-*value)))
        },
        _ => contract_violation("extract-literal-sign"),
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
    fn flattens_substitution_residue() {
        let nested = Expr::Sum(vec![var("a"), Expr::Sum(vec![var("b"), var("c")])]);
        assert!((FLATTEN_NESTED.matches)(&nested).is_some());
        assert_eq!(
            (FLATTEN_NESTED.transform)(&nested),
            Expr::Sum(vec![var("a"), var("b"), var("c")]),
        );
    }

    #[test]
    fn does_not_flatten_products_into_sums() {
        let mixed = Expr::Sum(vec![var("a"), Expr::Product(vec![var("b"), var("c")])]);
        assert_eq!((FLATTEN_NESTED.matches)(&mixed), None);
    }

    #[test]
    fn wraps_negative_literals() {
        let negative = Expr::constant(-3.0);
        assert!((EXTRACT_LITERAL_SIGN.matches)(&negative).is_some());
        assert_eq!(
            (EXTRACT_LITERAL_SIGN.transform)(&negative),
            Expr::Unary(UnaryKind::Neg, Box::new(Expr::constant(3.0))),
        );
        assert_eq!((EXTRACT_LITERAL_SIGN.matches)(&Expr::constant(3.0)), None);
    }

    #[test]
    #[should_panic(expected = "without a preceding successful match")]
    fn transform_without_match_is_a_contract_violation() {
        (EXTRACT_LITERAL_SIGN.transform)(&Expr::constant(3.0));
    }
}

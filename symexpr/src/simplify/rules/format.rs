//! Post-format rules.
//!
//! The processing phase works on a commutative normal form in which division only exists as
//! negative exponents. These rules reintroduce the presentation forms that the renderer turns
//! back into `a / b`: explicit inversions, and products whose divisors trail their dividends.
//! They run in their own phase so they cannot undo processing-phase normalization mid-flight.

use super::{contract_violation, priority, product_args, Rule};
use crate::expr::{Expr, UnaryKind};

/// `x^-n = 1/(x^n)` (and `x^-1 = 1/x`): a `Neg`-wrapped exponent becomes an explicit inversion.
pub(crate) const NEGATIVE_EXPONENT_TO_INVERT: Rule = Rule {
    name: "negative-exponent-to-invert",
    matches: |expr| match expr {
        Expr::Power(_, exponent) if matches!(**exponent, Expr::Unary(UnaryKind::Neg, _)) => {
            Some(priority::FORMAT_DIVISION)
        },
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Power(base, exponent) => match &**exponent {
            Expr::Unary(UnaryKind::Neg, magnitude) => {
                let inverted = if magnitude.is_literal(1.0) {
                    (**base).clone()
                } else {
                    Expr::Power(base.clone(), magnitude.clone())
                };
                Expr::Unary(UnaryKind::Invert, Box::new(inverted))
            },
            _ => contract_violation("negative-exponent-to-invert"),
        },
        _ => contract_violation("negative-exponent-to-invert"),
    },
};

/// Returns true if an inverted factor appears before a non-inverted one.
fn has_early_divisor(factors: &[Expr]) -> bool {
    let mut seen_invert = false;
    for factor in factors {
        match factor {
            Expr::Unary(UnaryKind::Invert, _) => seen_invert = true,
            _ if seen_invert => return true,
            _ => {},
        }
    }
    false
}

/// Moves inverted factors to the end of their product, so `(1/x) * y^x` reads `y^x / x`. The
/// partition is stable: dividends keep their order, and so do divisors.
pub(crate) const DIVISION_LAST: Rule = Rule {
    name: "division-last",
    matches: |expr| {
        let factors = product_args(expr)?;
        has_early_divisor(factors).then_some(priority::FORMAT_ORDER)
    },
    transform: |expr| {
        let Some(factors) = product_args(expr) else {
            contract_violation("division-last");
        };

        let (divisors, dividends): (Vec<Expr>, Vec<Expr>) = factors
            .iter()
            .cloned()
            .partition(|factor| matches!(factor, Expr::Unary(UnaryKind::Invert, _)));

        let mut reordered = dividends;
        reordered.extend(divisors);
        Expr::Product(reordered)
    },
};

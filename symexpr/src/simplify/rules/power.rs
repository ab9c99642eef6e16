//! Simplification rules for power expressions.

use super::{contract_violation, priority, Rule};
use crate::expr::{Expr, UnaryKind};
use crate::primitive::{is_integer, num, MAX_EXACT_INTEGER};

/// `x^0 = 1` (including `0^0 = 1`, the usual convention for symbolic work).
pub(crate) const POWER_ZERO: Rule = Rule {
    name: "power-zero",
    matches: |expr| match expr {
        Expr::Power(_, exponent) if exponent.is_literal(0.0) => Some(priority::IDENTITY),
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Power(_, exponent) if exponent.is_literal(0.0) => Expr::constant(1.0),
        _ => contract_violation("power-zero"),
    },
};

/// `x^1 = x`
pub(crate) const POWER_ONE: Rule = Rule {
    name: "power-one",
    matches: |expr| match expr {
        Expr::Power(_, exponent) if exponent.is_literal(1.0) => Some(priority::IDENTITY),
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Power(base, exponent) if exponent.is_literal(1.0) => (**base).clone(),
        _ => contract_violation("power-one"),
    },
};

/// `1^x = 1`
pub(crate) const ONE_TO_ANY_POWER: Rule = Rule {
    name: "one-to-any-power",
    matches: |expr| match expr {
        Expr::Power(base, _) if base.is_literal(1.0) => Some(priority::IDENTITY),
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Power(base, _) if base.is_literal(1.0) => Expr::constant(1.0),
        _ => contract_violation("one-to-any-power"),
    },
};

/// The exactly-foldable integer power, if there is one: an integer base raised to an integer
/// exponent, where the folded magnitude stays within the exactly-representable integer range.
///
/// A negative exponent folds to the *symbolic* reciprocal of the magnitude: `2^-2` becomes
/// `1/4`-as-an-inversion, never the decimal `0.25`. Exactness is preserved even when the
/// reciprocal has no finite binary representation.
fn folded_integer_power(expr: &Expr) -> Option<Expr> {
    let Expr::Power(base, exponent) = expr else {
        return None;
    };

    let base = base.as_numeric_literal().filter(|value| is_integer(*value))?;
    let exponent = exponent
        .as_numeric_literal()
        .filter(|value| is_integer(*value))?;

    let magnitude = base.powi(exponent.abs() as i32);
    if !magnitude.is_finite() || magnitude.abs() > MAX_EXACT_INTEGER {
        return None;
    }

    if exponent >= 0.0 {
        Some(num(magnitude))
    } else if magnitude == 0.0 {
        // 0^-n stays symbolic
        None
    } else if magnitude < 0.0 {
        Some(Expr::Unary(
            UnaryKind::Neg,
            Box::new(Expr::Unary(
                UnaryKind::Invert,
                Box::new(Expr::constant(-magnitude)),
            )),
        ))
    } else {
        Some(Expr::Unary(
            UnaryKind::Invert,
            Box::new(Expr::constant(magnitude)),
        ))
    }
}

/// Folds integer powers of integer bases: `2^10 = 1024`, `(-3)^3 = -27`, `2^-2 = 1/4` (kept as
/// an exact inversion). Results that would leave the exactly-representable range stay symbolic.
pub(crate) const FOLD_INTEGER_POWER: Rule = Rule {
    name: "fold-integer-power",
    matches: |expr| folded_integer_power(expr).map(|_| priority::FOLD),
    transform: |expr| {
        let Some(result) = folded_integer_power(expr) else {
            contract_violation("fold-integer-power");
        };
        result
    },
};

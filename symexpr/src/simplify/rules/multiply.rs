//! Simplification rules for products: annihilation, literal folding, sign normalization,
//! exactness-guarded division, and combining like factors.

use super::{contract_violation, priority, product_args, Rule};
use crate::expr::{Expr, UnaryKind};
use crate::primitive::{gcd, is_integer, num};

/// `a * 0 = 0`
pub(crate) const MULTIPLY_ZERO: Rule = Rule {
    name: "multiply-zero",
    matches: |expr| {
        let factors = product_args(expr)?;
        factors
            .iter()
            .any(|factor| factor.as_numeric_literal() == Some(0.0))
            .then_some(priority::ANNIHILATE)
    },
    transform: |expr| {
        if (MULTIPLY_ZERO.matches)(expr).is_none() {
            contract_violation("multiply-zero");
        }
        Expr::constant(0.0)
    },
};

/// `a * 1 = a`
pub(crate) const MULTIPLY_ONE: Rule = Rule {
    name: "multiply-one",
    matches: |expr| {
        let factors = product_args(expr)?;
        factors
            .iter()
            .any(|factor| factor.is_literal(1.0))
            .then_some(priority::IDENTITY)
    },
    transform: |expr| {
        let Some(factors) = product_args(expr) else {
            contract_violation("multiply-one");
        };

        let kept = factors
            .iter()
            .filter(|factor| !factor.is_literal(1.0))
            .cloned()
            .collect::<Vec<_>>();
        Expr::Product(kept).downgrade()
    },
};

/// Folds every numeric literal factor of a product into a single literal.
pub(crate) const FOLD_PRODUCT_LITERALS: Rule = Rule {
    name: "fold-product-literals",
    matches: |expr| {
        let factors = product_args(expr)?;
        let literals = factors
            .iter()
            .filter(|factor| factor.as_numeric_literal().is_some())
            .count();
        (literals >= 2).then_some(priority::FOLD)
    },
    transform: |expr| {
        let Some(factors) = product_args(expr) else {
            contract_violation("fold-product-literals");
        };

        let mut total = 1.0;
        let mut rest = Vec::with_capacity(factors.len());
        for factor in factors {
            match factor.as_numeric_literal() {
                Some(value) => total *= value,
                None => rest.push(factor.clone()),
            }
        }

        if total != 1.0 || rest.is_empty() {
            rest.insert(0, num(total));
        }
        Expr::Product(rest).downgrade()
    },
};

/// `(-a) * b = -(a * b)`: signs move out of the factor list onto the product itself, so factor
/// bases stay sign-free for collection and display.
pub(crate) const PULL_SIGN_OUT_OF_PRODUCT: Rule = Rule {
    name: "pull-sign-out-of-product",
    matches: |expr| {
        let factors = product_args(expr)?;
        factors
            .iter()
            .any(|factor| matches!(factor, Expr::Unary(UnaryKind::Neg, _)))
            .then_some(priority::SIGN_PULL)
    },
    transform: |expr| {
        let Some(factors) = product_args(expr) else {
            contract_violation("pull-sign-out-of-product");
        };

        let mut negations = 0usize;
        let stripped = factors
            .iter()
            .map(|factor| match factor {
                Expr::Unary(UnaryKind::Neg, inner) => {
                    negations += 1;
                    (**inner).clone()
                },
                other => other.clone(),
            })
            .collect::<Vec<_>>();

        let product = Expr::Product(stripped).downgrade();
        if negations % 2 == 1 {
            Expr::Unary(UnaryKind::Neg, Box::new(product))
        } else {
            product
        }
    },
};

/// If the factor is the reciprocal of a numeric literal (`1/d` or `d^-1`), returns `d`.
fn as_literal_reciprocal(factor: &Expr) -> Option<f64> {
    match factor {
        Expr::Unary(UnaryKind::Invert, inner) => inner.as_numeric_literal(),
        Expr::Power(base, exponent) => {
            if exponent.as_numeric_literal() == Some(-1.0) {
                base.as_numeric_literal()
            } else {
                None
            }
        },
        _ => None,
    }
}

/// The reciprocal of a positive literal, as an expression.
fn literal_reciprocal(value: f64) -> Expr {
    Expr::Unary(UnaryKind::Invert, Box::new(Expr::constant(value)))
}

/// Attempts the exactness-guarded division fold on a factor list. Returns the rewritten factor
/// list, or `None` when the quotient cannot be represented exactly.
fn folded_division(factors: &[Expr]) -> Option<Vec<Expr>> {
    let numerator_idx = factors.iter().position(|factor| {
        factor
            .as_numeric_literal()
            .is_some_and(|value| is_integer(value) && value != 0.0)
    })?;
    let denominator_idx = factors.iter().position(|factor| {
        as_literal_reciprocal(factor).is_some_and(|value| is_integer(value) && value != 0.0)
    })?;

    let numerator = factors[numerator_idx].as_numeric_literal()?;
    let denominator = as_literal_reciprocal(&factors[denominator_idx])?;

    let negative = (numerator < 0.0) != (denominator < 0.0);
    let n = numerator.abs();
    let d = denominator.abs();

    // the replacement for the numerator/denominator factor pair
    let folded: Vec<Expr> = if n % d == 0.0 {
        // evenly divides: 12/3 = 4
        vec![num(if negative { -(n / d) } else { n / d })]
    } else if d % n == 0.0 {
        // unit fraction: 2/6 = 1/3
        let reciprocal = literal_reciprocal(d / n);
        if negative {
            vec![Expr::Unary(UnaryKind::Neg, Box::new(reciprocal))]
        } else {
            vec![reciprocal]
        }
    } else {
        // common divisor: 10/4 = 5/2, still symbolic
        let common = gcd(n, d) as f64;
        if common <= 1.0 {
            return None;
        }
        vec![
            num(if negative { -(n / common) } else { n / common }),
            literal_reciprocal(d / common),
        ]
    };

    let mut rest = factors.to_vec();
    // remove the higher index first so the lower one stays valid
    rest.remove(numerator_idx.max(denominator_idx));
    rest.remove(numerator_idx.min(denominator_idx));
    rest.extend(folded);
    Some(rest)
}

/// Folds a quotient of two integer-valued literals, but only when the result is exact: the
/// divisor evenly divides the dividend, the pair reduces to a unit fraction, or a common divisor
/// cancels. `1/3` stays `1/3`; it never silently becomes a decimal approximation.
pub(crate) const EXACT_DIVISION: Rule = Rule {
    name: "exact-division",
    matches: |expr| {
        let factors = product_args(expr)?;
        folded_division(factors).map(|_| priority::EXACT_DIVISION)
    },
    transform: |expr| {
        let Some(new_factors) = product_args(expr).and_then(folded_division) else {
            contract_violation("exact-division");
        };
        Expr::Product(new_factors).downgrade()
    },
};

/// Splits a factor into its base and exponent, looking through inversions.
///
/// - `a^b` -> `(a, b)`
/// - `1/a` -> `(a, -1)`, and `1/(a^b)` -> `(a, -b)`
/// - `a` -> `(a, 1)`
fn split_exponent(factor: &Expr) -> (Expr, Expr) {
    match factor {
        Expr::Power(base, exponent) => ((**base).clone(), (**exponent).clone()),
        Expr::Unary(UnaryKind::Invert, inner) => {
            let (base, exponent) = split_exponent(inner);
            (base, negated_exponent(exponent))
        },
        _ => (factor.clone(), Expr::constant(1.0)),
    }
}

/// Negates an exponent expression, keeping literals in the `Neg`-wrapped normal form.
fn negated_exponent(exponent: Expr) -> Expr {
    match exponent.as_numeric_literal() {
        Some(value) => num(-value),
        None => match exponent {
            Expr::Unary(UnaryKind::Neg, inner) => *inner,
            other => Expr::Unary(UnaryKind::Neg, Box::new(other)),
        },
    }
}

/// Adds two exponent expressions, folding numerically when both are literals. Symbolic exponents
/// stay symbolic; the re-descent after this rule simplifies them.
fn added_exponents(lhs: Expr, rhs: Expr) -> Expr {
    match (lhs.as_numeric_literal(), rhs.as_numeric_literal()) {
        (Some(a), Some(b)) => num(a + b),
        _ => lhs + rhs,
    }
}

fn join_exponent(base: Expr, exponent: Expr) -> Expr {
    if exponent.is_literal(1.0) {
        base
    } else {
        base.pow(exponent)
    }
}

/// The pairwise like-factor scan. Returns the rewritten factor list if anything combined.
fn collected(factors: &[Expr]) -> Option<Vec<Expr>> {
    let mut new_factors = factors.to_vec();
    let mut changed = false;
    let mut current = 0;

    while current < new_factors.len() {
        let (mut base, mut exponent) = split_exponent(&new_factors[current]);

        let mut next = current + 1;
        while next < new_factors.len() {
            let (other_base, other_exponent) = split_exponent(&new_factors[next]);

            if base == other_base {
                // a^b * a^c = a^(b+c)
                exponent = added_exponents(exponent, other_exponent);
                new_factors.swap_remove(next);
                changed = true;
                continue;
            }

            // a^c * b^c = (a*b)^c for literal bases
            let literal_bases = base.as_numeric_literal().zip(other_base.as_numeric_literal());
            if let Some((lhs, rhs)) = literal_bases {
                if exponent == other_exponent && !exponent.is_literal(1.0) {
                    base = num(lhs * rhs);
                    new_factors.swap_remove(next);
                    changed = true;
                    continue;
                }
            }

            next += 1;
        }

        new_factors[current] = join_exponent(base, exponent);
        current += 1;
    }

    changed.then_some(new_factors)
}

/// Combines like factors by adding exponents: `a * a = a^2`, `a^b * a^c = a^(b+c)`,
/// `a * (1/a) = a^0`. Exponents are expressions, so variable exponents add symbolically.
pub(crate) const COMBINE_LIKE_FACTORS: Rule = Rule {
    name: "combine-like-factors",
    matches: |expr| {
        let factors = product_args(expr)?;
        collected(factors).map(|_| priority::COLLECT)
    },
    transform: |expr| {
        let Some(new_factors) = product_args(expr).and_then(collected) else {
            contract_violation("combine-like-factors");
        };
        Expr::Product(new_factors).downgrade()
    },
};

//! Simplification rules for sums: literal folding, zero elimination, and combining like terms.

use super::{contract_violation, priority, sum_args, Rule};
use crate::expr::{Expr, UnaryKind};
use crate::primitive::num;

/// Folds every numeric literal term of a sum into a single literal. Addition and subtraction of
/// literals always fold; exactness concerns only apply to division.
pub(crate) const FOLD_SUM_LITERALS: Rule = Rule {
    name: "fold-sum-literals",
    matches: |expr| {
        let terms = sum_args(expr)?;
        let literals = terms
            .iter()
            .filter(|term| term.as_numeric_literal().is_some())
            .count();
        (literals >= 2).then_some(priority::FOLD)
    },
    transform: |expr| {
        let Some(terms) = sum_args(expr) else {
            contract_violation("fold-sum-literals");
        };

        let mut total = 0.0;
        let mut rest = Vec::with_capacity(terms.len());
        for term in terms {
            match term.as_numeric_literal() {
                Some(value) => total += value,
                None => rest.push(term.clone()),
            }
        }

        if total != 0.0 || rest.is_empty() {
            rest.insert(0, num(total));
        }
        Expr::Sum(rest).downgrade()
    },
};

/// `a + 0 = a`
pub(crate) const ADD_ZERO: Rule = Rule {
    name: "add-zero",
    matches: |expr| {
        let terms = sum_args(expr)?;
        terms
            .iter()
            .any(|term| term.is_literal(0.0))
            .then_some(priority::IDENTITY)
    },
    transform: |expr| {
        let Some(terms) = sum_args(expr) else {
            contract_violation("add-zero");
        };

        let kept = terms
            .iter()
            .filter(|term| !term.is_literal(0.0))
            .cloned()
            .collect::<Vec<_>>();
        Expr::Sum(kept).downgrade()
    },
};

/// Splits a term into its numeric coefficient and the remaining base expression.
///
/// - `5` -> `(5, 1)`
/// - `x` -> `(1, x)`
/// - `3 * x * y` -> `(3, x * y)`
/// - `-(3 * x)` -> `(-3, x)`
fn split_coefficient(term: &Expr) -> (f64, Expr) {
    match term {
        Expr::Constant(value) => (*value, Expr::constant(1.0)),
        Expr::Unary(UnaryKind::Neg, inner) => {
            let (coeff, base) = split_coefficient(inner);
            (-coeff, base)
        },
        Expr::Product(factors) => {
            let literal = factors
                .iter()
                .enumerate()
                .find_map(|(idx, factor)| factor.as_numeric_literal().map(|value| (idx, value)));
            match literal {
                Some((idx, coeff)) => {
                    let mut rest = factors.clone();
                    rest.remove(idx);
                    (coeff, Expr::Product(rest).downgrade())
                },
                None => (1.0, term.clone()),
            }
        },
        _ => (1.0, term.clone()),
    }
}

/// Rebuilds a term from a coefficient and base, keeping the sign as an outer `Neg` wrapper and
/// rendering coefficient 1 as the bare base.
fn join_coefficient(coeff: f64, base: Expr) -> Expr {
    if base.is_literal(1.0) {
        num(coeff)
    } else if coeff == 1.0 {
        base
    } else if coeff == -1.0 {
        Expr::Unary(UnaryKind::Neg, Box::new(base))
    } else if coeff < 0.0 {
        Expr::Unary(UnaryKind::Neg, Box::new(Expr::constant(-coeff) * base))
    } else {
        Expr::constant(coeff) * base
    }
}

/// Accumulates coefficients per distinct base, preserving first-occurrence order. Returns `None`
/// if no two terms shared a base.
fn collected(terms: &[Expr]) -> Option<Vec<Expr>> {
    let mut entries: Vec<(Expr, f64)> = Vec::with_capacity(terms.len());
    for term in terms {
        let (coeff, base) = split_coefficient(term);
        match entries.iter_mut().find(|(existing, _)| *existing == base) {
            Some((_, total)) => *total += coeff,
            None => entries.push((base, coeff)),
        }
    }

    if entries.len() == terms.len() {
        return None;
    }

    Some(
        entries
            .into_iter()
            .filter(|(_, coeff)| *coeff != 0.0)
            .map(|(base, coeff)| join_coefficient(coeff, base))
            .collect(),
    )
}

/// Combines like terms: `a + a = 2a`, `2a + 3a = 5a`, `a - a = 0`, and so on. Terms whose
/// coefficients cancel drop out entirely.
pub(crate) const COMBINE_LIKE_TERMS: Rule = Rule {
    name: "combine-like-terms",
    matches: |expr| {
        let terms = sum_args(expr)?;
        collected(terms).map(|_| priority::COLLECT)
    },
    transform: |expr| {
        let Some(new_terms) = sum_args(expr).and_then(collected) else {
            contract_violation("combine-like-terms");
        };
        Expr::Sum(new_terms).downgrade()
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
    fn folds_every_literal_term() {
        let expr = Expr::Sum(vec![
            Expr::constant(1.0),
            var("x"),
            Expr::constant(2.0),
            num(-4.0),
        ]);
        assert_eq!(
            (FOLD_SUM_LITERALS.transform)(&expr),
            Expr::Sum(vec![num(-1.0), var("x")]),
        );
    }

    #[test]
    fn folding_all_literals_collapses_to_one() {
        let expr = Expr::Sum(vec![Expr::constant(2.0), Expr::constant(3.0)]);
        assert_eq!((FOLD_SUM_LITERALS.transform)(&expr), Expr::constant(5.0));
    }

    #[test]
    fn drops_zero_terms() {
        let expr = Expr::Sum(vec![var("x"), Expr::constant(0.0)]);
        assert_eq!((ADD_ZERO.transform)(&expr), var("x"));
    }

    #[test]
    fn coefficient_splitting() {
        assert_eq!(split_coefficient(&var("x")), (1.0, var("x")));
        assert_eq!(
            split_coefficient(&Expr::constant(5.0)),
            (5.0, Expr::constant(1.0)),
        );
        assert_eq!(
            split_coefficient(&(Expr::constant(3.0) * var("x"))),
            (3.0, var("x")),
        );
        assert_eq!(
            split_coefficient(&Expr::Unary(
                UnaryKind::Neg,
                Box::new(Expr::constant(2.0) * var("x")),
            )),
            (-2.0, var("x")),
        );
    }

    #[test]
    fn combines_repeated_terms() {
        let expr = Expr::Sum(vec![var("a"), var("a"), var("a")]);
        assert_eq!(
            (COMBINE_LIKE_TERMS.transform)(&expr),
            Expr::Product(vec![Expr::constant(3.0), var("a")]),
        );
    }

    #[test]
    fn cancelling_terms_vanish() {
        let doubled = Expr::Product(vec![Expr::constant(2.0), var("x")]);
        let expr = Expr::Sum(vec![
            var("x"),
            var("x"),
            Expr::Unary(UnaryKind::Neg, Box::new(doubled)),
        ]);
        assert_eq!((COMBINE_LIKE_TERMS.transform)(&expr), Expr::constant(0.0));
    }

    #[test]
    fn unrelated_terms_do_not_match() {
        let expr = Expr::Sum(vec![var("x"), var("y")]);
        assert_eq!((COMBINE_LIKE_TERMS.matches)(&expr), None);
    }
}

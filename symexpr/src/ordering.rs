//! The canonical ordering of sibling expressions.
//!
//! Argument order inside [`Expr::Sum`] and [`Expr::Product`] nodes is not semantically
//! meaningful, so the simplifier sorts those argument lists with [`compare`] to give every
//! expression a single canonical spelling. Because the order is a consistent, transitive strict
//! weak order, re-sorting an already-sorted list is a no-op, which is what lets the reordering
//! rule participate in fixed-point iteration without oscillating.

use crate::expr::{Expr, UnaryKind};
use std::cmp::Ordering;

/// Compares two sibling expressions for canonical ordering.
///
/// The comparison stages, applied in sequence:
///
/// 1. Constant expressions sort before non-constant ones.
/// 2. Within the same constant-ness, lower [complexity](Expr::complexity) sorts first.
/// 3. Two literal constants compare by numeric value.
/// 4. A literal constant sorts before a constant-valued compound expression.
/// 5. Any remaining tie is broken deterministically by variant rank, variable name, and a
///    recursive comparison of parameters.
pub fn compare(a: &Expr, b: &Expr) -> Ordering {
    match (a.is_constant(), b.is_constant()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {},
    }

    let by_complexity = a.complexity().cmp(&b.complexity());
    if by_complexity != Ordering::Equal {
        return by_complexity;
    }

    match (a.as_constant(), b.as_constant()) {
        (Some(lhs), Some(rhs)) => return lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {},
    }

    compare_structure(a, b)
}

/// Rank of each variant, used as the first deterministic tie-break between expressions the
/// mathematical stages of [`compare`] consider equivalent.
fn rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Constant(_) => 0,
        Expr::Variable(_) => 1,
        Expr::Unary(..) => 2,
        Expr::Power(..) => 3,
        Expr::Product(_) => 4,
        Expr::Sum(_) => 5,
    }
}

fn unary_rank(kind: UnaryKind) -> u8 {
    match kind {
        UnaryKind::Neg => 0,
        UnaryKind::Invert => 1,
        UnaryKind::Exp => 2,
        UnaryKind::Log => 3,
        UnaryKind::Sin => 4,
        UnaryKind::Cos => 5,
        UnaryKind::Tan => 6,
    }
}

fn compare_structure(a: &Expr, b: &Expr) -> Ordering {
    let by_rank = rank(a).cmp(&rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }

    match (a, b) {
        (Expr::Constant(lhs), Expr::Constant(rhs)) => {
            lhs.partial_cmp(rhs).unwrap_or(Ordering::Equal)
        },
        (Expr::Variable(lhs), Expr::Variable(rhs)) => lhs.cmp(rhs),
        (Expr::Unary(lhs_kind, lhs_arg), Expr::Unary(rhs_kind, rhs_arg)) => {
            match unary_rank(*lhs_kind).cmp(&unary_rank(*rhs_kind)) {
                Ordering::Equal => compare_structure(lhs_arg, rhs_arg),
                ord => ord,
            }
        },
        (Expr::Power(lhs_base, lhs_exp), Expr::Power(rhs_base, rhs_exp)) => {
            match compare_structure(lhs_base, rhs_base) {
                Ordering::Equal => compare_structure(lhs_exp, rhs_exp),
                ord => ord,
            }
        },
        (Expr::Sum(lhs), Expr::Sum(rhs)) | (Expr::Product(lhs), Expr::Product(rhs)) => {
            compare_args(lhs, rhs)
        },
        // unreachable when ranks are equal
        _ => Ordering::Equal,
    }
}

fn compare_args(lhs: &[Expr], rhs: &[Expr]) -> Ordering {
    for (a, b) in lhs.iter().zip(rhs.iter()) {
        match compare_structure(a, b) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    lhs.len().cmp(&rhs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::variable(name).unwrap()
    }

    #[test]
    fn constants_sort_before_variables() {
        assert_eq!(compare(&Expr::constant(5.0), &var("a")), Ordering::Less);
        assert_eq!(compare(&var("a"), &Expr::constant(5.0)), Ordering::Greater);
    }

    #[test]
    fn constant_compounds_sort_before_non_constants() {
        let compound = Expr::constant(3.0) * Expr::constant(3.0).inv();
        assert_eq!(compare(&compound, &var("x")), Ordering::Less);
    }

    #[test]
    fn lower_complexity_sorts_first() {
        let simple = var("x");
        let complex = var("x") * var("y");
        assert_eq!(compare(&simple, &complex), Ordering::Less);
    }

    #[test]
    fn literals_sort_by_value() {
        assert_eq!(compare(&Expr::constant(2.0), &Expr::constant(10.0)), Ordering::Less);
        assert_eq!(compare(&Expr::constant(-1.0), &Expr::constant(1.0)), Ordering::Less);
    }

    #[test]
    fn variable_names_break_ties() {
        assert_eq!(compare(&var("a"), &var("b")), Ordering::Less);
        assert_eq!(compare(&var("b"), &var("a")), Ordering::Greater);
        assert_eq!(compare(&var("a"), &var("a")), Ordering::Equal);
    }

    #[test]
    fn sorting_is_idempotent() {
        let mut args = vec![
            var("y"),
            var("x") * var("y"),
            Expr::constant(3.0),
            var("x"),
            var("x").pow(Expr::constant(2.0)),
        ];
        args.sort_by(|a, b| compare(a, b));
        let sorted_once = args.clone();
        args.sort_by(|a, b| compare(a, b));
        assert_eq!(args, sorted_once);
        assert_eq!(args[0], Expr::constant(3.0));
    }
}

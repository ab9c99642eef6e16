//! Simplification rules for the unary wrappers: negation, inversion, and the `exp`/`ln` pair.

use super::{contract_violation, priority, Rule};
use crate::expr::{Expr, UnaryKind};

/// `-(-x) = x`
pub(crate) const DOUBLE_NEG: Rule = Rule {
    name: "double-neg",
    matches: |expr| match expr {
        Expr::Unary(UnaryKind::Neg, inner)
            if matches!(**inner, Expr::Unary(UnaryKind::Neg, _)) =>
        {
            Some(priority::IDENTITY)
        },
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Unary(UnaryKind::Neg, inner) => match &**inner {
            Expr::Unary(UnaryKind::Neg, innermost) => (**innermost).clone(),
            _ => contract_violation("double-neg"),
        },
        _ => contract_violation("double-neg"),
    },
};

/// `-0 = 0`
pub(crate) const NEG_ZERO: Rule = Rule {
    name: "neg-zero",
    matches: |expr| match expr {
        Expr::Unary(UnaryKind::Neg, inner) if inner.is_literal(0.0) => Some(priority::IDENTITY),
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Unary(UnaryKind::Neg, inner) if inner.is_literal(0.0) => Expr::constant(0.0),
        _ => contract_violation("neg-zero"),
    },
};

/// `1/(1/x) = x`
pub(crate) const INVERT_INVERT: Rule = Rule {
    name: "invert-invert",
    matches: |expr| match expr {
        Expr::Unary(UnaryKind::Invert, inner)
            if matches!(**inner, Expr::Unary(UnaryKind::Invert, _)) =>
        {
            Some(priority::IDENTITY)
        },
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Unary(UnaryKind::Invert, inner) => match &**inner {
            Expr::Unary(UnaryKind::Invert, innermost) => (**innermost).clone(),
            _ => contract_violation("invert-invert"),
        },
        _ => contract_violation("invert-invert"),
    },
};

/// `1/1 = 1`
pub(crate) const INVERT_ONE: Rule = Rule {
    name: "invert-one",
    matches: |expr| match expr {
        Expr::Unary(UnaryKind::Invert, inner) if inner.is_literal(1.0) => {
            Some(priority::IDENTITY)
        },
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Unary(UnaryKind::Invert, inner) if inner.is_literal(1.0) => Expr::constant(1.0),
        _ => contract_violation("invert-one"),
    },
};

/// `1/(-x) = -(1/x)`: denominators stay sign-free.
pub(crate) const PULL_SIGN_OUT_OF_INVERT: Rule = Rule {
    name: "pull-sign-out-of-invert",
    matches: |expr| match expr {
        Expr::Unary(UnaryKind::Invert, inner)
            if matches!(**inner, Expr::Unary(UnaryKind::Neg, _)) =>
        {
            Some(priority::SIGN_PULL)
        },
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Unary(UnaryKind::Invert, inner) => match &**inner {
            Expr::Unary(UnaryKind::Neg, magnitude) => Expr::Unary(
                UnaryKind::Neg,
                Box::new(Expr::Unary(UnaryKind::Invert, magnitude.clone())),
            ),
            _ => contract_violation("pull-sign-out-of-invert"),
        },
        _ => contract_violation("pull-sign-out-of-invert"),
    },
};

/// `ln(e^x) = x`
pub(crate) const LOG_OF_EXP: Rule = Rule {
    name: "log-of-exp",
    matches: |expr| match expr {
        Expr::Unary(UnaryKind::Log, inner)
            if matches!(**inner, Expr::Unary(UnaryKind::Exp, _)) =>
        {
            Some(priority::INVERSE_PAIR)
        },
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Unary(UnaryKind::Log, inner) => match &**inner {
            Expr::Unary(UnaryKind::Exp, argument) => (**argument).clone(),
            _ => contract_violation("log-of-exp"),
        },
        _ => contract_violation("log-of-exp"),
    },
};

/// `e^(ln x) = x`
pub(crate) const EXP_OF_LOG: Rule = Rule {
    name: "exp-of-log",
    matches: |expr| match expr {
        Expr::Unary(UnaryKind::Exp, inner)
            if matches!(**inner, Expr::Unary(UnaryKind::Log, _)) =>
        {
            Some(priority::INVERSE_PAIR)
        },
        _ => None,
    },
    transform: |expr| match expr {
        Expr::Unary(UnaryKind::Exp, inner) => match &**inner {
            Expr::Unary(UnaryKind::Log, argument) => (**argument).clone(),
            _ => contract_violation("exp-of-log"),
        },
        _ => contract_violation("exp-of-log"),
    },
};

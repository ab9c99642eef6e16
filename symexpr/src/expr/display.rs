//! Canonical infix rendering of expression trees.
//!
//! Every [`Expr::Sum`], [`Expr::Product`] and [`Expr::Power`] node is fully parenthesized (no
//! parentheses are elided based on operator precedence), so the output is unambiguous and can be
//! round-tripped through any conventional infix parser. Sum terms render with `+` or `-` depending
//! on whether the term carries a [`UnaryKind::Neg`] wrapper, and product factors render with `*`
//! or `/` depending on whether the factor carries a [`UnaryKind::Invert`] wrapper, which is how
//! subtraction and division reappear in output even though the tree itself has no such nodes.

use super::{Expr, UnaryKind};
use std::fmt;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{}", value),
            Self::Variable(name) => write!(f, "{}", name),
            Self::Unary(kind, arg) => match kind {
                UnaryKind::Neg => write!(f, "(-{})", arg),
                UnaryKind::Invert => write!(f, "(1 / {})", arg),
                UnaryKind::Exp => write!(f, "exp({})", arg),
                UnaryKind::Log => write!(f, "ln({})", arg),
                UnaryKind::Sin => write!(f, "sin({})", arg),
                UnaryKind::Cos => write!(f, "cos({})", arg),
                UnaryKind::Tan => write!(f, "tan({})", arg),
            },
            Self::Sum(terms) => {
                write!(f, "(")?;
                let mut iter = terms.iter();
                if let Some(first) = iter.next() {
                    match first {
                        Self::Unary(UnaryKind::Neg, inner) => write!(f, "-{}", inner)?,
                        term => write!(f, "{}", term)?,
                    }
                    for term in iter {
                        match term {
                            Self::Unary(UnaryKind::Neg, inner) => write!(f, " - {}", inner)?,
                            term => write!(f, " + {}", term)?,
                        }
                    }
                }
                write!(f, ")")
            },
            Self::Product(factors) => {
                write!(f, "(")?;
                let mut iter = factors.iter();
                if let Some(first) = iter.next() {
                    match first {
                        Self::Unary(UnaryKind::Invert, inner) => write!(f, "1 / {}", inner)?,
                        factor => write!(f, "{}", factor)?,
                    }
                    for factor in iter {
                        match factor {
                            Self::Unary(UnaryKind::Invert, inner) => write!(f, " / {}", inner)?,
                            factor => write!(f, " * {}", factor)?,
                        }
                    }
                }
                write!(f, ")")
            },
            Self::Power(base, exponent) => write!(f, "({}^{})", base, exponent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> Expr {
        Expr::variable(name).unwrap()
    }

    #[test]
    fn sums_render_subtraction_from_neg_wrappers() {
        let expr = var("x") - var("y");
        assert_eq!(expr.to_string(), "(x - y)");
    }

    #[test]
    fn products_render_division_from_invert_wrappers() {
        let expr = var("x") / var("y");
        assert_eq!(expr.to_string(), "(x / y)");
    }

    #[test]
    fn unit_fraction_renders_with_unit_numerator() {
        let expr = Expr::constant(1.0) / Expr::constant(3.0);
        assert_eq!(expr.to_string(), "(1 / 3)");
    }

    #[test]
    fn leading_negation_renders_as_unary_minus() {
        let expr = -var("x") + var("y");
        assert_eq!(expr.to_string(), "(-x + y)");
    }

    #[test]
    fn nested_nodes_are_fully_parenthesized() {
        let expr = (var("x") + Expr::constant(1.0)) * var("y").pow(Expr::constant(2.0));
        assert_eq!(expr.to_string(), "((x + 1) * (y^2))");
    }

    #[test]
    fn functions_render_by_name() {
        let expr = var("x").sin() * var("x").cos() + var("x").tan().ln() + var("x").exp();
        assert_eq!(expr.to_string(), "((sin(x) * cos(x)) + ln(tan(x)) + exp(x))");
    }
}

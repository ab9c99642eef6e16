//! Exact symbolic differentiation.
//!
//! [`Expr::derivative`] applies the textbook differentiation rules variant by variant and returns
//! a new tree. The output is **not** simplified: iterated derivatives grow combinatorially, and
//! deciding how much of that growth to collapse is the simplifier's job, so callers that care
//! about output size should pass the result through [`simplify`](crate::simplify()).
//!
//! The only cleanup performed here is the arity hygiene the construction combinators already
//! guarantee: terms that are trivially zero and factors that are trivially one are not added to
//! the sums and products being built, so `d/dx (x + 7)` comes back as `1` rather than `1 + 0`.

use crate::expr::{Expr, UnaryKind};

/// Returns true if the expression is "clearly" zero. This is intended to keep derivative output
/// small and is not mathematically rigorous.
fn is_trivially_zero(e: &Expr) -> bool {
    match e {
        Expr::Constant(value) => *value == 0.0,
        Expr::Unary(UnaryKind::Neg, arg) => is_trivially_zero(arg),
        Expr::Sum(terms) => terms.iter().all(is_trivially_zero),
        Expr::Product(factors) => factors.iter().any(is_trivially_zero),
        _ => false,
    }
}

/// Returns true if the expression is "clearly" one. This is intended to keep derivative output
/// small and is not mathematically rigorous.
fn is_trivially_one(e: &Expr) -> bool {
    match e {
        Expr::Constant(value) => *value == 1.0,
        Expr::Product(factors) => factors.iter().all(is_trivially_one),
        Expr::Power(base, exponent) => {
            is_trivially_one(base) || is_trivially_zero(exponent)
        },
        _ => false,
    }
}

/// Helper to build a product of expressions while skipping trivial factors. If any factor is
/// zero, the whole product collapses to zero.
#[derive(Default)]
struct MultBuilder(Vec<Expr>);

impl From<MultBuilder> for Expr {
    fn from(value: MultBuilder) -> Self {
        Expr::Product(value.0).downgrade()
    }
}

impl MultBuilder {
    fn mult(&mut self, e: Expr) {
        if is_trivially_zero(&e) || self.0.first().is_some_and(is_trivially_zero) {
            self.0 = vec![Expr::constant(0.0)];
            return;
        }

        if !is_trivially_one(&e) {
            self.0.push(e);
        }
    }
}

/// Helper to build a sum of expressions; trivially-zero terms are skipped.
#[derive(Default)]
struct SumBuilder(Vec<Expr>);

impl From<SumBuilder> for Expr {
    fn from(value: SumBuilder) -> Self {
        Expr::Sum(value.0).downgrade()
    }
}

impl SumBuilder {
    fn add(&mut self, e: Expr) {
        if !is_trivially_zero(&e) {
            self.0.push(e);
        }
    }
}

/// `(f + g)' = f' + g'`
fn sum_rule(terms: &[Expr], var: &str) -> Expr {
    let mut sum = SumBuilder::default();
    for term in terms {
        sum.add(term.derivative(var));
    }
    sum.into()
}

/// `(u * v)' = v * u' + u * v'`, applied by pairing the first factor with the product of the
/// rest; differentiating the remainder recurses back here until the product is binary.
fn product_rule(factors: &[Expr], var: &str) -> Expr {
    let Some((u, rest)) = factors.split_first() else {
        return Expr::constant(0.0);
    };
    let v = Expr::Product(rest.to_vec()).downgrade();

    let du = u.derivative(var);
    let dv = v.derivative(var);

    let mut left = MultBuilder::default();
    left.mult(v.clone());
    left.mult(du);

    let mut right = MultBuilder::default();
    right.mult(u.clone());
    right.mult(dv);

    let mut sum = SumBuilder::default();
    sum.add(left.into());
    sum.add(right.into());
    sum.into()
}

/// Derivative of `u^v`, split into four cases by which side depends on a variable.
fn power_rule(base: &Expr, exponent: &Expr, var: &str) -> Expr {
    match (base.is_constant(), exponent.is_constant()) {
        // c^k
        (true, true) => Expr::constant(0.0),
        // u^n: n * u^(n-1) * u'
        (false, true) => {
            let mut product = MultBuilder::default();
            product.mult(exponent.clone());
            product.mult(base.clone().pow(exponent.clone() - Expr::constant(1.0)));
            product.mult(base.derivative(var));
            product.into()
        },
        // c^v: ln(c) * c^v * v'
        (true, false) => {
            let mut product = MultBuilder::default();
            product.mult(base.clone().ln());
            product.mult(base.clone().pow(exponent.clone()));
            product.mult(exponent.derivative(var));
            product.into()
        },
        // u^v: u^(v-1) * (v * u' + u * ln(u) * v')
        (false, false) => {
            let mut left = MultBuilder::default();
            left.mult(exponent.clone());
            left.mult(base.derivative(var));

            let mut right = MultBuilder::default();
            right.mult(base.clone());
            right.mult(base.clone().ln());
            right.mult(exponent.derivative(var));

            let mut inner = SumBuilder::default();
            inner.add(left.into());
            inner.add(right.into());

            let mut product = MultBuilder::default();
            product.mult(
                base.clone()
                    .pow(exponent.clone() - Expr::constant(1.0)),
            );
            product.mult(inner.into());
            product.into()
        },
    }
}

/// Chain rule for the unary functions: `f(u)' = f'(u) * u'`.
fn unary_rule(kind: UnaryKind, arg: &Expr, var: &str) -> Expr {
    let du = arg.derivative(var);
    let mut product = MultBuilder::default();
    match kind {
        // (-u)' = -u'
        UnaryKind::Neg => {
            product.mult(Expr::constant(-1.0));
            product.mult(du);
        },
        // (1/u)' = -u' / u^2
        UnaryKind::Invert => {
            product.mult(Expr::constant(-1.0));
            product.mult(du);
            product.mult(arg.clone().pow(Expr::constant(2.0)).inv());
        },
        // (e^u)' = e^u * u'
        UnaryKind::Exp => {
            product.mult(arg.clone().exp());
            product.mult(du);
        },
        // ln(u)' = u' / u
        UnaryKind::Log => {
            product.mult(du);
            product.mult(arg.clone().inv());
        },
        // sin(u)' = cos(u) * u'
        UnaryKind::Sin => {
            product.mult(arg.clone().cos());
            product.mult(du);
        },
        // cos(u)' = -sin(u) * u'
        UnaryKind::Cos => {
            product.mult(Expr::constant(-1.0));
            product.mult(arg.clone().sin());
            product.mult(du);
        },
        // tan(u)' = u' / cos(u)^2
        UnaryKind::Tan => {
            product.mult(du);
            product.mult(arg.clone().cos().pow(Expr::constant(2.0)).inv());
        },
    }
    product.into()
}

impl Expr {
    /// Computes the exact symbolic derivative of this expression with respect to `var`.
    ///
    /// The result is a new tree; see the [module documentation](self) for what is (and is not)
    /// cleaned up on the way out.
    pub fn derivative(&self, var: &str) -> Expr {
        match self {
            Self::Constant(_) => Self::constant(0.0),
            Self::Variable(name) => {
                if name == var {
                    Self::constant(1.0)
                } else {
                    Self::constant(0.0)
                }
            },
            Self::Unary(kind, arg) => unary_rule(*kind, arg, var),
            Self::Sum(terms) => sum_rule(terms, var),
            Self::Product(factors) => product_rule(factors, var),
            Self::Power(base, exponent) => power_rule(base, exponent, var),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn var(name: &str) -> Expr {
        Expr::variable(name).unwrap()
    }

    fn eval_x(e: &Expr, x: f64) -> f64 {
        e.eval(&HashMap::from([("x".to_string(), x)])).unwrap()
    }

    /// Finite difference approximation of the derivative of `e` at `x`.
    fn finite_difference(e: &Expr, x: f64) -> f64 {
        const DX: f64 = 1e-6;
        (eval_x(e, x + DX) - eval_x(e, x - DX)) / (2.0 * DX)
    }

    fn check_against_finite_difference(expr: Expr, points: impl IntoIterator<Item = f64>) {
        const TOL: f64 = 1e-4;

        let symbolic = expr.derivative("x");
        for point in points {
            let computed = eval_x(&symbolic, point);
            let approximated = finite_difference(&expr, point);
            assert!(
                (computed - approximated).abs() < TOL,
                "for {expr} at x={point}: symbolic derivative {symbolic} gave {computed}, \
                 finite difference gave {approximated}",
            );
        }
    }

    #[test]
    fn constants_and_variables() {
        assert_eq!(Expr::constant(4.0).derivative("x"), Expr::constant(0.0));
        assert_eq!(var("x").derivative("x"), Expr::constant(1.0));
        assert_eq!(var("y").derivative("x"), Expr::constant(0.0));
    }

    #[test]
    fn sum_rule_is_linear() {
        let expr = var("x").pow(Expr::constant(2.0)) + var("x") + Expr::constant(1.0);
        check_against_finite_difference(expr, [0.0, 1.0, 2.0, 5.0, 8.0]);
    }

    #[test]
    fn product_rule_pairs_first_against_rest() {
        let expr = var("x") * var("x").sin() * var("x").cos();
        check_against_finite_difference(expr, [0.0, 0.5, 1.2, 3.0]);
    }

    #[test]
    fn power_rule_constant_exponent() {
        let expr = var("x").pow(Expr::constant(5.0));
        check_against_finite_difference(expr, [0.5, 1.0, 2.0]);
    }

    #[test]
    fn power_rule_constant_base() {
        let expr = Expr::constant(2.0).pow(var("x"));
        check_against_finite_difference(expr, [0.0, 1.0, 3.0]);
    }

    #[test]
    fn power_rule_general_case() {
        let expr = var("x").pow(var("x"));
        check_against_finite_difference(expr, [0.5, 1.0, 2.0]);
    }

    #[test]
    fn unary_chain_rules() {
        let double = Expr::constant(2.0) * var("x");
        check_against_finite_difference(double.clone().sin(), [0.0, 0.7, 2.0]);
        check_against_finite_difference(double.clone().cos(), [0.0, 0.7, 2.0]);
        check_against_finite_difference(double.clone().tan(), [0.0, 0.3, 1.2]);
        check_against_finite_difference(double.clone().exp(), [0.0, 0.5, 1.5]);
        check_against_finite_difference(double.clone().ln(), [0.5, 1.0, 4.0]);
        check_against_finite_difference(double.clone().inv(), [0.5, 1.0, 4.0]);
        check_against_finite_difference(-double, [0.0, 1.0]);
    }

    #[test]
    fn derivative_of_sine_is_cosine() {
        assert_eq!(var("x").sin().derivative("x"), var("x").cos());
    }

    #[test]
    fn derivative_skips_trivially_zero_terms() {
        // d/dx (x + 7) builds no `+ 0` term
        let expr = var("x") + Expr::constant(7.0);
        assert_eq!(expr.derivative("x"), Expr::constant(1.0));
    }

    #[test]
    fn derivative_of_unrelated_variable_is_zero() {
        let expr = var("y").sin() * var("y");
        assert_eq!(expr.derivative("x"), Expr::constant(0.0));
    }

    #[test]
    fn derivative_output_is_not_simplified() {
        // d/dx x^2 keeps the literal exponent arithmetic visible: 2 * x^1
        let expr = var("x").pow(Expr::constant(2.0));
        assert_eq!(
            expr.derivative("x"),
            Expr::Product(vec![
                Expr::constant(2.0),
                var("x").pow(Expr::constant(1.0)),
            ]),
        );
    }

    #[test]
    fn scenario_sin_times_cos() {
        // d/dx sin(x)cos(x) evaluated at 0.7 equals cos(0.7)^2 - sin(0.7)^2
        let expr = var("x").sin() * var("x").cos();
        let derivative = expr.derivative("x");
        let expected = 0.7f64.cos().powi(2) - 0.7f64.sin().powi(2);
        assert_float_absolute_eq!(eval_x(&derivative, 0.7), expected, 1e-9);
    }
}

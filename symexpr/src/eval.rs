//! Numeric evaluation and structural substitution.

use crate::error::Error;
use crate::expr::Expr;
use std::collections::HashMap;

impl Expr {
    /// Evaluates the expression under the given variable bindings.
    ///
    /// Arithmetic follows IEEE `f64` semantics: overflow yields ±∞, and domain violations (such
    /// as a negative base raised to a fractional exponent, or `ln` of a negative number) yield
    /// NaN rather than an error. The only failure is a [`Expr::Variable`] with no entry in
    /// `bindings`, reported as [`Error::UnboundVariable`].
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Result<f64, Error> {
        match self {
            Self::Constant(value) => Ok(*value),
            Self::Variable(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| Error::UnboundVariable(name.clone())),
            Self::Unary(kind, arg) => Ok(kind.apply(arg.eval(bindings)?)),
            Self::Sum(terms) => terms
                .iter()
                .try_fold(0.0, |acc, term| Ok(acc + term.eval(bindings)?)),
            Self::Product(factors) => factors
                .iter()
                .try_fold(1.0, |acc, factor| Ok(acc * factor.eval(bindings)?)),
            Self::Power(base, exponent) => {
                Ok(base.eval(bindings)?.powf(exponent.eval(bindings)?))
            },
        }
    }

    /// Substitutes expressions for variables, structurally and without evaluating anything.
    ///
    /// Variables with no entry in `bindings` pass through unchanged. The result is a new tree;
    /// `self` is untouched.
    pub fn with(&self, bindings: &HashMap<String, Expr>) -> Expr {
        match self {
            Self::Constant(_) => self.clone(),
            Self::Variable(name) => match bindings.get(name) {
                Some(replacement) => replacement.clone(),
                None => self.clone(),
            },
            Self::Unary(kind, arg) => Self::Unary(*kind, Box::new(arg.with(bindings))),
            Self::Sum(terms) => Self::Sum(terms.iter().map(|term| term.with(bindings)).collect()),
            Self::Product(factors) => {
                Self::Product(factors.iter().map(|factor| factor.with(bindings)).collect())
            },
            Self::Power(base, exponent) => Self::Power(
                Box::new(base.with(bindings)),
                Box::new(exponent.with(bindings)),
            ),
        }
    }

    /// Substitutes numeric values for variables. Convenience form of [`Expr::with`] for callers
    /// that hold plain numbers.
    pub fn with_values(&self, bindings: &HashMap<String, f64>) -> Expr {
        let bindings = bindings
            .iter()
            .map(|(name, value)| (name.clone(), Expr::constant(*value)))
            .collect();
        self.with(&bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> Expr {
        Expr::variable(name).unwrap()
    }

    fn bind(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn evaluates_arithmetic() {
        let expr = (Expr::constant(2.0) * var("x") + var("y")).pow(Expr::constant(2.0));
        let value = expr.eval(&bind(&[("x", 3.0), ("y", 1.0)])).unwrap();
        assert_float_absolute_eq!(value, 49.0);
    }

    #[test]
    fn evaluates_functions() {
        let expr = var("x").sin().pow(Expr::constant(2.0)) + var("x").cos().pow(Expr::constant(2.0));
        let value = expr.eval(&bind(&[("x", 0.7)])).unwrap();
        assert_float_absolute_eq!(value, 1.0, 1e-12);
    }

    #[test]
    fn missing_binding_is_reported() {
        let expr = var("x") + var("missing");
        assert_eq!(
            expr.eval(&bind(&[("x", 1.0)])),
            Err(Error::UnboundVariable("missing".to_string())),
        );
    }

    #[test]
    fn ieee_semantics_flow_through() {
        let expr = Expr::constant(1.0) / var("x");
        assert_eq!(expr.eval(&bind(&[("x", 0.0)])), Ok(f64::INFINITY));

        let expr = var("x").ln();
        assert!(expr.eval(&bind(&[("x", -1.0)])).unwrap().is_nan());

        // negative base with fractional exponent
        let expr = var("x").pow(Expr::constant(0.5));
        assert!(expr.eval(&bind(&[("x", -4.0)])).unwrap().is_nan());
    }

    #[test]
    fn substitution_is_structural() {
        let expr = var("x") * var("x") + var("y");
        let replacement = var("z") + Expr::constant(1.0);
        let substituted = expr.with(&HashMap::from([("x".to_string(), replacement.clone())]));
        assert_eq!(
            substituted,
            Expr::Product(vec![replacement.clone(), replacement]) + var("y"),
        );
    }

    #[test]
    fn unmatched_variables_pass_through() {
        let expr = var("x") + var("y");
        let substituted = expr.with(&HashMap::from([("x".to_string(), Expr::constant(2.0))]));
        assert_eq!(substituted, Expr::Sum(vec![Expr::constant(2.0), var("y")]));
    }

    #[test]
    fn numeric_substitution_does_not_evaluate() {
        let expr = var("x") + var("x");
        let substituted = expr.with_values(&bind(&[("x", 2.0)]));
        // still a sum of two literals, not the number 4
        assert_eq!(
            substituted,
            Expr::Sum(vec![Expr::constant(2.0), Expr::constant(2.0)]),
        );
    }
}

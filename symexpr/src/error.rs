//! Error types reported by expression construction, evaluation, and simplification.

use thiserror::Error;

/// Errors produced by the public operations of this crate.
///
/// All of these are caller errors or logic defects, reported synchronously by the operation that
/// detected them; none of them is transient or worth retrying. Rule-engine contract violations
/// (applying a rule's transform without a successful match) are programming errors and panic
/// instead of appearing here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A constructor was given malformed input, such as an empty variable name.
    #[error("variable name must not be empty")]
    InvalidArgument,

    /// [`Expr::value`](crate::Expr::value) was requested on a non-constant expression.
    #[error("cannot take the value of a non-constant expression")]
    InvalidState,

    /// Evaluation encountered a variable with no binding.
    #[error("variable `{0}` is not bound")]
    UnboundVariable(String),

    /// Bounded simplification exhausted its rewrite-step budget before reaching a fixed point.
    ///
    /// This can only be returned by [`Simplifier::simplify_bounded`]; the unbounded entry points
    /// run until a fixed point is reached.
    ///
    /// [`Simplifier::simplify_bounded`]: crate::simplify::Simplifier::simplify_bounded
    #[error("simplification did not converge within {0} rewrite steps")]
    DidNotConverge(u64),
}

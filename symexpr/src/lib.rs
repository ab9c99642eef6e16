//! Symbolic expression trees with exact differentiation and rule-based simplification.
//!
//! This crate is the computational core behind tools that need closed-form derivatives, such as
//! series generators. It provides three things:
//!
//! - An immutable [`Expr`] tree over real constants and named variables, built through arithmetic
//!   operators and function combinators, with evaluation ([`Expr::eval`]), structural
//!   substitution ([`Expr::with`]), and canonical rendering (`Display`).
//! - Exact symbolic differentiation ([`Expr::derivative`]).
//! - A term-rewriting [`Simplifier`] that canonicalizes and reduces trees while preserving
//!   mathematical equivalence.
//!
//! # Example
//!
//! ```
//! use symexpr::{simplify, Expr};
//!
//! let x = Expr::variable("x")?;
//!
//! // d/dx (x^2 + x) = 2x + 1
//! let expr = x.clone().pow(Expr::constant(2.0)) + x.clone();
//! let derivative = simplify(&expr.derivative("x"));
//! assert_eq!(derivative, Expr::constant(1.0) + Expr::constant(2.0) * x);
//! # Ok::<(), symexpr::Error>(())
//! ```
//!
//! Parsing text into trees is deliberately out of scope: a parser should build trees through the
//! same construction surface shown above, and the fully-parenthesized `Display` output is
//! designed to round-trip through any conventional infix grammar.
//!
//! Expression trees are immutable and freely shareable across threads. The [`Simplifier`] owns
//! the only mutable state in the crate (its memoization caches), so the intended pattern is one
//! simplifier per caller; the free [`simplify()`] function constructs a fresh one per call.

pub mod error;
pub mod expr;
pub mod ordering;
pub mod simplify;

mod derivative;
mod eval;
mod primitive;

pub use error::Error;
pub use expr::{Expr, UnaryKind};
pub use simplify::{Phase, Simplifier, SimplifierOptions, Step, StepCollector};

/// Simplifies an expression with a fresh default [`Simplifier`].
///
/// Callers simplifying many expressions should construct one [`Simplifier`] and reuse it, so
/// that its memoization caches carry over between calls.
pub fn simplify(expr: &Expr) -> Expr {
    Simplifier::new().simplify(expr)
}

//! An immutable tree representation of closed-form mathematical expressions.
//!
//! Expressions are built from constants, named variables, unary functions, and the arithmetic
//! combinators, and are **never mutated** after construction: every transformation in this crate
//! ([`Expr::derivative`], [`Expr::with`], simplification) allocates a new tree. Subtrees may
//! therefore be aliased and shared freely, including across threads.
//!
//! The associative-commutative operations are **flattened**: the expression `x + (y + z)` is
//! represented as a single [`Expr::Sum`] node with _three_ children, `x`, `y`, and `z`. This makes
//! algebraic manipulation much easier: a common step in simplification is combining "like terms"
//! (e.g. `x + x = 2x`), which only works well when all candidate terms sit at the same level of
//! the tree. The arithmetic operator impls on [`Expr`] perform this flattening while building.
//!
//! # Structural equality
//!
//! Determining whether two expressions are *mathematically* equal is intractable in general
//! (`x^2 + 2x + 1` and `(x + 1)^2` are equal, but proving it requires the very simplification
//! machinery that needs an equality check to work). The [`PartialEq`] implementation for [`Expr`]
//! therefore implements **structural equality**: two expressions are equal if they have the same
//! shape, where the argument lists of [`Expr::Sum`] and [`Expr::Product`] are compared as
//! **multisets** (order is not semantically meaningful for those nodes, but duplicity is).
//!
//! Structural equality never reports false positives (structurally equal expressions are always
//! mathematically equal) and is cheap to compute, which makes it usable *inside* simplification
//! to decide when terms or factors can be combined.
//!
//! The [`Hash`] implementation is consistent with this equality: the hashes of the arguments of an
//! associative-commutative node are XOR-folded so that argument order does not affect the result.
//!
//! # Invariants
//!
//! Trees built through the combinators (the supported construction surface) uphold:
//!
//! - [`Expr::Sum`] and [`Expr::Product`] always carry at least two arguments. Operations that
//!   would leave zero or one argument collapse the node to the surviving argument (or to the
//!   operation's identity element) instead.
//! - A `-0.0` literal is normalized to `0.0` so that structural equality and hashing agree.
//! - No tree contains itself as a descendant; construction is bottom-up and nothing is mutated.

mod display;
mod iter;

use crate::error::Error;
use iter::ExprIter;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// The unary operations an [`Expr::Unary`] node can apply to its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryKind {
    /// Negation, `-x`.
    Neg,

    /// The multiplicative inverse, `1 / x`.
    Invert,

    /// The natural exponential, `e^x`.
    Exp,

    /// The natural logarithm, `ln(x)`.
    Log,

    /// The sine function.
    Sin,

    /// The cosine function.
    Cos,

    /// The tangent function.
    Tan,
}

impl UnaryKind {
    /// Applies this operation to a numeric argument, following IEEE `f64` semantics.
    pub(crate) fn apply(self, x: f64) -> f64 {
        match self {
            Self::Neg => -x,
            Self::Invert => 1.0 / x,
            Self::Exp => x.exp(),
            Self::Log => x.ln(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
        }
    }
}

/// A mathematical expression over real variables and constants.
///
/// See the [module-level documentation](self) for the representation, equality semantics, and
/// invariants.
///
/// Trees are built with [`Expr::constant`], [`Expr::variable`], the `+`, `-`, `*`, `/` and unary
/// `-` operators, and the [`pow`](Expr::pow), [`inv`](Expr::inv), [`exp`](Expr::exp),
/// [`ln`](Expr::ln), [`sin`](Expr::sin), [`cos`](Expr::cos) and [`tan`](Expr::tan) combinators.
/// That surface is the supported way to construct trees; it maintains the arity and normalization
/// invariants that the rest of the crate relies on.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A literal numeric constant.
    Constant(f64),

    /// A named variable. The name is never empty.
    Variable(String),

    /// A unary function applied to an argument.
    Unary(UnaryKind, Box<Expr>),

    /// Two or more terms added together. Argument order is not semantically meaningful.
    Sum(Vec<Expr>),

    /// Two or more factors multiplied together. Argument order is not semantically meaningful.
    Product(Vec<Expr>),

    /// An expression raised to a power. Unlike [`Expr::Sum`] and [`Expr::Product`], this node is
    /// neither commutative nor associative, so it stays binary.
    Power(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Creates a literal constant.
    ///
    /// A `-0.0` value is normalized to `0.0` so that structurally equal trees always hash
    /// identically.
    pub fn constant(value: f64) -> Self {
        if value == 0.0 {
            Self::Constant(0.0)
        } else {
            Self::Constant(value)
        }
    }

    /// Creates a named variable.
    ///
    /// Returns [`Error::InvalidArgument`] if the name is empty.
    pub fn variable(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            Err(Error::InvalidArgument)
        } else {
            Ok(Self::Variable(name))
        }
    }

    /// Raises this expression to the given power.
    pub fn pow(self, exponent: Self) -> Self {
        Self::Power(Box::new(self), Box::new(exponent))
    }

    /// The multiplicative inverse `1 / self`.
    pub fn inv(self) -> Self {
        Self::Unary(UnaryKind::Invert, Box::new(self))
    }

    /// The natural exponential `e^self`.
    pub fn exp(self) -> Self {
        Self::Unary(UnaryKind::Exp, Box::new(self))
    }

    /// The natural logarithm `ln(self)`.
    pub fn ln(self) -> Self {
        Self::Unary(UnaryKind::Log, Box::new(self))
    }

    /// The sine of this expression.
    pub fn sin(self) -> Self {
        Self::Unary(UnaryKind::Sin, Box::new(self))
    }

    /// The cosine of this expression.
    pub fn cos(self) -> Self {
        Self::Unary(UnaryKind::Cos, Box::new(self))
    }

    /// The tangent of this expression.
    pub fn tan(self) -> Self {
        Self::Unary(UnaryKind::Tan, Box::new(self))
    }

    /// Returns true if the expression contains no variables.
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Constant(_) => true,
            Self::Variable(_) => false,
            Self::Unary(_, arg) => arg.is_constant(),
            Self::Sum(args) | Self::Product(args) => args.iter().all(Self::is_constant),
            Self::Power(base, exponent) => base.is_constant() && exponent.is_constant(),
        }
    }

    /// Computes the numeric value of a constant expression.
    ///
    /// Returns [`Error::InvalidState`] if the expression contains any variable. Arithmetic
    /// follows IEEE `f64` semantics; [`Expr::Power`] uses [`f64::powf`].
    pub fn value(&self) -> Result<f64, Error> {
        match self {
            Self::Constant(value) => Ok(*value),
            Self::Variable(_) => Err(Error::InvalidState),
            Self::Unary(kind, arg) => Ok(kind.apply(arg.value()?)),
            Self::Sum(terms) => terms.iter().try_fold(0.0, |acc, term| Ok(acc + term.value()?)),
            Self::Product(factors) => {
                factors.iter().try_fold(1.0, |acc, factor| Ok(acc * factor.value()?))
            },
            Self::Power(base, exponent) => Ok(base.value()?.powf(exponent.value()?)),
        }
    }

    /// The length of the longest root-to-leaf path, counted in edges. Leaves have height 0.
    pub fn height(&self) -> usize {
        match self {
            Self::Constant(_) | Self::Variable(_) => 0,
            Self::Unary(_, arg) => 1 + arg.height(),
            Self::Sum(args) | Self::Product(args) => {
                // the arity invariant guarantees at least two children
                1 + args.iter().map(Self::height).max().unwrap_or(0)
            },
            Self::Power(base, exponent) => 1 + base.height().max(exponent.height()),
        }
    }

    /// The total number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Self::Constant(_) | Self::Variable(_) => 1,
            Self::Unary(_, arg) => 1 + arg.size(),
            Self::Sum(args) | Self::Product(args) => {
                1 + args.iter().map(Self::size).sum::<usize>()
            },
            Self::Power(base, exponent) => 1 + base.size() + exponent.size(),
        }
    }

    /// The number of nodes that are not literal constants.
    ///
    /// This is the cost measure used to order candidate rewrites: `3 * (1/3)` has complexity 2
    /// (the product and inversion nodes), while `x * (1/x)` has complexity 4, even though both
    /// trees have the same size.
    pub fn complexity(&self) -> usize {
        match self {
            Self::Constant(_) => 0,
            Self::Variable(_) => 1,
            Self::Unary(_, arg) => 1 + arg.complexity(),
            Self::Sum(args) | Self::Product(args) => {
                1 + args.iter().map(Self::complexity).sum::<usize>()
            },
            Self::Power(base, exponent) => 1 + base.complexity() + exponent.complexity(),
        }
    }

    /// If the expression is a literal constant, returns its value.
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// If the expression is a variable, returns its name.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if the expression is the literal constant `value`.
    pub(crate) fn is_literal(&self, value: f64) -> bool {
        self.as_constant() == Some(value)
    }

    /// Returns the numeric value of a literal, looking through a single [`UnaryKind::Neg`]
    /// wrapper.
    ///
    /// Between the pre-rewrite and post-format phases of simplification, negative literals are
    /// represented as `Neg` applied to a non-negative magnitude; rules that fold or compare
    /// literals use this accessor so both spellings are treated alike.
    pub(crate) fn as_numeric_literal(&self) -> Option<f64> {
        match self {
            Self::Constant(value) => Some(*value),
            Self::Unary(UnaryKind::Neg, arg) => Some(-arg.as_constant()?),
            _ => None,
        }
    }

    /// The set of distinct variable names appearing in the tree.
    pub fn variables(&self) -> BTreeSet<&str> {
        self.post_order_iter()
            .filter_map(Self::as_variable)
            .collect()
    }

    /// Returns an iterator that traverses the tree in left-to-right post-order (children before
    /// parents).
    pub fn post_order_iter(&self) -> ExprIter<'_> {
        ExprIter::new(self)
    }

    /// Trivially collapses degenerate associative-commutative nodes.
    ///
    /// Operations that filter or combine arguments can leave an [`Expr::Sum`] or
    /// [`Expr::Product`] with zero or one argument; this restores the arity invariant by
    /// replacing an empty node with its operation's identity element and a singleton node with
    /// its only argument.
    pub(crate) fn downgrade(self) -> Self {
        match self {
            Self::Sum(mut terms) => {
                if terms.is_empty() {
                    Self::Constant(0.0)
                } else if terms.len() == 1 {
                    terms.remove(0)
                } else {
                    Self::Sum(terms)
                }
            },
            Self::Product(mut factors) => {
                if factors.is_empty() {
                    Self::Constant(1.0)
                } else if factors.len() == 1 {
                    factors.remove(0)
                } else {
                    Self::Product(factors)
                }
            },
            _ => self,
        }
    }
}

/// Compares two argument lists as multisets: equal if every element of one can be paired with a
/// distinct structurally-equal element of the other.
fn multiset_eq(lhs: &[Expr], rhs: &[Expr]) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }

    let mut unmatched: Vec<&Expr> = rhs.iter().collect();
    for expr in lhs {
        match unmatched.iter().position(|candidate| *candidate == expr) {
            Some(idx) => {
                unmatched.swap_remove(idx);
            },
            None => return false,
        }
    }

    true
}

/// Structural equality. Argument lists of [`Expr::Sum`] and [`Expr::Product`] compare as
/// multisets; every other variant compares its parameters in order. Constants compare by bit
/// pattern (`-0.0` never occurs in constructed trees).
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Constant(lhs), Self::Constant(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Self::Variable(lhs), Self::Variable(rhs)) => lhs == rhs,
            (Self::Unary(lhs_kind, lhs_arg), Self::Unary(rhs_kind, rhs_arg)) => {
                lhs_kind == rhs_kind && lhs_arg == rhs_arg
            },
            (Self::Sum(lhs), Self::Sum(rhs)) | (Self::Product(lhs), Self::Product(rhs)) => {
                multiset_eq(lhs, rhs)
            },
            (Self::Power(lhs_base, lhs_exp), Self::Power(rhs_base, rhs_exp)) => {
                lhs_base == rhs_base && lhs_exp == rhs_exp
            },
            _ => false,
        }
    }
}

impl Eq for Expr {}

/// XOR-folds the hashes of an argument list so the result is independent of argument order,
/// keeping [`Hash`] consistent with the multiset equality of associative-commutative nodes.
fn hash_unordered<H: Hasher>(args: &[Expr], state: &mut H) {
    args.len().hash(state);
    let mut folded = 0u64;
    for arg in args {
        let mut hasher = DefaultHasher::new();
        arg.hash(&mut hasher);
        folded ^= hasher.finish();
    }
    folded.hash(state);
}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Constant(value) => {
                0u8.hash(state);
                value.to_bits().hash(state);
            },
            Self::Variable(name) => {
                1u8.hash(state);
                name.hash(state);
            },
            Self::Unary(kind, arg) => {
                2u8.hash(state);
                kind.hash(state);
                arg.hash(state);
            },
            Self::Sum(terms) => {
                3u8.hash(state);
                hash_unordered(terms, state);
            },
            Self::Product(factors) => {
                4u8.hash(state);
                hash_unordered(factors, state);
            },
            Self::Power(base, exponent) => {
                5u8.hash(state);
                base.hash(state);
                exponent.hash(state);
            },
        }
    }
}

/// Adds two expressions, flattening any operand that is already a [`Expr::Sum`] into one argument
/// list. Two literal constants fold immediately; no other simplification is done.
impl Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::Constant(lhs), Self::Constant(rhs)) => Self::constant(lhs + rhs),
            (Self::Sum(mut terms), Self::Sum(rhs_terms)) => {
                terms.extend(rhs_terms);
                Self::Sum(terms)
            },
            (Self::Sum(mut terms), other) | (other, Self::Sum(mut terms)) => {
                terms.push(other);
                Self::Sum(terms)
            },
            (lhs, rhs) => Self::Sum(vec![lhs, rhs]),
        }
    }
}

/// Builds `self + (-rhs)`; the tree has no subtraction node.
impl Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + rhs.neg()
    }
}

/// Multiplies two expressions, flattening any operand that is already a [`Expr::Product`] into
/// one argument list. Two literal constants fold immediately; no other simplification is done.
impl Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::Constant(lhs), Self::Constant(rhs)) => Self::constant(lhs * rhs),
            (Self::Product(mut factors), Self::Product(rhs_factors)) => {
                factors.extend(rhs_factors);
                Self::Product(factors)
            },
            (Self::Product(mut factors), other) | (other, Self::Product(mut factors)) => {
                factors.push(other);
                Self::Product(factors)
            },
            (lhs, rhs) => Self::Product(vec![lhs, rhs]),
        }
    }
}

/// Builds `self * inv(rhs)`; the tree has no division node. A literal 1 numerator collapses to
/// the bare inversion, so `1 / b` is `inv(b)` rather than `1 * inv(b)`.
///
/// Division of two literals is **not** folded here: whether `1 / 3` may become a decimal is an
/// exactness decision that belongs to the simplifier.
impl Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        if self.is_literal(1.0) {
            rhs.inv()
        } else {
            self * rhs.inv()
        }
    }
}

/// Negates the expression. The sign of a literal constant folds into the literal; anything else
/// is wrapped in [`UnaryKind::Neg`].
impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Self::Constant(value) => Self::constant(-value),
            expr => Self::Unary(UnaryKind::Neg, Box::new(expr)),
        }
    }
}

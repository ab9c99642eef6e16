//! The rewrite-rule library and its per-phase registries.
//!
//! A [`Rule`] is a `(match, transform)` pair of plain function pointers. `matches` inspects an
//! expression and reports the rule's priority when it applies; `transform` produces the rewritten
//! expression and is only valid immediately after a successful match on the very same expression.
//! Calling a transform on an expression its matcher did not accept is a programming error inside
//! the engine, and the transforms fail fast with a panic (see [`contract_violation`]) rather than
//! returning a recoverable error.
//!
//! Rules are grouped into the three simplification phases. Within a phase, the engine selects the
//! **highest-priority** matching rule at each node, breaking ties by registration order in the
//! registry below. Priorities matter because several rules can match the same node at once (a
//! `Product` with a zero factor and foldable literals matches both the annihilator and the
//! folding rule); the priority bands in [`priority`] order them so the cheaper, more decisive
//! rewrite always goes first.
//!
//! Authoring obligations, which the engine does not (and cannot) check mechanically: no subset of
//! a phase's rules may re-trigger each other in a cycle, and every rule must preserve the
//! mathematical value of the expression it rewrites.

pub(crate) mod add;
pub(crate) mod format;
pub(crate) mod func;
pub(crate) mod multiply;
pub(crate) mod order;
pub(crate) mod power;
pub(crate) mod rewrite;

use super::Phase;
use crate::expr::Expr;
use once_cell::sync::Lazy;

/// Priority bands for the processing phase. Higher values are tried first.
pub(crate) mod priority {
    /// Flattening a nested associative-commutative node into its parent.
    pub const FLATTEN: u32 = 95;

    /// `x * 0 = 0`: annihilation beats folding so a zero factor short-circuits everything else.
    pub const ANNIHILATE: u32 = 93;

    /// Exact literal folding (sums, products, integer powers).
    pub const FOLD: u32 = 90;

    /// Pulling explicit signs outward (out of product factors, out of inversions).
    pub const SIGN_PULL: u32 = 88;

    /// Normalizing a negative literal into a `Neg` wrapper.
    pub const NORMALIZE: u32 = 85;

    /// Identity elimination: `x + 0`, `x * 1`, `x^0`, `x^1`, `--x`, `1/(1/x)`.
    pub const IDENTITY: u32 = 80;

    /// Inverse-function pairs: `ln(e^x)`, `e^(ln x)`.
    pub const INVERSE_PAIR: u32 = 70;

    /// Exactness-guarded division of integer literals.
    pub const EXACT_DIVISION: u32 = 60;

    /// Like-term and like-factor collection.
    pub const COLLECT: u32 = 50;

    /// Canonical reordering of associative-commutative arguments. Purely cosmetic, so it runs
    /// only when nothing else applies.
    pub const REORDER: u32 = 10;

    /// Post-format: negative exponents become explicit inversions.
    pub const FORMAT_DIVISION: u32 = 50;

    /// Post-format: inverted factors move to the end of their product.
    pub const FORMAT_ORDER: u32 = 40;
}

/// A single rewrite rule: a matcher reporting a priority, and a transform valid only after a
/// successful match.
#[derive(Clone, Copy)]
pub(crate) struct Rule {
    /// Name reported in collected steps and trace logs.
    pub name: &'static str,

    /// Returns the rule's priority if the rule applies to the expression.
    pub matches: fn(&Expr) -> Option<u32>,

    /// Rewrites an expression the matcher accepted. Panics on any other input.
    pub transform: fn(&Expr) -> Expr,
}

/// Fail-fast for a transform invoked without a preceding successful match.
pub(crate) fn contract_violation(rule: &'static str) -> ! {
    panic!("rule `{rule}` transform invoked without a preceding successful match");
}

/// If the expression is a sum, returns its terms.
pub(crate) fn sum_args(expr: &Expr) -> Option<&[Expr]> {
    match expr {
        Expr::Sum(terms) => Some(terms),
        _ => None,
    }
}

/// If the expression is a product, returns its factors.
pub(crate) fn product_args(expr: &Expr) -> Option<&[Expr]> {
    match expr {
        Expr::Product(factors) => Some(factors),
        _ => None,
    }
}

static PRE_REWRITE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rewrite::FLATTEN_NESTED,
        rewrite::EXTRACT_LITERAL_SIGN,
    ]
});

static PROCESSING_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rewrite::FLATTEN_NESTED,
        rewrite::EXTRACT_LITERAL_SIGN,
        multiply::MULTIPLY_ZERO,
        multiply::FOLD_PRODUCT_LITERALS,
        multiply::PULL_SIGN_OUT_OF_PRODUCT,
        multiply::MULTIPLY_ONE,
        multiply::EXACT_DIVISION,
        multiply::COMBINE_LIKE_FACTORS,
        add::FOLD_SUM_LITERALS,
        add::ADD_ZERO,
        add::COMBINE_LIKE_TERMS,
        power::FOLD_INTEGER_POWER,
        power::POWER_ZERO,
        power::POWER_ONE,
        power::ONE_TO_ANY_POWER,
        func::DOUBLE_NEG,
        func::NEG_ZERO,
        func::INVERT_INVERT,
        func::INVERT_ONE,
        func::PULL_SIGN_OUT_OF_INVERT,
        func::LOG_OF_EXP,
        func::EXP_OF_LOG,
        order::CANONICAL_ORDER,
    ]
});

static POST_FORMAT_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        format::NEGATIVE_EXPONENT_TO_INVERT,
        format::DIVISION_LAST,
    ]
});

/// The ordered rule registry for a phase. Registration order is the tie-break between rules of
/// equal priority.
pub(crate) fn phase_rules(phase: Phase) -> &'static [Rule] {
    match phase {
        Phase::PreRewrite => PRE_REWRITE_RULES.as_slice(),
        Phase::Processing => PROCESSING_RULES.as_slice(),
        Phase::PostFormat => POST_FORMAT_RULES.as_slice(),
    }
}

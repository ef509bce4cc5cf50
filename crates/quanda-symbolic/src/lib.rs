//! Quanda Symbolic Engine
//!
//! Deterministic, local algebra for the question pipeline: parsing
//! free-text arithmetic, simplifying expressions, and solving small
//! polynomial equations, all without network access.
//!
//! The one entry point the pipeline cares about is [`try_solve`], which
//! absorbs every internal failure into [`SolveOutcome::Unsolved`] so the
//! caller sees exactly two outcomes: an answer string, or "generate one
//! instead".

mod expr;
mod parse;
mod simplify;
mod solve;

pub use expr::{BinOp, Constant, Expr, Func};
pub use parse::{parse, ParseError};
pub use simplify::simplify;
pub use solve::{solve_equation, SolveError};

use expr::format_number;

/// Outcome of a local solve attempt.
///
/// There is intentionally no error variant: the reasons a solve failed
/// (parse error, unsupported shape, no real roots) are irrelevant to the
/// caller, which falls back to generation either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The engine produced a complete human-readable answer.
    Solved(String),
    /// Symbolic resolution did not apply or failed; nothing is carried
    /// over from the attempt.
    Unsolved,
}

/// Attempts to answer a math question locally.
///
/// If the text contains `=`, it is split at the *first* occurrence into
/// an equation whose sides are parsed and solved; everything after the
/// first `=` belongs to the right-hand side verbatim. Text without `=`
/// is parsed and simplified as a plain expression, never reinterpreted
/// as an equation.
///
/// Any failure anywhere in the procedure yields
/// [`SolveOutcome::Unsolved`] with no partial state.
#[must_use]
pub fn try_solve(question: &str) -> SolveOutcome {
    match question.split_once('=') {
        Some((lhs_text, rhs_text)) => {
            let (Ok(lhs), Ok(rhs)) = (parse(lhs_text), parse(rhs_text)) else {
                return SolveOutcome::Unsolved;
            };
            match solve_equation(&lhs, &rhs) {
                Ok(roots) => {
                    let rendered: Vec<String> =
                        roots.iter().copied().map(format_number).collect();
                    SolveOutcome::Solved(format!("Solution: [{}]", rendered.join(", ")))
                }
                Err(_) => SolveOutcome::Unsolved,
            }
        }
        None => match parse(question) {
            Ok(expr) => SolveOutcome::Solved(format!("Result: {}", simplify(&expr))),
            Err(_) => SolveOutcome::Unsolved,
        },
    }
}

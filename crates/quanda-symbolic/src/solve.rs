//! Polynomial equation solving.
//!
//! The solver works on the difference `lhs - rhs`, extracts univariate
//! polynomial coefficients from the expression tree, and solves degree 1
//! and 2 exactly. Anything it cannot express as such a polynomial is an
//! error, which callers uniformly treat as "not solvable locally".

use std::collections::BTreeSet;

use crate::expr::{BinOp, Expr, EPSILON};
use crate::simplify::snap;

/// Highest polynomial degree the coefficient extractor will build.
/// Extraction beyond this is cut off before solving rejects the degree.
const MAX_DEGREE: usize = 8;

/// Errors from the equation solver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    /// The equation involves more than one free symbol.
    #[error("equation has more than one free symbol")]
    MultipleSymbols,

    /// The difference could not be expressed as a polynomial.
    #[error("expression is not a polynomial in one symbol")]
    NotPolynomial,

    /// The polynomial degree is beyond what the solver handles.
    #[error("polynomial degree {0} is not supported")]
    UnsupportedDegree(usize),

    /// A quadratic with a negative discriminant.
    #[error("equation has no real solutions")]
    NoRealSolution,
}

/// Collects the free symbols of an expression.
fn collect_symbols(expr: &Expr, into: &mut BTreeSet<String>) {
    match expr {
        Expr::Number(_) | Expr::Constant(_) => {}
        Expr::Symbol(name) => {
            into.insert(name.clone());
        }
        Expr::Neg(inner) => collect_symbols(inner, into),
        Expr::Binary { lhs, rhs, .. } => {
            collect_symbols(lhs, into);
            collect_symbols(rhs, into);
        }
        Expr::Call { arg, .. } => collect_symbols(arg, into),
    }
}

/// Extracts polynomial coefficients in `var`, constant term first.
///
/// Returns `None` when the expression is not a polynomial in `var`
/// (symbolic denominators, symbolic exponents, functions of the
/// variable, degree blowup).
fn poly_coeffs(expr: &Expr, var: &str) -> Option<Vec<f64>> {
    match expr {
        Expr::Number(v) => Some(vec![*v]),
        Expr::Constant(c) => Some(vec![c.value()]),
        Expr::Symbol(name) => {
            if name == var {
                Some(vec![0.0, 1.0])
            } else {
                None
            }
        }
        Expr::Neg(inner) => {
            let mut coeffs = poly_coeffs(inner, var)?;
            for c in &mut coeffs {
                *c = -*c;
            }
            Some(coeffs)
        }
        Expr::Binary { op, lhs, rhs } => poly_binary(*op, lhs, rhs, var),
        // A function call only participates when its argument is fully
        // numeric; a function of the variable is not polynomial.
        Expr::Call { .. } => expr.eval_numeric().map(|v| vec![v]),
    }
}

fn poly_binary(op: BinOp, lhs: &Expr, rhs: &Expr, var: &str) -> Option<Vec<f64>> {
    match op {
        BinOp::Add | BinOp::Sub => {
            let l = poly_coeffs(lhs, var)?;
            let r = poly_coeffs(rhs, var)?;
            let mut out = vec![0.0; l.len().max(r.len())];
            for (i, c) in l.iter().enumerate() {
                out[i] += c;
            }
            let sign = if op == BinOp::Add { 1.0 } else { -1.0 };
            for (i, c) in r.iter().enumerate() {
                out[i] += sign * c;
            }
            Some(out)
        }
        BinOp::Mul => {
            let l = poly_coeffs(lhs, var)?;
            let r = poly_coeffs(rhs, var)?;
            multiply(&l, &r)
        }
        BinOp::Div => {
            // Only division by a nonzero constant keeps things polynomial
            let divisor = rhs.eval_numeric()?;
            if divisor.abs() < EPSILON {
                return None;
            }
            let mut coeffs = poly_coeffs(lhs, var)?;
            for c in &mut coeffs {
                *c /= divisor;
            }
            Some(coeffs)
        }
        BinOp::Pow => {
            let exponent = rhs.eval_numeric()?;
            if exponent < 0.0 || exponent.fract().abs() > EPSILON {
                return None;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let n = exponent.round() as usize;
            if n > MAX_DEGREE {
                return None;
            }
            let base = poly_coeffs(lhs, var)?;
            let mut out = vec![1.0];
            for _ in 0..n {
                out = multiply(&out, &base)?;
            }
            Some(out)
        }
    }
}

/// Polynomial multiplication with a degree cap.
fn multiply(l: &[f64], r: &[f64]) -> Option<Vec<f64>> {
    if l.is_empty() || r.is_empty() {
        return Some(Vec::new());
    }
    let degree = l.len() + r.len() - 2;
    if degree > MAX_DEGREE {
        return None;
    }
    let mut out = vec![0.0; degree + 1];
    for (i, a) in l.iter().enumerate() {
        for (j, b) in r.iter().enumerate() {
            out[i + j] += a * b;
        }
    }
    Some(out)
}

/// Drops trailing coefficients that are numerically zero.
fn trim(mut coeffs: Vec<f64>) -> Vec<f64> {
    while coeffs.last().is_some_and(|c| c.abs() < EPSILON) {
        coeffs.pop();
    }
    coeffs
}

/// Solves `lhs = rhs` for its single free symbol.
///
/// Returns the real solution set in ascending order. Equations that
/// reduce to a constant (no free symbol left) get an empty solution set,
/// whether they hold or not.
///
/// # Errors
///
/// Returns a [`SolveError`] when the difference is not a univariate
/// polynomial of degree at most 2, or has no real roots.
pub fn solve_equation(lhs: &Expr, rhs: &Expr) -> Result<Vec<f64>, SolveError> {
    let difference = Expr::binary(BinOp::Sub, lhs.clone(), rhs.clone());

    let mut symbols = BTreeSet::new();
    collect_symbols(&difference, &mut symbols);
    if symbols.len() > 1 {
        return Err(SolveError::MultipleSymbols);
    }
    // With no symbol at all the polynomial is constant; any variable
    // name works for extraction.
    let var = symbols.iter().next().map_or("", String::as_str);

    let coeffs = trim(poly_coeffs(&difference, var).ok_or(SolveError::NotPolynomial)?);

    match coeffs.len() {
        // 0 = 0, or c = 0 for nonzero c: constant equation, empty set
        0 | 1 => Ok(Vec::new()),
        2 => Ok(vec![snap(-coeffs[0] / coeffs[1])]),
        3 => solve_quadratic(coeffs[0], coeffs[1], coeffs[2]),
        n => Err(SolveError::UnsupportedDegree(n - 1)),
    }
}

/// Solves `a*x^2 + b*x + c = 0` over the reals, `a` nonzero.
fn solve_quadratic(c: f64, b: f64, a: f64) -> Result<Vec<f64>, SolveError> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < -EPSILON {
        return Err(SolveError::NoRealSolution);
    }
    if discriminant.abs() < EPSILON {
        return Ok(vec![snap(-b / (2.0 * a))]);
    }
    let sqrt_d = discriminant.sqrt();
    let mut roots = vec![snap((-b - sqrt_d) / (2.0 * a)), snap((-b + sqrt_d) / (2.0 * a))];
    roots.sort_by(f64::total_cmp);
    Ok(roots)
}

//! Expression simplification.
//!
//! A bottom-up single pass: numeric subtrees are folded to literals,
//! arithmetic identities are eliminated, and like terms over the same
//! symbol are collected. The goal is readable output for the answers the
//! engine produces locally, not a full computer-algebra normal form.

use crate::expr::{BinOp, Expr, EPSILON};

/// Rounds values that are within tolerance of an integer (or of zero) to
/// that integer, so `sin(pi/2)` comes out as exactly `1`.
pub(crate) fn snap(v: f64) -> f64 {
    if v.abs() < EPSILON {
        return 0.0;
    }
    let rounded = v.round();
    if (v - rounded).abs() < EPSILON {
        rounded
    } else {
        v
    }
}

fn is_number(expr: &Expr, value: f64) -> bool {
    matches!(expr, Expr::Number(v) if (v - value).abs() < EPSILON)
}

/// Views an expression as `coefficient * base` for like-term collection.
fn as_term(expr: &Expr) -> Option<(f64, &Expr)> {
    match expr {
        Expr::Symbol(_) | Expr::Call { .. } => Some((1.0, expr)),
        Expr::Neg(inner) => {
            let (c, base) = as_term(inner)?;
            Some((-c, base))
        }
        Expr::Binary {
            op: BinOp::Mul,
            lhs,
            rhs,
        } => match (lhs.as_ref(), rhs.as_ref()) {
            (Expr::Number(c), base) => Some((*c, base)),
            (base, Expr::Number(c)) => Some((*c, base)),
            _ => None,
        },
        _ => None,
    }
}

/// Rebuilds `coefficient * base` in its simplest written form.
fn term(coefficient: f64, base: &Expr) -> Expr {
    let c = snap(coefficient);
    if c == 0.0 {
        Expr::Number(0.0)
    } else if (c - 1.0).abs() < EPSILON {
        base.clone()
    } else if (c + 1.0).abs() < EPSILON {
        Expr::Neg(Box::new(base.clone()))
    } else {
        Expr::binary(BinOp::Mul, Expr::Number(c), base.clone())
    }
}

/// Simplifies an expression tree.
///
/// Applied rules, in order per node:
/// - function calls over numeric arguments are evaluated;
/// - binary nodes with two numeric literals are folded;
/// - additive like terms over the same base are collected;
/// - identities (`x+0`, `x*1`, `x*0`, `x^1`, `x^0`, `x-x`, `x/x`,
///   double negation) are eliminated.
#[must_use]
pub fn simplify(expr: &Expr) -> Expr {
    match expr {
        Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) => expr.clone(),
        Expr::Neg(inner) => match simplify(inner) {
            Expr::Number(v) => Expr::Number(snap(-v)),
            Expr::Neg(twice) => *twice,
            other => Expr::Neg(Box::new(other)),
        },
        Expr::Call { func, arg } => {
            let arg = simplify(arg);
            match arg.eval_numeric().map(|v| func.apply(v)) {
                Some(v) if v.is_finite() => Expr::Number(snap(v)),
                _ => Expr::Call {
                    func: *func,
                    arg: Box::new(arg),
                },
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = simplify(lhs);
            let rhs = simplify(rhs);
            simplify_binary(*op, lhs, rhs)
        }
    }
}

#[allow(clippy::float_cmp)]
fn simplify_binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    // Fold literal arithmetic first
    if let (Expr::Number(l), Expr::Number(r)) = (&lhs, &rhs) {
        if let Some(v) = op.apply(*l, *r) {
            if v.is_finite() {
                return Expr::Number(snap(v));
            }
        }
    }

    match op {
        BinOp::Add => {
            if is_number(&lhs, 0.0) {
                return rhs;
            }
            if is_number(&rhs, 0.0) {
                return lhs;
            }
            if let (Some((cl, bl)), Some((cr, br))) = (as_term(&lhs), as_term(&rhs)) {
                if bl == br {
                    return term(cl + cr, bl);
                }
            }
            Expr::binary(op, lhs, rhs)
        }
        BinOp::Sub => {
            if is_number(&rhs, 0.0) {
                return lhs;
            }
            if lhs == rhs {
                return Expr::Number(0.0);
            }
            if is_number(&lhs, 0.0) {
                return simplify(&Expr::Neg(Box::new(rhs)));
            }
            if let (Some((cl, bl)), Some((cr, br))) = (as_term(&lhs), as_term(&rhs)) {
                if bl == br {
                    return term(cl - cr, bl);
                }
            }
            Expr::binary(op, lhs, rhs)
        }
        BinOp::Mul => {
            if is_number(&lhs, 0.0) || is_number(&rhs, 0.0) {
                return Expr::Number(0.0);
            }
            if is_number(&lhs, 1.0) {
                return rhs;
            }
            if is_number(&rhs, 1.0) {
                return lhs;
            }
            Expr::binary(op, lhs, rhs)
        }
        BinOp::Div => {
            if is_number(&rhs, 1.0) {
                return lhs;
            }
            if is_number(&lhs, 0.0) && !is_number(&rhs, 0.0) {
                return Expr::Number(0.0);
            }
            if lhs == rhs && !is_number(&rhs, 0.0) {
                return Expr::Number(1.0);
            }
            Expr::binary(op, lhs, rhs)
        }
        BinOp::Pow => {
            if is_number(&rhs, 0.0) {
                return Expr::Number(1.0);
            }
            if is_number(&rhs, 1.0) {
                return lhs;
            }
            if is_number(&lhs, 1.0) {
                return Expr::Number(1.0);
            }
            Expr::binary(op, lhs, rhs)
        }
    }
}

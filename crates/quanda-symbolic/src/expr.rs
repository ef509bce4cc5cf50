//! Expression tree types for the symbolic engine.
//!
//! Expressions are plain recursive enums: numbers, named constants, free
//! symbols, unary negation, binary arithmetic, and single-argument function
//! calls. The tree is built by the parser and consumed by the simplifier
//! and the equation solver.

use std::fmt;

/// Tolerance used when deciding whether a float is "really" an integer
/// or zero after numeric evaluation.
pub(crate) const EPSILON: f64 = 1e-9;

/// A symbolic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Number(f64),
    /// A named mathematical constant (`pi`, `e`).
    Constant(Constant),
    /// A free symbol, e.g. `x`.
    Symbol(String),
    /// Unary negation.
    Neg(Box<Expr>),
    /// A binary arithmetic operation.
    Binary {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// A single-argument function call, e.g. `sin(x)`.
    Call {
        /// The function being applied.
        func: Func,
        /// The argument expression.
        arg: Box<Expr>,
    },
}

impl Expr {
    /// Convenience constructor for a binary node.
    #[must_use]
    pub fn binary(op: BinOp, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Returns the numeric value of this expression if it contains no
    /// free symbols, evaluating constants and function calls.
    #[must_use]
    pub fn eval_numeric(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Constant(c) => Some(c.value()),
            Self::Symbol(_) => None,
            Self::Neg(inner) => inner.eval_numeric().map(|v| -v),
            Self::Binary { op, lhs, rhs } => {
                let l = lhs.eval_numeric()?;
                let r = rhs.eval_numeric()?;
                let v = op.apply(l, r)?;
                v.is_finite().then_some(v)
            }
            Self::Call { func, arg } => {
                let v = func.apply(arg.eval_numeric()?);
                v.is_finite().then_some(v)
            }
        }
    }
}

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Exponentiation.
    Pow,
}

impl BinOp {
    /// Applies the operator to two numeric operands.
    ///
    /// Returns `None` for division by zero rather than producing an
    /// infinity that would leak into rendered output.
    #[must_use]
    pub fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            Self::Add => Some(lhs + rhs),
            Self::Sub => Some(lhs - rhs),
            Self::Mul => Some(lhs * rhs),
            Self::Div => (rhs.abs() > EPSILON).then(|| lhs / rhs),
            Self::Pow => Some(lhs.powf(rhs)),
        }
    }

    /// Binding strength of the operator, used for display parenthesization.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 4,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => " + ",
            Self::Sub => " - ",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }
}

/// A named mathematical constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    /// The circle constant.
    Pi,
    /// Euler's number.
    E,
}

impl Constant {
    /// Parses a constant from its written name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Self::Pi),
            "e" => Some(Self::E),
            _ => None,
        }
    }

    /// The numeric value of the constant.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
        }
    }

    /// The written name of the constant.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::E => "e",
        }
    }
}

/// A single-argument function known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Square root.
    Sqrt,
    /// Natural exponential.
    Exp,
    /// Natural logarithm (`ln` and `log` both map here).
    Ln,
    /// Absolute value.
    Abs,
}

impl Func {
    /// Parses a function from its written name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "sqrt" => Some(Self::Sqrt),
            "exp" => Some(Self::Exp),
            "ln" | "log" => Some(Self::Ln),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    /// Applies the function to a numeric argument.
    #[must_use]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::Sin => v.sin(),
            Self::Cos => v.cos(),
            Self::Tan => v.tan(),
            Self::Sqrt => v.sqrt(),
            Self::Exp => v.exp(),
            Self::Ln => v.ln(),
            Self::Abs => v.abs(),
        }
    }

    /// The written name of the function.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Ln => "log",
            Self::Abs => "abs",
        }
    }
}

/// Formats a float the way a human would write it: integers without a
/// decimal point, everything else with the shortest round-trip form.
pub(crate) fn format_number(v: f64) -> String {
    let rounded = v.round();
    if (v - rounded).abs() < EPSILON && rounded.abs() < 1e15 {
        // -0.0 rounds to -0.0; normalize before printing
        let as_int = if rounded == 0.0 { 0.0 } else { rounded };
        format!("{as_int:.0}")
    } else {
        format!("{v}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}

impl Expr {
    /// Writes the expression, parenthesizing when the surrounding context
    /// binds at least as tightly as `min_prec`.
    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", format_number(*v)),
            Self::Constant(c) => write!(f, "{}", c.name()),
            Self::Symbol(s) => write!(f, "{s}"),
            Self::Neg(inner) => {
                if min_prec > 1 {
                    write!(f, "(-")?;
                    inner.fmt_prec(f, 3)?;
                    write!(f, ")")
                } else {
                    write!(f, "-")?;
                    inner.fmt_prec(f, 3)
                }
            }
            Self::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                let parens = prec < min_prec;
                if parens {
                    write!(f, "(")?;
                }
                lhs.fmt_prec(f, prec)?;
                write!(f, "{}", op.symbol())?;
                // Subtraction and division are left-associative; power is
                // right-associative, so mirror the asymmetry here.
                let rhs_prec = match op {
                    BinOp::Sub | BinOp::Div => prec + 1,
                    BinOp::Pow => prec,
                    BinOp::Add | BinOp::Mul => prec,
                };
                rhs.fmt_prec(f, rhs_prec)?;
                if parens {
                    write!(f, ")")?;
                }
                Ok(())
            }
            Self::Call { func, arg } => {
                write!(f, "{}(", func.name())?;
                arg.fmt_prec(f, 0)?;
                write!(f, ")")
            }
        }
    }
}

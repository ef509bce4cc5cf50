//! Recursive-descent parser for algebraic expressions.
//!
//! Accepts the textual form people type into a question box: numbers,
//! symbols, `+ - * / ^` (and `**` as an alias for `^`), parentheses, the
//! constants `pi` and `e`, and the function set known to [`Func`].
//!
//! The parser is deliberately strict: any character it does not
//! understand, or any trailing input after a complete expression, is an
//! error. Callers treat every parse error the same way, so the error
//! variants exist for diagnostics and tests rather than recovery.

use crate::expr::{BinOp, Constant, Expr, Func};

/// Errors produced while tokenizing or parsing an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A character the tokenizer does not recognize.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Byte offset into the input.
        pos: usize,
    },

    /// A numeric literal that failed to parse.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// A function name the engine does not know.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Input ended where an operand or closing parenthesis was expected.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A token that cannot start or continue an expression at this point.
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    /// A complete expression was parsed but input remained.
    #[error("trailing input after expression: '{0}'")]
    TrailingInput(String),
}

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(v) => v.to_string(),
            Self::Ident(s) => s.clone(),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::Caret => "^".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
        }
    }
}

/// Splits the input into tokens, skipping whitespace.
fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                // `**` is the written-out power operator
                if chars.peek().map(|&(_, c)| c) == Some('*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            other => {
                return Err(ParseError::UnexpectedChar { ch: other, pos });
            }
        }
    }

    Ok(tokens)
}

/// Parses an expression string into an [`Expr`] tree.
///
/// # Errors
///
/// Returns a [`ParseError`] for unknown characters or functions,
/// malformed numbers, or incomplete input.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ParseError::TrailingInput(token.describe())),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// unary := '-' unary | '+' unary | power
    fn unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.unary()
            }
            _ => self.power(),
        }
    }

    /// power := atom ('^' unary)?   (right-associative)
    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.advance();
            let exponent = self.unary()?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    /// atom := number | constant | symbol | func '(' expression ')' | '(' expression ')'
    fn atom(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some(Token::Number(v)) => Ok(Expr::Number(v)),
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    let func = Func::from_name(&name)
                        .ok_or_else(|| ParseError::UnknownFunction(name.clone()))?;
                    self.advance();
                    let arg = self.expression()?;
                    self.expect_rparen()?;
                    return Ok(Expr::Call {
                        func,
                        arg: Box::new(arg),
                    });
                }
                match Constant::from_name(&name) {
                    Some(c) => Ok(Expr::Constant(c)),
                    None => Ok(Expr::Symbol(name)),
                }
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            Some(token) => Err(ParseError::UnexpectedToken(token.describe())),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ParseError> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken(token.describe())),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

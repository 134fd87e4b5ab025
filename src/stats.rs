//! Stat providers: fixed stat sets and postfix formulas evaluated at a level.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula has no tokens")]
    EmptyFormula,
    #[error("unrecognised formula token {0:?}")]
    UnknownToken(String),
    #[error("token {token} at position {position} needs more operands than the stack holds")]
    StackUnderflow { token: Token, position: usize },
    #[error("division by zero at position {0}")]
    DivisionByZero(usize),
    #[error("formula evaluated to a non-finite value at level {0}")]
    NonFinite(u32),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Token {
    Literal(i64),
    Level,
    Sqrt,
    Add,
    Sub,
    Mul,
    Div,
    Power,
    Middle,
}

impl Token {
    pub fn parse(raw: &str) -> Result<Token, FormulaError> {
        let raw = raw.trim();
        let token = match raw {
            "level" => Token::Level,
            "sqrt" => Token::Sqrt,
            "+" => Token::Add,
            "-" => Token::Sub,
            "*" => Token::Mul,
            "/" => Token::Div,
            "power" => Token::Power,
            "middle" => Token::Middle,
            other => Token::Literal(
                other
                    .parse()
                    .map_err(|_| FormulaError::UnknownToken(other.to_string()))?,
            ),
        };
        Ok(token)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(v) => write!(f, "{v}"),
            Token::Level => f.write_str("level"),
            Token::Sqrt => f.write_str("sqrt"),
            Token::Add => f.write_str("+"),
            Token::Sub => f.write_str("-"),
            Token::Mul => f.write_str("*"),
            Token::Div => f.write_str("/"),
            Token::Power => f.write_str("power"),
            Token::Middle => f.write_str("middle"),
        }
    }
}

/// Formula tokens as they appear in roster files: either bare integers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawToken {
    Number(i64),
    Word(String),
}

/// A validated postfix expression over the monster's level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<RawToken>")]
pub struct StatFormula {
    tokens: Vec<Token>,
}

impl StatFormula {
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, FormulaError> {
        let tokens = raw
            .iter()
            .map(|t| Token::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_tokens(tokens)
    }

    /// Checks the operand stack depth of every step; depth depends only on the
    /// token sequence, never on the level.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, FormulaError> {
        if tokens.is_empty() {
            return Err(FormulaError::EmptyFormula);
        }
        let last = tokens.len() - 1;
        let mut depth = 0usize;
        for (position, &token) in tokens.iter().enumerate() {
            let underflow = FormulaError::StackUnderflow { token, position };
            match token {
                Token::Literal(_) | Token::Level => depth += 1,
                Token::Sqrt => {
                    if depth < 1 {
                        return Err(underflow);
                    }
                }
                Token::Add | Token::Sub | Token::Mul | Token::Div | Token::Power => {
                    if depth < 2 {
                        return Err(underflow);
                    }
                    depth -= 1;
                }
                Token::Middle if position == last => {
                    if depth < 1 {
                        return Err(underflow);
                    }
                    depth = 1;
                }
                Token::Middle => {
                    if depth.min(position) < 2 {
                        return Err(underflow);
                    }
                    depth = 2;
                }
            }
        }
        if depth == 0 {
            return Err(FormulaError::StackUnderflow {
                token: tokens[last],
                position: last,
            });
        }
        Ok(Self { tokens })
    }

    pub fn evaluate(&self, level: u32) -> Result<f64, FormulaError> {
        let last = self.tokens.len().saturating_sub(1);
        let mut stack: Vec<f64> = Vec::with_capacity(self.tokens.len());
        for (position, &token) in self.tokens.iter().enumerate() {
            let underflow = || FormulaError::StackUnderflow { token, position };
            match token {
                Token::Literal(v) => stack.push(v as f64),
                Token::Level => stack.push(level as f64),
                Token::Sqrt => {
                    let v = stack.pop().ok_or_else(underflow)?;
                    stack.push(v.sqrt());
                }
                Token::Middle if position == last => {
                    let median = median(&stack).ok_or_else(underflow)?;
                    stack = vec![median];
                }
                Token::Middle => {
                    // The window is tied to the scan position, not to a marker on the stack.
                    let end = position.min(stack.len());
                    let window = stack.get(1..end).ok_or_else(underflow)?;
                    let median = median(window).ok_or_else(underflow)?;
                    let first = stack[0];
                    stack = vec![first, median];
                }
                Token::Add | Token::Sub | Token::Mul | Token::Div | Token::Power => {
                    let left = stack.pop().ok_or_else(underflow)?;
                    let right = stack.pop().ok_or_else(underflow)?;
                    let value = match token {
                        Token::Add => right + left,
                        Token::Sub => right - left,
                        Token::Mul => right * left,
                        Token::Div => {
                            if left == 0.0 {
                                return Err(FormulaError::DivisionByZero(position));
                            }
                            right / left
                        }
                        _ => right.powf(left),
                    };
                    stack.push(value);
                }
            }
        }
        let result = stack.pop().ok_or(FormulaError::EmptyFormula)?;
        if !result.is_finite() {
            return Err(FormulaError::NonFinite(level));
        }
        Ok(result)
    }
}

impl TryFrom<Vec<RawToken>> for StatFormula {
    type Error = FormulaError;

    fn try_from(raw: Vec<RawToken>) -> Result<Self, Self::Error> {
        let tokens = raw
            .iter()
            .map(|t| match t {
                RawToken::Number(v) => Ok(Token::Literal(*v)),
                RawToken::Word(w) => Token::parse(w),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_tokens(tokens)
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted[sorted.len() / 2])
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedStats {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub max_hp: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaStats {
    pub attack: StatFormula,
    pub defense: StatFormula,
    pub speed: StatFormula,
    pub max_hp: StatFormula,
}

/// Stats of a monster at one level. Max HP is floored to whole hit points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatLine {
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
    pub max_hp: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsProvider {
    Fixed(FixedStats),
    Formula(FormulaStats),
}

impl StatsProvider {
    pub fn at_level(&self, level: u32) -> Result<StatLine, FormulaError> {
        match self {
            StatsProvider::Fixed(stats) => Ok(StatLine {
                attack: stats.attack as f64,
                defense: stats.defense as f64,
                speed: stats.speed as f64,
                max_hp: stats.max_hp as i64,
            }),
            StatsProvider::Formula(stats) => Ok(StatLine {
                attack: stats.attack.evaluate(level)?,
                defense: stats.defense.evaluate(level)?,
                speed: stats.speed.evaluate(level)?,
                max_hp: stats.max_hp.evaluate(level)?.floor() as i64,
            }),
        }
    }
}

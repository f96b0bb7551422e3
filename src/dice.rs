//! Dice expression roller.
//!
//! Expressions are sums of dice terms (`NdM`, or `dM` for a single die) and
//! integer modifiers joined by `+` or `-`, e.g. `2d6+3`, `d20`, `1d8+1d6-1`.
//! Whitespace is ignored and the `d` may be upper case.

use rand::Rng;
use thiserror::Error;

use crate::ForumError;

/// Maximum number of dice in a single term.
pub const MAX_DICE_PER_TERM: u32 = 100;

/// Minimum number of sides on a die.
pub const MIN_SIDES: u32 = 2;

/// Maximum number of sides on a die.
pub const MAX_SIDES: u32 = 1000;

/// Maximum number of terms in one expression.
pub const MAX_TERMS: usize = 16;

/// Largest absolute value accepted for an integer modifier.
const MAX_MODIFIER: i64 = 1_000_000;

/// Dice expression errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiceError {
    /// Nothing to roll.
    #[error("dice expression is empty")]
    Empty,

    /// A term could not be parsed.
    #[error("invalid dice term: {0:?}")]
    InvalidTerm(String),

    /// Too many dice in one term.
    #[error("at most {MAX_DICE_PER_TERM} dice per term")]
    TooManyDice,

    /// Die size out of range.
    #[error("dice must have between {MIN_SIDES} and {MAX_SIDES} sides")]
    InvalidSides,

    /// Too many terms.
    #[error("at most {MAX_TERMS} terms per expression")]
    TooManyTerms,
}

impl From<DiceError> for ForumError {
    fn from(e: DiceError) -> Self {
        ForumError::Validation(format!("roll: {e}"))
    }
}

/// One term of a dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// `count` dice with `sides` faces.
    Dice {
        /// Number of dice.
        count: u32,
        /// Faces per die.
        sides: u32,
    },
    /// A fixed number.
    Constant(i64),
}

/// A parsed expression: signed terms in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceExpression {
    terms: Vec<(i64, Term)>,
}

/// Outcome of rolling an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    /// Sum of all terms, with signs applied.
    pub total: i64,
    /// Every individual die rolled, in order.
    pub dice: Vec<u32>,
}

impl DiceExpression {
    /// Parse an expression.
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(DiceError::Empty);
        }

        let mut terms = Vec::new();
        let mut sign = 1;
        let mut current = String::new();

        for (i, c) in compact.chars().enumerate() {
            match c {
                '+' | '-' => {
                    // A leading sign belongs to the first term.
                    if i > 0 {
                        terms.push((sign, parse_term(&current)?));
                        current.clear();
                    } else if c == '+' {
                        return Err(DiceError::InvalidTerm(compact.clone()));
                    }
                    sign = if c == '-' { -1 } else { 1 };
                }
                _ => current.push(c),
            }
            if terms.len() > MAX_TERMS {
                return Err(DiceError::TooManyTerms);
            }
        }
        terms.push((sign, parse_term(&current)?));

        if terms.len() > MAX_TERMS {
            return Err(DiceError::TooManyTerms);
        }
        Ok(Self { terms })
    }

    /// The signed terms.
    pub fn terms(&self) -> &[(i64, Term)] {
        &self.terms
    }

    /// Roll every die with the given random source.
    pub fn roll_with<R: Rng>(&self, rng: &mut R) -> RollOutcome {
        let mut total = 0;
        let mut dice = Vec::new();

        for &(sign, term) in &self.terms {
            match term {
                Term::Dice { count, sides } => {
                    for _ in 0..count {
                        let value = rng.random_range(1..=sides);
                        dice.push(value);
                        total += sign * i64::from(value);
                    }
                }
                Term::Constant(n) => total += sign * n,
            }
        }

        RollOutcome { total, dice }
    }
}

fn parse_term(term: &str) -> Result<Term, DiceError> {
    let invalid = || DiceError::InvalidTerm(term.to_string());
    if term.is_empty() {
        return Err(invalid());
    }

    match term.find(['d', 'D']) {
        Some(pos) => {
            let (count, sides) = (&term[..pos], &term[pos + 1..]);
            let count = if count.is_empty() {
                1
            } else {
                parse_digits(count).ok_or_else(invalid)?
            };
            let sides = parse_digits(sides).ok_or_else(invalid)?;

            if count == 0 {
                return Err(invalid());
            }
            if count > u64::from(MAX_DICE_PER_TERM) {
                return Err(DiceError::TooManyDice);
            }
            if sides < u64::from(MIN_SIDES) || sides > u64::from(MAX_SIDES) {
                return Err(DiceError::InvalidSides);
            }
            Ok(Term::Dice {
                count: count as u32,
                sides: sides as u32,
            })
        }
        None => {
            let n = parse_digits(term).ok_or_else(invalid)?;
            if n > MAX_MODIFIER as u64 {
                return Err(invalid());
            }
            Ok(Term::Constant(n as i64))
        }
    }
}

/// Parse a run of ASCII digits, rejecting signs and overflow.
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse and roll an expression using the thread-local generator.
///
/// # Examples
///
/// ```
/// let outcome = agora::dice::roll("2d6+3").unwrap();
/// assert!((5..=15).contains(&outcome.total));
/// assert_eq!(outcome.dice.len(), 2);
/// ```
pub fn roll(expression: &str) -> Result<RollOutcome, DiceError> {
    let parsed = DiceExpression::parse(expression)?;
    Ok(parsed.roll_with(&mut rand::rng()))
}

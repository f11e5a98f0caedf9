//! Human-readable sequential record codes.
//!
//! A code is a two-letter category prefix followed by a zero-padded ordinal:
//! `IN001` (income), `EX001` (expense), `DE001` (deposit). Income and expense
//! codes are independent sequences; deposits share one sequence regardless of
//! currency.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{EngineError, TransactionDirection};

/// Minimum width of the numeric part.
const ORDINAL_WIDTH: usize = 3;

/// The unit over which a code sequence is scoped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeCategory {
    Income,
    Expense,
    Deposit,
}

impl CodeCategory {
    pub const ALL: [CodeCategory; 3] = [Self::Income, Self::Expense, Self::Deposit];

    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Income => "IN",
            Self::Expense => "EX",
            Self::Deposit => "DE",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Deposit => "deposit",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.prefix() == prefix)
    }
}

impl From<TransactionDirection> for CodeCategory {
    fn from(direction: TransactionDirection) -> Self {
        match direction {
            TransactionDirection::Income => Self::Income,
            TransactionDirection::Expense => Self::Expense,
        }
    }
}

/// A parsed record code.
///
/// # Examples
///
/// ```rust
/// use engine::{Code, CodeCategory};
///
/// let code: Code = "IN007".parse().unwrap();
/// assert_eq!(code.category(), CodeCategory::Income);
/// assert_eq!(code.ordinal(), 7);
/// assert_eq!(code.next().to_string(), "IN008");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Code {
    category: CodeCategory,
    ordinal: u64,
}

impl Code {
    /// The first code of a category (`IN001`, `EX001`, `DE001`).
    #[must_use]
    pub const fn first(category: CodeCategory) -> Self {
        Self {
            category,
            ordinal: 1,
        }
    }

    pub(crate) fn new(category: CodeCategory, ordinal: u64) -> Result<Self, EngineError> {
        if ordinal == 0 {
            return Err(EngineError::InvalidCode(format!(
                "{}000 is not a valid code",
                category.prefix()
            )));
        }
        Ok(Self { category, ordinal })
    }

    #[must_use]
    pub const fn category(self) -> CodeCategory {
        self.category
    }

    #[must_use]
    pub const fn ordinal(self) -> u64 {
        self.ordinal
    }

    /// The code following this one in the same category.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            category: self.category,
            ordinal: self.ordinal + 1,
        }
    }

    /// Derives the next code of `category` from the greatest code stored in
    /// it, or `{PREFIX}001` when the category is empty.
    ///
    /// `last` is the raw stored value: a suffix that does not parse is
    /// reported instead of producing a bogus code.
    pub fn next_after(category: CodeCategory, last: Option<&str>) -> Result<Self, EngineError> {
        let Some(last) = last else {
            return Ok(Self::first(category));
        };
        let last = Code::parse_in(last, category)?;
        Ok(last.next())
    }

    /// Parses `value` and checks it belongs to `category`.
    pub fn parse_in(value: &str, category: CodeCategory) -> Result<Self, EngineError> {
        let code: Code = value.parse()?;
        if code.category != category {
            return Err(EngineError::InvalidCode(format!(
                "{value} does not start with {}",
                category.prefix()
            )));
        }
        Ok(code)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.category.prefix(),
            self.ordinal,
            width = ORDINAL_WIDTH
        )
    }
}

impl FromStr for Code {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidCode(format!("malformed code: {s}"));

        let trimmed = s.trim();
        let (prefix, digits) = trimmed
            .split_at_checked(2)
            .ok_or_else(invalid)?;
        let category = CodeCategory::from_prefix(prefix).ok_or_else(invalid)?;
        if digits.len() < ORDINAL_WIDTH || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let ordinal: u64 = digits.parse().map_err(|_| invalid())?;
        Code::new(category, ordinal)
    }
}

impl Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

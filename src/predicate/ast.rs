//! Compiled predicate representation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::{CollectionAllocErr, SmallVec};

use crate::error::{OperatorKind, PredicateError, Result};

/// Inline capacity of the term sequences; longer predicates spill to the heap
pub const INLINE_TERMS: usize = 4;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Less than (<)
    #[serde(rename = "<")]
    Less,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    LessEqual,
    /// Greater than (>)
    #[serde(rename = ">")]
    Greater,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Equal (==)
    #[serde(rename = "==")]
    Equal,
    /// Not equal (!=)
    #[serde(rename = "!=")]
    NotEqual,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 6] = [
        ComparisonOperator::Less,
        ComparisonOperator::LessEqual,
        ComparisonOperator::Greater,
        ComparisonOperator::GreaterEqual,
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
    ];

    /// Resolve a 1-2 character operator token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(ComparisonOperator::Less),
            "<=" => Some(ComparisonOperator::LessEqual),
            ">" => Some(ComparisonOperator::Greater),
            ">=" => Some(ComparisonOperator::GreaterEqual),
            "==" => Some(ComparisonOperator::Equal),
            "!=" => Some(ComparisonOperator::NotEqual),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterEqual => ">=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
        }
    }

    /// Apply the comparison as `lhs <op> rhs`
    #[inline]
    pub fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            ComparisonOperator::Less => lhs < rhs,
            ComparisonOperator::LessEqual => lhs <= rhs,
            ComparisonOperator::Greater => lhs > rhs,
            ComparisonOperator::GreaterEqual => lhs >= rhs,
            ComparisonOperator::Equal => lhs == rhs,
            ComparisonOperator::NotEqual => lhs != rhs,
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_token(s).ok_or_else(|| PredicateError::UnrecognizedOperator {
            kind: OperatorKind::Comparison,
            token: s.to_string(),
        })
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Logic connectors between comparison results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOperator {
    And,
    Or,
}

impl LogicOperator {
    pub fn name(self) -> &'static str {
        match self {
            LogicOperator::And => "AND",
            LogicOperator::Or => "OR",
        }
    }

    #[inline]
    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            LogicOperator::And => lhs && rhs,
            LogicOperator::Or => lhs || rhs,
        }
    }
}

/// Accepts the canonical names `AND` and `OR` only, the same spelling serde
/// uses for config files. Which tokens appear in predicate text is decided
/// by the parser's token table, not by this impl.
impl FromStr for LogicOperator {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AND" => Ok(LogicOperator::And),
            "OR" => Ok(LogicOperator::Or),
            _ => Err(PredicateError::UnrecognizedOperator {
                kind: OperatorKind::Logic,
                token: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A compiled predicate over one integer input.
///
/// `comparisons[i]` is applied against `numbers[i]`; `logic[i]` joins the
/// running result with term `i + 1`. There is always at least one term and
/// exactly one fewer logic operator than terms. The three sequences are only
/// ever built and dropped together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPredicate", into = "RawPredicate")]
pub struct Predicate {
    comparisons: SmallVec<[ComparisonOperator; INLINE_TERMS]>,
    numbers: SmallVec<[i64; INLINE_TERMS]>,
    logic: SmallVec<[LogicOperator; INLINE_TERMS]>,
}

impl Predicate {
    /// Build a predicate from its parallel sequences, checking their lengths
    pub fn from_parts(
        comparisons: impl IntoIterator<Item = ComparisonOperator>,
        numbers: impl IntoIterator<Item = i64>,
        logic: impl IntoIterator<Item = LogicOperator>,
    ) -> Result<Self> {
        Self {
            comparisons: comparisons.into_iter().collect(),
            numbers: numbers.into_iter().collect(),
            logic: logic.into_iter().collect(),
        }
        .validated()
    }

    fn validated(self) -> Result<Self> {
        let count_cmp = self.comparisons.len();
        if count_cmp == 0 {
            return Err(PredicateError::syntax("predicate needs at least one comparison"));
        }
        if self.numbers.len() != count_cmp {
            return Err(PredicateError::syntax(format!(
                "{} comparisons but {} numbers",
                count_cmp,
                self.numbers.len()
            )));
        }
        if self.logic.len() + 1 != count_cmp {
            return Err(PredicateError::syntax(format!(
                "{} comparisons need {} logic operators, found {}",
                count_cmp,
                count_cmp - 1,
                self.logic.len()
            )));
        }

        Ok(self)
    }

    /// Assemble the parser's output.
    ///
    /// `terms` arrive rightmost group first and are written back in source
    /// order; `logic` is already in source order. Storage is reserved up
    /// front so an allocation failure surfaces as an error.
    pub(crate) fn assemble(
        terms: Vec<(ComparisonOperator, i64)>,
        logic: Vec<LogicOperator>,
    ) -> Result<Self> {
        let count_cmp = terms.len();
        let alloc_err = |_: CollectionAllocErr| PredicateError::Allocation {
            requested: count_cmp,
        };

        let mut predicate = Self {
            comparisons: SmallVec::new(),
            numbers: SmallVec::new(),
            logic: SmallVec::new(),
        };
        predicate
            .comparisons
            .try_reserve_exact(count_cmp)
            .map_err(alloc_err)?;
        predicate.numbers.try_reserve_exact(count_cmp).map_err(alloc_err)?;
        predicate
            .logic
            .try_reserve_exact(logic.len())
            .map_err(alloc_err)?;

        for (op, number) in terms.into_iter().rev() {
            predicate.comparisons.push(op);
            predicate.numbers.push(number);
        }
        predicate.logic.extend(logic);

        predicate.validated()
    }

    /// Number of comparisons
    #[inline]
    pub fn count_cmp(&self) -> usize {
        self.comparisons.len()
    }

    pub fn comparisons(&self) -> &[ComparisonOperator] {
        &self.comparisons
    }

    pub fn numbers(&self) -> &[i64] {
        &self.numbers
    }

    pub fn logic(&self) -> &[LogicOperator] {
        &self.logic
    }

    /// Iterate `(operator, number)` pairs in source order
    pub fn terms(&self) -> impl Iterator<Item = (ComparisonOperator, i64)> + '_ {
        self.comparisons
            .iter()
            .copied()
            .zip(self.numbers.iter().copied())
    }
}

/// Canonical text form, e.g. `(n > 5) AND (n < 10)`.
///
/// Connectors are always written as `AND`/`OR`, so the output only parses
/// back under a token table that contains those two spellings (the default
/// one does). A predicate compiled with custom tokens such as `ET`/`OU`
/// prints text its own parser rejects.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (op, number)) in self.terms().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.logic[i - 1])?;
            }
            write!(f, "(n {} {})", op, number)?;
        }
        Ok(())
    }
}

/// Unvalidated serde shape of a predicate
#[derive(Serialize, Deserialize)]
struct RawPredicate {
    comparisons: Vec<ComparisonOperator>,
    numbers: Vec<i64>,
    #[serde(default)]
    logic: Vec<LogicOperator>,
}

impl TryFrom<RawPredicate> for Predicate {
    type Error = PredicateError;

    fn try_from(raw: RawPredicate) -> Result<Self> {
        Predicate::from_parts(raw.comparisons, raw.numbers, raw.logic)
    }
}

impl From<Predicate> for RawPredicate {
    fn from(predicate: Predicate) -> Self {
        RawPredicate {
            comparisons: predicate.comparisons.into_vec(),
            numbers: predicate.numbers.into_vec(),
            logic: predicate.logic.into_vec(),
        }
    }
}

//! Error types for query parsing.

use thiserror::Error;

/// Classified cause of a rejected query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A character outside the query language.
    #[error("unexpected character {found:?} at byte {at}")]
    UnexpectedChar { found: char, at: usize },

    /// A quoted string with no closing quote.
    #[error("unterminated string literal starting at byte {at}")]
    UnterminatedString { at: usize },

    /// Token stream violates the grammar.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Lookup on a field outside the configured whitelist.
    #[error("querying on field '{0}' is not allowed")]
    FieldNotAllowed(String),

    /// Operator with no predicate mapping. Unreachable through the
    /// grammar; kept as a guard on the mapping table.
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),
}

/// Single error surface returned by [`crate::QueryParser::parse`].
///
/// Wraps the specific [`QueryError`] so callers handle one type while
/// still being able to match on the cause via [`InvalidQueryError::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid query: {kind}")]
pub struct InvalidQueryError {
    #[from]
    kind: QueryError,
}

impl InvalidQueryError {
    /// The classified cause of the rejection.
    pub fn kind(&self) -> &QueryError {
        &self.kind
    }
}

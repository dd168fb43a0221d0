//! Compact boolean query language for building filter expression trees.
//!
//! Syntax:
//!   field:value             - exact match
//!   field:=value            - exact match (explicit form)
//!   field~="needle"         - case-insensitive containment
//!   field!=value            - negated exact match
//!   field>n, field>=n, ...  - ordered comparison (also < and <=)
//!   expr AND expr           - conjunction (binds tighter than OR)
//!   expr OR expr            - disjunction
//!   (expr)                  - grouping
//!
//! Values may be double-quoted strings (with `\n`/`\t` escapes),
//! signed numbers, the literals `true`/`false`/`null`, or bare words.
//! Parsing produces a [`FilterExpr`] tree that callers fold into their
//! own backend predicate (an ORM filter, an in-memory matcher, a
//! search clause). Field names can be restricted to a whitelist so
//! user-supplied queries cannot probe arbitrary columns.

mod ast;
mod error;
mod filter;
mod lexer;
mod parser;

pub use ast::{FilterExpr, Predicate, PredicateKind, Value};
pub use error::{InvalidQueryError, QueryError};

use std::collections::HashSet;

/// Parses query strings into [`FilterExpr`] trees.
///
/// Holds only the optional field whitelist; parsing itself touches no
/// mutable state, so a single parser can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    allowed_fields: Option<HashSet<String>>,
}

impl QueryParser {
    /// Parser with no field restriction.
    pub fn new() -> Self {
        QueryParser {
            allowed_fields: None,
        }
    }

    /// Parser restricted to the given field names.
    ///
    /// An empty whitelist rejects every lookup; use
    /// [`QueryParser::new`] for no restriction.
    pub fn with_allowed_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryParser {
            allowed_fields: Some(fields.into_iter().map(Into::into).collect()),
        }
    }

    /// Parse a query string into a filter expression tree.
    ///
    /// An empty string yields [`FilterExpr::MatchAll`] without touching
    /// the tokenizer. Every lexical, grammatical, or whitelist failure
    /// is reported as an [`InvalidQueryError`].
    pub fn parse(&self, query: &str) -> Result<FilterExpr, InvalidQueryError> {
        if query.is_empty() {
            return Ok(FilterExpr::MatchAll);
        }

        let node = parser::parse_query(query)?;
        let filter = filter::build_filter(node, self.allowed_fields.as_ref())?;
        tracing::debug!("Parsed query '{}' into {}", query, filter);
        Ok(filter)
    }
}

/// Parse a query with no field restriction. Shorthand for one-off
/// calls; construct a [`QueryParser`] to configure a whitelist.
pub fn parse(query: &str) -> Result<FilterExpr, InvalidQueryError> {
    QueryParser::new().parse(query)
}

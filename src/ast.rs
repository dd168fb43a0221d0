//! Tree types for the query language.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Intermediate parse tree built by the parser and consumed by the
/// filter builder. Never exposed to callers.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParseNode {
    /// OR-joined children: `a:1 OR b:2`
    Or(Vec<ParseNode>),

    /// AND-joined children: `a:1 AND b:2`
    And(Vec<ParseNode>),

    /// A single `field operator value` triple, still raw text.
    Lookup {
        field: String,
        operator: String,
        value: String,
    },
}

/// A typed literal produced by value coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Null => write!(f, "null"),
        }
    }
}

/// Comparison kind of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredicateKind {
    /// Exact equality (`:` or `:=`)
    Exact,
    /// Case-insensitive containment (`~=`)
    IContains,
    /// Greater than (`>`)
    Gt,
    /// Less than (`<`)
    Lt,
    /// Greater than or equal (`>=`)
    Gte,
    /// Less than or equal (`<=`)
    Lte,
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateKind::Exact => write!(f, ":"),
            PredicateKind::IContains => write!(f, "~="),
            PredicateKind::Gt => write!(f, ">"),
            PredicateKind::Lt => write!(f, "<"),
            PredicateKind::Gte => write!(f, ">="),
            PredicateKind::Lte => write!(f, "<="),
        }
    }
}

/// A single field/operator/value comparison leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub kind: PredicateKind,
    pub value: Value,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.kind, self.value)
    }
}

/// Filter expression tree returned to callers.
///
/// A backend adapter folds this into its own combinator semantics:
/// `Predicate` leaves become native comparisons, `And`/`Or`/`Not`
/// become the backend's conjunction/disjunction/negation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    /// Neutral always-true expression (empty query).
    MatchAll,

    /// Single comparison leaf.
    Predicate(Predicate),

    /// Conjunction of two or more expressions.
    And(Vec<FilterExpr>),

    /// Disjunction of two or more expressions.
    Or(Vec<FilterExpr>),

    /// Negation of a single expression.
    Not(Box<FilterExpr>),
}

impl FilterExpr {
    /// True if this is the neutral expression matching everything.
    pub fn is_match_all(&self) -> bool {
        matches!(self, FilterExpr::MatchAll)
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::MatchAll => write!(f, "*"),
            FilterExpr::Predicate(pred) => write!(f, "{pred}"),
            FilterExpr::And(children) => write_joined(f, children, " AND "),
            FilterExpr::Or(children) => write_joined(f, children, " OR "),
            FilterExpr::Not(inner) => match inner.as_ref() {
                FilterExpr::And(_) | FilterExpr::Or(_) => write!(f, "NOT ({inner})"),
                other => write!(f, "NOT {other}"),
            },
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    children: &[FilterExpr],
    separator: &str,
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        match child {
            FilterExpr::And(_) | FilterExpr::Or(_) => write!(f, "({child})")?,
            other => write!(f, "{other}")?,
        }
    }
    Ok(())
}

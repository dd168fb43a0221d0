//! Filter builder: lowers a parse tree into a [`FilterExpr`].

use std::collections::HashSet;

use crate::ast::{FilterExpr, ParseNode, Predicate, PredicateKind, Value};
use crate::error::QueryError;

/// Build a filter expression from a parse tree, enforcing the field
/// whitelist. `None` allows every field; an empty set allows none.
pub(crate) fn build_filter(
    node: ParseNode,
    allowed_fields: Option<&HashSet<String>>,
) -> Result<FilterExpr, QueryError> {
    match node {
        ParseNode::And(children) => {
            let parts = build_children(children, allowed_fields)?;
            Ok(combine(parts, FilterExpr::And))
        }
        ParseNode::Or(children) => {
            let parts = build_children(children, allowed_fields)?;
            Ok(combine(parts, FilterExpr::Or))
        }
        ParseNode::Lookup {
            field,
            operator,
            value,
        } => build_lookup(field, &operator, &value, allowed_fields),
    }
}

fn build_children(
    children: Vec<ParseNode>,
    allowed_fields: Option<&HashSet<String>>,
) -> Result<Vec<FilterExpr>, QueryError> {
    children
        .into_iter()
        .map(|child| build_filter(child, allowed_fields))
        .collect()
}

/// Collapse a reduced child list: empty lists become the match-all
/// neutral expression, single children stand alone.
fn combine(mut parts: Vec<FilterExpr>, wrap: fn(Vec<FilterExpr>) -> FilterExpr) -> FilterExpr {
    match parts.len() {
        0 => FilterExpr::MatchAll,
        1 => parts.remove(0),
        _ => wrap(parts),
    }
}

fn build_lookup(
    field: String,
    operator: &str,
    raw_value: &str,
    allowed_fields: Option<&HashSet<String>>,
) -> Result<FilterExpr, QueryError> {
    if let Some(allowed) = allowed_fields {
        if !allowed.contains(&field) {
            return Err(QueryError::FieldNotAllowed(field));
        }
    }

    let value = coerce_value(raw_value);

    // Exclusion negates exact equality; no other operator negates.
    if operator == "!=" {
        return Ok(FilterExpr::Not(Box::new(FilterExpr::Predicate(
            Predicate {
                field,
                kind: PredicateKind::Exact,
                value,
            },
        ))));
    }

    let kind = match operator {
        ":" | ":=" => PredicateKind::Exact,
        "~=" => PredicateKind::IContains,
        ">" => PredicateKind::Gt,
        "<" => PredicateKind::Lt,
        ">=" => PredicateKind::Gte,
        "<=" => PredicateKind::Lte,
        other => return Err(QueryError::UnsupportedOperator(other.to_string())),
    };

    Ok(FilterExpr::Predicate(Predicate { field, kind, value }))
}

/// Convert raw value text into a typed literal.
///
/// Quoted text is authoritative and always stays a string. Bare text
/// is tried as a boolean, null, integer, then float before falling
/// back to a string; `123` becomes an integer while `"123"` does not.
pub(crate) fn coerce_value(raw: &str) -> Value {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Value::String(unescape(&raw[1..raw.len() - 1]));
    }

    if raw.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }

    if let Ok(n) = raw.parse::<i64>() {
        return Value::Integer(n);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return Value::Float(x);
    }

    Value::String(unescape(raw))
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\t", "\t")
}

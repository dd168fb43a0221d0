//! Recursive descent parser for the query grammar.
//!
//! Grammar (in rough EBNF):
//!
//! query      = or_expr
//! or_expr    = and_expr (OR and_expr)*
//! and_expr   = comparison (AND comparison)*
//! comparison = lookup | "(" or_expr ")"
//! lookup     = FIELD OPERATOR VALUE
//!
//! AND binds tighter than OR; parentheses override both.

use crate::ast::ParseNode;
use crate::error::QueryError;
use crate::lexer::{Token, tokenize};

/// Nesting guard for parenthesized groups. Deeper queries are rejected
/// instead of overflowing the stack.
const MAX_GROUP_DEPTH: usize = 128;

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    /// Parse OR expression: and_expr (OR and_expr)*
    fn parse_or_expr(&mut self) -> Result<ParseNode, QueryError> {
        let mut parts = vec![self.parse_and_expr()?];

        while matches!(self.peek(), Token::Or) {
            self.advance();
            parts.push(self.parse_and_expr()?);
        }

        Ok(match parts.len() {
            1 => parts.remove(0),
            _ => ParseNode::Or(parts),
        })
    }

    /// Parse AND expression: comparison (AND comparison)*
    fn parse_and_expr(&mut self) -> Result<ParseNode, QueryError> {
        let mut parts = vec![self.parse_comparison()?];

        while matches!(self.peek(), Token::And) {
            self.advance();
            parts.push(self.parse_comparison()?);
        }

        Ok(match parts.len() {
            1 => parts.remove(0),
            _ => ParseNode::And(parts),
        })
    }

    /// Parse comparison: lookup | "(" or_expr ")"
    fn parse_comparison(&mut self) -> Result<ParseNode, QueryError> {
        match self.peek() {
            Token::LParen => {
                self.advance();
                self.depth += 1;
                if self.depth > MAX_GROUP_DEPTH {
                    return Err(QueryError::Syntax(
                        "parenthesized groups nested too deeply".into(),
                    ));
                }
                let inner = self.parse_or_expr()?;
                match self.advance() {
                    Token::RParen => {}
                    other => {
                        return Err(QueryError::Syntax(format!(
                            "expected ')', got {}",
                            describe(&other)
                        )));
                    }
                }
                self.depth -= 1;
                Ok(inner)
            }
            Token::Field(_) => self.parse_lookup(),
            other => Err(QueryError::Syntax(format!(
                "expected a lookup or group, got {}",
                describe(other)
            ))),
        }
    }

    /// Parse lookup: FIELD OPERATOR VALUE
    fn parse_lookup(&mut self) -> Result<ParseNode, QueryError> {
        let field = match self.advance() {
            Token::Field(name) => name,
            other => {
                return Err(QueryError::Syntax(format!(
                    "expected a field name, got {}",
                    describe(&other)
                )));
            }
        };

        let operator = match self.advance() {
            Token::Operator(op) => op,
            other => {
                return Err(QueryError::Syntax(format!(
                    "expected a comparison operator after '{field}', got {}",
                    describe(&other)
                )));
            }
        };

        let value = match self.advance() {
            Token::Value(text) => text,
            other => {
                return Err(QueryError::Syntax(format!(
                    "expected a value after '{field}{operator}', got {}",
                    describe(&other)
                )));
            }
        };

        Ok(ParseNode::Lookup {
            field,
            operator,
            value,
        })
    }
}

/// Human-readable token description for syntax errors.
fn describe(token: &Token) -> String {
    match token {
        Token::And => "'AND'".to_string(),
        Token::Or => "'OR'".to_string(),
        Token::Field(name) => format!("field '{name}'"),
        Token::Operator(op) => format!("operator '{op}'"),
        Token::Value(text) => format!("value '{text}'"),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Eof => "end of query".to_string(),
    }
}

/// Parse a query string into a [`ParseNode`] tree.
pub(crate) fn parse_query(input: &str) -> Result<ParseNode, QueryError> {
    let tokens = tokenize(input)?;
    tracing::trace!("Tokenized query into {} tokens", tokens.len() - 1);

    let mut parser = Parser::new(tokens);
    let node = parser.parse_or_expr()?;

    // Ensure we consumed all tokens
    if !matches!(parser.peek(), Token::Eof) {
        return Err(QueryError::Syntax(format!(
            "unexpected {} after end of expression",
            describe(parser.peek())
        )));
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(field: &str, operator: &str, value: &str) -> ParseNode {
        ParseNode::Lookup {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_single_lookup() {
        let node = parse_query("status:active").unwrap();
        assert_eq!(node, lookup("status", ":", "active"));
    }

    #[test]
    fn test_and_chain_is_nary() {
        let node = parse_query("a:1 AND b:2 AND c:3").unwrap();
        assert_eq!(
            node,
            ParseNode::And(vec![
                lookup("a", ":", "1"),
                lookup("b", ":", "2"),
                lookup("c", ":", "3"),
            ])
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let node = parse_query("a:1 AND b:2 OR c:3").unwrap();
        assert_eq!(
            node,
            ParseNode::Or(vec![
                ParseNode::And(vec![lookup("a", ":", "1"), lookup("b", ":", "2")]),
                lookup("c", ":", "3"),
            ])
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let node = parse_query("(a:1 OR b:2) AND c:3").unwrap();
        assert_eq!(
            node,
            ParseNode::And(vec![
                ParseNode::Or(vec![lookup("a", ":", "1"), lookup("b", ":", "2")]),
                lookup("c", ":", "3"),
            ])
        );
    }

    #[test]
    fn test_trailing_keyword() {
        let err = parse_query("status:active AND").unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
    }

    #[test]
    fn test_unmatched_parenthesis() {
        let err = parse_query("(status:active").unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
    }

    #[test]
    fn test_two_fields_in_a_row() {
        let err = parse_query("status active").unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
    }

    #[test]
    fn test_missing_value() {
        let err = parse_query("status:").unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
    }

    #[test]
    fn test_trailing_lookup_without_keyword() {
        let err = parse_query("a:1 b:2").unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
    }

    #[test]
    fn test_reserved_keyword_as_field() {
        let err = parse_query("and:1").unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
    }

    #[test]
    fn test_nesting_within_cap() {
        let query = format!("{}a:1{}", "(".repeat(100), ")".repeat(100));
        assert!(parse_query(&query).is_ok());
    }

    #[test]
    fn test_nesting_beyond_cap() {
        let query = format!("{}a:1{}", "(".repeat(200), ")".repeat(200));
        let err = parse_query(&query).unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
    }
}

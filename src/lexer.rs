//! Lexer/tokenizer for the query language.

use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, not, opt};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::error::QueryError;

/// Token types for the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    // Logical keywords
    And,
    Or,

    // Lookup components
    Field(String),
    Operator(String),
    Value(String),

    // Grouping
    LParen,
    RParen,

    // End of input
    Eof,
}

// Local result alias over winnow's error machinery.
type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Raw lexeme before contextual classification into a [`Token`].
#[derive(Clone)]
enum RawToken {
    Op(&'static str),
    Word(String),
    Number(String),
    Quoted(String),
    LParen,
    RParen,
    Eof,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lex a comparison operator, longest match first.
fn lex_operator(input: &mut &str) -> PResult<RawToken> {
    alt((
        ">=".value(RawToken::Op(">=")),
        "<=".value(RawToken::Op("<=")),
        ":=".value(RawToken::Op(":=")),
        "~=".value(RawToken::Op("~=")),
        "!=".value(RawToken::Op("!=")),
        ">".value(RawToken::Op(">")),
        "<".value(RawToken::Op("<")),
        ":".value(RawToken::Op(":")),
    ))
    .parse_next(input)
}

/// Lex a double-quoted string. The raw text keeps the surrounding
/// quotes and any escape sequences; value coercion unwraps them.
fn lex_quoted(input: &mut &str) -> PResult<RawToken> {
    '"'.parse_next(input)?;
    let mut text = String::from('"');
    loop {
        let c = any.parse_next(input)?;
        text.push(c);
        match c {
            '"' => return Ok(RawToken::Quoted(text)),
            '\\' => {
                let escaped = any.parse_next(input)?;
                text.push(escaped);
            }
            _ => {}
        }
    }
}

/// Lex a number (optionally signed integer or decimal). Rejected when
/// immediately followed by a word character, so `2fast` stays a word.
fn lex_number(input: &mut &str) -> PResult<RawToken> {
    let text = (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .parse_next(input)?;
    not(one_of(is_word_char)).parse_next(input)?;
    Ok(RawToken::Number(text.to_string()))
}

/// Lex a word run (field name, keyword, or unquoted value).
fn lex_word(input: &mut &str) -> PResult<RawToken> {
    let text = take_while(1.., is_word_char).parse_next(input)?;
    Ok(RawToken::Word(text.to_string()))
}

/// Lex a single raw token.
fn lex_token(input: &mut &str) -> PResult<RawToken> {
    multispace0.parse_next(input)?;

    if input.is_empty() {
        return Ok(RawToken::Eof);
    }

    alt((
        "(".value(RawToken::LParen),
        ")".value(RawToken::RParen),
        lex_operator,
        lex_quoted,
        lex_number,
        lex_word,
    ))
    .parse_next(input)
}

/// Classify a raw lexeme using one token of context. Quoted strings
/// and numbers are always values; a word directly after an operator
/// is a value, anywhere else it is a keyword or a field name.
fn classify(raw: RawToken, prev: Option<&Token>) -> Token {
    match raw {
        RawToken::LParen => Token::LParen,
        RawToken::RParen => Token::RParen,
        RawToken::Op(op) => Token::Operator(op.to_string()),
        RawToken::Quoted(text) | RawToken::Number(text) => Token::Value(text),
        RawToken::Word(text) => {
            if matches!(prev, Some(Token::Operator(_))) {
                Token::Value(text)
            } else if text.eq_ignore_ascii_case("and") {
                Token::And
            } else if text.eq_ignore_ascii_case("or") {
                Token::Or
            } else {
                Token::Field(text)
            }
        }
        RawToken::Eof => Token::Eof,
    }
}

/// Tokenize the entire input.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        match lex_token(&mut remaining) {
            Ok(RawToken::Eof) => break,
            Ok(raw) => {
                let token = classify(raw, tokens.last());
                tokens.push(token);
            }
            Err(_) => {
                // lex_token already consumed leading whitespace, so
                // `remaining` points at the offending character.
                let at = input.len() - remaining.len();
                return match remaining.chars().next() {
                    Some('"') => Err(QueryError::UnterminatedString { at }),
                    Some(found) => Err(QueryError::UnexpectedChar { found, at }),
                    None => Err(QueryError::Syntax("unexpected end of input".into())),
                };
            }
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_lookup() {
        let tokens = tokenize("status:active").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Field("status".into()),
                Token::Operator(":".into()),
                Token::Value("active".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_operator_longest_match() {
        let tokens = tokenize("priority>=5").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Field("priority".into()),
                Token::Operator(">=".into()),
                Token::Value("5".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let tokens = tokenize("a:1 AND b:2 or c:3").unwrap();
        assert_eq!(tokens[3], Token::And);
        assert_eq!(tokens[7], Token::Or);
    }

    #[test]
    fn test_keyword_after_operator_is_value() {
        let tokens = tokenize("mode:or").unwrap();
        assert_eq!(tokens[2], Token::Value("or".into()));
    }

    #[test]
    fn test_quoted_value_keeps_raw_text() {
        let tokens = tokenize("name~=\"John Doe\"").unwrap();
        assert_eq!(tokens[2], Token::Value("\"John Doe\"".into()));
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let tokens = tokenize(r#"name:"say \"hi\"""#).unwrap();
        assert_eq!(tokens[2], Token::Value(r#""say \"hi\"""#.into()));
    }

    #[test]
    fn test_negative_decimal() {
        let tokens = tokenize("temperature:-5.5").unwrap();
        assert_eq!(tokens[2], Token::Value("-5.5".into()));
    }

    #[test]
    fn test_digits_glued_to_word_lex_as_word() {
        let tokens = tokenize("speed:2fast").unwrap();
        assert_eq!(tokens[2], Token::Value("2fast".into()));
    }

    #[test]
    fn test_parentheses() {
        let tokens = tokenize("(a:1)").unwrap();
        assert_eq!(tokens[0], Token::LParen);
        assert_eq!(tokens[4], Token::RParen);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("status&active").unwrap_err();
        assert_eq!(err, QueryError::UnexpectedChar { found: '&', at: 6 });
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("name:\"abc").unwrap_err();
        assert_eq!(err, QueryError::UnterminatedString { at: 5 });
    }
}

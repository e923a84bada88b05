//! Lexical layer shared by the AMI and IBIS grammars.
//!
//! Both grammars skip whitespace and `|` comments between tokens, so most
//! token parsers here are lexemes: they consume the token and whatever
//! ignorable text follows it. The IBIS grammar is line sensitive in a few
//! places and uses the `_raw` variants, which stop right after the token.
//!
//! Errors are reported through [`SyntaxError`], which keeps the remaining
//! input at the failure point so the byte offset, line and column can be
//! recovered against the original text.

use crate::error::ParseError;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace1, not_line_ending, one_of, satisfy},
    combinator::{map, opt, recognize, value},
    error::{ContextError, ErrorKind, FromExternalError, ParseError as NomParseError},
    multi::{many0_count, separated_list1},
    sequence::delimited,
    IResult, Parser,
};
use std::fmt;

/// Parser result over `&str` with our error type.
pub type PResult<'a, T> = IResult<&'a str, T, SyntaxError<'a>>;

/// Why a grammar rule failed.
#[derive(Clone, Debug, PartialEq)]
pub enum Reason {
    /// Input did not match; holds a description of what would have.
    Expected(String),
    /// Input matched but was rejected (bad suffix, failed validation).
    Invalid(String),
}

/// Nom error type carrying the failure position and a readable reason.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxError<'a> {
    /// Remaining input at the failure point.
    pub input: &'a str,
    pub reason: Reason,
}

impl<'a> SyntaxError<'a> {
    pub fn expected(input: &'a str, what: impl Into<String>) -> Self {
        Self {
            input,
            reason: Reason::Expected(what.into()),
        }
    }

    pub fn invalid(input: &'a str, message: impl Into<String>) -> Self {
        Self {
            input,
            reason: Reason::Invalid(message.into()),
        }
    }

    /// Resolve against the full source text.
    pub fn into_parse_error(self, source: &str) -> ParseError {
        let offset = source.len().saturating_sub(self.input.len());
        let (line, column) = line_col(source, offset);
        match self.reason {
            Reason::Expected(expected) => ParseError::Expected {
                expected,
                line,
                column,
                context: context_preview(self.input),
            },
            Reason::Invalid(message) => ParseError::syntax(line, column, message),
        }
    }
}

impl fmt::Display for SyntaxError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            Reason::Expected(ref what) => write!(f, "expected {what}"),
            Reason::Invalid(ref msg) => f.write_str(msg),
        }
    }
}

impl<'a> NomParseError<&'a str> for SyntaxError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::expected(input, describe_kind(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: &'a str, c: char) -> Self {
        Self::expected(input, format!("'{c}'"))
    }

    /// Keep whichever branch got further; merge expectations on a tie.
    fn or(self, other: Self) -> Self {
        if other.input.len() < self.input.len() {
            return other;
        }
        if other.input.len() > self.input.len() {
            return self;
        }
        match (self.reason, other.reason) {
            (Reason::Expected(a), Reason::Expected(b)) if a != b => {
                Self::expected(self.input, format!("{a} or {b}"))
            }
            (Reason::Expected(_), reason) => Self {
                input: other.input,
                reason,
            },
            (reason, _) => Self {
                input: self.input,
                reason,
            },
        }
    }
}

impl<'a> ContextError<&'a str> for SyntaxError<'a> {
    /// A context only replaces failures at the very start of the rule;
    /// anything deeper already says more.
    fn add_context(input: &'a str, ctx: &'static str, other: Self) -> Self {
        match other.reason {
            Reason::Expected(_) if other.input.len() == input.len() => Self::expected(input, ctx),
            _ => other,
        }
    }
}

impl<'a, E: fmt::Display> FromExternalError<&'a str, E> for SyntaxError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, e: E) -> Self {
        Self::invalid(input, e.to_string())
    }
}

fn describe_kind(kind: ErrorKind) -> String {
    match kind {
        ErrorKind::Eof => "end of input".to_string(),
        ErrorKind::Digit => "digit".to_string(),
        ErrorKind::Tag => "keyword".to_string(),
        ErrorKind::MultiSpace | ErrorKind::Space => "whitespace".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

/// Convert a top-level nom failure into a [`ParseError`].
pub fn to_parse_error(source: &str, err: nom::Err<SyntaxError<'_>>) -> ParseError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.into_parse_error(source),
        nom::Err::Incomplete(_) => {
            SyntaxError::expected(&source[source.len()..], "more input").into_parse_error(source)
        }
    }
}

/// Shorthand for a recoverable failure.
pub fn fail<'a, T>(input: &'a str, expected: impl Into<String>) -> PResult<'a, T> {
    Err(nom::Err::Error(SyntaxError::expected(input, expected)))
}

/// Shorthand for an unrecoverable failure.
pub fn reject<'a, T>(input: &'a str, message: impl Into<String>) -> PResult<'a, T> {
    Err(nom::Err::Failure(SyntaxError::invalid(input, message)))
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    (line, offset - line_start + 1)
}

const CONTEXT_CHARS: usize = 40;

fn context_preview(rest: &str) -> String {
    let line = rest.lines().next().unwrap_or("");
    if line.trim().is_empty() && rest.trim().is_empty() {
        return "end of input".to_string();
    }
    let mut preview: String = line.chars().take(CONTEXT_CHARS).collect();
    if line.chars().count() > CONTEXT_CHARS {
        preview.push_str("...");
    }
    format!("'{preview}'")
}

// ============================================================================
// Whitespace and comments
// ============================================================================

/// `|` to end of line.
pub fn comment(input: &str) -> PResult<'_, &str> {
    recognize((char('|'), not_line_ending)).parse(input)
}

/// Skip any run of whitespace and comments, including none.
pub fn ignore(input: &str) -> PResult<'_, ()> {
    value((), many0_count(alt((multispace1, comment)))).parse(input)
}

/// Run `parser`, then skip trailing whitespace and comments.
pub fn lexeme<'a, O, P>(mut parser: P) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    P: Parser<&'a str, Output = O, Error = SyntaxError<'a>>,
{
    move |input: &'a str| {
        let (input, out) = parser.parse(input)?;
        let (input, _) = ignore(input)?;
        Ok((input, out))
    }
}

/// True where an AMI token may end.
pub fn at_delimiter(input: &str) -> bool {
    input
        .chars()
        .next()
        .map_or(true, |c| c.is_whitespace() || matches!(c, '(' | ')' | '|'))
}

/// True if only blanks or a comment remain on the current line.
pub fn at_line_end(input: &str) -> bool {
    let rest = input.trim_start_matches(|c: char| c == ' ' || c == '\t');
    rest.is_empty() || rest.starts_with(|c: char| matches!(c, '\n' | '\r' | '|'))
}

// ============================================================================
// AMI tokens
// ============================================================================

/// Lexical units of the AMI grammar.
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    LParen,
    RParen,
    Number(&'a str),
    QuotedString(&'a str),
    Symbol(&'a str),
    Boolean(bool),
}

/// `[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?`, no trailing skip.
pub fn decimal(input: &str) -> PResult<'_, &str> {
    recognize((
        opt(one_of("+-")),
        alt((recognize((digit0, char('.'), digit1)), digit1)),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

/// AMI numeric literal, kept as written.
pub fn ami_number(input: &str) -> PResult<'_, &str> {
    let (rest, text) = decimal(input)?;
    if !at_delimiter(rest) {
        return fail(input, "number");
    }
    let (rest, _) = ignore(rest)?;
    Ok((rest, text))
}

/// `True` or `False`.
pub fn ami_bool(input: &str) -> PResult<'_, bool> {
    let (rest, b) = alt((value(true, tag("True")), value(false, tag("False")))).parse(input)?;
    if !at_delimiter(rest) {
        return fail(input, "boolean");
    }
    let (rest, _) = ignore(rest)?;
    Ok((rest, b))
}

/// Double-quoted string; returns the text between the quotes.
pub fn quoted_string(input: &str) -> PResult<'_, &str> {
    lexeme(delimited(char('"'), take_while(|c: char| c != '"'), char('"'))).parse(input)
}

/// Bare AMI symbol: `[0-9a-zA-Z_][^\s()]*`.
pub fn symbol(input: &str) -> PResult<'_, &str> {
    lexeme(recognize((
        satisfy(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        take_while(|c: char| !c.is_whitespace() && c != '(' && c != ')'),
    )))
    .parse(input)
}

/// Signed integer used as a node name, canonicalized to a tap label:
/// negative positions become `preN`, others `postN`.
pub fn tap_index(input: &str) -> PResult<'_, String> {
    let (rest, text) = recognize((opt(one_of("+-")), digit1)).parse(input)?;
    if !at_delimiter(rest) {
        return fail(input, "tap index");
    }
    let (rest, _) = ignore(rest)?;
    Ok((rest, int_to_tap(text)))
}

/// `-3` -> `pre3`, `5` -> `post5`.
pub fn int_to_tap(text: &str) -> String {
    let text = text.trim();
    match text.strip_prefix('-') {
        Some(digits) => format!("pre{digits}"),
        None => format!("post{}", text.trim_start_matches('+')),
    }
}

/// One AMI token.
pub fn ami_token(input: &str) -> PResult<'_, Token<'_>> {
    alt((
        value(Token::LParen, lexeme(char('('))),
        value(Token::RParen, lexeme(char(')'))),
        map(ami_number, Token::Number),
        map(ami_bool, Token::Boolean),
        map(quoted_string, Token::QuotedString),
        map(symbol, Token::Symbol),
    ))
    .parse(input)
}

/// Split AMI text into tokens, dropping whitespace and comments.
pub fn tokenize_ami(text: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let (mut input, _) = ignore(text).map_err(|e| to_parse_error(text, e))?;
    let mut tokens = Vec::new();
    while !input.is_empty() {
        let (rest, token) = ami_token(input).map_err(|e| to_parse_error(text, e))?;
        tokens.push(token);
        input = rest;
    }
    Ok(tokens)
}

// ============================================================================
// IBIS tokens
// ============================================================================

/// Exponent substituted for each IBIS engineering suffix letter.
pub fn suffix_exponent(c: char) -> Option<&'static str> {
    match c {
        'T' => Some("e12"),
        'G' => Some("e9"),
        'M' => Some("e6"),
        'k' => Some("e3"),
        'm' => Some("e-3"),
        'u' => Some("e-6"),
        'n' => Some("e-9"),
        'p' => Some("e-12"),
        'f' => Some("e-15"),
        _ => None,
    }
}

/// Value of a complete IBIS number token such as `25p` or `10.00nH`.
///
/// The trailing non-digit run, if any, must start with a known suffix
/// letter; the rest of the run (units) is discarded.
pub fn ibis_suffix_value(token: &str) -> Result<f64, String> {
    let mantissa = token.trim_end_matches(|c: char| !c.is_ascii_digit());
    let text = match token[mantissa.len()..].chars().next() {
        None => token.to_string(),
        Some(c) => match suffix_exponent(c) {
            Some(exp) => format!("{mantissa}{exp}"),
            None => {
                return Err(format!(
                    "IBIS numerical suffix, got '{}'",
                    &token[mantissa.len()..]
                ))
            }
        },
    };
    text.parse::<f64>()
        .map_err(|e| format!("number, got '{token}' ({e})"))
}

/// IBIS number, no trailing skip.
pub fn ibis_number_raw(input: &str) -> PResult<'_, f64> {
    let (rest, mantissa) = decimal(input)?;
    let (rest, letters) = take_while(|c: char| c.is_ascii_alphabetic()).parse(rest)?;

    let has_exponent = mantissa.contains(|c: char| c == 'e' || c == 'E');
    let token_len = match letters.chars().next() {
        Some(c) if !has_exponent && suffix_exponent(c).is_some() => mantissa.len() + letters.len(),
        _ => mantissa.len(),
    };

    match ibis_suffix_value(&input[..token_len]) {
        Ok(v) => Ok((rest, v)),
        Err(msg) => Err(nom::Err::Error(SyntaxError::invalid(input, msg))),
    }
}

/// IBIS number as a lexeme.
pub fn ibis_number(input: &str) -> PResult<'_, f64> {
    lexeme(ibis_number_raw).parse(input)
}

/// Parse a standalone IBIS number token, e.g. `"1.5n"`.
pub fn parse_ibis_number(text: &str) -> Result<f64, ParseError> {
    let token = text.trim();
    ibis_suffix_value(token).map_err(|msg| ParseError::invalid_value("IBIS number", msg))
}

/// `NA` or `na`, followed by whitespace or end of input; no trailing skip.
pub fn na_raw(input: &str) -> PResult<'_, ()> {
    let (rest, _) = alt((tag("NA"), tag("na"))).parse(input)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return fail(input, "NA");
    }
    Ok((rest, ()))
}

/// Number, or `NA` as `None`; no trailing skip.
pub fn number_or_na_raw(input: &str) -> PResult<'_, Option<f64>> {
    alt((map(ibis_number_raw, Some), value(None, na_raw))).parse(input)
}

/// Characters allowed in IBIS names.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '(' | ')' | '#' | '-')
}

/// Bare IBIS name, no trailing skip.
pub fn name_only(input: &str) -> PResult<'_, &str> {
    take_while1(is_name_char).parse(input)
}

/// Blanks within a line.
pub fn blanks(input: &str) -> PResult<'_, &str> {
    take_while(|c: char| c == ' ' || c == '\t').parse(input)
}

/// Name that must be followed by whitespace, which is skipped along with
/// any comments.
pub fn ibis_name(input: &str) -> PResult<'_, &str> {
    let (rest, name) = name_only(input)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return fail(input, "name");
    }
    let (rest, _) = ignore(rest)?;
    Ok((rest, name))
}

/// Rest of the current line up to any `|` comment, trimmed, then skip to
/// the next token.
pub fn rest_of_line(input: &str) -> PResult<'_, &str> {
    let (rest, text) =
        lexeme(take_while(|c: char| !matches!(c, '\n' | '\r' | '|'))).parse(input)?;
    Ok((rest, text.trim()))
}

/// `[Keyword Name]`, canonicalized by joining its words with `_` and
/// lowercasing: `[Voltage Range]` gives `voltage_range`.
pub fn ibis_keyword(input: &str) -> PResult<'_, String> {
    let (rest, words) = delimited(
        char('['),
        separated_list1(one_of(" _"), name_only),
        char(']'),
    )
    .parse(input)?;
    let (rest, _) = ignore(rest)?;
    Ok((rest, words.join("_").to_ascii_lowercase()))
}

//! S-expression grammar of `.ami` files.
//!
//! ```text
//! atom      := number | boolean | quoted_string | symbol
//! node_name := tap_index | symbol
//! node      := '(' node_name (node | atom)* ')'
//! root      := '(' node_name node* ')'
//! ```
//!
//! Atoms keep their source text; typing them is left to the parameter
//! model, which knows what each value is supposed to be.

use crate::error::ParseError;
use crate::lexer::{
    ami_bool, ami_number, ignore, lexeme, quoted_string, symbol, tap_index, to_parse_error,
    PResult,
};
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map},
    error::context,
    multi::many0,
    Parser,
};
use serde::Serialize;
use std::fmt;

/// Leaf value of an S-expression.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Atom {
    /// Numeric literal, as written.
    Number(String),
    Bool(bool),
    /// Quoted string, without the quotes.
    Str(String),
    Symbol(String),
}

impl Atom {
    /// Source text of the atom, quotes stripped.
    pub fn text(&self) -> &str {
        match self {
            Atom::Bool(true) => "True",
            Atom::Bool(false) => "False",
            Atom::Number(s) | Atom::Str(s) | Atom::Symbol(s) => s,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Str(s) => write!(f, "\"{s}\""),
            other => f.write_str(other.text()),
        }
    }
}

/// Child of a node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Expr {
    Atom(Atom),
    Node(Node),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(a) => a.fmt(f),
            Expr::Node(n) => n.fmt(f),
        }
    }
}

/// A labelled list: `(name child...)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub children: Vec<Expr>,
}

impl Node {
    pub fn new(name: impl Into<String>, children: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Child nodes, skipping atoms.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|c| match c {
            Expr::Node(n) => Some(n),
            Expr::Atom(_) => None,
        })
    }

    /// Child atoms, skipping nodes.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.children.iter().filter_map(|c| match c {
            Expr::Atom(a) => Some(a),
            Expr::Node(_) => None,
        })
    }

    /// Find a direct child node by name.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes().find(|n| n.name == name)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}

/// Parse the root node of an AMI file.
///
/// Returns the node and whatever text follows it; leading whitespace and
/// comments are skipped.
pub fn parse_sexpr(content: &str) -> Result<(Node, &str), ParseError> {
    let (input, _) = ignore(content).map_err(|e| to_parse_error(content, e))?;
    let (rest, node) = root(input).map_err(|e| to_parse_error(content, e))?;
    Ok((node, rest))
}

/// Parse a single general node, e.g. an `AMI_Init` parameter string.
pub fn parse_node(content: &str) -> Result<(Node, &str), ParseError> {
    let (input, _) = ignore(content).map_err(|e| to_parse_error(content, e))?;
    let (rest, node) = node(input).map_err(|e| to_parse_error(content, e))?;
    Ok((node, rest))
}

// ============================================================================
// Grammar (nom 8)
// ============================================================================

fn atom(input: &str) -> PResult<'_, Atom> {
    alt((
        map(ami_number, |s: &str| Atom::Number(s.to_string())),
        map(ami_bool, Atom::Bool),
        map(quoted_string, |s: &str| Atom::Str(s.to_string())),
        map(symbol, |s: &str| Atom::Symbol(s.to_string())),
    ))
    .parse(input)
}

fn node_name(input: &str) -> PResult<'_, String> {
    alt((tap_index, map(symbol, |s: &str| s.to_string()))).parse(input)
}

fn expr(input: &str) -> PResult<'_, Expr> {
    alt((map(node, Expr::Node), map(atom, Expr::Atom))).parse(input)
}

fn node(input: &str) -> PResult<'_, Node> {
    let (input, _) = lexeme(char('(')).parse(input)?;
    let (input, name) = cut(context("node name", node_name)).parse(input)?;
    let (input, children) = many0(expr).parse(input)?;
    let (input, _) = cut(context("')'", lexeme(char(')')))).parse(input)?;
    Ok((input, Node { name, children }))
}

fn root(input: &str) -> PResult<'_, Node> {
    let (input, _) = context("'('", lexeme(char('('))).parse(input)?;
    let (input, name) = cut(context("root name", node_name)).parse(input)?;
    let (input, children) = many0(map(node, Expr::Node)).parse(input)?;
    let (input, _) = cut(context("')'", lexeme(char(')')))).parse(input)?;
    Ok((input, Node { name, children }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sexpr() {
        let input = "| header comment\n(test (a 1 2.5 \"hello\" True) (nested (b sym)))";
        let (node, rest) = parse_sexpr(input).unwrap();

        assert!(rest.is_empty());
        assert_eq!(node.name, "test");
        assert_eq!(node.children.len(), 2);

        let a = node.find("a").unwrap();
        let atoms: Vec<&Atom> = a.atoms().collect();
        assert_eq!(atoms.len(), 4);
        assert_eq!(atoms[0], &Atom::Number("1".to_string()));
        assert_eq!(atoms[2], &Atom::Str("hello".to_string()));
        assert_eq!(atoms[3], &Atom::Bool(true));

        let nested = node.find("nested").unwrap();
        assert_eq!(nested.find("b").unwrap().atoms().next().unwrap().text(), "sym");
    }

    #[test]
    fn test_tap_node_names() {
        let (node, _) = parse_sexpr("(taps (-2 (Usage In)) (0 (Usage In)) (1 (Usage In)))").unwrap();
        let names: Vec<&str> = node.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["pre2", "post0", "post1"]);
    }

    #[test]
    fn test_display_reparses() {
        let text = "(root (p (Usage In) (Type Integer) (Range 27 6 27) (Description \"x y\")))";
        let (node, _) = parse_sexpr(text).unwrap();
        assert_eq!(node.to_string(), text);

        let (again, _) = parse_sexpr(&node.to_string()).unwrap();
        assert_eq!(again, node);
    }

    #[test]
    fn test_unterminated_node() {
        let err = parse_sexpr("(root\n  (p (Usage In)\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Expected ')'"), "{msg}");
        assert!(msg.contains("end of input"), "{msg}");
    }

    #[test]
    fn test_root_rejects_atoms() {
        assert!(parse_sexpr("(root 42)").is_err());
        assert!(parse_node("(root 42)").is_ok());
    }

    #[test]
    fn test_trailing_text_returned() {
        let (_, rest) = parse_sexpr("(root (a 1))\n(extra)").unwrap();
        assert_eq!(rest, "(extra)");
    }
}

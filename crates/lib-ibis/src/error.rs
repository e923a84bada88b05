//! Error types for parsing operations.

use thiserror::Error;

/// Errors that can occur during file parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// I/O error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input: the grammar expected something else here.
    #[error("Expected {expected} at {line}:{column} in {context}")]
    Expected {
        expected: String,
        line: usize,
        column: usize,
        context: String,
    },

    /// Well-formed input that failed validation inside a grammar rule.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Missing required IBIS keyword.
    #[error("Missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },

    /// Invalid value for a field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ParseError {
    /// Create a syntax error at a specific location.
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a missing keyword error.
    pub fn missing_keyword(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "keyword",
            name: name.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while building a single AMI parameter definition.
///
/// These never abort a whole file: the tree interpreter turns them into
/// diagnostics and carries on with the next branch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("Missing '{0}' tag!")]
    MissingTag(&'static str),

    #[error("Missing both 'Format' and 'Default' tags!")]
    MissingFormat,

    #[error("'Default' may not be used with parameter type 'Out'!")]
    DefaultWithOut,

    #[error("Unrecognized {tag} value: '{value}'.")]
    Unrecognized { tag: &'static str, value: String },

    #[error("No values provided for: '{0}'.")]
    NoValues(String),

    #[error("Couldn't read {kind} from '{text}'.")]
    BadValue { kind: &'static str, text: String },

    #[error("Illegal type, '{0}', for use with Range.")]
    IllegalRangeType(String),

    #[error("Insufficient number of values, {0}, provided for Range.")]
    RangeArity(usize),

    #[error("Tag '{0}' may only hold plain values.")]
    NestedTag(String),

    #[error("Malformed item, '{0}', where a tag was expected.")]
    MalformedItem(String),

    #[error("Problem initializing parameter, '{name}': {source}")]
    Init {
        name: String,
        #[source]
        source: Box<ParamError>,
    },

    #[error("No parameter found at '{0}'.")]
    NotFound(String),

    #[error("'{0}' is a parameter group, not a parameter.")]
    NotAParameter(String),
}

impl ParamError {
    /// Attach the parameter name to an error raised while processing one
    /// of its tags.
    pub fn in_param(self, name: &str) -> Self {
        Self::Init {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type for AMI parameter construction.
pub type ParamResult<T> = Result<T, ParamError>;

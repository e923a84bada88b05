//! AMI (Algorithmic Modeling Interface) value types.
//!
//! These types carry AMI parameter values between the `.ami` parser and
//! whatever drives the model: a configuration layer collecting user
//! selections, the `AMI_Init` parameter string, or a code generator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key under which a flattened parameter set records the model root name.
pub const ROOT_NAME_KEY: &str = "root_name";

/// AMI parameter value types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmiValue {
    /// Boolean value.
    Boolean(bool),

    /// Integer value.
    Integer(i64),

    /// Floating-point value.
    Float(f64),

    /// String value.
    String(String),

    /// List of values.
    List(Vec<AmiValue>),
}

impl AmiValue {
    /// Try to extract as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to extract as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Try to extract as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to extract as a list.
    pub fn as_list(&self) -> Option<&[AmiValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Render as an S-expression value: strings quoted, list items
    /// separated by spaces.
    pub fn to_sexpr(&self) -> String {
        match self {
            Self::String(s) => format!("\"{s}\""),
            Self::List(items) => items
                .iter()
                .map(|v| v.to_sexpr())
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string(),
        }
    }
}

/// Plain-text rendering, strings unquoted.
impl fmt::Display for AmiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(true) => f.write_str("True"),
            Self::Boolean(false) => f.write_str("False"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

fn format_float(v: f64) -> String {
    let mag = v.abs();
    if mag != 0.0 && !(1e-4..1e16).contains(&mag) {
        format!("{v:e}")
    } else {
        format!("{v}")
    }
}

/// A single entry of a flattened parameter set: a value, or a nested
/// group of sub-parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmiSetting {
    Value(AmiValue),
    Group(AmiParameters),
}

/// Ordered collection of AMI parameter values.
///
/// This is the mapping handed to a model's `AMI_Init`: names to values,
/// nested groups kept nested, and (optionally) the model root name under
/// [`ROOT_NAME_KEY`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmiParameters {
    /// Parameter name to value mapping, in file order.
    pub params: IndexMap<String, AmiSetting>,
}

impl AmiParameters {
    /// Create empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&AmiValue> {
        match self.params.get(name) {
            Some(AmiSetting::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Get a nested group by name.
    pub fn group(&self, name: &str) -> Option<&AmiParameters> {
        match self.params.get(name) {
            Some(AmiSetting::Group(g)) => Some(g),
            _ => None,
        }
    }

    /// Set a parameter.
    pub fn set(&mut self, name: impl Into<String>, value: AmiValue) {
        self.params.insert(name.into(), AmiSetting::Value(value));
    }

    /// Set a nested group.
    pub fn set_group(&mut self, name: impl Into<String>, group: AmiParameters) {
        self.params.insert(name.into(), AmiSetting::Group(group));
    }

    /// Check if parameter exists.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AmiSetting)> {
        self.params.iter()
    }

    /// The model root name, if recorded.
    pub fn root_name(&self) -> Option<&str> {
        self.get(ROOT_NAME_KEY).and_then(AmiValue::as_str)
    }

    /// Convert to AMI parameter string format.
    ///
    /// With a root name recorded this is the full `AMI_Init` argument,
    /// `(root (param1 value1)(group (sub value))...)`; without one, just
    /// the space-separated `(name value)` items.
    pub fn to_ami_string(&self) -> String {
        let body = self.items_sexpr();
        match self.root_name() {
            Some(root) => format!("({root} {body})"),
            None => body,
        }
    }

    fn items_sexpr(&self) -> String {
        let mut parts = Vec::new();

        for (name, setting) in &self.params {
            if name == ROOT_NAME_KEY {
                continue;
            }
            let part = match setting {
                AmiSetting::Value(v) => format!("({name} {})", v.to_sexpr()),
                AmiSetting::Group(g) => format!("({name} {})", g.items_sexpr()),
            };
            parts.push(part);
        }

        parts.join("")
    }
}

/// Native parameter kinds used when emitting model source code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParamKind {
    Int,
    Float,
    Tap,
    Bool,
    String,
}

impl ParamKind {
    pub const ALL: [ParamKind; 5] = [
        ParamKind::Int,
        ParamKind::Float,
        ParamKind::Tap,
        ParamKind::Bool,
        ParamKind::String,
    ];

    /// C type of the generated model variable.
    pub fn c_type(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float | Self::Tap => "double",
            Self::Bool => "bool",
            Self::String => "char *",
        }
    }

    /// AMI `Type` tag value.
    pub fn ami_type(&self) -> &'static str {
        match self {
            Self::Int => "Integer",
            Self::Float => "Float",
            Self::Tap => "Tap",
            Self::Bool => "Boolean",
            Self::String => "String",
        }
    }

    /// Name of the C accessor reading this kind out of the parameter tree.
    pub fn getter(&self) -> &'static str {
        match self {
            Self::Int => "get_param_int",
            Self::Float | Self::Tap => "get_param_float",
            Self::Bool => "get_param_bool",
            Self::String => "get_param_str",
        }
    }
}

impl FromStr for ParamKind {
    type Err = AmiTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INT" => Ok(Self::Int),
            "FLOAT" => Ok(Self::Float),
            "TAP" => Ok(Self::Tap),
            "BOOL" => Ok(Self::Bool),
            "STRING" => Ok(Self::String),
            _ => Err(AmiTypeError::UnknownKind(s.to_string())),
        }
    }
}

/// Error converting into an AMI type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AmiTypeError {
    #[error("Unknown parameter kind: {0}")]
    UnknownKind(String),
}

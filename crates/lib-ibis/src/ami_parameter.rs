//! A single AMI parameter definition.
//!
//! An [`AmiParameter`] is built once from the definition tags of a leaf
//! branch, e.g.
//!
//! ```text
//! (tx_tap_units (Usage In) (Type Integer) (Range 27 6 27) (Description "..."))
//! ```
//!
//! and is immutable afterwards, apart from [`AmiParameter::set_value`]
//! for scripted reconfiguration. Construction either yields a fully
//! validated parameter or a [`ParamError`]; problems that don't prevent
//! construction are kept as warnings on the parameter.

use crate::error::{ParamError, ParamResult};
use crate::sexpr::{Expr, Node};
use lib_types::ami::AmiValue;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Direction of a parameter between model and caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Usage {
    In,
    Out,
    InOut,
    Info,
}

impl FromStr for Usage {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In" => Ok(Self::In),
            "Out" => Ok(Self::Out),
            "InOut" => Ok(Self::InOut),
            "Info" => Ok(Self::Info),
            _ => Err(ParamError::Unrecognized {
                tag: "usage",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::In => "In",
            Self::Out => "Out",
            Self::InOut => "InOut",
            Self::Info => "Info",
        })
    }
}

/// Value type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParamType {
    Float,
    Integer,
    String,
    Boolean,
    #[serde(rename = "UI")]
    Ui,
    Tap,
}

impl ParamType {
    /// Float, UI and Tap values are all stored as floats.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Ui | Self::Tap)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_float() || *self == Self::Integer
    }
}

impl FromStr for ParamType {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Float" => Ok(Self::Float),
            "Integer" => Ok(Self::Integer),
            "String" => Ok(Self::String),
            "Boolean" => Ok(Self::Boolean),
            "UI" => Ok(Self::Ui),
            "Tap" => Ok(Self::Tap),
            _ => Err(ParamError::Unrecognized {
                tag: "type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Float => "Float",
            Self::Integer => "Integer",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Ui => "UI",
            Self::Tap => "Tap",
        })
    }
}

/// How the parameter's value(s) are given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Format {
    /// A single value.
    Value,
    /// A value with inclusive bounds.
    Range,
    /// A set of allowed values.
    List,
}

impl FromStr for Format {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Value" => Ok(Self::Value),
            "Range" => Ok(Self::Range),
            "List" | "Corner" => Ok(Self::List),
            _ => Err(ParamError::Unrecognized {
                tag: "format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Value => "Value",
            Self::Range => "Range",
            Self::List => "List",
        })
    }
}

/// Parameter definition tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagKind {
    Usage,
    Type,
    Format,
    Value,
    Range,
    /// `List` and `Corner`.
    List,
    Default,
    Description,
    /// `List_Tip`, `Label` and `Labels`.
    ListTip,
    /// Anything else; ignored.
    Skip,
}

impl TagKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Usage" => Self::Usage,
            "Type" => Self::Type,
            "Format" => Self::Format,
            "Value" => Self::Value,
            "Range" => Self::Range,
            "List" | "Corner" => Self::List,
            "Default" => Self::Default,
            "Description" => Self::Description,
            "List_Tip" | "Label" | "Labels" => Self::ListTip,
            _ => Self::Skip,
        }
    }

    /// Whether `name` is a parameter definition tag.
    pub fn is_param_tag(name: &str) -> bool {
        Self::from_name(name) != Self::Skip
    }
}

/// One `(TagName value...)` entry of a parameter definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub name: String,
    pub values: Vec<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn first(&self) -> ParamResult<&str> {
        self.values
            .first()
            .map(String::as_str)
            .ok_or_else(|| ParamError::NoValues(self.name.clone()))
    }
}

impl TryFrom<&Node> for Tag {
    type Error = ParamError;

    fn try_from(node: &Node) -> Result<Self, Self::Error> {
        let values = node
            .children
            .iter()
            .map(|child| match child {
                Expr::Atom(a) => Ok(a.text().to_string()),
                Expr::Node(_) => Err(ParamError::NestedTag(node.name.clone())),
            })
            .collect::<ParamResult<Vec<_>>>()?;
        Ok(Self {
            name: node.name.clone(),
            values,
        })
    }
}

/// List-format choices, as a selector would present them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListChoices {
    pub labels: Vec<String>,
    pub values: Vec<AmiValue>,
    /// Index of the default, or 0.
    pub selected: usize,
}

impl ListChoices {
    pub fn selected_label(&self) -> Option<&str> {
        self.labels.get(self.selected).map(String::as_str)
    }
}

/// A validated AMI parameter definition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AmiParameter {
    name: String,
    usage: Usage,
    #[serde(rename = "type")]
    ptype: ParamType,
    format: Format,
    value: AmiValue,
    min: Option<AmiValue>,
    max: Option<AmiValue>,
    default: Option<AmiValue>,
    description: String,
    list_tip: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl AmiParameter {
    /// Build a parameter from its definition tags.
    pub fn new(name: &str, tags: &[Tag]) -> ParamResult<Self> {
        let mut usage = None;
        let mut ptype = None;
        let mut format: Option<(String, Vec<String>)> = None;
        let mut default: Option<String> = None;
        let mut description = String::new();
        let mut list_tip = None;

        for tag in tags {
            let step = match TagKind::from_name(&tag.name) {
                TagKind::Usage => tag.first().and_then(Usage::from_str).map(|u| usage = Some(u)),
                TagKind::Type => tag.first().and_then(ParamType::from_str).map(|t| ptype = Some(t)),
                TagKind::Format => match tag.values.split_first() {
                    Some((form, rest)) if !rest.is_empty() => {
                        format = Some((form.clone(), rest.to_vec()));
                        Ok(())
                    }
                    Some((form, _)) => Err(ParamError::NoValues(form.clone())),
                    None => Err(ParamError::NoValues(tag.name.clone())),
                },
                TagKind::Value | TagKind::Range | TagKind::List => {
                    if tag.values.is_empty() {
                        Err(ParamError::NoValues(tag.name.clone()))
                    } else {
                        format = Some((tag.name.clone(), tag.values.clone()));
                        Ok(())
                    }
                }
                TagKind::Default => tag.first().map(|d| default = Some(d.to_string())),
                TagKind::Description => tag.first().map(|d| description = d.to_string()),
                TagKind::ListTip => {
                    list_tip = Some(tag.values.clone());
                    Ok(())
                }
                TagKind::Skip => Ok(()),
            };
            step.map_err(|e| e.in_param(name))?;
        }

        let usage = usage.ok_or(ParamError::MissingTag("Usage"))?;
        let ptype = ptype.ok_or(ParamError::MissingTag("Type"))?;

        let mut warnings = Vec::new();
        let (format, vals) = match format {
            None => {
                let d = default.clone().ok_or(ParamError::MissingFormat)?;
                (Format::Value, vec![d])
            }
            Some((form, vals)) => {
                let format = form.parse::<Format>().map_err(|e| e.in_param(name))?;
                if format == Format::Value && default.is_some() {
                    warnings.push(
                        "'Format Value' and 'Default' both found! (They are mutually exclusive.)"
                            .to_string(),
                    );
                    (format, vals)
                } else if format == Format::List && ptype == ParamType::Boolean {
                    let v = match default {
                        Some(ref d) => d.clone(),
                        None => {
                            warnings.push(
                                "Boolean List without a 'Default'; assuming False.".to_string(),
                            );
                            "False".to_string()
                        }
                    };
                    (Format::Value, vec![v])
                } else {
                    (format, vals)
                }
            }
        };

        if usage == Usage::Out && default.is_some() {
            return Err(ParamError::DefaultWithOut);
        }

        let (value, min, max) = match format {
            Format::Value => (parse_scalar(ptype, vals[0].trim())?, None, None),
            Format::Range => {
                if !ptype.is_numeric() {
                    return Err(ParamError::IllegalRangeType(ptype.to_string()));
                }
                if vals.len() < 3 {
                    return Err(ParamError::RangeArity(vals.len()));
                }
                (
                    parse_scalar(ptype, &vals[0])?,
                    Some(parse_scalar(ptype, &vals[1])?),
                    Some(parse_scalar(ptype, &vals[2])?),
                )
            }
            Format::List => {
                let items = vals
                    .iter()
                    .map(|v| parse_scalar(ptype, v))
                    .collect::<ParamResult<Vec<_>>>()?;
                (AmiValue::List(items), None, None)
            }
        };

        let default = default.map(|d| {
            parse_scalar(ptype, d.trim()).unwrap_or(AmiValue::String(d))
        });

        Ok(Self {
            name: name.to_string(),
            usage,
            ptype,
            format,
            value,
            min,
            max,
            default,
            description,
            list_tip,
            warnings,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn ptype(&self) -> ParamType {
        self.ptype
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Current value; a list of allowed values for List format.
    pub fn value(&self) -> &AmiValue {
        &self.value
    }

    pub fn min(&self) -> Option<&AmiValue> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&AmiValue> {
        self.max.as_ref()
    }

    pub fn default(&self) -> Option<&AmiValue> {
        self.default.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn list_tip(&self) -> Option<&[String]> {
        self.list_tip.as_deref()
    }

    /// Non-fatal problems found while building the parameter.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Replace the value. Not validated against type or bounds.
    pub fn set_value(&mut self, value: AmiValue) {
        self.value = value;
    }

    /// In and InOut parameters are supplied by the caller.
    pub fn is_input(&self) -> bool {
        matches!(self.usage, Usage::In | Usage::InOut)
    }

    /// The value to submit when nobody has picked one: for List format
    /// the default if it is one of the choices, else the first choice.
    pub fn selected_value(&self) -> AmiValue {
        match (&self.format, &self.value) {
            (Format::List, AmiValue::List(items)) => self
                .default
                .as_ref()
                .filter(|d| items.contains(d))
                .or(items.first())
                .cloned()
                .unwrap_or_else(|| self.value.clone()),
            _ => self.value.clone(),
        }
    }

    /// Labelled choices for a List-format parameter.
    ///
    /// Labels come from the `List_Tip` tag when present (paired with
    /// values in order); otherwise each value labels itself.
    pub fn list_choices(&self) -> Option<ListChoices> {
        let items = match (&self.format, &self.value) {
            (Format::List, AmiValue::List(items)) => items,
            _ => return None,
        };

        let (labels, values): (Vec<String>, Vec<AmiValue>) = match self.list_tip {
            Some(ref tips) => tips
                .iter()
                .zip(items.iter())
                .map(|(t, v)| (t.clone(), v.clone()))
                .unzip(),
            None => items.iter().map(|v| (v.to_string(), v.clone())).unzip(),
        };

        let selected = self
            .default
            .as_ref()
            .and_then(|d| values.iter().position(|v| v == d))
            .unwrap_or(0);

        Some(ListChoices {
            labels,
            values,
            selected,
        })
    }
}

/// Read one value according to the parameter type.
///
/// Integers go through a float first so that `1e5` is accepted.
fn parse_scalar(ptype: ParamType, text: &str) -> ParamResult<AmiValue> {
    let text = text.trim();
    match ptype {
        ParamType::Float | ParamType::Ui | ParamType::Tap => text
            .parse::<f64>()
            .map(AmiValue::Float)
            .map_err(|_| ParamError::BadValue {
                kind: "float",
                text: text.to_string(),
            }),
        ParamType::Integer => match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(AmiValue::Integer(f.trunc() as i64)),
            _ => Err(ParamError::BadValue {
                kind: "integer",
                text: text.to_string(),
            }),
        },
        ParamType::Boolean => match text {
            "True" => Ok(AmiValue::Boolean(true)),
            "False" => Ok(AmiValue::Boolean(false)),
            _ => Err(ParamError::BadValue {
                kind: "Boolean",
                text: text.to_string(),
            }),
        },
        ParamType::String => Ok(AmiValue::String(text.trim_matches('"').to_string())),
    }
}

//! IBIS (.ibs) file parser.
//!
//! The file is a flat run of `[Keyword]` sections. Each recognized keyword
//! has its own sub-grammar; anything else is skipped up to the next line
//! starting with `[`, so the many optional IBIS keywords we have no use
//! for never abort a parse. `[Component]` and `[Model]` open sections that
//! collect their own sub-keywords and bare `Name value` parameter lines
//! until the next top-level keyword.
//!
//! The parse as a whole is strict: the text must end with `[End]`,
//! followed by nothing but whitespace and comments.
//!
//! Reference: IBIS Specification Version 7.2

use crate::diagnostics::Diagnostics;
use crate::error::ParseError;
use crate::ibs_model::{
    AlgorithmicModel, Component, ComponentSection, Executable, IvPoint, IvTable, Model,
    ModelSection, ParamValue, Pin, PinRlc, Ramp, TypMinMax,
};
use crate::lexer::{
    at_line_end, blanks, fail, ibis_keyword, ibis_name, ibis_number, ibis_number_raw,
    ibis_suffix_value, ignore, na_raw, name_only, number_or_na_raw, reject, rest_of_line,
    to_parse_error, PResult, SyntaxError,
};
use indexmap::IndexMap;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while},
    character::complete::{char, one_of, satisfy, space1},
    combinator::{cut, map, opt, recognize},
    error::context,
    multi::{many0, many1, many_m_n},
    sequence::preceded,
    Parser,
};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Status string of a successful [`parse_ibis_file`].
pub const SUCCESS: &str = "Success!";

/// IBIS keywords the grammar knows about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    IbisVer,
    FileName,
    FileRev,
    Date,
    Source,
    Notes,
    Disclaimer,
    Copyright,
    Component,
    ModelSelector,
    Model,
    /// Recognized top-level keywords whose content is not interpreted.
    CommentChar,
    Submodel,
    ExternalCircuit,
    TestData,
    TestLoad,
    DefinePackageModel,
    InterconnectModelSet,
    End,
    // [Component]
    Manufacturer,
    Package,
    Pin,
    DiffPin,
    // [Model]
    Pulldown,
    Pullup,
    GndClamp,
    PowerClamp,
    Ramp,
    AlgorithmicModel,
    EndAlgorithmicModel,
    VoltageRange,
    TemperatureRange,
    /// Anything else, by canonical name.
    Skip(String),
}

impl Keyword {
    /// Map a canonical keyword name (`voltage_range`) to its variant.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "ibis_ver" => Self::IbisVer,
            "file_name" => Self::FileName,
            "file_rev" => Self::FileRev,
            "date" => Self::Date,
            "source" => Self::Source,
            "notes" => Self::Notes,
            "disclaimer" => Self::Disclaimer,
            "copyright" => Self::Copyright,
            "component" => Self::Component,
            "model_selector" => Self::ModelSelector,
            "model" => Self::Model,
            "comment_char" => Self::CommentChar,
            "submodel" => Self::Submodel,
            "external_circuit" => Self::ExternalCircuit,
            "test_data" => Self::TestData,
            "test_load" => Self::TestLoad,
            "define_package_model" => Self::DefinePackageModel,
            "interconnect_model_set" => Self::InterconnectModelSet,
            "end" => Self::End,
            "manufacturer" => Self::Manufacturer,
            "package" => Self::Package,
            "pin" => Self::Pin,
            "diff_pin" => Self::DiffPin,
            "pulldown" => Self::Pulldown,
            "pullup" => Self::Pullup,
            "gnd_clamp" => Self::GndClamp,
            "power_clamp" => Self::PowerClamp,
            "ramp" => Self::Ramp,
            "algorithmic_model" => Self::AlgorithmicModel,
            "end_algorithmic_model" => Self::EndAlgorithmicModel,
            "voltage_range" => Self::VoltageRange,
            "temperature_range" => Self::TemperatureRange,
            other => Self::Skip(other.to_string()),
        }
    }

    /// Keywords that close an open `[Component]` or `[Model]` section.
    pub fn is_top_level(&self) -> bool {
        matches!(
            self,
            Self::IbisVer
                | Self::FileName
                | Self::FileRev
                | Self::Date
                | Self::Source
                | Self::Notes
                | Self::Disclaimer
                | Self::Copyright
                | Self::Component
                | Self::ModelSelector
                | Self::Model
                | Self::CommentChar
                | Self::Submodel
                | Self::ExternalCircuit
                | Self::TestData
                | Self::TestLoad
                | Self::DefinePackageModel
                | Self::InterconnectModelSet
                | Self::End
        )
    }
}

/// One `[Model Selector]` row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectorEntry {
    pub model: String,
    pub description: String,
}

/// A top-level `(keyword, value)` item.
#[derive(Clone, Debug, PartialEq)]
pub enum IbisNode {
    IbisVer(f64),
    FileName(String),
    FileRev(String),
    Date(String),
    /// `[Source]`, `[Notes]`, `[Disclaimer]` or `[Copyright]` text.
    Text(Keyword, String),
    Component(Component),
    Model(Model),
    ModelSelector(String, Vec<SelectorEntry>),
    /// A keyword whose content was discarded.
    Skipped(Keyword),
    /// Bare `Name value` line outside any section.
    Param(String, ParamValue),
}

/// Parsed IBIS file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct IbisFile {
    pub ibis_ver: Option<f64>,
    pub file_name: String,
    pub file_rev: String,
    pub date: String,
    pub source: String,
    pub notes: String,
    pub disclaimer: String,
    pub copyright: String,
    pub components: IndexMap<String, Component>,
    pub models: IndexMap<String, Model>,
    /// Selector name to candidate models, in file order.
    pub model_selectors: IndexMap<String, Vec<SelectorEntry>>,
    /// Bare top-level parameters, names lowercased.
    pub params: IndexMap<String, ParamValue>,
    pub diagnostics: Diagnostics,
}

impl IbisFile {
    /// Partition the top-level items into the file fields.
    pub fn from_nodes(nodes: Vec<IbisNode>) -> Self {
        let mut file = Self::default();
        for node in nodes {
            match node {
                IbisNode::IbisVer(v) => file.ibis_ver = Some(v),
                IbisNode::FileName(s) => file.file_name = s,
                IbisNode::FileRev(s) => file.file_rev = s,
                IbisNode::Date(s) => file.date = s,
                IbisNode::Text(Keyword::Source, s) => file.source = s,
                IbisNode::Text(Keyword::Notes, s) => file.notes = s,
                IbisNode::Text(Keyword::Disclaimer, s) => file.disclaimer = s,
                IbisNode::Text(Keyword::Copyright, s) => file.copyright = s,
                IbisNode::Text(..) | IbisNode::Skipped(_) => {}
                IbisNode::Param(name, value) => {
                    file.params.insert(name, value);
                }
                IbisNode::Component(c) => {
                    file.components.insert(c.name.clone(), c);
                }
                IbisNode::Model(m) => {
                    if m.algorithmic_model.as_ref().is_some_and(AlgorithmicModel::is_empty) {
                        file.diagnostics.warn_at(
                            format!("[Model] {}", m.name),
                            "[Algorithmic Model] has no executables.",
                        );
                    }
                    file.models.insert(m.name.clone(), m);
                }
                IbisNode::ModelSelector(name, entries) => {
                    file.model_selectors.insert(name, entries);
                }
            }
        }
        file
    }

    /// Candidate models for a pin's model name: the selector's entries
    /// if it names a `[Model Selector]`, else the name itself.
    pub fn get_models<'a>(&'a self, model_name: &'a str) -> Vec<&'a str> {
        match self.model_selectors.get(model_name) {
            Some(entries) => entries.iter().map(|e| e.model.as_str()).collect(),
            None => vec![model_name],
        }
    }

    /// Pins of `component` whose first candidate model can drive
    /// (`is_tx`) or cannot (`!is_tx`). Pins with unknown models are left
    /// out.
    pub fn pins_for(&self, component: &str, is_tx: bool) -> Vec<&Pin> {
        let Some(comp) = self.components.get(component) else {
            return Vec::new();
        };
        comp.pins
            .values()
            .filter(|pin| {
                self.get_models(&pin.model_name)
                    .first()
                    .and_then(|name| self.models.get(*name))
                    .is_some_and(|m| m.model_type.is_driver() == is_tx)
            })
            .collect()
    }
}

/// Parse an IBIS file into its top-level items.
pub fn parse_ibs(content: &str) -> Result<Vec<IbisNode>, ParseError> {
    IbisParser::new(content)
        .file(content)
        .map(|(_, nodes)| nodes)
        .map_err(|e| to_parse_error(content, e))
}

/// Parse an IBIS file.
pub fn parse_ibs_file(content: &str) -> Result<IbisFile, ParseError> {
    parse_ibs(content).map(IbisFile::from_nodes)
}

/// Read and parse an IBIS file from disk.
pub fn parse_ibs_path(path: &Path) -> Result<IbisFile, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_ibs_file(&content)
}

/// Parse an IBIS file, reporting `"Success!"` or the formatted error
/// (with an empty file) as a status string.
pub fn parse_ibis_file(content: &str) -> (String, IbisFile) {
    match parse_ibs_file(content) {
        Ok(file) => (SUCCESS.to_string(), file),
        Err(e) => (e.to_string(), IbisFile::default()),
    }
}

// ============================================================================
// Grammar (nom 8)
// ============================================================================

/// Grammar rules that depend on column position hold on to the full text.
struct IbisParser<'a> {
    source: &'a str,
}

impl<'a> IbisParser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn at_line_start(&self, input: &str) -> bool {
        let offset = self.source.len().saturating_sub(input.len());
        offset == 0 || self.source.as_bytes().get(offset - 1) == Some(&b'\n')
    }

    fn file(&self, input: &'a str) -> PResult<'a, Vec<IbisNode>> {
        let (input, _) = ignore(input)?;
        let (input, nodes) = many0(|i: &'a str| self.top_item(i)).parse(input)?;
        let (input, _) = self.expect_keyword(input, Keyword::End, "[End]")?;
        if !input.is_empty() {
            return fail(input, "end of input after [End]");
        }
        Ok((input, nodes))
    }

    /// `[Keyword]` in column 1.
    fn keyword(&self, input: &'a str) -> PResult<'a, Keyword> {
        if !self.at_line_start(input) {
            return fail(input, "keyword");
        }
        let (rest, name) = ibis_keyword(input)?;
        Ok((rest, Keyword::from_name(&name)))
    }

    fn expect_keyword(&self, input: &'a str, want: Keyword, label: &str) -> PResult<'a, ()> {
        match self.keyword(input) {
            Ok((rest, kw)) if kw == want => Ok((rest, ())),
            _ => fail(input, label),
        }
    }

    fn top_item(&self, input: &'a str) -> PResult<'a, IbisNode> {
        if let Ok((rest, (name, value))) = self.param(input) {
            debug!(param = %name, "top-level parameter");
            return Ok((rest, IbisNode::Param(name, value)));
        }
        let (rest, kw) = self.keyword(input)?;
        match kw {
            Keyword::End => fail(input, "keyword"),
            Keyword::IbisVer => cut(map(ibis_number, IbisNode::IbisVer)).parse(rest),
            Keyword::FileName => {
                cut(map(ibis_name, |s: &str| IbisNode::FileName(s.to_string()))).parse(rest)
            }
            Keyword::FileRev => {
                cut(map(ibis_name, |s: &str| IbisNode::FileRev(s.to_string()))).parse(rest)
            }
            Keyword::Date => map(rest_of_line, |s: &str| IbisNode::Date(s.to_string())).parse(rest),
            Keyword::Source | Keyword::Notes | Keyword::Disclaimer | Keyword::Copyright => {
                let (rest, text) = self.text_block(rest);
                Ok((rest, IbisNode::Text(kw, text)))
            }
            Keyword::Component => {
                map(|i: &'a str| self.component(i), IbisNode::Component).parse(rest)
            }
            Keyword::Model => map(|i: &'a str| self.model(i), IbisNode::Model).parse(rest),
            Keyword::ModelSelector => {
                let (rest, name) = cut(ibis_name).parse(rest)?;
                debug!(selector = name, "model selector");
                let (rest, entries) =
                    cut(context("model selector entry", many1(selector_row))).parse(rest)?;
                Ok((rest, IbisNode::ModelSelector(name.to_string(), entries)))
            }
            other => {
                debug!(keyword = ?other, "skipping keyword");
                let (rest, _) = self.text_block(rest);
                Ok((rest, IbisNode::Skipped(other)))
            }
        }
    }

    /// Lines up to the next line starting with `[`, trimmed.
    fn text_block(&self, input: &'a str) -> (&'a str, String) {
        let mut rest = input;
        let mut lines = Vec::new();
        while !rest.is_empty() && !(self.at_line_start(rest) && rest.starts_with('[')) {
            let (line, next) = match rest.find('\n') {
                Some(i) => (&rest[..i], &rest[i + 1..]),
                None => (rest, ""),
            };
            lines.push(line.trim_end());
            rest = next;
        }
        (rest, lines.join("\n").trim().to_string())
    }

    /// `Name value` line starting in column 1; the name is lowercased.
    ///
    /// The value is tried as `= number`, `= text`, typ/min/max numbers,
    /// a single name, then free text to the end of the line.
    fn param(&self, input: &'a str) -> PResult<'a, (String, ParamValue)> {
        if !self.at_line_start(input) {
            return fail(input, "parameter");
        }
        let (rest, name) = recognize((
            satisfy(|c: char| c.is_ascii_alphabetic()),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        ))
        .parse(input)?;
        if !(rest.is_empty() || rest.starts_with(|c: char| matches!(c, ' ' | '\t' | '=' | '\r' | '\n'))) {
            return fail(input, "parameter");
        }
        let (rest, _) = blanks(rest)?;

        let (rest, value) = alt((
            preceded(
                (char('='), blanks),
                alt((
                    map(line_number, ParamValue::Number),
                    map(rest_of_line, |s: &str| ParamValue::Text(s.to_string())),
                )),
            ),
            map(triple, |(t, full)| {
                if full {
                    ParamValue::TypMinMax(t)
                } else {
                    ParamValue::Number(t.typ)
                }
            }),
            map(line_name, |s: &str| ParamValue::Name(s.to_string())),
            map(rest_of_line, |s: &str| ParamValue::Text(s.to_string())),
        ))
        .parse(rest)?;

        Ok((rest, (name.to_ascii_lowercase(), value)))
    }

    fn component(&self, input: &'a str) -> PResult<'a, Component> {
        let start = input;
        let (mut input, name) = cut(context("component name", rest_of_line)).parse(input)?;
        debug!(component = name, "component");
        let mut section = ComponentSection::default();

        loop {
            if let Ok((rest, (key, value))) = self.param(input) {
                section.params.insert(key, value);
                input = rest;
                continue;
            }
            let Ok((rest, kw)) = self.keyword(input) else {
                break;
            };
            if kw.is_top_level() {
                break;
            }
            input = match kw {
                Keyword::Manufacturer => {
                    let (rest, text) = cut(rest_of_line).parse(rest)?;
                    section.manufacturer = Some(text.to_string());
                    rest
                }
                Keyword::Package => {
                    let (rest, params) =
                        cut(context("package parameter", many1(|i: &'a str| self.param(i))))
                            .parse(rest)?;
                    section.package = Some(params.into_iter().collect());
                    rest
                }
                Keyword::Pin => {
                    let (rest, header) = rest_of_line(rest)?;
                    let with_rlc = header
                        .split_whitespace()
                        .any(|col| col.eq_ignore_ascii_case("r_pin"));
                    let row = |i: &'a str| pin_row(i, with_rlc);
                    let (rest, pins) = cut(context("pin row", many1(row))).parse(rest)?;
                    section.pins = Some(pins);
                    rest
                }
                other => {
                    debug!(keyword = ?other, "skipping component keyword");
                    self.text_block(rest).0
                }
            };
        }

        match Component::new(name, section) {
            Ok(component) => Ok((input, component)),
            Err(e) => reject(start, format!("[Component] {name}: {e}")),
        }
    }

    fn model(&self, input: &'a str) -> PResult<'a, Model> {
        let start = input;
        let (mut input, name) = cut(context("model name", ibis_name)).parse(input)?;
        debug!(model = name, "model");
        let mut section = ModelSection::default();

        loop {
            if let Ok((rest, (key, value))) = self.param(input) {
                section.params.insert(key, value);
                input = rest;
                continue;
            }
            let Ok((rest, kw)) = self.keyword(input) else {
                break;
            };
            if kw.is_top_level() {
                break;
            }
            input = match kw {
                Keyword::Pulldown => {
                    let (rest, table) = cut(iv_table).parse(rest)?;
                    section.pulldown = Some(table);
                    rest
                }
                Keyword::Pullup => {
                    let (rest, table) = cut(iv_table).parse(rest)?;
                    section.pullup = Some(table);
                    rest
                }
                Keyword::GndClamp => {
                    let (rest, table) = cut(iv_table).parse(rest)?;
                    section.gnd_clamp = Some(table);
                    rest
                }
                Keyword::PowerClamp => {
                    let (rest, table) = cut(iv_table).parse(rest)?;
                    section.power_clamp = Some(table);
                    rest
                }
                Keyword::Ramp => {
                    let (rest, ramp) = self.ramp(rest)?;
                    section.ramp = Some(ramp);
                    rest
                }
                Keyword::AlgorithmicModel => {
                    let (rest, executables) = many0(ex_line).parse(rest)?;
                    let (rest, _) = cut(|i: &'a str| {
                        self.expect_keyword(i, Keyword::EndAlgorithmicModel, "[End Algorithmic Model]")
                    })
                    .parse(rest)?;
                    section.algorithmic_model = Some(AlgorithmicModel { executables });
                    rest
                }
                Keyword::VoltageRange => {
                    let (rest, (range, _)) = cut(context("voltage range", triple)).parse(rest)?;
                    section.voltage_range = Some(range);
                    rest
                }
                Keyword::TemperatureRange => {
                    let (rest, (range, _)) =
                        cut(context("temperature range", triple)).parse(rest)?;
                    section.temperature_range = Some(range);
                    rest
                }
                other => {
                    debug!(keyword = ?other, "skipping model keyword");
                    self.text_block(rest).0
                }
            };
        }

        match Model::new(name, section) {
            Ok(model) => Ok((input, model)),
            Err(e) => reject(start, format!("[Model] {name}: {e}")),
        }
    }

    /// Two `dV/dt` lines, in either order, plus an optional `R_load`.
    fn ramp(&self, input: &'a str) -> PResult<'a, Ramp> {
        let mut ramp = Ramp::default();
        let (mut rising, mut falling) = (false, false);
        let mut input = input;

        loop {
            if let Ok((rest, (edge, rates))) = dv_dt_line(input) {
                if edge == 'r' {
                    ramp.rising = rates;
                    rising = true;
                } else {
                    ramp.falling = rates;
                    falling = true;
                }
                input = rest;
                continue;
            }
            match self.param(input) {
                Ok((rest, (key, value))) if key == "r_load" => {
                    ramp.r_load = value.as_f64();
                    input = rest;
                }
                _ => break,
            }
        }

        if !(rising && falling) {
            return Err(nom::Err::Failure(SyntaxError::expected(
                input,
                "dV/dt_r and dV/dt_f lines",
            )));
        }
        Ok((input, ramp))
    }
}

/// Number filling the rest of the line.
fn line_number(input: &str) -> PResult<'_, f64> {
    let (rest, v) = ibis_number_raw(input)?;
    if !at_line_end(rest) {
        return fail(input, "number");
    }
    let (rest, _) = ignore(rest)?;
    Ok((rest, v))
}

/// Name filling the rest of the line.
fn line_name(input: &str) -> PResult<'_, &str> {
    let (rest, name) = name_only(input)?;
    if !at_line_end(rest) {
        return fail(input, "name");
    }
    let (rest, _) = ignore(rest)?;
    Ok((rest, name))
}

/// `typ [min max]` to the end of the line, min/max possibly `NA`.
/// The flag tells whether min and max were given.
fn triple(input: &str) -> PResult<'_, (TypMinMax, bool)> {
    let (rest, typ) = ibis_number_raw(input)?;
    let (rest, more) = opt((space1, number_or_na_raw, space1, number_or_na_raw)).parse(rest)?;
    if !at_line_end(rest) {
        return fail(input, "typ, min, max values");
    }
    let (rest, _) = ignore(rest)?;
    let value = match more {
        Some((_, min, _, max)) => (TypMinMax::new(typ, min, max), true),
        None => (TypMinMax::new(typ, None, None), false),
    };
    Ok((rest, value))
}

/// `voltage I(typ) I(min) I(max)`.
fn vi_line(input: &str) -> PResult<'_, IvPoint> {
    let (rest, (voltage, _, (current, _))) = (ibis_number_raw, space1, triple).parse(input)?;
    Ok((rest, IvPoint { voltage, current }))
}

fn iv_table(input: &str) -> PResult<'_, IvTable> {
    map(context("I-V row", many1(vi_line)), IvTable::new).parse(input)
}

/// `num/den`, or `NA`. A zero or `NA` part gives `None`.
fn ratio(input: &str) -> PResult<'_, Option<f64>> {
    alt((
        map(
            (number_or_na_raw, char('/'), number_or_na_raw),
            |(num, _, den)| match (num, den) {
                (Some(n), Some(d)) if d != 0.0 => Some(n / d),
                _ => None,
            },
        ),
        map(na_raw, |_| None),
    ))
    .parse(input)
}

/// `dV/dt_r` or `dV/dt_f` with one to three ratios.
fn dv_dt_line(input: &str) -> PResult<'_, (char, [Option<f64>; 3])> {
    let (rest, _) = tag_no_case("dV/dt_").parse(input)?;
    let (rest, edge) = one_of("rfRF").parse(rest)?;
    let (rest, first) = preceded(space1, ratio).parse(rest)?;
    let (rest, others) = many_m_n(0, 2, preceded(space1, ratio)).parse(rest)?;
    if !at_line_end(rest) {
        return fail(input, "dV/dt ratios");
    }
    let (rest, _) = ignore(rest)?;

    let mut rates = [first, None, None];
    for (slot, rate) in rates[1..].iter_mut().zip(others) {
        *slot = rate;
    }
    Ok((rest, (edge.to_ascii_lowercase(), rates)))
}

/// `Executable <platform> <library> <ami file>`.
fn ex_line(input: &str) -> PResult<'_, Executable> {
    let (rest, (_, _, platform, _, library, _, ami_file)) = (
        tag("Executable"),
        space1,
        name_only,
        space1,
        name_only,
        space1,
        name_only,
    )
        .parse(input)?;
    if !at_line_end(rest) {
        return fail(input, "Executable line");
    }
    let (os, toolchain, bits) = match Executable::parse_platform(platform) {
        Ok(parts) => parts,
        Err(msg) => return reject(input, format!("Executable line needs a {msg}")),
    };
    let (rest, _) = ignore(rest)?;
    Ok((
        rest,
        Executable {
            os,
            toolchain,
            bits,
            library: library.to_string(),
            ami_file: ami_file.to_string(),
        },
    ))
}

/// `pin signal model [R L C]`. The RLC columns are read only when the
/// `[Pin]` header names them, and only when all three are numbers.
fn pin_row(input: &str, with_rlc: bool) -> PResult<'_, Pin> {
    let (rest, (name, _, signal_name, _, model_name)) =
        (name_only, space1, name_only, space1, name_only).parse(input)?;
    let (rest, tail) = rest_of_line(rest)?;
    let values: Vec<f64> = tail
        .split_whitespace()
        .map_while(|t| ibis_suffix_value(t).ok())
        .take(3)
        .collect();
    let rlc = match values.as_slice() {
        &[r_pin, l_pin, c_pin] if with_rlc => Some(PinRlc { r_pin, l_pin, c_pin }),
        _ => None,
    };
    Ok((
        rest,
        Pin {
            name: name.to_string(),
            signal_name: signal_name.to_string(),
            model_name: model_name.to_string(),
            rlc,
        },
    ))
}

/// `model_name description...`.
fn selector_row(input: &str) -> PResult<'_, SelectorEntry> {
    let (rest, (model, description)) = (name_only, rest_of_line).parse(input)?;
    Ok((
        rest,
        SelectorEntry {
            model: model.to_string(),
            description: description.to_string(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibs_model::{ModelType, Os};

    const SAMPLE_IBS: &str = include_str!("../testdata/example_tx.ibs");

    const SAMPLE_SELECTOR: &str = r#"[IBIS Ver] 7.0
[File Name] dual.ibs
[File Rev] 1.0

[Component] Dual Chip
[Manufacturer] Acme
[Package]
R_pkg 0.1 NA NA
L_pkg 1n NA NA
C_pkg 1p NA NA
[Pin] signal_name model_name R_pin L_pin C_pin
A1 TXP tx_sel 0.05 0.5n 0.2p
A2 RXP rx
A3 VDD POWER
A4 VSS GND

[Model Selector] tx_sel
tx_fast    Fast edge driver
tx_slow    Slow edge driver

[Model] tx_fast
Model_type I/O
Vmeas = 0.6
[Voltage Range] 1.2 1.1 1.3
[Pulldown]
0.0 0.0 0.0 0.0
1.2 24m NA 30m
[Pullup]
0.0 0.0 0.0 0.0
1.2 -24m NA -30m
[Ramp]
R_load = 50
dV/dt_f 0.5/50p
dV/dt_r 0.5/50p NA 0.6/40p
[Algorithmic Model]
[End Algorithmic Model]

[Model] rx
Model_type Input
[Voltage Range] 1.2 NA NA
[GND Clamp]
-1.2 -24m NA NA
0.0 0.0 NA NA
[Rising Waveform]
R_fixture = 50
0.0 0.0 0.0 0.0
[End]
"#;

    #[test]
    fn test_parse_sample_ibs() {
        let (status, file) = parse_ibis_file(SAMPLE_IBS);

        assert_eq!(status, SUCCESS);
        assert!((file.ibis_ver.unwrap() - 5.1).abs() < 1e-12);
        assert_eq!(file.file_name, "example_tx.ibs");
        assert_eq!(file.file_rev, "v0.1");
        assert_eq!(file.date, "2019-02-10");
        assert_eq!(file.source, "ibisami public domain infrastructure");
        assert!(file.disclaimer.starts_with("THIS MODEL IS FOR ILLUSTRATION"));
        assert_eq!(file.notes.lines().count(), 2);
        assert!(file.diagnostics.is_empty());

        let comp = &file.components["Example_Tx"];
        assert_eq!(comp.manufacturer, "(n/a)");
        assert_eq!(comp.pins.len(), 6);
        assert_eq!(comp.pins["1p(Tx_1_P)"].model_name, "example_tx");
        assert!((comp.package["l_pkg"].typ - 10.0e-9).abs() < 1e-18);
        assert!((comp.package["c_pkg"].max.unwrap() - 5.0e-12).abs() < 1e-21);

        let model = &file.models["example_tx"];
        assert_eq!(model.model_type, ModelType::Output);
        assert_eq!(model.model_type.to_string(), "Output");
        assert_eq!(model.vmeas, Some(0.5));
        assert_eq!(model.pulldown.as_ref().unwrap().len(), 9);
        assert!((model.zout.unwrap() - 50.0).abs() < 1e-6);
        assert!((model.slew.unwrap() - 0.72 / 70.0e-3).abs() < 1e-9);
        assert_eq!(model.ramp.as_ref().unwrap().r_load, Some(50.0));
        assert!((model.temperature_range.unwrap().max.unwrap() - 100.0).abs() < 1e-12);

        let exes = model.executables();
        assert_eq!(exes.lin64, ["example_tx_x86_amd64.so", "example_tx.ami"]);
        assert_eq!(exes.win32, ["example_tx_x86.dll", "example_tx.ami"]);
        let first = &model.algorithmic_model.as_ref().unwrap().executables[0];
        assert_eq!(first.os, Os::Linux);
        assert_eq!(first.toolchain, "gcc4.1.2");
    }

    #[test]
    fn test_unknown_keyword_skipped() {
        let text = SAMPLE_IBS.replacen(
            "[Component]",
            "[Future_Keyword] garbage text\nmore (garbage) = 3\n  indented garbage\n\n[Component]",
            1,
        );
        let file = parse_ibs_file(&text).unwrap();

        assert!(file.components.contains_key("Example_Tx"));
        assert!(file.models.contains_key("example_tx"));
        let nodes = parse_ibs(&text).unwrap();
        assert!(nodes
            .iter()
            .any(|n| *n == IbisNode::Skipped(Keyword::Skip("future_keyword".to_string()))));
    }

    #[test]
    fn test_selector_and_pins() {
        let file = parse_ibs_file(SAMPLE_SELECTOR).unwrap();

        assert_eq!(file.get_models("tx_sel"), ["tx_fast", "tx_slow"]);
        assert_eq!(file.get_models("rx"), ["rx"]);
        assert_eq!(
            file.model_selectors["tx_sel"][1].description,
            "Slow edge driver"
        );

        let comp = &file.components["Dual Chip"];
        assert_eq!(comp.pins.len(), 2);
        let rlc = comp.pins["A1(TXP)"].rlc.unwrap();
        assert!((rlc.l_pin - 0.5e-9).abs() < 1e-20);
        assert!(comp.pins["A2(RXP)"].rlc.is_none());
        assert_eq!(comp.package["r_pkg"].min, None);

        let tx: Vec<&str> = file.pins_for("Dual Chip", true).iter().map(|p| p.name.as_str()).collect();
        let rx: Vec<&str> = file.pins_for("Dual Chip", false).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(tx, ["A1"]);
        assert_eq!(rx, ["A2"]);
        assert!(file.pins_for("Nope", true).is_empty());
    }

    #[test]
    fn test_pin_with_unknown_model() {
        let text = SAMPLE_SELECTOR.replacen("A2 RXP rx\n", "A2 RXP rx\nA5 AUX aux_ghost\n", 1);
        let file = parse_ibs_file(&text).unwrap();

        assert_eq!(file.get_models("aux_ghost"), ["aux_ghost"]);
        assert!(file.components["Dual Chip"].pins.contains_key("A5(AUX)"));

        let tx: Vec<&str> = file.pins_for("Dual Chip", true).iter().map(|p| p.name.as_str()).collect();
        let rx: Vec<&str> = file.pins_for("Dual Chip", false).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(tx, ["A1"]);
        assert_eq!(rx, ["A2"]);
    }

    #[test]
    fn test_trailing_comments_on_lines() {
        let text = SAMPLE_SELECTOR
            .replacen("[File Rev] 1.0\n", "[File Rev] 1.0\n[Date] 2024-05-01 | nightly\n", 1)
            .replacen("[Component] Dual Chip", "[Component] Dual Chip | rev B", 1)
            .replacen("[Manufacturer] Acme", "[Manufacturer] Acme   | fab 2", 1)
            .replacen("0.05 0.5n 0.2p", "0.05 0.5n 0.2p | lane 0", 1);
        let file = parse_ibs_file(&text).unwrap();

        assert_eq!(file.date, "2024-05-01");
        let comp = &file.components["Dual Chip"];
        assert_eq!(comp.manufacturer, "Acme");
        let rlc = comp.pins["A1(TXP)"].rlc.unwrap();
        assert!((rlc.r_pin - 0.05).abs() < 1e-12);
        assert!((rlc.c_pin - 0.2e-12).abs() < 1e-24);
    }

    #[test]
    fn test_pin_rlc_follows_header() {
        let text = SAMPLE_SELECTOR.replacen(
            "[Pin] signal_name model_name R_pin L_pin C_pin",
            "[Pin] signal_name model_name",
            1,
        );
        let file = parse_ibs_file(&text).unwrap();

        assert!(file.components["Dual Chip"].pins["A1(TXP)"].rlc.is_none());
    }

    #[test]
    fn test_top_level_param() {
        let text = SAMPLE_SELECTOR.replacen("[File Rev] 1.0\n", "[File Rev] 1.0\nVendor_Code 42\n", 1);
        let file = parse_ibs_file(&text).unwrap();

        assert_eq!(file.file_rev, "1.0");
        assert_eq!(file.params["vendor_code"].as_f64(), Some(42.0));
        assert!(file.components.contains_key("Dual Chip"));
    }

    #[test]
    fn test_na_propagates() {
        let file = parse_ibs_file(SAMPLE_SELECTOR).unwrap();

        let fast = &file.models["tx_fast"];
        assert_eq!(fast.model_type, ModelType::Io);
        let pd = fast.impedances["pulldown"];
        assert!((pd[0].unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(pd[1], None);
        assert!((pd[2].unwrap() - 40.0).abs() < 1e-9);

        let ramp = fast.ramp.as_ref().unwrap();
        assert_eq!(ramp.rising[1], None);
        assert_eq!(ramp.falling[1], None);
        assert!((ramp.rising[2].unwrap() - 0.6 / 40e-12).abs() < 1.0);

        let rx = &file.models["rx"];
        assert!((rx.zin.unwrap() - 50.0).abs() < 1e-9);
        assert!(rx.voltage_range.min.is_none());
    }

    #[test]
    fn test_empty_algorithmic_model_noted() {
        let file = parse_ibs_file(SAMPLE_SELECTOR).unwrap();

        assert_eq!(file.diagnostics.len(), 1);
        let d = file.diagnostics.iter().next().unwrap();
        assert_eq!(d.location.as_deref(), Some("[Model] tx_fast"));
        assert!(file.models["tx_fast"].executables().lin64.is_empty());
    }

    #[test]
    fn test_model_failure_is_parse_error() {
        let start = SAMPLE_IBS.find("[Ramp]").unwrap();
        let end = SAMPLE_IBS.find("[End]").unwrap();
        let text = format!("{}{}", &SAMPLE_IBS[..start], &SAMPLE_IBS[end..]);

        let (status, file) = parse_ibis_file(&text);
        assert!(status.contains("[Model] example_tx: Missing required keyword: [Ramp]"), "{status}");
        assert!(file.models.is_empty());
        assert!(file.ibis_ver.is_none());
    }

    #[test]
    fn test_component_failure_is_parse_error() {
        let text = SAMPLE_IBS.replacen("[Manufacturer]   (n/a)\n", "", 1);
        let err = parse_ibs_file(&text).unwrap_err();
        assert!(err
            .to_string()
            .contains("[Component] Example_Tx: Missing required keyword: [Manufacturer]"));
    }

    #[test]
    fn test_strict_end() {
        let missing = SAMPLE_IBS.replacen("[End]", "", 1);
        let err = parse_ibs_file(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Expected [End]"), "{err}");

        let trailing = format!("{SAMPLE_IBS}\n| fine\nnot fine\n");
        assert!(parse_ibs_file(&trailing).is_err());

        let comment_only = format!("{SAMPLE_IBS}\n| trailing comment\n");
        assert!(parse_ibs_file(&comment_only).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_ibs_path(Path::new("testdata/no_such_file.ibs")).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }

    #[test]
    fn test_param_values() {
        let text = "Model_type 3-state\nVinl = 0.8V\nC_comp 1p NA 2p\nRref 50\nPolarity Non-Inverting extra\n";
        let parser = IbisParser::new(text);
        let (rest, (k1, v1)) = parser.param(text).unwrap();
        let (rest, (k2, v2)) = parser.param(rest).unwrap();
        let (rest, (k3, v3)) = parser.param(rest).unwrap();
        let (rest, (_, v4)) = parser.param(rest).unwrap();
        let (rest, (_, v5)) = parser.param(rest).unwrap();

        assert!(rest.is_empty());
        assert_eq!((k1.as_str(), v1), ("model_type", ParamValue::Name("3-state".to_string())));
        assert_eq!(k2, "vinl");
        assert!((v2.as_f64().unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(k3, "c_comp");
        assert_eq!(v3, ParamValue::TypMinMax(TypMinMax::new(1e-12, None, Some(2e-12))));
        assert_eq!(v4, ParamValue::Number(50.0));
        assert_eq!(v5, ParamValue::Text("Non-Inverting extra".to_string()));
    }

    #[test]
    fn test_keyword_in_column_one_only() {
        let text = "Model_type Output\n  [Pulldown]\n";
        let parser = IbisParser::new(text);
        let (rest, _) = parser.param(text).unwrap();
        assert!(parser.keyword(rest).is_err());

        let parser = IbisParser::new("[Voltage Range] 1.8");
        assert_eq!(
            parser.keyword("[Voltage Range] 1.8").unwrap().1,
            Keyword::VoltageRange
        );
    }
}

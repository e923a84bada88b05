//! AMI parameter file parser.
//!
//! Parses `.ami` files that define model parameters for IBIS-AMI models.
//! The S-expression tree from [`crate::sexpr`] is interpreted branch by
//! branch into a [`ParamTree`]: a branch whose first two children are
//! parameter definition tags becomes an [`AmiParameter`], anything else a
//! nested group.
//!
//! Only syntax failures are hard errors. Malformed parameters, unknown
//! groups and missing reserved parameters are recorded as
//! [`Diagnostics`] next to a best-effort tree.
//!
//! Reference: IBIS-AMI Modeling Specification

use crate::ami_parameter::{AmiParameter, ParamType, Tag, TagKind, Usage};
use crate::diagnostics::Diagnostics;
use crate::error::{ParamError, ParamResult, ParseError};
use crate::reserved::{is_reserved_param_name, REQUIRED_RESERVED_PARAMS};
use crate::sexpr::{parse_node, parse_sexpr, Atom, Expr, Node};
use indexmap::IndexMap;
use lib_types::ami::{AmiParameters, AmiValue, ROOT_NAME_KEY};
use lib_types::init::{AmiInitializer, InitData, InitOverrides};
use serde::Serialize;
use std::path::Path;

/// Section holding the standard-defined parameters.
pub const RESERVED_SECTION: &str = "Reserved_Parameters";

/// Section holding the vendor-defined parameters.
pub const MODEL_SPECIFIC_SECTION: &str = "Model_Specific";

const DESCRIPTION: &str = "Description";

/// A parameter, or a named group of them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamNode {
    Leaf(AmiParameter),
    Branch(ParamTree),
}

/// Ordered parameter group.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ParamTree {
    /// Text of a `(Description ...)` child, if the group had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub entries: IndexMap<String, ParamNode>,
}

impl ParamTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParamNode> {
        self.entries.get(name)
    }

    /// Direct child parameter (not group) by name.
    pub fn param(&self, name: &str) -> Option<&AmiParameter> {
        match self.entries.get(name) {
            Some(ParamNode::Leaf(p)) => Some(p),
            _ => None,
        }
    }

    /// Direct child group by name.
    pub fn group(&self, name: &str) -> Option<&ParamTree> {
        match self.entries.get(name) {
            Some(ParamNode::Branch(t)) => Some(t),
            _ => None,
        }
    }

    /// Walk a path of names down the tree.
    pub fn fetch(&self, path: &[&str]) -> Option<&ParamNode> {
        let (first, rest) = path.split_first()?;
        let node = self.entries.get(*first)?;
        match (rest.is_empty(), node) {
            (true, node) => Some(node),
            (false, ParamNode::Branch(tree)) => tree.fetch(rest),
            (false, ParamNode::Leaf(_)) => None,
        }
    }

    pub fn fetch_mut(&mut self, path: &[&str]) -> Option<&mut ParamNode> {
        let (first, rest) = path.split_first()?;
        let node = self.entries.get_mut(*first)?;
        if rest.is_empty() {
            return Some(node);
        }
        match node {
            ParamNode::Branch(tree) => tree.fetch_mut(rest),
            ParamNode::Leaf(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamNode)> {
        self.entries.iter()
    }

    /// Every parameter in the tree, depth first, with its path.
    pub fn params(&self) -> Vec<(Vec<&str>, &AmiParameter)> {
        let mut out = Vec::new();
        self.collect_params(&mut Vec::new(), &mut out);
        out
    }

    fn collect_params<'a>(
        &'a self,
        prefix: &mut Vec<&'a str>,
        out: &mut Vec<(Vec<&'a str>, &'a AmiParameter)>,
    ) {
        for (name, node) in &self.entries {
            prefix.push(name);
            match node {
                ParamNode::Leaf(p) => out.push((prefix.clone(), p)),
                ParamNode::Branch(t) => t.collect_params(prefix, out),
            }
            prefix.pop();
        }
    }

    /// Values of the parameters accepted by `keep`, groups kept nested.
    /// Groups left empty are dropped.
    pub fn values<F>(&self, keep: &F) -> AmiParameters
    where
        F: Fn(&AmiParameter) -> bool,
    {
        let mut out = AmiParameters::new();
        for (name, node) in &self.entries {
            match node {
                ParamNode::Leaf(p) if keep(p) => out.set(name.clone(), p.selected_value()),
                ParamNode::Leaf(_) => {}
                ParamNode::Branch(t) => {
                    let sub = t.values(keep);
                    if !sub.is_empty() {
                        out.set_group(name.clone(), sub);
                    }
                }
            }
        }
        out
    }
}

/// Interpret one branch of the parameter definition tree.
///
/// `location` is the slash-separated path of the branch, used to place
/// diagnostics. Returns `None` when the branch could not be turned into
/// anything usable; the reason is in `diags`.
pub fn proc_branch(node: &Node, location: &str, diags: &mut Diagnostics) -> Option<ParamNode> {
    if node.children.is_empty() {
        diags.error_at(
            location,
            format!(
                "No tags/subparameters provided for parameter, '{}'",
                node.name
            ),
        );
        return None;
    }

    if !is_param_leaf(node) {
        return Some(ParamNode::Branch(proc_group(node, location, diags)));
    }

    let tags = node
        .children
        .iter()
        .map(|child| match child {
            Expr::Node(n) => Tag::try_from(n),
            Expr::Atom(a) => Err(ParamError::MalformedItem(a.to_string())),
        })
        .collect::<ParamResult<Vec<_>>>()
        .and_then(|tags| AmiParameter::new(&node.name, &tags));

    match tags {
        Ok(param) => {
            for warning in param.warnings() {
                diags.warn_at(location, warning.clone());
            }
            Some(ParamNode::Leaf(param))
        }
        Err(e) => {
            diags.error_at(location, e.to_string());
            None
        }
    }
}

/// A leaf's first two children are both definition tags.
fn is_param_leaf(node: &Node) -> bool {
    node.children.len() > 1
        && node.children[..2].iter().all(|child| match child {
            Expr::Node(n) => TagKind::is_param_tag(&n.name),
            Expr::Atom(_) => false,
        })
}

fn proc_group(node: &Node, location: &str, diags: &mut Diagnostics) -> ParamTree {
    let mut tree = ParamTree::new();
    for child in &node.children {
        match child {
            Expr::Atom(a) => diags.error_at(
                location,
                format!("Malformed item, '{a}', in group '{}'.", node.name),
            ),
            Expr::Node(n) if n.name == DESCRIPTION => tree.description = Some(first_text(n)),
            Expr::Node(n) => {
                let path = format!("{location}/{}", n.name);
                if let Some(entry) = proc_branch(n, &path, diags) {
                    tree.entries.insert(n.name.clone(), entry);
                }
            }
        }
    }
    tree
}

fn first_text(node: &Node) -> String {
    node.atoms()
        .next()
        .map(|a| a.text().to_string())
        .unwrap_or_default()
}

/// Parsed and validated AMI file.
#[derive(Clone, Debug, Serialize)]
pub struct AmiFile {
    /// Model root name, the label of the outermost node.
    pub root_name: String,

    /// Top-level `(Description ...)` text.
    pub description: String,

    /// `Reserved_Parameters` and `Model_Specific`, when present, as
    /// branches of one tree.
    pub param_defs: ParamTree,

    /// Everything worth telling the user that didn't stop the parse.
    pub diagnostics: Diagnostics,

    /// Raw S-expression tree.
    #[serde(skip)]
    pub raw_tree: Node,
}

impl AmiFile {
    pub fn reserved_params(&self) -> Option<&ParamTree> {
        self.param_defs.group(RESERVED_SECTION)
    }

    pub fn model_specific(&self) -> Option<&ParamTree> {
        self.param_defs.group(MODEL_SPECIFIC_SECTION)
    }

    /// Look up a parameter by path, e.g. `["Model_Specific", "tx_tap_units"]`.
    pub fn fetch_param(&self, path: &[&str]) -> ParamResult<&AmiParameter> {
        match self.param_defs.fetch(path) {
            Some(ParamNode::Leaf(p)) => Ok(p),
            Some(ParamNode::Branch(_)) => Err(ParamError::NotAParameter(path.join("/"))),
            None => Err(ParamError::NotFound(path.join("/"))),
        }
    }

    pub fn fetch_param_val(&self, path: &[&str]) -> ParamResult<&AmiValue> {
        self.fetch_param(path).map(AmiParameter::value)
    }

    /// Overwrite the value of the parameter at `path`.
    pub fn set_param_val(&mut self, path: &[&str], value: AmiValue) -> ParamResult<()> {
        match self.param_defs.fetch_mut(path) {
            Some(ParamNode::Leaf(p)) => {
                p.set_value(value);
                Ok(())
            }
            Some(ParamNode::Branch(_)) => Err(ParamError::NotAParameter(path.join("/"))),
            None => Err(ParamError::NotFound(path.join("/"))),
        }
    }

    /// Caller-supplied (In/InOut) model-specific values, with the root
    /// name recorded first.
    pub fn input_ami_params(&self) -> AmiParameters {
        let mut params = AmiParameters::new();
        params.set(ROOT_NAME_KEY, AmiValue::String(self.root_name.clone()));
        if let Some(tree) = self.model_specific() {
            for (name, setting) in tree.values(&AmiParameter::is_input).params {
                params.params.insert(name, setting);
            }
        }
        params
    }

    /// Values of the Info-usage reserved parameters.
    pub fn info_ami_params(&self) -> AmiParameters {
        self.reserved_params()
            .map(|tree| tree.values(&|p: &AmiParameter| p.usage() == Usage::Info))
            .unwrap_or_default()
    }

    /// Build the `AMI_Init` inputs for this model.
    pub fn initializer(&self, overrides: &InitOverrides) -> AmiInitializer {
        AmiInitializer::new(
            self.input_ami_params(),
            self.info_ami_params(),
            InitData::default().with_overrides(overrides),
        )
    }
}

/// Parse and validate an AMI parameter definition file.
///
/// Fails only on malformed S-expression text.
pub fn parse_ami_file(content: &str) -> Result<AmiFile, ParseError> {
    let (root, rest) = parse_sexpr(content)?;
    let mut diags = Diagnostics::new();

    if !rest.trim().is_empty() {
        let preview: String = rest.trim().chars().take(40).collect();
        diags.warn(format!(
            "Unparsed content after the root node, '{preview}', ignored."
        ));
    }

    let mut description = String::new();
    let mut param_defs = ParamTree::new();

    for section in root.nodes() {
        match section.name.as_str() {
            DESCRIPTION => description = first_text(section),
            RESERVED_SECTION => {
                let tree = proc_reserved(section, &mut diags);
                param_defs
                    .entries
                    .insert(RESERVED_SECTION.to_string(), ParamNode::Branch(tree));
            }
            MODEL_SPECIFIC_SECTION => {
                let tree = proc_group(section, MODEL_SPECIFIC_SECTION, &mut diags);
                param_defs
                    .entries
                    .insert(MODEL_SPECIFIC_SECTION.to_string(), ParamNode::Branch(tree));
            }
            label => diags.warn(format!(
                "Unrecognized group with label, '{label}', found in parameter definition string!"
            )),
        }
    }

    check_sections(&param_defs, &mut diags);

    Ok(AmiFile {
        root_name: root.name.clone(),
        description,
        param_defs,
        diagnostics: diags,
        raw_tree: root,
    })
}

fn proc_reserved(section: &Node, diags: &mut Diagnostics) -> ParamTree {
    for param in section.nodes() {
        if param.name != DESCRIPTION && !is_reserved_param_name(&param.name) {
            diags.warn_at(
                RESERVED_SECTION,
                format!(
                    "Unrecognized reserved parameter name, '{}', found in parameter definition string!",
                    param.name
                ),
            );
        }
    }
    proc_group(section, RESERVED_SECTION, diags)
}

fn check_sections(defs: &ParamTree, diags: &mut Diagnostics) {
    let reserved = defs.group(RESERVED_SECTION);
    match reserved {
        None => diags.error("Reserved parameters section not found! It is required."),
        Some(reserved) => match reserved.param("AMI_Version") {
            Some(p) if p.usage() == Usage::Info && p.ptype() == ParamType::String => {}
            _ => diags.warn_at(RESERVED_SECTION, "Malformed 'AMI_Version' parameter."),
        },
    }
    for name in REQUIRED_RESERVED_PARAMS {
        if reserved.and_then(|r| r.get(name)).is_none() {
            diags.error_at(
                RESERVED_SECTION,
                format!("Reserved parameter, '{name}', not found! It is required."),
            );
        }
    }

    if defs.group(MODEL_SPECIFIC_SECTION).is_none() {
        diags.warn("Model specific parameters section not found!");
    }
}

/// Read and parse an AMI file from disk.
pub fn parse_ami_path(path: &Path) -> Result<AmiFile, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_ami_file(&content)
}

/// Result of [`parse_ami_file_contents`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct AmiContents {
    /// Every warning and error found, one per line; empty when clean.
    pub error: String,
    pub root_name: String,
    pub description: String,
    pub reserved_params: ParamTree,
    pub model_specific: ParamTree,
}

/// Parse an AMI file into its sections, flattening every problem into a
/// single message.
///
/// The trees are best effort and filled in whenever the text is
/// syntactically valid; on a syntax failure only `error` is set.
pub fn parse_ami_file_contents(content: &str) -> AmiContents {
    match parse_ami_file(content) {
        Ok(file) => {
            let section = |name: &str| file.param_defs.group(name).cloned().unwrap_or_default();
            AmiContents {
                error: file.diagnostics.to_string(),
                reserved_params: section(RESERVED_SECTION),
                model_specific: section(MODEL_SPECIFIC_SECTION),
                root_name: file.root_name,
                description: file.description,
            }
        }
        Err(e) => AmiContents {
            error: e.to_string(),
            ..AmiContents::default()
        },
    }
}

/// Parse an `AMI_Init`/`AMI_GetWave` parameter string, such as
/// `(example_tx (tx_tap_units 27)(taps (pre1 -0.1)))`, into its root name
/// and values.
///
/// A child with one atom is a scalar, with several a list, and with
/// sub-nodes a nested group. Unquoted words are read as strings.
pub fn parse_ami_params_string(text: &str) -> Result<(String, AmiParameters), ParseError> {
    let (root, _) = parse_node(text)?;
    Ok((root.name.clone(), node_values(&root)))
}

fn node_values(node: &Node) -> AmiParameters {
    let mut params = AmiParameters::new();
    for child in node.nodes() {
        if child.nodes().next().is_some() {
            params.set_group(child.name.clone(), node_values(child));
            continue;
        }
        let mut atoms: Vec<AmiValue> = child.atoms().map(atom_value).collect();
        let value = if atoms.len() == 1 {
            atoms.remove(0)
        } else {
            AmiValue::List(atoms)
        };
        params.set(child.name.clone(), value);
    }
    params
}

fn atom_value(atom: &Atom) -> AmiValue {
    match atom {
        Atom::Number(text) => match text.parse::<i64>() {
            Ok(i) => AmiValue::Integer(i),
            Err(_) => text
                .parse::<f64>()
                .map(AmiValue::Float)
                .unwrap_or_else(|_| AmiValue::String(text.clone())),
        },
        Atom::Bool(b) => AmiValue::Boolean(*b),
        Atom::Str(s) | Atom::Symbol(s) => AmiValue::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    const SAMPLE_AMI: &str = include_str!("../testdata/example_tx.ami");

    const SAMPLE_NESTED: &str = r#"
(nested_rx
    (Description "Rx with a grouped CTLE.")
    (Reserved_Parameters
        (AMI_Version (Usage Info) (Type String) (Value "7.0"))
        (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True))
        (GetWave_Exists (Usage Info) (Type Boolean) (Value False))
        (Max_Init_Aggressors (Usage Info) (Type Integer) (Value 4))
    )
    (Model_Specific
        (ctle
            (Description "Continuous time linear equalizer.")
            (mode (Usage In) (Type Integer) (List 0 1 2) (List_Tip "off" "fixed" "adaptive") (Default 1))
            (peak (Usage InOut) (Type Float) (Range 6.0 0.0 12.0))
            (gain (Usage Out) (Type Float) (Value 0.0))
        )
        (label (Usage In) (Type String) (Value "rx0"))
        (debug (Usage Info) (Type Boolean) (Value False))
    )
)
"#;

    #[test]
    fn test_parse_sample_ami() {
        let contents = parse_ami_file_contents(SAMPLE_AMI);

        assert_eq!(contents.error, "");
        assert_eq!(contents.root_name, "example_tx");
        assert_eq!(contents.description, "Example Tx model from ibisami package.");
        assert_eq!(
            contents.model_specific.param("tx_tap_units").unwrap().value(),
            &AmiValue::Integer(27)
        );
        assert_eq!(
            contents.reserved_params.param("AMI_Version").unwrap().value(),
            &AmiValue::String("5.1".to_string())
        );

        let names: Vec<&String> = contents.model_specific.entries.keys().collect();
        assert_eq!(names, ["tx_tap_units", "tx_tap_np1", "tx_tap_nm1", "tx_tap_nm2"]);
        let np1 = contents.model_specific.param("tx_tap_np1").unwrap();
        assert_eq!(np1.max(), Some(&AmiValue::Integer(10)));
    }

    #[test]
    fn test_missing_required_reserved() {
        let text = SAMPLE_AMI.replace("Init_Returns_Impulse", "Renamed_Param");
        let contents = parse_ami_file_contents(&text);

        assert!(contents.error.contains("'Init_Returns_Impulse', not found"));
        assert!(contents.error.contains("Unrecognized reserved parameter name, 'Renamed_Param'"));
        // Best effort trees are still returned.
        assert_eq!(contents.root_name, "example_tx");
        assert_eq!(contents.model_specific.len(), 4);
    }

    #[test]
    fn test_missing_sections() {
        let file = parse_ami_file("(bare (Description \"nothing here\"))").unwrap();
        let errors: Vec<String> = file.diagnostics.errors().map(|d| d.message.clone()).collect();

        assert_eq!(
            errors,
            [
                "Reserved parameters section not found! It is required.",
                "Reserved parameter, 'Init_Returns_Impulse', not found! It is required.",
                "Reserved parameter, 'GetWave_Exists', not found! It is required.",
            ]
        );
        assert!(file
            .diagnostics
            .warnings()
            .any(|d| d.message == "Model specific parameters section not found!"));
    }

    #[test]
    fn test_missing_reserved_section_reports_required_params() {
        let contents = parse_ami_file_contents(
            "(bare (Description \"x\") (Model_Specific (a (Usage In) (Type Integer) (Value 1))))",
        );

        assert!(contents.error.contains("Reserved parameters section not found!"));
        assert!(contents.error.contains("'Init_Returns_Impulse', not found!"));
        assert!(contents.error.contains("'GetWave_Exists', not found!"));
        assert!(contents.model_specific.get("a").is_some());
    }

    #[test]
    fn test_unknown_group_warns() {
        let text = SAMPLE_AMI.replacen(
            "(Model_Specific",
            "(Vendor_Extras (x (Usage In) (Type Float) (Value 1)))\n    (Model_Specific",
            1,
        );
        let file = parse_ami_file(&text).unwrap();

        assert!(!file.diagnostics.has_errors());
        let warning = file.diagnostics.warnings().next().unwrap();
        assert_eq!(
            warning.message,
            "Unrecognized group with label, 'Vendor_Extras', found in parameter definition string!"
        );
    }

    #[test]
    fn test_nested_groups() {
        let file = parse_ami_file(SAMPLE_NESTED).unwrap();
        assert!(file.diagnostics.is_empty(), "{}", file.diagnostics);

        let ctle = file.model_specific().unwrap().group("ctle").unwrap();
        assert_eq!(
            ctle.description.as_deref(),
            Some("Continuous time linear equalizer.")
        );
        assert_eq!(ctle.len(), 3);

        let peak = file
            .fetch_param(&["Model_Specific", "ctle", "peak"])
            .unwrap();
        assert!((peak.value().as_f64().unwrap() - 6.0).abs() < 1e-12);

        let paths: Vec<String> = file
            .model_specific()
            .unwrap()
            .params()
            .into_iter()
            .map(|(path, _)| path.join("/"))
            .collect();
        assert_eq!(paths, ["ctle/mode", "ctle/peak", "ctle/gain", "label", "debug"]);
    }

    #[test]
    fn test_fetch_and_set() {
        let mut file = parse_ami_file(SAMPLE_NESTED).unwrap();

        assert_eq!(
            file.fetch_param_val(&["Reserved_Parameters", "Max_Init_Aggressors"]),
            Ok(&AmiValue::Integer(4))
        );
        assert_eq!(
            file.fetch_param(&["Model_Specific", "ctle"]).unwrap_err(),
            ParamError::NotAParameter("Model_Specific/ctle".to_string())
        );
        assert_eq!(
            file.fetch_param(&["Model_Specific", "nope"]).unwrap_err(),
            ParamError::NotFound("Model_Specific/nope".to_string())
        );

        file.set_param_val(&["Model_Specific", "ctle", "peak"], AmiValue::Float(3.5))
            .unwrap();
        assert_eq!(
            file.fetch_param_val(&["Model_Specific", "ctle", "peak"]),
            Ok(&AmiValue::Float(3.5))
        );
        assert!(file
            .set_param_val(&["Model_Specific", "ctle"], AmiValue::Integer(1))
            .is_err());
    }

    #[test]
    fn test_input_params_and_init_string() {
        let file = parse_ami_file(SAMPLE_NESTED).unwrap();
        let params = file.input_ami_params();

        let names: Vec<&String> = params.params.keys().collect();
        assert_eq!(names, [ROOT_NAME_KEY, "ctle", "label"]);
        assert_eq!(params.root_name(), Some("nested_rx"));

        let ctle = params.group("ctle").unwrap();
        assert_eq!(ctle.get("mode"), Some(&AmiValue::Integer(1)));
        assert!(!ctle.contains("gain"));

        let init = file.initializer(&InitOverrides::default());
        assert_eq!(
            init.ami_params_in(),
            "(nested_rx (ctle (mode 1)(peak 6))(label \"rx0\"))"
        );
        assert_eq!(init.init.row_size, 128);

        let info = file.info_ami_params();
        assert_eq!(info.get("GetWave_Exists"), Some(&AmiValue::Boolean(false)));
        assert_eq!(info.len(), 4);
    }

    #[test]
    fn test_bad_parameter_is_reported_not_fatal() {
        let text = SAMPLE_AMI.replacen("(Usage In )", "(Usage Out ) (Default 3)", 1);
        let contents = parse_ami_file_contents(&text);

        assert!(contents
            .error
            .contains("ERROR: 'Default' may not be used with parameter type 'Out'!"));
        assert!(contents.model_specific.get("tx_tap_units").is_none());
        assert_eq!(contents.model_specific.len(), 3);
    }

    #[test]
    fn test_empty_parameter_and_stray_atom() {
        let text = "(m (Reserved_Parameters (Init_Returns_Impulse (Usage Info) (Type Boolean) (Value True)) \
                    (GetWave_Exists (Usage Info) (Type Boolean) (Value True)) \
                    (AMI_Version (Usage Info) (Type String) (Value \"6.1\"))) \
                    (Model_Specific (empty) (grp stray (a (Usage In) (Type Float) (Value 1)))))";
        let file = parse_ami_file(text).unwrap();

        let errors: Vec<&str> = file.diagnostics.errors().map(|d| d.message.as_str()).collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "No tags/subparameters provided for parameter, 'empty'");
        assert!(errors[1].starts_with("Malformed item, 'stray'"));

        let loc = file.diagnostics.errors().nth(1).unwrap().location.clone();
        assert_eq!(loc.as_deref(), Some("Model_Specific/grp"));
        assert!(file.fetch_param(&["Model_Specific", "grp", "a"]).is_ok());
    }

    #[test]
    fn test_trailing_content_warns() {
        let text = format!("{SAMPLE_AMI}\n(leftover)");
        let file = parse_ami_file(&text).unwrap();

        assert_eq!(file.diagnostics.len(), 1);
        let d = file.diagnostics.iter().next().unwrap();
        assert_eq!(d.severity, Severity::Warning);
        assert!(d.message.contains("(leftover)"));
    }

    #[test]
    fn test_syntax_error_only_sets_error() {
        let contents = parse_ami_file_contents("(example_tx (Description \"x\")");

        assert!(contents.error.starts_with("Expected ')'"), "{}", contents.error);
        assert!(contents.root_name.is_empty());
        assert!(contents.reserved_params.is_empty());
    }

    #[test]
    fn test_parse_params_string() {
        let (root, params) =
            parse_ami_params_string("(example_rx (tx_tap_units 27)(dfe (tap1 -0.25)(tap2 0.1))(mode \"auto\")(taps 1 2 3)(adapt True))")
                .unwrap();

        assert_eq!(root, "example_rx");
        assert_eq!(params.get("tx_tap_units"), Some(&AmiValue::Integer(27)));
        assert_eq!(
            params.group("dfe").unwrap().get("tap1"),
            Some(&AmiValue::Float(-0.25))
        );
        assert_eq!(params.get("mode"), Some(&AmiValue::String("auto".to_string())));
        assert_eq!(params.get("taps").and_then(AmiValue::as_list).map(|l| l.len()), Some(3));
        assert_eq!(params.get("adapt"), Some(&AmiValue::Boolean(true)));
    }
}

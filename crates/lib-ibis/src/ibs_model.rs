//! IBIS `[Component]` and `[Model]` entities.
//!
//! The grammar in [`crate::ibs_parser`] collects each section's keywords
//! into a [`ComponentSection`] or [`ModelSection`]; the constructors here
//! check that the mandatory keywords are present and derive the electrical
//! summary values (driver/input impedance, slew rate).

use crate::error::ParseError;
use indexmap::IndexMap;
use lib_types::{Ohms, Volts, VoltsPerSecond};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Substituted for an impedance whose current step is zero (10 MOhm).
pub const OPEN_CIRCUIT_OHMS: f64 = Ohms::OPEN.0;

/// Process corner of a typ/min/max triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Corner {
    Typ,
    Min,
    Max,
}

impl Corner {
    pub const ALL: [Corner; 3] = [Corner::Typ, Corner::Min, Corner::Max];
}

/// Typical value with optional (`NA`) min and max.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TypMinMax {
    pub typ: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl TypMinMax {
    pub fn new(typ: f64, min: Option<f64>, max: Option<f64>) -> Self {
        Self { typ, min, max }
    }

    /// Single value used for all three corners.
    pub fn uniform(v: f64) -> Self {
        Self::new(v, Some(v), Some(v))
    }

    pub fn get(&self, corner: Corner) -> Option<f64> {
        match corner {
            Corner::Typ => Some(self.typ),
            Corner::Min => self.min,
            Corner::Max => self.max,
        }
    }
}

impl fmt::Display for TypMinMax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let na = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |v| v.to_string());
        write!(f, "{} {} {}", self.typ, na(self.min), na(self.max))
    }
}

/// Value of a bare `Name value` parameter line.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    TypMinMax(TypMinMax),
    Name(String),
    Text(String),
}

impl ParamValue {
    /// Number, or the typical value of a triple.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::TypMinMax(t) => Some(t.typ),
            Self::Name(_) | Self::Text(_) => None,
        }
    }

    pub fn as_typ_min_max(&self) -> Option<TypMinMax> {
        match self {
            Self::Number(v) => Some(TypMinMax::uniform(*v)),
            Self::TypMinMax(t) => Some(*t),
            Self::Name(_) | Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Name(s) | Self::Text(s) => Some(s),
            Self::Number(_) | Self::TypMinMax(_) => None,
        }
    }
}

/// One I-V table row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IvPoint {
    pub voltage: f64,
    pub current: TypMinMax,
}

/// Tabulated current against voltage.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IvTable {
    pub points: Vec<IvPoint>,
}

impl IvTable {
    pub fn new(points: Vec<IvPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn voltages(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.voltage).collect()
    }

    pub fn currents(&self, corner: Corner) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.current.get(corner)).collect()
    }

    /// Re-reference a supply-relative table (`[Pullup]`, `[POWER Clamp]`)
    /// to ground: `v -> vdd - v`, currents negated, re-sorted by voltage.
    pub fn mirrored(&self, vdd: f64) -> Self {
        let neg = |v: Option<f64>| v.map(|v| -v);
        let mut points: Vec<IvPoint> = self
            .points
            .iter()
            .map(|p| IvPoint {
                voltage: vdd - p.voltage,
                current: TypMinMax::new(-p.current.typ, neg(p.current.min), neg(p.current.max)),
            })
            .collect();
        points.sort_by(|a, b| a.voltage.total_cmp(&b.voltage));
        Self { points }
    }

    /// Small-signal impedance per corner around `vref`.
    ///
    /// Uses the first row at or above `vref` and the one before it. A
    /// flat current step gives [`OPEN_CIRCUIT_OHMS`]; an `NA` current
    /// gives `None`.
    pub fn impedance(&self, vref: f64) -> Result<[Option<f64>; 3], String> {
        if self.points.len() < 2 {
            return Err("Insufficient number of I-V data points!".to_string());
        }
        let vs = self.voltages();
        let ix = vs
            .iter()
            .position(|&v| v >= vref)
            .unwrap_or(vs.len() - 1)
            .max(1);
        let dv = vs[ix] - vs[ix - 1];

        Ok(Corner::ALL.map(|corner| {
            let i1 = self.points[ix].current.get(corner)?;
            let i0 = self.points[ix - 1].current.get(corner)?;
            let di = i1 - i0;
            if di == 0.0 {
                Some(OPEN_CIRCUIT_OHMS)
            } else {
                Some((dv / di).abs())
            }
        }))
    }
}

/// `[Ramp]` rates in V/s, per corner; `NA` entries are `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Ramp {
    pub rising: [Option<f64>; 3],
    pub falling: [Option<f64>; 3],
    pub r_load: Option<f64>,
}

impl Ramp {
    /// Mean typical edge rate.
    pub fn slew_rate(&self) -> Option<VoltsPerSecond> {
        let rising = VoltsPerSecond(self.rising[0]?);
        let falling = VoltsPerSecond(self.falling[0]?);
        Some((rising + falling) / 2.0)
    }

    /// Mean typical edge rate in V/ns.
    pub fn slew_v_per_ns(&self) -> Option<f64> {
        self.slew_rate().map(|r| r.as_v_per_ns())
    }
}

/// Operating system of an `Executable` line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Os {
    Windows,
    Linux,
    Other(String),
}

impl From<&str> for Os {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Os::Windows,
            "linux" => Os::Linux,
            _ => Os::Other(s.to_string()),
        }
    }
}

/// `Executable <os>_<toolchain>_<bits> <shared library> <ami file>`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Executable {
    pub os: Os,
    pub toolchain: String,
    pub bits: u32,
    pub library: String,
    pub ami_file: String,
}

impl Executable {
    /// Split a platform token on its first and last underscore.
    pub fn parse_platform(token: &str) -> Result<(Os, String, u32), String> {
        let (os, rest) = token
            .split_once('_')
            .ok_or_else(|| format!("platform '<os>_<toolchain>_<bits>', got '{token}'"))?;
        let (toolchain, bits) = rest
            .rsplit_once('_')
            .ok_or_else(|| format!("platform '<os>_<toolchain>_<bits>', got '{token}'"))?;
        let bits = bits
            .parse::<u32>()
            .map_err(|_| format!("word size in platform '{token}'"))?;
        Ok((Os::from(os), toolchain.to_string(), bits))
    }

    pub fn files(&self) -> Vec<String> {
        vec![self.library.clone(), self.ami_file.clone()]
    }
}

/// `[Algorithmic Model]` executables.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlgorithmicModel {
    pub executables: Vec<Executable>,
}

/// Files of the first executable for each OS and word size; empty when
/// the model has none for that combination.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExecutablePartitions {
    pub win32: Vec<String>,
    pub lin32: Vec<String>,
    pub win64: Vec<String>,
    pub lin64: Vec<String>,
}

impl AlgorithmicModel {
    pub fn is_empty(&self) -> bool {
        self.executables.is_empty()
    }

    pub fn files_for(&self, os: &Os, bits: u32) -> Vec<String> {
        self.executables
            .iter()
            .find(|e| &e.os == os && e.bits == bits)
            .map(Executable::files)
            .unwrap_or_default()
    }

    pub fn partitions(&self) -> ExecutablePartitions {
        ExecutablePartitions {
            win32: self.files_for(&Os::Windows, 32),
            lin32: self.files_for(&Os::Linux, 32),
            win64: self.files_for(&Os::Windows, 64),
            lin64: self.files_for(&Os::Linux, 64),
        }
    }
}

/// IBIS `Model_type` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ModelType {
    Input,
    Output,
    #[serde(rename = "I/O")]
    Io,
    #[serde(rename = "3-state")]
    ThreeState,
    OpenDrain,
    IoOpenDrain,
    OpenSink,
    IoOpenSink,
    OpenSource,
    IoOpenSource,
    InputEcl,
    OutputEcl,
    IoEcl,
    ThreeStateEcl,
    Terminator,
    Series,
    SeriesSwitch,
    InputDiff,
    OutputDiff,
    IoDiff,
    ThreeStateDiff,
}

impl ModelType {
    const NAMES: [(ModelType, &'static str); 21] = [
        (ModelType::Input, "Input"),
        (ModelType::Output, "Output"),
        (ModelType::Io, "I/O"),
        (ModelType::ThreeState, "3-state"),
        (ModelType::OpenDrain, "Open_drain"),
        (ModelType::IoOpenDrain, "I/O_open_drain"),
        (ModelType::OpenSink, "Open_sink"),
        (ModelType::IoOpenSink, "I/O_open_sink"),
        (ModelType::OpenSource, "Open_source"),
        (ModelType::IoOpenSource, "I/O_open_source"),
        (ModelType::InputEcl, "Input_ECL"),
        (ModelType::OutputEcl, "Output_ECL"),
        (ModelType::IoEcl, "I/O_ECL"),
        (ModelType::ThreeStateEcl, "3-state_ECL"),
        (ModelType::Terminator, "Terminator"),
        (ModelType::Series, "Series"),
        (ModelType::SeriesSwitch, "Series_switch"),
        (ModelType::InputDiff, "Input_diff"),
        (ModelType::OutputDiff, "Output_diff"),
        (ModelType::IoDiff, "I/O_diff"),
        (ModelType::ThreeStateDiff, "3-state_diff"),
    ];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(t, _)| t == self)
            .map_or("", |(_, name)| *name)
    }

    /// Needs `[Pulldown]`, `[Pullup]` and `[Ramp]`.
    pub fn needs_driver_tables(&self) -> bool {
        matches!(self, ModelType::Output | ModelType::Io)
    }

    /// Needs at least one clamp table.
    pub fn needs_clamp_tables(&self) -> bool {
        *self == ModelType::Input
    }

    /// Can drive the pin.
    pub fn is_driver(&self) -> bool {
        !matches!(
            self,
            ModelType::Input
                | ModelType::InputEcl
                | ModelType::InputDiff
                | ModelType::Terminator
                | ModelType::Series
                | ModelType::SeriesSwitch
        )
    }
}

impl FromStr for ModelType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(t, _)| *t)
            .ok_or_else(|| ParseError::invalid_value("Model_type", format!("unrecognized '{s}'")))
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-pin R/L/C override from `[Pin]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PinRlc {
    pub r_pin: f64,
    pub l_pin: f64,
    pub c_pin: f64,
}

/// One `[Pin]` row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pin {
    pub name: String,
    pub signal_name: String,
    pub model_name: String,
    pub rlc: Option<PinRlc>,
}

impl Pin {
    /// `name(signal)`, the key used in [`Component::pins`].
    pub fn label(&self) -> String {
        format!("{}({})", self.name, self.signal_name)
    }

    /// Supply and no-connect pins carry no model.
    pub fn is_supply_or_nc(&self) -> bool {
        ["POWER", "GND", "NC"]
            .iter()
            .any(|k| self.model_name.eq_ignore_ascii_case(k))
    }
}

/// Keywords gathered inside one `[Component]`.
#[derive(Clone, Debug, Default)]
pub struct ComponentSection {
    pub manufacturer: Option<String>,
    pub package: Option<IndexMap<String, ParamValue>>,
    pub pins: Option<Vec<Pin>>,
    pub params: IndexMap<String, ParamValue>,
}

/// A validated `[Component]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    pub manufacturer: String,
    /// `R_pkg`, `L_pkg`, `C_pkg` (lowercased), typ/min/max.
    pub package: IndexMap<String, TypMinMax>,
    /// Signal pins keyed by [`Pin::label`]; supply and NC pins dropped.
    pub pins: IndexMap<String, Pin>,
}

impl Component {
    pub fn new(name: &str, section: ComponentSection) -> Result<Self, ParseError> {
        let manufacturer = section
            .manufacturer
            .ok_or_else(|| ParseError::missing_keyword("[Manufacturer]"))?;
        let package = section
            .package
            .ok_or_else(|| ParseError::missing_keyword("[Package]"))?
            .into_iter()
            .filter_map(|(k, v)| v.as_typ_min_max().map(|t| (k, t)))
            .collect();
        let pins = section
            .pins
            .ok_or_else(|| ParseError::missing_keyword("[Pin]"))?
            .into_iter()
            .filter(|p| !p.is_supply_or_nc())
            .map(|p| (p.label(), p))
            .collect();

        Ok(Self {
            name: name.to_string(),
            manufacturer,
            package,
            pins,
        })
    }
}

/// Keywords gathered inside one `[Model]`.
#[derive(Clone, Debug, Default)]
pub struct ModelSection {
    pub params: IndexMap<String, ParamValue>,
    pub pulldown: Option<IvTable>,
    pub pullup: Option<IvTable>,
    pub gnd_clamp: Option<IvTable>,
    pub power_clamp: Option<IvTable>,
    pub ramp: Option<Ramp>,
    pub algorithmic_model: Option<AlgorithmicModel>,
    pub voltage_range: Option<TypMinMax>,
    pub temperature_range: Option<TypMinMax>,
}

/// A validated `[Model]`, with derived impedance and slew rate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Model {
    pub name: String,
    pub model_type: ModelType,
    pub c_comp: Option<TypMinMax>,
    pub cref: Option<f64>,
    pub vref: Option<f64>,
    pub vmeas: Option<f64>,
    pub rref: Option<f64>,
    pub voltage_range: TypMinMax,
    pub temperature_range: Option<TypMinMax>,
    pub pulldown: Option<IvTable>,
    /// Re-referenced to ground, see [`IvTable::mirrored`].
    pub pullup: Option<IvTable>,
    pub gnd_clamp: Option<IvTable>,
    /// Re-referenced to ground, see [`IvTable::mirrored`].
    pub power_clamp: Option<IvTable>,
    pub ramp: Option<Ramp>,
    pub algorithmic_model: Option<AlgorithmicModel>,
    /// Per-corner impedance of each table that has one.
    pub impedances: IndexMap<String, [Option<f64>; 3]>,
    /// Driver output impedance, Ohms (Output and I/O).
    pub zout: Option<f64>,
    /// Input impedance, Ohms (Input).
    pub zin: Option<f64>,
    /// Mean typical edge rate, V/ns.
    pub slew: Option<f64>,
    /// Every bare parameter line, names lowercased.
    pub params: IndexMap<String, ParamValue>,
}

impl Model {
    pub fn new(name: &str, section: ModelSection) -> Result<Self, ParseError> {
        let model_type = section
            .params
            .get("model_type")
            .and_then(ParamValue::as_text)
            .ok_or_else(|| ParseError::missing_keyword("Model_type"))?
            .parse::<ModelType>()?;
        let voltage_range = section
            .voltage_range
            .ok_or_else(|| ParseError::missing_keyword("[Voltage Range]"))?;

        if model_type.needs_driver_tables() {
            if section.pulldown.is_none() || section.pullup.is_none() {
                return Err(ParseError::missing_keyword("[Pulldown] and [Pullup]"));
            }
            if section.ramp.is_none() {
                return Err(ParseError::missing_keyword("[Ramp]"));
            }
        }
        if model_type.needs_clamp_tables()
            && section.gnd_clamp.is_none()
            && section.power_clamp.is_none()
        {
            return Err(ParseError::missing_keyword("[GND Clamp] or [POWER Clamp]"));
        }

        let num = |key: &str| section.params.get(key).and_then(ParamValue::as_f64);
        let vdd = voltage_range.typ;
        let vmeas = num("vmeas");
        let vref_for = |table: &IvTable| match vmeas {
            Some(v) if v != 0.0 => v,
            _ => table.voltages().into_iter().fold(f64::MIN, f64::max) / 2.0,
        };

        let pulldown = section.pulldown;
        let pullup = section.pullup.as_ref().map(|t| t.mirrored(vdd));
        let gnd_clamp = section.gnd_clamp;
        let power_clamp = section.power_clamp.as_ref().map(|t| t.mirrored(vdd));

        let mut impedances = IndexMap::new();
        for (key, table) in [
            ("pulldown", &pulldown),
            ("pullup", &pullup),
            ("gnd_clamp", &gnd_clamp),
            ("power_clamp", &power_clamp),
        ] {
            if let Some(table) = table {
                let z = table
                    .impedance(vref_for(table))
                    .map_err(|msg| ParseError::invalid_value(key, msg))?;
                impedances.insert(key.to_string(), z);
            }
        }
        let typ_z = |key: &str| impedances.get(key).and_then(|z| z[0]);

        let zout = if model_type.needs_driver_tables() {
            typ_z("pulldown")
                .zip(typ_z("pullup"))
                .map(|(pd, pu)| (pd + pu) / 2.0)
        } else {
            None
        };
        let zin = if model_type.needs_clamp_tables() {
            match (typ_z("gnd_clamp"), typ_z("power_clamp")) {
                (Some(g), Some(p)) => Some(Ohms(g).parallel(Ohms(p)).0),
                (Some(z), None) | (None, Some(z)) => Some(z),
                (None, None) => None,
            }
        } else {
            None
        };
        let slew = section.ramp.as_ref().and_then(Ramp::slew_v_per_ns);

        Ok(Self {
            name: name.to_string(),
            model_type,
            c_comp: section
                .params
                .get("c_comp")
                .and_then(ParamValue::as_typ_min_max),
            cref: num("cref"),
            vref: num("vref"),
            vmeas,
            rref: num("rref"),
            voltage_range,
            temperature_range: section.temperature_range,
            pulldown,
            pullup,
            gnd_clamp,
            power_clamp,
            ramp: section.ramp,
            algorithmic_model: section.algorithmic_model,
            impedances,
            zout,
            zin,
            slew,
            params: section.params,
        })
    }

    pub fn executables(&self) -> ExecutablePartitions {
        self.algorithmic_model
            .as_ref()
            .map(AlgorithmicModel::partitions)
            .unwrap_or_default()
    }

    /// Typical supply voltage.
    pub fn supply(&self) -> Volts {
        Volts(self.voltage_range.typ)
    }

    pub fn output_impedance(&self) -> Option<Ohms> {
        self.zout.map(Ohms)
    }

    pub fn input_impedance(&self) -> Option<Ohms> {
        self.zin.map(Ohms)
    }

    pub fn slew_rate(&self) -> Option<VoltsPerSecond> {
        self.ramp.as_ref().and_then(Ramp::slew_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_table(ohms: f64, vs: &[f64]) -> IvTable {
        IvTable::new(
            vs.iter()
                .map(|&v| IvPoint {
                    voltage: v,
                    current: TypMinMax::new(v / ohms, Some(v / (ohms * 1.1)), Some(v / (ohms * 0.9))),
                })
                .collect(),
        )
    }

    fn driver_section() -> ModelSection {
        let vs = [-1.8, -0.9, 0.0, 0.45, 0.9, 1.35, 1.8, 2.7, 3.6];
        let mut params = IndexMap::new();
        params.insert("model_type".to_string(), ParamValue::Name("Output".to_string()));
        params.insert("vmeas".to_string(), ParamValue::Number(0.5));
        ModelSection {
            params,
            pulldown: Some(linear_table(50.0, &vs)),
            pullup: Some(linear_table(-50.0, &vs)),
            ramp: Some(Ramp {
                rising: [Some(0.72 / 70e-12), None, None],
                falling: [Some(0.72 / 70e-12), None, None],
                r_load: Some(50.0),
            }),
            voltage_range: Some(TypMinMax::new(1.8, Some(1.62), Some(1.98))),
            ..ModelSection::default()
        }
    }

    #[test]
    fn test_linear_pulldown_impedance() {
        let z = linear_table(50.0, &[0.0, 0.25, 0.5, 0.75, 1.0])
            .impedance(0.5)
            .unwrap();
        assert!((z[0].unwrap() - 50.0).abs() < 1e-9);
        assert!((z[1].unwrap() - 55.0).abs() < 1e-9);
        assert!((z[2].unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_driver_model() {
        let model = Model::new("example_tx", driver_section()).unwrap();

        assert_eq!(model.model_type, ModelType::Output);
        assert!((model.zout.unwrap() - 50.0).abs() < 1e-9);
        assert!(model.zin.is_none());
        assert!((model.slew.unwrap() - 0.72 / 70e-3).abs() < 1e-9);
        assert_eq!(model.impedances.len(), 2);
        assert_eq!(model.supply(), Volts(1.8));
        assert_eq!(model.output_impedance().map(|z| z.0), model.zout);
        assert!((model.slew_rate().unwrap().0 - 0.72 / 70e-12).abs() < 1.0);
    }

    #[test]
    fn test_pullup_mirrored() {
        let model = Model::new("example_tx", driver_section()).unwrap();
        let pullup = model.pullup.unwrap();
        let vs = pullup.voltages();

        assert!(vs.windows(2).all(|w| w[0] <= w[1]));
        assert!((vs[0] - (1.8 - 3.6)).abs() < 1e-12);
        let first = pullup.points[0];
        assert!((first.current.typ - 3.6 / 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_step_is_open_circuit() {
        let table = IvTable::new(vec![
            IvPoint { voltage: 0.0, current: TypMinMax::new(0.001, None, Some(0.0)) },
            IvPoint { voltage: 1.0, current: TypMinMax::new(0.001, Some(0.5), Some(0.01)) },
        ]);
        let z = table.impedance(0.5).unwrap();
        assert_eq!(z[0], Some(OPEN_CIRCUIT_OHMS));
        assert_eq!(z[1], None);
        assert!((z[2].unwrap() - 100.0).abs() < 1e-9);

        assert!(IvTable::new(vec![]).impedance(0.5).is_err());
    }

    #[test]
    fn test_driver_requirements() {
        let mut section = driver_section();
        section.ramp = None;
        let err = Model::new("m", section).unwrap_err();
        assert_eq!(err.to_string(), "Missing required keyword: [Ramp]");

        let mut section = driver_section();
        section.pullup = None;
        assert!(Model::new("m", section).is_err());

        let mut section = driver_section();
        section.voltage_range = None;
        let err = Model::new("m", section).unwrap_err();
        assert_eq!(err.to_string(), "Missing required keyword: [Voltage Range]");

        let mut section = driver_section();
        section.params.shift_remove("model_type");
        assert!(Model::new("m", section).is_err());
    }

    #[test]
    fn test_input_model_parallel_clamps() {
        let vs = [-1.0, 0.0, 0.9, 1.8];
        let mut params = IndexMap::new();
        params.insert("model_type".to_string(), ParamValue::Name("input".to_string()));
        let section = ModelSection {
            params: params.clone(),
            gnd_clamp: Some(linear_table(100.0, &vs)),
            power_clamp: Some(linear_table(-100.0, &vs)),
            voltage_range: Some(TypMinMax::uniform(1.8)),
            ..ModelSection::default()
        };
        let model = Model::new("rx", section).unwrap();
        assert_eq!(model.model_type, ModelType::Input);
        assert!((model.zin.unwrap() - 50.0).abs() < 1e-9);
        assert!(model.zout.is_none());

        let section = ModelSection {
            params,
            voltage_range: Some(TypMinMax::uniform(1.8)),
            ..ModelSection::default()
        };
        assert!(Model::new("rx", section).is_err());
    }

    #[test]
    fn test_model_type_parse() {
        assert_eq!("I/O".parse::<ModelType>().unwrap(), ModelType::Io);
        assert_eq!("3-STATE".parse::<ModelType>().unwrap(), ModelType::ThreeState);
        assert_eq!("open_drain".parse::<ModelType>().unwrap(), ModelType::OpenDrain);
        assert!("Sideways".parse::<ModelType>().is_err());
        assert_eq!(ModelType::IoEcl.to_string(), "I/O_ECL");
        assert!(!ModelType::Terminator.is_driver());
    }

    #[test]
    fn test_executable_partitions() {
        let exes = ["linux_gcc4.1.2_32", "linux_gcc4.1.2_64", "Windows_Visual_Studio_64", "macos_clang_64"]
            .iter()
            .map(|p| {
                let (os, toolchain, bits) = Executable::parse_platform(p).unwrap();
                Executable {
                    os,
                    toolchain,
                    bits,
                    library: format!("{p}.so"),
                    ami_file: "tx.ami".to_string(),
                }
            })
            .collect();
        let algo = AlgorithmicModel { executables: exes };
        let parts = algo.partitions();

        assert_eq!(parts.lin32, ["linux_gcc4.1.2_32.so", "tx.ami"]);
        assert_eq!(parts.win64[0], "Windows_Visual_Studio_64.so");
        assert!(parts.win32.is_empty());
        assert_eq!(algo.executables[2].toolchain, "Visual_Studio");
        assert_eq!(algo.executables[3].os, Os::Other("macos".to_string()));

        assert!(Executable::parse_platform("linux64").is_err());
        assert!(Executable::parse_platform("linux_gcc_x").is_err());
    }

    #[test]
    fn test_component_requirements() {
        let pin = |name: &str, model: &str| Pin {
            name: name.to_string(),
            signal_name: format!("S{name}"),
            model_name: model.to_string(),
            rlc: None,
        };
        let mut package = IndexMap::new();
        package.insert(
            "r_pkg".to_string(),
            ParamValue::TypMinMax(TypMinMax::new(0.1, Some(0.0), Some(0.5))),
        );
        let section = ComponentSection {
            manufacturer: Some("(n/a)".to_string()),
            package: Some(package),
            pins: Some(vec![pin("1", "tx"), pin("2", "GND"), pin("3", "nc"), pin("4", "tx")]),
            params: IndexMap::new(),
        };
        let comp = Component::new("Example_Tx", section.clone()).unwrap();
        let labels: Vec<&String> = comp.pins.keys().collect();
        assert_eq!(labels, ["1(S1)", "4(S4)"]);
        assert!((comp.package["r_pkg"].typ - 0.1).abs() < 1e-12);

        let err = Component::new(
            "x",
            ComponentSection {
                manufacturer: None,
                ..section
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required keyword: [Manufacturer]");
    }
}

//! `ami-init` configuration loading and validation.

use anyhow::{Context, Result};
use lib_ibis::ami_parser::MODEL_SPECIFIC_SECTION;
use lib_ibis::AmiFile;
use lib_types::{AmiValue, InitOverrides};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level `ami-init` configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InitConfig {
    /// Path to the AMI parameter file.
    pub ami: PathBuf,

    /// Replacements for the default `AMI_Init` channel data and timing.
    #[serde(default)]
    pub init: InitOverrides,

    /// Model_Specific value overrides, keyed by parameter name. Nested
    /// tables address parameters inside groups; `group/name` keys do too.
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl InitConfig {
    /// Overrides as `(path below Model_Specific, value)` pairs.
    pub fn overrides(&self) -> Result<Vec<(Vec<String>, AmiValue)>> {
        let mut out = Vec::new();
        for (key, value) in &self.parameters {
            let path: Vec<String> = key.split('/').map(str::to_string).collect();
            flatten(path, value, &mut out)?;
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    /// Write the overrides into `ami`. Every override must name an
    /// existing In/InOut parameter.
    pub fn apply(&self, ami: &mut AmiFile) -> Result<()> {
        for (path, value) in self.overrides()? {
            let full: Vec<&str> = std::iter::once(MODEL_SPECIFIC_SECTION)
                .chain(path.iter().map(String::as_str))
                .collect();
            let param = ami
                .fetch_param(&full)
                .with_context(|| format!("Bad parameter override: {}", path.join("/")))?;
            if !param.is_input() {
                anyhow::bail!(
                    "Parameter {} has usage {}; only In and InOut parameters can be overridden",
                    path.join("/"),
                    param.usage()
                );
            }
            tracing::debug!(param = %path.join("/"), value = %value, "override");
            ami.set_param_val(&full, value)?;
        }
        Ok(())
    }
}

fn flatten(
    path: Vec<String>,
    value: &serde_json::Value,
    out: &mut Vec<(Vec<String>, AmiValue)>,
) -> Result<()> {
    match value {
        serde_json::Value::Object(entries) => {
            for (name, inner) in entries {
                let mut sub = path.clone();
                sub.push(name.clone());
                flatten(sub, inner, out)?;
            }
        }
        other => {
            let v = json_to_ami(other)
                .with_context(|| format!("Bad value for parameter {}", path.join("/")))?;
            out.push((path, v));
        }
    }
    Ok(())
}

/// Convert a scalar or array config value into an [`AmiValue`].
pub fn json_to_ami(value: &serde_json::Value) -> Result<AmiValue> {
    use serde_json::Value;

    Ok(match value {
        Value::Bool(b) => AmiValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AmiValue::Integer(i),
            None => AmiValue::Float(
                n.as_f64()
                    .with_context(|| format!("Number out of range: {n}"))?,
            ),
        },
        Value::String(s) => AmiValue::String(s.clone()),
        Value::Array(items) => {
            AmiValue::List(items.iter().map(json_to_ami).collect::<Result<_>>()?)
        }
        Value::Null => anyhow::bail!("null is not an AMI value"),
        Value::Object(_) => anyhow::bail!("nested table is not an AMI value"),
    })
}

/// Parse configuration text; JSON when `json`, TOML otherwise.
pub fn parse_config(content: &str, json: bool) -> Result<InitConfig> {
    let config: InitConfig = if json {
        serde_json::from_str(content).context("Failed to parse config as JSON")?
    } else {
        toml::from_str(content).context("Failed to parse config as TOML")?
    };
    Ok(config)
}

/// Load configuration from a file. A relative `ami` path is resolved
/// against the config file's directory.
pub fn load_config(path: &Path) -> Result<InitConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let json = path.extension().map_or(false, |e| e == "json");
    let mut config = parse_config(&content, json)?;

    if config.ami.is_relative() {
        if let Some(dir) = path.parent() {
            config.ami = dir.join(&config.ami);
        }
    }

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &InitConfig) -> Result<()> {
    if !config.ami.exists() {
        anyhow::bail!("AMI file not found: {:?}", config.ami);
    }

    if let Some(dt) = config.init.sample_interval {
        if dt.0 <= 0.0 {
            anyhow::bail!("sample_interval must be positive (got {})", dt.0);
        }
    }
    if let Some(ui) = config.init.bit_time {
        if ui.0 <= 0.0 {
            anyhow::bail!("bit_time must be positive (got {})", ui.0);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_AMI: &str = include_str!("../../lib-ibis/testdata/example_tx.ami");

    const CONFIG_TOML: &str = r#"
ami = "example_tx.ami"

[init]
bit_time = 1e-10
channel_response = [0.0, 0.5, 0.25]

[parameters]
tx_tap_units = 20
tx_tap_np1 = 3
"#;

    #[test]
    fn test_parse_toml_config() {
        let config = parse_config(CONFIG_TOML, false).unwrap();

        assert_eq!(config.ami, PathBuf::from("example_tx.ami"));
        assert_eq!(config.init.channel_response.as_deref(), Some(&[0.0, 0.5, 0.25][..]));
        assert!(config.init.row_size.is_none());

        let overrides = config.overrides().unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[0], (vec!["tx_tap_np1".to_string()], AmiValue::Integer(3)));
    }

    #[test]
    fn test_parse_json_config() {
        let config = parse_config(
            r#"{"ami": "rx.ami", "parameters": {"ctle": {"mode": "auto", "peak": 6.5}}}"#,
            true,
        )
        .unwrap();

        let overrides = config.overrides().unwrap();
        assert_eq!(
            overrides,
            [
                (vec!["ctle".to_string(), "mode".to_string()], AmiValue::String("auto".to_string())),
                (vec!["ctle".to_string(), "peak".to_string()], AmiValue::Float(6.5)),
            ]
        );
    }

    #[test]
    fn test_json_to_ami() {
        let v = json_to_ami(&serde_json::json!([1, 2.5, true])).unwrap();
        assert_eq!(
            v,
            AmiValue::List(vec![AmiValue::Integer(1), AmiValue::Float(2.5), AmiValue::Boolean(true)])
        );
        assert!(json_to_ami(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut ami = lib_ibis::parse_ami_file(EXAMPLE_AMI).unwrap();
        let config = parse_config(CONFIG_TOML, false).unwrap();

        config.apply(&mut ami).unwrap();

        let init = ami.initializer(&config.init);
        assert_eq!(
            init.ami_params_in(),
            "(example_tx (tx_tap_units 20)(tx_tap_np1 3)(tx_tap_nm1 0)(tx_tap_nm2 0))"
        );
        assert_eq!(init.init.row_size, 3);
    }

    #[test]
    fn test_apply_rejects_unknown_parameter() {
        let mut ami = lib_ibis::parse_ami_file(EXAMPLE_AMI).unwrap();
        let config = parse_config("ami = \"x.ami\"\n[parameters]\nno_such_param = 1\n", false).unwrap();

        let err = config.apply(&mut ami).unwrap_err();
        assert!(format!("{err:#}").contains("no_such_param"));
    }
}

//! Initialization data for a single `AMI_Init` call.
//!
//! Every call gets its own [`InitData`], built from the defaults and
//! merged with caller overrides; nothing is shared between calls.

use crate::ami::{AmiParameters, AmiValue, ROOT_NAME_KEY};
use crate::units::Seconds;
use serde::{Deserialize, Serialize};

/// Default length of the channel response vector.
pub const DEFAULT_ROW_SIZE: usize = 128;

/// Channel data and timing passed to `AMI_Init`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitData {
    /// Impulse response of the victim channel, followed by any aggressor
    /// rows, each `row_size` samples long.
    pub channel_response: Vec<f64>,

    /// Number of samples per channel response row.
    pub row_size: usize,

    /// Number of aggressor rows in `channel_response`.
    pub num_aggressors: usize,

    /// Time between adjacent channel response samples.
    pub sample_interval: Seconds,

    /// Unit interval of the link.
    pub bit_time: Seconds,
}

impl Default for InitData {
    /// Ideal impulse, 40 GHz sampling, 10 Gb/s.
    fn default() -> Self {
        let mut channel_response = vec![0.0; DEFAULT_ROW_SIZE];
        channel_response[1] = 1.0;

        Self {
            channel_response,
            row_size: DEFAULT_ROW_SIZE,
            num_aggressors: 0,
            sample_interval: Seconds::from_ps(25.0),
            bit_time: Seconds::from_ps(100.0),
        }
    }
}

impl InitData {
    /// Return a copy of `self` with the given overrides applied.
    ///
    /// A replacement channel response also resets `row_size` to its
    /// length, regardless of any explicit `row_size` override.
    pub fn with_overrides(&self, overrides: &InitOverrides) -> Self {
        let mut data = self.clone();

        if let Some(bit_time) = overrides.bit_time {
            data.bit_time = bit_time;
        }
        if let Some(sample_interval) = overrides.sample_interval {
            data.sample_interval = sample_interval;
        }
        if let Some(row_size) = overrides.row_size {
            data.row_size = row_size;
        }
        if let Some(num_aggressors) = overrides.num_aggressors {
            data.num_aggressors = num_aggressors;
        }
        if let Some(ref h) = overrides.channel_response {
            data.channel_response = h.clone();
            data.row_size = h.len();
        }

        data
    }

    /// Samples per unit interval.
    pub fn samples_per_bit(&self) -> usize {
        (self.bit_time / self.sample_interval).round() as usize
    }
}

/// Caller-supplied replacements for [`InitData`] fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOverrides {
    pub channel_response: Option<Vec<f64>>,
    pub row_size: Option<usize>,
    pub num_aggressors: Option<usize>,
    pub sample_interval: Option<Seconds>,
    pub bit_time: Option<Seconds>,
}

/// Everything needed to initialize one model instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmiInitializer {
    /// Input parameter values, including the root name.
    pub ami_params: AmiParameters,

    /// Reserved (informational) parameter values.
    pub info_params: AmiParameters,

    /// Channel data and timing.
    pub init: InitData,
}

impl AmiInitializer {
    pub fn new(ami_params: AmiParameters, info_params: AmiParameters, init: InitData) -> Self {
        let mut params = AmiParameters::new();
        if !ami_params.contains(ROOT_NAME_KEY) {
            params.set(ROOT_NAME_KEY, AmiValue::String(String::new()));
        }
        for (name, setting) in ami_params.params {
            params.params.insert(name, setting);
        }

        Self {
            ami_params: params,
            info_params,
            init,
        }
    }

    /// The parameter string handed to `AMI_Init`.
    pub fn ami_params_in(&self) -> String {
        self.ami_params.to_ami_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_init_data() {
        let init = InitData::default();

        assert_eq!(init.row_size, 128);
        assert_eq!(init.channel_response.len(), 128);
        assert_eq!(init.channel_response[0], 0.0);
        assert_eq!(init.channel_response[1], 1.0);
        assert_eq!(init.num_aggressors, 0);
        assert!((init.sample_interval.as_ps() - 25.0).abs() < 1e-9);
        assert!((init.bit_time.as_ps() - 100.0).abs() < 1e-9);
        assert_eq!(init.samples_per_bit(), 4);
    }

    #[test]
    fn test_overrides_do_not_touch_defaults() {
        let base = InitData::default();
        let overrides = InitOverrides {
            bit_time: Some(Seconds::from_ps(50.0)),
            channel_response: Some(vec![0.0, 0.5, 0.25, 0.125]),
            row_size: Some(1024),
            ..Default::default()
        };

        let merged = base.with_overrides(&overrides);

        assert_eq!(merged.row_size, 4);
        assert!((merged.bit_time.as_ps() - 50.0).abs() < 1e-9);
        assert_eq!(base, InitData::default());
        assert_eq!(InitData::default().with_overrides(&InitOverrides::default()), base);
    }

    #[test]
    fn test_initializer_adds_root_name() {
        let mut params = AmiParameters::new();
        params.set("gain", AmiValue::Integer(3));

        let init = AmiInitializer::new(params, AmiParameters::new(), InitData::default());

        assert_eq!(init.ami_params.root_name(), Some(""));
        assert_eq!(init.ami_params_in(), "( (gain 3))");
    }
}

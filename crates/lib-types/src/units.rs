//! Physical units with type safety.
//!
//! Newtypes for the electrical quantities read out of IBIS and AMI files,
//! so an edge rate can't be handed to something expecting an impedance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div};

macro_rules! unit {
    ($(#[$meta:meta])* $name:ident, $symbol:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        pub struct $name(pub f64);

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Div<f64> for $name {
            type Output = Self;
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $symbol)
            }
        }
    };
}

unit!(
    /// Time in seconds. Sample intervals and bit times.
    Seconds,
    "s"
);
unit!(
    /// Voltage in volts.
    Volts,
    "V"
);
unit!(
    /// Impedance in ohms.
    Ohms,
    "Ohm"
);
unit!(
    /// Edge rate in volts per second.
    VoltsPerSecond,
    "V/s"
);

impl Seconds {
    #[inline]
    pub fn from_ps(ps: f64) -> Self {
        Self(ps * 1e-12)
    }

    #[inline]
    pub fn as_ps(&self) -> f64 {
        self.0 * 1e12
    }
}

/// Ratio of two durations, e.g. samples per unit interval.
impl Div<Seconds> for Seconds {
    type Output = f64;
    fn div(self, rhs: Seconds) -> f64 {
        self.0 / rhs.0
    }
}

impl Div<Seconds> for Volts {
    type Output = VoltsPerSecond;
    fn div(self, rhs: Seconds) -> VoltsPerSecond {
        VoltsPerSecond(self.0 / rhs.0)
    }
}

impl Ohms {
    /// Stand-in for an open circuit (10 MOhm).
    pub const OPEN: Self = Self(10.0e6);

    #[inline]
    pub fn parallel(self, other: Self) -> Self {
        Self(self.0 * other.0 / (self.0 + other.0))
    }
}

impl VoltsPerSecond {
    /// The unit IBIS slew rates are usually quoted in.
    #[inline]
    pub fn as_v_per_ns(&self) -> f64 {
        self.0 * 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sample_timing() {
        let sample = Seconds::from_ps(25.0);
        let ui = Seconds::from_ps(100.0);

        assert!((ui / sample - 4.0).abs() < 1e-12);
        assert!((ui.as_ps() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_impedance() {
        let z = Ohms(100.0).parallel(Ohms(100.0));
        assert!((z.0 - 50.0).abs() < 1e-12);

        let z = Ohms(50.0).parallel(Ohms::OPEN);
        assert!((z.0 - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_ramp_to_slew_rate() {
        // 0.72 V in 70 ps, the typical rising edge of the example Tx model.
        let rate = Volts(0.72) / Seconds::from_ps(70.0);
        assert!((rate.as_v_per_ns() - 0.72 / 0.07).abs() < 1e-9);

        let mean = (rate + VoltsPerSecond(rate.0)) / 2.0;
        assert_eq!(mean, rate);
    }

    #[test]
    fn test_display() {
        assert_eq!(Volts(1.8).to_string(), "1.8 V");
        assert_eq!(Ohms(50.0).to_string(), "50 Ohm");
    }
}

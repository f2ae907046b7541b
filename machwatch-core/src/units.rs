//! Type-safe wrappers for sensor units
//!
//! Each newtype serializes as a bare JSON number, so a reading looks the same
//! on the wire as the prediction service expects.

use serde::{Deserialize, Serialize};

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Celsius(pub f64);

/// Vibration velocity in millimeters per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MillimetersPerSecond(pub f64);

/// Pounds per square inch
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Psi(pub f64);

/// Amperes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amperes(pub f64);

/// Revolutions per minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Rpm(pub f64);

/// Simulated runtime in hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Hours(pub f64);

impl Hours {
    /// Whole seconds, rounded to the nearest second
    pub fn total_seconds(&self) -> u64 {
        (self.0 * 3600.0).round().max(0.0) as u64
    }

    /// Format as `HH:MM:SS`
    pub fn clock_label(&self) -> String {
        let total = self.total_seconds();
        format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total % 3600) / 60,
            total % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_two_and_one_decimals() {
        assert_eq!(round_to(60.12345, 2), 60.12);
        assert_eq!(round_to(1700.06, 1), 1700.1);
        assert_eq!(round_to(-0.004, 2), -0.0);
    }

    #[test]
    fn clock_label_formats_simulated_runtime() {
        assert_eq!(Hours(0.0).clock_label(), "00:00:00");
        assert_eq!(Hours(0.2).clock_label(), "00:12:00");
        assert_eq!(Hours(14.8).clock_label(), "14:48:00");
        assert_eq!(Hours(1.0 / 3600.0).clock_label(), "00:00:01");
    }
}

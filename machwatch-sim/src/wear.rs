//! Wear curve and the sensor targets it drives
//!
//! Wear is a piecewise linear function of simulated runtime:
//!
//! | runtime (h) | wear            |
//! |-------------|-----------------|
//! | < 1         | 0               |
//! | 1 .. 3      | 0 → 0.1         |
//! | 3 .. 8      | 0.1 → 1.0       |
//! | ≥ 8         | 1.0 (plateau)   |
//!
//! There is no self-healing: wear only drops when the simulator resets.

use machwatch_core::model::SensorReadings;
use machwatch_core::units::*;

const HEALTHY_UNTIL: f64 = 1.0;
const SLIGHT_WEAR_UNTIL: f64 = 3.0;
const MAJOR_WEAR_UNTIL: f64 = 8.0;

const SLIGHT_WEAR_RATE: f64 = 0.05; // per hour
const SLIGHT_WEAR_PEAK: f64 = 0.1;

/// Constant rpm target, independent of wear
pub const RPM_TARGET: f64 = 1700.0;

/// Wear in [0, 1] at a given simulated runtime
pub fn wear_at(runtime_hours: f64) -> f64 {
    if runtime_hours < HEALTHY_UNTIL {
        0.0
    } else if runtime_hours < SLIGHT_WEAR_UNTIL {
        (runtime_hours - HEALTHY_UNTIL) * SLIGHT_WEAR_RATE
    } else if runtime_hours < MAJOR_WEAR_UNTIL {
        let progress = (runtime_hours - SLIGHT_WEAR_UNTIL) / (MAJOR_WEAR_UNTIL - SLIGHT_WEAR_UNTIL);
        SLIGHT_WEAR_PEAK + progress * (1.0 - SLIGHT_WEAR_PEAK)
    } else {
        1.0
    }
}

/// Sensor targets for a wear level
///
/// At zero wear this is the healthy baseline (60 °C, 0.5 mm/s, 80 psi, 10 A,
/// 1700 rpm); at full wear 105 °C, 10.5 mm/s, 140 psi, 45 A.
pub fn target_readings(wear: f64) -> SensorReadings {
    SensorReadings {
        temperature: Celsius(60.0 + 45.0 * wear),
        vibration: MillimetersPerSecond(0.5 + 10.0 * wear),
        pressure: Psi(80.0 + 60.0 * wear),
        current: Amperes(10.0 + 35.0 * wear),
        rpm: Rpm(RPM_TARGET),
    }
}

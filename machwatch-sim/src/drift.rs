//! Sensor drift simulator
//!
//! Evolves a synthetic sensor vector that models progressive equipment wear.
//! Each tick advances a simulated runtime clock, derives target readings from
//! the wear curve and moves the current readings a fraction of the way toward
//! them with a little jitter. Readings never jump except on the first tick
//! and after a reset, where they start exactly at the target.

use crate::wear::{target_readings, wear_at};
use machwatch_core::{model::*, source::SensorSource, units::*};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Peak-to-peak jitter per channel; each tick adds `uniform(-0.5, 0.5) * amplitude`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseAmplitudes {
    pub temperature: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub current: f64,
    pub rpm: f64,
}

impl Default for NoiseAmplitudes {
    fn default() -> Self {
        Self {
            temperature: 2.0,
            vibration: 0.4,
            pressure: 3.0,
            current: 2.0,
            rpm: 20.0,
        }
    }
}

/// Tuning for [`DriftSimulator`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftConfig {
    /// Simulated hours added per tick
    pub tick_hours: f64,

    /// Runtime above which the cycle starts over
    pub ceiling_hours: f64,

    /// Fraction of the distance to target covered per tick
    pub smoothing: f64,

    pub noise: NoiseAmplitudes,

    /// Uniform ±jitter added to wear each tick, clamped to [0, 1].
    /// Zero keeps every machine on the exact reference curve.
    pub wear_jitter: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            tick_hours: 0.2,
            ceiling_hours: 15.0,
            smoothing: 0.1,
            noise: NoiseAmplitudes::default(),
            wear_jitter: 0.0,
        }
    }
}

pub struct DriftSimulator {
    config: DriftConfig,
    // Runtime is `ticks * tick_hours`; counting ticks keeps 5 ticks at exactly 1.0h
    ticks: u64,
    // Unrounded; only emitted readings are rounded
    sensors: Option<SensorReadings>,
    rng: StdRng,
}

impl DriftSimulator {
    pub fn new(config: DriftConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic simulator: same seed, same readings
    pub fn with_seed(config: DriftConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: DriftConfig, rng: StdRng) -> Self {
        Self {
            config,
            ticks: 0,
            sensors: None,
            rng,
        }
    }

    /// Whether the next tick will initialize readings at the target
    pub fn is_initialized(&self) -> bool {
        self.sensors.is_some()
    }

    /// Current wear, before jitter
    pub fn wear(&self) -> f64 {
        wear_at(self.runtime())
    }

    fn runtime(&self) -> f64 {
        self.ticks as f64 * self.config.tick_hours
    }

    /// Advance one tick and return the rounded snapshot
    pub fn tick(&mut self) -> SensorSnapshot {
        self.ticks += 1;
        let mut runtime = self.runtime();
        let mut wear = wear_at(runtime);

        if runtime > self.config.ceiling_hours {
            debug!(
                "Runtime {:.1}h passed ceiling {:.1}h, restarting wear cycle",
                runtime, self.config.ceiling_hours
            );
            self.ticks = 0;
            runtime = 0.0;
            wear = 0.0;
            self.sensors = None;
        }

        if self.config.wear_jitter > 0.0 {
            let j = self.config.wear_jitter;
            wear = (wear + self.rng.gen_range(-j..=j)).clamp(0.0, 1.0);
        }

        let target = target_readings(wear);
        let next = match self.sensors {
            None => target,
            Some(prev) => self.smooth(&prev, &target),
        };
        self.sensors = Some(next);

        SensorSnapshot {
            readings: next.rounded(),
            runtime_hours: Hours(runtime),
        }
    }

    /// Start over: runtime back to zero, readings re-initialized on the next tick
    pub fn reset(&mut self) {
        self.ticks = 0;
        self.sensors = None;
    }

    fn smooth(&mut self, prev: &SensorReadings, target: &SensorReadings) -> SensorReadings {
        let noise = self.config.noise;
        SensorReadings {
            temperature: Celsius(self.drift(prev.temperature.0, target.temperature.0, noise.temperature)),
            vibration: MillimetersPerSecond(self.drift(prev.vibration.0, target.vibration.0, noise.vibration)),
            pressure: Psi(self.drift(prev.pressure.0, target.pressure.0, noise.pressure)),
            current: Amperes(self.drift(prev.current.0, target.current.0, noise.current)),
            rpm: Rpm(self.drift(prev.rpm.0, target.rpm.0, noise.rpm)),
        }
    }

    fn drift(&mut self, prev: f64, target: f64, amplitude: f64) -> f64 {
        let jitter = (self.rng.gen::<f64>() - 0.5) * amplitude;
        prev + (target - prev) * self.config.smoothing + jitter
    }
}

impl Default for DriftSimulator {
    fn default() -> Self {
        Self::new(DriftConfig::default())
    }
}

impl SensorSource for DriftSimulator {
    fn name(&self) -> &str {
        "Drift Simulator"
    }

    fn tick(&mut self) -> SensorSnapshot {
        DriftSimulator::tick(self)
    }

    fn reset(&mut self) {
        DriftSimulator::reset(self);
    }

    fn runtime_hours(&self) -> f64 {
        self.runtime()
    }
}

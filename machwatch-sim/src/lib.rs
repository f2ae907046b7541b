//! Synthetic sensor sources for MachWatch

pub mod drift;
pub mod wear;

pub use drift::{DriftConfig, DriftSimulator, NoiseAmplitudes};
pub use wear::{target_readings, wear_at};

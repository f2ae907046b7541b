//! Sensor source trait definition

use crate::model::SensorSnapshot;

/// Trait for anything that produces sensor snapshots for a machine
///
/// A source is driven entirely by its caller:
/// - The caller owns the timer and decides when to call `tick()`
/// - The caller owns all I/O; a source never touches the network
/// - One source belongs to exactly one machine
pub trait SensorSource: Send + Sync {
    /// Get the name of this source (e.g., "Drift Simulator")
    fn name(&self) -> &str;

    /// Advance the source by one step and return the new snapshot
    ///
    /// Total: never fails, and always returns finite readings.
    fn tick(&mut self) -> SensorSnapshot;

    /// Return the source to its initial state
    ///
    /// The next `tick()` behaves exactly like the first one after construction.
    fn reset(&mut self);

    /// Simulated runtime in hours as of the last tick
    fn runtime_hours(&self) -> f64;
}

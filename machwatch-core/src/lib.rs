//! MachWatch Core Library
//!
//! This crate provides the sensor data model, the sensor source trait and
//! the risk policy applied to prediction service responses.

pub mod error;
pub mod model;
pub mod risk;
pub mod source;
pub mod units;

pub use error::PredictionError;
pub use model::{PredictionRequest, PredictionResponse, SensorReadings, SensorSnapshot};
pub use risk::{Assessment, RiskStatus};
pub use source::SensorSource;

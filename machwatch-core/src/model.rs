//! Sensor data model
//!
//! Defines the readings a sensor source produces, the request body sent to
//! the prediction service and the tolerant view of its response.

use crate::error::PredictionError;
use crate::units::*;
use serde::{Deserialize, Serialize};

/// Runtime below which any downstream risk is forced to zero
pub const RISK_GRACE_HOURS: f64 = 1.0;

/// One value per sensor channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    pub temperature: Celsius,
    pub vibration: MillimetersPerSecond,
    pub pressure: Psi,
    pub current: Amperes,
    pub rpm: Rpm,
}

impl SensorReadings {
    /// Round to the precision the prediction service is fed with:
    /// two decimals everywhere except rpm, which keeps one.
    pub fn rounded(&self) -> Self {
        Self {
            temperature: Celsius(round_to(self.temperature.0, 2)),
            vibration: MillimetersPerSecond(round_to(self.vibration.0, 2)),
            pressure: Psi(round_to(self.pressure.0, 2)),
            current: Amperes(round_to(self.current.0, 2)),
            rpm: Rpm(round_to(self.rpm.0, 1)),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.temperature.0.is_finite()
            && self.vibration.0.is_finite()
            && self.pressure.0.is_finite()
            && self.current.0.is_finite()
            && self.rpm.0.is_finite()
    }
}

/// One emitted sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    #[serde(flatten)]
    pub readings: SensorReadings,

    /// Simulated runtime after this tick (post-reset)
    pub runtime_hours: Hours,
}

impl SensorSnapshot {
    /// Whether risk derived from this snapshot must be reported as zero
    ///
    /// Judged on the emitted runtime, so the tick that wraps past the
    /// ceiling counts as runtime 0 and is suppressed too.
    pub fn risk_suppressed(&self) -> bool {
        self.runtime_hours.0 < RISK_GRACE_HOURS
    }

    /// Build the outbound request body for a machine
    pub fn to_request(&self, machine_id: &str) -> PredictionRequest {
        PredictionRequest {
            readings: self.readings,
            machine_id: machine_id.to_string(),
        }
    }
}

/// Body POSTed to the prediction service
///
/// Serializes flat: `{temperature, vibration, pressure, current, rpm, machine_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(flatten)]
    pub readings: SensorReadings,
    pub machine_id: String,
}

/// Feature contribution reported by the prediction service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

/// Prediction service response
///
/// Every field is optional because the service has shipped several naming
/// schemes. Use [`PredictionResponse::risk`] and
/// [`PredictionResponse::forecast`] rather than the raw fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionResponse {
    pub current_failure_risk: Option<f64>,
    pub failure_risk_percent: Option<f64>,
    pub failure_risk: Option<f64>,

    pub forecast_30min_risk: Option<f64>,
    pub forecast_30min_percent: Option<f64>,
    pub forecast_30min: Option<f64>,

    pub cause: Option<String>,
    pub reasons: Vec<String>,
    pub suggestions: Vec<String>,
    pub top_features: Vec<FeatureContribution>,
    pub confidence: Option<f64>,
    pub status: Option<String>,
}

impl PredictionResponse {
    /// Parse a response body, rejecting anything without a risk value
    pub fn from_json(body: &str) -> Result<Self, PredictionError> {
        let response: Self = serde_json::from_str(body)
            .map_err(|e| PredictionError::Malformed(e.to_string()))?;
        response.validate()?;
        Ok(response)
    }

    /// Ensure a usable risk value is present
    pub fn validate(&self) -> Result<(), PredictionError> {
        match self.risk() {
            Some(risk) if risk.is_finite() => Ok(()),
            Some(risk) => Err(PredictionError::Malformed(format!(
                "risk value is not finite: {}",
                risk
            ))),
            None => Err(PredictionError::Malformed(
                "response carries no failure risk field".to_string(),
            )),
        }
    }

    /// Raw risk value, first of the known aliases
    pub fn risk(&self) -> Option<f64> {
        self.current_failure_risk
            .or(self.failure_risk_percent)
            .or(self.failure_risk)
    }

    /// Raw forecast value, first of the known aliases
    pub fn forecast(&self) -> Option<f64> {
        self.forecast_30min_risk
            .or(self.forecast_30min_percent)
            .or(self.forecast_30min)
    }
}

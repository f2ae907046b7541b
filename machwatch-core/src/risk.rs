//! Risk policy applied to prediction responses
//!
//! The prediction service knows nothing about simulated runtime, so the
//! caller combines each snapshot with its response here:
//! - Risk and forecast are normalized to whole percentages
//! - Both are forced to zero during the first simulated hour
//! - A status level and alert flag are derived from the risk

use crate::model::{FeatureContribution, PredictionResponse, SensorReadings, SensorSnapshot};
use crate::units::Hours;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk at or above this percentage is WARNING
pub const WARNING_THRESHOLD: u8 = 40;

/// Risk at or above this percentage is CRITICAL
pub const CRITICAL_THRESHOLD: u8 = 75;

/// Risk at or above this percentage raises an alert
pub const ALERT_THRESHOLD: u8 = 85;

const DEFAULT_CAUSE: &str = "System operating normally";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStatus {
    Normal,
    Warning,
    Critical,
}

impl RiskStatus {
    pub fn from_percent(risk: u8) -> Self {
        match risk {
            r if r < WARNING_THRESHOLD => RiskStatus::Normal,
            r if r < CRITICAL_THRESHOLD => RiskStatus::Warning,
            _ => RiskStatus::Critical,
        }
    }
}

/// Normalize a risk value to a whole percentage
///
/// Values at or below 1 are fractions, anything above is already a percentage.
pub fn normalize_percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    let percent = if value <= 1.0 { value * 100.0 } else { value };
    percent.round().clamp(0.0, 100.0) as u8
}

/// One monitoring cycle: the snapshot we sent and what came back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub machine_id: String,
    pub timestamp: DateTime<Utc>,
    pub runtime_hours: Hours,

    /// Simulated runtime as `HH:MM:SS`
    pub runtime_label: String,

    pub readings: SensorReadings,
    pub risk_percent: u8,
    pub forecast_percent: u8,
    pub status: RiskStatus,
    pub cause: String,
    pub suggestions: Vec<String>,
    pub top_features: Vec<FeatureContribution>,
    pub confidence: Option<f64>,
    pub alert: bool,
}

impl Assessment {
    pub fn new(machine_id: &str, snapshot: &SensorSnapshot, response: &PredictionResponse) -> Self {
        let (risk_percent, forecast_percent) = if snapshot.risk_suppressed() {
            (0, 0)
        } else {
            (
                normalize_percent(response.risk().unwrap_or(0.0)),
                normalize_percent(response.forecast().unwrap_or(0.0)),
            )
        };

        let cause = if !response.reasons.is_empty() {
            response.reasons.join("; ")
        } else {
            response
                .cause
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CAUSE.to_string())
        };

        Self {
            machine_id: machine_id.to_string(),
            timestamp: Utc::now(),
            runtime_hours: snapshot.runtime_hours,
            runtime_label: snapshot.runtime_hours.clock_label(),
            readings: snapshot.readings,
            risk_percent,
            forecast_percent,
            status: RiskStatus::from_percent(risk_percent),
            cause,
            suggestions: response.suggestions.clone(),
            top_features: response.top_features.clone(),
            confidence: response.confidence,
            alert: risk_percent >= ALERT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::*;

    fn snapshot(hours: f64) -> SensorSnapshot {
        SensorSnapshot {
            readings: SensorReadings {
                temperature: Celsius(96.0),
                vibration: MillimetersPerSecond(8.5),
                pressure: Psi(128.0),
                current: Amperes(38.0),
                rpm: Rpm(1700.0),
            },
            runtime_hours: Hours(hours),
        }
    }

    fn response(risk: f64, forecast: f64) -> PredictionResponse {
        PredictionResponse {
            current_failure_risk: Some(risk),
            forecast_30min_risk: Some(forecast),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_fraction_and_percent() {
        assert_eq!(normalize_percent(0.0), 0);
        assert_eq!(normalize_percent(0.424), 42);
        assert_eq!(normalize_percent(1.0), 100);
        assert_eq!(normalize_percent(57.6), 58);
        assert_eq!(normalize_percent(140.0), 100);
        assert_eq!(normalize_percent(-0.3), 0);
        assert_eq!(normalize_percent(f64::NAN), 0);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(RiskStatus::from_percent(0), RiskStatus::Normal);
        assert_eq!(RiskStatus::from_percent(39), RiskStatus::Normal);
        assert_eq!(RiskStatus::from_percent(40), RiskStatus::Warning);
        assert_eq!(RiskStatus::from_percent(74), RiskStatus::Warning);
        assert_eq!(RiskStatus::from_percent(75), RiskStatus::Critical);
        assert_eq!(RiskStatus::from_percent(100), RiskStatus::Critical);
    }

    #[test]
    fn risk_forced_to_zero_in_first_hour() {
        let a = Assessment::new("motor", &snapshot(0.8), &response(0.9, 0.95));
        assert_eq!(a.risk_percent, 0);
        assert_eq!(a.forecast_percent, 0);
        assert_eq!(a.status, RiskStatus::Normal);
        assert!(!a.alert);
    }

    #[test]
    fn risk_passes_through_from_one_hour() {
        let a = Assessment::new("motor", &snapshot(1.0), &response(0.9, 0.95));
        assert_eq!(a.risk_percent, 90);
        assert_eq!(a.forecast_percent, 95);
        assert_eq!(a.status, RiskStatus::Critical);
        assert!(a.alert);
        assert_eq!(a.runtime_label, "01:00:00");
    }

    #[test]
    fn alert_starts_at_eighty_five() {
        let below = Assessment::new("pump", &snapshot(9.0), &response(84.0, 84.0));
        let at = Assessment::new("pump", &snapshot(9.0), &response(85.0, 85.0));
        assert!(!below.alert);
        assert!(at.alert);
    }

    #[test]
    fn missing_forecast_is_zero() {
        let resp = PredictionResponse {
            failure_risk: Some(0.5),
            ..Default::default()
        };
        let a = Assessment::new("motor", &snapshot(4.0), &resp);
        assert_eq!(a.risk_percent, 50);
        assert_eq!(a.forecast_percent, 0);
    }

    #[test]
    fn cause_prefers_reasons_then_cause() {
        let mut resp = response(0.5, 0.5);
        let a = Assessment::new("motor", &snapshot(4.0), &resp);
        assert_eq!(a.cause, "System operating normally");

        resp.cause = Some("Overheating detected".to_string());
        let a = Assessment::new("motor", &snapshot(4.0), &resp);
        assert_eq!(a.cause, "Overheating detected");

        resp.reasons = vec!["High vibration detected".into(), "Overcurrent detected".into()];
        let a = Assessment::new("motor", &snapshot(4.0), &resp);
        assert_eq!(a.cause, "High vibration detected; Overcurrent detected");
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&RiskStatus::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}

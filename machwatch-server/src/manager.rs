//! Monitor loop
//!
//! This module handles:
//! - Ticking simulators at a fixed cadence
//! - Submitting each snapshot to the prediction service
//! - Turning responses into assessments with the risk policy applied
//! - Recording, broadcasting and forwarding assessments to sinks
//!
//! A failed submission is logged and skipped. Simulator state is never
//! touched by a failure, so the next tick advances normally.

use crate::sinks::SinkSet;
use crate::state::AppState;
use machwatch_core::risk::{Assessment, RiskStatus};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub interval: Duration,

    /// Tick every machine instead of only the selected one
    pub fleet: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            fleet: false,
        }
    }
}

/// Main monitor loop, runs until cancelled
pub async fn run(state: AppState, config: MonitorConfig, cancel: CancellationToken) {
    info!(
        "Monitor started (interval {:?}, {})",
        config.interval,
        if config.fleet { "fleet" } else { "selected machine" }
    );

    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sinks = SinkSet::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if !state.is_monitoring().await {
            continue;
        }

        let assessments = monitor_cycle(&state, config.fleet).await;
        if assessments.is_empty() {
            continue;
        }

        {
            let configs = state.sinks.read().await;
            sinks.sync(&configs);
        }
        for assessment in &assessments {
            sinks.forward(assessment);
        }
    }

    info!("Monitor stopped");
}

/// Run one tick for the monitored machines and return what was recorded
pub async fn monitor_cycle(state: &AppState, fleet: bool) -> Vec<Assessment> {
    let targets = if fleet {
        state.machine_ids().await
    } else {
        state.selected_machine().await.into_iter().collect()
    };

    let mut recorded = Vec::with_capacity(targets.len());
    for machine_id in targets {
        if let Some(assessment) = assess_machine(state, &machine_id).await {
            recorded.push(assessment);
        }
    }
    recorded
}

async fn assess_machine(state: &AppState, machine_id: &str) -> Option<Assessment> {
    let tick = state.tick_machine(machine_id).await?;
    let request = tick.snapshot.to_request(machine_id);

    // No lock is held across the network call
    let response = match state.predictor.predict(&request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Prediction failed for {}: {}", machine_id, e);
            return None;
        }
    };

    let assessment = Assessment::new(machine_id, &tick.snapshot, &response);
    log_assessment(&assessment);

    if !state.record(tick.epoch, assessment.clone()).await {
        debug!("Dropped stale assessment for {} (machine was reset)", machine_id);
        return None;
    }
    Some(assessment)
}

fn log_assessment(assessment: &Assessment) {
    match assessment.status {
        RiskStatus::Critical if assessment.alert => warn!(
            "CRITICAL RISK {} at {}: {}% ({})",
            assessment.machine_id,
            assessment.runtime_label,
            assessment.risk_percent,
            assessment.cause
        ),
        _ => debug!(
            "{} {} risk {}% forecast {}% [{:?}]",
            assessment.runtime_label,
            assessment.machine_id,
            assessment.risk_percent,
            assessment.forecast_percent,
            assessment.status
        ),
    }
}

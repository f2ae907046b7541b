//! Shared helpers for server integration tests

#![allow(dead_code)]

use futures::future::{BoxFuture, FutureExt};
use machwatch_core::{PredictionError, PredictionRequest, PredictionResponse};
use machwatch_server::predictor::Predictor;
use machwatch_server::state::AppState;
use machwatch_sim::{DriftConfig, DriftSimulator};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Predictor returning a fixed risk, optionally failing on demand
pub struct StubPredictor {
    pub risk: f64,
    pub forecast: f64,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<PredictionRequest>>,
}

impl StubPredictor {
    pub fn new(risk: f64, forecast: f64) -> Arc<Self> {
        Arc::new(Self {
            risk,
            forecast,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Predictor for StubPredictor {
    fn predict<'a>(
        &'a self,
        request: &'a PredictionRequest,
    ) -> BoxFuture<'a, Result<PredictionResponse, PredictionError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let result = if self.fail.load(Ordering::SeqCst) {
            Err(PredictionError::Transport("connection refused".to_string()))
        } else {
            Ok(PredictionResponse {
                current_failure_risk: Some(self.risk),
                forecast_30min_risk: Some(self.forecast),
                reasons: vec!["Overheating detected".to_string()],
                suggestions: vec!["Inspect/repair cooling system".to_string()],
                confidence: Some(0.74),
                ..Default::default()
            })
        };
        async move { result }.boxed()
    }
}

pub const MACHINES: [&str; 4] = ["motor", "generator", "compressor", "hydraulic"];

/// State with the four default machines registered on seeded simulators
pub async fn state_with_machines(predictor: Arc<StubPredictor>) -> AppState {
    let state = AppState::new(predictor);
    for (i, id) in MACHINES.iter().enumerate() {
        let sim = DriftSimulator::with_seed(DriftConfig::default(), i as u64);
        state.register_machine(id, Box::new(sim)).await;
    }
    state
}

/// Runtime of a machine's simulator
pub async fn runtime_of(state: &AppState, machine_id: &str) -> f64 {
    let machines = state.machines.read().await;
    machines
        .iter()
        .find(|m| m.machine_id == machine_id)
        .map(|m| m.source.runtime_hours())
        .unwrap()
}

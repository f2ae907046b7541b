//! Application state management

use crate::predictor::Predictor;
use machwatch_core::{risk::Assessment, source::SensorSource, SensorSnapshot};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

/// Points kept per machine, matching the dashboard's chart window
pub const HISTORY_CAPACITY: usize = 41;

/// One monitored machine and its private simulator
pub struct MachineSlot {
    pub machine_id: String,
    pub source: Box<dyn SensorSource>,

    /// Bumped on every reset so in-flight results from before it are dropped
    pub epoch: u64,

    pub latest: Option<Assessment>,
    pub history: VecDeque<Assessment>,
}

impl MachineSlot {
    pub fn new(machine_id: String, source: Box<dyn SensorSource>) -> Self {
        Self {
            machine_id,
            source,
            epoch: 0,
            latest: None,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Reset the simulator and forget everything it produced
    pub fn reset(&mut self) {
        self.source.reset();
        self.epoch += 1;
        self.latest = None;
        self.history.clear();
    }

    fn push(&mut self, assessment: Assessment) {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(assessment.clone());
        self.latest = Some(assessment);
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// All registered machines, in registration order
    pub machines: Arc<RwLock<Vec<MachineSlot>>>,

    /// Machine currently shown on the dashboard
    pub selected: Arc<RwLock<Option<String>>>,

    /// Whether the monitor loop submits snapshots
    pub monitoring: Arc<RwLock<bool>>,

    /// Broadcast channel for assessments
    /// Multiple consumers can subscribe to receive them
    pub assessment_tx: broadcast::Sender<Assessment>,

    /// Sinks for forwarding assessments
    pub sinks: Arc<RwLock<Vec<SinkConfig>>>,

    /// Remote prediction service
    pub predictor: Arc<dyn Predictor>,
}

/// Configuration for an output sink
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SinkConfig {
    pub id: String,
    pub sink_type: SinkType,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkType {
    Http { url: String },
    Udp { host: String, port: u16 },
    File { path: String },
}

/// Snapshot taken by the monitor loop, tagged with the slot epoch it came from
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    pub epoch: u64,
    pub snapshot: SensorSnapshot,
}

impl AppState {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        // Create broadcast channel with capacity for 100 assessments
        let (assessment_tx, _) = broadcast::channel(100);

        Self {
            machines: Arc::new(RwLock::new(Vec::new())),
            selected: Arc::new(RwLock::new(None)),
            monitoring: Arc::new(RwLock::new(false)),
            assessment_tx,
            sinks: Arc::new(RwLock::new(Vec::new())),
            predictor,
        }
    }

    /// Register a machine; the first one registered becomes the selection
    pub async fn register_machine(&self, machine_id: &str, source: Box<dyn SensorSource>) {
        let mut machines = self.machines.write().await;
        machines.push(MachineSlot::new(machine_id.to_string(), source));

        let mut selected = self.selected.write().await;
        if selected.is_none() {
            *selected = Some(machine_id.to_string());
        }
    }

    /// Switch the selected machine
    ///
    /// The newly selected machine starts a fresh cycle. Returns false for an
    /// unknown machine id.
    pub async fn select_machine(&self, machine_id: &str) -> bool {
        let mut machines = self.machines.write().await;
        let Some(slot) = machines.iter_mut().find(|m| m.machine_id == machine_id) else {
            return false;
        };
        slot.reset();

        let mut selected = self.selected.write().await;
        *selected = Some(machine_id.to_string());
        info!("Selected machine {}, simulator reset", machine_id);
        true
    }

    pub async fn selected_machine(&self) -> Option<String> {
        self.selected.read().await.clone()
    }

    pub async fn machine_ids(&self) -> Vec<String> {
        let machines = self.machines.read().await;
        machines.iter().map(|m| m.machine_id.clone()).collect()
    }

    pub async fn set_monitoring(&self, enabled: bool) {
        let mut monitoring = self.monitoring.write().await;
        if *monitoring != enabled {
            info!("Monitoring {}", if enabled { "started" } else { "stopped" });
        }
        *monitoring = enabled;
    }

    pub async fn is_monitoring(&self) -> bool {
        *self.monitoring.read().await
    }

    /// Advance one machine's simulator
    pub async fn tick_machine(&self, machine_id: &str) -> Option<TickResult> {
        let mut machines = self.machines.write().await;
        let slot = machines.iter_mut().find(|m| m.machine_id == machine_id)?;
        Some(TickResult {
            epoch: slot.epoch,
            snapshot: slot.source.tick(),
        })
    }

    /// Store and broadcast an assessment
    ///
    /// Returns false if the machine was reset since the snapshot was taken,
    /// in which case the assessment is dropped.
    pub async fn record(&self, epoch: u64, assessment: Assessment) -> bool {
        {
            let mut machines = self.machines.write().await;
            let Some(slot) = machines
                .iter_mut()
                .find(|m| m.machine_id == assessment.machine_id)
            else {
                return false;
            };
            if slot.epoch != epoch {
                return false;
            }
            slot.push(assessment.clone());
        }

        // Ignore error if no receivers (they'll get the next one)
        let _ = self.assessment_tx.send(assessment);
        true
    }

    /// Subscribe to assessments
    pub fn subscribe(&self) -> broadcast::Receiver<Assessment> {
        self.assessment_tx.subscribe()
    }
}

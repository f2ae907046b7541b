//! Command line and environment configuration

use clap::Parser;
use machwatch_sim::DriftConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND: &str = "0.0.0.0:9100";
const DEFAULT_PREDICT_URL: &str = "http://127.0.0.1:8000/predict";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "machwatch-server",
    about = "Simulated machine wear monitor feeding a remote failure predictor"
)]
pub struct Config {
    /// Address to bind the HTTP API to.
    #[arg(long, env = "MACHWATCH_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Prediction service endpoint snapshots are POSTed to.
    #[arg(long, env = "API_URL", default_value = DEFAULT_PREDICT_URL)]
    pub predict_url: String,

    /// Milliseconds between monitor ticks.
    #[arg(long, env = "MACHWATCH_INTERVAL_MS", default_value_t = 3000)]
    pub interval_ms: u64,

    /// Timeout for a single prediction request, in milliseconds.
    #[arg(long, env = "MACHWATCH_REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    pub request_timeout_ms: u64,

    /// Machines to monitor; the first is selected at startup.
    #[arg(
        long,
        env = "MACHWATCH_MACHINES",
        value_delimiter = ',',
        default_value = "motor,generator,compressor,hydraulic"
    )]
    pub machines: Vec<String>,

    /// Tick every machine each cycle instead of only the selected one.
    #[arg(long, env = "MACHWATCH_FLEET")]
    pub fleet: bool,

    /// Uniform jitter added to wear each tick so machines drift apart.
    #[arg(long, env = "MACHWATCH_WEAR_JITTER", default_value_t = 0.0)]
    pub wear_jitter: f64,

    /// Seed for reproducible simulators; each machine offsets it by its index.
    #[arg(long, env = "MACHWATCH_SEED")]
    pub seed: Option<u64>,

    /// Append every assessment to this NDJSON prediction log.
    #[arg(long, env = "MACHWATCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Start with monitoring stopped.
    #[arg(long)]
    pub paused: bool,
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn drift_config(&self) -> DriftConfig {
        DriftConfig {
            wear_jitter: self.wear_jitter.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Trimmed, non-empty, de-duplicated machine ids in the given order
    pub fn machine_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in self.machines.iter().map(|m| m.trim().to_lowercase()) {
            if !id.is_empty() && !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard() {
        let config = Config::parse_from(["machwatch-server"]);
        assert_eq!(config.interval(), Duration::from_secs(3));
        assert_eq!(config.predict_url, DEFAULT_PREDICT_URL);
        assert_eq!(
            config.machine_ids(),
            vec!["motor", "generator", "compressor", "hydraulic"]
        );
        assert!(!config.fleet);
        assert!(!config.paused);
        assert_eq!(config.drift_config(), DriftConfig::default());
    }

    #[test]
    fn machine_list_is_cleaned() {
        let config = Config::parse_from([
            "machwatch-server",
            "--machines",
            " Motor ,pump,,motor",
        ]);
        assert_eq!(config.machine_ids(), vec!["motor", "pump"]);
    }

    #[test]
    fn wear_jitter_flows_into_drift_config() {
        let config = Config::parse_from(["machwatch-server", "--wear-jitter", "0.05", "--fleet"]);
        assert!(config.fleet);
        assert_eq!(config.drift_config().wear_jitter, 0.05);
    }
}

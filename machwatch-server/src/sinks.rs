//! Output sink implementations
//!
//! Sinks forward assessments to various destinations (HTTP, UDP, file).
//! A file sink doubles as the prediction log: one JSON object per line.

use crate::state::{SinkConfig, SinkType};
use anyhow::Result;
use machwatch_core::risk::Assessment;
use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use tracing::{info, warn};

/// Trait for output sinks
pub trait Sink: Send {
    fn send(&mut self, assessment: &Assessment) -> Result<()>;
}

/// HTTP POST sink
pub struct HttpSink {
    url: String,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

impl Sink for HttpSink {
    fn send(&mut self, assessment: &Assessment) -> Result<()> {
        let json = serde_json::to_string(assessment)?;
        // Fire and forget (non-blocking)
        let url = self.url.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = client
                .post(&url)
                .header("content-type", "application/json")
                .body(json)
                .send()
                .await
            {
                warn!("HTTP sink error: {}", e);
            }
        });
        Ok(())
    }
}

/// UDP sink
pub struct UdpSink {
    socket: UdpSocket,
    addr: SocketAddr,
}

impl UdpSink {
    /// Resolve `host` once at open time; hostnames such as `localhost` are accepted
    pub fn new(host: String, port: u16) -> Result<Self> {
        let addrs: Vec<SocketAddr> = (host.as_str(), port).to_socket_addrs()?.collect();
        let addr = addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("{} did not resolve to an address", host))?;
        let local = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, addr })
    }
}

impl Sink for UdpSink {
    fn send(&mut self, assessment: &Assessment) -> Result<()> {
        let json = serde_json::to_string(assessment)?;
        self.socket.send_to(json.as_bytes(), self.addr)?;
        Ok(())
    }
}

/// File sink (NDJSON)
pub struct FileSink {
    file: std::fs::File,
}

impl FileSink {
    pub fn new(path: String) -> Result<Self> {
        use std::fs::OpenOptions;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl Sink for FileSink {
    fn send(&mut self, assessment: &Assessment) -> Result<()> {
        use std::io::Write;
        let json = serde_json::to_string(assessment)?;
        writeln!(self.file, "{}", json)?;
        Ok(())
    }
}

/// Create a sink from configuration
pub fn create_sink(config: &SinkConfig) -> Result<Box<dyn Sink>> {
    match &config.sink_type {
        SinkType::Http { url } => Ok(Box::new(HttpSink::new(url.clone()))),
        SinkType::Udp { host, port } => Ok(Box::new(UdpSink::new(host.clone(), *port)?)),
        SinkType::File { path } => Ok(Box::new(FileSink::new(path.clone())?)),
    }
}

/// Live sinks, kept in step with the configured list
///
/// Each open sink remembers the destination it was opened for, so a config
/// that reuses an id with a new destination gets a fresh sink. Sinks that
/// failed to open are not retried until their config changes.
#[derive(Default)]
pub struct SinkSet {
    active: HashMap<String, (SinkType, Box<dyn Sink>)>,
    failed: HashMap<String, SinkType>,
}

impl SinkSet {
    /// Open sinks that were added or changed and drop sinks that were removed
    pub fn sync(&mut self, configs: &[SinkConfig]) {
        let configured = |id: &String, sink_type: &SinkType| {
            configs
                .iter()
                .any(|c| &c.id == id && &c.sink_type == sink_type)
        };
        self.active
            .retain(|id, (sink_type, _)| configured(id, sink_type));
        self.failed
            .retain(|id, sink_type| configured(id, sink_type));

        for config in configs {
            if self.active.contains_key(&config.id) || self.failed.contains_key(&config.id) {
                continue;
            }
            match create_sink(config) {
                Ok(sink) => {
                    info!("Opened sink {}", config.id);
                    self.active
                        .insert(config.id.clone(), (config.sink_type.clone(), sink));
                }
                Err(e) => {
                    warn!("Failed to open sink {}: {}", config.id, e);
                    self.failed
                        .insert(config.id.clone(), config.sink_type.clone());
                }
            }
        }
    }

    pub fn forward(&mut self, assessment: &Assessment) {
        for (id, (_, sink)) in self.active.iter_mut() {
            if let Err(e) = sink.send(assessment) {
                warn!("Sink {} failed: {}", id, e);
            }
        }
    }

    /// Number of open sinks
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

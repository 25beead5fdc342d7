use crate::config::ListenerConfig;
use anyhow::{Context, Result};
use netflow_v5::{DecodeError, FlowBatch, decode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::UdpSocket;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub(crate) struct IngestMetrics {
    pub(crate) udp_packets_received: AtomicU64,
    pub(crate) udp_bytes_received: AtomicU64,
    pub(crate) decoded_packets: AtomicU64,
    pub(crate) decoded_flows: AtomicU64,
    pub(crate) short_header_rejects: AtomicU64,
    pub(crate) version_rejects: AtomicU64,
    pub(crate) truncation_rejects: AtomicU64,
}

impl IngestMetrics {
    fn observe_reject(&self, err: &DecodeError) {
        let counter = match err {
            DecodeError::HeaderTooShort => &self.short_header_rejects,
            DecodeError::UnsupportedVersion(_) => &self.version_rejects,
            DecodeError::Truncated { .. } => &self.truncation_rejects,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn log_snapshot(&self) {
        tracing::info!(
            udp_packets_received = self.udp_packets_received.load(Ordering::Relaxed),
            udp_bytes_received = self.udp_bytes_received.load(Ordering::Relaxed),
            decoded_packets = self.decoded_packets.load(Ordering::Relaxed),
            decoded_flows = self.decoded_flows.load(Ordering::Relaxed),
            short_header_rejects = self.short_header_rejects.load(Ordering::Relaxed),
            version_rejects = self.version_rejects.load(Ordering::Relaxed),
            truncation_rejects = self.truncation_rejects.load(Ordering::Relaxed),
            "ingest counters"
        );
    }
}

pub(crate) struct IngestService {
    cfg: ListenerConfig,
    metrics: Arc<IngestMetrics>,
}

impl IngestService {
    pub(crate) fn new(cfg: ListenerConfig, metrics: Arc<IngestMetrics>) -> Self {
        Self { cfg, metrics }
    }

    pub(crate) async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let socket = UdpSocket::bind(&self.cfg.listen)
            .await
            .with_context(|| format!("failed to bind {}", self.cfg.listen))?;
        tracing::info!("listening for netflow v5 exports on {}", self.cfg.listen);

        let mut buffer = vec![0_u8; self.cfg.max_packet_size];
        let mut stats_tick = tokio::time::interval(self.cfg.stats_interval);
        stats_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    break;
                }
                _ = stats_tick.tick() => {
                    self.metrics.log_snapshot();
                }
                recv = socket.recv_from(&mut buffer) => {
                    let (received, source) = match recv {
                        Ok(result) => result,
                        Err(err) => {
                            tracing::warn!("udp recv error: {}", err);
                            continue;
                        }
                    };

                    if received == 0 {
                        continue;
                    }

                    self.metrics.udp_packets_received.fetch_add(1, Ordering::Relaxed);
                    self.metrics
                        .udp_bytes_received
                        .fetch_add(received as u64, Ordering::Relaxed);

                    self.handle_datagram(source, &buffer[..received]);
                }
            }
        }

        self.metrics.log_snapshot();
        Ok(())
    }

    // One datagram in, log lines out. Rejected packets are counted, logged
    // and dropped; the loop keeps listening.
    fn handle_datagram(&self, source: SocketAddr, payload: &[u8]) {
        let batch = match decode(payload) {
            Ok(batch) => batch,
            Err(err) => {
                self.metrics.observe_reject(&err);
                tracing::warn!("dropping datagram from {}: {}", source, err);
                return;
            }
        };

        self.metrics.decoded_packets.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .decoded_flows
            .fetch_add(batch.records().len() as u64, Ordering::Relaxed);

        log_batch(source, &batch);
    }
}

fn log_batch(source: SocketAddr, batch: &FlowBatch) {
    let header = batch.header();
    tracing::info!(
        "netflow v5 packet: {} flows from {}",
        header.record_count,
        source
    );
    tracing::debug!(
        "sys_uptime_ms={} unix_seconds={} flow_sequence={}",
        header.sys_uptime_ms,
        header.unix_seconds,
        header.flow_sequence
    );

    for (index, flow) in batch.records().iter().enumerate() {
        tracing::info!(
            "flow {}: {}:{} -> {}:{} proto={} bytes={} packets={}",
            index,
            flow.src_ip(),
            flow.src_port,
            flow.dst_ip(),
            flow.dst_port,
            flow.protocol,
            flow.octet_count,
            flow.packet_count
        );
    }
}

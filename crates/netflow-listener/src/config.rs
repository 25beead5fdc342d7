use clap::Parser;
use std::time::Duration;

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|e| {
        format!(
            "invalid duration '{}' (examples: '1s', '5m', '1h'): {}",
            value, e
        )
    })
}

/// Receives NetFlow v5 export datagrams over UDP and logs the decoded flows.
#[derive(Debug, Parser, Clone)]
#[command(name = "netflow-listener")]
pub(crate) struct ListenerConfig {
    /// Address to receive export datagrams on.
    #[arg(long = "listen", default_value = "0.0.0.0:2055")]
    pub(crate) listen: String,

    /// Receive buffer size; the OS truncates larger datagrams.
    #[arg(long = "max-packet-size", default_value_t = 64 * 1024)]
    pub(crate) max_packet_size: usize,

    /// How often to log an ingest counters snapshot.
    #[arg(
        long = "stats-interval",
        default_value = "60s",
        value_parser = parse_duration
    )]
    pub(crate) stats_interval: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:2055".to_string(),
            max_packet_size: 64 * 1024,
            stats_interval: Duration::from_secs(60),
        }
    }
}

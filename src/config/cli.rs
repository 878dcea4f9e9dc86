//! Command-line surface.
//!
//! Flags mirror the config file and win over it: the effective config is
//! file (or defaults) with every given flag applied on top.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::RelayConfig;

#[derive(Debug, Parser)]
#[command(name = "relayq")]
#[command(about = "Forwarding HTTP relay with an asynchronous retry queue", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Downstream base URL requests are relayed to.
    #[arg(long, value_name = "URL")]
    pub to: Option<String>,

    /// Address the ingress listener binds to.
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Milliseconds between retry cycles.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Maximum number of buffered requests.
    #[arg(long, value_name = "N")]
    pub capacity: Option<usize>,

    /// Per-attempt delivery timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub request_timeout_ms: Option<u64>,

    /// Abort a retry cycle on the first failure so request order is
    /// preserved. Specify as --abort-on-error=value.
    #[arg(long, value_name = "BOOL")]
    pub abort_on_error: Option<bool>,

    /// Drop requests older than this many milliseconds (0 = unlimited).
    #[arg(long, value_name = "MS")]
    pub max_age_ms: Option<u64>,

    /// Drop requests after this many retries (0 = unlimited).
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Force debug-level logging of relayed requests.
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Apply every given flag over the loaded configuration.
    pub fn apply(&self, config: &mut RelayConfig) {
        if let Some(to) = &self.to {
            config.forward.target = to.clone();
        }
        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if let Some(interval_ms) = self.interval_ms {
            config.retry.interval_ms = interval_ms;
        }
        if let Some(capacity) = self.capacity {
            config.retry.capacity = capacity;
        }
        if let Some(request_timeout_ms) = self.request_timeout_ms {
            config.forward.request_timeout_ms = request_timeout_ms;
        }
        if let Some(abort_on_error) = self.abort_on_error {
            config.retry.abort_on_error = abort_on_error;
        }
        if let Some(max_age_ms) = self.max_age_ms {
            config.retry.max_age_ms = max_age_ms;
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if self.debug {
            config.observability.log_level = "debug".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "relayq",
            "--to",
            "http://other:9000",
            "--capacity",
            "7",
            "--abort-on-error=false",
            "--debug",
        ]);

        let mut config = RelayConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.forward.target, "http://other:9000");
        assert_eq!(config.retry.capacity, 7);
        assert!(!config.retry.abort_on_error);
        assert_eq!(config.observability.log_level, "debug");
        // untouched flags keep their file/default values
        assert_eq!(config.retry.interval_ms, 5000);
    }
}

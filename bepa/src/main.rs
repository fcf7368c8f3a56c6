#![forbid(unsafe_code)]

use bepa_lib::config::{read_from_path, validate, Config, ExclusionConfig, TargetRangeConfig};
use bepa_lib::scanner::ConnectionScanner;
use bepa_lib::telemetry::init_tracing;
use bepa_lib::{MonitorError, Scheduler};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Alert on outgoing connections into monitored IP ranges")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(short, long, value_name = "FILE", env = "BEPA_CONFIG", default_value = "config/bepa.toml")]
    config: PathBuf,

    /// Replace the configured target ranges (comma separated CIDRs or addresses)
    #[arg(long, value_name = "CIDR", env = "BEPA_TARGET_RANGES", value_delimiter = ',')]
    targets: Vec<String>,

    /// Replace the configured exclusions (comma separated CIDRs or addresses)
    #[arg(long, value_name = "CIDR", env = "BEPA_EXCLUDE_RANGES", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Override the polling interval in seconds
    #[arg(long, value_name = "SECS", env = "BEPA_MONITOR_INTERVAL")]
    interval: Option<u64>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut Config) {
        let targets: Vec<_> = non_empty(&self.targets).map(TargetRangeConfig::new).collect();
        if !targets.is_empty() {
            cfg.targets = targets;
        }
        let exclusions: Vec<_> = non_empty(&self.exclude).map(ExclusionConfig::new).collect();
        if !exclusions.is_empty() {
            cfg.exclusions = exclusions;
        }
        if let Some(secs) = self.interval {
            cfg.monitor.interval_secs = secs;
        }
    }
}

fn non_empty(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn load_config(cli: &Cli) -> Result<Config, MonitorError> {
    let mut cfg = read_from_path(&cli.config)?;
    cli.apply(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            if init_tracing("info", false).is_err() {
                eprintln!("failed to load configuration: {err}");
            }
            error!(%err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(&cfg.logging.level, cfg.logging.show_target) {
        eprintln!("failed to initialize logging: {err}");
        std::process::exit(1);
    }

    for target in &cfg.targets {
        info!(range = %target.range, label = ?target.label, "monitoring range");
    }
    if cfg.exclusions.is_empty() {
        info!("no ranges excluded from monitoring");
    }
    for exclusion in &cfg.exclusions {
        info!(range = %exclusion.range, "excluding range");
    }

    let scanner = ConnectionScanner::system();
    let mut scheduler = match Scheduler::from_config(&cfg, scanner) {
        Ok(s) => s,
        Err(err) => {
            error!(%err, "failed to start monitor");
            std::process::exit(1);
        }
    };

    if cli.check {
        println!("configuration OK: {}", cli.config.display());
        println!("  interval: {}s", cfg.monitor.interval_secs);
        for target in scheduler.matcher().targets() {
            println!("  target: {target}");
        }
        for exclusion in scheduler.matcher().exclusions() {
            println!("  exclude: {}", exclusion.network());
        }
        return;
    }

    if !is_root::is_root() {
        warn!("running without root privileges, some connections may lack process attribution");
    }

    let shutdown = CancellationToken::new();
    if let Err(err) = spawn_signal_handler(shutdown.clone()) {
        error!(%err, "failed to install signal handlers");
        std::process::exit(1);
    }

    scheduler.run(shutdown).await;

    // Dropping the runtime would wait for a scan stuck in the OS.
    if scheduler.scan_in_flight() {
        warn!("connection scan still blocked, exiting without waiting for it");
        std::process::exit(0);
    }
}

/// Cancel `shutdown` on SIGINT or SIGTERM
fn spawn_signal_handler(shutdown: CancellationToken) -> std::io::Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        }
        shutdown.cancel();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Result<Config, MonitorError> {
        bepa_lib::config::load_from_str(
            r#"
[monitor]
suppression_window_secs = 60
grace_period_secs = 300

[[targets]]
range = "10.0.0.0/8"
label = "corp"
"#,
        )
    }

    #[test]
    fn test_overrides_replace_ranges_and_interval() -> Result<(), MonitorError> {
        let cli = Cli::parse_from([
            "bepa",
            "--targets",
            "192.168.0.0/16, 172.16.0.0/12",
            "--exclude",
            "192.168.1.1",
            "--interval",
            "5",
        ]);
        let mut cfg = base_config()?;
        cli.apply(&mut cfg);
        validate(&cfg)?;

        assert_eq!(
            cfg.targets,
            vec![TargetRangeConfig::new("192.168.0.0/16"), TargetRangeConfig::new("172.16.0.0/12")]
        );
        assert_eq!(cfg.exclusions, vec![ExclusionConfig::new("192.168.1.1")]);
        assert_eq!(cfg.monitor.interval_secs, 5);
        Ok(())
    }

    #[test]
    fn test_no_overrides_keeps_file_values() -> Result<(), MonitorError> {
        let cli = Cli::parse_from(["bepa"]);
        let mut cfg = base_config()?;
        let before = cfg.clone();
        cli.apply(&mut cfg);
        assert_eq!(cfg, before);
        Ok(())
    }

    #[test]
    fn test_bad_override_fails_validation() -> Result<(), MonitorError> {
        let cli = Cli::parse_from(["bepa", "--targets", "not-an-ip"]);
        let mut cfg = base_config()?;
        cli.apply(&mut cfg);
        assert!(matches!(validate(&cfg), Err(MonitorError::Config(_))));
        Ok(())
    }
}

use std::io::Write;
use std::time::Duration;

use bepa_lib::config::{load_from_path, load_from_str, read_from_path, validate, Urgency};
use bepa_lib::MonitorError;
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn write_config(toml: &str) -> Result<NamedTempFile, std::io::Error> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{toml}")?;
    file.flush()?;
    Ok(file)
}

#[test]
fn loads_full_config() -> TestResult {
    let file = write_config(
        r#"
[monitor]
interval_secs = 4
suppression_window_secs = 120
grace_period_secs = 600
scan_timeout_ms = 1500

[[targets]]
range = "192.168.1.0/24"
label = "office LAN"

[[targets]]
range = "10.0.0.0/8"

[[exclusions]]
range = "192.168.1.1"

[notification]
command = "notify-send"
title = "Watch out"
urgency = "normal"
timeout_ms = 800

[logging]
level = "debug"
show_target = true
"#,
    )?;

    let cfg = load_from_path(file.path())?;
    assert_eq!(cfg.monitor.interval(), Duration::from_secs(4));
    assert_eq!(cfg.monitor.suppression_window(), Duration::from_secs(120));
    assert_eq!(cfg.monitor.grace_period(), Duration::from_secs(600));
    assert_eq!(cfg.monitor.scan_timeout(), Duration::from_millis(1500));
    assert_eq!(cfg.targets.len(), 2);
    assert_eq!(cfg.targets[0].label.as_deref(), Some("office LAN"));
    assert!(cfg.targets[1].label.is_none());
    assert_eq!(cfg.exclusions.len(), 1);
    assert_eq!(cfg.notification.title, "Watch out");
    assert_eq!(cfg.notification.urgency, Urgency::Normal);
    assert_eq!(cfg.notification_timeout(), Duration::from_millis(800));
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.show_target);
    Ok(())
}

#[test]
fn applies_defaults() -> TestResult {
    let cfg = load_from_str(
        r#"
[monitor]
suppression_window_secs = 60
grace_period_secs = 300

[[targets]]
range = "192.168.1.0/24"
"#,
    )?;

    assert_eq!(cfg.monitor.interval(), Duration::from_secs(2));
    assert_eq!(cfg.monitor.scan_timeout(), Duration::from_millis(500));
    assert_eq!(cfg.notification_timeout(), Duration::from_millis(500));
    assert!(cfg.exclusions.is_empty());
    assert!(cfg.notification.enabled);
    assert!(!cfg.notification.required);
    assert_eq!(cfg.notification.command, "notify-send");
    assert_eq!(cfg.notification.title, "Bepa Alert");
    assert_eq!(cfg.notification.urgency, Urgency::Critical);
    assert_eq!(cfg.logging.level, "info");
    Ok(())
}

#[test]
fn rejects_malformed_range() {
    let result = load_from_str(
        r#"
[monitor]
suppression_window_secs = 60
grace_period_secs = 300

[[targets]]
range = "not-an-ip"
"#,
    );
    match result {
        Err(MonitorError::Config(msg)) => assert!(msg.contains("not-an-ip")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn rejects_malformed_exclusion() {
    let result = load_from_str(
        r#"
[monitor]
suppression_window_secs = 60
grace_period_secs = 300

[[targets]]
range = "10.0.0.0/8"

[[exclusions]]
range = "10.0.0.300"
"#,
    );
    assert!(matches!(result, Err(MonitorError::Config(_))));
}

#[test]
fn requires_suppression_window_and_grace_period() {
    let missing_window = load_from_str(
        r#"
[monitor]
grace_period_secs = 300

[[targets]]
range = "10.0.0.0/8"
"#,
    );
    assert!(matches!(missing_window, Err(MonitorError::Config(_))));

    let missing_grace = load_from_str(
        r#"
[monitor]
suppression_window_secs = 60

[[targets]]
range = "10.0.0.0/8"
"#,
    );
    assert!(matches!(missing_grace, Err(MonitorError::Config(_))));
}

#[test]
fn requires_at_least_one_target() {
    let result = load_from_str(
        r#"
[monitor]
suppression_window_secs = 60
grace_period_secs = 300
"#,
    );
    assert!(matches!(result, Err(MonitorError::Config(_))));
}

#[test]
fn rejects_zero_interval() {
    let result = load_from_str(
        r#"
[monitor]
interval_secs = 0
suppression_window_secs = 60
grace_period_secs = 300

[[targets]]
range = "10.0.0.0/8"
"#,
    );
    assert!(matches!(result, Err(MonitorError::Config(_))));
}

#[test]
fn rejects_timeouts_longer_than_half_the_interval() {
    let scan = load_from_str(
        r#"
[monitor]
interval_secs = 2
suppression_window_secs = 60
grace_period_secs = 300
scan_timeout_ms = 1001

[[targets]]
range = "10.0.0.0/8"
"#,
    );
    assert!(matches!(scan, Err(MonitorError::Config(_))));

    let notify = load_from_str(
        r#"
[monitor]
interval_secs = 2
suppression_window_secs = 60
grace_period_secs = 300

[[targets]]
range = "10.0.0.0/8"

[notification]
timeout_ms = 5000
"#,
    );
    assert!(matches!(notify, Err(MonitorError::Config(_))));
}

#[test]
fn rejects_empty_command_when_enabled() {
    let result = load_from_str(
        r#"
[monitor]
suppression_window_secs = 60
grace_period_secs = 300

[[targets]]
range = "10.0.0.0/8"

[notification]
command = "  "
"#,
    );
    assert!(matches!(result, Err(MonitorError::Config(_))));
}

#[test]
fn read_defers_validation() -> TestResult {
    let file = write_config(
        r#"
[monitor]
suppression_window_secs = 60
grace_period_secs = 300
"#,
    )?;

    let cfg = read_from_path(file.path())?;
    assert!(cfg.targets.is_empty());
    assert!(matches!(validate(&cfg), Err(MonitorError::Config(_))));
    Ok(())
}

#[test]
fn missing_file_is_config_error() {
    let result = load_from_path("/nonexistent/bepa/config.toml");
    assert!(matches!(result, Err(MonitorError::Config(_))));
}

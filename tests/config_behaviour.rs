// tests/config_behaviour.rs

//! Loading and validating the TOML configuration.

use std::error::Error;
use std::fs;

use mosaicwatch::config::loader::{load_and_validate, load_from_path};
use mosaicwatch::config::validate::validate_config;
use mosaicwatch_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("Mosaicwatch.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn full_config_loads_with_all_fields() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        &dir,
        r#"
            [config]
            stall_timeout_ms = 3000
            initial_mode = "safe"

            [stream]
            endpoint = "srt://10.0.0.1:8080"

            [[slot]]
            stream_id = "live/stream1"
            udp_port = 5000

            [[slot]]
            stream_id = "live/stream2"
            udp_port = 5001
        "#,
    );

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.config.stall_timeout_ms, 3000);
    assert_eq!(cfg.config.initial_mode, "safe");
    assert_eq!(cfg.stream.endpoint, "srt://10.0.0.1:8080");
    assert_eq!(cfg.slots.len(), 2);
    assert_eq!(cfg.slots[1].udp_port, 5001);

    Ok(())
}

#[test]
fn omitted_sections_fall_back_to_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        &dir,
        r#"
            [[slot]]
            stream_id = "live/stream1"
            udp_port = 5000
        "#,
    );

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.config.stall_timeout_ms, 5000);
    assert_eq!(cfg.config.initial_mode, "srt");
    assert!(cfg.stream.endpoint.starts_with("srt://"));

    Ok(())
}

#[test]
fn missing_file_and_invalid_toml_are_reported_with_context() -> TestResult {
    let dir = tempfile::tempdir()?;

    let missing = dir.path().join("nope.toml");
    let err = load_from_path(&missing).expect_err("missing file must fail");
    assert!(format!("{err:#}").contains("reading config file"));

    let path = write_config(&dir, "[[slot\nstream_id = ");
    let err = load_from_path(&path).expect_err("broken TOML must fail");
    assert!(format!("{err:#}").contains("parsing TOML config"));

    Ok(())
}

#[test]
fn an_empty_slot_list_is_rejected() {
    let cfg = ConfigFileBuilder::new().build();
    let err = validate_config(&cfg).expect_err("no slots must fail");
    assert!(err.to_string().contains("[[slot]]"));
}

#[test]
fn duplicate_udp_ports_are_rejected() {
    let cfg = ConfigFileBuilder::new()
        .with_slot("live/stream1", 5000)
        .with_slot("live/stream2", 5000)
        .build();
    let err = validate_config(&cfg).expect_err("duplicate ports must fail");
    assert!(err.to_string().contains("5000"));
}

#[test]
fn empty_stream_ids_are_rejected() {
    let cfg = ConfigFileBuilder::new().with_slot("  ", 5000).build();
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn a_sub_threshold_stall_timeout_is_rejected() {
    let cfg = ConfigFileBuilder::new()
        .with_slot("live/stream1", 5000)
        .with_stall_timeout_ms(10)
        .build();
    let err = validate_config(&cfg).expect_err("tiny timeout must fail");
    assert!(err.to_string().contains("stall_timeout_ms"));
}

#[test]
fn unknown_initial_modes_are_rejected() {
    let cfg = ConfigFileBuilder::new()
        .with_slot("live/stream1", 5000)
        .with_initial_mode("sideways")
        .build();
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn non_srt_endpoints_are_rejected() {
    let cfg = ConfigFileBuilder::new()
        .with_slot("live/stream1", 5000)
        .with_endpoint("udp://127.0.0.1:8080")
        .build();
    let err = validate_config(&cfg).expect_err("wrong scheme must fail");
    assert!(err.to_string().contains("srt://"));
}

#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn myolink(args: &[&str]) -> Output {
    myolink_at("error", args)
}

fn myolink_at(level: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_myolink"))
        .args(["--log-level", level, "--format", "json"])
        .args(args)
        .env_remove("MYOLINK_FORMAT")
        .env_remove("MYOLINK_LOG_LEVEL")
        .env_remove("MYOLINK_LOG")
        .output()
        .expect("myolink should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn encode_grip_outputs_request_frame() {
    let output = myolink(&["encode", "grip", "tripod"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("\"hex\":\"0007800105\""));
}

#[test]
fn encode_digits_clamps_positions() {
    let output = myolink(&["encode", "digits", "0=1.4", "1=-0.2"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("\"hex\":\"0006800b01003f8000000100000000\""));
}

#[test]
fn encode_stream_config_packs_source_and_compression() {
    let output = myolink(&[
        "encode",
        "stream-config",
        "--source",
        "processed-emg",
        "--compression",
        "int16",
        "--average",
        "4",
    ]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("\"hex\":\"0000042100\""));
    assert!(out.contains("\"length\":5"));
}

#[test]
fn invalid_arguments_exit_with_usage() {
    let output = myolink(&["encode", "stream-config", "--source", "raw-emg", "--average", "0"]);
    assert_eq!(output.status.code(), Some(64));

    let output = myolink(&["encode", "digits", "7=0.5"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown digit 7"));
}

#[test]
fn advert_decodes_sensor_record() {
    let output = myolink(&["advert", "02 04 04 57 DEADBEEF 01 00000001", "--rssi", "-58"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("\"device_type\":\"OB2_SENSOR\""));
    assert!(out.contains("\"battery_level\":87"));
    assert!(out.contains("\"is_open_for_association\":true"));
    assert!(out.contains("\"association_ids\":[1]"));
    assert!(out.contains("\"rssi\":-58"));
}

#[test]
fn advert_rejections_exit_with_data_invalid() {
    let output = myolink(&["advert", "09000000"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported advertisement schema 9"));

    let output = myolink(&["advert", "0102", "--manufacturer-id", "0x004C"]);
    assert_eq!(output.status.code(), Some(60));

    let output = myolink(&["advert", "zz"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn frame_decodes_humidity_response() {
    let output = myolink(&["frame", "000A0004423A0000"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("\"command\":\"GET_RELATIVE_HUMIDITY\""));
    assert!(out.contains("\"status\":\"SUCCESS\""));
    assert!(out.contains("\"relative_humidity\":46.5"));
}

#[test]
fn frame_reports_length_mismatch_without_failing() {
    let output = myolink(&["frame", "0007800201"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("\"length_matches\":false"));
}

#[test]
fn packet_decodes_scaled_samples() {
    let output = myolink(&["packet", "000511 3F800000 3F000000 04 0064FF9C"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("\"active_stream_source\":\"RAW_EMG\""));
    assert!(out.contains("\"compression_type\":\"INT16\""));
    assert!(out.contains("\"data_points\":[50.0,-50.0]"));
}

#[test]
fn debug_level_surfaces_decoder_diagnostics() {
    let packet = "000511 3F800000 3F000000 02 0064 FFFF";

    let output = myolink_at("debug", &["packet", packet]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ignoring bytes past declared length"));

    let output = myolink_at("info", &["packet", packet]);
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("ignoring bytes past declared length"));
}

#[test]
fn packet_with_unknown_schema_is_rejected() {
    let output = myolink(&["packet", "040511 3F800000 3F000000 00"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn version_prints_package_version() {
    let output = myolink(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("myolink {}", env!("CARGO_PKG_VERSION"))
    );
}

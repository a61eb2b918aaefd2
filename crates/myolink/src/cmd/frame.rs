use myolink_frame::{
    command_name, decode_f32_payload, decode_frame, DecodedFrame, GET_RELATIVE_HUMIDITY,
};
use serde::Serialize;

use crate::cmd::FrameArgs;
use crate::exit::{frame_error, hex_error, CliResult, SUCCESS};
use crate::output::{emit, parse_hex, Fields, OutputFormat};

#[derive(Serialize)]
struct FrameOutput {
    schema_version: u8,
    command_id: u8,
    command: &'static str,
    kind: &'static str,
    status_code: u8,
    status: Option<&'static str>,
    declared_length: u8,
    payload_length: usize,
    length_matches: bool,
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    relative_humidity: Option<f32>,
}

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = parse_hex(&args.data).map_err(|err| hex_error("frame", err))?;
    let frame = decode_frame(&raw).map_err(|err| frame_error("frame", err))?;
    let out = describe(&frame);
    emit(&out, &fields(&out), format);
    Ok(SUCCESS)
}

fn describe(frame: &DecodedFrame) -> FrameOutput {
    let header = frame.header;
    let is_request = header.control.is_request();
    let status = header.control.status();
    let relative_humidity = (header.command_id == GET_RELATIVE_HUMIDITY
        && !is_request
        && status.is_some_and(|s| s.is_success()))
    .then(|| decode_f32_payload(&frame.payload).ok())
    .flatten();

    FrameOutput {
        schema_version: header.schema_version,
        command_id: header.command_id,
        command: command_name(header.command_id),
        kind: if is_request { "request" } else { "response" },
        status_code: header.control.status_code(),
        status: if is_request {
            None
        } else {
            status.map(|s| s.name())
        },
        declared_length: header.data_length,
        payload_length: frame.payload.len(),
        length_matches: frame.length_matches(),
        payload: hex::encode(&frame.payload),
        relative_humidity,
    }
}

fn fields(out: &FrameOutput) -> Fields {
    let mut fields: Fields = vec![
        ("schema", out.schema_version.to_string()),
        (
            "command",
            format!("{} ({:#04x})", out.command, out.command_id),
        ),
        ("kind", out.kind.to_string()),
    ];
    if out.kind == "response" {
        fields.push((
            "status",
            out.status
                .map(|s| format!("{s} ({})", out.status_code))
                .unwrap_or_else(|| format!("UNKNOWN ({})", out.status_code)),
        ));
    }
    fields.push((
        "length",
        format!("{} declared, {} received", out.declared_length, out.payload_length),
    ));
    fields.push(("payload", out.payload.clone()));
    if let Some(humidity) = out.relative_humidity {
        fields.push(("relative_humidity", format!("{humidity}%")));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_humidity_response() {
        let mut raw = vec![0x00, GET_RELATIVE_HUMIDITY, 0x00, 0x04];
        raw.extend_from_slice(&40.0f32.to_be_bytes());
        let out = describe(&decode_frame(&raw).unwrap());
        assert_eq!(out.kind, "response");
        assert_eq!(out.status, Some("SUCCESS"));
        assert_eq!(out.relative_humidity, Some(40.0));
        assert!(out.length_matches);
    }

    #[test]
    fn request_has_no_status() {
        let out = describe(&decode_frame(&[0x00, 0x07, 0x80, 0x01, 0x02]).unwrap());
        assert_eq!(out.kind, "request");
        assert_eq!(out.command, "SET_GRIP");
        assert_eq!(out.status, None);
        assert_eq!(out.relative_humidity, None);
    }

    #[test]
    fn unassigned_status_is_reported_unknown() {
        let out = describe(&decode_frame(&[0x00, 0x0A, 0x07, 0x00]).unwrap());
        assert_eq!(out.status, None);
        assert_eq!(out.status_code, 7);
        let status = fields(&out)
            .into_iter()
            .find(|(name, _)| *name == "status")
            .map(|(_, value)| value);
        assert_eq!(status.as_deref(), Some("UNKNOWN (7)"));
    }
}

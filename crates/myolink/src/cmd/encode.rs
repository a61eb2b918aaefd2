use bytes::Bytes;
use myolink_frame::{CommandFrame, SET_DIGIT_POSITIONS, SET_GRIP};
use myolink_peer::{encode_digit_positions, Grip};
use myolink_stream::{build_configure_frame, CompressionType, EmgStreamSource};
use serde::Serialize;

use crate::cmd::{CompressionArg, EncodeCommand, GripArg, SourceArg};
use crate::exit::{command_error, configuration_error, frame_error, CliResult, SUCCESS};
use crate::output::{emit, OutputFormat};

#[derive(Serialize)]
struct Encoded {
    kind: &'static str,
    hex: String,
    length: usize,
}

pub fn run(command: EncodeCommand, format: OutputFormat) -> CliResult<i32> {
    let (kind, bytes) = match command {
        EncodeCommand::Digits(args) => {
            let payload = encode_digit_positions(args.positions)
                .map_err(|err| command_error("encode digits", err))?;
            ("set_digit_positions", request(SET_DIGIT_POSITIONS, payload)?)
        }
        EncodeCommand::Grip(args) => {
            let grip = Grip::from(args.grip);
            ("set_grip", request(SET_GRIP, vec![grip.id()])?)
        }
        EncodeCommand::StreamConfig(args) => {
            let frame = build_configure_frame(
                args.source.into(),
                args.compression.into(),
                args.average,
                args.stream_schema,
            )
            .map_err(|err| configuration_error("encode stream-config", err))?;
            ("stream_configuration", frame.to_bytes())
        }
    };

    let encoded = Encoded {
        kind,
        hex: hex::encode(&bytes),
        length: bytes.len(),
    };
    let fields = vec![
        ("kind", encoded.kind.to_string()),
        ("hex", encoded.hex.clone()),
        ("length", encoded.length.to_string()),
    ];
    emit(&encoded, &fields, format);
    Ok(SUCCESS)
}

fn request(command_id: u8, payload: impl Into<Bytes>) -> CliResult<Bytes> {
    CommandFrame::request(command_id, payload)
        .and_then(|frame| frame.to_bytes())
        .map_err(|err| frame_error("encode", err))
}

impl From<GripArg> for Grip {
    fn from(arg: GripArg) -> Self {
        match arg {
            GripArg::Relax => Grip::Relax,
            GripArg::Point => Grip::Point,
            GripArg::Hook => Grip::Hook,
            GripArg::Pinch => Grip::Pinch,
            GripArg::Cylindrical => Grip::Cylindrical,
            GripArg::Tripod => Grip::Tripod,
        }
    }
}

impl From<SourceArg> for EmgStreamSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::None => EmgStreamSource::None,
            SourceArg::RawEmg => EmgStreamSource::RawEmg,
            SourceArg::ProcessedEmg => EmgStreamSource::ProcessedEmg,
            SourceArg::Imu => EmgStreamSource::Imu,
        }
    }
}

impl From<CompressionArg> for CompressionType {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => CompressionType::None,
            CompressionArg::Int16 => CompressionType::Int16,
            CompressionArg::BytePack12Bit => CompressionType::BytePack12Bit,
            CompressionArg::ResLimit8Bit => CompressionType::ResLimit8Bit,
        }
    }
}

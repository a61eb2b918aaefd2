use myolink_stream::{decode_data_packet, StreamDataPacket};

use crate::cmd::PacketArgs;
use crate::exit::{decode_error, hex_error, CliResult, SUCCESS};
use crate::output::{emit, format_samples, parse_hex, Fields, OutputFormat};

pub fn run(args: PacketArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = parse_hex(&args.data).map_err(|err| hex_error("packet", err))?;
    let packet = decode_data_packet(&raw).map_err(|err| decode_error("packet", err))?;
    emit(&packet, &fields(&packet), format);
    Ok(SUCCESS)
}

fn fields(packet: &StreamDataPacket) -> Fields {
    vec![
        ("schema", packet.schema_version.to_string()),
        ("block", packet.block_number.to_string()),
        ("source", packet.active_stream_source.to_string()),
        ("compression", packet.compression_type.to_string()),
        ("timestamp", packet.timestamp.to_string()),
        ("conversion_factor", packet.conversion_factor.to_string()),
        ("samples", packet.data_points.len().to_string()),
        ("data_points", format_samples(&packet.data_points)),
    ]
}

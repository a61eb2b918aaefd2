use clap::{Args, Subcommand, ValueEnum};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod advert;
pub mod encode;
pub mod frame;
pub mod packet;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode advertisement manufacturer data.
    Advert(AdvertArgs),
    /// Decode a control-channel command frame.
    Frame(FrameArgs),
    /// Decode a stream data packet.
    Packet(PacketArgs),
    /// Encode a command frame or stream configuration value.
    #[command(subcommand)]
    Encode(EncodeCommand),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Advert(args) => advert::run(args, format),
        Command::Frame(args) => frame::run(args, format),
        Command::Packet(args) => packet::run(args, format),
        Command::Encode(command) => encode::run(command, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct AdvertArgs {
    /// Manufacturer data as hex, without the company id.
    pub data: String,
    /// Company id the data was advertised under.
    #[arg(long, default_value = "0x0ABA", value_parser = parse_company_id)]
    pub manufacturer_id: u16,
    /// Signal strength to attach to the record.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub rssi: i16,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Command frame as hex.
    pub data: String,
}

#[derive(Args, Debug)]
pub struct PacketArgs {
    /// Stream data notification as hex.
    pub data: String,
}

#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// Set-digit-positions request frame.
    Digits(DigitsArgs),
    /// Set-grip request frame.
    Grip(GripArgs),
    /// Stream configuration write value.
    StreamConfig(StreamConfigArgs),
}

#[derive(Args, Debug)]
pub struct DigitsArgs {
    /// DIGIT=POSITION pairs; digit 0 (thumb) to 4 (pinky), position 0.0-1.0.
    #[arg(required = true, value_parser = parse_digit_position)]
    pub positions: Vec<(u8, f32)>,
}

#[derive(Args, Debug)]
pub struct GripArgs {
    pub grip: GripArg,
}

#[derive(Args, Debug)]
pub struct StreamConfigArgs {
    /// Signal to stream; `none` stops streaming.
    #[arg(long, value_enum)]
    pub source: SourceArg,
    #[arg(long, value_enum, default_value = "none")]
    pub compression: CompressionArg,
    /// Samples averaged on the device per streamed sample (1-65535).
    #[arg(long, default_value_t = 1)]
    pub average: u32,
    #[arg(long, default_value_t = 0)]
    pub stream_schema: u8,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum GripArg {
    Relax,
    Point,
    Hook,
    Pinch,
    Cylindrical,
    Tripod,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SourceArg {
    None,
    RawEmg,
    ProcessedEmg,
    Imu,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CompressionArg {
    None,
    Int16,
    #[value(name = "byte-pack-12bit")]
    BytePack12Bit,
    #[value(name = "res-limit-8bit")]
    ResLimit8Bit,
}

fn parse_company_id(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|err| format!("invalid company id {s:?}: {err}"))
}

fn parse_digit_position(s: &str) -> Result<(u8, f32), String> {
    let (digit, position) = s
        .split_once('=')
        .ok_or_else(|| format!("expected DIGIT=POSITION, got {s:?}"))?;
    let digit = digit
        .trim()
        .parse()
        .map_err(|err| format!("invalid digit {digit:?}: {err}"))?;
    let position = position
        .trim()
        .parse()
        .map_err(|err| format!("invalid position {position:?}: {err}"))?;
    Ok((digit, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_id_accepts_hex_and_decimal() {
        assert_eq!(parse_company_id("0x0ABA"), Ok(0x0ABA));
        assert_eq!(parse_company_id("2746"), Ok(0x0ABA));
        assert!(parse_company_id("0xZZ").is_err());
    }

    #[test]
    fn digit_position_pairs() {
        assert_eq!(parse_digit_position("1=-0.2"), Ok((1, -0.2)));
        assert_eq!(parse_digit_position(" 4 = 1 "), Ok((4, 1.0)));
        assert!(parse_digit_position("4").is_err());
        assert!(parse_digit_position("x=1").is_err());
    }
}

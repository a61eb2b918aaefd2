use myolink_advert::{
    try_decode, AdvertisingRecord, AssociationTrailer, DeviceSpecific, SensorType,
};

use crate::cmd::AdvertArgs;
use crate::exit::{advert_error, hex_error, CliResult, SUCCESS};
use crate::output::{emit, parse_hex, Fields, OutputFormat};

pub fn run(args: AdvertArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = parse_hex(&args.data).map_err(|err| hex_error("advert", err))?;
    let record = try_decode(args.manufacturer_id, &raw, args.rssi)
        .map_err(|err| advert_error("advert", err))?;
    emit(&record, &fields(&record), format);
    Ok(SUCCESS)
}

fn fields(record: &AdvertisingRecord) -> Fields {
    let config = &record.device_config;
    let mut fields: Fields = vec![
        ("schema", record.schema_version.to_string()),
        ("device_type", config.device_type.name().to_string()),
        ("chirality", format!("{:?}", config.chirality)),
        ("bootloader", config.is_bootloader.to_string()),
        ("hardware_in_loop", config.is_hardware_in_loop.to_string()),
        ("battery", format!("{}%", record.battery_level)),
        ("rssi", record.rssi.to_string()),
    ];

    match record.device_specific {
        DeviceSpecific::Hand(hand) => {
            fields.push(("hand_size", format!("{:?}", hand.size)));
            fields.push(("hand_class", format!("{:?}", hand.class)));
        }
        DeviceSpecific::SensorV1(sensor) => {
            fields.push(("sensor_type", sensor_type(sensor.sensor_type)));
        }
        DeviceSpecific::SensorV2(sensor) => {
            fields.push(("sensor_type", sensor_type(sensor.sensor_type)));
            fields.push((
                "open_for_association",
                sensor.is_open_for_association.to_string(),
            ));
        }
        DeviceSpecific::SensorV3(sensor) => {
            fields.push(("sensor_type", sensor_type(sensor.sensor_type)));
            fields.push((
                "advertising_reason",
                format!("{:?}", sensor.advertising_reason),
            ));
            fields.push(("leads_on", sensor.leads_on_user.to_string()));
        }
        DeviceSpecific::Opaque { raw } => {
            fields.push(("device_specific", format!("{raw:#04x}")));
        }
    }

    match &record.trailer {
        AssociationTrailer::V1 { association_id } => {
            fields.push(("association_id", hex::encode(association_id)));
        }
        AssociationTrailer::V2 {
            mac_fragment,
            declared_count,
            association_ids,
        } => {
            fields.push(("mac_fragment", format!("{mac_fragment:08x}")));
            let ids: Vec<String> = association_ids
                .iter()
                .map(|id| format!("{id:08x}"))
                .collect();
            fields.push((
                "associations",
                format!("{}/{} [{}]", ids.len(), declared_count, ids.join(", ")),
            ));
        }
    }
    fields
}

fn sensor_type(sensor_type: SensorType) -> String {
    match sensor_type {
        SensorType::Emg => "EMG".to_string(),
        SensorType::Reserved(code) => format!("RESERVED({code})"),
    }
}

use tracing::debug;

use crate::error::{AdvertError, Result};
use crate::types::{AdvertisingRecord, AssociationTrailer, DeviceConfig, DeviceSpecific};

/// Bluetooth SIG company identifier carried by our manufacturer data.
pub const VENDOR_ID: u16 = 0x0ABA;

/// schema + config + specific + battery + 6-byte association id.
const SCHEMA_V1_LEN: usize = 10;

/// schema + config + specific + battery + 4-byte MAC fragment + count.
const SCHEMA_V2_MIN_LEN: usize = 9;

const ASSOCIATION_ID_LEN: usize = 4;

/// Decode manufacturer data into a record, or `None` if it is not ours,
/// too short, or of an unknown schema.
pub fn decode(manufacturer_id: u16, raw: &[u8], rssi: i16) -> Option<AdvertisingRecord> {
    match try_decode(manufacturer_id, raw, rssi) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!(error = %err, len = raw.len(), data = ?raw, "advertisement not decoded");
            None
        }
    }
}

/// Pick our entry out of an advertisement's manufacturer-data map and decode it.
pub fn decode_manufacturer_data<'a, I>(entries: I, rssi: i16) -> Option<AdvertisingRecord>
where
    I: IntoIterator<Item = (u16, &'a [u8])>,
{
    entries
        .into_iter()
        .find(|(id, _)| *id == VENDOR_ID)
        .and_then(|(id, raw)| decode(id, raw, rssi))
}

/// Decode manufacturer data, reporting why it was rejected.
pub fn try_decode(manufacturer_id: u16, raw: &[u8], rssi: i16) -> Result<AdvertisingRecord> {
    if manufacturer_id != VENDOR_ID {
        return Err(AdvertError::ForeignManufacturer(manufacturer_id));
    }
    let schema_version = *raw.first().ok_or(AdvertError::Empty)?;

    let needed = match schema_version {
        1 => SCHEMA_V1_LEN,
        2 | 3 => SCHEMA_V2_MIN_LEN,
        other => return Err(AdvertError::UnsupportedSchema(other)),
    };
    if raw.len() < needed {
        return Err(AdvertError::Truncated {
            schema: schema_version,
            needed,
            actual: raw.len(),
        });
    }

    let device_config = DeviceConfig::from_byte(raw[1]);
    let device_specific =
        DeviceSpecific::from_byte(device_config.device_type, schema_version, raw[2]);
    let battery_level = raw[3];

    let trailer = if schema_version == 1 {
        let mut association_id = [0u8; 6];
        association_id.copy_from_slice(&raw[4..SCHEMA_V1_LEN]);
        AssociationTrailer::V1 { association_id }
    } else {
        let mac_fragment = u32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]);
        let declared_count = raw[8];
        let available = (raw.len() - SCHEMA_V2_MIN_LEN) / ASSOCIATION_ID_LEN;
        let count = usize::from(declared_count).min(available);
        if count < usize::from(declared_count) {
            debug!(
                declared = declared_count,
                available, "association list truncated to complete entries"
            );
        }
        let association_ids = raw[SCHEMA_V2_MIN_LEN..]
            .chunks_exact(ASSOCIATION_ID_LEN)
            .take(count)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        AssociationTrailer::V2 {
            mac_fragment,
            declared_count,
            association_ids,
        }
    };

    Ok(AdvertisingRecord {
        schema_version,
        device_config,
        device_specific,
        battery_level,
        trailer,
        rssi,
    })
}

use serde::Serialize;

use crate::bitfield::BitField;

const CHIRALITY: BitField = BitField::flag(0);
const DEVICE_TYPE: BitField = BitField::new(1, 3);
const BOOTLOADER: BitField = BitField::flag(6);
const HARDWARE_IN_LOOP: BitField = BitField::flag(7);

const HAND_SIZE: BitField = BitField::new(0, 2);
const HAND_CLASS: BitField = BitField::new(2, 2);

const SENSOR_TYPE: BitField = BitField::new(0, 2);
const OPEN_FOR_ASSOCIATION: BitField = BitField::flag(2);
const ADVERTISING_REASON: BitField = BitField::new(2, 2);
const LEADS_ON: BitField = BitField::flag(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Chirality {
    RightOrClose,
    LeftOrOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    HeroArm,
    Ob2Hand,
    Ob2Sensor,
    /// Codes 3-7.
    Reserved(u8),
}

impl DeviceType {
    fn from_code(code: u8) -> Self {
        match code {
            0 => Self::HeroArm,
            1 => Self::Ob2Hand,
            2 => Self::Ob2Sensor,
            other => Self::Reserved(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::HeroArm => "HERO_ARM",
            Self::Ob2Hand => "OB2_HAND",
            Self::Ob2Sensor => "OB2_SENSOR",
            Self::Reserved(_) => "RESERVED",
        }
    }
}

/// Identity byte shared by every schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceConfig {
    pub raw: u8,
    pub chirality: Chirality,
    pub device_type: DeviceType,
    pub is_bootloader: bool,
    pub is_hardware_in_loop: bool,
}

impl DeviceConfig {
    pub fn from_byte(raw: u8) -> Self {
        let chirality = if CHIRALITY.is_set(raw) {
            Chirality::LeftOrOpen
        } else {
            Chirality::RightOrClose
        };
        Self {
            raw,
            chirality,
            device_type: DeviceType::from_code(DEVICE_TYPE.extract(raw)),
            is_bootloader: BOOTLOADER.is_set(raw),
            is_hardware_in_loop: HARDWARE_IN_LOOP.is_set(raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandSize {
    ExtraSmall,
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandClass {
    Ob2Air,
    Ob2Pro,
    Ob2Rugged,
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HandSpecific {
    pub raw: u8,
    pub size: HandSize,
    pub class: HandClass,
}

impl HandSpecific {
    pub fn from_byte(raw: u8) -> Self {
        let size = match HAND_SIZE.extract(raw) {
            0 => HandSize::ExtraSmall,
            1 => HandSize::Small,
            2 => HandSize::Medium,
            _ => HandSize::Large,
        };
        let class = match HAND_CLASS.extract(raw) {
            0 => HandClass::Ob2Air,
            1 => HandClass::Ob2Pro,
            2 => HandClass::Ob2Rugged,
            _ => HandClass::Reserved,
        };
        Self { raw, size, class }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    Emg,
    /// Codes 1-3.
    Reserved(u8),
}

impl SensorType {
    fn from_byte(raw: u8) -> Self {
        match SENSOR_TYPE.extract(raw) {
            0 => Self::Emg,
            other => Self::Reserved(other),
        }
    }
}

/// Why a schema-3 sensor is advertising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvertisingReason {
    ConnectAssociatedHand,
    FormNewAssociation,
    ConnectApp,
    RequestFromHand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorSpecificV1 {
    pub raw: u8,
    pub sensor_type: SensorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorSpecificV2 {
    pub raw: u8,
    pub sensor_type: SensorType,
    pub is_open_for_association: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorSpecificV3 {
    pub raw: u8,
    pub sensor_type: SensorType,
    pub advertising_reason: AdvertisingReason,
    pub leads_on_user: bool,
}

/// The device-type-dependent byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceSpecific {
    Hand(HandSpecific),
    SensorV1(SensorSpecificV1),
    SensorV2(SensorSpecificV2),
    SensorV3(SensorSpecificV3),
    /// Hero Arm and reserved device types carry an uninterpreted byte.
    Opaque { raw: u8 },
}

impl DeviceSpecific {
    /// Interpret `raw` according to the decoded device type.
    ///
    /// The sensor layout additionally depends on the advertisement schema.
    pub fn from_byte(device_type: DeviceType, schema_version: u8, raw: u8) -> Self {
        match device_type {
            DeviceType::Ob2Hand => Self::Hand(HandSpecific::from_byte(raw)),
            DeviceType::Ob2Sensor => {
                let sensor_type = SensorType::from_byte(raw);
                match schema_version {
                    1 => Self::SensorV1(SensorSpecificV1 { raw, sensor_type }),
                    2 => Self::SensorV2(SensorSpecificV2 {
                        raw,
                        sensor_type,
                        is_open_for_association: OPEN_FOR_ASSOCIATION.is_set(raw),
                    }),
                    _ => {
                        let advertising_reason = match ADVERTISING_REASON.extract(raw) {
                            0 => AdvertisingReason::ConnectAssociatedHand,
                            1 => AdvertisingReason::FormNewAssociation,
                            2 => AdvertisingReason::ConnectApp,
                            _ => AdvertisingReason::RequestFromHand,
                        };
                        Self::SensorV3(SensorSpecificV3 {
                            raw,
                            sensor_type,
                            advertising_reason,
                            leads_on_user: LEADS_ON.is_set(raw),
                        })
                    }
                }
            }
            DeviceType::HeroArm | DeviceType::Reserved(_) => Self::Opaque { raw },
        }
    }
}

/// Schema-dependent bytes after the battery level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum AssociationTrailer {
    /// Schema 1: a single 6-byte association id.
    V1 { association_id: [u8; 6] },
    /// Schemas 2/3: MAC fragment plus a counted list of association ids.
    V2 {
        mac_fragment: u32,
        /// Count as declared on the wire, before clamping.
        declared_count: u8,
        association_ids: Vec<u32>,
    },
}

/// One decoded advertisement observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvertisingRecord {
    pub schema_version: u8,
    pub device_config: DeviceConfig,
    pub device_specific: DeviceSpecific,
    /// Percent, 0-100.
    pub battery_level: u8,
    pub trailer: AssociationTrailer,
    pub rssi: i16,
}

impl AdvertisingRecord {
    pub fn device_type(&self) -> DeviceType {
        self.device_config.device_type
    }

    /// Association ids from a schema 2/3 trailer; empty for schema 1.
    pub fn association_ids(&self) -> &[u32] {
        match &self.trailer {
            AssociationTrailer::V2 {
                association_ids, ..
            } => association_ids,
            AssociationTrailer::V1 { .. } => &[],
        }
    }

    pub fn mac_fragment(&self) -> Option<u32> {
        match self.trailer {
            AssociationTrailer::V2 { mac_fragment, .. } => Some(mac_fragment),
            AssociationTrailer::V1 { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_config_unpacks_every_field() {
        let config = DeviceConfig::from_byte(0b1100_0101);
        assert_eq!(config.chirality, Chirality::LeftOrOpen);
        assert_eq!(config.device_type, DeviceType::Ob2Sensor);
        assert!(config.is_bootloader);
        assert!(config.is_hardware_in_loop);

        let config = DeviceConfig::from_byte(0b0000_0010);
        assert_eq!(config.chirality, Chirality::RightOrClose);
        assert_eq!(config.device_type, DeviceType::Ob2Hand);
        assert!(!config.is_bootloader);
        assert!(!config.is_hardware_in_loop);
    }

    #[test]
    fn reserved_device_type_keeps_code() {
        let config = DeviceConfig::from_byte(0b0000_1110);
        assert_eq!(config.device_type, DeviceType::Reserved(7));
        assert_eq!(
            DeviceSpecific::from_byte(config.device_type, 2, 0x5A),
            DeviceSpecific::Opaque { raw: 0x5A }
        );
    }

    #[test]
    fn hand_specific_size_and_class() {
        let hand = HandSpecific::from_byte(0b0000_0110);
        assert_eq!(hand.size, HandSize::Medium);
        assert_eq!(hand.class, HandClass::Ob2Pro);
    }

    #[test]
    fn sensor_layout_follows_schema() {
        let raw = 0b0001_1100;
        match DeviceSpecific::from_byte(DeviceType::Ob2Sensor, 2, raw) {
            DeviceSpecific::SensorV2(s) => {
                assert_eq!(s.sensor_type, SensorType::Emg);
                assert!(s.is_open_for_association);
            }
            other => panic!("unexpected {other:?}"),
        }
        match DeviceSpecific::from_byte(DeviceType::Ob2Sensor, 3, raw) {
            DeviceSpecific::SensorV3(s) => {
                assert_eq!(s.advertising_reason, AdvertisingReason::RequestFromHand);
                assert!(s.leads_on_user);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            DeviceSpecific::from_byte(DeviceType::Ob2Sensor, 1, 0x02),
            DeviceSpecific::SensorV1(SensorSpecificV1 {
                sensor_type: SensorType::Reserved(2),
                ..
            })
        ));
    }
}

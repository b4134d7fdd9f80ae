//! Core records shared by every module family
//!
//! Descriptor, common/group configuration and adapter identity. Layouts are
//! byte-exact; see the offset tests at the bottom of this file.

use std::fmt;

use crate::constants::{GroupMembership, SyncMode, UNDEFINED_GROUP_ID, UNDEFINED_SYNC_ID};
use crate::module_type::ModuleType;
use crate::record::{packed_record, FixedString};

/// Serial number bits carrying the production revision
const REVISION_MASK: u32 = 0x00FF_FFFF;
const REVISION_DIVISOR: f64 = 10_000.0;

packed_record! {
    /// Where a module's data sits inside a composite group packet
    pub struct GroupConfiguration {
        /// Group id in `[0x80, 0xBF]`, or `0xFF` when not grouped
        pub group_id: u8,
        pub output_packet_data_offset: u16,
        pub output_module_data_length: u8,
        pub output_module_data_offset: u8,
        pub output_packet_crc_offset: u16,
        pub input_packet_data_offset: u16,
        pub input_module_data_length: u8,
        pub input_module_data_offset: u8,
        pub input_packet_crc_offset: u16,
    }
}

impl GroupConfiguration {
    /// Configuration of a module outside any group
    pub fn unassigned() -> Self {
        Self {
            group_id: UNDEFINED_GROUP_ID,
            ..Self::default()
        }
    }

    pub fn membership(&self) -> GroupMembership {
        GroupMembership::from_raw(self.group_id)
    }
}

packed_record! {
    /// Writable parameters shared by all module families
    pub struct CommonConfiguration {
        pub configuration_id: u32,
        /// Seconds without master requests before outputs go safe; 0 disables
        pub host_watchdog_interval: u8,
        pub output_sync: u8,
        pub input_sync: u8,
        pub group: GroupConfiguration,
    }
}

impl CommonConfiguration {
    /// Asynchronous module outside any group
    pub fn asynchronous() -> Self {
        Self {
            output_sync: UNDEFINED_SYNC_ID,
            input_sync: UNDEFINED_SYNC_ID,
            group: GroupConfiguration::unassigned(),
            ..Self::default()
        }
    }

    pub fn output_sync_mode(&self) -> SyncMode {
        SyncMode::from_raw(self.output_sync)
    }

    pub fn input_sync_mode(&self) -> SyncMode {
        SyncMode::from_raw(self.input_sync)
    }
}

packed_record! {
    /// Description of one discovered module
    pub struct ModuleDescriptor {
        pub module_type: u32,
        pub type_name: FixedString<21>,
        pub production_code: u32,
        pub serial_number: u32,
        /// FBUS protocol version (major, minor)
        pub fbus_version: [u8; 2],
        /// Firmware version (major, minor)
        pub firmware_version: [u8; 2],
        pub specific_ro_size: u32,
        pub specific_rw_size: u32,
        pub inputs_size: u32,
        pub outputs_size: u32,
    }
}

impl ModuleDescriptor {
    /// Catalog module type, `None` for codes this library does not know
    pub fn known_type(&self) -> Option<ModuleType> {
        ModuleType::from_code(self.module_type)
    }

    /// Catalog module type, `Unknown` for unrecognized codes
    pub fn module_type(&self) -> ModuleType {
        self.known_type().unwrap_or(ModuleType::Unknown)
    }

    /// Production revision encoded in the low 24 bits of the serial number
    pub fn production_revision(&self) -> f64 {
        f64::from(self.serial_number & REVISION_MASK) / REVISION_DIVISOR
    }

    pub fn fbus_version_string(&self) -> String {
        format!("{}.{}", self.fbus_version[0], self.fbus_version[1])
    }

    pub fn firmware_version_string(&self) -> String {
        format!("{}.{}", self.firmware_version[0], self.firmware_version[1])
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (type {}, fw {}, fbus {}, rev {})",
            self.type_name,
            self.module_type(),
            self.firmware_version_string(),
            self.fbus_version_string(),
            self.production_revision()
        )
    }
}

packed_record! {
    /// Identity block of a network adapter
    pub struct AdapterIdentity {
        pub production_code: u32,
        pub serial_number: u32,
        /// Firmware (version, subversion)
        pub firmware: [u8; 2],
        pub mac: [u8; 6],
    }
}

impl AdapterIdentity {
    pub fn production_revision(&self) -> f64 {
        f64::from(self.serial_number & REVISION_MASK) / REVISION_DIVISOR
    }

    /// Hardware address as `aa:bb:cc:dd:ee:ff`
    pub fn mac_string(&self) -> String {
        self.mac
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}

packed_record! {
    /// Adapter description returned by the adapter info query
    pub struct AdapterInfo {
        pub adapter_type: u32,
        pub identity: AdapterIdentity,
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::error::RecordError;
    use crate::record::{PackedRecord, size_of};

    fn offsets<R: PackedRecord>() -> Vec<(&'static str, usize)> {
        R::layout().into_iter().map(|f| (f.name, f.offset)).collect()
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(size_of::<GroupConfiguration>(), 13);
        assert_eq!(size_of::<CommonConfiguration>(), 20);
        assert_eq!(size_of::<ModuleDescriptor>(), 53);
        assert_eq!(size_of::<AdapterIdentity>(), 16);
        assert_eq!(size_of::<AdapterInfo>(), 20);
    }

    #[test]
    fn test_group_configuration_offsets() {
        assert_eq!(
            offsets::<GroupConfiguration>(),
            vec![
                ("group_id", 0),
                ("output_packet_data_offset", 1),
                ("output_module_data_length", 3),
                ("output_module_data_offset", 4),
                ("output_packet_crc_offset", 5),
                ("input_packet_data_offset", 7),
                ("input_module_data_length", 9),
                ("input_module_data_offset", 10),
                ("input_packet_crc_offset", 11),
            ]
        );
    }

    #[test]
    fn test_descriptor_offsets() {
        assert_eq!(
            offsets::<ModuleDescriptor>(),
            vec![
                ("module_type", 0),
                ("type_name", 4),
                ("production_code", 25),
                ("serial_number", 29),
                ("fbus_version", 33),
                ("firmware_version", 35),
                ("specific_ro_size", 37),
                ("specific_rw_size", 41),
                ("inputs_size", 45),
                ("outputs_size", 49),
            ]
        );
    }

    #[test]
    fn test_descriptor_decode() {
        let mut raw = vec![0u8; 53];
        raw[0] = 12; // AIM731
        raw[4..10].copy_from_slice(b"AIM731");
        raw[29..33].copy_from_slice(&0x0501_2345u32.to_le_bytes());
        raw[33] = 2;
        raw[34] = 1;
        raw[35] = 1;
        raw[36] = 7;
        raw[41] = 13;
        raw[45] = 5;
        raw[49] = 4;

        let descriptor = ModuleDescriptor::decode(&raw).unwrap();
        assert_eq!(descriptor.module_type(), ModuleType::Aim731);
        assert_eq!(descriptor.type_name.as_str(), "AIM731");
        assert_eq!(descriptor.fbus_version_string(), "2.1");
        assert_eq!(descriptor.firmware_version_string(), "1.7");
        assert_eq!(descriptor.specific_rw_size, 13);
        assert_eq!(descriptor.inputs_size, 5);
        assert_eq!(descriptor.outputs_size, 4);
        assert!((descriptor.production_revision() - 7.4565).abs() < 1e-9);
        assert_eq!(&descriptor.encode()[..], &raw[..]);

        assert!(matches!(
            ModuleDescriptor::decode(&raw[..52]),
            Err(RecordError::Malformed { expected: 53, actual: 52, .. })
        ));
    }

    #[test]
    fn test_unknown_module_type() {
        let descriptor = ModuleDescriptor {
            module_type: 200,
            ..ModuleDescriptor::default()
        };
        assert_eq!(descriptor.known_type(), None);
        assert_eq!(descriptor.module_type(), ModuleType::Unknown);
    }

    #[test]
    fn test_sentinels_survive_round_trip() {
        let config = CommonConfiguration::asynchronous();
        let bytes = config.encode();
        assert_eq!(bytes[5], 0xFF);
        assert_eq!(bytes[6], 0xFF);
        assert_eq!(bytes[7], 0xFF);

        let decoded = CommonConfiguration::decode(&bytes).unwrap();
        assert_eq!(decoded.output_sync, 0xFF);
        assert_eq!(decoded.output_sync_mode(), SyncMode::Asynchronous);
        assert_eq!(decoded.group.membership(), GroupMembership::Unassigned);
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_adapter_info() {
        let info = AdapterInfo {
            adapter_type: 1,
            identity: AdapterIdentity {
                production_code: 745,
                serial_number: 0x0100_2710,
                firmware: [3, 2],
                mac: [0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E],
            },
        };
        let bytes = info.encode();
        assert_eq!(&bytes[14..20], &[0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]);
        assert_eq!(info.identity.mac_string(), "00:1a:2b:3c:4d:5e");
        assert!((info.identity.production_revision() - 1.0).abs() < 1e-9);
        assert_eq!(AdapterInfo::decode(&bytes).unwrap(), info);
    }
}

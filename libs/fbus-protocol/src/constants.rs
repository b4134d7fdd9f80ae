//! Protocol constants and sentinel helpers

use serde::{Deserialize, Serialize};

/// Node id addressing every module on the bus
pub const MULTICAST_NODE_ID: u8 = 0x7E;

/// Maximum number of modules on one network
pub const MAX_NODE_COUNT: usize = 64;

/// Highest unicast node id
pub const MAX_NODE_ID: u8 = 63;

/// First valid group id
pub const GROUP_ID_MIN: u8 = 0x80;

/// Last valid group id (inclusive)
pub const GROUP_ID_MAX: u8 = GROUP_ID_MIN + MAX_NODE_ID;

/// Group id meaning "not a member of any group"
pub const UNDEFINED_GROUP_ID: u8 = 0xFF;

/// Sync id meaning "asynchronous, no group sync"
pub const UNDEFINED_SYNC_ID: u8 = 0xFF;

/// Whether `id` lies in the group id range
pub const fn is_valid_group_id(id: u8) -> bool {
    id >= GROUP_ID_MIN && id <= GROUP_ID_MAX
}

/// Interpretation of a raw group id byte
///
/// The raw byte is always kept so it can be written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupMembership {
    Unassigned,
    Member(u8),
    /// Outside both the group range and the sentinel
    Invalid(u8),
}

impl GroupMembership {
    pub const fn from_raw(raw: u8) -> Self {
        if raw == UNDEFINED_GROUP_ID {
            Self::Unassigned
        } else if is_valid_group_id(raw) {
            Self::Member(raw)
        } else {
            Self::Invalid(raw)
        }
    }

    pub const fn raw(self) -> u8 {
        match self {
            Self::Unassigned => UNDEFINED_GROUP_ID,
            Self::Member(id) | Self::Invalid(id) => id,
        }
    }
}

/// Interpretation of a raw sync id byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncMode {
    Asynchronous,
    Synchronized(u8),
}

impl SyncMode {
    pub const fn from_raw(raw: u8) -> Self {
        if raw == UNDEFINED_SYNC_ID {
            Self::Asynchronous
        } else {
            Self::Synchronized(raw)
        }
    }

    pub const fn raw(self) -> u8 {
        match self {
            Self::Asynchronous => UNDEFINED_SYNC_ID,
            Self::Synchronized(id) => id,
        }
    }
}

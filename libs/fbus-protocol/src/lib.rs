//! FBUS Protocol Data Model
//!
//! Packed binary records exchanged with FBUS I/O modules and the outcome codes
//! reported by the native FBUS service.
//!
//! # Architecture
//!
//! This library provides:
//! - **Record Catalog**: `PackedRecord` trait and the core records (module
//!   descriptor, common/group configuration, adapter info)
//! - **Device Families**: one Configuration/Inputs/Outputs triplet per module family
//! - **Result Taxonomy**: `ResultKind` classification of native outcome codes
//! - **Constants**: node/group id ranges and sentinel values
//!
//! All records are packed and little-endian. The catalog guarantees structural
//! fidelity (size, offset, type) only; field values are never validated.

pub mod catalog;
pub mod constants;
pub mod devices;
pub mod error;
pub mod module_type;
pub mod record;
pub mod result;

// Re-export core types
pub use catalog::{AdapterIdentity, AdapterInfo, CommonConfiguration, GroupConfiguration, ModuleDescriptor};
pub use constants::{GroupMembership, SyncMode};
pub use devices::{check_family, DeviceFamily, ModuleDiagnostics};
pub use error::{RecordError, Result};
pub use module_type::ModuleType;
pub use record::{size_of, Encoding, Field, FieldSpec, FixedString, NoRegion, PackedRecord};
pub use result::{ResultCategory, ResultKind};

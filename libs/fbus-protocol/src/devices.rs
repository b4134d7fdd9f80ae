//! Device families
//!
//! A device family binds a module type code to its Configuration, Inputs and
//! Outputs records. Families are marker types so the client can be generic
//! over them: `client.read_inputs::<Aim724>(node)` decodes into
//! `Aim724Inputs` with no per-device code.
//!
//! Families with identical layouts share record definitions; a family with
//! no region for a direction uses [`NoRegion`].

pub mod analog;
pub mod digital;
pub mod serial;
pub mod settings;

use crate::catalog::ModuleDescriptor;
use crate::error::{RecordError, Result};
use crate::module_type::ModuleType;
use crate::record::{NoRegion, PackedRecord};

use analog::*;
use digital::*;
use serial::*;

/// Diagnostics byte value meaning "no communication with module"
pub const NO_COMMUNICATION: u8 = 0xFF;

/// Configuration/Inputs/Outputs triplet of one module family
pub trait DeviceFamily {
    const MODULE_TYPE: ModuleType;

    /// Read-write specific parameters region
    type Configuration: PackedRecord;
    /// Module to host data
    type Inputs: PackedRecord;
    /// Host to module data
    type Outputs: PackedRecord;
}

/// Inputs records that start with a diagnostics byte
pub trait ModuleDiagnostics {
    fn diagnostics(&self) -> u8;

    /// `false` when the adapter lost contact with the module
    fn is_linked(&self) -> bool {
        self.diagnostics() != NO_COMMUNICATION
    }
}

macro_rules! device_families {
    ($(
        $(#[$meta:meta])*
        $family:ident => $module_type:ident {
            configuration: $config:ty,
            inputs: $inputs:ty,
            outputs: $outputs:ty $(,)?
        }
    )+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
            pub struct $family;

            impl DeviceFamily for $family {
                const MODULE_TYPE: ModuleType = ModuleType::$module_type;
                type Configuration = $config;
                type Inputs = $inputs;
                type Outputs = $outputs;
            }
        )+

        /// Module types with a device family in this catalog
        pub const SUPPORTED_TYPES: &[ModuleType] = &[$(ModuleType::$module_type,)+];
    };
}

macro_rules! diagnostics {
    ($($inputs:ty),+ $(,)?) => {
        $(
            impl ModuleDiagnostics for $inputs {
                fn diagnostics(&self) -> u8 {
                    self.diagnostics
                }
            }
        )+
    };
}

device_families! {
    /// 3 voltage + 3 current analog inputs
    Aim720 => Aim720 {
        configuration: Aim720Configuration,
        inputs: Aim720Inputs,
        outputs: NoRegion,
    }
    Aim721 => Aim721 {
        configuration: AdcFilter4Configuration,
        inputs: Adc4Inputs,
        outputs: NoRegion,
    }
    Aim722 => Aim722 {
        configuration: AdcFilter2Configuration,
        inputs: Adc2Inputs,
        outputs: NoRegion,
    }
    Aim723 => Aim723 {
        configuration: AdcFilter4Configuration,
        inputs: Adc4Inputs,
        outputs: NoRegion,
    }
    /// 2-channel thermocouple input
    Aim724 => Aim724 {
        configuration: Aim724Configuration,
        inputs: Aim724Inputs,
        outputs: Aim724Outputs,
    }
    Aim726 => Aim726 {
        configuration: AdcFilter2Configuration,
        inputs: Adc2Inputs,
        outputs: NoRegion,
    }
    Aim727 => Aim727 {
        configuration: AdcFilter4Configuration,
        inputs: Adc4Inputs,
        outputs: NoRegion,
    }
    Aim728 => Aim728 {
        configuration: AdcFilter4Configuration,
        inputs: Adc4Inputs,
        outputs: NoRegion,
    }
    Aim729 => Aim729 {
        configuration: AdcFilter2Configuration,
        inputs: Adc2Inputs,
        outputs: NoRegion,
    }
    /// 2-channel analog output
    Aim731 => Aim731 {
        configuration: Aim731Configuration,
        inputs: Aim731Inputs,
        outputs: Aim731Outputs,
    }
    Aim733 => Aim733 {
        configuration: Aim733Configuration,
        inputs: Adc4Inputs,
        outputs: NoRegion,
    }
    /// 8-channel current input with limits
    Aim791 => Aim791 {
        configuration: Aim79xConfiguration,
        inputs: Aim79xInputs,
        outputs: NoRegion,
    }
    /// 8-channel voltage input with limits
    Aim792 => Aim792 {
        configuration: Aim79xConfiguration,
        inputs: Aim79xInputs,
        outputs: NoRegion,
    }
    Dim712 => Dim712 {
        configuration: Output8Configuration,
        inputs: DiscreteInputs,
        outputs: Output8Control,
    }
    Dim713 => Dim713 {
        configuration: Output8Configuration,
        inputs: DiscreteInputs,
        outputs: Output8Control,
    }
    Dim714 => Dim714 {
        configuration: CounterConfiguration,
        inputs: CounterInputs,
        outputs: NoRegion,
    }
    /// Discrete inputs, no configuration
    Dim715 => Dim715 {
        configuration: NoRegion,
        inputs: DiscreteInputs,
        outputs: NoRegion,
    }
    Dim717 => Dim717 {
        configuration: CounterConfiguration,
        inputs: CounterInputs,
        outputs: NoRegion,
    }
    Dim761 => Dim761 {
        configuration: CounterConfiguration,
        inputs: CounterInputs,
        outputs: NoRegion,
    }
    Dim762 => Dim762 {
        configuration: CounterConfiguration,
        inputs: CounterInputs,
        outputs: NoRegion,
    }
    /// 8-channel frequency, period and counter inputs
    Dim764 => Dim764 {
        configuration: Dim764Configuration,
        inputs: Dim764Inputs,
        outputs: Dim764Outputs,
    }
    Dim812 => Dim812 {
        configuration: Output8Configuration,
        inputs: Dim812Inputs,
        outputs: Output8Control,
    }
    Dim813 => Dim813 {
        configuration: Output8Configuration,
        inputs: Dim812Inputs,
        outputs: Output8Control,
    }
    Dim814 => Dim814 {
        configuration: Counter16Configuration,
        inputs: Counter16Inputs,
        outputs: WideCounterOutputs,
    }
    Dim815 => Dim815 {
        configuration: Counter6Configuration,
        inputs: Counter6Inputs,
        outputs: ShortCounterOutputs,
    }
    Dim816 => Dim816 {
        configuration: Counter4Configuration,
        inputs: Counter4Inputs,
        outputs: ShortCounterOutputs,
    }
    Dim817 => Dim817 {
        configuration: Counter16Configuration,
        inputs: Counter16Inputs,
        outputs: WideCounterOutputs,
    }
    /// 16-channel PWM outputs
    Dim818 => Dim818 {
        configuration: PwmConfiguration,
        inputs: PwmInputs,
        outputs: PwmOutputs,
    }
    Dim819 => Dim819 {
        configuration: PwmConfiguration,
        inputs: PwmInputs,
        outputs: PwmOutputs,
    }
    Dim860 => Dim860 {
        configuration: Counter16Configuration,
        inputs: Counter16Inputs,
        outputs: WideCounterOutputs,
    }
    Dim873 => Dim873 {
        configuration: Dim873Configuration,
        inputs: Dim873Inputs,
        outputs: Dim873Outputs,
    }
    /// RS-485/RS-422 serial tunnel
    Nim841 => Nim841 {
        configuration: Nim841Configuration,
        inputs: Nim841Inputs,
        outputs: Nim841Outputs,
    }
    Om751 => Om751 {
        configuration: NoRegion,
        inputs: DiscreteInputs,
        outputs: NoRegion,
    }
}

diagnostics!(
    Aim720Inputs,
    Adc4Inputs,
    Adc2Inputs,
    Aim724Inputs,
    Aim731Inputs,
    Aim79xInputs,
    DiscreteInputs,
    Dim812Inputs,
    CounterInputs,
    Dim764Inputs,
    Counter16Inputs,
    Counter6Inputs,
    Counter4Inputs,
    PwmInputs,
    Dim873Inputs,
    Nim841Inputs,
);

/// Check a descriptor against a device family
///
/// Compares the module type and the read-write, inputs and outputs region
/// sizes. Read-only region size is not part of any family layout.
pub fn check_family<D: DeviceFamily>(descriptor: &ModuleDescriptor) -> Result<()> {
    if descriptor.module_type != D::MODULE_TYPE.code() {
        return Err(RecordError::ModuleTypeMismatch {
            expected: D::MODULE_TYPE,
            actual: descriptor.module_type,
        });
    }

    let regions = [
        ("configuration", D::Configuration::SIZE, descriptor.specific_rw_size),
        ("inputs", D::Inputs::SIZE, descriptor.inputs_size),
        ("outputs", D::Outputs::SIZE, descriptor.outputs_size),
    ];

    for (region, expected, actual) in regions {
        if expected != actual as usize {
            return Err(RecordError::RegionSizeMismatch {
                region,
                expected,
                actual: actual as usize,
            });
        }
    }

    Ok(())
}

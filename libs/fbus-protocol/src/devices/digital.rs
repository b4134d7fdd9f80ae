//! Discrete I/O, counter and PWM module regions
//!
//! State fields are bitmasks with bit N for channel N.

use crate::record::packed_record;

/// Channel count of the DIM764 frequency/counter module
pub const DIM764_CHANNELS: usize = 8;

// ============================================================================
// 8-channel discrete outputs (DIM712/713/812/813)
// ============================================================================

packed_record! {
    pub struct Output8Configuration {
        pub initial_states: u8,
        pub safe_states: u8,
    }
}

packed_record! {
    pub struct Output8Control {
        pub outputs_control: u8,
    }
}

packed_record! {
    /// Discrete input states (DIM712/713/715, OM751)
    pub struct DiscreteInputs {
        pub diagnostics: u8,
        pub input_states: u8,
    }
}

packed_record! {
    /// Applied output states with the module timestamp
    pub struct Dim812Inputs {
        pub diagnostics: u8,
        pub outputs_state: u8,
        pub timestamp: u32,
    }
}

// ============================================================================
// 2-channel counters (DIM714/717/761/762)
// ============================================================================

packed_record! {
    pub struct CounterInputSettings {
        pub edge: u8,
        pub direction: u8,
        pub counting_mode: u8,
        pub preset_value: u16,
    }
}

packed_record! {
    pub struct CounterConfiguration {
        pub debounce: u8,
        pub enable_counting: u8,
        pub counting_parameters: [CounterInputSettings; 2],
    }
}

packed_record! {
    pub struct CounterInputs {
        pub diagnostics: u8,
        pub input_states: u8,
        pub counters: [u16; 2],
        pub counters_state: u8,
    }
}

// ============================================================================
// DIM764: 8-channel frequency/period/counter
// ============================================================================

packed_record! {
    pub struct Dim764ChannelConfig {
        /// See [`super::settings::Dim764InputMode`]
        pub input_mode: u8,
        pub params_mask: u8,
    }
}

packed_record! {
    pub struct Dim764Configuration {
        pub version: u8,
        /// FPGA firmware variant, must be 0
        pub sub_version: u8,
        pub filter_option: u8,
        pub channels_config: [Dim764ChannelConfig; DIM764_CHANNELS],
    }
}

packed_record! {
    pub struct Dim764Inputs {
        pub diagnostics: u8,
        pub control_state: u8,
        pub channels_state: u8,
        pub values: [u32; DIM764_CHANNELS],
        pub inputs_state: u8,
    }
}

packed_record! {
    pub struct Dim764Outputs {
        pub control: u8,
        pub reset_counters: u8,
    }
}

// ============================================================================
// FIO-2 counters (DIM814/815/816/817/860)
// ============================================================================

packed_record! {
    /// 16-channel counter configuration (DIM814/817/860)
    pub struct Counter16Configuration {
        pub on_delay: [u8; 16],
        pub off_delay: [u8; 16],
        pub counting_modes: u32,
    }
}

packed_record! {
    pub struct Counter16Inputs {
        pub diagnostics: u8,
        pub inputs_state: u16,
        pub timestamp: u32,
        pub last_command: u16,
        pub counters: [u16; 16],
    }
}

packed_record! {
    /// Counter reset command for the 16-bit command modules
    pub struct WideCounterOutputs {
        pub reset_command: u16,
        pub command_counter: u16,
    }
}

packed_record! {
    pub struct Counter6Configuration {
        pub on_delay: [u8; 6],
        pub off_delay: [u8; 6],
        pub counting_modes: u16,
    }
}

packed_record! {
    pub struct Counter6Inputs {
        pub diagnostics: u8,
        pub inputs_state: u8,
        pub timestamp: u32,
        pub last_command: u16,
        pub counters: [u16; 6],
    }
}

packed_record! {
    pub struct Counter4Configuration {
        pub on_delay: [u8; 4],
        pub off_delay: [u8; 4],
        pub counting_modes: u8,
    }
}

packed_record! {
    pub struct Counter4Inputs {
        pub diagnostics: u8,
        pub inputs_state: u8,
        pub timestamp: u32,
        pub last_command: u16,
        pub counters: [u16; 4],
    }
}

packed_record! {
    /// Counter reset command for DIM815/816
    pub struct ShortCounterOutputs {
        pub reset_command: u8,
        pub command_counter: u16,
    }
}

// ============================================================================
// PWM outputs (DIM818/819)
// ============================================================================

packed_record! {
    pub struct PwmDutyCode {
        pub leading_half_duty_code: u16,
        pub trailing_half_duty_code: u16,
    }
}

packed_record! {
    pub struct PwmConfiguration {
        pub initial_states: u32,
        pub safe_states: u32,
        pub enable_pwm: u16,
    }
}

packed_record! {
    pub struct PwmInputs {
        pub diagnostics: u8,
        pub outputs_diagnostics: u32,
        pub outputs_state: u16,
        pub timestamp: u32,
    }
}

packed_record! {
    pub struct PwmOutputs {
        pub outputs_control: u16,
        pub pwm_duty_codes: [PwmDutyCode; 16],
    }
}

// ============================================================================
// DIM873: 16-channel discrete outputs
// ============================================================================

packed_record! {
    pub struct Dim873Configuration {
        pub initial_states: u32,
        pub safe_states: u32,
    }
}

packed_record! {
    pub struct Dim873Inputs {
        pub diagnostics: u8,
        pub outputs_state: u16,
        pub timestamp: u32,
    }
}

packed_record! {
    pub struct Dim873Outputs {
        pub outputs_control: u16,
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::record::PackedRecord;

    #[test]
    fn test_counter_configuration_nesting() {
        let config = CounterConfiguration {
            debounce: 2,
            enable_counting: 0b11,
            counting_parameters: [
                CounterInputSettings {
                    edge: 0,
                    direction: 1,
                    counting_mode: 1,
                    preset_value: 1000,
                },
                CounterInputSettings {
                    preset_value: 0xABCD,
                    ..CounterInputSettings::default()
                },
            ],
        };
        let bytes = config.encode();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[..7], &[2, 3, 0, 1, 1, 0xE8, 0x03]);
        assert_eq!(&bytes[10..], &[0xCD, 0xAB]);
        assert_eq!(CounterConfiguration::decode(&bytes).unwrap(), config);
    }

    #[test]
    fn test_pwm_outputs_layout() {
        let mut outputs = PwmOutputs {
            outputs_control: 0x8001,
            ..PwmOutputs::default()
        };
        outputs.pwm_duty_codes[15] = PwmDutyCode {
            leading_half_duty_code: 0x1122,
            trailing_half_duty_code: 0x3344,
        };
        let bytes = outputs.encode();
        assert_eq!(bytes.len(), 66);
        assert_eq!(&bytes[..2], &[0x01, 0x80]);
        assert_eq!(&bytes[62..], &[0x22, 0x11, 0x44, 0x33]);
    }

    #[test]
    fn test_dim764_inputs_layout() {
        let layout = Dim764Inputs::layout();
        assert_eq!(layout[3].name, "values");
        assert_eq!(layout[3].offset, 3);
        assert_eq!(layout[3].width, 32);
        assert_eq!(layout[4].offset, 35);
        assert_eq!(Dim764Inputs::SIZE, 36);
    }
}

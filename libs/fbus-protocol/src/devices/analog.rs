//! Analog module regions
//!
//! ADC inputs are raw codes; scaling depends on the configured range and is
//! left to the application. AIM724 reports engineering values as `f32`.

use crate::record::packed_record;

// ============================================================================
// AIM720: 3 voltage + 3 current inputs
// ============================================================================

packed_record! {
    pub struct Aim720Configuration {
        /// See [`super::settings::Aim720Range`]
        pub inputs_range: u8,
        pub scan_period: u16,
        pub filter_depth: u8,
    }
}

packed_record! {
    pub struct Aim720Inputs {
        pub diagnostics: u8,
        pub voltage_inputs: [u16; 3],
        pub current_inputs: [u16; 3],
        pub zero_reference: u16,
        pub half_scale_reference: u16,
    }
}

// ============================================================================
// Multi-channel ADC modules (AIM721/722/723/726/727/728/729/733)
// ============================================================================

packed_record! {
    /// Per-channel filter of the 4-channel ADC modules
    pub struct AdcFilter4Configuration {
        pub filter_options: [u8; 4],
    }
}

packed_record! {
    pub struct Adc4Inputs {
        pub diagnostics: u8,
        pub inputs: [u32; 4],
    }
}

packed_record! {
    /// Per-channel filter of the 2-channel ADC modules
    pub struct AdcFilter2Configuration {
        pub filter_options: [u8; 2],
    }
}

packed_record! {
    pub struct Adc2Inputs {
        pub diagnostics: u8,
        pub inputs: [u32; 2],
    }
}

packed_record! {
    pub struct Aim733Configuration {
        /// See [`super::settings::Aim733Filter`]
        pub filter_options: [u8; 4],
        /// See [`super::settings::Aim733Range`]
        pub ranges: [u8; 4],
    }
}

// ============================================================================
// AIM724: thermocouple
// ============================================================================

packed_record! {
    pub struct Aim724Configuration {
        pub scan_rate: u8,
        pub cjc_mode: u8,
        pub input_range: u8,
    }
}

packed_record! {
    pub struct Aim724Inputs {
        pub diagnostics: u8,
        pub channels: [f32; 2],
        pub cjc_input: f32,
    }
}

packed_record! {
    pub struct Aim724Outputs {
        /// Cold junction temperature when `cjc_mode` selects the external source
        pub cjc_external_source: f32,
    }
}

// ============================================================================
// AIM731: 2-channel analog output
// ============================================================================

packed_record! {
    pub struct Aim731Configuration {
        pub output_initial_values: [u16; 2],
        pub output_safe_values: [u16; 2],
        pub temperature_zones_support: u8,
        pub output_ranges: [u8; 2],
        /// See [`super::settings::SlewRate`]
        pub slew_rate_limits: [u8; 2],
    }
}

packed_record! {
    /// Output values currently applied by the module
    pub struct Aim731Inputs {
        pub diagnostics: u8,
        pub output_values: [u16; 2],
    }
}

packed_record! {
    pub struct Aim731Outputs {
        pub outputs: [u16; 2],
    }
}

// ============================================================================
// AIM791/AIM792: 8-channel limit-checked inputs
// ============================================================================

packed_record! {
    pub struct Aim79xConfiguration {
        pub input_range: u8,
        pub scan_rate: u8,
        pub filter_depth: u8,
        pub low_limits: [u16; 8],
        pub high_limits: [u16; 8],
        pub channel_ranges: [u8; 8],
    }
}

packed_record! {
    pub struct Aim79xInputs {
        pub diagnostics: u8,
        pub channel_ranges: u16,
        pub channels_status: u16,
        pub values: [u16; 8],
    }
}

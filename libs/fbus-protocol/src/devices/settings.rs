//! Setting value tables
//!
//! Record fields stay raw integers; these enums name the values a field
//! accepts. `from_raw` returns `None` for values outside the table.

use serde::{Deserialize, Serialize};

macro_rules! setting_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            pub const fn from_raw(raw: u8) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub const fn raw(self) -> u8 {
                self as u8
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.raw()
            }
        }
    };
}

// ============================================================================
// Analog input modules
// ============================================================================

setting_enum! {
    /// AIM720 input range
    pub enum Aim720Range {
        V0To5 = 0,
        V0To10 = 1,
        VMinus5To5 = 2,
        VMinus10To10 = 3,
    }
}

setting_enum! {
    /// Filter frequency of AIM721, AIM722, AIM723
    pub enum AdcFilter {
        Hz50 = 0,
        Hz1000 = 2,
        Hz100 = 4,
        Hz25 = 5,
    }
}

setting_enum! {
    /// Filter frequency of AIM726, AIM727, AIM728, AIM729
    pub enum AdcFilterFast {
        Hz50 = 0,
        Hz500 = 1,
        Hz1000 = 2,
    }
}

setting_enum! {
    pub enum Aim733Filter {
        Hz50 = 0,
        Hz500 = 1,
        Hz1000 = 2,
        Hz12_5 = 3,
    }
}

setting_enum! {
    pub enum Aim733Range {
        V0To5 = 0,
        V0To2_5 = 1,
    }
}

setting_enum! {
    pub enum Aim724ScanRate {
        Ms200 = 0,
    }
}

setting_enum! {
    /// Cold junction compensation source
    pub enum CjcMode {
        /// Temperature written by the host into the outputs region
        ExternalSource = 1,
        Disabled = 2,
        InternalSensor = 3,
    }
}

setting_enum! {
    /// Thermocouple type or millivolt range
    pub enum Aim724Range {
        TcJ = 0,
        TcK = 1,
        TcN = 2,
        TcT = 3,
        TcE = 4,
        TcR = 5,
        TcS = 6,
        TcB = 7,
        MvDiff20 = 8,
        MvDiff50 = 9,
        MvDiff100 = 10,
        MvDiff200 = 11,
        TcL = 17,
    }
}

setting_enum! {
    pub enum Aim791Range {
        Ma0To5 = 0,
        Ma0To20 = 1,
        Ma4To20 = 2,
    }
}

setting_enum! {
    pub enum Aim792Range {
        V0To5 = 0,
        V0To10 = 1,
        VDiff5 = 2,
        VDiff10 = 3,
    }
}

// ============================================================================
// Analog output modules
// ============================================================================

setting_enum! {
    pub enum Aim731OutputRange {
        V0To10 = 0,
        VDiff10 = 1,
    }
}

setting_enum! {
    /// Output slew rate limit (V/s unless noted)
    pub enum SlewRate {
        Disabled = 0,
        V0_15 = 1,
        V0_50 = 2,
        V1_00 = 3,
        V2_30 = 4,
        V4_74 = 5,
        V9_64 = 6,
        V19_43 = 7,
        V39_00 = 8,
        V78_18 = 9,
        V156_52 = 10,
        V313_19 = 11,
        V626_54 = 12,
        /// 1.25 V/ms
        Vms1_25 = 13,
        Vms2_50 = 14,
        Vms5_00 = 15,
        Vms10_00 = 16,
    }
}

// ============================================================================
// Counter modules
// ============================================================================

setting_enum! {
    pub enum Debounce {
        Off = 0,
        Us200 = 1,
        Ms3 = 2,
    }
}

setting_enum! {
    pub enum CountingEdge {
        Rising = 0,
        Falling = 1,
    }
}

setting_enum! {
    pub enum CountDirection {
        Up = 0,
        Down = 1,
    }
}

setting_enum! {
    pub enum CountingMode {
        Continuous = 0,
        Cyclic = 1,
    }
}

setting_enum! {
    /// DIM764 input filter
    pub enum Dim764Filter {
        Mhz50 = 0,
        Mhz5 = 1,
        Mhz2_5 = 2,
    }
}

setting_enum! {
    pub enum Dim764InputMode {
        Period = 0,
        Interval = 1,
        Phase = 2,
        Counter = 3,
        Disabled = 4,
    }
}

setting_enum! {
    pub enum Dim764Edge {
        Rising = 0,
        Falling = 1,
    }
}

setting_enum! {
    pub enum Dim764Counter {
        Absolute = 0,
        Conditional = 1,
    }
}

// ============================================================================
// Serial tunnel
// ============================================================================

setting_enum! {
    pub enum UartBaudrate {
        Bps300 = 0,
        Bps1200 = 1,
        Bps2400 = 2,
        Bps4800 = 3,
        Bps9600 = 4,
        Bps14400 = 5,
        Bps19200 = 6,
        Bps38400 = 7,
        Bps57600 = 8,
        Bps115200 = 9,
    }
}

impl UartBaudrate {
    pub const fn bits_per_second(self) -> u32 {
        match self {
            Self::Bps300 => 300,
            Self::Bps1200 => 1200,
            Self::Bps2400 => 2400,
            Self::Bps4800 => 4800,
            Self::Bps9600 => 9600,
            Self::Bps14400 => 14400,
            Self::Bps19200 => 19200,
            Self::Bps38400 => 38400,
            Self::Bps57600 => 57600,
            Self::Bps115200 => 115_200,
        }
    }
}

setting_enum! {
    pub enum UartDataBits {
        Eight = 0,
        Seven = 1,
    }
}

setting_enum! {
    pub enum UartStopBits {
        One = 0,
        Two = 1,
    }
}

setting_enum! {
    pub enum UartParity {
        NoParity = 0,
        Even = 1,
        Odd = 2,
    }
}

setting_enum! {
    pub enum UartMode {
        Rs485 = 0,
        Rs422 = 1,
    }
}

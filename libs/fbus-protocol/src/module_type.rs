//! Module type codes reported in the module descriptor

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! module_types {
    ($($variant:ident = $code:literal => $name:literal),+ $(,)?) => {
        /// Native module type code
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u32)]
        pub enum ModuleType {
            $($variant = $code,)+
        }

        impl ModuleType {
            /// Every known module type in code order
            pub const ALL: &'static [ModuleType] = &[$(ModuleType::$variant,)+];

            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn code(self) -> u32 {
                self as u32
            }

            /// Catalog name, e.g. `AIM724`
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

module_types! {
    Unknown = 0 => "UNKNOWN",
    // Analog
    Aim720 = 1 => "AIM720",
    Aim721 = 2 => "AIM721",
    Aim722 = 3 => "AIM722",
    Aim723 = 4 => "AIM723",
    Aim724 = 5 => "AIM724",
    Aim725 = 6 => "AIM725",
    Aim726 = 7 => "AIM726",
    Aim727 = 8 => "AIM727",
    Aim728 = 9 => "AIM728",
    Aim729 = 10 => "AIM729",
    Aim730 = 11 => "AIM730",
    Aim731 = 12 => "AIM731",
    Aim732 = 13 => "AIM732",
    Aim733 = 14 => "AIM733",
    // Digital
    Dim710 = 15 => "DIM710",
    Dim711 = 16 => "DIM711",
    Dim712 = 17 => "DIM712",
    Dim713 = 18 => "DIM713",
    Dim714 = 19 => "DIM714",
    Dim715 = 20 => "DIM715",
    Dim716 = 21 => "DIM716",
    Dim717 = 22 => "DIM717",
    Dim718 = 23 => "DIM718",
    Dim719 = 24 => "DIM719",
    Dim760 = 25 => "DIM760",
    Dim761 = 26 => "DIM761",
    Dim762 = 27 => "DIM762",
    Dim763 = 28 => "DIM763",
    Dim764 = 29 => "DIM764",
    // Interface
    Nim741 = 30 => "NIM741",
    Nim742 = 31 => "NIM742",
    Om751 = 32 => "OM751",
    Aim72503 = 33 => "AIM725-03",
    Aim791 = 34 => "AIM791",
    Aim792 = 35 => "AIM792",
    Dim765 = 36 => "DIM765",
    Dim766 = 37 => "DIM766",
    // FIO-2
    Dim812 = 38 => "DIM812",
    Dim813 = 39 => "DIM813",
    Dim814 = 40 => "DIM814",
    Dim815 = 41 => "DIM815",
    Dim816 = 42 => "DIM816",
    Dim817 = 43 => "DIM817",
    Dim818 = 44 => "DIM818",
    Dim819 = 45 => "DIM819",
    Dim860 = 46 => "DIM860",
    Dim862 = 47 => "DIM862",
    Dim873 = 48 => "DIM873",
    Nim841 = 49 => "NIM841",
}

impl Default for ModuleType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Native operation identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! operations {
    ($($variant:ident => $symbol:literal),+ $(,)?) => {
        /// Every entry point exposed by the native FBUS service
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Operation {
            $($variant,)+
        }

        impl Operation {
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)+];

            /// Exported symbol name in the native library
            pub const fn symbol(self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol,)+
                }
            }
        }
    };
}

operations! {
    GetVersion => "fbusGetVersion",
    Initialize => "fbusInitialize",
    DeInitialize => "fbusDeInitialize",
    Open => "fbusOpen",
    Close => "fbusClose",
    Rescan => "fbusRescan",
    GetNodesCount => "fbusGetNodesCount",
    GetNodeDescription => "fbusGetNodeDescription",
    Reset => "fbusReset",
    SendSync => "fbusSendSync",
    GetNodeCommonParameters => "fbusGetNodeCommonParameters",
    SetNodeCommonParameters => "fbusSetNodeCommonParameters",
    GetNodeSpecificParameters => "fbusGetNodeSpecificParameters",
    SetNodeSpecificParameters => "fbusSetNodeSpecificParameters",
    DeleteGroup => "fbusDeleteGroup",
    DeleteAllGroups => "fbusDeleteAllGroups",
    AssignNodeToGroup => "fbusAssignNodeToGroup",
    BuildGroups => "fbusBuildGroups",
    ReadConfig => "fbusReadConfig",
    WriteConfig => "fbusWriteConfig",
    SaveConfig => "fbusSaveConfig",
    ReadInputs => "fbusReadInputs",
    WriteOutputs => "fbusWriteOutputs",
    ProcessGroup => "fbusProcessGroup",
    GroupSetNodeOutputs => "fbusGroupSetNodeOutputs",
    GroupGetNodeInputs => "fbusGroupGetNodeInputs",
    ModuleGetCalibrationData => "fbusModuleGetCalibrationData",
    ModuleSetCalibrationData => "fbusModuleSetCalibrationData",
    ModuleEnterCalibrationMode => "fbusModuleEnterCalibrationMode",
    ModuleLeaveCalibrationMode => "fbusModuleLeaveCalibrationMode",
    ModuleSaveCalibrationData => "fbusModuleSaveCalibrationData",
    ModuleLoadCalibrationData => "fbusModuleLoadCalibrationData",
    GetAdapterInfo => "fbusGetAdapterInfo",
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

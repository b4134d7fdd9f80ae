//! Native outcome codes
//!
//! Every native entry point returns an unsigned outcome code. Codes are
//! classified into [`ResultKind`] variants; codes this library does not know
//! still classify, as [`ResultKind::Unknown`], so newer native libraries keep
//! working.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse grouping of outcome codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCategory {
    Success,
    State,
    Resource,
    Parameter,
    Group,
    Transport,
    System,
    Unknown,
}

macro_rules! result_kinds {
    ($($variant:ident = $code:literal, $category:ident, $label:literal;)+) => {
        /// Classified native outcome
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ResultKind {
            $($variant,)+
            /// Code outside the known table
            Unknown(u32),
        }

        impl ResultKind {
            /// Classify a raw code; never fails
            pub const fn classify(code: u32) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }

            pub const fn code(self) -> u32 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => code,
                }
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Unknown(_) => "unknown result code",
                }
            }

            pub const fn category(self) -> ResultCategory {
                match self {
                    $(Self::$variant => ResultCategory::$category,)+
                    Self::Unknown(_) => ResultCategory::Unknown,
                }
            }
        }
    };
}

result_kinds! {
    Ok = 0, Success, "success";
    InvalidState = 1, State, "invalid network state for this call";
    NoSystemResource = 2, Resource, "insufficient system resources";
    IncorrectParam = 3, Parameter, "incorrect parameters";
    OpenAdapter = 4, Transport, "failed to open FBUS master adapter";
    GroupUndefined = 5, Group, "group is not defined";
    InvalidGroupConfig = 6, Group, "invalid group configuration";
    GroupAllocation = 7, Group, "group object allocation failed";
    GroupConfigNotSynchronized = 8, Group, "group configuration differs from the module";
    GroupNotCreated = 9, Group, "system error while creating group";
    InvalidGroupId = 10, Group, "invalid group id";
    NodeNotAssignedToGroup = 11, Group, "node is not assigned to the group";
    InvalidExchangeRegion = 12, Parameter, "invalid exchange region parameters";
    RpcError = 13, Transport, "RPC request failed";
    Timeout = 14, Transport, "request timed out";
    NetworkNotRescanned = 15, State, "network not rescanned or no modules found";
    TransportError = 16, Transport, "transport error";
    HwFrameError = 17, Transport, "hardware frame error";
    InvalidConfig = 18, Parameter, "invalid configuration";
    FrameError = 19, Transport, "transaction frame error";
    ModuleNotAnswer = 20, Transport, "module does not answer";
    ModuleReportedBadCrc = 21, Transport, "module detected a CRC error in a group transaction";
    BadCrc = 22, Transport, "CRC error";
    ModuleBusy = 23, Transport, "module busy";
    ExcessBytes = 24, Transport, "module sent more bytes than expected";
    ModulePending = 25, Transport, "module is still processing an RPC request";
    SystemError = 26, System, "unknown system error";
}

impl ResultKind {
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Whether the application may reasonably retry the call
    ///
    /// Timeouts and the transport/hardware class qualify; state and
    /// parameter errors are programming errors.
    pub const fn is_retryable(self) -> bool {
        matches!(self.category(), ResultCategory::Transport)
            && !matches!(self, Self::OpenAdapter)
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_codes() {
        assert_eq!(ResultKind::classify(0), ResultKind::Ok);
        assert!(ResultKind::classify(0).is_success());
        assert_eq!(ResultKind::classify(1), ResultKind::InvalidState);
        assert_eq!(ResultKind::classify(14), ResultKind::Timeout);
        assert_eq!(ResultKind::classify(26), ResultKind::SystemError);

        for code in 0..27 {
            let kind = ResultKind::classify(code);
            assert!(!matches!(kind, ResultKind::Unknown(_)), "code {code}");
            assert_eq!(kind.code(), code);
        }
    }

    #[test]
    fn test_classify_unknown_codes() {
        // 27 is the native upper bound marker
        assert_eq!(ResultKind::classify(27), ResultKind::Unknown(27));
        assert_eq!(ResultKind::classify(u32::MAX).code(), u32::MAX);
        assert_eq!(ResultKind::classify(99).category(), ResultCategory::Unknown);
        assert!(!ResultKind::classify(99).is_retryable());
    }

    #[test]
    fn test_retryable_classes() {
        assert!(ResultKind::Timeout.is_retryable());
        assert!(ResultKind::ModuleNotAnswer.is_retryable());
        assert!(ResultKind::BadCrc.is_retryable());
        assert!(ResultKind::ModuleBusy.is_retryable());

        assert!(!ResultKind::Ok.is_retryable());
        assert!(!ResultKind::InvalidState.is_retryable());
        assert!(!ResultKind::IncorrectParam.is_retryable());
        assert!(!ResultKind::InvalidGroupId.is_retryable());
        assert!(!ResultKind::OpenAdapter.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResultKind::Timeout.to_string(), "request timed out (14)");
        assert_eq!(ResultKind::classify(42).to_string(), "unknown result code (42)");
    }
}

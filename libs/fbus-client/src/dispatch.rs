//! Operation dispatcher
//!
//! Validates arguments against the registered signature, hands the call to
//! the native service exactly once and turns the outcome code into a
//! [`ResultKind`]. No retries; out-parameters are only meaningful when the
//! call returns `Ok`.

use fbus_protocol::ResultKind;
use tracing::{debug, warn};

use crate::error::{FbusError, Result};
use crate::native::NativeService;
use crate::operation::Operation;
use crate::registry::{Arg, ArgKind, Registry};

pub struct Dispatcher {
    registry: Registry,
    service: Box<dyn NativeService>,
}

impl Dispatcher {
    pub fn new(registry: Registry, service: Box<dyn NativeService>) -> Self {
        Self { registry, service }
    }

    /// Dispatcher over the standard operation table
    pub fn with_service(service: impl NativeService + 'static) -> Self {
        Self::new(Registry::standard(), Box::new(service))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Invoke `operation` with `args`
    pub fn invoke(&self, operation: Operation, args: &mut [Arg<'_>]) -> Result<()> {
        let entry = self
            .registry
            .entry(operation)
            .ok_or_else(|| FbusError::OperationNotAvailable {
                operation,
                reason: "operation not registered".to_string(),
            })?;

        check_arguments(operation, entry.signature, args)?;

        let code = self.service.invoke(entry, args)?;
        let kind = ResultKind::classify(code);

        if kind.is_success() {
            debug!("{} ok", operation);
            Ok(())
        } else {
            warn!("{} failed: {}", operation, kind);
            Err(FbusError::OperationFailed {
                operation,
                code,
                kind,
            })
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("operations", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Check argument kinds and that no length exceeds the call's buffer
fn check_arguments(operation: Operation, signature: &[ArgKind], args: &[Arg<'_>]) -> Result<()> {
    if args.len() != signature.len() {
        return Err(FbusError::invalid_parameter(
            "arguments",
            format!(
                "{} takes {} arguments, got {}",
                operation,
                signature.len(),
                args.len()
            ),
        ));
    }

    for (position, (arg, expected)) in args.iter().zip(signature).enumerate() {
        if arg.kind() != *expected {
            return Err(FbusError::invalid_parameter(
                "arguments",
                format!(
                    "{} argument {} must be {:?}, got {:?}",
                    operation,
                    position,
                    expected,
                    arg.kind()
                ),
            ));
        }
    }

    let buffer_len = args.iter().find_map(Arg::buffer_len);
    for arg in args {
        if let Arg::Length(length) = arg {
            let capacity = buffer_len.unwrap_or(0);
            if *length > capacity {
                return Err(FbusError::invalid_parameter(
                    "length",
                    format!(
                        "{} length {} exceeds the {}-byte buffer",
                        operation, length, capacity
                    ),
                ));
            }
        }
    }

    Ok(())
}

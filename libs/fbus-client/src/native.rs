//! Native FBUS service boundary
//!
//! The bus driver itself lives in a vendor library exporting one C function
//! per operation. [`LibraryService`] resolves those symbols by name at call
//! time; tests substitute their own [`NativeService`].

use std::ffi::c_void;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::{debug, info};

use crate::error::{FbusError, Result};
use crate::registry::{Arg, OperationEntry};

/// Default library file name for the host platform
#[cfg(windows)]
pub const DEFAULT_LIBRARY: &str = "fbuslibw.dll";
#[cfg(not(windows))]
pub const DEFAULT_LIBRARY: &str = "libfbus.so";

/// Executes registered operations
///
/// Implementations are called with arguments that already match
/// `entry.signature`. The native library is not reentrant for one network
/// handle, so callers serialize access per handle.
pub trait NativeService: Send {
    /// Execute the operation once and return the raw outcome code
    fn invoke(&self, entry: &OperationEntry, args: &mut [Arg<'_>]) -> Result<u32>;
}

/// Service backed by a dynamically loaded FBUS library
pub struct LibraryService {
    library: Library,
    path: PathBuf,
}

impl LibraryService {
    /// Load the library at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let library = unsafe { Library::new(&path) }.map_err(|e| FbusError::Library {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        info!("FBUS library loaded: {}", path.display());
        Ok(Self { library, path })
    }

    /// Load [`DEFAULT_LIBRARY`] through the platform search path
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_LIBRARY)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NativeService for LibraryService {
    fn invoke(&self, entry: &OperationEntry, args: &mut [Arg<'_>]) -> Result<u32> {
        let symbol: Symbol<'_, *const c_void> = unsafe { self.library.get(entry.symbol.as_bytes()) }
            .map_err(|e| FbusError::OperationNotAvailable {
                operation: entry.operation,
                reason: format!("symbol {} not found: {}", entry.symbol, e),
            })?;

        let address = *symbol;
        if address.is_null() {
            return Err(FbusError::OperationNotAvailable {
                operation: entry.operation,
                reason: format!("symbol {} resolved to null", entry.symbol),
            });
        }

        debug!("Calling {}", entry.symbol);
        // SAFETY: entries are bound to the C signature of their symbol,
        // either by the standard table or by the caller of the unsafe
        // `OperationEntry::new` / `Registry::alias`
        unsafe { entry.call(address, args) }
    }
}

impl std::fmt::Debug for LibraryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryService")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

//! FBUS Master Client
//!
//! Typed access to an FBUS fieldbus network through the vendor's native
//! service library.
//!
//! # Architecture
//!
//! - **Operation Registry**: binds each [`Operation`] to its exported symbol
//!   and C argument shape
//! - **Dispatcher**: checks arguments, calls the native service once and
//!   classifies the outcome code
//! - **Native Service**: [`LibraryService`] over a dynamically loaded library,
//!   or any [`NativeService`] implementation
//! - **Client Facade**: [`FbusClient`] session state machine with one method
//!   per protocol verb
//!
//! # Example
//!
//! ```no_run
//! use fbus_client::{AdapterKind, FbusClient};
//! use fbus_protocol::devices::Dim712;
//!
//! # fn main() -> fbus_client::Result<()> {
//! let mut client = FbusClient::load("libfbus.so")?;
//! client.initialize()?;
//! client.open(AdapterKind::Local, 1)?;
//!
//! let nodes = client.rescan()?;
//! for node in 0..nodes as u8 {
//!     println!("{}", client.node_description(node)?);
//! }
//!
//! let inputs = client.read_inputs::<Dim712>(0)?;
//! println!("{:?}", inputs);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod native;
pub mod operation;
pub mod registry;

pub use client::{
    network_address, AdapterKind, ApiVersion, ClientState, DataWindow, FbusClient,
};
pub use config::ClientConfig;
pub use dispatch::Dispatcher;
pub use error::{FbusError, Result};
pub use logging::init_logging;
pub use native::{LibraryService, NativeService, DEFAULT_LIBRARY};
pub use operation::Operation;
pub use registry::{Arg, ArgKind, MarshalFn, NetworkHandle, OperationEntry, Registry};

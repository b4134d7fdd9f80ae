//! FBUS client facade
//!
//! One method per protocol verb. The client owns the network handle and a
//! small state machine:
//!
//! ```text
//! Uninitialized -> Initialized -> NetworkOpen -> NetworkClosed -> DeInitialized
//!                      ^                              |
//!                      +------------ reopen ----------+
//! ```
//!
//! Every handle-based operation requires `NetworkOpen` and is rejected with
//! [`FbusError::InvalidState`] before dispatch otherwise. Transitions happen
//! only after the native call succeeds.
//!
//! # Concurrency
//!
//! The native library is not reentrant for one handle. Every method that
//! talks to the network takes `&mut self`; sharing a client across threads
//! needs the caller's own lock.

use std::fmt;
use std::path::Path;

use fbus_protocol::constants::{is_valid_group_id, UNDEFINED_GROUP_ID};
use fbus_protocol::{
    check_family, AdapterInfo, CommonConfiguration, DeviceFamily, ModuleDescriptor, PackedRecord,
    ResultKind,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error::{FbusError, Result};
use crate::native::{LibraryService, NativeService};
use crate::operation::Operation;
use crate::registry::{Arg, NetworkHandle};

/// Lowest valid adapter port
pub const MIN_PORT: u16 = 1;
/// Highest valid adapter port
pub const MAX_PORT: u16 = 100;

/// Network address of local adapter ports above the first
const LOCAL_ADDRESS_BASE: usize = 100;

/// Bus adapter attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Adapter attached to the host
    #[default]
    Local,
    /// Adapter tunneled over TCP
    Tcp,
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Local => write!(f, "local"),
            AdapterKind::Tcp => write!(f, "tcp"),
        }
    }
}

/// Map an adapter port to the native network address
///
/// Local port 1 is address 0 and local port N > 1 is `100 + N - 1`; TCP
/// ports map directly.
pub fn network_address(adapter: AdapterKind, port: u16) -> Result<usize> {
    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        return Err(FbusError::invalid_parameter(
            "port",
            format!("{} is outside {}..={}", port, MIN_PORT, MAX_PORT),
        ));
    }

    let port = usize::from(port);
    Ok(match adapter {
        AdapterKind::Local if port == 1 => 0,
        AdapterKind::Local => LOCAL_ADDRESS_BASE + port - 1,
        AdapterKind::Tcp => port,
    })
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Uninitialized,
    Initialized,
    NetworkOpen(NetworkHandle),
    NetworkClosed,
    DeInitialized,
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientState::Uninitialized => write!(f, "uninitialized"),
            ClientState::Initialized => write!(f, "initialized"),
            ClientState::NetworkOpen(handle) => write!(f, "network open ({})", handle),
            ClientState::NetworkClosed => write!(f, "network closed"),
            ClientState::DeInitialized => write!(f, "deinitialized"),
        }
    }
}

/// FBUS API version reported by the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersion {
    pub major: i32,
    pub minor: i32,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Byte window inside a module data region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataWindow {
    pub offset: usize,
    pub length: usize,
}

impl DataWindow {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Whole region of record kind `R`
    pub fn full<R: PackedRecord>() -> Self {
        Self::new(0, R::SIZE)
    }
}

/// FBUS master session
pub struct FbusClient {
    dispatcher: Dispatcher,
    state: ClientState,
}

impl FbusClient {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            state: ClientState::Uninitialized,
        }
    }

    /// Client over the standard operation table and `service`
    pub fn with_service(service: impl NativeService + 'static) -> Self {
        Self::new(Dispatcher::with_service(service))
    }

    /// Client over the native library at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_service(LibraryService::load(path)?))
    }

    /// Load the configured library, initialize and open the configured network
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let mut client = Self::load(config.library_path())?;
        client.initialize()?;
        client.open(config.adapter, config.port)?;
        Ok(client)
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Open network handle, if any
    pub fn handle(&self) -> Option<NetworkHandle> {
        match self.state {
            ClientState::NetworkOpen(handle) => Some(handle),
            _ => None,
        }
    }

    fn require_handle(&self, operation: Operation) -> Result<NetworkHandle> {
        self.handle().ok_or_else(|| self.invalid_state(operation))
    }

    fn invalid_state(&self, operation: Operation) -> FbusError {
        FbusError::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }

    // ========================================================================
    // Service and network lifecycle
    // ========================================================================

    /// Native API version; valid in any state
    pub fn version(&self) -> Result<ApiVersion> {
        let (mut major, mut minor) = (0, 0);
        self.dispatcher.invoke(
            Operation::GetVersion,
            &mut [Arg::OutInt(&mut major), Arg::OutInt(&mut minor)],
        )?;
        Ok(ApiVersion { major, minor })
    }

    pub fn initialize(&mut self) -> Result<()> {
        if !matches!(
            self.state,
            ClientState::Uninitialized | ClientState::DeInitialized
        ) {
            return Err(self.invalid_state(Operation::Initialize));
        }

        self.dispatcher.invoke(Operation::Initialize, &mut [])?;
        self.state = ClientState::Initialized;
        info!("FBUS service initialized");
        Ok(())
    }

    pub fn deinitialize(&mut self) -> Result<()> {
        if !matches!(
            self.state,
            ClientState::Initialized | ClientState::NetworkClosed
        ) {
            return Err(self.invalid_state(Operation::DeInitialize));
        }

        self.dispatcher.invoke(Operation::DeInitialize, &mut [])?;
        self.state = ClientState::DeInitialized;
        info!("FBUS service deinitialized");
        Ok(())
    }

    /// Open the network behind `adapter`/`port`
    pub fn open(&mut self, adapter: AdapterKind, port: u16) -> Result<NetworkHandle> {
        let address = network_address(adapter, port)?;

        if !matches!(
            self.state,
            ClientState::Initialized | ClientState::NetworkClosed
        ) {
            return Err(self.invalid_state(Operation::Open));
        }

        let mut raw = 0usize;
        self.dispatcher.invoke(
            Operation::Open,
            &mut [Arg::Size(address), Arg::OutSize(&mut raw)],
        )?;

        let handle = NetworkHandle(raw);
        if !handle.is_valid() {
            // Success with a null handle would pass 0 to every later call
            return Err(FbusError::OperationFailed {
                operation: Operation::Open,
                code: ResultKind::SystemError.code(),
                kind: ResultKind::SystemError,
            });
        }

        self.state = ClientState::NetworkOpen(handle);
        info!(
            "FBUS network opened: {} port {} (address {}, handle {})",
            adapter, port, address, handle
        );
        Ok(handle)
    }

    pub fn close(&mut self) -> Result<()> {
        let handle = self.require_handle(Operation::Close)?;
        self.dispatcher
            .invoke(Operation::Close, &mut [Arg::Handle(handle)])?;
        self.state = ClientState::NetworkClosed;
        info!("FBUS network closed (handle {})", handle);
        Ok(())
    }

    /// Scan the network, assign node ids and read module configuration
    ///
    /// Returns the number of modules found.
    pub fn rescan(&mut self) -> Result<usize> {
        let handle = self.require_handle(Operation::Rescan)?;
        let mut nodes = 0usize;
        self.dispatcher.invoke(
            Operation::Rescan,
            &mut [Arg::Handle(handle), Arg::OutSize(&mut nodes)],
        )?;
        info!("FBUS rescan found {} modules", nodes);
        Ok(nodes)
    }

    pub fn nodes_count(&mut self) -> Result<usize> {
        let handle = self.require_handle(Operation::GetNodesCount)?;
        let mut nodes = 0usize;
        self.dispatcher.invoke(
            Operation::GetNodesCount,
            &mut [Arg::Handle(handle), Arg::OutSize(&mut nodes)],
        )?;
        Ok(nodes)
    }

    pub fn node_description(&mut self, node: u8) -> Result<ModuleDescriptor> {
        self.get_record(Operation::GetNodeDescription, node)
    }

    /// Reset one module, or all with the multicast id
    pub fn reset(&mut self, node: u8) -> Result<()> {
        self.node_command(Operation::Reset, node)
    }

    /// Broadcast a sync message
    pub fn send_sync(&mut self, sync_id: u8) -> Result<()> {
        self.node_command(Operation::SendSync, sync_id)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Common parameters from the network configuration
    pub fn common_parameters(&mut self, node: u8) -> Result<CommonConfiguration> {
        self.get_record(Operation::GetNodeCommonParameters, node)
    }

    pub fn set_common_parameters(
        &mut self,
        node: u8,
        config: &CommonConfiguration,
    ) -> Result<()> {
        let handle = self.require_handle(Operation::SetNodeCommonParameters)?;
        let bytes = config.encode();
        self.dispatcher.invoke(
            Operation::SetNodeCommonParameters,
            &mut [
                Arg::Handle(handle),
                Arg::Node(node),
                Arg::InBuffer(&bytes),
                Arg::Length(bytes.len()),
            ],
        )
    }

    /// Family-specific parameters from the network configuration
    pub fn specific_parameters<D: DeviceFamily>(&mut self, node: u8) -> Result<D::Configuration> {
        let mut buf = vec![0u8; D::Configuration::SIZE];
        self.specific_parameters_raw(node, 0, &mut buf)?;
        Ok(D::Configuration::decode(&buf)?)
    }

    pub fn set_specific_parameters<D: DeviceFamily>(
        &mut self,
        node: u8,
        config: &D::Configuration,
    ) -> Result<()> {
        self.set_specific_parameters_raw(node, 0, &config.encode())
    }

    /// Read `buf.len()` bytes of specific parameters starting at `offset`
    pub fn specific_parameters_raw(
        &mut self,
        node: u8,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<()> {
        self.read_window(Operation::GetNodeSpecificParameters, node, offset, buf)
    }

    pub fn set_specific_parameters_raw(
        &mut self,
        node: u8,
        offset: usize,
        data: &[u8],
    ) -> Result<()> {
        self.write_window(Operation::SetNodeSpecificParameters, node, offset, data)
    }

    /// Read configuration from the module(s) into the network configuration
    pub fn read_config(&mut self, node: u8) -> Result<()> {
        self.node_command(Operation::ReadConfig, node)
    }

    /// Write the network configuration into the module(s)
    pub fn write_config(&mut self, node: u8) -> Result<()> {
        self.node_command(Operation::WriteConfig, node)
    }

    /// Persist module configuration in non-volatile memory
    pub fn save_config(&mut self, node: u8) -> Result<()> {
        self.node_command(Operation::SaveConfig, node)
    }

    // ========================================================================
    // Individual data exchange
    // ========================================================================

    pub fn read_inputs<D: DeviceFamily>(&mut self, node: u8) -> Result<D::Inputs> {
        let mut buf = vec![0u8; D::Inputs::SIZE];
        self.read_inputs_raw(node, 0, &mut buf)?;
        Ok(D::Inputs::decode(&buf)?)
    }

    pub fn write_outputs<D: DeviceFamily>(&mut self, node: u8, outputs: &D::Outputs) -> Result<()> {
        self.write_outputs_raw(node, 0, &outputs.encode())
    }

    pub fn read_inputs_raw(&mut self, node: u8, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.read_window(Operation::ReadInputs, node, offset, buf)
    }

    pub fn write_outputs_raw(&mut self, node: u8, offset: usize, data: &[u8]) -> Result<()> {
        self.write_window(Operation::WriteOutputs, node, offset, data)
    }

    // ========================================================================
    // Group exchange
    // ========================================================================

    pub fn delete_group(&mut self, group: u8) -> Result<()> {
        check_group_id(group)?;
        self.node_command(Operation::DeleteGroup, group)
    }

    pub fn delete_all_groups(&mut self) -> Result<()> {
        self.handle_command(Operation::DeleteAllGroups)
    }

    /// Assign a node to a group with the given input and output windows
    ///
    /// `group` may be the unassigned sentinel to remove the node from its group.
    pub fn assign_node_to_group(
        &mut self,
        node: u8,
        group: u8,
        input: DataWindow,
        output: DataWindow,
    ) -> Result<()> {
        if group != UNDEFINED_GROUP_ID {
            check_group_id(group)?;
        }
        let handle = self.require_handle(Operation::AssignNodeToGroup)?;
        self.dispatcher.invoke(
            Operation::AssignNodeToGroup,
            &mut [
                Arg::Handle(handle),
                Arg::Node(node),
                Arg::Node(group),
                Arg::Size(input.offset),
                Arg::Size(input.length),
                Arg::Size(output.offset),
                Arg::Size(output.length),
            ],
        )
    }

    /// Compute group exchange parameters for every module
    pub fn build_groups(&mut self) -> Result<()> {
        self.handle_command(Operation::BuildGroups)
    }

    /// Run one group exchange
    pub fn process_group(&mut self, group: u8) -> Result<()> {
        check_group_id(group)?;
        self.node_command(Operation::ProcessGroup, group)
    }

    /// Stage a node's outputs in the group output buffer
    pub fn group_set_node_outputs<D: DeviceFamily>(
        &mut self,
        group: u8,
        node: u8,
        outputs: &D::Outputs,
    ) -> Result<()> {
        check_group_id(group)?;
        let handle = self.require_handle(Operation::GroupSetNodeOutputs)?;
        let bytes = outputs.encode();
        self.dispatcher.invoke(
            Operation::GroupSetNodeOutputs,
            &mut [
                Arg::Handle(handle),
                Arg::Node(group),
                Arg::Node(node),
                Arg::Size(0),
                Arg::Length(bytes.len()),
                Arg::InBuffer(&bytes),
            ],
        )
    }

    /// Read a node's inputs from the group input buffer
    pub fn group_get_node_inputs<D: DeviceFamily>(
        &mut self,
        group: u8,
        node: u8,
    ) -> Result<D::Inputs> {
        check_group_id(group)?;
        let handle = self.require_handle(Operation::GroupGetNodeInputs)?;
        let mut buf = vec![0u8; D::Inputs::SIZE];
        let len = buf.len();
        self.dispatcher.invoke(
            Operation::GroupGetNodeInputs,
            &mut [
                Arg::Handle(handle),
                Arg::Node(group),
                Arg::Node(node),
                Arg::Size(0),
                Arg::Length(len),
                Arg::OutBuffer(&mut buf),
            ],
        )?;
        Ok(D::Inputs::decode(&buf)?)
    }

    // ========================================================================
    // Calibration
    // ========================================================================

    pub fn calibration_data(&mut self, node: u8, offset: usize, buf: &mut [u8]) -> Result<()> {
        let handle = self.require_handle(Operation::ModuleGetCalibrationData)?;
        let len = buf.len();
        self.dispatcher.invoke(
            Operation::ModuleGetCalibrationData,
            &mut [
                Arg::Handle(handle),
                Arg::Node(node),
                Arg::Size(offset),
                Arg::Length(len),
                Arg::OutBuffer(buf),
            ],
        )
    }

    pub fn set_calibration_data(&mut self, node: u8, offset: usize, data: &[u8]) -> Result<()> {
        let handle = self.require_handle(Operation::ModuleSetCalibrationData)?;
        self.dispatcher.invoke(
            Operation::ModuleSetCalibrationData,
            &mut [
                Arg::Handle(handle),
                Arg::Node(node),
                Arg::Size(offset),
                Arg::Length(data.len()),
                Arg::InBuffer(data),
            ],
        )
    }

    pub fn enter_calibration_mode(&mut self, node: u8) -> Result<()> {
        self.node_command(Operation::ModuleEnterCalibrationMode, node)
    }

    pub fn leave_calibration_mode(&mut self, node: u8) -> Result<()> {
        self.node_command(Operation::ModuleLeaveCalibrationMode, node)
    }

    /// Persist calibration `section` in the module
    pub fn save_calibration_data(&mut self, node: u8, section: u32) -> Result<()> {
        self.section_command(Operation::ModuleSaveCalibrationData, node, section)
    }

    /// Reload calibration `section` from module storage
    pub fn load_calibration_data(&mut self, node: u8, section: u32) -> Result<()> {
        self.section_command(Operation::ModuleLoadCalibrationData, node, section)
    }

    // ========================================================================
    // Adapter
    // ========================================================================

    pub fn adapter_info(&mut self) -> Result<AdapterInfo> {
        let handle = self.require_handle(Operation::GetAdapterInfo)?;
        let mut buf = vec![0u8; AdapterInfo::SIZE];
        let len = buf.len();
        self.dispatcher.invoke(
            Operation::GetAdapterInfo,
            &mut [
                Arg::Handle(handle),
                Arg::OutBuffer(&mut buf),
                Arg::Length(len),
            ],
        )?;
        Ok(AdapterInfo::decode(&buf)?)
    }

    /// Fetch the node's descriptor and check it against family `D`
    pub fn verify_node_family<D: DeviceFamily>(&mut self, node: u8) -> Result<ModuleDescriptor> {
        let descriptor = self.node_description(node)?;
        check_family::<D>(&descriptor)?;
        debug!("Node {} matches {}", node, D::MODULE_TYPE);
        Ok(descriptor)
    }

    // ========================================================================
    // Call helpers
    // ========================================================================

    fn handle_command(&mut self, operation: Operation) -> Result<()> {
        let handle = self.require_handle(operation)?;
        self.dispatcher
            .invoke(operation, &mut [Arg::Handle(handle)])
    }

    fn node_command(&mut self, operation: Operation, node: u8) -> Result<()> {
        let handle = self.require_handle(operation)?;
        self.dispatcher
            .invoke(operation, &mut [Arg::Handle(handle), Arg::Node(node)])
    }

    fn section_command(&mut self, operation: Operation, node: u8, section: u32) -> Result<()> {
        let handle = self.require_handle(operation)?;
        self.dispatcher.invoke(
            operation,
            &mut [Arg::Handle(handle), Arg::Node(node), Arg::Word(section)],
        )
    }

    /// Fetch a whole record through a `(handle, node, buffer, length)` call
    fn get_record<R: PackedRecord>(&mut self, operation: Operation, node: u8) -> Result<R> {
        let handle = self.require_handle(operation)?;
        let mut buf = vec![0u8; R::SIZE];
        let len = buf.len();
        self.dispatcher.invoke(
            operation,
            &mut [
                Arg::Handle(handle),
                Arg::Node(node),
                Arg::OutBuffer(&mut buf),
                Arg::Length(len),
            ],
        )?;
        Ok(R::decode(&buf)?)
    }

    fn read_window(
        &mut self,
        operation: Operation,
        node: u8,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<()> {
        let handle = self.require_handle(operation)?;
        let len = buf.len();
        self.dispatcher.invoke(
            operation,
            &mut [
                Arg::Handle(handle),
                Arg::Node(node),
                Arg::OutBuffer(buf),
                Arg::Size(offset),
                Arg::Length(len),
            ],
        )
    }

    fn write_window(
        &mut self,
        operation: Operation,
        node: u8,
        offset: usize,
        data: &[u8],
    ) -> Result<()> {
        let handle = self.require_handle(operation)?;
        self.dispatcher.invoke(
            operation,
            &mut [
                Arg::Handle(handle),
                Arg::Node(node),
                Arg::InBuffer(data),
                Arg::Size(offset),
                Arg::Length(data.len()),
            ],
        )
    }
}

impl fmt::Debug for FbusClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FbusClient")
            .field("state", &self.state)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl Drop for FbusClient {
    fn drop(&mut self) {
        if self.handle().is_some() {
            if let Err(e) = self.close() {
                warn!("Failed to close FBUS network on drop: {}", e);
            }
        }

        if matches!(
            self.state,
            ClientState::Initialized | ClientState::NetworkClosed
        ) {
            if let Err(e) = self.deinitialize() {
                warn!("Failed to deinitialize FBUS service on drop: {}", e);
            }
        }
    }
}

fn check_group_id(group: u8) -> Result<()> {
    if is_valid_group_id(group) {
        Ok(())
    } else {
        Err(FbusError::invalid_parameter(
            "group",
            format!("{:#04x} is outside 0x80..=0xBF", group),
        ))
    }
}

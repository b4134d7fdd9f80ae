//! Operation registry
//!
//! Binds every [`Operation`] to its native call signature: the ordered
//! argument kinds and a marshaling function that calls the entry point with
//! the matching C signature. All native entry points return an unsigned
//! outcome code.
//!
//! The standard table is an exhaustive `match` on [`Operation`], so a new
//! operation does not compile until it has a binding.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::{c_int, c_uint, c_void};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FbusError, Result};
use crate::operation::Operation;

/// Opaque network handle returned by the native open call
///
/// Zero is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkHandle(pub usize);

impl NetworkHandle {
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for NetworkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Kind of one native argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Network handle (`size_t`)
    Handle,
    /// 8-bit node, group or sync id
    Node,
    /// 32-bit value (`uint32_t`)
    Word,
    /// Address or offset (`size_t`)
    Size,
    /// Byte count of this call's buffer (`size_t`)
    Length,
    /// Buffer read by the native side
    InBuffer,
    /// Buffer filled by the native side
    OutBuffer,
    /// `size_t*` out-parameter
    OutSize,
    /// `int*` out-parameter
    OutInt,
}

/// One marshaled argument
#[derive(Debug)]
pub enum Arg<'a> {
    Handle(NetworkHandle),
    Node(u8),
    Word(u32),
    Size(usize),
    Length(usize),
    InBuffer(&'a [u8]),
    OutBuffer(&'a mut [u8]),
    OutSize(&'a mut usize),
    OutInt(&'a mut i32),
}

impl Arg<'_> {
    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Handle(_) => ArgKind::Handle,
            Arg::Node(_) => ArgKind::Node,
            Arg::Word(_) => ArgKind::Word,
            Arg::Size(_) => ArgKind::Size,
            Arg::Length(_) => ArgKind::Length,
            Arg::InBuffer(_) => ArgKind::InBuffer,
            Arg::OutBuffer(_) => ArgKind::OutBuffer,
            Arg::OutSize(_) => ArgKind::OutSize,
            Arg::OutInt(_) => ArgKind::OutInt,
        }
    }

    /// Byte length of a buffer argument
    pub fn buffer_len(&self) -> Option<usize> {
        match self {
            Arg::InBuffer(buf) => Some(buf.len()),
            Arg::OutBuffer(buf) => Some(buf.len()),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &str) -> FbusError {
        FbusError::invalid_parameter(
            "argument",
            format!("expected {expected}, got {:?}", self.kind()),
        )
    }

    fn handle(&self) -> Result<usize> {
        match self {
            Arg::Handle(handle) => Ok(handle.0),
            other => Err(other.mismatch("handle")),
        }
    }

    fn node(&self) -> Result<u8> {
        match self {
            Arg::Node(id) => Ok(*id),
            other => Err(other.mismatch("node id")),
        }
    }

    fn word(&self) -> Result<u32> {
        match self {
            Arg::Word(value) => Ok(*value),
            other => Err(other.mismatch("32-bit value")),
        }
    }

    fn size(&self) -> Result<usize> {
        match self {
            Arg::Size(value) | Arg::Length(value) => Ok(*value),
            other => Err(other.mismatch("size")),
        }
    }

    fn buffer(&mut self) -> Result<*mut c_void> {
        match self {
            // The native side only reads through this pointer
            Arg::InBuffer(buf) => Ok(buf.as_ptr().cast_mut().cast()),
            Arg::OutBuffer(buf) => Ok(buf.as_mut_ptr().cast()),
            other => Err(other.mismatch("buffer")),
        }
    }

    fn out_size(&mut self) -> Result<*mut usize> {
        match self {
            Arg::OutSize(value) => Ok(&mut **value as *mut usize),
            other => Err(other.mismatch("size out-parameter")),
        }
    }

    fn out_int(&mut self) -> Result<*mut c_int> {
        match self {
            Arg::OutInt(value) => Ok((&mut **value as *mut i32).cast()),
            other => Err(other.mismatch("int out-parameter")),
        }
    }
}

/// Calls a native entry point with marshaled arguments
///
/// # Safety
///
/// `entry` must be the address of a function with the C signature the
/// marshaler was built for.
pub type MarshalFn = unsafe fn(*const c_void, &mut [Arg<'_>]) -> Result<u32>;

/// Registry entry for one operation
///
/// The signature and marshaler are fixed at construction; a signature that
/// could let the native side write past a buffer is rejected there.
#[derive(Clone)]
pub struct OperationEntry {
    pub(crate) operation: Operation,
    /// Symbol resolved in the native service
    pub(crate) symbol: Cow<'static, str>,
    pub(crate) signature: &'static [ArgKind],
    pub(crate) marshal: MarshalFn,
}

impl OperationEntry {
    /// Bind `operation` to a custom signature and marshaler
    ///
    /// # Safety
    ///
    /// `marshal` must call the entry point with exactly the C argument list
    /// described by `signature`, and every buffer length the native side
    /// honors must be the `Length` argument of that signature.
    pub unsafe fn new(
        operation: Operation,
        signature: &'static [ArgKind],
        marshal: MarshalFn,
    ) -> Result<Self> {
        check_signature(operation, signature)?;
        Ok(Self::bind(operation, signature, marshal))
    }

    fn bind(operation: Operation, signature: &'static [ArgKind], marshal: MarshalFn) -> Self {
        Self {
            operation,
            symbol: Cow::Borrowed(operation.symbol()),
            signature,
            marshal,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn signature(&self) -> &'static [ArgKind] {
        self.signature
    }

    /// Call the entry point at `address` through this entry's marshaler
    ///
    /// # Safety
    ///
    /// `address` must be the entry point named by `self.symbol`, exported
    /// with the C signature this entry was bound to.
    pub unsafe fn call(&self, address: *const c_void, args: &mut [Arg<'_>]) -> Result<u32> {
        unsafe { (self.marshal)(address, args) }
    }
}

/// A signature with a buffer carries exactly one buffer and one `Length`
fn check_signature(operation: Operation, signature: &[ArgKind]) -> Result<()> {
    let buffers = signature
        .iter()
        .filter(|kind| matches!(kind, ArgKind::InBuffer | ArgKind::OutBuffer))
        .count();
    let lengths = signature
        .iter()
        .filter(|kind| **kind == ArgKind::Length)
        .count();

    if buffers > 1 || buffers != lengths {
        return Err(FbusError::invalid_parameter(
            "signature",
            format!(
                "{} signature {:?} needs one Length per buffer",
                operation, signature
            ),
        ));
    }
    Ok(())
}

impl fmt::Debug for OperationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationEntry")
            .field("operation", &self.operation)
            .field("symbol", &self.symbol)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Native signature shapes
// ============================================================================

mod shapes {
    use super::*;

    macro_rules! shape {
        ($(
            $name:ident ( $($arg:ident : $cty:ty => $conv:ident),* );
        )+) => {
            $(
                pub(super) unsafe fn $name(entry: *const c_void, args: &mut [Arg<'_>]) -> Result<u32> {
                    let expected: &[&str] = &[$(stringify!($arg)),*];
                    let count = args.len();
                    let [$($arg),*] = args else {
                        return Err(FbusError::invalid_parameter(
                            "arguments",
                            format!("{} expects {} arguments, got {count}", stringify!($name), expected.len()),
                        ));
                    };
                    $(let $arg: $cty = $arg.$conv()?;)*

                    // SAFETY: caller guarantees `entry` has this C signature
                    let function: unsafe extern "C" fn($($cty),*) -> c_uint =
                        unsafe { std::mem::transmute::<*const c_void, _>(entry) };
                    Ok(unsafe { function($($arg),*) })
                }
            )+
        };
    }

    shape! {
        no_args();
        out_int_pair(major: *mut c_int => out_int, minor: *mut c_int => out_int);
        size_out_size(address: usize => size, handle: *mut usize => out_size);
        handle_only(handle: usize => handle);
        handle_out_size(handle: usize => handle, value: *mut usize => out_size);
        handle_node(handle: usize => handle, node: u8 => node);
        handle_node_word(handle: usize => handle, node: u8 => node, word: u32 => word);
        handle_buffer_len(handle: usize => handle, buffer: *mut c_void => buffer, len: usize => size);
        handle_node_buffer_len(
            handle: usize => handle,
            node: u8 => node,
            buffer: *mut c_void => buffer,
            len: usize => size
        );
        handle_node_buffer_window(
            handle: usize => handle,
            node: u8 => node,
            buffer: *mut c_void => buffer,
            offset: usize => size,
            len: usize => size
        );
        handle_node_window_buffer(
            handle: usize => handle,
            node: u8 => node,
            offset: usize => size,
            len: usize => size,
            buffer: *mut c_void => buffer
        );
        handle_group_node_window_buffer(
            handle: usize => handle,
            group: u8 => node,
            node: u8 => node,
            offset: usize => size,
            len: usize => size,
            buffer: *mut c_void => buffer
        );
        handle_group_assignment(
            handle: usize => handle,
            node: u8 => node,
            group: u8 => node,
            input_offset: usize => size,
            input_len: usize => size,
            output_offset: usize => size,
            output_len: usize => size
        );
    }
}

/// Standard binding of an operation
fn standard_entry(operation: Operation) -> OperationEntry {
    use ArgKind::*;
    use Operation as Op;

    let (signature, marshal): (&'static [ArgKind], MarshalFn) = match operation {
        Op::GetVersion => (&[OutInt, OutInt], shapes::out_int_pair),
        Op::Initialize | Op::DeInitialize => (&[], shapes::no_args),
        Op::Open => (&[Size, OutSize], shapes::size_out_size),
        Op::Close | Op::DeleteAllGroups | Op::BuildGroups => (&[Handle], shapes::handle_only),
        Op::Rescan | Op::GetNodesCount => (&[Handle, OutSize], shapes::handle_out_size),
        Op::Reset
        | Op::SendSync
        | Op::DeleteGroup
        | Op::ReadConfig
        | Op::WriteConfig
        | Op::SaveConfig
        | Op::ProcessGroup
        | Op::ModuleEnterCalibrationMode
        | Op::ModuleLeaveCalibrationMode => (&[Handle, Node], shapes::handle_node),
        Op::ModuleSaveCalibrationData | Op::ModuleLoadCalibrationData => {
            (&[Handle, Node, Word], shapes::handle_node_word)
        },
        Op::GetNodeDescription | Op::GetNodeCommonParameters => {
            (&[Handle, Node, OutBuffer, Length], shapes::handle_node_buffer_len)
        },
        Op::SetNodeCommonParameters => {
            (&[Handle, Node, InBuffer, Length], shapes::handle_node_buffer_len)
        },
        Op::GetNodeSpecificParameters | Op::ReadInputs => (
            &[Handle, Node, OutBuffer, Size, Length],
            shapes::handle_node_buffer_window,
        ),
        Op::SetNodeSpecificParameters | Op::WriteOutputs => (
            &[Handle, Node, InBuffer, Size, Length],
            shapes::handle_node_buffer_window,
        ),
        Op::AssignNodeToGroup => (
            &[Handle, Node, Node, Size, Size, Size, Size],
            shapes::handle_group_assignment,
        ),
        Op::GroupSetNodeOutputs => (
            &[Handle, Node, Node, Size, Length, InBuffer],
            shapes::handle_group_node_window_buffer,
        ),
        Op::GroupGetNodeInputs => (
            &[Handle, Node, Node, Size, Length, OutBuffer],
            shapes::handle_group_node_window_buffer,
        ),
        Op::ModuleGetCalibrationData => (
            &[Handle, Node, Size, Length, OutBuffer],
            shapes::handle_node_window_buffer,
        ),
        Op::ModuleSetCalibrationData => (
            &[Handle, Node, Size, Length, InBuffer],
            shapes::handle_node_window_buffer,
        ),
        Op::GetAdapterInfo => (&[Handle, OutBuffer, Length], shapes::handle_buffer_len),
    };

    OperationEntry::bind(operation, signature, marshal)
}

/// Operation table
#[derive(Debug, Clone)]
pub struct Registry {
    entries: HashMap<Operation, OperationEntry>,
}

impl Registry {
    /// Table with every operation bound to its standard symbol
    pub fn standard() -> Self {
        let entries = Operation::ALL
            .iter()
            .map(|&op| (op, standard_entry(op)))
            .collect();
        Self { entries }
    }

    /// Empty table, for services that expose only part of the API
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace the binding of an operation
    pub fn register(&mut self, entry: OperationEntry) {
        self.entries.insert(entry.operation, entry);
    }

    /// Resolve an operation under a different exported symbol
    ///
    /// # Safety
    ///
    /// `symbol` must export the same C signature as the operation's
    /// standard entry point.
    pub unsafe fn alias(&mut self, operation: Operation, symbol: impl Into<String>) {
        let entry = self
            .entries
            .entry(operation)
            .or_insert_with(|| standard_entry(operation));
        entry.symbol = Cow::Owned(symbol.into());
    }

    pub fn entry(&self, operation: Operation) -> Option<&OperationEntry> {
        self.entries.get(&operation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

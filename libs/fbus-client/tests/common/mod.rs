//! Common test utilities and helpers
//!
//! `ScriptedService` stands in for the native library: it records every
//! call, answers with canned out-parameters and returns scripted outcome
//! codes.

#![allow(dead_code)]
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fbus_client::{
    AdapterKind, Arg, FbusClient, FbusError, NativeService, Operation, OperationEntry, Result,
};
use parking_lot::Mutex;

pub const TEST_HANDLE: usize = 0x1234;

/// One recorded native call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: Operation,
    pub symbol: String,
    /// `Size`/`Length` arguments in call order
    pub sizes: Vec<usize>,
    /// Node, group and sync ids in call order
    pub nodes: Vec<u8>,
    pub words: Vec<u32>,
    /// Bytes passed in an input buffer
    pub written: Option<Vec<u8>>,
}

#[derive(Debug)]
struct Script {
    handle: usize,
    nodes: usize,
    version: (i32, i32),
    codes: HashMap<Operation, u32>,
    missing: HashSet<Operation>,
    responses: HashMap<Operation, Vec<u8>>,
    calls: Vec<Call>,
}

/// Scripted stand-in for the native FBUS service
#[derive(Debug, Clone)]
pub struct ScriptedService {
    script: Arc<Mutex<Script>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                handle: TEST_HANDLE,
                nodes: 2,
                version: (2, 4),
                codes: HashMap::new(),
                missing: HashSet::new(),
                responses: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Handle written by the open call
    pub fn set_handle(&self, handle: usize) {
        self.script.lock().handle = handle;
    }

    /// Count written by rescan and get-nodes-count
    pub fn set_nodes(&self, nodes: usize) {
        self.script.lock().nodes = nodes;
    }

    /// Make `operation` return `code`
    pub fn fail(&self, operation: Operation, code: u32) {
        self.script.lock().codes.insert(operation, code);
    }

    /// Make `operation` unresolvable
    pub fn remove(&self, operation: Operation) {
        self.script.lock().missing.insert(operation);
    }

    /// Bytes copied into the output buffer of `operation`
    pub fn respond(&self, operation: Operation, bytes: impl Into<Vec<u8>>) {
        self.script.lock().responses.insert(operation, bytes.into());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().calls.clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.script
            .lock()
            .calls
            .iter()
            .map(|call| call.operation)
            .collect()
    }

    /// Most recent call of `operation`
    pub fn last_call(&self, operation: Operation) -> Option<Call> {
        self.script
            .lock()
            .calls
            .iter()
            .rev()
            .find(|call| call.operation == operation)
            .cloned()
    }

    pub fn clear_calls(&self) {
        self.script.lock().calls.clear();
    }
}

impl NativeService for ScriptedService {
    fn invoke(&self, entry: &OperationEntry, args: &mut [Arg<'_>]) -> Result<u32> {
        let mut script = self.script.lock();
        let operation = entry.operation();

        if script.missing.contains(&operation) {
            return Err(FbusError::OperationNotAvailable {
                operation,
                reason: format!("symbol {} not found", entry.symbol()),
            });
        }

        let mut call = Call {
            operation,
            symbol: entry.symbol().to_string(),
            sizes: Vec::new(),
            nodes: Vec::new(),
            words: Vec::new(),
            written: None,
        };

        let code = script.codes.get(&operation).copied().unwrap_or(0);
        let response = script.responses.get(&operation).cloned();
        let mut ints = [script.version.0, script.version.1].into_iter();

        for arg in args.iter_mut() {
            match arg {
                Arg::Size(value) | Arg::Length(value) => call.sizes.push(*value),
                Arg::Node(id) => call.nodes.push(*id),
                Arg::Word(value) => call.words.push(*value),
                Arg::InBuffer(data) => call.written = Some(data.to_vec()),
                // Out-parameters are only written on success
                Arg::OutSize(value) if code == 0 => {
                    **value = if operation == Operation::Open {
                        script.handle
                    } else {
                        script.nodes
                    };
                },
                Arg::OutInt(value) if code == 0 => {
                    **value = ints.next().unwrap_or(0);
                },
                Arg::OutBuffer(buf) if code == 0 => {
                    if let Some(bytes) = &response {
                        let n = buf.len().min(bytes.len());
                        buf[..n].copy_from_slice(&bytes[..n]);
                    }
                },
                _ => {},
            }
        }

        script.calls.push(call);
        Ok(code)
    }
}

/// Client over `service` with the network open on local port 1
pub fn open_client(service: &ScriptedService) -> FbusClient {
    let mut client = FbusClient::with_service(service.clone());
    client.initialize().unwrap();
    client.open(AdapterKind::Local, 1).unwrap();
    client
}

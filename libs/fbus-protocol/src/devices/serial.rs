//! NIM841 serial tunnel regions
//!
//! Serial data crosses the bus in fixed 32-byte windows; the length byte
//! says how much of the window is payload.

use crate::error::{RecordError, Result};
use crate::record::packed_record;

/// Payload window of one exchange
pub const SERIAL_WINDOW: usize = 32;

packed_record! {
    pub struct Nim841Configuration {
        /// See [`super::settings::UartMode`]
        pub mode: u8,
        pub baudrate: u8,
        pub databits: u8,
        pub stopbits: u8,
        pub parity: u8,
    }
}

packed_record! {
    pub struct Nim841Inputs {
        pub diagnostics: u8,
        pub status: u16,
        pub fifo_length: u16,
        pub rx_control: u8,
        pub rx_length: u8,
        pub rx_data: [u8; 32],
    }
}

packed_record! {
    pub struct Nim841Outputs {
        pub control: u16,
        pub tx_control: u8,
        pub tx_length: u8,
        pub tx_data: [u8; 32],
    }
}

impl Nim841Inputs {
    /// Received payload, clamped to the window
    pub fn received(&self) -> &[u8] {
        let len = usize::from(self.rx_length).min(SERIAL_WINDOW);
        &self.rx_data[..len]
    }
}

impl Nim841Outputs {
    /// Outputs carrying `payload` in the transmit window
    pub fn with_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() > SERIAL_WINDOW {
            return Err(RecordError::PayloadTooLong {
                capacity: SERIAL_WINDOW,
                length: payload.len(),
            });
        }

        let mut outputs = Self {
            tx_length: payload.len() as u8,
            ..Self::default()
        };
        outputs.tx_data[..payload.len()].copy_from_slice(payload);
        Ok(outputs)
    }

    pub fn payload(&self) -> &[u8] {
        let len = usize::from(self.tx_length).min(SERIAL_WINDOW);
        &self.tx_data[..len]
    }
}

use crate::pdu::{
    ADR_MODBUS40, ADR_RMU40, ADR_SMS40, OFFSET_ADDRESS, OFFSET_COMMAND, OFFSET_DATA, OFFSET_LEN,
};
use std::fmt;

/// A complete frame received from the device, with verified checksum and
/// doubled start bytes already removed.
///
/// Guaranteed to hold the full header, `declared_len()` data bytes and the
/// trailing checksum byte as it was received.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame(Vec<u8>);

impl Frame {
    /// Wraps the de-stuffed bytes. Only the decoder constructs frames, after
    /// it checked the header and length.
    pub(crate) fn new(destuffed: Vec<u8>) -> Frame {
        debug_assert!(
            destuffed.len() > OFFSET_DATA
                && destuffed.len() == OFFSET_DATA + destuffed[OFFSET_LEN] as usize + 1,
            "frame length must agree with its declared length"
        );
        Frame(destuffed)
    }

    pub fn address(&self) -> u8 {
        self.0[OFFSET_ADDRESS]
    }

    pub fn command(&self) -> u8 {
        self.0[OFFSET_COMMAND]
    }

    #[cfg(test)]
    pub fn declared_len(&self) -> u8 {
        self.0[OFFSET_LEN]
    }

    /// The data bytes between header and checksum.
    pub fn payload(&self) -> &[u8] {
        &self.0[OFFSET_DATA..self.0.len() - 1]
    }

    pub fn checksum(&self) -> u8 {
        self.0[self.0.len() - 1]
    }

    /// The whole frame, including header and checksum.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    #[cfg(test)]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Human readable name of a bus address, for diagnostic output.
pub fn address_name(address: u8) -> &'static str {
    match address {
        ADR_SMS40 => "SMS40",
        ADR_RMU40 => "RMU40",
        ADR_MODBUS40 => "MODBUS40",
        _ => "unknown",
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "<{address}:{command:02X}> {payload:02X?} <CS:{checksum:02X}>",
            address = address_name(self.address()),
            command = self.command(),
            payload = self.payload(),
            checksum = self.checksum()
        )
    }
}

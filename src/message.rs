//! Typed versions of the frames exchanged with the MODBUS40 address.
//!
//! Requests are built here and sent to the device when it hands out a token.
//! Frames received from the device are turned into a [Message].
//!
//! Register values are left raw, scaling and naming them depends on the
//! heat pump model.

use crate::{
    checksum::{checksum, Mismatch},
    frame::{address_name, Frame},
    pdu::{
        classify, is_read_request_pdu, is_write_request_pdu, Kind, CMD_MODBUS_READ_REQ,
        CMD_MODBUS_WRITE_REQ, CMD_RMU_DATA_MSG, OUTBOUND_OFFSET_DATA, OUTBOUND_OFFSET_LEN,
    },
};
use builder::Builder;
use std::{
    convert::TryFrom,
    fmt::{self, Display, Formatter},
};

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

mod builder;
mod error;

/// Coil number marking an unused slot in a data read-out.
const UNUSED_COIL: u16 = 0xFFFF;
const REGISTER_ENTRY_LEN: usize = 4;
const READ_REQUEST_LEN: usize = 2;
const WRITE_REQUEST_LEN: usize = 6;
const READ_RESPONSE_LEN: usize = 6;
const WRITE_RESPONSE_ACCEPTED: u8 = 0x01;

/// Asks the device for the value of a single register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadRequest {
    coil: u16,
}

impl ReadRequest {
    pub fn new(coil: u16) -> Self {
        ReadRequest { coil }
    }

    pub fn coil(&self) -> u16 {
        self.coil
    }

    /// The frame as sent over the wire, including checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        Builder::new(CMD_MODBUS_READ_REQ).u16(self.coil).build()
    }
}

impl<'a> TryFrom<&'a [u8]> for ReadRequest {
    type Error = Error;

    fn try_from(buf: &'a [u8]) -> Result<Self> {
        if !is_read_request_pdu(buf) {
            return Err(Error::UnexpectedKind {
                expected: Kind::ReadRequest,
            });
        }
        let data = outbound_data(buf, Kind::ReadRequest, READ_REQUEST_LEN)?;
        Ok(ReadRequest {
            coil: u16::from_le_bytes([data[0], data[1]]),
        })
    }
}

/// Sets a single register on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteRequest {
    coil: u16,
    value: i32,
}

impl WriteRequest {
    pub fn new(coil: u16, value: i32) -> Self {
        WriteRequest { coil, value }
    }

    pub fn coil(&self) -> u16 {
        self.coil
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// The frame as sent over the wire, including checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        Builder::new(CMD_MODBUS_WRITE_REQ)
            .u16(self.coil)
            .i32(self.value)
            .build()
    }
}

impl<'a> TryFrom<&'a [u8]> for WriteRequest {
    type Error = Error;

    fn try_from(buf: &'a [u8]) -> Result<Self> {
        if !is_write_request_pdu(buf) {
            return Err(Error::UnexpectedKind {
                expected: Kind::WriteRequest,
            });
        }
        let data = outbound_data(buf, Kind::WriteRequest, WRITE_REQUEST_LEN)?;
        Ok(WriteRequest {
            coil: u16::from_le_bytes([data[0], data[1]]),
            value: i32::from_le_bytes([data[2], data[3], data[4], data[5]]),
        })
    }
}

/// Checks length and checksum of a frame meant for the device and returns
/// its data bytes.
fn outbound_data(buf: &[u8], kind: Kind, expected_len: usize) -> Result<&[u8]> {
    let declared = match buf.get(OUTBOUND_OFFSET_LEN) {
        Some(declared) => *declared,
        None => {
            return Err(Error::LengthMismatch {
                declared: 0,
                received: buf.len(),
            })
        }
    };
    if buf.len() != OUTBOUND_OFFSET_DATA + declared as usize + 1 {
        return Err(Error::LengthMismatch {
            declared,
            received: buf.len(),
        });
    }
    if declared as usize != expected_len {
        return Err(Error::PayloadLength {
            kind,
            expected: expected_len,
            received: declared as usize,
        });
    }

    let checksum_idx = buf.len() - 1;
    let expected = checksum(&buf[..checksum_idx]);
    let received = buf[checksum_idx];
    if expected != received {
        return Err(Mismatch { expected, received }.into());
    }

    Ok(&buf[OUTBOUND_OFFSET_DATA..checksum_idx])
}

/// A frame received from the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    DataReadOut(DataReadOut),
    ReadResponse(ReadResponse),
    WriteResponse(WriteResponse),
    /// Valid frame of a kind that carries no typed content.
    Other(Frame),
}

impl TryFrom<Frame> for Message {
    type Error = Error;

    fn try_from(frame: Frame) -> Result<Self> {
        let message = match classify(frame.as_bytes()) {
            Some(Kind::DataReadout) => Message::DataReadOut(DataReadOut::try_from(&frame)?),
            Some(Kind::ReadResponse) => Message::ReadResponse(ReadResponse::try_from(&frame)?),
            Some(Kind::WriteResponse) => Message::WriteResponse(WriteResponse::from(&frame)),
            _ => Message::Other(frame),
        };
        Ok(message)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Message::DataReadOut(readout) => {
                write!(f, "data read-out:")?;
                for register in readout.registers() {
                    write!(f, " {}={}", register.coil, register.raw)?;
                }
                Ok(())
            }
            Message::ReadResponse(response) => write!(
                f,
                "read response: {coil}={value}",
                coil = response.coil,
                value = response.value
            ),
            Message::WriteResponse(WriteResponse { accepted: true }) => {
                write!(f, "write response: accepted")
            }
            Message::WriteResponse(WriteResponse { accepted: false }) => {
                write!(f, "write response: rejected")
            }
            Message::Other(frame) if frame.command() == CMD_RMU_DATA_MSG => write!(
                f,
                "room unit data from {address}: {payload:02X?}",
                address = address_name(frame.address()),
                payload = frame.payload()
            ),
            Message::Other(frame) => write!(f, "other: {:?}", frame),
        }
    }
}

/// One register value from a data read-out, as sent by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register {
    pub coil: u16,
    pub raw: u16,
}

/// Register values the device sends periodically without being asked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataReadOut {
    registers: Vec<Register>,
}

impl DataReadOut {
    /// The used register slots, in the order they were sent.
    pub fn registers(&self) -> &[Register] {
        &self.registers[..]
    }
}

impl<'a> TryFrom<&'a Frame> for DataReadOut {
    type Error = Error;

    fn try_from(frame: &'a Frame) -> Result<Self> {
        let payload = frame.payload();
        if payload.len() % REGISTER_ENTRY_LEN != 0 {
            return Err(Error::Misaligned { len: payload.len() });
        }

        let registers = payload
            .chunks_exact(REGISTER_ENTRY_LEN)
            .map(|entry| Register {
                coil: u16::from_le_bytes([entry[0], entry[1]]),
                raw: u16::from_le_bytes([entry[2], entry[3]]),
            })
            .filter(|register| register.coil != UNUSED_COIL)
            .collect();
        Ok(DataReadOut { registers })
    }
}

/// The answer to a [ReadRequest].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadResponse {
    pub coil: u16,
    pub value: i32,
}

impl<'a> TryFrom<&'a Frame> for ReadResponse {
    type Error = Error;

    fn try_from(frame: &'a Frame) -> Result<Self> {
        let payload = frame.payload();
        if payload.len() != READ_RESPONSE_LEN {
            return Err(Error::PayloadLength {
                kind: Kind::ReadResponse,
                expected: READ_RESPONSE_LEN,
                received: payload.len(),
            });
        }
        Ok(ReadResponse {
            coil: u16::from_le_bytes([payload[0], payload[1]]),
            value: i32::from_le_bytes([payload[2], payload[3], payload[4], payload[5]]),
        })
    }
}

/// The answer to a [WriteRequest].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteResponse {
    pub accepted: bool,
}

impl<'a> From<&'a Frame> for WriteResponse {
    /// Write responses are only classified as such if they carry at least
    /// one data byte.
    fn from(frame: &'a Frame) -> Self {
        WriteResponse {
            accepted: frame.payload().first() == Some(&WRITE_RESPONSE_ACCEPTED),
        }
    }
}

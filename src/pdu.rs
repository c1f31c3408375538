//! Wire constants and header predicates for the frames exchanged with the
//! heat pump.
//!
//! Frames sent by the device look like this:
//!
//! ```text
//! +------+------+---------+---------+-----+-----------------+----------+
//! | 0x5C | 0x00 | address | command | len | data[0..len]    | checksum |
//! +------+------+---------+---------+-----+-----------------+----------+
//! ```
//!
//! Frames sent to the device are shorter and start with `0xC0`:
//!
//! ```text
//! +------+---------+-----+-----------------+----------+
//! | 0xC0 | command | len | data[0..len]    | checksum |
//! +------+---------+-----+-----------------+----------+
//! ```
//!
//! None of the predicates panic on short input, they just return `false`.

pub const START_FROM_DEVICE: u8 = 0x5C;
pub const START_TO_DEVICE: u8 = 0xC0;

pub const OFFSET_START: usize = 0;
pub const OFFSET_RESERVED: usize = 1;
pub const OFFSET_ADDRESS: usize = 2;
pub const OFFSET_COMMAND: usize = 3;
pub const OFFSET_LEN: usize = 4;
pub const OFFSET_DATA: usize = 5;

/// Header offsets of frames sent to the device.
pub const OUTBOUND_OFFSET_LEN: usize = 2;
pub const OUTBOUND_OFFSET_DATA: usize = 3;

/// Room unit data, not addressed to MODBUS40.
pub const CMD_RMU_DATA_MSG: u8 = 0x62;
pub const CMD_MODBUS_DATA_MSG: u8 = 0x68;
pub const CMD_MODBUS_READ_REQ: u8 = 0x69;
pub const CMD_MODBUS_READ_RESP: u8 = 0x6A;
pub const CMD_MODBUS_WRITE_REQ: u8 = 0x6B;
pub const CMD_MODBUS_WRITE_RESP: u8 = 0x6C;

pub const ADR_SMS40: u8 = 0x16;
pub const ADR_RMU40: u8 = 0x19;
pub const ADR_MODBUS40: u8 = 0x20;

pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;

const MIN_DATA_READOUT_LEN: u8 = 0x50;
const MIN_READ_RESPONSE_LEN: u8 = 0x06;
const MIN_WRITE_RESPONSE_LEN: u8 = 0x01;

/// The kinds of frames the classifiers recognize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    DataReadout,
    ReadResponse,
    WriteResponse,
    ReadToken,
    WriteToken,
    ReadRequest,
    WriteRequest,
}

/// Finds the kind of the given frame, if any classifier recognizes it.
pub fn classify(data: &[u8]) -> Option<Kind> {
    if is_data_readout(data) {
        Some(Kind::DataReadout)
    } else if is_read_response(data) {
        Some(Kind::ReadResponse)
    } else if is_write_response(data) {
        Some(Kind::WriteResponse)
    } else if is_read_request_token(data) {
        Some(Kind::ReadToken)
    } else if is_write_request_token(data) {
        Some(Kind::WriteToken)
    } else if is_read_request_pdu(data) {
        Some(Kind::ReadRequest)
    } else if is_write_request_pdu(data) {
        Some(Kind::WriteRequest)
    } else {
        None
    }
}

/// Command and declared length of a frame from the MODBUS40 address, if
/// the header is well-formed.
fn modbus40_header(data: &[u8]) -> Option<(u8, u8)> {
    match data {
        [START_FROM_DEVICE, 0x00, ADR_MODBUS40, command, len, ..] => Some((*command, *len)),
        _ => None,
    }
}

/// Periodic data read-out with register values.
pub fn is_data_readout(data: &[u8]) -> bool {
    matches!(
        modbus40_header(data),
        Some((CMD_MODBUS_DATA_MSG, len)) if len >= MIN_DATA_READOUT_LEN
    )
}

pub fn is_read_response(data: &[u8]) -> bool {
    matches!(
        modbus40_header(data),
        Some((CMD_MODBUS_READ_RESP, len)) if len >= MIN_READ_RESPONSE_LEN
    )
}

pub fn is_write_response(data: &[u8]) -> bool {
    matches!(
        modbus40_header(data),
        Some((CMD_MODBUS_WRITE_RESP, len)) if len >= MIN_WRITE_RESPONSE_LEN
    )
}

/// Zero-length read request from the device, inviting us to send a
/// pending read request.
pub fn is_read_request_token(data: &[u8]) -> bool {
    modbus40_header(data) == Some((CMD_MODBUS_READ_REQ, 0))
}

/// Zero-length write request from the device, inviting us to send a
/// pending write request.
pub fn is_write_request_token(data: &[u8]) -> bool {
    modbus40_header(data) == Some((CMD_MODBUS_WRITE_REQ, 0))
}

pub fn is_write_request_pdu(data: &[u8]) -> bool {
    matches!(data, [START_TO_DEVICE, CMD_MODBUS_WRITE_REQ, ..])
}

pub fn is_read_request_pdu(data: &[u8]) -> bool {
    matches!(data, [START_TO_DEVICE, CMD_MODBUS_READ_REQ, ..])
}

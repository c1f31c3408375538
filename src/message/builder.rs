use crate::{
    checksum::checksum,
    pdu::{OUTBOUND_OFFSET_DATA, OUTBOUND_OFFSET_LEN, START_TO_DEVICE},
};
use std::mem::take;

/// Builds frames sent to the device: start byte, command, length, data and
/// checksum.
pub struct Builder {
    data: Vec<u8>,
}

impl Builder {
    pub fn new(command: u8) -> Self {
        Builder {
            data: vec![
                START_TO_DEVICE,
                command,
                0x00, // reserve this byte for the length, but set it to zero for now
            ],
        }
    }

    /// Appends a number in little-endian byte order to the frame.
    pub fn u16(&mut self, data: u16) -> &mut Self {
        self.buf(&data.to_le_bytes())
    }

    /// Appends a number in little-endian byte order to the frame.
    pub fn i32(&mut self, data: i32) -> &mut Self {
        self.buf(&data.to_le_bytes())
    }

    pub fn buf(&mut self, data: &[u8]) -> &mut Self {
        self.data.extend(data);
        self
    }

    /// Finishes the build, consuming the contents and leaving an empty builder in place.
    ///
    /// # Panics
    /// If more than 255 data bytes were appended.
    pub fn build(&mut self) -> Vec<u8> {
        let data_len = self.data.len() - OUTBOUND_OFFSET_DATA;
        assert!(
            data_len <= 0xFF,
            "data length of an outbound frame must fit into a single byte"
        );

        let mut data = take(&mut self.data);
        data[OUTBOUND_OFFSET_LEN] = data_len as u8;
        let checksum = checksum(&data);
        data.push(checksum);
        data
    }
}

//! Removal of the start bytes the device doubles when they occur inside a
//! frame.
//!
//! A `0x5C` anywhere after the start of a frame is sent twice so that it can
//! not be mistaken for the beginning of the next frame. The declared length
//! counts the doubled bytes, so it is decremented for every byte removed.
//!
//! The checksum is calculated over the bytes as sent, which is why this
//! only happens after the checksum has been verified.

use crate::pdu::{OFFSET_DATA, OFFSET_LEN, START_FROM_DEVICE};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Returns a copy of the given complete frame, including start byte and
/// checksum, with every doubled start byte collapsed into a single one.
///
/// Frames without doubled start bytes are returned as they are.
pub fn destuff(frame: &[u8]) -> Result<Vec<u8>> {
    let declared_len = declared_len(frame)?;
    let stuffed_len = OFFSET_DATA + declared_len as usize + 1;
    if frame.len() != stuffed_len {
        return Err(Error::LengthMismatch {
            declared: declared_len,
            received: frame.len(),
        });
    }

    // the checksum is never the second byte of a pair
    let checksum_idx = frame.len() - 1;
    let mut destuffed = Vec::with_capacity(frame.len());
    destuffed.push(frame[0]);
    let mut removed = 0_u8;
    let mut idx = 1;
    while idx < checksum_idx {
        let byte = frame[idx];
        destuffed.push(byte);
        let doubled = byte == START_FROM_DEVICE
            && idx + 1 < checksum_idx
            && frame[idx + 1] == START_FROM_DEVICE;
        if doubled {
            if idx < OFFSET_DATA {
                return Err(Error::StuffedHeader { offset: idx });
            }
            removed += 1;
            idx += 2;
        } else {
            idx += 1;
        }
    }
    destuffed.push(frame[checksum_idx]);

    let destuffed_declared_len = declared_len - removed;
    destuffed[OFFSET_LEN] = destuffed_declared_len;
    if destuffed.len() != OFFSET_DATA + destuffed_declared_len as usize + 1 {
        return Err(Error::LengthMismatch {
            declared: destuffed_declared_len,
            received: destuffed.len(),
        });
    }

    Ok(destuffed)
}

fn declared_len(frame: &[u8]) -> Result<u8> {
    frame
        .get(OFFSET_LEN)
        .copied()
        .ok_or(Error::Truncated { len: frame.len() })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Frame of {len} bytes is too short to hold a length field")]
    Truncated { len: usize },
    #[error("Frame declares {declared} data bytes but has a total size of {received} bytes")]
    LengthMismatch { declared: u8, received: usize },
    #[error("Doubled start byte in frame header at offset {offset}")]
    StuffedHeader { offset: usize },
}

use crate::pdu::START_FROM_DEVICE;
use thiserror::Error;

/// Checksum the device sends in place of a computed checksum that would
/// equal the frame start byte.
pub const SUBSTITUTE: u8 = 0xC5;

/// Calculates the XOR checksum of the given bytes. Callers select the range
/// by slicing, e.g. `checksum(&frame[2..5 + len])` for inbound frames.
///
/// The empty slice is a valid argument and yields 0.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, next| acc ^ next)
}

/// Checks a received checksum against the one computed over the received
/// bytes.
///
/// A computed checksum of `0x5C` would look like a frame start on the wire,
/// so the device transmits `0xC5` instead. That exact substitution is
/// accepted, nothing else.
pub fn verify(expected: u8, received: u8) -> Result<(), Mismatch> {
    if expected == received || (expected == START_FROM_DEVICE && received == SUBSTITUTE) {
        Ok(())
    } else {
        Err(Mismatch { expected, received })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Checksum mismatch, expected: {expected:02X?}, got: {received:02X?}")]
pub struct Mismatch {
    pub expected: u8,
    pub received: u8,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_checksum() {
        assert_eq!(checksum(&[]), 0, "XOR over nothing should be zero");
    }

    #[test]
    fn empty_range_of_frame() {
        let frame = [0x5C, 0x00, 0x20, 0x68];
        assert_eq!(checksum(&frame[2..2]), 0);
    }

    #[test]
    fn xor_fold() {
        let data = [0x20, 0x68, 0x02, 0xAA, 0xBB];
        assert_eq!(checksum(&data), 0x20 ^ 0x68 ^ 0x02 ^ 0xAA ^ 0xBB);
        assert_eq!(checksum(&data), 0x5B);
    }

    #[test]
    fn subrange_matches_manual_fold() {
        let data = [0x5C, 0x00, 0x20, 0x69, 0x00, 0x49];
        for start in 0..data.len() {
            for end in start..=data.len() {
                let manual = data[start..end].iter().fold(0_u8, |a, b| a ^ b);
                assert_eq!(checksum(&data[start..end]), manual);
            }
        }
    }

    #[test]
    fn verify_equal() {
        assert_eq!(verify(0x5B, 0x5B), Ok(()));
    }

    #[test]
    fn verify_start_byte_substitution() {
        assert_eq!(verify(0x5C, 0xC5), Ok(()));
    }

    #[test]
    fn substitution_is_not_symmetric() {
        assert_eq!(
            verify(0xC5, 0x5C),
            Err(Mismatch {
                expected: 0xC5,
                received: 0x5C
            })
        );
    }

    #[test]
    fn verify_mismatch() {
        let err = verify(0x5B, 0x00).unwrap_err();
        assert_eq!(
            err,
            Mismatch {
                expected: 0x5B,
                received: 0x00
            }
        );
        assert_eq!(
            format!("{}", err),
            "Checksum mismatch, expected: 5B, got: 00"
        );
    }
}

use crate::{checksum::Mismatch, pdu::Kind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Frame is not a {expected:?} message")]
    UnexpectedKind { expected: Kind },
    #[error("Frame declares {declared} data bytes but has a total size of {received} bytes")]
    LengthMismatch { declared: u8, received: usize },
    #[error("{kind:?} message should carry {expected} data bytes, got: {received}")]
    PayloadLength {
        kind: Kind,
        expected: usize,
        received: usize,
    },
    #[error("Data read-out of {len} bytes is not made up of 4-byte register entries")]
    Misaligned { len: usize },
    #[error("{0}")]
    Checksum(#[from] Mismatch),
}

//! The receiving side of the serial protocol.
//!
//! The [Decoder] finds frames in the stream of bytes received from the
//! device, verifies them, and tells its [Context] what to send back. It does
//! no I/O of its own, the driver feeds it bytes and calls [Decoder::step]
//! until it reports that it needs more input:
//!
//! ```text
//! decoder.feed(&received);
//! while decoder.step(&mut context)? {}
//! ```
//!
//! Corrupt or oversized frames never end the loop, the decoder drops them
//! and looks for the next start byte.

use crate::{
    checksum::{checksum, verify, Mismatch},
    destuff::destuff,
    frame::Frame,
    pdu::{
        is_read_request_token, is_write_request_token, OFFSET_DATA, OFFSET_LEN, OFFSET_RESERVED,
        OFFSET_START, START_FROM_DEVICE,
    },
};
use std::collections::VecDeque;
use tracing::{debug, error, warn};

pub use context::Context;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub mod context;
mod error;

/// Number of received bytes the decoder buffers before they are processed.
pub const INPUT_CAPACITY: usize = 1000;
/// Frames longer than this are dropped.
pub const MESSAGE_CAPACITY: usize = 100;

/// Where the decoder is in receiving a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Discarding bytes until a start byte arrives.
    WaitingForStart,
    /// Collecting the bytes of a frame.
    AccumulatingData,
    /// A complete frame with valid checksum is buffered.
    FrameReady,
    WriteTokenReceived,
    ReadTokenReceived,
    /// A complete frame was buffered, but the checksum did not match.
    ChecksumFailed(Mismatch),
}

/// Outcome of checking the bytes collected so far.
#[derive(Debug, PartialEq, Eq)]
enum Assessment {
    Incomplete,
    Invalid,
    Complete,
    Corrupt(Mismatch),
}

pub struct Decoder {
    input: VecDeque<u8>,
    message: Vec<u8>,
    state: State,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            input: VecDeque::with_capacity(INPUT_CAPACITY),
            message: Vec::with_capacity(MESSAGE_CAPACITY),
            state: State::WaitingForStart,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of received bytes not yet processed.
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.input.len()
    }

    /// Buffers as many of the given bytes as fit into the input buffer and
    /// returns how many were taken.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        let accepted = bytes.len().min(INPUT_CAPACITY - self.input.len());
        self.input.extend(&bytes[..accepted]);
        accepted
    }

    /// Feeds all of the given bytes, processing buffered input whenever the
    /// input buffer is full.
    ///
    /// Processing goes on after an error, so frames following an
    /// inconsistent one are still delivered. Only the first error is
    /// returned.
    pub fn push<C: Context>(&mut self, mut bytes: &[u8], context: &mut C) -> Result<()> {
        let mut first_error = None;
        loop {
            let accepted = self.feed(bytes);
            bytes = &bytes[accepted..];
            loop {
                match self.step(context) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                }
            }
            if bytes.is_empty() {
                return match first_error {
                    Some(err) => Err(err),
                    None => Ok(()),
                };
            }
        }
    }

    /// Performs at most one state transition.
    ///
    /// Returns `Ok(true)` if it should be called again right away and
    /// `Ok(false)` if all buffered input has been processed. After an error
    /// the decoder is waiting for the next frame and can be used further.
    pub fn step<C: Context>(&mut self, context: &mut C) -> Result<bool> {
        match self.state {
            State::WaitingForStart => {
                let byte = match self.input.pop_front() {
                    Some(byte) => byte,
                    None => return Ok(false),
                };
                if byte == START_FROM_DEVICE {
                    self.message.clear();
                    self.message.push(byte);
                    self.state = State::AccumulatingData;
                }
                Ok(true)
            }
            State::AccumulatingData => {
                if self.message.len() >= MESSAGE_CAPACITY && !self.input.is_empty() {
                    debug!(
                        "Dropping frame that exceeds {} bytes without completing",
                        MESSAGE_CAPACITY
                    );
                    self.state = State::WaitingForStart;
                    return Ok(true);
                }
                let byte = match self.input.pop_front() {
                    Some(byte) => byte,
                    None => return Ok(false),
                };
                self.message.push(byte);
                self.state = match assess(&self.message) {
                    Assessment::Incomplete => State::AccumulatingData,
                    Assessment::Invalid => {
                        debug!("Dropping malformed frame start {:02X?}", self.message);
                        State::WaitingForStart
                    }
                    Assessment::Complete => State::FrameReady,
                    Assessment::Corrupt(mismatch) => State::ChecksumFailed(mismatch),
                };
                Ok(true)
            }
            State::FrameReady => {
                self.state = State::WaitingForStart;
                let destuffed = destuff(&self.message).map_err(|e| {
                    error!("Discarding frame {:02X?}: {}", self.message, e);
                    e
                })?;
                if is_read_request_token(&destuffed) {
                    self.state = State::ReadTokenReceived;
                } else if is_write_request_token(&destuffed) {
                    self.state = State::WriteTokenReceived;
                } else {
                    context.send_ack()?;
                    context.frame_received(Frame::new(destuffed));
                }
                Ok(true)
            }
            State::WriteTokenReceived => {
                self.state = State::WaitingForStart;
                context.send_pending_write()?;
                Ok(true)
            }
            State::ReadTokenReceived => {
                self.state = State::WaitingForStart;
                context.send_pending_read()?;
                Ok(true)
            }
            State::ChecksumFailed(mismatch) => {
                warn!(
                    expected = mismatch.expected,
                    received = mismatch.received,
                    "Rejecting frame {:02X?}: {}",
                    self.message,
                    mismatch
                );
                self.state = State::WaitingForStart;
                context.send_nak()?;
                Ok(true)
            }
        }
    }
}

/// Checks the bytes of a frame received so far, in the order they arrive:
/// start byte, reserved byte, declared length, then the checksum once all
/// declared bytes are there.
fn assess(message: &[u8]) -> Assessment {
    if message.len() > OFFSET_START && message[OFFSET_START] != START_FROM_DEVICE {
        return Assessment::Invalid;
    }
    if message.len() > OFFSET_RESERVED && message[OFFSET_RESERVED] != 0x00 {
        return Assessment::Invalid;
    }
    if message.len() <= OFFSET_DATA {
        return Assessment::Incomplete;
    }

    let checksum_idx = OFFSET_DATA + message[OFFSET_LEN] as usize;
    if message.len() <= checksum_idx {
        return Assessment::Incomplete;
    }

    let expected = checksum(&message[2..checksum_idx]);
    match verify(expected, message[checksum_idx]) {
        Ok(()) => Assessment::Complete,
        Err(mismatch) => Assessment::Corrupt(mismatch),
    }
}

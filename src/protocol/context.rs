use crate::frame::Frame;
use std::io;

/// The side effects the [Decoder](super::Decoder) triggers while it
/// processes received bytes.
///
/// Implementations are called synchronously from the decoder and should
/// transmit or enqueue right away, the next byte is not processed before
/// the call returns.
pub trait Context {
    /// Acknowledge a received frame.
    fn send_ack(&mut self) -> io::Result<()>;

    /// Reject a frame that failed checksum verification.
    fn send_nak(&mut self) -> io::Result<()>;

    /// The device offered a write token, send the pending write request.
    fn send_pending_write(&mut self) -> io::Result<()>;

    /// The device offered a read token, send the pending read request.
    fn send_pending_read(&mut self) -> io::Result<()>;

    /// Called exactly once for each valid frame that is not a token.
    fn frame_received(&mut self, frame: Frame);
}

#[cfg(test)]
pub mod fake {
    use super::*;

    /// Everything a [Recorder] has been asked to do, in order.
    #[derive(Debug, PartialEq, Eq)]
    pub enum Event {
        Ack,
        Nak,
        PendingWrite,
        PendingRead,
        Frame(Vec<u8>),
    }

    /// A context that remembers every call instead of transmitting.
    #[derive(Default)]
    pub struct Recorder {
        pub events: Vec<Event>,
        frames: Vec<Frame>,
    }

    impl Recorder {
        pub fn frames(&self) -> &[Frame] {
            &self.frames[..]
        }

        pub fn count(&self, event: &Event) -> usize {
            self.events.iter().filter(|e| *e == event).count()
        }
    }

    impl Context for Recorder {
        fn send_ack(&mut self) -> io::Result<()> {
            self.events.push(Event::Ack);
            Ok(())
        }

        fn send_nak(&mut self) -> io::Result<()> {
            self.events.push(Event::Nak);
            Ok(())
        }

        fn send_pending_write(&mut self) -> io::Result<()> {
            self.events.push(Event::PendingWrite);
            Ok(())
        }

        fn send_pending_read(&mut self) -> io::Result<()> {
            self.events.push(Event::PendingRead);
            Ok(())
        }

        fn frame_received(&mut self, frame: Frame) {
            self.events.push(Event::Frame(frame.as_bytes().to_vec()));
            self.frames.push(frame);
        }
    }
}

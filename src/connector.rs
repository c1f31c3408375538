//! Drives the [Decoder] with bytes read from a serial port and answers the
//! device on the same port.

use crate::{
    frame::Frame,
    message::{self, Message, ReadRequest, WriteRequest},
    pdu::{ACK, NAK},
    protocol::{Context, Decoder, Result, INPUT_CAPACITY},
};
use std::{
    collections::VecDeque,
    convert::TryFrom,
    io::{self, Read, Write},
};
use tracing::{debug, error, warn};

/// Answers the device on the port it was read from and collects received
/// frames until the [Connector] picks them up.
pub struct SerialContext<P> {
    port: P,
    pending_reads: VecDeque<ReadRequest>,
    pending_writes: VecDeque<WriteRequest>,
    received: VecDeque<Frame>,
}

impl<P: Write> SerialContext<P> {
    fn new(port: P) -> Self {
        SerialContext {
            port,
            pending_reads: VecDeque::new(),
            pending_writes: VecDeque::new(),
            received: VecDeque::new(),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    /// Sends a request that passed validation, or answers the token with a
    /// plain ACK if it did not.
    fn send_request(&mut self, bytes: &[u8], validation: message::Result<()>) -> io::Result<()> {
        match validation {
            Ok(()) => self.send(bytes),
            Err(err) => {
                error!("Dropping malformed request {:02X?}: {}", bytes, err);
                self.send_ack()
            }
        }
    }
}

impl<P: Write> Context for SerialContext<P> {
    fn send_ack(&mut self) -> io::Result<()> {
        self.send(&[ACK])
    }

    fn send_nak(&mut self) -> io::Result<()> {
        self.send(&[NAK])
    }

    /// Sends the oldest queued write request, or just acknowledges the
    /// token if nothing is queued.
    fn send_pending_write(&mut self) -> io::Result<()> {
        match self.pending_writes.pop_front() {
            Some(request) => {
                debug!(
                    "Sending write request for coil {coil}: {value}",
                    coil = request.coil(),
                    value = request.value()
                );
                let bytes = request.to_bytes();
                let validation = WriteRequest::try_from(&bytes[..]).map(drop);
                self.send_request(&bytes, validation)
            }
            None => self.send_ack(),
        }
    }

    /// Sends the oldest queued read request, or just acknowledges the
    /// token if nothing is queued.
    fn send_pending_read(&mut self) -> io::Result<()> {
        match self.pending_reads.pop_front() {
            Some(request) => {
                debug!("Sending read request for coil {}", request.coil());
                let bytes = request.to_bytes();
                let validation = ReadRequest::try_from(&bytes[..]).map(drop);
                self.send_request(&bytes, validation)
            }
            None => self.send_ack(),
        }
    }

    fn frame_received(&mut self, frame: Frame) {
        self.received.push_back(frame);
    }
}

pub struct Connector<P> {
    decoder: Decoder,
    context: SerialContext<P>,
}

impl<P: Read + Write> Connector<P> {
    pub fn new(port: P) -> Self {
        Connector {
            decoder: Decoder::new(),
            context: SerialContext::new(port),
        }
    }

    /// Sends the request the next time the device offers a read token.
    pub fn queue_read(&mut self, request: ReadRequest) {
        self.context.pending_reads.push_back(request);
    }

    /// Sends the request the next time the device offers a write token.
    pub fn queue_write(&mut self, request: WriteRequest) {
        self.context.pending_writes.push_back(request);
    }

    /// Number of queued requests the device has not asked for yet.
    pub fn pending_requests(&self) -> usize {
        self.context.pending_reads.len() + self.context.pending_writes.len()
    }

    #[cfg(test)]
    pub fn port(&self) -> &P {
        &self.context.port
    }

    /// Reads whatever the port has available, answers the device and returns
    /// the messages received.
    ///
    /// A read timeout counts as nothing received. If a received frame turns
    /// out to be inconsistent, the error is returned and the messages received
    /// in the same read are returned by the next call.
    pub fn poll(&mut self) -> Result<Vec<Message>> {
        let mut buf = [0_u8; INPUT_CAPACITY];
        let len = match self.context.port.read(&mut buf) {
            Ok(len) => len,
            Err(err) if err.kind() == io::ErrorKind::TimedOut => 0,
            Err(err) => return Err(err.into()),
        };

        self.decoder.push(&buf[..len], &mut self.context)?;

        let messages = self
            .context
            .received
            .drain(..)
            .map(|frame| match Message::try_from(frame.clone()) {
                Ok(message) => message,
                Err(err) => {
                    warn!("Could not interpret received frame {:?}: {}", frame, err);
                    Message::Other(frame)
                }
            })
            .collect();
        Ok(messages)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        message::{ReadResponse, WriteResponse},
        protocol::Error,
        serial::mock::MockSerial,
    };

    const DATA: &[u8] = &[0x5C, 0x00, 0x20, 0x68, 0x02, 0xAA, 0xBB, 0x5B];
    const READ_TOKEN: &[u8] = &[0x5C, 0x00, 0x20, 0x69, 0x00, 0x49];
    const WRITE_TOKEN: &[u8] = &[0x5C, 0x00, 0x20, 0x6B, 0x00, 0x4B];
    const READ_RESPONSE: &[u8] = &[
        0x5C, 0x00, 0x20, 0x6A, 0x06, 0x39, 0xB0, 0xF0, 0x00, 0x00, 0x00, 0x35,
    ];
    const WRITE_RESPONSE: &[u8] = &[0x5C, 0x00, 0x20, 0x6C, 0x01, 0x01, 0x4C];

    #[test]
    fn acknowledges_data() {
        let serial = MockSerial::builder().receive(DATA).build();
        let mut connector = Connector::new(serial);

        let messages = connector.poll().unwrap();

        assert_eq!(messages.len(), 1);
        match &messages[0] {
            Message::Other(frame) => assert_eq!(frame.payload(), &[0xAA, 0xBB]),
            other => panic!("Unexpected message: {:?}", other),
        }
        assert_eq!(connector.port().written(), &[ACK]);
    }

    #[test]
    fn rejects_corrupt_frame() {
        let mut corrupt = DATA.to_vec();
        corrupt[7] ^= 0xFF;
        let serial = MockSerial::builder().receive(&corrupt).build();
        let mut connector = Connector::new(serial);

        let messages = connector.poll().unwrap();

        assert!(messages.is_empty());
        assert_eq!(connector.port().written(), &[NAK]);
    }

    #[test]
    fn read_token_sends_pending_read() {
        let serial = MockSerial::builder()
            .receive(READ_TOKEN)
            .receive(READ_RESPONSE)
            .build();
        let mut connector = Connector::new(serial);
        connector.queue_read(ReadRequest::new(45113));

        assert!(connector.poll().unwrap().is_empty());
        assert_eq!(connector.pending_requests(), 0);
        assert_eq!(
            connector.port().written(),
            &ReadRequest::new(45113).to_bytes()[..]
        );

        let messages = connector.poll().unwrap();
        assert_eq!(
            messages,
            vec![Message::ReadResponse(ReadResponse {
                coil: 45113,
                value: 240
            })]
        );
        assert_eq!(connector.port().written().last(), Some(&ACK));
    }

    #[test]
    fn write_token_sends_pending_write() {
        let serial = MockSerial::builder()
            .receive(WRITE_TOKEN)
            .receive(WRITE_RESPONSE)
            .build();
        let mut connector = Connector::new(serial);
        let request = WriteRequest::new(45113, 1);
        connector.queue_write(request);

        connector.poll().unwrap();
        let messages = connector.poll().unwrap();

        let mut expected_written = request.to_bytes();
        expected_written.push(ACK);
        assert_eq!(connector.port().written(), &expected_written[..]);
        assert_eq!(
            messages,
            vec![Message::WriteResponse(WriteResponse { accepted: true })]
        );
    }

    #[test]
    fn tokens_without_pending_requests_are_acknowledged() {
        let mut tokens = READ_TOKEN.to_vec();
        tokens.extend_from_slice(WRITE_TOKEN);
        let serial = MockSerial::builder().receive(&tokens).build();
        let mut connector = Connector::new(serial);

        assert!(connector.poll().unwrap().is_empty());
        assert_eq!(connector.port().written(), &[ACK, ACK]);
    }

    #[test]
    fn requests_are_sent_in_order() {
        let mut tokens = READ_TOKEN.to_vec();
        tokens.extend_from_slice(READ_TOKEN);
        let serial = MockSerial::builder().receive(&tokens).build();
        let mut connector = Connector::new(serial);
        connector.queue_read(ReadRequest::new(1));
        connector.queue_read(ReadRequest::new(2));

        connector.poll().unwrap();

        let mut expected_written = ReadRequest::new(1).to_bytes();
        expected_written.extend(ReadRequest::new(2).to_bytes());
        assert_eq!(connector.port().written(), &expected_written[..]);
    }

    #[test]
    fn malformed_request_is_not_sent() {
        let mut context = SerialContext::new(MockSerial::builder().build());
        let truncated = [0xC0, 0x69, 0x02, 0x39];
        let validation = ReadRequest::try_from(&truncated[..]).map(drop);
        assert!(validation.is_err());

        context.send_request(&truncated, validation).unwrap();

        assert_eq!(context.port.written(), &[ACK]);
    }

    #[test]
    fn frame_split_across_reads() {
        let serial = MockSerial::builder()
            .receive(&DATA[..3])
            .time_out()
            .receive(&DATA[3..])
            .build();
        let mut connector = Connector::new(serial);

        assert!(connector.poll().unwrap().is_empty());
        assert!(connector.poll().unwrap().is_empty());
        assert_eq!(connector.poll().unwrap().len(), 1);
        assert!(connector.port().is_exhausted());
    }

    #[test]
    fn timeout_is_not_an_error() {
        let serial = MockSerial::builder().time_out().build();
        let mut connector = Connector::new(serial);

        assert!(connector.poll().unwrap().is_empty());
        assert!(connector.port().written().is_empty());
    }

    #[test]
    fn disconnect_is_an_error() {
        let serial = MockSerial::builder().disconnect().build();
        let mut connector = Connector::new(serial);

        match connector.poll().unwrap_err() {
            Error::IO(err) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
            err => panic!("Unexpected error: {:?}", err),
        }
    }

    #[test]
    fn malformed_read_response_is_passed_on_raw() {
        // read response with seven instead of six data bytes
        const FRAME: &[u8] = &[
            0x5C, 0x00, 0x20, 0x6A, 0x07, 0x39, 0xB0, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x34,
        ];
        let serial = MockSerial::builder().receive(FRAME).build();
        let mut connector = Connector::new(serial);

        let messages = connector.poll().unwrap();

        match &messages[..] {
            [Message::Other(frame)] => assert_eq!(frame.as_bytes(), FRAME),
            other => panic!("Unexpected messages: {:?}", other),
        }
    }
}

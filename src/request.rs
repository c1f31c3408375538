use crate::{
    args::{ReadRegister, WriteRegister},
    connector::Connector,
    message::{Message, ReadRequest, WriteRequest},
    serial,
};
use std::{
    io::{Read, Write},
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::debug;

pub type Result<T> = std::result::Result<T, RequestError>;

#[tracing::instrument]
pub fn read(opts: &ReadRegister) -> Result<()> {
    let timeout = timeout(opts.timeout_secs)?;
    let mut connector = connect(&opts.serial, opts.baud_rate)?;
    let value = read_register(&mut connector, opts.coil, timeout)?;
    println!("{}", value);
    Ok(())
}

#[tracing::instrument]
pub fn write(opts: &WriteRegister) -> Result<()> {
    let timeout = timeout(opts.timeout_secs)?;
    let mut connector = connect(&opts.serial, opts.baud_rate)?;
    write_register(
        &mut connector,
        WriteRequest::new(opts.coil, opts.value),
        timeout,
    )
}

/// Converts a timeout given in seconds, rejecting negative and non-finite
/// values.
fn timeout(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| RequestError::InvalidTimeout { secs })
}

fn connect(port: &str, baud_rate: u32) -> Result<Connector<serial::Serial>> {
    let serial = serial::open(port, baud_rate).map_err(|e| RequestError::Serial {
        source: e,
        port: port.into(),
    })?;
    Ok(Connector::new(serial))
}

/// Queues a read request and waits until the device answered it.
///
/// Polls at least once, even with a zero timeout.
pub fn read_register<P: Read + Write>(
    connector: &mut Connector<P>,
    coil: u16,
    timeout: Duration,
) -> Result<i32> {
    connector.queue_read(ReadRequest::new(coil));
    let deadline = Instant::now() + timeout;
    loop {
        for message in connector.poll()? {
            match message {
                Message::ReadResponse(response) if response.coil == coil => {
                    return Ok(response.value)
                }
                other => debug!("Waiting for read response, ignoring: {}", other),
            }
        }
        if Instant::now() >= deadline {
            debug!("Giving up with {} requests still queued", connector.pending_requests());
            return Err(RequestError::Timeout { coil, timeout });
        }
    }
}

/// Queues a write request and waits until the device confirmed it.
///
/// Polls at least once, even with a zero timeout.
pub fn write_register<P: Read + Write>(
    connector: &mut Connector<P>,
    request: WriteRequest,
    timeout: Duration,
) -> Result<()> {
    connector.queue_write(request);
    let deadline = Instant::now() + timeout;
    loop {
        for message in connector.poll()? {
            match message {
                Message::WriteResponse(response) if response.accepted => return Ok(()),
                Message::WriteResponse(_) => {
                    return Err(RequestError::Rejected {
                        coil: request.coil(),
                        value: request.value(),
                    })
                }
                other => debug!("Waiting for write response, ignoring: {}", other),
            }
        }
        if Instant::now() >= deadline {
            debug!("Giving up with {} requests still queued", connector.pending_requests());
            return Err(RequestError::Timeout {
                coil: request.coil(),
                timeout,
            });
        }
    }
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Could not open serial port connection to: {port}, due to error: {source}")]
    Serial {
        source: serialport::Error,
        port: String,
    },
    #[error("{0}")]
    Protocol(#[from] crate::protocol::Error),
    #[error("Heat pump did not answer request for coil {coil} within {timeout:?}")]
    Timeout { coil: u16, timeout: Duration },
    #[error("Heat pump rejected writing {value} to coil {coil}")]
    Rejected { coil: u16, value: i32 },
    #[error("Timeout must be a non-negative number of seconds, got: {secs}")]
    InvalidTimeout { secs: f64 },
}

use crate::{
    args::Listen,
    connector::Connector,
    protocol::{self, Error as ProtocolError},
    serial::open,
};
use chrono::Local;
use std::io::{self, stdout, Read, Write};
use thiserror::Error;
use tracing::warn;

type Result<T> = std::result::Result<T, ListenError>;

#[tracing::instrument]
pub fn listen(opts: &Listen) -> Result<()> {
    let serial = open(&opts.serial, opts.baud_rate).map_err(|e| ListenError::Serial {
        source: e,
        port: opts.serial.clone(),
    })?;
    let mut connector = Connector::new(serial);
    print_messages(&mut connector, opts.count, &mut stdout().lock())
}

/// Prints received messages with the local time of arrival, until `count`
/// messages have been printed or forever if no count is given.
///
/// Inconsistent frames are logged and skipped, I/O errors end listening.
fn print_messages<P: Read + Write>(
    connector: &mut Connector<P>,
    count: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let mut printed = 0;
    loop {
        if count.map_or(false, |count| printed >= count) {
            return Ok(());
        }

        let messages = match connector.poll() {
            Ok(messages) => messages,
            Err(ProtocolError::Destuff(err)) => {
                warn!("Skipping inconsistent frame: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        for message in messages.iter().take(remaining(count, printed)) {
            writeln!(
                out,
                "{time} {message}",
                time = Local::now().format("%H:%M:%S%.3f"),
                message = message
            )
            .map_err(ListenError::Output)?;
            printed += 1;
        }
    }
}

fn remaining(count: Option<usize>, printed: usize) -> usize {
    count.map_or(usize::MAX, |count| count - printed)
}

#[derive(Error, Debug)]
pub enum ListenError {
    #[error("Could not open serial port connection to: {port}, due to error: {source}")]
    Serial {
        source: serialport::Error,
        port: String,
    },
    #[error("Lost connection to heat pump: {0}")]
    Protocol(#[from] protocol::Error),
    #[error("Could not print received message: {0}")]
    Output(io::Error),
}

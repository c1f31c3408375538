use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::time::Duration;

/// Shorter type alias for handles to serial ports.
///
/// Currently the same for all platforms but that might change in the future.
pub type Serial = Box<dyn SerialPort>;

pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// How long a read blocks before it gives up with a timeout error, which
/// the connector treats as "nothing received yet".
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Opens a serial port with the settings the heat pump uses, 8N1 without
/// flow control.
pub fn open(port: &str, baud_rate: u32) -> serialport::Result<Serial> {
    serialport::new(port, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(READ_TIMEOUT)
        .open()
}

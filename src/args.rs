use crate::serial::DEFAULT_BAUD_RATE;
use argh::FromArgs;
use serde::Deserialize;
use std::path::PathBuf;

/// Talk to a heat pump over its MODBUS40 serial link or list available serial ports.
#[derive(FromArgs)]
pub struct TopLevel {
    /// log protocol details, including every frame that is dropped.
    #[argh(switch, short = 'v')]
    pub verbose: bool,
    #[argh(subcommand)]
    pub invocation: Invocation,
}

/// Inner top-level command.
#[derive(FromArgs, Deserialize)]
#[argh(subcommand)]
#[serde(rename_all = "snake_case")]
pub enum Invocation {
    #[serde(skip)]
    Run(Run),
    List(List),
    Listen(Listen),
    Read(ReadRegister),
    Write(WriteRegister),
}

/// Take run parameters from a specified YAML configuration file.
#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
pub struct Run {
    #[argh(positional)]
    pub config: PathBuf,
}

/// List available serial ports.
#[derive(FromArgs, Deserialize)]
#[argh(subcommand, name = "list")]
pub struct List {}

/// Print every message received from the heat pump.
#[derive(FromArgs, Deserialize, Debug)]
#[argh(subcommand, name = "listen")]
pub struct Listen {
    /// serial port to use, e.g. /dev/ttyUSB0 on Linux, or COM5 on Windows.
    #[argh(option, short = 's')]
    pub serial: String,
    /// baud rate of the serial port, 9600 if not specified.
    #[argh(option, short = 'b', default = "DEFAULT_BAUD_RATE")]
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// stop after this many messages, listen forever if not specified.
    #[argh(option, short = 'c')]
    #[serde(default)]
    pub count: Option<usize>,
}

/// Read the value of a single register.
#[derive(FromArgs, Deserialize, Debug)]
#[argh(subcommand, name = "read")]
pub struct ReadRegister {
    /// register number (coil) to read, e.g. 40004.
    #[argh(positional)]
    pub coil: u16,
    /// serial port to use, e.g. /dev/ttyUSB0 on Linux, or COM5 on Windows.
    #[argh(option, short = 's')]
    pub serial: String,
    /// baud rate of the serial port, 9600 if not specified.
    #[argh(option, short = 'b', default = "DEFAULT_BAUD_RATE")]
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// seconds to wait for the heat pump to answer.
    #[argh(option, short = 't', default = "10.0")]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

/// Write the value of a single register.
#[derive(FromArgs, Deserialize, Debug)]
#[argh(subcommand, name = "write")]
pub struct WriteRegister {
    /// register number (coil) to write, e.g. 47004.
    #[argh(positional)]
    pub coil: u16,
    /// raw value to write, without scaling.
    #[argh(option)]
    pub value: i32,
    /// serial port to use, e.g. /dev/ttyUSB0 on Linux, or COM5 on Windows.
    #[argh(option, short = 's')]
    pub serial: String,
    /// baud rate of the serial port, 9600 if not specified.
    #[argh(option, short = 'b', default = "DEFAULT_BAUD_RATE")]
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// seconds to wait for the heat pump to answer.
    #[argh(option, short = 't', default = "10.0")]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_timeout_secs() -> f64 {
    10.0
}

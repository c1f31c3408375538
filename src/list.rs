use crate::args::List;
use serialport::{SerialPortInfo, SerialPortType};
use thiserror::Error;

pub fn list(_list: List) -> Result<(), ListError> {
    let ports = serialport::available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
    }
    for port in ports {
        println!("{}", describe(&port));
    }
    Ok(())
}

/// Port name, followed by USB IDs and product for USB adapters, which is
/// what most RS-485 converters for the heat pump are.
fn describe(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => format!(
            "{name} (USB {vid:04x}:{pid:04x}{product})",
            name = port.port_name,
            vid = usb.vid,
            pid = usb.pid,
            product = usb
                .product
                .as_ref()
                .map(|product| format!(" {}", product))
                .unwrap_or_default()
        ),
        _ => port.port_name.clone(),
    }
}

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Could not list serial ports: {0}")]
    Serial(#[from] serialport::Error),
}

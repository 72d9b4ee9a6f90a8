//! Serial port transport
//!
//! Opens the device at 115200 8N1 with a short read timeout so the reader
//! thread never blocks indefinitely, and resolves a port from a partial
//! name the way operators usually type it (`usbserial`, `COM3`, `ttyUSB`).

use std::io::{ErrorKind, Read, Write};

use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};

use super::source::{ByteSource, ReadStatus};
use crate::config::SerialConfig;
use crate::error::{HsError, Result};

/// A serial port opened for the device protocol
pub struct SerialSource {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialSource {
    /// Open a port by exact path
    pub fn open(path: &str, config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout())
            .open()
            .map_err(|e| HsError::Transport(format!("Could not open port '{}': {}", path, e)))?;

        tracing::info!(
            "Opened {} at {} baud (timeout {:?})",
            path,
            config.baud_rate,
            config.read_timeout()
        );

        Ok(Self {
            port,
            name: path.to_string(),
        })
    }

    /// Resolve `config.port` as a substring and open the match
    pub fn open_configured(config: &SerialConfig) -> Result<Self> {
        let query = config
            .port
            .as_deref()
            .ok_or_else(|| HsError::Config("No serial port configured".to_string()))?;
        let path = resolve_port(query)?;
        Self::open(&path, config)
    }
}

impl ByteSource for SerialSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        match self.port.read(buf) {
            Ok(0) => Ok(ReadStatus::Idle),
            Ok(n) => Ok(ReadStatus::Data(n)),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                Ok(ReadStatus::Idle)
            }
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(ReadStatus::Closed),
            Err(e) => Err(HsError::Transport(format!(
                "Read from '{}' failed: {}",
                self.name, e
            ))),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.port
            .write_all(data)
            .and_then(|_| self.port.flush())
            .map_err(|e| HsError::Transport(format!("Write to '{}' failed: {}", self.name, e)))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A serial port visible on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortListing {
    pub name: String,
    /// Bus type plus USB product details when known
    pub kind: String,
}

/// Enumerate serial ports
pub fn list_ports() -> Result<Vec<PortListing>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| PortListing {
            kind: describe_port_type(&port.port_type),
            name: port.port_name,
        })
        .collect())
}

fn describe_port_type(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let product = usb.product.as_deref().unwrap_or("unknown product");
            format!("USB {:04X}:{:04X} {}", usb.vid, usb.pid, product)
        }
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "Unknown".to_string(),
    }
}

/// Find the port whose name matches `query` exactly or contains it
pub fn resolve_port(query: &str) -> Result<String> {
    let names: Vec<String> = list_ports()?.into_iter().map(|p| p.name).collect();
    match_port(query, &names)
}

fn match_port(query: &str, names: &[String]) -> Result<String> {
    names
        .iter()
        .find(|name| name.as_str() == query)
        .or_else(|| names.iter().find(|name| name.contains(query)))
        .cloned()
        .ok_or_else(|| HsError::PortNotFound {
            query: query.to_string(),
            available: names.to_vec(),
        })
}

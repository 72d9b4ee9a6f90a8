//! Outbound device commands
//!
//! The device accepts a couple of fixed, parameterless command frames.
//! They use the same `\r` terminator as inbound records.

use std::fmt;

/// Command frames the host can send to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Reboot the device
    Reboot,
    /// Ask the device to report its version (answered with `~HSVI`)
    GetVersion,
}

impl DeviceCommand {
    /// Exact bytes written to the transport, terminator included
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            DeviceCommand::Reboot => b"~SHRB,REBOOT\r",
            DeviceCommand::GetVersion => b"~SHGV\r",
        }
    }

    /// Command text without the terminator, as echoed into the raw log
    pub fn text(self) -> &'static str {
        match self {
            DeviceCommand::Reboot => "~SHRB,REBOOT",
            DeviceCommand::GetVersion => "~SHGV",
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::Reboot => write!(f, "reboot"),
            DeviceCommand::GetVersion => write!(f, "get version"),
        }
    }
}

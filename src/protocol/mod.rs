//! Wire protocol for the `~HS` sensor stream
//!
//! Records are comma-separated ASCII terminated by a single `\r`:
//!
//! ```text
//! ~HSAC,<x>,<y>,<z>\r                      accelerometer
//! ~HSRD,<value>\r                          potentiometer
//! ~HSVI,<major>,<minor>,<patch>,<build>\r  version report
//! ```
//!
//! All fields are unprefixed hex. The host can send `~SHRB,REBOOT\r` and
//! `~SHGV\r` back to the device.
//!
//! # Components
//!
//! - [`ByteFramer`] / [`split_frames`] - bytes to [`RawFrame`]s
//! - [`decode_frame`] - [`RawFrame`] to [`Decoded`]
//! - [`DeviceCommand`] - outbound command frames

pub mod command;
pub mod decoder;
pub mod framer;

pub use command::DeviceCommand;
pub use decoder::{decode_bytes, decode_frame, decode_str, Decoded, Record, Rejection, Tag};
pub use framer::{split_frames, ByteFramer, Frames, RawFrame, FRAME_DELIMITER};

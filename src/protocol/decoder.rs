//! Record decoding
//!
//! Turns one [`RawFrame`] into a typed [`Record`], or reports why it could
//! not. The frame is split on `,`; the first token selects the [`Tag`] and
//! the rest are unsigned hex fields without a `0x` prefix:
//!
//! | Tag     | Fields                            | Record              |
//! |---------|-----------------------------------|---------------------|
//! | `~HSAC` | `x, y, z`                         | [`Record::Accel`]   |
//! | `~HSRD` | `value`                           | [`Record::Pot`]     |
//! | `~HSVI` | `major, minor, patch, build`      | [`Record::Version`] |
//!
//! Decoding never fails hard. Unknown tags, wrong field counts and bad hex
//! all come back as [`Decoded::Unrecognized`] with a [`Rejection`] saying
//! which, so the caller can drop the frame and move on.

use super::framer::RawFrame;
use crate::types::VersionInfo;
use std::fmt;

/// Closed set of record tags the device emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `~HSAC` accelerometer sample
    Accel,
    /// `~HSRD` potentiometer sample
    Pot,
    /// `~HSVI` version report
    Version,
}

impl Tag {
    pub const ALL: [Tag; 3] = [Tag::Accel, Tag::Pot, Tag::Version];

    /// Wire token for this tag
    pub fn token(self) -> &'static str {
        match self {
            Tag::Accel => "~HSAC",
            Tag::Pot => "~HSRD",
            Tag::Version => "~HSVI",
        }
    }

    /// Number of hex fields following the tag
    pub fn field_count(self) -> usize {
        match self {
            Tag::Accel => 3,
            Tag::Pot => 1,
            Tag::Version => 4,
        }
    }

    /// Exact match against the wire token
    pub fn from_token(token: &str) -> Option<Tag> {
        Tag::ALL.into_iter().find(|tag| tag.token() == token)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A successfully decoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Accel { x: u32, y: u32, z: u32 },
    Pot { value: u32 },
    Version(VersionInfo),
}

impl Record {
    pub fn tag(&self) -> Tag {
        match self {
            Record::Accel { .. } => Tag::Accel,
            Record::Pot { .. } => Tag::Pot,
            Record::Version(_) => Tag::Version,
        }
    }
}

/// Why a frame was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing but line-ending bytes between delimiters
    Empty,
    /// Leading token is not one of the known tags
    UnknownTag(String),
    /// Known tag with the wrong number of fields
    FieldCount {
        tag: Tag,
        expected: usize,
        found: usize,
    },
    /// Field is empty, not hex, or does not fit in 32 bits
    InvalidHex { tag: Tag, field: usize },
    /// Frame bytes are not valid UTF-8
    NotUtf8,
}

impl Rejection {
    /// A known tag whose body could not be decoded
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Rejection::FieldCount { .. } | Rejection::InvalidHex { .. } | Rejection::NotUtf8
        )
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => write!(f, "empty frame"),
            Rejection::UnknownTag(token) => write!(f, "unknown tag '{}'", token),
            Rejection::FieldCount {
                tag,
                expected,
                found,
            } => write!(f, "{} expects {} fields, got {}", tag, expected, found),
            Rejection::InvalidHex { tag, field } => {
                write!(f, "{} field {} is not a 32-bit hex value", tag, field)
            }
            Rejection::NotUtf8 => write!(f, "frame is not valid UTF-8"),
        }
    }
}

/// Outcome of decoding one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Record(Record),
    Unrecognized(Rejection),
}

impl Decoded {
    pub fn record(&self) -> Option<&Record> {
        match self {
            Decoded::Record(record) => Some(record),
            Decoded::Unrecognized(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Decoded::Record(_))
    }
}

/// Decode one frame
pub fn decode_frame(frame: &RawFrame) -> Decoded {
    decode_bytes(frame.as_bytes())
}

/// Decode one frame's bytes
pub fn decode_bytes(bytes: &[u8]) -> Decoded {
    match std::str::from_utf8(bytes) {
        Ok(text) => decode_str(text),
        Err(_) => Decoded::Unrecognized(Rejection::NotUtf8),
    }
}

/// Decode one frame's text
///
/// Leading `\n` and trailing `\r`/`\n` bytes are ignored, so frames from
/// captures stored with `\r\n` line endings decode the same as raw device
/// output. Any other whitespace is part of the frame and makes it
/// unrecognized.
pub fn decode_str(text: &str) -> Decoded {
    match parse_record(strip_line_ending(text)) {
        Ok(record) => Decoded::Record(record),
        Err(rejection) => Decoded::Unrecognized(rejection),
    }
}

fn strip_line_ending(text: &str) -> &str {
    text.trim_start_matches('\n')
        .trim_end_matches(|c| c == '\r' || c == '\n')
}

fn parse_record(text: &str) -> Result<Record, Rejection> {
    if text.is_empty() {
        return Err(Rejection::Empty);
    }

    let mut tokens = text.split(',');
    let head = tokens.next().unwrap_or_default();
    let tag = Tag::from_token(head).ok_or_else(|| Rejection::UnknownTag(head.to_string()))?;

    let fields: Vec<&str> = tokens.collect();
    if fields.len() != tag.field_count() {
        return Err(Rejection::FieldCount {
            tag,
            expected: tag.field_count(),
            found: fields.len(),
        });
    }

    let mut values = [0u32; 4];
    for (field, token) in fields.iter().enumerate() {
        values[field] = parse_hex(token).ok_or(Rejection::InvalidHex { tag, field })?;
    }

    Ok(match tag {
        Tag::Accel => Record::Accel {
            x: values[0],
            y: values[1],
            z: values[2],
        },
        Tag::Pot => Record::Pot { value: values[0] },
        Tag::Version => Record::Version(VersionInfo::new(
            values[0], values[1], values[2], values[3],
        )),
    })
}

/// Parse an unprefixed hex field
///
/// Stricter than `from_str_radix`, which would accept a leading `+`.
fn parse_hex(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(token, 16).ok()
}

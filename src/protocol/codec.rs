//! Binary header codec
//!
//! Field-by-field encoding of the 24-byte frame headers and the per-operation
//! extras blocks. Nothing here relies on host memory layout.
//!
//! ## Byte Order
//! Every multi-byte field is big-endian (network order).
//!
//! ## Header Layout
//! ```text
//! Byte/     0       |       1       |       2       |       3       |
//!   +---------------+---------------+---------------+---------------+
//!  0| Magic         | Opcode        | Key length                    |
//!   +---------------+---------------+---------------+---------------+
//!  4| Extras length | Data type     | Routing group / Status        |
//!   +---------------+---------------+---------------+---------------+
//!  8| Total body length                                             |
//!   +---------------+---------------+---------------+---------------+
//! 12| Opaque                                                        |
//!   +---------------+---------------+---------------+---------------+
//! 16| CAS                                                           |
//!   |                                                               |
//!   +---------------+---------------+---------------+---------------+
//! ```
//!
//! Total body length = extras length + key length + value length. The sum
//! is computed in 64 bits and rejected if it does not fit 32 bits.

use crate::error::{Result, WireError};
use super::Opcode;

/// Header size for both directions
pub const HEADER_SIZE: usize = 24;

/// Magic byte for request frames
pub const REQUEST_MAGIC: u8 = 0x80;

/// Magic byte for response frames
pub const RESPONSE_MAGIC: u8 = 0x81;

/// Largest extras block (arithmetic)
pub const MAX_EXTRAS_SIZE: usize = ArithExtras::SIZE;

/// Widest key the 16-bit key length field can describe
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

// =============================================================================
// Body Length
// =============================================================================

/// Validate field widths and compute the 32-bit total body length
pub fn body_length(key_len: usize, extras_len: usize, value_len: usize) -> Result<u32> {
    if key_len > MAX_KEY_LEN {
        return Err(WireError::too_large("key length", key_len as u64, MAX_KEY_LEN as u64));
    }
    if extras_len > u8::MAX as usize {
        return Err(WireError::too_large(
            "extras length",
            extras_len as u64,
            u64::from(u8::MAX),
        ));
    }

    let total = (key_len as u64 + extras_len as u64).saturating_add(value_len as u64);
    u32::try_from(total)
        .map_err(|_| WireError::too_large("total body length", total, u64::from(u32::MAX)))
}

// =============================================================================
// Response Status
// =============================================================================

/// Binary response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ResponseStatus {
    NoError = 0x0000,
    KeyNotFound = 0x0001,
    KeyExists = 0x0002,
    ValueTooLarge = 0x0003,
    InvalidArguments = 0x0004,
    ItemNotStored = 0x0005,
    NonNumericValue = 0x0006,
    WrongVbucket = 0x0007,
    AuthError = 0x0008,
    AuthContinue = 0x0009,
    AuthRequired = 0x0020,
    UnknownCommand = 0x0081,
    OutOfMemory = 0x0082,
    NotSupported = 0x0083,
    InternalError = 0x0084,
    Busy = 0x0085,
    TempFailure = 0x0086,
}

impl ResponseStatus {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0000 => Some(ResponseStatus::NoError),
            0x0001 => Some(ResponseStatus::KeyNotFound),
            0x0002 => Some(ResponseStatus::KeyExists),
            0x0003 => Some(ResponseStatus::ValueTooLarge),
            0x0004 => Some(ResponseStatus::InvalidArguments),
            0x0005 => Some(ResponseStatus::ItemNotStored),
            0x0006 => Some(ResponseStatus::NonNumericValue),
            0x0007 => Some(ResponseStatus::WrongVbucket),
            0x0008 => Some(ResponseStatus::AuthError),
            0x0009 => Some(ResponseStatus::AuthContinue),
            0x0020 => Some(ResponseStatus::AuthRequired),
            0x0081 => Some(ResponseStatus::UnknownCommand),
            0x0082 => Some(ResponseStatus::OutOfMemory),
            0x0083 => Some(ResponseStatus::NotSupported),
            0x0084 => Some(ResponseStatus::InternalError),
            0x0085 => Some(ResponseStatus::Busy),
            0x0086 => Some(ResponseStatus::TempFailure),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ResponseStatus::NoError => "No error",
            ResponseStatus::KeyNotFound => "Key not found",
            ResponseStatus::KeyExists => "Key exists",
            ResponseStatus::ValueTooLarge => "Value too large",
            ResponseStatus::InvalidArguments => "Invalid arguments",
            ResponseStatus::ItemNotStored => "Item not stored",
            ResponseStatus::NonNumericValue => "Incr/decr on a non-numeric value",
            ResponseStatus::WrongVbucket => "The vbucket belongs to another server",
            ResponseStatus::AuthError => "Authentication error",
            ResponseStatus::AuthContinue => "Authentication continue",
            ResponseStatus::AuthRequired => "Authentication required",
            ResponseStatus::UnknownCommand => "Unknown command",
            ResponseStatus::OutOfMemory => "Out of memory",
            ResponseStatus::NotSupported => "Not supported",
            ResponseStatus::InternalError => "Internal error",
            ResponseStatus::Busy => "Busy",
            ResponseStatus::TempFailure => "Temporary failure",
        }
    }
}

// =============================================================================
// Headers
// =============================================================================

/// Request frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub opcode: Opcode,
    pub key_len: u16,
    pub extras_len: u8,
    /// Reserved, always 0 on encode
    pub data_type: u8,
    /// Routing group (vbucket) id, always 0 on encode
    pub vbucket_id: u16,
    pub total_body_len: u32,
    /// Always 0 on encode
    pub opaque: u32,
    pub cas: u64,
}

impl RequestHeader {
    /// Build a header for a body made of extras, key and value
    pub fn for_body(
        opcode: Opcode,
        extras_len: usize,
        key_len: usize,
        value_len: usize,
    ) -> Result<Self> {
        let total_body_len = body_length(key_len, extras_len, value_len)?;
        Ok(Self {
            opcode,
            // Both narrowed after body_length validated them.
            key_len: key_len as u16,
            extras_len: extras_len as u8,
            data_type: 0,
            vbucket_id: 0,
            total_body_len,
            opaque: 0,
            cas: 0,
        })
    }

    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }

    /// Encode into a fixed 24-byte array
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        encode_raw(
            REQUEST_MAGIC,
            self.opcode,
            self.key_len,
            self.extras_len,
            self.data_type,
            self.vbucket_id,
            self.total_body_len,
            self.opaque,
            self.cas,
        )
    }

    /// Decode from the first 24 bytes of a frame
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw = RawHeader::parse(bytes, REQUEST_MAGIC)?;
        Ok(Self {
            opcode: raw.opcode,
            key_len: raw.key_len,
            extras_len: raw.extras_len,
            data_type: raw.data_type,
            vbucket_id: raw.word,
            total_body_len: raw.total_body_len,
            opaque: raw.opaque,
            cas: raw.cas,
        })
    }

    /// Length of the value part of the body
    pub fn value_len(&self) -> usize {
        (self.total_body_len as usize)
            .saturating_sub(self.extras_len as usize + self.key_len as usize)
    }
}

/// Response frame header, with a status in place of the routing group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub opcode: Opcode,
    pub key_len: u16,
    pub extras_len: u8,
    pub data_type: u8,
    /// Raw status; see [`ResponseStatus::from_u16`]
    pub status: u16,
    pub total_body_len: u32,
    pub opaque: u32,
    pub cas: u64,
}

impl ResponseHeader {
    pub fn for_body(
        opcode: Opcode,
        status: ResponseStatus,
        extras_len: usize,
        key_len: usize,
        value_len: usize,
    ) -> Result<Self> {
        let total_body_len = body_length(key_len, extras_len, value_len)?;
        Ok(Self {
            opcode,
            key_len: key_len as u16,
            extras_len: extras_len as u8,
            data_type: 0,
            status: status as u16,
            total_body_len,
            opaque: 0,
            cas: 0,
        })
    }

    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        encode_raw(
            RESPONSE_MAGIC,
            self.opcode,
            self.key_len,
            self.extras_len,
            self.data_type,
            self.status,
            self.total_body_len,
            self.opaque,
            self.cas,
        )
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw = RawHeader::parse(bytes, RESPONSE_MAGIC)?;
        Ok(Self {
            opcode: raw.opcode,
            key_len: raw.key_len,
            extras_len: raw.extras_len,
            data_type: raw.data_type,
            status: raw.word,
            total_body_len: raw.total_body_len,
            opaque: raw.opaque,
            cas: raw.cas,
        })
    }

    /// Decoded status, `None` for codes outside the known set
    pub fn status(&self) -> Option<ResponseStatus> {
        ResponseStatus::from_u16(self.status)
    }

    pub fn value_len(&self) -> usize {
        (self.total_body_len as usize)
            .saturating_sub(self.extras_len as usize + self.key_len as usize)
    }
}

#[allow(clippy::too_many_arguments)]
fn encode_raw(
    magic: u8,
    opcode: Opcode,
    key_len: u16,
    extras_len: u8,
    data_type: u8,
    word: u16,
    total_body_len: u32,
    opaque: u32,
    cas: u64,
) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];
    buf[0] = magic;
    buf[1] = opcode as u8;
    buf[2..4].copy_from_slice(&key_len.to_be_bytes());
    buf[4] = extras_len;
    buf[5] = data_type;
    buf[6..8].copy_from_slice(&word.to_be_bytes());
    buf[8..12].copy_from_slice(&total_body_len.to_be_bytes());
    buf[12..16].copy_from_slice(&opaque.to_be_bytes());
    buf[16..24].copy_from_slice(&cas.to_be_bytes());
    buf
}

/// Fields shared by both header kinds; `word` is vbucket id or status
struct RawHeader {
    opcode: Opcode,
    key_len: u16,
    extras_len: u8,
    data_type: u8,
    word: u16,
    total_body_len: u32,
    opaque: u32,
    cas: u64,
}

impl RawHeader {
    fn parse(bytes: &[u8], magic: u8) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(WireError::Protocol(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }
        if bytes[0] != magic {
            return Err(WireError::Protocol(format!(
                "Invalid magic byte: expected 0x{:02x}, got 0x{:02x}",
                magic, bytes[0]
            )));
        }
        let opcode = Opcode::from_u8(bytes[1]).ok_or_else(|| {
            WireError::Protocol(format!("Unknown opcode: 0x{:02x}", bytes[1]))
        })?;

        let header = Self {
            opcode,
            key_len: u16::from_be_bytes([bytes[2], bytes[3]]),
            extras_len: bytes[4],
            data_type: bytes[5],
            word: u16::from_be_bytes([bytes[6], bytes[7]]),
            total_body_len: u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            opaque: u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            cas: u64::from_be_bytes([
                bytes[16], bytes[17], bytes[18], bytes[19], bytes[20], bytes[21], bytes[22],
                bytes[23],
            ]),
        };

        let fixed = u32::from(header.key_len) + u32::from(header.extras_len);
        if header.total_body_len < fixed {
            return Err(WireError::Protocol(format!(
                "Total body length {} shorter than key + extras ({})",
                header.total_body_len, fixed
            )));
        }
        Ok(header)
    }
}

// =============================================================================
// Extras
// =============================================================================

/// A fixed-size extras block following the header
pub trait Extras: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Write exactly `SIZE` bytes into the start of `out`
    fn write(&self, out: &mut [u8]);

    /// Decode from the start of `bytes`
    fn parse(bytes: &[u8]) -> Result<Self>;
}

fn check_extras_len(name: &str, bytes: &[u8], size: usize) -> Result<()> {
    if bytes.len() < size {
        return Err(WireError::Protocol(format!(
            "{} extras: expected {} bytes, got {}",
            name,
            size,
            bytes.len()
        )));
    }
    Ok(())
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Extras for set, add and replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetExtras {
    pub flags: u32,
    pub exptime: u32,
}

impl Extras for SetExtras {
    const SIZE: usize = 8;

    fn write(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.flags.to_be_bytes());
        out[4..8].copy_from_slice(&self.exptime.to_be_bytes());
    }

    fn parse(bytes: &[u8]) -> Result<Self> {
        check_extras_len("Set", bytes, Self::SIZE)?;
        Ok(Self {
            flags: read_u32(bytes, 0),
            exptime: read_u32(bytes, 4),
        })
    }
}

/// Extras for incr and decr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithExtras {
    pub delta: u32,
    pub initial_value: u32,
    pub exptime: u32,
}

impl Extras for ArithExtras {
    const SIZE: usize = 12;

    fn write(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.delta.to_be_bytes());
        out[4..8].copy_from_slice(&self.initial_value.to_be_bytes());
        out[8..12].copy_from_slice(&self.exptime.to_be_bytes());
    }

    fn parse(bytes: &[u8]) -> Result<Self> {
        check_extras_len("Arithmetic", bytes, Self::SIZE)?;
        Ok(Self {
            delta: read_u32(bytes, 0),
            initial_value: read_u32(bytes, 4),
            exptime: read_u32(bytes, 8),
        })
    }
}

/// Extras for touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchExtras {
    pub exptime: u32,
}

impl Extras for TouchExtras {
    const SIZE: usize = 4;

    fn write(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.exptime.to_be_bytes());
    }

    fn parse(bytes: &[u8]) -> Result<Self> {
        check_extras_len("Touch", bytes, Self::SIZE)?;
        Ok(Self {
            exptime: read_u32(bytes, 0),
        })
    }
}

/// Extras for flush-all; `exptime` is the flush delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushExtras {
    pub exptime: u32,
}

impl Extras for FlushExtras {
    const SIZE: usize = 4;

    fn write(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.exptime.to_be_bytes());
    }

    fn parse(bytes: &[u8]) -> Result<Self> {
        check_extras_len("Flush", bytes, Self::SIZE)?;
        Ok(Self {
            exptime: read_u32(bytes, 0),
        })
    }
}

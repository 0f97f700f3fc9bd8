//! Binary request encoder
//!
//! Turns a decoded request into a binary protocol frame:
//!
//! ```text
//! [header (24)] [extras (0-12)] [key] [value]
//! ```
//!
//! Header and extras are written into the instance scratch region; key and
//! value are referenced in place. A fragmented value is coalesced into the
//! owned payload slot first.
//!
//! Operations without a binary opcode yield [`Prepared::NotApplicable`] so the
//! caller can fall back to another encoding.

use crate::config::Config;
use crate::error::{Result, WireError};
use crate::protocol::{
    ArithExtras, Extras, FlushExtras, McRequest, OpKind, Opcode, RequestHeader, SetExtras,
    TouchExtras, HEADER_SIZE, MAX_EXTRAS_SIZE,
};

use super::iovec::{IoVecs, IovAccumulator, Segment};

/// Descriptor capacity: header + extras + key + value, with headroom
pub const REQUEST_MAX_IOVS: usize = 8;

/// Scratch capacity: one header plus the largest extras block
pub const REQUEST_SCRATCH_SIZE: usize = HEADER_SIZE + MAX_EXTRAS_SIZE;

/// Outcome of preparing a request
#[derive(Debug)]
pub enum Prepared<'a> {
    /// The frame, ready to send
    Encoded(IoVecs<'a, REQUEST_MAX_IOVS>),

    /// This operation has no binary encoding
    NotApplicable,
}

impl<'a> Prepared<'a> {
    pub fn is_encoded(&self) -> bool {
        matches!(self, Prepared::Encoded(_))
    }

    pub fn into_iovecs(self) -> Option<IoVecs<'a, REQUEST_MAX_IOVS>> {
        match self {
            Prepared::Encoded(iovs) => Some(iovs),
            Prepared::NotApplicable => None,
        }
    }
}

/// Placeholder for frames without extras
struct NoExtras;

impl Extras for NoExtras {
    const SIZE: usize = 0;

    fn write(&self, _out: &mut [u8]) {}

    fn parse(_bytes: &[u8]) -> Result<Self> {
        Ok(NoExtras)
    }
}

/// Reusable binary request encoder
///
/// Construct once per connection and call [`prepare`](Self::prepare) per
/// request. The returned descriptors borrow the encoder and the request.
#[derive(Debug)]
pub struct BinaryRequestSerializer {
    acc: IovAccumulator<REQUEST_MAX_IOVS, REQUEST_SCRATCH_SIZE>,
    max_value_size: usize,
}

impl BinaryRequestSerializer {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            acc: IovAccumulator::new(),
            max_value_size: config.max_value_size,
        }
    }

    /// Drop all descriptors and release held buffers
    pub fn clear(&mut self) {
        self.acc.clear();
    }

    pub fn is_clear(&self) -> bool {
        self.acc.is_clear()
    }

    /// Total length of the last prepared frame, 0 after clear
    pub fn total_len(&self) -> usize {
        self.acc.total_len()
    }

    /// Encode `request`, replacing whatever was prepared before.
    ///
    /// On error nothing is left accumulated.
    pub fn prepare<'a>(&'a mut self, request: &'a McRequest) -> Result<Prepared<'a>> {
        self.acc.clear();

        match self.encode(request) {
            Ok(true) => {
                tracing::trace!(
                    op = request.op.name(),
                    iovs = self.acc.len(),
                    total_len = self.acc.total_len(),
                    "prepared binary request"
                );
                let value = request.value.as_contiguous().unwrap_or_default();
                Ok(Prepared::Encoded(self.acc.iovecs(&request.key, value)))
            }
            Ok(false) => {
                tracing::trace!(op = request.op.name(), "no binary encoding");
                Ok(Prepared::NotApplicable)
            }
            Err(e) => {
                self.acc.clear();
                Err(e)
            }
        }
    }

    /// Dispatch on the operation; `Ok(false)` means not applicable
    fn encode(&mut self, request: &McRequest) -> Result<bool> {
        match request.op {
            OpKind::Set => self.store(Opcode::Set, request, 0)?,
            OpKind::Add => self.store(Opcode::Add, request, 0)?,
            OpKind::Replace => self.store(Opcode::Replace, request, 0)?,
            OpKind::Cas => self.store(Opcode::Set, request, request.cas)?,
            OpKind::Append => self.frame(Opcode::Append, NoExtras, 0, request, true)?,
            OpKind::Prepend => self.frame(Opcode::Prepend, NoExtras, 0, request, true)?,
            OpKind::Get | OpKind::Gets => self.frame(Opcode::Get, NoExtras, 0, request, false)?,
            OpKind::Delete => self.frame(Opcode::Delete, NoExtras, 0, request, false)?,
            OpKind::Stats => self.frame(Opcode::Stat, NoExtras, 0, request, false)?,
            OpKind::Touch => {
                let extras = TouchExtras {
                    exptime: request.exptime,
                };
                self.frame(Opcode::Touch, extras, 0, request, false)?
            }
            OpKind::Incr => self.arithmetic(Opcode::Increment, request)?,
            OpKind::Decr => self.arithmetic(Opcode::Decrement, request)?,
            OpKind::FlushAll => {
                let extras = FlushExtras {
                    exptime: request.exptime,
                };
                self.header_only(Opcode::Flush, extras)?
            }
            OpKind::Version => self.header_only(Opcode::Version, NoExtras)?,
            OpKind::Quit => self.header_only(Opcode::Quit, NoExtras)?,
            OpKind::Metaget
            | OpKind::LeaseGet
            | OpKind::LeaseSet
            | OpKind::FlushRe
            | OpKind::Exec
            | OpKind::Shutdown => return Ok(false),
        }
        Ok(true)
    }

    fn store(&mut self, opcode: Opcode, request: &McRequest, cas: u64) -> Result<()> {
        let extras = SetExtras {
            flags: request.flags,
            exptime: request.exptime,
        };
        self.frame(opcode, extras, cas, request, true)
    }

    fn arithmetic(&mut self, opcode: Opcode, request: &McRequest) -> Result<()> {
        let delta = u32::try_from(request.delta).map_err(|_| {
            WireError::too_large("delta", request.delta, u64::from(u32::MAX))
        })?;
        let extras = ArithExtras {
            delta,
            initial_value: 0,
            exptime: request.exptime,
        };
        self.frame(opcode, extras, 0, request, false)
    }

    fn header_only<E: Extras>(&mut self, opcode: Opcode, extras: E) -> Result<()> {
        let header = RequestHeader::for_body(opcode, E::SIZE, 0, 0)?;
        self.append_header(&header, &extras);
        Ok(())
    }

    /// Header, extras, key and (optionally) value, in that order.
    ///
    /// All validation happens before the first append.
    fn frame<E: Extras>(
        &mut self,
        opcode: Opcode,
        extras: E,
        cas: u64,
        request: &McRequest,
        with_value: bool,
    ) -> Result<()> {
        let value_len = if with_value { request.value.len() } else { 0 };
        if value_len > self.max_value_size {
            return Err(WireError::too_large(
                "value length",
                value_len as u64,
                self.max_value_size as u64,
            ));
        }

        let header =
            RequestHeader::for_body(opcode, E::SIZE, request.key.len(), value_len)?.with_cas(cas);
        self.append_header(&header, &extras);

        if !request.key.is_empty() {
            self.acc.append(Segment::Key, request.key.len());
        }
        if value_len > 0 {
            if request.value.is_contiguous() {
                self.acc.append(Segment::Value, value_len);
            } else {
                self.acc.append_payload(request.value.to_bytes());
            }
        }
        Ok(())
    }

    fn append_header<E: Extras>(&mut self, header: &RequestHeader, extras: &E) {
        self.acc.append_scratch(&header.encode());
        if E::SIZE > 0 {
            let mut buf = [0u8; MAX_EXTRAS_SIZE];
            extras.write(&mut buf);
            self.acc.append_scratch(&buf[..E::SIZE]);
        }
    }
}

impl Default for BinaryRequestSerializer {
    fn default() -> Self {
        Self::new()
    }
}

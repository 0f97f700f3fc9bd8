//! Request definitions
//!
//! Already-decoded requests as handed to the binary encoder.

use bytes::Bytes;

use super::{OpKind, Value};

/// A decoded request, carrying only the fields the encoders read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McRequest {
    /// Operation kind
    pub op: OpKind,

    /// Key (stats argument for stats, regex for flush-re)
    pub key: Bytes,

    /// Value for update-like ops
    pub value: Value,

    pub flags: u32,

    /// Expiry; the delay for flush-all
    pub exptime: u32,

    /// Amount for incr/decr
    pub delta: u64,

    /// CAS token for cas
    pub cas: u64,
}

impl McRequest {
    /// Create a request with every field zeroed
    pub fn new(op: OpKind, key: impl Into<Bytes>) -> Self {
        Self {
            op,
            key: key.into(),
            value: Value::new(),
            flags: 0,
            exptime: 0,
            delta: 0,
            cas: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    pub fn get(key: impl Into<Bytes>) -> Self {
        Self::new(OpKind::Get, key)
    }

    pub fn set(key: impl Into<Bytes>, value: impl Into<Value>) -> Self {
        Self::new(OpKind::Set, key).with_value(value)
    }

    /// Any update-like operation with a value
    pub fn store(op: OpKind, key: impl Into<Bytes>, value: impl Into<Value>) -> Self {
        Self::new(op, key).with_value(value)
    }

    pub fn delete(key: impl Into<Bytes>) -> Self {
        Self::new(OpKind::Delete, key)
    }

    pub fn touch(key: impl Into<Bytes>, exptime: u32) -> Self {
        Self::new(OpKind::Touch, key).with_exptime(exptime)
    }

    pub fn incr(key: impl Into<Bytes>, delta: u64) -> Self {
        Self::new(OpKind::Incr, key).with_delta(delta)
    }

    pub fn decr(key: impl Into<Bytes>, delta: u64) -> Self {
        Self::new(OpKind::Decr, key).with_delta(delta)
    }

    /// Request without a key (version, quit, shutdown, flush-all)
    pub fn keyless(op: OpKind) -> Self {
        Self::new(op, Bytes::new())
    }

    // -------------------------------------------------------------------------
    // Field setters
    // -------------------------------------------------------------------------

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_exptime(mut self, exptime: u32) -> Self {
        self.exptime = exptime;
        self
    }

    pub fn with_delta(mut self, delta: u64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }
}

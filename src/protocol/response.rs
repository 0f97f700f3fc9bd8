//! Reply definitions
//!
//! Already-decoded replies as handed to the text encoder. The key is not
//! part of the reply; the caller passes the request key alongside it.

use std::net::IpAddr;

use super::{OpKind, ResultCode, Value};

/// Metadata carried by a metaget hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetagetInfo {
    /// Seconds since the item was stored, `None` when unknown
    pub age: Option<u32>,

    pub exptime: u32,

    /// Address of the server the item came from, `None` when unknown
    pub ip: Option<IpAddr>,
}

/// A reply to encode for the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McReply {
    /// Operation this reply answers
    pub op: OpKind,

    /// Outcome
    pub result: ResultCode,

    /// Value for hits; version string for version; response for exec
    pub value: Value,

    pub flags: u32,

    /// CAS token (gets)
    pub cas: u64,

    /// Lease token issued on a lease-get miss
    pub lease_token: u64,

    /// New counter value for incr/decr
    pub delta: u64,

    /// Application-specific error code, printed when non-zero
    pub app_error_code: u16,

    /// Diagnostic message for error results
    pub message: Option<String>,

    /// Stat lines for stats, without terminators
    pub stats: Vec<String>,

    pub metaget: MetagetInfo,
}

impl McReply {
    pub fn new(op: OpKind, result: ResultCode) -> Self {
        Self {
            op,
            result,
            value: Value::new(),
            flags: 0,
            cas: 0,
            lease_token: 0,
            delta: 0,
            app_error_code: 0,
            message: None,
            stats: Vec::new(),
            metaget: MetagetInfo::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    /// A found reply for a get-like operation
    pub fn hit(op: OpKind, flags: u32, value: impl Into<Value>) -> Self {
        Self::new(op, ResultCode::Found)
            .with_flags(flags)
            .with_value(value)
    }

    pub fn miss(op: OpKind) -> Self {
        Self::new(op, ResultCode::NotFound)
    }

    /// An error reply with a diagnostic message
    pub fn error(op: OpKind, result: ResultCode, message: impl Into<String>) -> Self {
        Self::new(op, result).with_message(message)
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

    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }

    pub fn with_lease_token(mut self, token: u64) -> Self {
        self.lease_token = token;
        self
    }

    pub fn with_delta(mut self, delta: u64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_app_error_code(mut self, code: u16) -> Self {
        self.app_error_code = code;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_stats<I, S>(mut self, stats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stats = stats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metaget(mut self, info: MetagetInfo) -> Self {
        self.metaget = info;
        self
    }
}

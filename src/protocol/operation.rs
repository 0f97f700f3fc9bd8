//! Operation kinds and result codes
//!
//! The closed set of operations the proxy speaks and the outcome codes that
//! drive reply formatting.

/// Binary protocol opcodes used by the request encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Get = 0x00,
    Set = 0x01,
    Add = 0x02,
    Replace = 0x03,
    Delete = 0x04,
    Increment = 0x05,
    Decrement = 0x06,
    Quit = 0x07,
    Flush = 0x08,
    Version = 0x0B,
    Append = 0x0E,
    Prepend = 0x0F,
    Stat = 0x10,
    Touch = 0x1C,
}

impl Opcode {
    /// Try to convert a byte to an opcode.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Opcode::Get),
            0x01 => Some(Opcode::Set),
            0x02 => Some(Opcode::Add),
            0x03 => Some(Opcode::Replace),
            0x04 => Some(Opcode::Delete),
            0x05 => Some(Opcode::Increment),
            0x06 => Some(Opcode::Decrement),
            0x07 => Some(Opcode::Quit),
            0x08 => Some(Opcode::Flush),
            0x0B => Some(Opcode::Version),
            0x0E => Some(Opcode::Append),
            0x0F => Some(Opcode::Prepend),
            0x10 => Some(Opcode::Stat),
            0x1C => Some(Opcode::Touch),
            _ => None,
        }
    }
}

/// Groups of operations that share a reply grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpFamily {
    GetLike,
    UpdateLike,
    ArithmeticLike,
    Delete,
    Touch,
    Version,
    Stats,
    FlushAll,
    FlushRe,
    Exec,
    Shutdown,
    Quit,
}

/// Every operation kind a request or reply can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Get,
    Gets,
    Metaget,
    LeaseGet,
    Set,
    Add,
    Replace,
    Append,
    Prepend,
    Cas,
    LeaseSet,
    Incr,
    Decr,
    Delete,
    Touch,
    Version,
    Stats,
    FlushAll,
    FlushRe,
    Exec,
    Shutdown,
    Quit,
}

impl OpKind {
    /// All operation kinds, in declaration order.
    pub const ALL: [OpKind; 22] = [
        OpKind::Get,
        OpKind::Gets,
        OpKind::Metaget,
        OpKind::LeaseGet,
        OpKind::Set,
        OpKind::Add,
        OpKind::Replace,
        OpKind::Append,
        OpKind::Prepend,
        OpKind::Cas,
        OpKind::LeaseSet,
        OpKind::Incr,
        OpKind::Decr,
        OpKind::Delete,
        OpKind::Touch,
        OpKind::Version,
        OpKind::Stats,
        OpKind::FlushAll,
        OpKind::FlushRe,
        OpKind::Exec,
        OpKind::Shutdown,
        OpKind::Quit,
    ];

    /// Name used in diagnostics and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            OpKind::Get => "get",
            OpKind::Gets => "gets",
            OpKind::Metaget => "metaget",
            OpKind::LeaseGet => "lease-get",
            OpKind::Set => "set",
            OpKind::Add => "add",
            OpKind::Replace => "replace",
            OpKind::Append => "append",
            OpKind::Prepend => "prepend",
            OpKind::Cas => "cas",
            OpKind::LeaseSet => "lease-set",
            OpKind::Incr => "incr",
            OpKind::Decr => "decr",
            OpKind::Delete => "delete",
            OpKind::Touch => "touch",
            OpKind::Version => "version",
            OpKind::Stats => "stats",
            OpKind::FlushAll => "flush-all",
            OpKind::FlushRe => "flush-re",
            OpKind::Exec => "exec",
            OpKind::Shutdown => "shutdown",
            OpKind::Quit => "quit",
        }
    }

    /// Parse a name produced by [`OpKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn family(self) -> OpFamily {
        match self {
            OpKind::Get | OpKind::Gets | OpKind::Metaget | OpKind::LeaseGet => OpFamily::GetLike,
            OpKind::Set
            | OpKind::Add
            | OpKind::Replace
            | OpKind::Append
            | OpKind::Prepend
            | OpKind::Cas
            | OpKind::LeaseSet => OpFamily::UpdateLike,
            OpKind::Incr | OpKind::Decr => OpFamily::ArithmeticLike,
            OpKind::Delete => OpFamily::Delete,
            OpKind::Touch => OpFamily::Touch,
            OpKind::Version => OpFamily::Version,
            OpKind::Stats => OpFamily::Stats,
            OpKind::FlushAll => OpFamily::FlushAll,
            OpKind::FlushRe => OpFamily::FlushRe,
            OpKind::Exec => OpFamily::Exec,
            OpKind::Shutdown => OpFamily::Shutdown,
            OpKind::Quit => OpFamily::Quit,
        }
    }

    /// Binary opcode for this kind, if the binary protocol has one.
    ///
    /// Proxy extensions (metaget, leases, flush-re, exec, shutdown) have none.
    pub fn opcode(self) -> Option<Opcode> {
        match self {
            OpKind::Get | OpKind::Gets => Some(Opcode::Get),
            OpKind::Set | OpKind::Cas => Some(Opcode::Set),
            OpKind::Add => Some(Opcode::Add),
            OpKind::Replace => Some(Opcode::Replace),
            OpKind::Append => Some(Opcode::Append),
            OpKind::Prepend => Some(Opcode::Prepend),
            OpKind::Incr => Some(Opcode::Increment),
            OpKind::Decr => Some(Opcode::Decrement),
            OpKind::Delete => Some(Opcode::Delete),
            OpKind::Touch => Some(Opcode::Touch),
            OpKind::Version => Some(Opcode::Version),
            OpKind::Stats => Some(Opcode::Stat),
            OpKind::FlushAll => Some(Opcode::Flush),
            OpKind::Quit => Some(Opcode::Quit),
            OpKind::Metaget
            | OpKind::LeaseGet
            | OpKind::LeaseSet
            | OpKind::FlushRe
            | OpKind::Exec
            | OpKind::Shutdown => None,
        }
    }
}

/// Outcome of an operation.
///
/// Numeric codes are stable and appear in unexpected-result diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResultCode {
    Unknown = 0,
    Deleted = 1,
    Touched = 2,
    Found = 3,
    FoundStale = 4,
    NotFound = 5,
    NotFoundHot = 6,
    NotStored = 7,
    StaleStored = 8,
    Ok = 9,
    Stored = 10,
    Exists = 11,

    // Errors
    LocalError = 20,
    ConnectError = 21,
    ConnectTimeout = 22,
    Timeout = 23,
    TryAgain = 24,
    Busy = 25,
    Tko = 26,
    RemoteError = 27,
    Aborted = 28,
    BadValue = 29,
    ClientError = 30,
    BadCommand = 31,
    BadKey = 32,
    BadFlags = 33,
    BadExptime = 34,
    BadLeaseId = 35,
    BadCasId = 36,
}

impl ResultCode {
    /// All result codes, in declaration order.
    pub const ALL: [ResultCode; 29] = [
        ResultCode::Unknown,
        ResultCode::Deleted,
        ResultCode::Touched,
        ResultCode::Found,
        ResultCode::FoundStale,
        ResultCode::NotFound,
        ResultCode::NotFoundHot,
        ResultCode::NotStored,
        ResultCode::StaleStored,
        ResultCode::Ok,
        ResultCode::Stored,
        ResultCode::Exists,
        ResultCode::LocalError,
        ResultCode::ConnectError,
        ResultCode::ConnectTimeout,
        ResultCode::Timeout,
        ResultCode::TryAgain,
        ResultCode::Busy,
        ResultCode::Tko,
        ResultCode::RemoteError,
        ResultCode::Aborted,
        ResultCode::BadValue,
        ResultCode::ClientError,
        ResultCode::BadCommand,
        ResultCode::BadKey,
        ResultCode::BadFlags,
        ResultCode::BadExptime,
        ResultCode::BadLeaseId,
        ResultCode::BadCasId,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ResultCode::Unknown => "unknown",
            ResultCode::Deleted => "deleted",
            ResultCode::Touched => "touched",
            ResultCode::Found => "found",
            ResultCode::FoundStale => "found_stale",
            ResultCode::NotFound => "not_found",
            ResultCode::NotFoundHot => "not_found_hot",
            ResultCode::NotStored => "not_stored",
            ResultCode::StaleStored => "stale_stored",
            ResultCode::Ok => "ok",
            ResultCode::Stored => "stored",
            ResultCode::Exists => "exists",
            ResultCode::LocalError => "local_error",
            ResultCode::ConnectError => "connect_error",
            ResultCode::ConnectTimeout => "connect_timeout",
            ResultCode::Timeout => "timeout",
            ResultCode::TryAgain => "try_again",
            ResultCode::Busy => "busy",
            ResultCode::Tko => "tko",
            ResultCode::RemoteError => "remote_error",
            ResultCode::Aborted => "aborted",
            ResultCode::BadValue => "bad_value",
            ResultCode::ClientError => "client_error",
            ResultCode::BadCommand => "bad_command",
            ResultCode::BadKey => "bad_key",
            ResultCode::BadFlags => "bad_flags",
            ResultCode::BadExptime => "bad_exptime",
            ResultCode::BadLeaseId => "bad_lease_id",
            ResultCode::BadCasId => "bad_cas_id",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|result| result.name() == name)
    }

    /// True for every code in the error category.
    #[inline]
    pub fn is_error(self) -> bool {
        self.code() >= ResultCode::LocalError.code()
    }

    /// Errors attributed to the client rather than the server side.
    #[inline]
    pub fn is_client_error(self) -> bool {
        self.code() >= ResultCode::ClientError.code()
    }

    #[inline]
    pub fn is_hit(self) -> bool {
        matches!(self, ResultCode::Found | ResultCode::FoundStale)
    }

    #[inline]
    pub fn is_miss(self) -> bool {
        matches!(self, ResultCode::NotFound | ResultCode::NotFoundHot)
    }

    #[inline]
    pub fn is_stored(self) -> bool {
        matches!(self, ResultCode::Stored | ResultCode::StaleStored)
    }

    /// Fixed reply line for an error that carries no message.
    ///
    /// Returns `None` for codes outside the error category.
    pub fn canonical_error_line(self) -> Option<&'static [u8]> {
        let line: &'static [u8] = match self {
            ResultCode::LocalError => b"SERVER_ERROR local error\r\n",
            ResultCode::ConnectError => b"SERVER_ERROR connection error\r\n",
            ResultCode::ConnectTimeout => b"SERVER_ERROR connection timeout\r\n",
            ResultCode::Timeout => b"SERVER_ERROR timeout\r\n",
            ResultCode::TryAgain => b"SERVER_ERROR 302 try again\r\n",
            ResultCode::Busy => b"SERVER_ERROR 307 busy\r\n",
            ResultCode::Tko => b"SERVER_ERROR unavailable\r\n",
            ResultCode::RemoteError => b"SERVER_ERROR remote error\r\n",
            ResultCode::Aborted => b"SERVER_ERROR aborted\r\n",
            ResultCode::BadValue => b"SERVER_ERROR bad value\r\n",
            ResultCode::ClientError => b"CLIENT_ERROR\r\n",
            ResultCode::BadCommand => b"CLIENT_ERROR bad command\r\n",
            ResultCode::BadKey => b"CLIENT_ERROR bad key\r\n",
            ResultCode::BadFlags => b"CLIENT_ERROR bad flags\r\n",
            ResultCode::BadExptime => b"CLIENT_ERROR bad exptime\r\n",
            ResultCode::BadLeaseId => b"CLIENT_ERROR bad lease_id\r\n",
            ResultCode::BadCasId => b"CLIENT_ERROR bad cas_id\r\n",
            _ => return None,
        };
        Some(line)
    }
}

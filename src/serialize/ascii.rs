//! Text reply encoder
//!
//! Maps (operation, result, payload) to the line-oriented reply grammar,
//! emitted as descriptors rather than an assembled string.
//!
//! ## Grammar by Family
//! - get-like:    `VALUE <key> <flags> <len>[ <cas>]\r\n<value>\r\n`, or
//!   `END\r\n` when the key is empty (end of a multi-key reply)
//! - lease-get:   `LVALUE <key> <token> <flags> <len>\r\n<value>\r\n`,
//!   `NOT_FOUND_HOT\r\n`
//! - metaget:     `META <key> age: <n|unknown>; exptime: <n>; from: <ip|unknown>; is_transient: 0\r\n`
//! - update-like: `STORED`, `NOT_STORED`, `EXISTS`, `NOT_FOUND`
//! - arithmetic:  `<n>\r\n`, `NOT_FOUND\r\n`
//! - delete/touch: `DELETED`/`TOUCHED`, `NOT_FOUND`
//! - version:     `VERSION <value>\r\n`
//! - stats:       `<line>\r\n...END\r\n`
//! - exec:        `<response>\r\n` or `OK\r\n`
//! - shutdown, flush-all, flush-re: `OK\r\n`
//!
//! Errors become `CLIENT_ERROR`/`SERVER_ERROR` lines. A result that the
//! operation never produces becomes
//! `SERVER_ERROR unexpected result <name> (<code>) for <op>\r\n` and is logged.

use crate::protocol::{McReply, OpFamily, OpKind, ResultCode};

use super::iovec::{IoVecs, IovAccumulator, Segment};

/// Descriptor capacity, sized for the widest reply (value hit or
/// error-then-END) with headroom
pub const REPLY_MAX_IOVS: usize = 16;

/// Scratch capacity for numeric fields and diagnostic lines
pub const REPLY_SCRATCH_SIZE: usize = 96;

// Widest decimal renderings
const U16_DIGITS: usize = 5;
const U32_DIGITS: usize = 10;
const U64_DIGITS: usize = 20;

/// Longest `ResultCode::name`
pub(crate) const MAX_RESULT_NAME: usize = 15;

/// Longest `OpKind::name`
pub(crate) const MAX_OP_NAME: usize = 9;

/// ` <flags> <len> <cas>\r\n`
const VALUE_SUFFIX_BUDGET: usize = 1 + U32_DIGITS + 1 + U64_DIGITS + 1 + U64_DIGITS + 2;

/// ` <token> <flags> <len>\r\n`
const LVALUE_SUFFIX_BUDGET: usize = 1 + U64_DIGITS + 1 + U32_DIGITS + 1 + U64_DIGITS + 2;

/// Age, exptime and source address of a metaget line
const META_BUDGET: usize = U32_DIGITS + U32_DIGITS + IP_BUDGET;

/// Widest `IpAddr` rendering (IPv4-mapped IPv6 with every group spelled out)
const IP_BUDGET: usize = 45;

/// `<delta>\r\n`
const DELTA_BUDGET: usize = U64_DIGITS + 2;

/// `<code> `
const ERROR_CODE_BUDGET: usize = U16_DIGITS + 1;

/// `SERVER_ERROR unexpected result <name> (<code>) for <op>\r\n`
const UNEXPECTED_BUDGET: usize =
    "SERVER_ERROR unexpected result ".len() + MAX_RESULT_NAME + 2 + 3 + ") for ".len() + MAX_OP_NAME + 2;

// Each reply uses at most one of these call sites, plus an error code only
// on paths that format nothing else.
const _: () = assert!(VALUE_SUFFIX_BUDGET <= REPLY_SCRATCH_SIZE);
const _: () = assert!(LVALUE_SUFFIX_BUDGET <= REPLY_SCRATCH_SIZE);
const _: () = assert!(META_BUDGET <= REPLY_SCRATCH_SIZE);
const _: () = assert!(DELTA_BUDGET <= REPLY_SCRATCH_SIZE);
const _: () = assert!(ERROR_CODE_BUDGET <= REPLY_SCRATCH_SIZE);
const _: () = assert!(UNEXPECTED_BUDGET <= REPLY_SCRATCH_SIZE);

/// Reusable text reply encoder
///
/// Construct once per connection and call [`prepare`](Self::prepare) per
/// reply. The returned descriptors borrow the encoder and the key.
#[derive(Debug, Default)]
pub struct AsciiReplySerializer {
    acc: IovAccumulator<REPLY_MAX_IOVS, REPLY_SCRATCH_SIZE>,

    /// Replies that went through the unexpected-result path
    unexpected: u64,
}

impl AsciiReplySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all descriptors and release held buffers
    pub fn clear(&mut self) {
        self.acc.clear();
    }

    pub fn is_clear(&self) -> bool {
        self.acc.is_clear()
    }

    /// Total length of the last prepared reply, 0 after clear
    pub fn total_len(&self) -> usize {
        self.acc.total_len()
    }

    /// How many replies hit the unexpected-result path so far
    pub fn unexpected_results(&self) -> u64 {
        self.unexpected
    }

    /// Encode `reply` for `key`, replacing whatever was prepared before.
    ///
    /// For get-like operations an empty key marks the end of a multi-key
    /// reply and produces `END\r\n`.
    pub fn prepare<'a>(&'a mut self, reply: McReply, key: &'a [u8]) -> IoVecs<'a, REPLY_MAX_IOVS> {
        self.acc.clear();
        let op = reply.op;

        match op.family() {
            OpFamily::GetLike => self.get_like(reply, key),
            OpFamily::UpdateLike => self.update_like(reply),
            OpFamily::ArithmeticLike => self.arithmetic_like(reply),
            OpFamily::Delete => self.simple(reply, ResultCode::Deleted, b"DELETED\r\n"),
            OpFamily::Touch => self.simple(reply, ResultCode::Touched, b"TOUCHED\r\n"),
            OpFamily::Version => self.version(reply),
            OpFamily::Stats => self.stats(reply),
            OpFamily::Exec => self.exec(reply),
            OpFamily::Shutdown | OpFamily::FlushAll | OpFamily::FlushRe => {
                self.ok_unless_error(reply)
            }
            OpFamily::Quit => {
                if reply.result.is_error() {
                    self.reply_error(reply);
                }
            }
        }

        tracing::trace!(
            op = op.name(),
            iovs = self.acc.len(),
            total_len = self.acc.total_len(),
            "prepared text reply"
        );
        self.acc.iovecs(key, &[])
    }

    // =========================================================================
    // Get-like
    // =========================================================================

    fn get_like(&mut self, reply: McReply, key: &[u8]) {
        if key.is_empty() {
            if reply.result.is_error() {
                self.reply_error(reply);
            }
            self.acc.append_static(b"END\r\n");
            return;
        }

        match (reply.op, reply.result) {
            (OpKind::LeaseGet, ResultCode::NotFound) => self.lease_value(reply, key),
            (OpKind::LeaseGet, ResultCode::NotFoundHot) => {
                self.acc.append_static(b"NOT_FOUND_HOT\r\n");
            }
            (OpKind::Metaget, result) if result.is_hit() => self.meta(&reply, key),
            (_, result) if result.is_hit() => self.value(reply, key),
            // A miss is silent; the END line closes the sequence.
            (_, result) if result.is_miss() => {}
            (_, result) if result.is_error() => self.reply_error(reply),
            (op, result) => self.handle_unexpected(result, op),
        }
    }

    fn value(&mut self, reply: McReply, key: &[u8]) {
        let len = reply.value.len();
        self.acc.append_static(b"VALUE ");
        self.acc.append(Segment::Key, key.len());
        if reply.op == OpKind::Gets {
            self.acc.append_fmt(
                VALUE_SUFFIX_BUDGET,
                format_args!(" {} {} {}\r\n", reply.flags, len, reply.cas),
            );
        } else {
            self.acc
                .append_fmt(VALUE_SUFFIX_BUDGET, format_args!(" {} {}\r\n", reply.flags, len));
        }
        self.acc.append_payload(reply.value.coalesce());
        self.acc.append_static(b"\r\n");
    }

    fn lease_value(&mut self, reply: McReply, key: &[u8]) {
        let len = reply.value.len();
        self.acc.append_static(b"LVALUE ");
        self.acc.append(Segment::Key, key.len());
        self.acc.append_fmt(
            LVALUE_SUFFIX_BUDGET,
            format_args!(" {} {} {}\r\n", reply.lease_token, reply.flags, len),
        );
        self.acc.append_payload(reply.value.coalesce());
        self.acc.append_static(b"\r\n");
    }

    fn meta(&mut self, reply: &McReply, key: &[u8]) {
        let info = &reply.metaget;

        self.acc.append_static(b"META ");
        self.acc.append(Segment::Key, key.len());

        self.acc.append_static(b" age: ");
        match info.age {
            Some(age) => self.acc.append_fmt(U32_DIGITS, format_args!("{}", age)),
            None => self.acc.append_static(b"unknown"),
        }

        self.acc.append_static(b"; exptime: ");
        self.acc.append_fmt(U32_DIGITS, format_args!("{}", info.exptime));

        self.acc.append_static(b"; from: ");
        match info.ip {
            Some(ip) => self.acc.append_fmt(IP_BUDGET, format_args!("{}", ip)),
            None => self.acc.append_static(b"unknown"),
        }

        self.acc.append_static(b"; is_transient: 0\r\n");
    }

    // =========================================================================
    // Update-like and arithmetic
    // =========================================================================

    fn update_like(&mut self, reply: McReply) {
        if reply.result.is_error() {
            self.reply_error(reply);
            return;
        }

        match reply.result {
            ResultCode::Ok | ResultCode::Stored | ResultCode::StaleStored => {
                self.acc.append_static(b"STORED\r\n");
            }
            ResultCode::NotStored => self.acc.append_static(b"NOT_STORED\r\n"),
            ResultCode::Exists => self.acc.append_static(b"EXISTS\r\n"),
            ResultCode::NotFound => self.acc.append_static(b"NOT_FOUND\r\n"),
            result => self.handle_unexpected(result, reply.op),
        }
    }

    fn arithmetic_like(&mut self, reply: McReply) {
        let result = reply.result;
        if result.is_stored() {
            self.acc
                .append_fmt(DELTA_BUDGET, format_args!("{}\r\n", reply.delta));
        } else if result == ResultCode::NotFound {
            self.acc.append_static(b"NOT_FOUND\r\n");
        } else if result.is_error() {
            self.reply_error(reply);
        } else {
            self.handle_unexpected(result, reply.op);
        }
    }

    /// Delete and touch: one success token or NOT_FOUND
    fn simple(&mut self, reply: McReply, success: ResultCode, line: &'static [u8]) {
        let result = reply.result;
        if result == success {
            self.acc.append_static(line);
        } else if result == ResultCode::NotFound {
            self.acc.append_static(b"NOT_FOUND\r\n");
        } else if result.is_error() {
            self.reply_error(reply);
        } else {
            self.handle_unexpected(result, reply.op);
        }
    }

    // =========================================================================
    // Administrative
    // =========================================================================

    fn version(&mut self, reply: McReply) {
        match reply.result {
            ResultCode::Ok => {
                self.acc.append_static(b"VERSION ");
                self.acc.append_payload(reply.value.coalesce());
                self.acc.append_static(b"\r\n");
            }
            result if result.is_error() => self.reply_error(reply),
            result => self.handle_unexpected(result, reply.op),
        }
    }

    fn stats(&mut self, reply: McReply) {
        match reply.result {
            ResultCode::Ok => {
                if !reply.stats.is_empty() {
                    self.acc.append_text(reply.stats.join("\r\n"));
                    self.acc.append_static(b"\r\n");
                }
                self.acc.append_static(b"END\r\n");
            }
            result if result.is_error() => self.reply_error(reply),
            result => self.handle_unexpected(result, reply.op),
        }
    }

    fn exec(&mut self, reply: McReply) {
        match reply.result {
            ResultCode::Ok if reply.value.is_empty() => self.acc.append_static(b"OK\r\n"),
            ResultCode::Ok => {
                self.acc.append_payload(reply.value.coalesce());
                self.acc.append_static(b"\r\n");
            }
            result if result.is_error() => self.reply_error(reply),
            result => self.handle_unexpected(result, reply.op),
        }
    }

    /// Shutdown and flushes: anything that is not an error counts as success
    fn ok_unless_error(&mut self, reply: McReply) {
        if reply.result.is_error() {
            self.reply_error(reply);
        } else {
            self.acc.append_static(b"OK\r\n");
        }
    }

    // =========================================================================
    // Shared paths
    // =========================================================================

    fn reply_error(&mut self, reply: McReply) {
        self.handle_error(reply.result, reply.app_error_code, reply.message);
    }

    /// `CLIENT_ERROR`/`SERVER_ERROR` line for an error result.
    ///
    /// The message moves into the string slot.
    fn handle_error(&mut self, result: ResultCode, app_error_code: u16, message: Option<String>) {
        match message.filter(|m| !m.is_empty()) {
            Some(message) => {
                if result.is_client_error() {
                    self.acc.append_static(b"CLIENT_ERROR ");
                } else {
                    self.acc.append_static(b"SERVER_ERROR ");
                }
                if app_error_code != 0 {
                    self.acc
                        .append_fmt(ERROR_CODE_BUDGET, format_args!("{} ", app_error_code));
                }
                self.acc.append_text(message);
                self.acc.append_static(b"\r\n");
            }
            None => {
                let line = result
                    .canonical_error_line()
                    .unwrap_or(b"SERVER_ERROR unknown error\r\n");
                self.acc.append_static(line);
            }
        }
    }

    fn handle_unexpected(&mut self, result: ResultCode, op: OpKind) {
        self.unexpected += 1;
        tracing::warn!(
            result = result.name(),
            code = result.code(),
            op = op.name(),
            "unexpected result for operation"
        );
        self.acc.append_fmt(
            UNEXPECTED_BUDGET,
            format_args!(
                "SERVER_ERROR unexpected result {} ({}) for {}\r\n",
                result.name(),
                result.code(),
                op.name()
            ),
        );
    }
}

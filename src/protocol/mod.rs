//! Protocol Module
//!
//! The operation model and the binary wire header codec.
//!
//! ## Binary Request Frame
//! ```text
//! ┌────────────────┬──────────────┬─────────┬───────────┐
//! │ Header (24)    │ Extras (0-12)│   Key   │   Value   │
//! └────────────────┴──────────────┴─────────┴───────────┘
//! ```
//!
//! ### Extras by Operation
//! - set/add/replace: flags (4) + exptime (4)
//! - incr/decr:       delta (4) + initial value (4) + exptime (4)
//! - touch:           exptime (4)
//! - flush-all:       exptime (4)
//!
//! ## Text Reply Grammar
//! Line oriented, every line terminated by `\r\n`. Tokens:
//! `STORED NOT_STORED EXISTS NOT_FOUND DELETED TOUCHED NOT_FOUND_HOT OK END
//! VALUE LVALUE VERSION META CLIENT_ERROR SERVER_ERROR`.

mod operation;
mod value;
mod command;
mod response;
mod codec;

pub use operation::{OpFamily, OpKind, Opcode, ResultCode};
pub use value::Value;
pub use command::McRequest;
pub use response::{McReply, MetagetInfo};
pub use codec::{
    body_length, ArithExtras, Extras, FlushExtras, RequestHeader, ResponseHeader, ResponseStatus,
    SetExtras, TouchExtras, HEADER_SIZE, MAX_EXTRAS_SIZE, MAX_KEY_LEN, REQUEST_MAGIC,
    RESPONSE_MAGIC,
};

//! Serialize Module
//!
//! Zero-copy encoders that turn decoded requests and replies into
//! scatter-gather descriptors.
//!
//! ## Responsibilities
//! - Binary request frames (header + extras + key + value)
//! - Text replies for every operation family
//! - Keeping generated or moved-in bytes alive until the caller has sent them
//!
//! ## Lifecycle
//! ```text
//!            prepare()               prepare() / clear()
//!   clear ─────────────► prepared ─────────────────────► clear
//! ```
//! Each `prepare` fully rebuilds the message. The returned [`IoVecs`] borrow
//! the encoder, so it cannot be reused until they are dropped.
//!
//! Encoders are not shared between threads; keep one per connection.

mod iovec;
mod binary;
mod ascii;

pub use iovec::{IoVecs, IovAccumulator};
pub use binary::{BinaryRequestSerializer, Prepared, REQUEST_MAX_IOVS, REQUEST_SCRATCH_SIZE};
pub use ascii::{AsciiReplySerializer, REPLY_MAX_IOVS, REPLY_SCRATCH_SIZE};

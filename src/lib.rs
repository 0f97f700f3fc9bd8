//! # mcwire
//!
//! Wire encoding for a memcache-protocol proxy:
//! - Binary request frames with big-endian 24-byte headers
//! - Text replies for every supported operation
//! - Zero-copy scatter-gather output with owned transient buffers
//! - A polling file provider for configuration payloads
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐          ┌──────────────────┐
//! │    McRequest     │          │     McReply      │
//! └────────┬─────────┘          └────────┬─────────┘
//!          │                             │
//!          ▼                             ▼
//! ┌──────────────────┐          ┌──────────────────┐
//! │ BinaryRequest    │          │ AsciiReply       │
//! │ Serializer       │          │ Serializer       │
//! └────────┬─────────┘          └────────┬─────────┘
//!          │                             │
//!          └──────────┬──────────────────┘
//!                     ▼
//!            ┌──────────────────┐
//!            │  IovAccumulator  │──► IoVecs ──► write_vectored
//!            │ (scratch, slots) │
//!            └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod serialize;
pub mod provider;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, WireError};
pub use config::Config;
pub use protocol::{McReply, McRequest, OpKind, ResultCode, Value};
pub use serialize::{AsciiReplySerializer, BinaryRequestSerializer, IoVecs, Prepared};
pub use provider::FileDataProvider;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mcwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

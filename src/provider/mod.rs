//! Provider Module
//!
//! Data sources for configuration payloads.
//!
//! ## Components
//! - [`FileDataProvider`]: reads a file and reports whether it changed since
//!   the last check

mod file;

pub use file::FileDataProvider;

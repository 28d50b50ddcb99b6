//! Thin async wrapper around the `adb` executable.
//!
//! Queries ([`AdbClient::devices`], [`AdbClient::screen_size`],
//! [`AdbClient::model`]) treat an unreadable value as absent rather than as
//! an error: an offline device is a normal state. Every invocation is
//! bounded by a timeout; a timed-out invocation reports
//! [`TIMEOUT_EXIT_CODE`](insdraw_protocol::constants::TIMEOUT_EXIT_CODE).

mod client;
mod error;
pub mod parse;

pub use client::{AdbClient, AdbOutput, DEFAULT_QUERY_TIMEOUT, shell_quote};
pub use error::AdbError;

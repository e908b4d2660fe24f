//! Rollcall console driver
//!
//! Runs the conversation engine against an in-memory sheet, reading
//! operator lines from stdin and printing replies to stdout.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod console;
pub mod seed;

pub use console::{parse_line, ConsoleError, ConsoleLine, ConsoleTransport};
pub use seed::{seed_store, SeedError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

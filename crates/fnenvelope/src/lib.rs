//! Run HTTP functions as plain processes speaking JSON envelopes over stdio.
//!
//! # Crate Structure
//!
//! - [`protocol`] — The JSON envelope protocol (encoder, decoder, dispatcher, sinks)
//! - [`process`] — Spawning a function process and wiring its stdio to a protocol

/// Re-export protocol types.
pub mod protocol {
    pub use fnenvelope_protocol::*;
}

pub mod process;

pub use process::{FunctionProcess, FunctionProtocol};

//! Command-line host for the shop API smoke test.
//!
//! The core crate stays free of I/O; this crate supplies the blocking
//! `ureq` transport and the binary that wires it to stdout.

pub mod transport;

pub use transport::UreqTransport;

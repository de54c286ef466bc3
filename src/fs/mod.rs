//! Filesystem helpers for atomic-cli.
//!
//! License records and build records are written with [`atomic_write`] so an
//! interrupted invocation never leaves a half-written file behind.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;

//! Workspace placeholder crate.
//!
//! This crate exists so host applications can depend on `audiosource-workspace`
//! and pull in the individual workspace crates (`core-cache`, `core-resolve`)
//! without wiring each one individually.

pub use core_cache;
pub use core_resolve;

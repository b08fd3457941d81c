//! # Lacuna Testkit
//!
//! Test utilities for `lacuna_store`.
//!
//! This crate provides:
//! - Store fixtures and whole-range read/write helpers
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use lacuna_testkit::prelude::*;
//!
//! let store = tiny_store();
//! write_all(&store, 0, b"ABCDEFGH");
//! assert_eq!(read_all(&store, 0, 8), b"ABCDEFGH");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;

//! Shared test utilities for the GameCube adapter bridge.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`fixtures`] - Builders for multiplexed adapter reports
//! - [`mock`] - Recording host, physical device and rumble link, plus a
//!   ready-made adapter harness
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! gcadapter-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use gcadapter_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]

pub mod fixtures;
pub mod mock;
pub mod must;
pub mod prelude;

pub use must::*;

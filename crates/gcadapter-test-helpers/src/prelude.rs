//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use gcadapter_test_helpers::prelude::*;
//! ```

pub use crate::fixtures::{ControllerFrame, MuxReportBuilder};
pub use crate::mock::{
    AdapterHarness, HostEvent, MockHost, MockPhysicalDevice, MockTarget, RecordingLink,
};
pub use crate::must::{must, must_parse, must_some, must_with};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

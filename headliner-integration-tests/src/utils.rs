//! Utilities for tests.

pub mod logging;
pub mod test_tools;

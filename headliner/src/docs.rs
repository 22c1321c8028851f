//! Documentation for Headliner that does not belong to any one crate.

pub mod api;
pub mod dev;
pub mod overview;
pub mod testing;

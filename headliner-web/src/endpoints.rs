//! Web handlers for the routes Headliner serves.

pub mod debug;
pub mod news;

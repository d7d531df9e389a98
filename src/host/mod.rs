//! Headless host integration: JSON-lines commands in, responses and events out.

pub mod contract;
pub mod handler;
pub mod stdio;

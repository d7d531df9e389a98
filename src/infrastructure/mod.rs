pub mod config;
pub mod error;
pub mod logging;
pub mod record_mapper;
pub mod session_store;

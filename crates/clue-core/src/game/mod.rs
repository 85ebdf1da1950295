pub mod agent;
pub mod engine;
pub mod error;
pub mod log;
pub mod setup;

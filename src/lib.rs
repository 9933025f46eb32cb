pub mod calc;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ipc;
pub mod logging;
pub mod model;
pub mod scoring;
pub mod store;

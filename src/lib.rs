// src/lib.rs
pub mod cli;
pub mod config;
pub mod history;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod probe;
pub mod registry;
pub mod status;

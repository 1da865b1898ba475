// src/monitor/mod.rs
mod cycle;

pub use cycle::{CycleReport, Monitor};

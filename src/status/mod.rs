// src/status/mod.rs
mod tracker;

pub use tracker::{diff, StatusSnapshot, StatusTracker, Transition};

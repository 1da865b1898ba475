// src/history/mod.rs
mod export;
mod log;

pub use export::{export_history, log_files, ExportSummary};
pub use log::{log_file_name, CycleLog, LogRecord, LOG_HEADER};

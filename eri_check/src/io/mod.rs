//! Logging setup and report files

mod output;

pub use output::{setup_output, write_json_report};

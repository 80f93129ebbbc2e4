//! Output formatting and logging utilities

use crate::verify::VerificationReport;
use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let total_seconds = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup log output to file or stdout.
///
/// Only the first call in a process installs a subscriber; later calls keep
/// the existing one.
pub fn setup_output(output_path: Option<&String>) {
    match output_path {
        Some(path) => match File::create(path) {
            Ok(log) => {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false);
                if Registry::default().with(file_layer).try_init().is_ok() {
                    info!("Log output will be written to: {}", path);
                }
            }
            Err(err) => eprintln!("Could not create output file {}: {}", path, err),
        },
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            let _ = Registry::default().with(stdout_layer).try_init();
        }
    }
}

/// Serialize `report` as pretty-printed JSON to `path`.
pub fn write_json_report(path: &str, report: &VerificationReport) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("Unable to create report file: {}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).wrap_err("Failed to serialize report")?;
    writeln!(writer)?;
    writer.flush()?;
    info!("Verification report written to: {}", path);
    Ok(())
}

mod report;
mod runner;

pub use report::{report_settings, report_verification};
pub use runner::{build_fixture, run_check, run_obara_saika, run_with_kernel_input};

use crate::config::{Args, CheckSettings, Config};
use crate::io::{setup_output, write_json_report};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use tracing::info;

pub struct CheckApplication {
    args: Args,
    config: Config,
}

impl CheckApplication {
    pub fn from_cli() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Install the log output named in `args`, then load its configuration.
    pub fn from_args(args: Args) -> Result<Self> {
        setup_output(args.output.as_ref());
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn new(args: Args, config: Config) -> Self {
        setup_output(args.output.as_ref());
        Self {
            args,
            config: config.with_defaults(),
        }
    }

    /// Run the check; `Ok(true)` when every value agrees.
    pub fn run(self) -> Result<bool> {
        let settings = CheckSettings::resolve(&self.args, &self.config)?;
        report_settings(&settings);

        let fixture = build_fixture(&settings)?;
        let report = run_obara_saika(&settings, &fixture)?;
        report_verification(&report);

        if let Some(path) = &self.args.report {
            write_json_report(path, &report)?;
        }
        Ok(report.success())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let Some(path) = &args.config_file else {
        info!("No configuration file given, using defaults");
        return Ok(Config::default().with_defaults());
    };
    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", path))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}

//! Command-line arguments for the kernel checker

use super::RealTypeName;
use clap::Parser;

/// Check a generated electron-repulsion kernel against reference integrals
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Override the angular momenta of the four shells, e.g. 1,0,0,0
    #[arg(long, value_delimiter = ',')]
    pub am: Option<Vec<u32>>,

    /// Override the total derivative order
    #[arg(long)]
    pub deriv_order: Option<u32>,

    /// Override the number of vector lanes
    #[arg(long)]
    pub vector_length: Option<usize>,

    /// Override the contraction depth of every shell
    #[arg(long)]
    pub contraction_depth: Option<usize>,

    /// Run the kernel twice into accumulating targets
    #[arg(long)]
    pub accumulate: bool,

    /// Override the element type of the kernel targets
    #[arg(long, value_enum)]
    pub real_type: Option<RealTypeName>,

    /// Override the seed of the random shell quartet
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the absolute comparison threshold
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Also require the relative error to exceed this before failing an element
    #[arg(long)]
    pub relative_tolerance: Option<f64>,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write a JSON verification report to this path
    #[arg(long)]
    pub report: Option<String>,
}

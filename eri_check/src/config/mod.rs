//! Configuration for a verification run
//!
//! Values come from three layers: command-line overrides, the YAML file and
//! built-in defaults, in that order of precedence.

mod args;

pub use args::Args;

use crate::verify::DEFAULT_TOLERANCE;
use clap::ValueEnum;
use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

/// Element type the kernel is compiled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum RealTypeName {
    F64,
    F64x2,
    F64x4,
    F32x4,
    F32x8,
}

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    pub am: Option<[u32; 4]>,
    pub deriv_order: Option<u32>,
    pub vector_length: Option<usize>,
    pub contraction_depth: Option<usize>,
    pub accumulate: Option<bool>,
    pub real_type: Option<RealTypeName>,
    pub seed: Option<u64>,
    pub tolerance: Option<ToleranceParams>,
    pub kernel: Option<KernelParams>,
}

/// Comparison thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToleranceParams {
    pub absolute: Option<f64>,
    pub relative: Option<f64>,
}

impl Default for ToleranceParams {
    fn default() -> Self {
        ToleranceParams {
            absolute: Some(DEFAULT_TOLERANCE),
            relative: None,
        }
    }
}

impl ToleranceParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.absolute.is_none() {
            self.absolute = defaults.absolute;
        }
        self
    }
}

/// Limits of the kernel under test
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KernelParams {
    pub max_am: Option<u32>,
    pub max_deriv_order: Option<u32>,
}

impl Default for KernelParams {
    fn default() -> Self {
        let defaults = CheckSettings::default();
        KernelParams {
            max_am: Some(defaults.kernel_max_am),
            max_deriv_order: Some(defaults.kernel_max_deriv_order),
        }
    }
}

impl KernelParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.max_am.is_none() {
            self.max_am = defaults.max_am;
        }
        if self.max_deriv_order.is_none() {
            self.max_deriv_order = defaults.max_deriv_order;
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        let defaults = CheckSettings::default();
        self.am = self.am.or(Some(defaults.am));
        self.deriv_order = self.deriv_order.or(Some(defaults.deriv_order));
        self.vector_length = self.vector_length.or(Some(defaults.vector_length));
        self.contraction_depth = self.contraction_depth.or(Some(defaults.contraction_depth));
        self.accumulate = self.accumulate.or(Some(defaults.accumulate));
        self.real_type = self.real_type.or(Some(defaults.real_type));
        self.seed = self.seed.or(Some(defaults.seed));
        self.tolerance = Some(self.tolerance.take().unwrap_or_default().with_defaults());
        self.kernel = Some(self.kernel.take().unwrap_or_default().with_defaults());
        self
    }
}

/// Fully resolved settings of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckSettings {
    pub am: [u32; 4],
    pub deriv_order: u32,
    pub vector_length: usize,
    pub contraction_depth: usize,
    pub accumulate: bool,
    pub real_type: RealTypeName,
    pub seed: u64,
    pub tolerance: f64,
    pub relative_tolerance: Option<f64>,
    pub kernel_max_am: u32,
    pub kernel_max_deriv_order: u32,
}

impl Default for CheckSettings {
    fn default() -> Self {
        CheckSettings {
            am: [1, 0, 0, 0],
            deriv_order: 0,
            vector_length: 1,
            contraction_depth: 1,
            accumulate: false,
            real_type: RealTypeName::F64,
            seed: 0,
            tolerance: DEFAULT_TOLERANCE,
            relative_tolerance: None,
            kernel_max_am: 4,
            kernel_max_deriv_order: 2,
        }
    }
}

impl CheckSettings {
    /// Merge command-line overrides into `config`. Values missing from both
    /// fall back to `CheckSettings::default()`.
    pub fn resolve(args: &Args, config: &Config) -> Result<Self> {
        let defaults = CheckSettings::default();
        let am = match &args.am {
            Some(values) => <[u32; 4]>::try_from(values.as_slice())
                .map_err(|_| eyre!("--am takes exactly 4 values, got {}", values.len()))?,
            None => config.am.unwrap_or(defaults.am),
        };
        let tolerance = config.tolerance.clone().unwrap_or_default().with_defaults();
        let kernel = config.kernel.clone().unwrap_or_default().with_defaults();

        let settings = CheckSettings {
            am,
            deriv_order: args.deriv_order.or(config.deriv_order).unwrap_or(defaults.deriv_order),
            vector_length: args
                .vector_length
                .or(config.vector_length)
                .unwrap_or(defaults.vector_length),
            contraction_depth: args
                .contraction_depth
                .or(config.contraction_depth)
                .unwrap_or(defaults.contraction_depth),
            accumulate: args.accumulate || config.accumulate.unwrap_or(defaults.accumulate),
            real_type: args
                .real_type
                .or(config.real_type)
                .unwrap_or(defaults.real_type),
            seed: args.seed.or(config.seed).unwrap_or(defaults.seed),
            tolerance: args
                .tolerance
                .or(tolerance.absolute)
                .unwrap_or(defaults.tolerance),
            relative_tolerance: args.relative_tolerance.or(tolerance.relative),
            kernel_max_am: kernel.max_am.unwrap_or(defaults.kernel_max_am),
            kernel_max_deriv_order: kernel
                .max_deriv_order
                .unwrap_or(defaults.kernel_max_deriv_order),
        };

        if settings.vector_length == 0 {
            return Err(eyre!("vector_length must be at least 1"));
        }
        if settings.contraction_depth == 0 {
            return Err(eyre!("contraction_depth must be at least 1"));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_yaml_with_defaults() {
        let yaml = "
am: [2, 1, 0, 0]
deriv_order: 1
real_type: f64x4
tolerance:
  relative: 1.0e-9
";
        let config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(config.am, Some([2, 1, 0, 0]));
        assert_eq!(config.real_type, Some(RealTypeName::F64x4));
        assert_eq!(config.vector_length, Some(1));
        let tolerance = config.tolerance.clone().unwrap();
        assert_eq!(tolerance.absolute, Some(1.0e-10));
        assert_eq!(tolerance.relative, Some(1.0e-9));
        assert_eq!(config.kernel.as_ref().unwrap().max_am, Some(4));

        let settings = CheckSettings::resolve(&Args::default(), &config).unwrap();
        assert_eq!(settings.deriv_order, 1);
        assert_eq!(settings.am, [2, 1, 0, 0]);
        assert_eq!(settings.relative_tolerance, Some(1.0e-9));
    }

    #[test]
    fn test_cli_overrides_file() {
        let args = Args::parse_from([
            "eri_check",
            "--am",
            "0,1,0,1",
            "--contraction-depth",
            "3",
            "--real-type",
            "f32x8",
            "--accumulate",
            "--tolerance",
            "1e-5",
        ]);
        let config = serde_yml::from_str::<Config>("am: [2, 2, 2, 2]\ncontraction_depth: 2\n")
            .unwrap()
            .with_defaults();
        let settings = CheckSettings::resolve(&args, &config).unwrap();
        assert_eq!(settings.am, [0, 1, 0, 1]);
        assert_eq!(settings.contraction_depth, 3);
        assert_eq!(settings.real_type, RealTypeName::F32x8);
        assert!(settings.accumulate);
        assert_eq!(settings.tolerance, 1e-5);
    }

    #[test]
    fn test_defaults_from_one_source() {
        let raw = CheckSettings::resolve(&Args::default(), &Config::default()).unwrap();
        let completed =
            CheckSettings::resolve(&Args::default(), &Config::default().with_defaults()).unwrap();
        assert_eq!(raw, CheckSettings::default());
        assert_eq!(completed, CheckSettings::default());
    }

    #[test]
    fn test_empty_dimensions_rejected() {
        let config = serde_yml::from_str::<Config>("vector_length: 0\n")
            .unwrap()
            .with_defaults();
        assert!(CheckSettings::resolve(&Args::default(), &config).is_err());
    }
}

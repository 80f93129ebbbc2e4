//! Verification harness for generated electron-repulsion integral kernels.

pub mod app;
pub mod config;
pub mod io;
pub mod kernel;
pub mod simd;
pub mod verify;

pub use kernel::{EriKernel, KernelError, ObaraSaikaKernel, ScopedWorkspace};
pub use simd::{cast, LaneCast, RealType};
pub use verify::{verify_quartet, Mismatch, VerificationReport, VerifyError, VerifyOptions};

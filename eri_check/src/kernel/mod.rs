//! Boundary with the generated electron-repulsion kernels.
//!
//! A kernel is driven the same way regardless of how it was produced:
//! allocate a workspace with one record per contracted primitive combination,
//! `init` it for the largest angular momentum and derivative order, copy the
//! primitive data in with [`prep_workspace`], `compute`, read
//! `targets[di][ijkl * veclen + v]`, and finally `cleanup`.
//! [`ScopedWorkspace`] ties the last step to scope exit.

mod obara_saika;
mod workspace;

pub use obara_saika::ObaraSaikaKernel;
pub use workspace::{prep_workspace, EriWorkspace, PrimitiveRecord, ScopedWorkspace};

use crate::simd::RealType;
use basis::{FixtureError, ProtocolError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("angular momentum {requested} exceeds the supported maximum {supported}")]
    AngularMomentum { requested: u32, supported: u32 },
    #[error("derivative order {requested} exceeds the supported maximum {supported}")]
    DerivOrder { requested: u32, supported: u32 },
    #[error("workspace used before init")]
    NotInitialized,
    #[error("{requested} primitive records requested, workspace holds {available}")]
    Records { requested: usize, available: usize },
    #[error("primitive record {record} carries {found} lanes, expected {expected}")]
    Lanes {
        record: usize,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// A (generated) kernel computing shell-quartet integrals into a workspace.
pub trait EriKernel {
    /// Element type of the target buffers.
    type Real: RealType;

    fn name(&self) -> &str;

    /// Prepare `ws` for quartets up to `max_am` and derivatives up to
    /// `deriv_order`.
    fn init(
        &self,
        ws: &mut EriWorkspace<Self::Real>,
        max_am: u32,
        deriv_order: u32,
    ) -> Result<(), KernelError>;

    /// Evaluate the quartet described by the first `ws.contrdepth` records.
    fn compute(&self, ws: &mut EriWorkspace<Self::Real>) -> Result<(), KernelError>;

    /// Release everything `init` acquired. Must be safe to call on a
    /// workspace whose `init` failed.
    fn cleanup(&self, ws: &mut EriWorkspace<Self::Real>);
}

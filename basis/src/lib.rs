//! Shells, basis-function enumeration and the analytic reference integrals used
//! to check generated electron-repulsion kernels.

pub mod deriv_iter;
pub mod eri;
pub mod error;
pub mod helper;
pub mod iter;
pub mod random_shell;
pub mod shell;


pub use deriv_iter::DerivIndexIterator;
pub use eri::PrimitiveGaussian;
pub use error::{FixtureError, ProtocolError};
pub use iter::{Decompose, IterState, SubIterator};
pub use random_shell::RandomShellSet;
pub use shell::{BasisFunction, CGShell, PureShell, Shell, SphericalHarmonic, CGF};

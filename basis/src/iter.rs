//! Forward iteration over the basis functions of a shell.
//!
//! Whether a shell is already a single basis function or has to be expanded
//! is decided by its [`Decompose`] implementation; [`SubIterator`] only knows
//! the resulting sequence.

use crate::error::ProtocolError;
use crate::shell::{BasisFunction, CGShell, PureShell, Shell, SphericalHarmonic, CGF};

/// Capability of being split into an ordered, finite list of units.
pub trait Decompose {
    type Unit: Clone;

    fn decompose(&self) -> Vec<Self::Unit>;
}

impl Decompose for CGF {
    type Unit = CGF;

    fn decompose(&self) -> Vec<CGF> {
        vec![*self]
    }
}

impl Decompose for CGShell {
    type Unit = CGF;

    fn decompose(&self) -> Vec<CGF> {
        self.cartesian_functions()
    }
}

impl Decompose for PureShell {
    type Unit = SphericalHarmonic;

    fn decompose(&self) -> Vec<Self::Unit> {
        self.harmonics()
    }
}

impl Decompose for Shell {
    type Unit = BasisFunction;

    fn decompose(&self) -> Vec<BasisFunction> {
        match self {
            Shell::Cartesian(sh) => sh
                .decompose()
                .into_iter()
                .map(BasisFunction::Cartesian)
                .collect(),
            Shell::Pure(sh) => sh
                .decompose()
                .into_iter()
                .map(BasisFunction::Spherical)
                .collect(),
            Shell::Function(bf) => vec![BasisFunction::Cartesian(*bf)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterState {
    Uninitialized,
    Positioned(usize),
    Exhausted,
}

/// Iterates over the units of one shell. The unit list is built once, on
/// construction; `init()` may be called any number of times to restart.
pub struct SubIterator<'a, T: Decompose> {
    obj: &'a T,
    subobj: Vec<T::Unit>,
    state: IterState,
}

impl<'a, T: Decompose> SubIterator<'a, T> {
    pub fn new(obj: &'a T) -> Self {
        Self {
            obj,
            subobj: obj.decompose(),
            state: IterState::Uninitialized,
        }
    }

    pub fn obj(&self) -> &'a T {
        self.obj
    }

    /// Total number of units, independent of the current position.
    pub fn num_iter(&self) -> usize {
        self.subobj.len()
    }

    pub fn state(&self) -> IterState {
        self.state
    }

    pub fn init(&mut self) {
        self.state = if self.subobj.is_empty() {
            IterState::Exhausted
        } else {
            IterState::Positioned(0)
        };
    }

    pub fn has_current(&self) -> bool {
        matches!(self.state, IterState::Positioned(_))
    }

    pub fn advance(&mut self) -> Result<(), ProtocolError> {
        match self.state {
            IterState::Uninitialized => Err(ProtocolError::NotInitialized),
            IterState::Exhausted => Err(ProtocolError::Exhausted {
                count: self.subobj.len(),
            }),
            IterState::Positioned(i) => {
                self.state = if i + 1 < self.subobj.len() {
                    IterState::Positioned(i + 1)
                } else {
                    IterState::Exhausted
                };
                Ok(())
            }
        }
    }

    /// Unit at the current position, `None` unless `has_current()`.
    pub fn current(&self) -> Option<&T::Unit> {
        match self.state {
            IterState::Positioned(i) => self.subobj.get(i),
            _ => None,
        }
    }

    /// Like [`current`](Self::current), but reports a missing element as a
    /// protocol error so nested loops can use `?`.
    pub fn elem(&self) -> Result<T::Unit, ProtocolError> {
        self.current().cloned().ok_or(ProtocolError::NoCurrent)
    }
}

//! Shells and the basis functions they are made of.
//!
//! A Cartesian shell of angular momentum L owns every (l, m, n) with
//! l + m + n = L. The order in which those triples are listed here is the
//! order in which generated kernels lay out their target buffers, so it must
//! not change.

use serde::{Deserialize, Serialize};
use std::fmt;

const AM_LETTERS: &[u8] = b"spdfghikmnoqrtuvwxyz";

/// Spectroscopic letter for an angular momentum, `s` for 0, `p` for 1, ...
pub fn am_label(am: u32) -> String {
    match AM_LETTERS.get(am as usize) {
        Some(&c) => (c as char).to_string(),
        None => format!("[l={}]", am),
    }
}

/// Contracted Cartesian Gaussian function, identified by its quantum numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CGF {
    qn: [u32; 3],
}

impl CGF {
    pub fn new(l: u32, m: u32, n: u32) -> Self {
        Self { qn: [l, m, n] }
    }

    /// Quantum number along direction `xyz` (0 = x, 1 = y, 2 = z).
    pub fn qn(&self, xyz: usize) -> u32 {
        self.qn[xyz]
    }

    pub fn qns(&self) -> [u32; 3] {
        self.qn
    }

    pub fn am(&self) -> u32 {
        self.qn.iter().sum()
    }
}

impl fmt::Display for CGF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.qn[0], self.qn[1], self.qn[2])
    }
}

/// Contracted Cartesian Gaussian shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CGShell {
    am: u32,
}

impl CGShell {
    pub fn new(am: u32) -> Self {
        Self { am }
    }

    pub fn am(&self) -> u32 {
        self.am
    }

    pub fn label(&self) -> String {
        am_label(self.am)
    }

    /// Number of Cartesian functions, C(L+2, 2).
    pub fn num_bf(&self) -> usize {
        let l = self.am as usize;
        (l + 1) * (l + 2) / 2
    }

    /// All Cartesian functions of the shell in canonical order:
    /// x-power descending, then y-power descending.
    pub fn cartesian_functions(&self) -> Vec<CGF> {
        let am = self.am;
        let mut bfs = Vec::with_capacity(self.num_bf());
        for i in 0..=am {
            let l = am - i;
            for j in 0..=i {
                bfs.push(CGF::new(l, i - j, j));
            }
        }
        bfs
    }
}

/// One real solid harmonic of a pure shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SphericalHarmonic {
    pub l: u32,
    pub m: i32,
}

/// Shell of real solid harmonics, 2l+1 functions ordered m = -l..=l.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PureShell {
    am: u32,
}

impl PureShell {
    pub fn new(am: u32) -> Self {
        Self { am }
    }

    pub fn am(&self) -> u32 {
        self.am
    }

    pub fn num_bf(&self) -> usize {
        2 * self.am as usize + 1
    }

    pub fn harmonics(&self) -> Vec<SphericalHarmonic> {
        let l = self.am as i32;
        (-l..=l)
            .map(|m| SphericalHarmonic { l: self.am, m })
            .collect()
    }
}

/// Any shell representation the harness knows how to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shell {
    Cartesian(CGShell),
    Pure(PureShell),
    Function(CGF),
}

/// Unit produced when decomposing a [`Shell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasisFunction {
    Cartesian(CGF),
    Spherical(SphericalHarmonic),
}

impl Shell {
    pub fn am(&self) -> u32 {
        match self {
            Shell::Cartesian(sh) => sh.am(),
            Shell::Pure(sh) => sh.am(),
            Shell::Function(bf) => bf.am(),
        }
    }
}

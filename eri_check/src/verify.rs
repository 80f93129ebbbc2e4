//! Element-by-element comparison of kernel output against the reference
//! integrals.
//!
//! The shells of the fixture are walked with [`SubIterator`]s in the same
//! canonical order the kernel uses to pack its targets. For every basis
//! function quartet and lane the reference integrals are summed over all
//! contracted primitive combinations, one accumulator per derivative index,
//! and each sum is compared with `targets[di][ijkl * veclen + v]`.
//! Mismatches are collected; they never stop the walk.

use crate::simd::{cast, RealType};
use basis::eri::{eri, NCENTERS};
use basis::{CGShell, DerivIndexIterator, FixtureError, ProtocolError, RandomShellSet, SubIterator, CGF};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_TOLERANCE: f64 = 1.0e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyOptions {
    pub deriv_order: u32,
    /// Absolute threshold on |reference - computed|.
    pub tolerance: f64,
    /// When set, an element only fails if its relative error also exceeds
    /// this value.
    pub relative_tolerance: Option<f64>,
    /// Applied to every kernel value before comparison.
    pub scale_target: f64,
    /// Evaluate the reference over unit-normalized primitives.
    pub normalize: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            deriv_order: 0,
            tolerance: DEFAULT_TOLERANCE,
            relative_tolerance: None,
            scale_target: 1.0,
            normalize: false,
        }
    }
}

impl VerifyOptions {
    fn exceeds(&self, abs_error: f64, relative_error: f64) -> bool {
        // NaN on either side must count as a failure
        let abs_fail = !(abs_error <= self.tolerance);
        match self.relative_tolerance {
            Some(rtol) => abs_fail && !(relative_error <= rtol),
            None => abs_fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub elem: usize,
    pub deriv_index: usize,
    pub lane: usize,
    pub reference: f64,
    pub computed: f64,
    pub relative_error: f64,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Elem {} di= {} v={} : reference = {:e} kernel = {:e} (relerr = {:e})",
            self.elem, self.deriv_index, self.lane, self.reference, self.computed, self.relative_error
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub label: String,
    pub deriv_order: u32,
    pub veclen: usize,
    pub contrdepth: usize,
    /// Number of basis-function quartets.
    pub nelem: usize,
    pub nderiv: usize,
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
}

impl VerificationReport {
    pub fn success(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Largest absolute deviation among the mismatches, 0 when there are none.
    pub fn max_abs_error(&self) -> f64 {
        self.mismatches
            .iter()
            .map(|m| (m.reference - m.computed).abs())
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("target buffer has {found} derivative components, expected {expected}")]
    DerivCount { expected: usize, found: usize },
    #[error("target buffer for derivative component {deriv_index} holds {found} values, expected {expected}")]
    TargetLength {
        deriv_index: usize,
        expected: usize,
        found: usize,
    },
}

/// Compare `targets` against reference integrals over the shells of
/// `fixture`.
///
/// Fails early only if the fixture is malformed or the target buffer does not
/// have the shape implied by the fixture and derivative order.
pub fn verify_quartet<R: RealType>(
    fixture: &RandomShellSet<NCENTERS>,
    targets: &[Vec<R>],
    options: &VerifyOptions,
) -> Result<VerificationReport, VerifyError> {
    fixture.validate()?;

    let shells = fixture.shells();
    let nderiv = DerivIndexIterator::new(options.deriv_order, NCENTERS).range_rank();
    let nelem: usize = shells.iter().map(CGShell::num_bf).product();
    let veclen = fixture.veclen;

    if targets.len() != nderiv {
        return Err(VerifyError::DerivCount {
            expected: nderiv,
            found: targets.len(),
        });
    }
    if let Some((deriv_index, target)) = targets
        .iter()
        .enumerate()
        .find(|(_, t)| t.len() != nelem * veclen)
    {
        return Err(VerifyError::TargetLength {
            deriv_index,
            expected: nelem * veclen,
            found: target.len(),
        });
    }

    let mut report = VerificationReport {
        label: fixture.label(),
        deriv_order: options.deriv_order,
        veclen,
        contrdepth: fixture.contrdepth,
        nelem,
        nderiv,
        checked: 0,
        mismatches: Vec::new(),
    };

    let [mut it0, mut it1, mut it2, mut it3] = shells.each_ref().map(SubIterator::new);
    let mut ijkl = 0;
    it0.init();
    while it0.has_current() {
        let bf0 = it0.elem()?;
        it1.init();
        while it1.has_current() {
            let bf1 = it1.elem()?;
            it2.init();
            while it2.has_current() {
                let bf2 = it2.elem()?;
                it3.init();
                while it3.has_current() {
                    let bfs = [bf0, bf1, bf2, it3.elem()?];
                    check_element(fixture, targets, options, ijkl, &bfs, &mut report)?;
                    ijkl += 1;
                    it3.advance()?;
                }
                it2.advance()?;
            }
            it1.advance()?;
        }
        it0.advance()?;
    }

    debug!(
        "{}: checked {} values, {} mismatches",
        report.label,
        report.checked,
        report.mismatches.len()
    );
    Ok(report)
}

fn check_element<R: RealType>(
    fixture: &RandomShellSet<NCENTERS>,
    targets: &[Vec<R>],
    options: &VerifyOptions,
    ijkl: usize,
    bfs: &[CGF; NCENTERS],
    report: &mut VerificationReport,
) -> Result<(), ProtocolError> {
    let depth = fixture.contrdepth;
    let veclen = fixture.veclen;

    for v in 0..veclen {
        let mut reference = vec![0.0_f64; report.nderiv];

        for (p0, p1, p2, p3) in iproduct!(0..depth, 0..depth, 0..depth, 0..depth) {
            let prims = [p0, p1, p2, p3];
            let c0123 = fixture.coef_product(v, &prims);
            let gaussians =
                [0, 1, 2, 3].map(|shell| fixture.primitive(shell, v, prims[shell], &bfs[shell]));

            let mut diter = DerivIndexIterator::new(options.deriv_order, NCENTERS);
            let mut di = 0;
            loop {
                reference[di] += c0123 * eri(diter.values(), &gaussians, options.normalize);
                di += 1;
                if diter.last() {
                    break;
                }
                diter.next()?;
            }
        }

        for (di, &ref_value) in reference.iter().enumerate() {
            let computed = options.scale_target * cast::<f64, _>(targets[di][ijkl * veclen + v]);
            let abs_error = (ref_value - computed).abs();
            let relative_error = (abs_error / ref_value).abs();
            report.checked += 1;
            if options.exceeds(abs_error, relative_error) {
                report.mismatches.push(Mismatch {
                    elem: ijkl,
                    deriv_index: di,
                    lane: v,
                    reference: ref_value,
                    computed,
                    relative_error,
                });
            }
        }
    }
    Ok(())
}

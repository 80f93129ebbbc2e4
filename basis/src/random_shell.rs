//! Randomized shell sets used as verification fixtures.
//!
//! Every shell gets a random center. Exponents and contraction coefficients
//! are drawn independently for each vector lane and each primitive, so one
//! fixture describes `veclen` independent integral batches that share their
//! geometry.

use crate::eri::PrimitiveGaussian;
use crate::error::FixtureError;
use crate::shell::{am_label, CGShell, CGF};
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use tracing::debug;

const CENTER_RANGE: (f64, f64) = (-1.0, 1.0);
const EXPONENT_RANGE: (f64, f64) = (0.5, 3.0);
const COEFFICIENT_RANGE: (f64, f64) = (0.1, 1.0);

#[derive(Debug, Clone)]
pub struct RandomShellSet<const N: usize> {
    pub am: [u32; N],
    pub veclen: usize,
    pub contrdepth: usize,
    pub r: [Vector3<f64>; N],
    /// exp[shell][lane][primitive]
    pub exp: Vec<Vec<Vec<f64>>>,
    /// coef[shell][lane][primitive]
    pub coef: Vec<Vec<Vec<f64>>>,
}

fn draw<R: Rng + ?Sized>(
    rng: &mut R,
    dist: &Uniform<f64>,
    nshells: usize,
    veclen: usize,
    contrdepth: usize,
) -> Vec<Vec<Vec<f64>>> {
    let mut values = Vec::with_capacity(nshells);
    for _ in 0..nshells {
        let mut lanes = Vec::with_capacity(veclen);
        for _ in 0..veclen {
            lanes.push((0..contrdepth).map(|_| dist.sample(rng)).collect());
        }
        values.push(lanes);
    }
    values
}

impl<const N: usize> RandomShellSet<N> {
    pub fn new<R: Rng + ?Sized>(
        am: [u32; N],
        veclen: usize,
        contrdepth: usize,
        rng: &mut R,
    ) -> Result<Self, FixtureError> {
        if veclen == 0 {
            return Err(FixtureError::EmptyVector);
        }
        if contrdepth == 0 {
            return Err(FixtureError::EmptyContraction);
        }

        let center_dist = Uniform::new(CENTER_RANGE.0, CENTER_RANGE.1);
        let mut r = [Vector3::zeros(); N];
        for center in r.iter_mut() {
            *center = Vector3::new(
                center_dist.sample(rng),
                center_dist.sample(rng),
                center_dist.sample(rng),
            );
        }

        let exp_dist = Uniform::new(EXPONENT_RANGE.0, EXPONENT_RANGE.1);
        let coef_dist = Uniform::new(COEFFICIENT_RANGE.0, COEFFICIENT_RANGE.1);
        let exp = draw(rng, &exp_dist, N, veclen, contrdepth);
        let coef = draw(rng, &coef_dist, N, veclen, contrdepth);

        debug!(
            "random shell set: am = {:?}, veclen = {}, contrdepth = {}",
            am, veclen, contrdepth
        );

        Ok(Self {
            am,
            veclen,
            contrdepth,
            r,
            exp,
            coef,
        })
    }

    /// Builds a fixture from explicit data, checking every array shape.
    pub fn from_parts(
        am: [u32; N],
        veclen: usize,
        contrdepth: usize,
        r: [Vector3<f64>; N],
        exp: Vec<Vec<Vec<f64>>>,
        coef: Vec<Vec<Vec<f64>>>,
    ) -> Result<Self, FixtureError> {
        let set = Self {
            am,
            veclen,
            contrdepth,
            r,
            exp,
            coef,
        };
        set.validate()?;
        Ok(set)
    }

    /// Checks that the primitive data is complete and usable.
    pub fn validate(&self) -> Result<(), FixtureError> {
        if self.veclen == 0 {
            return Err(FixtureError::EmptyVector);
        }
        if self.contrdepth == 0 {
            return Err(FixtureError::EmptyContraction);
        }

        for (what, data) in [("exponent lanes", &self.exp), ("coefficient lanes", &self.coef)] {
            if data.len() != N {
                return Err(FixtureError::Shape {
                    shell: data.len().min(N),
                    what,
                    expected: N,
                    found: data.len(),
                });
            }
            for (shell, lanes) in data.iter().enumerate() {
                if lanes.len() != self.veclen {
                    return Err(FixtureError::Shape {
                        shell,
                        what,
                        expected: self.veclen,
                        found: lanes.len(),
                    });
                }
                if let Some(prims) = lanes.iter().find(|p| p.len() != self.contrdepth) {
                    return Err(FixtureError::Shape {
                        shell,
                        what: "primitives",
                        expected: self.contrdepth,
                        found: prims.len(),
                    });
                }
            }
        }

        for (shell, lanes) in self.exp.iter().enumerate() {
            for (lane, prims) in lanes.iter().enumerate() {
                for (prim, &value) in prims.iter().enumerate() {
                    if !(value > 0.0) {
                        return Err(FixtureError::Exponent {
                            shell,
                            lane,
                            prim,
                            value,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn shells(&self) -> [CGShell; N] {
        self.am.map(CGShell::new)
    }

    pub fn max_am(&self) -> u32 {
        self.am.iter().copied().max().unwrap_or(0)
    }

    /// Bra-ket label such as `(ps|ss)`.
    pub fn label(&self) -> String {
        let letters: Vec<String> = self.am.iter().map(|&l| am_label(l)).collect();
        let (bra, ket) = letters.split_at(N / 2);
        format!("({}|{})", bra.concat(), ket.concat())
    }

    /// Primitive `prim` of shell `shell` in vector lane `lane`, carrying the
    /// quantum numbers of basis function `bf`.
    pub fn primitive(&self, shell: usize, lane: usize, prim: usize, bf: &CGF) -> PrimitiveGaussian {
        PrimitiveGaussian::new(bf.qns(), self.exp[shell][lane][prim], self.r[shell])
    }

    /// Product of the contraction coefficients of one primitive per shell.
    pub fn coef_product(&self, lane: usize, prims: &[usize; N]) -> f64 {
        prims
            .iter()
            .enumerate()
            .map(|(shell, &p)| self.coef[shell][lane][p])
            .product()
    }
}

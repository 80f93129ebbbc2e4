//! Stand-in for a generated kernel.
//!
//! Primitive integrals [a0|c0]^(m) are built with the Obara-Saika vertical
//! recurrence and transferred to (ab|cd) with the Head-Gordon-Pople horizontal
//! recurrence. Geometric derivatives are expanded into undifferentiated
//! integrals over shifted angular momenta before any recurrence runs.
#![allow(non_snake_case)]

use super::{EriKernel, EriWorkspace, KernelError};
use crate::simd::RealType;
use basis::eri::NCENTERS;
use basis::helper::boys_values;
use basis::{CGShell, DerivIndexIterator, CGF};
use itertools::iproduct;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::marker::PhantomData;
use tracing::debug;

type Quartet = [[u32; 3]; NCENTERS];

#[derive(Debug, Clone)]
pub struct ObaraSaikaKernel<R> {
    max_am: u32,
    max_deriv_order: u32,
    accumulate: bool,
    _real: PhantomData<R>,
}

impl<R: RealType> ObaraSaikaKernel<R> {
    pub fn new(max_am: u32, max_deriv_order: u32) -> Self {
        Self {
            max_am,
            max_deriv_order,
            accumulate: false,
            _real: PhantomData,
        }
    }

    /// Add into the targets instead of overwriting them. The targets are
    /// cleared first whenever `zero_out_targets` is set.
    pub fn accumulating(mut self, accumulate: bool) -> Self {
        self.accumulate = accumulate;
        self
    }

    pub fn max_am(&self) -> u32 {
        self.max_am
    }

    pub fn max_deriv_order(&self) -> u32 {
        self.max_deriv_order
    }
}

impl<R: RealType> EriKernel for ObaraSaikaKernel<R> {
    type Real = R;

    fn name(&self) -> &str {
        "obara-saika"
    }

    fn init(&self, ws: &mut EriWorkspace<R>, max_am: u32, deriv_order: u32) -> Result<(), KernelError> {
        if max_am > self.max_am {
            return Err(KernelError::AngularMomentum {
                requested: max_am,
                supported: self.max_am,
            });
        }
        if deriv_order > self.max_deriv_order {
            return Err(KernelError::DerivOrder {
                requested: deriv_order,
                supported: self.max_deriv_order,
            });
        }
        ws.max_am = max_am;
        ws.deriv_order = deriv_order;
        ws.targets.clear();
        ws.initialized = true;
        Ok(())
    }

    fn compute(&self, ws: &mut EriWorkspace<R>) -> Result<(), KernelError> {
        if !ws.initialized {
            return Err(KernelError::NotInitialized);
        }
        let requested_am = ws.am.iter().copied().max().unwrap_or(0);
        if requested_am > ws.max_am {
            return Err(KernelError::AngularMomentum {
                requested: requested_am,
                supported: ws.max_am,
            });
        }
        let nrec = ws.contrdepth;
        if nrec == 0 || nrec > ws.records.len() {
            return Err(KernelError::Records {
                requested: nrec,
                available: ws.records.len(),
            });
        }
        let veclen = ws.veclen;
        for (record, data) in ws.records[..nrec].iter().enumerate() {
            let found = data.alpha.len().min(data.coef.len());
            if found < veclen {
                return Err(KernelError::Lanes {
                    record,
                    expected: veclen,
                    found,
                });
            }
        }

        let functions: Vec<Vec<CGF>> = ws
            .am
            .iter()
            .map(|&am| CGShell::new(am).cartesian_functions())
            .collect();
        let quartets: Vec<Quartet> = iproduct!(
            functions[0].iter(),
            functions[1].iter(),
            functions[2].iter(),
            functions[3].iter()
        )
        .map(|(a, b, c, d)| [a.qns(), b.qns(), c.qns(), d.qns()])
        .collect();

        let derivs = deriv_indices(ws.deriv_order)?;
        let len = quartets.len() * veclen;

        let reshape = ws.targets.len() != derivs.len() || ws.targets.iter().any(|t| t.len() != len);
        if reshape {
            ws.targets = vec![vec![R::zero(); len]; derivs.len()];
        }
        if self.accumulate && ws.zero_out_targets {
            for target in ws.targets.iter_mut() {
                target.fill(R::zero());
            }
            ws.zero_out_targets = false;
        }

        let lmax = ws.am.iter().sum::<u32>() + ws.deriv_order;
        for v in 0..veclen {
            let mut values = vec![vec![0.0_f64; quartets.len()]; derivs.len()];
            for record in &ws.records[..nrec] {
                let mut eval = PrimitiveQuartet::new(record.alpha[v], &ws.centers, lmax);
                let coef = record.coef[v];
                for (ijkl, qns) in quartets.iter().enumerate() {
                    for (di, deriv) in derivs.iter().enumerate() {
                        values[di][ijkl] += coef * eval.eri(deriv, qns);
                    }
                }
            }

            for (target, vals) in ws.targets.iter_mut().zip(values.iter()) {
                for (ijkl, &val) in vals.iter().enumerate() {
                    let slot = &mut target[ijkl * veclen + v];
                    *slot = if self.accumulate {
                        *slot + R::splat(val)
                    } else {
                        R::splat(val)
                    };
                }
            }
        }

        debug!(
            "{}: {} quartets x {} derivative components x {} lanes over {} records",
            self.name(),
            quartets.len(),
            derivs.len(),
            veclen,
            nrec
        );
        Ok(())
    }

    fn cleanup(&self, ws: &mut EriWorkspace<R>) {
        ws.targets = Vec::new();
        ws.initialized = false;
    }
}

fn deriv_indices(order: u32) -> Result<Vec<Vec<u32>>, KernelError> {
    let mut diter = DerivIndexIterator::new(order, NCENTERS);
    let mut indices = Vec::with_capacity(diter.range_rank());
    loop {
        indices.push(diter.values().to_vec());
        if diter.last() {
            break;
        }
        diter.next()?;
    }
    Ok(indices)
}

fn first_nonzero(qn: &[u32; 3]) -> Option<usize> {
    qn.iter().position(|&n| n > 0)
}

/// Integrals over one fixed set of four primitive exponents and centers,
/// memoized across quantum numbers.
struct PrimitiveQuartet {
    alpha: [f64; NCENTERS],
    zeta: f64,
    eta: f64,
    rho: f64,
    PA: Vector3<f64>,
    WP: Vector3<f64>,
    QC: Vector3<f64>,
    WQ: Vector3<f64>,
    AB: Vector3<f64>,
    CD: Vector3<f64>,
    /// [00|00]^(m)
    ssss: Vec<f64>,
    vrr_memo: HashMap<([u32; 3], [u32; 3], u32), f64>,
    hrr_memo: HashMap<Quartet, f64>,
}

impl PrimitiveQuartet {
    fn new(alpha: [f64; NCENTERS], centers: &[Vector3<f64>; NCENTERS], lmax: u32) -> Self {
        let [a, b, c, d] = alpha;
        let [A, B, C, D] = centers;
        let zeta = a + b;
        let eta = c + d;
        let rho = zeta * eta / (zeta + eta);
        let P = (A * a + B * b) / zeta;
        let Q = (C * c + D * d) / eta;
        let W = (P * zeta + Q * eta) / (zeta + eta);

        let AB = A - B;
        let CD = C - D;
        let Kab = (-a * b / zeta * AB.norm_squared()).exp();
        let Kcd = (-c * d / eta * CD.norm_squared()).exp();
        let prefactor = 2.0 * PI.powf(2.5) / (zeta * eta * (zeta + eta).sqrt()) * Kab * Kcd;
        let ssss = boys_values(lmax, rho * (P - Q).norm_squared())
            .into_iter()
            .map(|f| prefactor * f)
            .collect();

        Self {
            alpha,
            zeta,
            eta,
            rho,
            PA: P - A,
            WP: W - P,
            QC: Q - C,
            WQ: W - Q,
            AB,
            CD,
            ssss,
            vrr_memo: HashMap::new(),
            hrr_memo: HashMap::new(),
        }
    }

    /// Derivative `deriv` (12 coordinate orders) of (ab|cd).
    fn eri(&mut self, deriv: &[u32], qns: &Quartet) -> f64 {
        let alpha = self.alpha;
        let mut terms: Vec<(f64, Quartet)> = vec![(1.0, *qns)];
        for (coord, &order) in deriv.iter().enumerate() {
            let (center, xyz) = (coord / 3, coord % 3);
            for _ in 0..order {
                terms = terms
                    .into_iter()
                    .flat_map(|(w, q)| {
                        let mut out = Vec::with_capacity(2);
                        let mut up = q;
                        up[center][xyz] += 1;
                        out.push((2.0 * alpha[center] * w, up));
                        if q[center][xyz] > 0 {
                            let mut down = q;
                            down[center][xyz] -= 1;
                            out.push((-(q[center][xyz] as f64) * w, down));
                        }
                        out
                    })
                    .collect();
            }
        }
        terms.into_iter().map(|(w, q)| w * self.hrr(q)).sum()
    }

    fn hrr(&mut self, q: Quartet) -> f64 {
        if let Some(&val) = self.hrr_memo.get(&q) {
            return val;
        }
        let [a, b, c, d] = q;
        let val = if let Some(i) = first_nonzero(&b) {
            // (a,b+1_i| = (a+1_i,b| + AB_i (a,b|
            let (mut a1, mut b1) = (a, b);
            a1[i] += 1;
            b1[i] -= 1;
            self.hrr([a1, b1, c, d]) + self.AB[i] * self.hrr([a, b1, c, d])
        } else if let Some(i) = first_nonzero(&d) {
            let (mut c1, mut d1) = (c, d);
            c1[i] += 1;
            d1[i] -= 1;
            self.hrr([a, b, c1, d1]) + self.CD[i] * self.hrr([a, b, c, d1])
        } else {
            self.vrr(a, c, 0)
        };
        self.hrr_memo.insert(q, val);
        val
    }

    fn vrr(&mut self, a: [u32; 3], c: [u32; 3], m: u32) -> f64 {
        let Some(i) = first_nonzero(&a).or_else(|| first_nonzero(&c)) else {
            return self.ssss[m as usize];
        };
        if let Some(&val) = self.vrr_memo.get(&(a, c, m)) {
            return val;
        }

        let val = if a[i] > 0 {
            let mut a1 = a;
            a1[i] -= 1;
            let mut val = self.PA[i] * self.vrr(a1, c, m) + self.WP[i] * self.vrr(a1, c, m + 1);
            if a1[i] > 0 {
                let mut a2 = a1;
                a2[i] -= 1;
                val += a1[i] as f64 / (2.0 * self.zeta)
                    * (self.vrr(a2, c, m) - self.rho / self.zeta * self.vrr(a2, c, m + 1));
            }
            if c[i] > 0 {
                let mut c1 = c;
                c1[i] -= 1;
                val += c[i] as f64 / (2.0 * (self.zeta + self.eta)) * self.vrr(a1, c1, m + 1);
            }
            val
        } else {
            // a vanishes entirely here
            let mut c1 = c;
            c1[i] -= 1;
            let mut val = self.QC[i] * self.vrr(a, c1, m) + self.WQ[i] * self.vrr(a, c1, m + 1);
            if c1[i] > 0 {
                let mut c2 = c1;
                c2[i] -= 1;
                val += c1[i] as f64 / (2.0 * self.eta)
                    * (self.vrr(a, c2, m) - self.rho / self.eta * self.vrr(a, c2, m + 1));
            }
            val
        };
        self.vrr_memo.insert((a, c, m), val);
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{prep_workspace, ScopedWorkspace};
    use crate::simd::cast;
    use basis::eri::{eri, PrimitiveGaussian};
    use basis::RandomShellSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn centers() -> [Vector3<f64>; 4] {
        [
            Vector3::new(0.2, -0.1, 0.4),
            Vector3::new(-0.5, 0.3, 0.1),
            Vector3::new(0.7, 0.6, -0.2),
            Vector3::new(-0.3, -0.8, 0.5),
        ]
    }

    fn reference(deriv: &[u32], qns: &Quartet, alpha: [f64; 4]) -> f64 {
        let r = centers();
        let prims = [0, 1, 2, 3].map(|s| PrimitiveGaussian::new(qns[s], alpha[s], r[s]));
        eri(deriv, &prims, false)
    }

    #[test]
    fn test_primitive_integrals_match_reference() {
        let alpha = [1.1, 0.6, 2.4, 0.9];
        let cases: [Quartet; 4] = [
            [[0, 0, 0]; 4],
            [[1, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0]],
            [[0, 1, 0], [1, 0, 1], [0, 0, 1], [2, 0, 0]],
            [[1, 1, 0], [0, 2, 0], [0, 1, 1], [1, 0, 0]],
        ];
        let mut eval = PrimitiveQuartet::new(alpha, &centers(), 12);
        for qns in &cases {
            let os = eval.eri(&[0; 12], qns);
            let md = reference(&[0; 12], qns, alpha);
            assert!((os - md).abs() < 1e-12 * md.abs().max(1.0), "{:?}: {} vs {}", qns, os, md);
        }
    }

    #[test]
    fn test_derivative_integrals_match_reference() {
        let alpha = [0.8, 1.7, 1.2, 0.5];
        let qns: Quartet = [[1, 0, 0], [0, 0, 1], [0, 1, 0], [0, 0, 0]];
        let mut eval = PrimitiveQuartet::new(alpha, &centers(), 5);
        for deriv in deriv_indices(2).unwrap() {
            let os = eval.eri(&deriv, &qns);
            let md = reference(&deriv, &qns, alpha);
            assert!((os - md).abs() < 1e-11 * md.abs().max(1.0), "{:?}: {} vs {}", deriv, os, md);
        }
    }

    #[test]
    fn test_init_enforces_limits() {
        let kernel = ObaraSaikaKernel::<f64>::new(2, 1);
        let mut ws = EriWorkspace::new(1);
        assert_eq!(
            kernel.init(&mut ws, 3, 0),
            Err(KernelError::AngularMomentum {
                requested: 3,
                supported: 2
            })
        );
        assert_eq!(
            kernel.init(&mut ws, 2, 2),
            Err(KernelError::DerivOrder {
                requested: 2,
                supported: 1
            })
        );
        assert!(!ws.initialized);
        assert_eq!(kernel.compute(&mut ws), Err(KernelError::NotInitialized));
    }

    #[test]
    fn test_compute_rejects_shell_above_init() {
        let kernel = ObaraSaikaKernel::<f64>::new(4, 0);
        let mut rng = StdRng::seed_from_u64(11);
        let fixture = RandomShellSet::<4>::new([2, 0, 0, 0], 1, 1, &mut rng).unwrap();
        let mut ws = ScopedWorkspace::new(&kernel, 1, 1, 0).unwrap();
        prep_workspace(&mut *ws, &fixture).unwrap();
        assert_eq!(
            ws.compute(),
            Err(KernelError::AngularMomentum {
                requested: 2,
                supported: 1
            })
        );
    }

    #[test]
    fn test_target_layout_and_accumulation() {
        let mut rng = StdRng::seed_from_u64(5);
        let fixture = RandomShellSet::<4>::new([1, 0, 1, 0], 2, 1, &mut rng).unwrap();

        let plain = ObaraSaikaKernel::<f64>::new(2, 0);
        let mut ws = ScopedWorkspace::new(&plain, 1, 1, 0).unwrap();
        prep_workspace(&mut *ws, &fixture).unwrap();
        ws.compute().unwrap();
        assert_eq!(ws.targets.len(), 1);
        assert_eq!(ws.targets[0].len(), 9 * 2);
        let once = ws.targets[0].clone();
        ws.compute().unwrap();
        assert_eq!(ws.targets[0], once);

        // element ijkl = 4 is (y|s|y|s); lane 1 sits right after lane 0
        let qns: Quartet = [[0, 1, 0], [0, 0, 0], [0, 1, 0], [0, 0, 0]];
        let prims = [0, 1, 2, 3].map(|s| PrimitiveGaussian::new(qns[s], fixture.exp[s][1][0], fixture.r[s]));
        let expected = fixture.coef_product(1, &[0; 4]) * eri(&[0; 12], &prims, false);
        assert!((once[4 * 2 + 1] - expected).abs() < 1e-12);

        let accumulating = ObaraSaikaKernel::<f64>::new(2, 0).accumulating(true);
        let mut ws = ScopedWorkspace::new(&accumulating, 1, 1, 0).unwrap();
        prep_workspace(&mut *ws, &fixture).unwrap();
        ws.zero_out_targets = true;
        ws.compute().unwrap();
        assert!(!ws.zero_out_targets);
        ws.compute().unwrap();
        for (twice, single) in ws.targets[0].iter().zip(once.iter()) {
            assert!((cast::<f64, _>(*twice) - 2.0 * single).abs() < 1e-12);
        }
    }
}

//! Analytic reference electron-repulsion integrals over primitive Cartesian
//! Gaussians, (ab|cd) and their derivatives with respect to the four centers.
//!
//! The integrals are evaluated with the McMurchie-Davidson scheme: each
//! charge distribution is expanded in Hermite Gaussians (coefficients E^{ij}_t)
//! and the Coulomb interaction between Hermite Gaussians is given by the
//! auxiliary integrals R_{tuv}. See Helgaker, Jørgensen and Olsen, ch. 9.
#![allow(non_snake_case)]

use crate::helper::{boys_values, double_factorial_odd};
use itertools::iproduct;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of centers in a two-electron integral.
pub const NCENTERS: usize = 4;

/// Unnormalized primitive x^l y^m z^n exp(-alpha r^2) centered at `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveGaussian {
    pub qn: [u32; 3],
    pub alpha: f64,
    pub center: Vector3<f64>,
}

impl PrimitiveGaussian {
    pub fn new(qn: [u32; 3], alpha: f64, center: Vector3<f64>) -> Self {
        Self { qn, alpha, center }
    }

    /// Factor that normalizes this primitive to unit self-overlap.
    pub fn norm(&self) -> f64 {
        self.qn
            .iter()
            .map(|&l| Self::norm_1d(self.alpha, l))
            .product()
    }

    // N^2 = (4 alpha)^l sqrt(2 alpha / pi) / (2l-1)!!
    fn norm_1d(alpha: f64, l: u32) -> f64 {
        let n_squared =
            (4.0 * alpha).powi(l as i32) * (2.0 * alpha / PI).sqrt() / double_factorial_odd(l);
        n_squared.sqrt()
    }

    fn shifted(&self, xyz: usize, up: bool) -> Self {
        let mut shifted = *self;
        if up {
            shifted.qn[xyz] += 1;
        } else {
            shifted.qn[xyz] -= 1;
        }
        shifted
    }
}

/// Hermite expansion coefficients E^{ij}_t of the product of two 1D
/// Gaussians, for all i <= la, j <= lb.
struct HermiteExpansion {
    lb: usize,
    tdim: usize,
    data: Vec<f64>,
}

impl HermiteExpansion {
    /// `Qx` is the separation A_x - B_x, `a` and `b` the exponents.
    fn new(la: u32, lb: u32, Qx: f64, a: f64, b: f64) -> Self {
        let (la, lb) = (la as usize, lb as usize);
        let tdim = la + lb + 1;
        let mut e = Self {
            lb,
            tdim,
            data: vec![0.0; (la + 1) * (lb + 1) * tdim],
        };

        let p = a + b;
        let q = a * b / p;
        e.set(0, 0, 0, (-q * Qx * Qx).exp());

        for i in 0..=la {
            for j in 0..=lb {
                if i == 0 && j == 0 {
                    continue;
                }
                for t in 0..=(i + j) {
                    let t = t as i64;
                    let val = if j == 0 {
                        e.get(i - 1, j, t - 1) / (2.0 * p) - e.get(i - 1, j, t) * q * Qx / a
                            + e.get(i - 1, j, t + 1) * ((t + 1) as f64)
                    } else {
                        e.get(i, j - 1, t - 1) / (2.0 * p) + e.get(i, j - 1, t) * q * Qx / b
                            + e.get(i, j - 1, t + 1) * ((t + 1) as f64)
                    };
                    e.set(i, j, t as usize, val);
                }
            }
        }
        e
    }

    fn get(&self, i: usize, j: usize, t: i64) -> f64 {
        if t < 0 || t as usize > i + j {
            return 0.0;
        }
        self.data[(i * (self.lb + 1) + j) * self.tdim + t as usize]
    }

    fn set(&mut self, i: usize, j: usize, t: usize, val: f64) {
        self.data[(i * (self.lb + 1) + j) * self.tdim + t] = val;
    }
}

/// Auxiliary Hermite Coulomb integrals R^n_{tuv} for t + u + v + n <= L.
struct HermiteCoulomb {
    dim: usize,
    data: Vec<f64>,
}

impl HermiteCoulomb {
    /// `p` is the reduced exponent of the two distributions, `PC` their
    /// separation.
    fn new(L: u32, p: f64, PC: &Vector3<f64>) -> Self {
        let L = L as usize;
        let dim = L + 1;
        let mut r = Self {
            dim,
            data: vec![0.0; dim * dim * dim * dim],
        };

        let T = p * PC.norm_squared();
        let boys = boys_values(L as u32, T);

        for n in (0..=L).rev() {
            for t in 0..=(L - n) {
                for u in 0..=(L - n - t) {
                    for v in 0..=(L - n - t - u) {
                        let val = if t == 0 && u == 0 && v == 0 {
                            (-2.0 * p).powi(n as i32) * boys[n]
                        } else if t == 0 && u == 0 {
                            let mut val = PC.z * r.get(n + 1, t, u, v - 1);
                            if v > 1 {
                                val += (v - 1) as f64 * r.get(n + 1, t, u, v - 2);
                            }
                            val
                        } else if t == 0 {
                            let mut val = PC.y * r.get(n + 1, t, u - 1, v);
                            if u > 1 {
                                val += (u - 1) as f64 * r.get(n + 1, t, u - 2, v);
                            }
                            val
                        } else {
                            let mut val = PC.x * r.get(n + 1, t - 1, u, v);
                            if t > 1 {
                                val += (t - 1) as f64 * r.get(n + 1, t - 2, u, v);
                            }
                            val
                        };
                        r.set(n, t, u, v, val);
                    }
                }
            }
        }
        r
    }

    fn index(&self, n: usize, t: usize, u: usize, v: usize) -> usize {
        ((n * self.dim + t) * self.dim + u) * self.dim + v
    }

    fn get(&self, n: usize, t: usize, u: usize, v: usize) -> f64 {
        self.data[self.index(n, t, u, v)]
    }

    fn set(&mut self, n: usize, t: usize, u: usize, v: usize, val: f64) {
        let idx = self.index(n, t, u, v);
        self.data[idx] = val;
    }
}

/// (ab|cd) over unnormalized primitives, no derivatives.
fn eri_base(prims: &[PrimitiveGaussian; NCENTERS]) -> f64 {
    let [a, b, c, d] = prims;

    let zeta = a.alpha + b.alpha;
    let eta = c.alpha + d.alpha;
    let P = (a.center * a.alpha + b.center * b.alpha) / zeta;
    let Q = (c.center * c.alpha + d.center * d.alpha) / eta;
    let alpha = zeta * eta / (zeta + eta);

    let Eab: Vec<HermiteExpansion> = (0..3)
        .map(|xyz| {
            HermiteExpansion::new(
                a.qn[xyz],
                b.qn[xyz],
                a.center[xyz] - b.center[xyz],
                a.alpha,
                b.alpha,
            )
        })
        .collect();
    let Ecd: Vec<HermiteExpansion> = (0..3)
        .map(|xyz| {
            HermiteExpansion::new(
                c.qn[xyz],
                d.qn[xyz],
                c.center[xyz] - d.center[xyz],
                c.alpha,
                d.alpha,
            )
        })
        .collect();

    let L: u32 = prims.iter().flat_map(|g| g.qn.iter()).sum();
    let R = HermiteCoulomb::new(L, alpha, &(P - Q));

    let ab = |xyz: usize| (a.qn[xyz] as usize, b.qn[xyz] as usize);
    let cd = |xyz: usize| (c.qn[xyz] as usize, d.qn[xyz] as usize);
    let ((ax, bx), (ay, by), (az, bz)) = (ab(0), ab(1), ab(2));
    let ((cx, dx), (cy, dy), (cz, dz)) = (cd(0), cd(1), cd(2));

    let val = iproduct!(
        0..=(ax + bx),
        0..=(ay + by),
        0..=(az + bz),
        0..=(cx + dx),
        0..=(cy + dy),
        0..=(cz + dz)
    )
    .map(|(t, u, v, tau, nu, phi)| {
        let eab = Eab[0].get(ax, bx, t as i64)
            * Eab[1].get(ay, by, u as i64)
            * Eab[2].get(az, bz, v as i64);
        let ecd = Ecd[0].get(cx, dx, tau as i64)
            * Ecd[1].get(cy, dy, nu as i64)
            * Ecd[2].get(cz, dz, phi as i64);
        // the ket expansion enters with (-1)^{tau+nu+phi}
        let sgn = if (tau + nu + phi) % 2 == 0 { 1.0 } else { -1.0 };
        eab * ecd * sgn * R.get(0, t + tau, u + nu, v + phi)
    })
    .sum::<f64>();

    val * 2.0 * PI.powf(2.5) / (zeta * eta * (zeta + eta).sqrt())
}

/// Differentiate with respect to the first coordinate that still carries a
/// derivative order, using
/// d/dA_i g(a) = 2 alpha g(a + 1_i) - a_i g(a - 1_i).
fn eri_deriv(deriv: &[u32; 3 * NCENTERS], prims: &[PrimitiveGaussian; NCENTERS]) -> f64 {
    let Some(k) = deriv.iter().position(|&d| d > 0) else {
        return eri_base(prims);
    };
    let (center, xyz) = (k / 3, k % 3);
    let mut lowered = *deriv;
    lowered[k] -= 1;

    let prim = prims[center];
    let mut up = *prims;
    up[center] = prim.shifted(xyz, true);
    let mut val = 2.0 * prim.alpha * eri_deriv(&lowered, &up);

    if prim.qn[xyz] > 0 {
        let mut down = *prims;
        down[center] = prim.shifted(xyz, false);
        val -= prim.qn[xyz] as f64 * eri_deriv(&lowered, &down);
    }
    val
}

/// Reference two-electron integral (ab|cd) or one of its geometric derivatives.
///
/// `deriv` holds the derivative order for each of the 12 center coordinates,
/// ordered (A_x, A_y, A_z, B_x, ..., D_z). With `normalize` the result refers
/// to unit-normalized primitives.
pub fn eri(deriv: &[u32], prims: &[PrimitiveGaussian; NCENTERS], normalize: bool) -> f64 {
    assert_eq!(
        deriv.len(),
        3 * NCENTERS,
        "derivative index must cover all 12 center coordinates"
    );
    let mut orders = [0u32; 3 * NCENTERS];
    orders.copy_from_slice(deriv);

    let val = eri_deriv(&orders, prims);
    if normalize {
        val * prims.iter().map(|g| g.norm()).product::<f64>()
    } else {
        val
    }
}

use libm::erf;
use std::f64::consts::PI;

/// Above this argument the Boys function is built upward from F_0.
const BOYS_UPWARD_THRESHOLD: f64 = 30.0;

/// Compute the Boys function F_n(x) = \int_0^1 t^{2n} e^{-x t^2} dt.
pub fn boys_function(n: u32, x: f64) -> f64 {
    boys_values(n, x)[n as usize]
}

/// Compute F_0(x) ..= F_mmax(x) in one pass.
///
/// Small arguments use the series
/// F_m(x) = e^{-x} \sum_k (2x)^k / ((2m+1)(2m+3)...(2m+2k+1))
/// for F_mmax followed by the stable downward recursion
/// F_{m-1} = (2x F_m + e^{-x}) / (2m-1).
/// Large arguments start from F_0 = sqrt(pi/x)/2 erf(sqrt(x)) and recur upward,
/// F_{m+1} = ((2m+1) F_m - e^{-x}) / (2x).
pub fn boys_values(mmax: u32, x: f64) -> Vec<f64> {
    assert!(x >= 0.0, "x must be nonnegative");
    if x > BOYS_UPWARD_THRESHOLD && x > mmax as f64 {
        boys_upward(mmax as usize, x)
    } else {
        boys_series_downward(mmax as usize, x)
    }
}

fn boys_upward(mmax: usize, x: f64) -> Vec<f64> {
    let mut vals = vec![0.0_f64; mmax + 1];
    let y = (-x).exp();
    vals[0] = 0.5 * (PI / x).sqrt() * erf(x.sqrt());
    for m in 1..=mmax {
        vals[m] = ((2 * m - 1) as f64 * vals[m - 1] - y) / (2.0 * x);
    }
    vals
}

fn boys_series_downward(mmax: usize, x: f64) -> Vec<f64> {
    let mut vals = vec![0.0_f64; mmax + 1];
    let y = (-x).exp();

    let mut denom = (2 * mmax + 1) as f64;
    let mut term = 1.0 / denom;
    let mut sum = term;
    loop {
        denom += 2.0;
        term *= 2.0 * x / denom;
        sum += term;
        if term < 1.0e-17 * sum {
            break;
        }
    }
    vals[mmax] = y * sum;

    for m in (0..mmax).rev() {
        vals[m] = (2.0 * x * vals[m + 1] + y) / (2 * m + 1) as f64;
    }
    vals
}

/// Binomial coefficient C(n, k), 0 when k > n.
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u64, |acc, i| acc * (n - i) / (i + 1))
}

/// (2n-1)!!, with (-1)!! = 1.
pub fn double_factorial_odd(n: u32) -> f64 {
    (1..=n).fold(1.0, |acc, i| acc * (2 * i - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boys_by_quadrature(n: u32, x: f64) -> f64 {
        // composite Simpson on [0, 1]
        let steps = 20_000;
        let h = 1.0 / steps as f64;
        let f = |t: f64| t.powi(2 * n as i32) * (-x * t * t).exp();
        let mut sum = f(0.0) + f(1.0);
        for i in 1..steps {
            let t = i as f64 * h;
            sum += if i % 2 == 0 { 2.0 * f(t) } else { 4.0 * f(t) };
        }
        sum * h / 3.0
    }

    #[test]
    fn test_boys_function_at_zero() {
        for n in 0..20 {
            let val = boys_function(n, 0.0);
            assert!((val - 1.0 / (2 * n + 1) as f64).abs() < 1e-15);
        }
    }

    #[test]
    fn test_boys_function_against_quadrature() {
        for &x in &[1e-3, 0.5, 2.0, 7.5, 18.0, 29.0, 31.0, 45.0] {
            for n in [0, 1, 4, 9] {
                let val = boys_function(n, x);
                let quad = boys_by_quadrature(n, x);
                assert!(
                    (val - quad).abs() < 1e-12 * quad.max(1e-3),
                    "F_{}({}) = {} vs quadrature {}",
                    n,
                    x,
                    val,
                    quad
                );
            }
        }
    }

    #[test]
    fn test_boys_large_argument() {
        let x = 60.0_f64;
        let f0 = boys_function(0, x);
        assert!((f0 - 0.5 * (PI / x).sqrt()).abs() < 1e-14);
    }

    #[test]
    fn test_boys_branches_agree() {
        // both algorithms at the same arguments around the switch point
        for &x in &[BOYS_UPWARD_THRESHOLD - 2.0, BOYS_UPWARD_THRESHOLD, BOYS_UPWARD_THRESHOLD + 2.0] {
            let series = boys_series_downward(6, x);
            let upward = boys_upward(6, x);
            for (m, (s, u)) in series.iter().zip(upward.iter()).enumerate() {
                assert!((s - u).abs() < 1e-12 * u, "F_{}({}): {} vs {}", m, x, s, u);
            }
        }
    }

    #[test]
    fn test_boys_values_switches_branch() {
        let x = BOYS_UPWARD_THRESHOLD + 1.0;
        assert_eq!(boys_values(6, x), boys_upward(6, x));
        assert_eq!(boys_values(6, BOYS_UPWARD_THRESHOLD), boys_series_downward(6, BOYS_UPWARD_THRESHOLD));
        // high orders stay on the series even for large arguments
        assert_eq!(boys_values(40, x), boys_series_downward(40, x));
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(12, 11), 12);
        assert_eq!(binomial(13, 11), 78);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(0, 0), 1);
    }
}

//! Scalar access to SIMD-packed values.
//!
//! A generated kernel is compiled against one "real type": a plain float or
//! one of the `wide` vectors. The checker only ever needs individual lanes of
//! those values as scalars, which is what [`LaneCast`] provides. Supporting a
//! new packed width means adding one macro line below.

use std::fmt::Debug;
use std::ops::Add;
use wide::{f32x4, f32x8, f64x2, f64x4};

/// Extract one lane of a (possibly packed) value as `Output`.
pub trait LaneCast<Output> {
    /// Value of lane `index`.
    ///
    /// Scalars behave as a single lane and ignore `index`. Packed types panic
    /// when `index` is not below their width, like slice indexing.
    fn lane(&self, index: usize) -> Output;
}

/// Lane 0 of `value`. Total for every implemented mapping.
#[inline]
pub fn cast<Output, T: LaneCast<Output>>(value: T) -> Output {
    value.lane(0)
}

/// Element type of a kernel target buffer.
pub trait RealType: Copy + Debug + Add<Output = Self> + LaneCast<f64> + 'static {
    const LANES: usize;
    const NAME: &'static str;

    /// Broadcast `value` to every lane, rounding to the element precision.
    fn splat(value: f64) -> Self;

    fn zero() -> Self {
        Self::splat(0.0)
    }
}

macro_rules! impl_scalar {
    ($elem:ty => $($out:ty),+) => {
        $(
            impl LaneCast<$out> for $elem {
                #[inline]
                fn lane(&self, _index: usize) -> $out {
                    <$out>::from(*self)
                }
            }
        )+
    };
}

macro_rules! impl_packed {
    ($vec:ty => $($out:ty),+) => {
        $(
            impl LaneCast<$out> for $vec {
                #[inline]
                fn lane(&self, index: usize) -> $out {
                    <$out>::from(self.as_array_ref()[index])
                }
            }
        )+
    };
}

macro_rules! impl_real_type {
    ($ty:ty, $elem:ty, $lanes:expr, $name:expr, $splat:path) => {
        impl RealType for $ty {
            const LANES: usize = $lanes;
            const NAME: &'static str = $name;

            #[inline]
            fn splat(value: f64) -> Self {
                $splat(value as $elem)
            }
        }
    };
}

impl_scalar!(f64 => f64);
impl_scalar!(f32 => f32, f64);
impl_packed!(f64x2 => f64);
impl_packed!(f64x4 => f64);
impl_packed!(f32x4 => f32, f64);
impl_packed!(f32x8 => f32, f64);

impl_real_type!(f64, f64, 1, "f64", f64::from);
impl_real_type!(f32, f32, 1, "f32", f32::from);
impl_real_type!(f64x2, f64, 2, "f64x2", f64x2::splat);
impl_real_type!(f64x4, f64, 4, "f64x4", f64x4::splat);
impl_real_type!(f32x4, f32, 4, "f32x4", f32x4::splat);
impl_real_type!(f32x8, f32, 8, "f32x8", f32x8::splat);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_cast() {
        assert_eq!(cast::<f64, _>(1.25_f64), 1.25);
        assert_eq!(cast::<f64, _>(0.5_f32), 0.5);
        assert_eq!(cast::<f32, _>(0.5_f32), 0.5);
        assert_eq!(LaneCast::<f64>::lane(&3.0_f64, 5), 3.0);
    }

    #[test]
    fn test_packed_lanes() {
        let v = f64x4::from([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cast::<f64, _>(v), 1.0);
        let lanes: Vec<f64> = (0..4).map(|i| LaneCast::<f64>::lane(&v, i)).collect();
        assert_eq!(lanes, vec![1.0, 2.0, 3.0, 4.0]);

        let w = f32x8::from([0.5, 1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5]);
        assert_eq!(LaneCast::<f32>::lane(&w, 7), 7.5);
        assert_eq!(LaneCast::<f64>::lane(&w, 3), 3.5);

        let d = f64x2::from([-1.0, 9.0]);
        assert_eq!(LaneCast::<f64>::lane(&d, 1), 9.0);
    }

    #[test]
    #[should_panic]
    fn test_lane_out_of_range_panics() {
        let v = f32x4::splat(1.0);
        let _: f32 = v.lane(4);
    }

    fn splat_roundtrip<R: RealType>(x: f64) -> Vec<f64> {
        let v = R::splat(x);
        (0..R::LANES).map(|i| v.lane(i)).collect()
    }

    #[test]
    fn test_splat_fills_every_lane() {
        assert_eq!(splat_roundtrip::<f64>(0.75), vec![0.75]);
        assert_eq!(splat_roundtrip::<f64x2>(0.75), vec![0.75; 2]);
        assert_eq!(splat_roundtrip::<f64x4>(0.75), vec![0.75; 4]);
        assert_eq!(splat_roundtrip::<f32x4>(0.75), vec![0.75; 4]);
        assert_eq!(splat_roundtrip::<f32x8>(0.75), vec![0.75; 8]);
        assert_eq!(cast::<f64, _>(<f64x4 as RealType>::zero()), 0.0);
    }

    #[test]
    fn test_single_precision_rounds() {
        let x = 0.1_f64;
        let lane = cast::<f64, _>(f32x8::splat(x as f32));
        assert!((lane - x).abs() < 1e-8);
        assert_ne!(lane, x);
        assert_eq!(<f32x4 as RealType>::NAME, "f32x4");
    }
}

use super::{EriKernel, KernelError};
use crate::simd::RealType;
use basis::eri::NCENTERS;
use basis::RandomShellSet;
use itertools::iproduct;
use nalgebra::Vector3;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Primitive data for one combination (p0, p1, p2, p3) of contracted
/// primitives, one entry per vector lane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveRecord {
    pub prims: [usize; NCENTERS],
    pub alpha: Vec<[f64; NCENTERS]>,
    /// c0 * c1 * c2 * c3
    pub coef: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct EriWorkspace<R> {
    pub am: [u32; NCENTERS],
    pub centers: [Vector3<f64>; NCENTERS],
    pub veclen: usize,
    /// Number of leading records the kernel contracts over.
    pub contrdepth: usize,
    /// Zero the targets before the next accumulating compute.
    pub zero_out_targets: bool,
    pub records: Vec<PrimitiveRecord>,
    /// targets[di][ijkl * veclen + v]
    pub targets: Vec<Vec<R>>,
    pub max_am: u32,
    pub deriv_order: u32,
    pub initialized: bool,
}

impl<R: RealType> EriWorkspace<R> {
    pub fn new(nrecords: usize) -> Self {
        Self {
            am: [0; NCENTERS],
            centers: [Vector3::zeros(); NCENTERS],
            veclen: 1,
            contrdepth: 1,
            zero_out_targets: false,
            records: vec![PrimitiveRecord::default(); nrecords],
            targets: Vec::new(),
            max_am: 0,
            deriv_order: 0,
            initialized: false,
        }
    }

    pub fn nrecords(&self) -> usize {
        self.records.len()
    }
}

/// Copy the primitive data of `fixture` into the records of `ws`, primitive
/// combinations in p0-major order, and set `contrdepth` to cover all of them.
pub fn prep_workspace<R: RealType>(
    ws: &mut EriWorkspace<R>,
    fixture: &RandomShellSet<NCENTERS>,
) -> Result<(), KernelError> {
    fixture.validate()?;
    let depth = fixture.contrdepth;
    let needed = depth.pow(NCENTERS as u32);
    if ws.records.len() < needed {
        return Err(KernelError::Records {
            requested: needed,
            available: ws.records.len(),
        });
    }

    ws.am = fixture.am;
    ws.centers = fixture.r;
    ws.veclen = fixture.veclen;
    ws.contrdepth = needed;

    for (record, (p0, p1, p2, p3)) in ws
        .records
        .iter_mut()
        .zip(iproduct!(0..depth, 0..depth, 0..depth, 0..depth))
    {
        let prims = [p0, p1, p2, p3];
        record.prims = prims;
        record.alpha = (0..fixture.veclen)
            .map(|v| [0, 1, 2, 3].map(|shell| fixture.exp[shell][v][prims[shell]]))
            .collect();
        record.coef = (0..fixture.veclen)
            .map(|v| fixture.coef_product(v, &prims))
            .collect();
    }

    debug!(
        "prepared {} primitive records for {} over {} lanes",
        needed,
        fixture.label(),
        fixture.veclen
    );
    Ok(())
}

/// A workspace that is handed back to its kernel's `cleanup` when dropped.
///
/// The wrapper exists before `init` runs, so a failing `init` is cleaned up as
/// well.
pub struct ScopedWorkspace<'k, K: EriKernel> {
    kernel: &'k K,
    ws: EriWorkspace<K::Real>,
}

impl<'k, K: EriKernel> ScopedWorkspace<'k, K> {
    pub fn new(
        kernel: &'k K,
        nrecords: usize,
        max_am: u32,
        deriv_order: u32,
    ) -> Result<Self, KernelError> {
        let mut scoped = Self {
            kernel,
            ws: EriWorkspace::new(nrecords),
        };
        kernel.init(&mut scoped.ws, max_am, deriv_order)?;
        debug!(
            "{}: workspace with {} records initialized (max am {}, deriv order {})",
            kernel.name(),
            nrecords,
            max_am,
            deriv_order
        );
        Ok(scoped)
    }

    pub fn compute(&mut self) -> Result<(), KernelError> {
        self.kernel.compute(&mut self.ws)
    }
}

impl<K: EriKernel> Deref for ScopedWorkspace<'_, K> {
    type Target = EriWorkspace<K::Real>;

    fn deref(&self) -> &Self::Target {
        &self.ws
    }
}

impl<K: EriKernel> DerefMut for ScopedWorkspace<'_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ws
    }
}

impl<K: EriKernel> Drop for ScopedWorkspace<'_, K> {
    fn drop(&mut self) {
        self.kernel.cleanup(&mut self.ws);
        debug!("{}: workspace released", self.kernel.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    /// Records every call; `init` fails when `fail_init` is set.
    struct CountingKernel {
        fail_init: bool,
        inits: Cell<usize>,
        cleanups: Cell<usize>,
    }

    impl CountingKernel {
        fn new(fail_init: bool) -> Self {
            Self {
                fail_init,
                inits: Cell::new(0),
                cleanups: Cell::new(0),
            }
        }
    }

    impl EriKernel for CountingKernel {
        type Real = f64;

        fn name(&self) -> &str {
            "counting"
        }

        fn init(&self, ws: &mut EriWorkspace<f64>, max_am: u32, _: u32) -> Result<(), KernelError> {
            self.inits.set(self.inits.get() + 1);
            if self.fail_init {
                return Err(KernelError::AngularMomentum {
                    requested: max_am,
                    supported: 0,
                });
            }
            ws.initialized = true;
            Ok(())
        }

        fn compute(&self, _: &mut EriWorkspace<f64>) -> Result<(), KernelError> {
            Ok(())
        }

        fn cleanup(&self, ws: &mut EriWorkspace<f64>) {
            self.cleanups.set(self.cleanups.get() + 1);
            ws.initialized = false;
        }
    }

    #[test]
    fn test_cleanup_on_scope_exit() {
        let kernel = CountingKernel::new(false);
        {
            let mut ws = ScopedWorkspace::new(&kernel, 1, 2, 0).unwrap();
            assert!(ws.initialized);
            ws.compute().unwrap();
            assert_eq!(kernel.cleanups.get(), 0);
        }
        assert_eq!(kernel.inits.get(), 1);
        assert_eq!(kernel.cleanups.get(), 1);
    }

    #[test]
    fn test_cleanup_after_failed_init() {
        let kernel = CountingKernel::new(true);
        let result = ScopedWorkspace::new(&kernel, 1, 3, 0);
        assert!(matches!(
            result,
            Err(KernelError::AngularMomentum { requested: 3, .. })
        ));
        assert_eq!(kernel.cleanups.get(), 1);
    }

    #[test]
    fn test_prep_workspace_record_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let fixture = RandomShellSet::<4>::new([1, 0, 0, 0], 2, 2, &mut rng).unwrap();
        let mut ws = EriWorkspace::<f64>::new(16);
        prep_workspace(&mut ws, &fixture).unwrap();

        assert_eq!(ws.contrdepth, 16);
        assert_eq!(ws.veclen, 2);
        assert_eq!(ws.am, [1, 0, 0, 0]);
        assert_eq!(ws.records[0].prims, [0, 0, 0, 0]);
        assert_eq!(ws.records[1].prims, [0, 0, 0, 1]);
        assert_eq!(ws.records[8].prims, [1, 0, 0, 0]);
        assert_eq!(ws.records[15].prims, [1, 1, 1, 1]);

        let record = &ws.records[5];
        assert_eq!(record.prims, [0, 1, 0, 1]);
        for v in 0..2 {
            assert_eq!(record.alpha[v][1], fixture.exp[1][v][1]);
            assert_eq!(record.alpha[v][2], fixture.exp[2][v][0]);
            let expected = fixture.coef[0][v][0]
                * fixture.coef[1][v][1]
                * fixture.coef[2][v][0]
                * fixture.coef[3][v][1];
            assert!((record.coef[v] - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn test_prep_workspace_too_few_records() {
        let mut rng = StdRng::seed_from_u64(3);
        let fixture = RandomShellSet::<4>::new([0; 4], 1, 2, &mut rng).unwrap();
        let mut ws = EriWorkspace::<f64>::new(1);
        assert_eq!(
            prep_workspace(&mut ws, &fixture),
            Err(KernelError::Records {
                requested: 16,
                available: 1
            })
        );
    }
}

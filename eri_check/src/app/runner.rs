use crate::config::{CheckSettings, RealTypeName};
use crate::kernel::{prep_workspace, EriKernel, ObaraSaikaKernel, ScopedWorkspace};
use crate::simd::RealType;
use crate::verify::{verify_quartet, VerificationReport, VerifyOptions};
use basis::RandomShellSet;
use color_eyre::eyre::{Result, WrapErr};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use wide::{f32x4, f32x8, f64x2, f64x4};

/// Draw the shell quartet for `settings` from its seeded generator.
pub fn build_fixture(settings: &CheckSettings) -> Result<RandomShellSet<4>> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    RandomShellSet::new(
        settings.am,
        settings.vector_length,
        settings.contraction_depth,
        &mut rng,
    )
    .wrap_err("Failed to build the random shell quartet")
}

/// Check the Obara-Saika kernel compiled for the configured real type.
pub fn run_obara_saika(
    settings: &CheckSettings,
    fixture: &RandomShellSet<4>,
) -> Result<VerificationReport> {
    match settings.real_type {
        RealTypeName::F64 => run_check(&stand_in::<f64>(settings), fixture, settings),
        RealTypeName::F64x2 => run_check(&stand_in::<f64x2>(settings), fixture, settings),
        RealTypeName::F64x4 => run_check(&stand_in::<f64x4>(settings), fixture, settings),
        RealTypeName::F32x4 => run_check(&stand_in::<f32x4>(settings), fixture, settings),
        RealTypeName::F32x8 => run_check(&stand_in::<f32x8>(settings), fixture, settings),
    }
}

fn stand_in<R: RealType>(settings: &CheckSettings) -> ObaraSaikaKernel<R> {
    let kernel = ObaraSaikaKernel::new(settings.kernel_max_am, settings.kernel_max_deriv_order)
        .accumulating(settings.accumulate);
    info!(
        "Kernel {} on {} (max am {}, max deriv order {})",
        kernel.name(),
        R::NAME,
        kernel.max_am(),
        kernel.max_deriv_order()
    );
    kernel
}

pub fn run_check<K: EriKernel>(
    kernel: &K,
    fixture: &RandomShellSet<4>,
    settings: &CheckSettings,
) -> Result<VerificationReport> {
    run_with_kernel_input(kernel, fixture, fixture, settings)
}

/// Run `kernel` on `kernel_input` and compare against reference integrals
/// over `reference`.
///
/// The two fixtures are normally the same; feeding the kernel different data
/// is how a run checks that disagreements are actually detected.
pub fn run_with_kernel_input<K: EriKernel>(
    kernel: &K,
    reference: &RandomShellSet<4>,
    kernel_input: &RandomShellSet<4>,
    settings: &CheckSettings,
) -> Result<VerificationReport> {
    let nrecords = kernel_input.contrdepth.pow(4);
    let mut ws = ScopedWorkspace::new(
        kernel,
        nrecords,
        kernel_input.max_am(),
        settings.deriv_order,
    )
    .wrap_err_with(|| format!("Failed to initialize kernel {}", kernel.name()))?;
    prep_workspace(&mut *ws, kernel_input).wrap_err("Failed to prepare the kernel workspace")?;

    let mut header = format!("Testing {}", reference.label());
    if settings.deriv_order > 0 {
        header.push_str(&format!(" deriv order = {}", settings.deriv_order));
    }
    println!("{}", header);

    let mut scale_target = 1.0;
    if settings.accumulate {
        // zero once, then compute twice into the same targets
        ws.zero_out_targets = true;
        scale_target = 0.5;
        ws.compute()
            .wrap_err_with(|| format!("Kernel {} failed", kernel.name()))?;
    }
    if kernel_input.contrdepth > 1 {
        ws.contrdepth = nrecords;
    }
    ws.compute()
        .wrap_err_with(|| format!("Kernel {} failed", kernel.name()))?;

    let options = VerifyOptions {
        deriv_order: settings.deriv_order,
        tolerance: settings.tolerance,
        relative_tolerance: settings.relative_tolerance,
        scale_target,
        normalize: false,
    };
    let report = verify_quartet(reference, &ws.targets, &options)
        .wrap_err("Kernel output could not be checked")?;
    Ok(report)
}

use crate::config::CheckSettings;
use crate::verify::VerificationReport;
use tracing::{info, warn};

pub fn report_settings(settings: &CheckSettings) {
    info!("Shell angular momenta: {:?}", settings.am);
    info!(
        "Derivative order: {}, vector length: {}, contraction depth: {}",
        settings.deriv_order, settings.vector_length, settings.contraction_depth
    );
    info!(
        "Real type: {:?}, accumulate: {}, seed: {}",
        settings.real_type, settings.accumulate, settings.seed
    );
    match settings.relative_tolerance {
        Some(rtol) => info!(
            "Tolerance: absolute {:e}, relative {:e}",
            settings.tolerance, rtol
        ),
        None => info!("Tolerance: absolute {:e}", settings.tolerance),
    }
}

/// Print one diagnostic line per mismatching element, then a summary.
pub fn report_verification(report: &VerificationReport) {
    for mismatch in &report.mismatches {
        println!("{}", mismatch);
    }

    info!(
        "{}: {} basis-function quartets x {} derivative components x {} lanes, {} values checked",
        report.label, report.nelem, report.nderiv, report.veclen, report.checked
    );
    if report.success() {
        info!("All values agree");
    } else {
        warn!(
            "{} of {} values disagree, largest deviation {:e}",
            report.mismatches.len(),
            report.checked,
            report.max_abs_error()
        );
    }
}

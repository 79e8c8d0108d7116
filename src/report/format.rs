//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting/pricing code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{FitDiagnostics, PremiumBreakdown, PricingRequest, WeibullParams};
use crate::report::WindStats;

/// Format the full run summary (request + data + fit + premium).
pub fn format_run_summary(run: &RunOutput) -> String {
    let req = &run.request;
    let mut out = String::new();

    out.push_str("=== wrp - Wind Risk Pricer ===\n");
    out.push_str(&format_request(req));

    out.push_str("\nObservations:\n");
    match &run.stats {
        Some(stats) => out.push_str(&format_stats(stats)),
        None => out.push_str("  (no usable values)\n"),
    }
    out.push_str(&format!(
        "  days above {:.1} km/h: {}\n",
        req.threshold, run.exceedance_count
    ));

    out.push_str("\nWeibull fit (loc fixed at 0):\n");
    out.push_str(&format_params(&run.fit.params));
    out.push_str(&format_diagnostics(&run.fit.diagnostics));

    out.push_str("\nPremium:\n");
    out.push_str(&format_breakdown(&run.breakdown));

    out
}

pub fn format_request(req: &PricingRequest) -> String {
    format!(
        "Location: lat={:.4} lon={:.4}\nPeriod: {} .. {} ({} days)\nThreshold: {:.1} km/h | Exposure: {:.2} | Loading: {:.2} (confidence {:.4})\n",
        req.location.latitude,
        req.location.longitude,
        req.range.start,
        req.range.end,
        req.range.days(),
        req.threshold,
        req.exposure,
        req.loading_factor.value(),
        req.loading_factor.confidence_level(),
    )
}

pub fn format_stats(stats: &WindStats) -> String {
    format!(
        "  days={} valid={} | mean={:.2} median={:.2} min={:.2} max={:.2} km/h\n",
        stats.days, stats.valid, stats.mean, stats.median, stats.min, stats.max
    )
}

pub fn format_params(params: &WeibullParams) -> String {
    format!(
        "  shape={:.4} scale={:.4} loc={:.1}\n",
        params.shape(),
        params.scale(),
        params.loc()
    )
}

pub fn format_diagnostics(d: &FitDiagnostics) -> String {
    let mut out = format!(
        "  used={} of {} (missing={}, negative={}, zeros={}) | iterations={} | logL={:.3}\n",
        d.n_used, d.n_input, d.n_missing, d.n_negative, d.zeros_excluded, d.iterations, d.log_likelihood
    );
    if d.zeros_excluded > 0 {
        // Calm days are dropped, which pushes the fitted scale up.
        out.push_str(&format!(
            "  note: {} zero value(s) left out of the likelihood; the fit describes windy days only\n",
            d.zeros_excluded
        ));
    }
    out
}

/// Five-field breakdown table.
pub fn format_breakdown(b: &PremiumBreakdown) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {:<24} {:>16.6}\n", "exceedance probability", b.exceedance_probability));
    out.push_str(&format!("  {:<24} {:>16.2}\n", "exposure", b.exposure));
    out.push_str(&format!("  {:<24} {:>16.2}\n", "pure premium", b.pure_premium));
    out.push_str(&format!("  {:<24} {:>16.2}\n", "safety margin", b.safety_margin));
    out.push_str(&format!("  {:<24} {:>16.2}\n", "total premium", b.total_premium));
    out
}

/// Threshold ladder table.
pub fn format_ladder(ladder: &[(f64, PremiumBreakdown)]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>10} {:>12} {:>16} {:>16} {:>16}\n",
        "km/h", "P(exceed)", "pure", "margin", "total"
    ));
    for (t, b) in ladder {
        out.push_str(&format!(
            "{:>10.1} {:>12.6} {:>16.2} {:>16.2} {:>16.2}\n",
            t, b.exceedance_probability, b.pure_premium, b.safety_margin, b.total_premium
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_table_lists_all_five_fields() {
        let b = PremiumBreakdown {
            exceedance_probability: 0.0468,
            exposure: 1_000_000.0,
            pure_premium: 46_800.0,
            safety_margin: 7_800.0,
            total_premium: 54_600.0,
        };
        let txt = format_breakdown(&b);
        assert_eq!(txt.lines().count(), 5);
        assert!(txt.contains("0.046800"));
        assert!(txt.contains("54600.00"));
    }

    #[test]
    fn diagnostics_always_report_excluded_zeros() {
        let mut d = FitDiagnostics {
            n_input: 10,
            n_valid: 9,
            n_missing: 1,
            n_negative: 0,
            zeros_excluded: 0,
            n_used: 9,
            iterations: 6,
            log_likelihood: -31.5,
        };
        let txt = format_diagnostics(&d);
        assert!(txt.contains("zeros=0"));
        assert_eq!(txt.lines().count(), 1);

        d.zeros_excluded = 3;
        d.n_used = 6;
        let txt = format_diagnostics(&d);
        assert!(txt.contains("used=6 of 10"));
        assert!(txt.contains("zeros=3"));
        assert!(txt.contains("note: 3 zero value(s) left out of the likelihood"));
    }

    #[test]
    fn ladder_has_header_and_one_row_per_threshold() {
        let b = PremiumBreakdown {
            exceedance_probability: 0.5,
            exposure: 10.0,
            pure_premium: 5.0,
            safety_margin: 0.0,
            total_premium: 5.0,
        };
        let txt = format_ladder(&[(20.0, b), (30.0, b)]);
        assert_eq!(txt.lines().count(), 3);
        assert!(txt.lines().nth(2).unwrap().trim_start().starts_with("30.0"));
    }
}

//! This module is in charge of outputting the final analysis results to the
//! standard output and to a report file

use crate::{
    config::Configuration,
    cutflow::CutFlowTable,
    diagnostics::DiagnosticsReport,
    efficiency::KinematicEfficiency,
    matching::AcceptanceRegion,
    numeric::Float,
};

use eyre::{Result, WrapErr};
use log::info;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use std::{
    fs::File,
    io::{self, Write},
    time::Duration,
};

/// Number of significant digits in report output (like C's %g)
const SIG_DIGITS: usize = 6;

/// Separator between report sections
const SEPARATOR: &str = "---------------------------------------------";

/// Output the analysis results to the console and to disk
pub fn dump_results(
    cfg: &Configuration,
    cutflow: &CutFlowTable,
    diagnostics: &DiagnosticsReport,
    elapsed_time: Duration,
) -> Result<()> {
    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .wrap_err("Failed to format the timestamp")?;

    // Render the report once, then send it everywhere
    let mut report = Vec::new();
    write_report(&mut report, cfg, cutflow, diagnostics, &timestamp, elapsed_time)
        .wrap_err("Failed to render the report")?;
    io::stdout()
        .write_all(&report)
        .wrap_err("Failed to print the report")?;
    File::create(&cfg.report_file)
        .and_then(|mut file| file.write_all(&report))
        .wrap_err_with(|| format!("Failed to write the report to {}", cfg.report_file))?;
    info!("Report written to {}", cfg.report_file);
    Ok(())
}

/// Write down the full analysis report
pub fn write_report(
    out: &mut impl Write,
    cfg: &Configuration,
    cutflow: &CutFlowTable,
    diagnostics: &DiagnosticsReport,
    timestamp: &str,
    elapsed_time: Duration,
) -> io::Result<()> {
    // Run summary
    writeln_kv(out, timestamp)?;
    writeln_kv(out, SEPARATOR)?;
    let elapsed_secs = elapsed_time.as_secs_f64() as Float;
    writeln_kv(out, ("Elapsed time (s)", elapsed_secs))?;
    if cutflow.total > 0 {
        writeln_kv(out, ("Time per event (s)", elapsed_secs / cutflow.total as Float))?;
    }
    writeln_kv(out, ("Fiducial volume", cfg.fiducial_volume.to_string().as_str()))?;
    writeln_kv(out, ("Pion matching", cfg.match_strategy.as_str()))?;
    writeln_kv(out, ("Number of events", cutflow.total))?;
    writeln_kv(out, ("... after selection", cutflow.selected))?;
    writeln_kv(out, ("Signal efficiency", cutflow.signal_efficiency))?;
    writeln_kv(out, ("Signal purity", cutflow.signal_purity))?;

    // Cut flow
    writeln_kv(out, SEPARATOR)?;
    writeln!(
        out,
        " {:<22}{:>11}{:>11}{:>11}{:>12}{:>12}",
        "cut", "alone", "cumulative", "rejected", "efficiency", "relative"
    )?;
    for row in &cutflow.rows {
        writeln!(
            out,
            " {:<22}{:>11}{:>11}{:>11}{:>12}{:>12}",
            row.cut.name(),
            row.individual,
            row.cumulative,
            row.first_failed,
            engineering(row.efficiency),
            engineering(row.relative_efficiency),
        )?;
    }

    // Categories
    writeln_kv(out, SEPARATOR)?;
    writeln!(
        out,
        " {:<4}{:<20}{:>11}{:>11}{:>12}",
        "code", "category", "events", "selected", "efficiency"
    )?;
    for row in &cutflow.categories {
        writeln!(
            out,
            " {:<4}{:<20}{:>11}{:>11}{:>12}",
            row.category.code(),
            row.category.label(),
            row.total,
            row.selected,
            engineering(row.efficiency()),
        )?;
    }

    // Reconstruction diagnostics
    writeln_kv(out, SEPARATOR)?;
    writeln_kv(out, ("True signal events", diagnostics.signal_events))?;
    let acceptance = diagnostics.acceptance.to_string();
    writeln_kv(out, ("Matching region", acceptance.as_str()))?;
    writeln_kv(out, ("Muon hit floor", diagnostics.muon_min_hits as usize))?;
    for &(hypothesis, efficiency) in &diagnostics.efficiencies {
        let key = format!("Reco. efficiency ({})", hypothesis.label());
        writeln_kv(out, (key.as_str(), efficiency))?;
    }
    writeln_kv(out, ("Reco. efficiency (event)", diagnostics.event_efficiency))?;
    let best_match = AcceptanceRegion::BEST_MATCH.to_string();
    writeln_kv(out, ("Best match region", best_match.as_str()))?;
    for &(hypothesis, fraction) in &diagnostics.best_match_fractions {
        let key = format!("Best match in region ({})", hypothesis.label());
        writeln_kv(out, (key.as_str(), fraction))?;
    }
    let muon_region = AcceptanceRegion::MUON_DIAGNOSTIC.to_string();
    writeln_kv(out, ("Hit-count muon region", muon_region.as_str()))?;
    writeln_kv(out, ("Hit-count muon in region", diagnostics.muon_region_fraction))?;

    // Muon hit threshold scan
    writeln_kv(out, SEPARATOR)?;
    writeln!(
        out,
        " {:>6}{:>12}{:>12}{:>12}{:>14}",
        "hits", "efficiency", "error", "purity", "completeness"
    )?;
    for point in &diagnostics.hit_scan {
        writeln!(
            out,
            " {:>6}{:>12}{:>12}{:>12}{:>14}",
            point.threshold,
            engineering(point.efficiency),
            engineering(point.efficiency_error),
            engineering(point.mean_purity),
            engineering(point.mean_completeness),
        )?;
    }

    // Event efficiency against the truth kinematics
    for curve in &diagnostics.kinematics {
        writeln_kv(out, SEPARATOR)?;
        write_kinematic_efficiency(out, curve)?;
    }
    Ok(())
}

/// Write down the non-empty bins of an efficiency curve
fn write_kinematic_efficiency(out: &mut impl Write, curve: &KinematicEfficiency) -> io::Result<()> {
    writeln_kv(out, curve.variable.label())?;
    writeln!(
        out,
        " {:>10}{:>10}{:>8}{:>8}{:>12}{:>12}",
        "low", "high", "passed", "total", "efficiency", "error"
    )?;
    for bin in &curve.bins {
        writeln!(
            out,
            " {:>10}{:>10}{:>8}{:>8}{:>12}{:>12}",
            engineering(bin.low),
            engineering(bin.high),
            bin.passed,
            bin.total,
            engineering(bin.efficiency),
            engineering(bin.error),
        )?;
    }
    let (passed, total) = curve.outside;
    if total > 0 {
        writeln!(out, " {:>20}{:>8}{:>8}", "out of range", passed, total)?;
    }
    Ok(())
}

/// Text output facility that mimicks the report's key-value styling
fn writeln_kv(out: &mut impl Write, data: impl ReportItem) -> io::Result<()> {
    write!(out, " ")?;
    data.write(out)?;
    writeln!(out)
}

/// Trait implemented by things which can be printed in the report
trait ReportItem: Sized {
    /// Write down `self` to the report
    fn write(self, out: &mut impl Write) -> io::Result<()>;
}

impl ReportItem for &str {
    // Strings work in the usual way
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl ReportItem for usize {
    // Integers work in the usual way too
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl ReportItem for Float {
    // Floats are printed like %g would
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write_engineering(out, self, SIG_DIGITS)
    }
}

impl<T: ReportItem> ReportItem for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{:<31}: ", self.0)?;
        self.1.write(out)
    }
}

/// Render a float in engineering notation, for use in table columns
fn engineering(x: Float) -> String {
    let mut buffer = Vec::new();
    // Writing to a Vec cannot fail
    let _ = write_engineering(&mut buffer, x, SIG_DIGITS);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Write a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this method switches
/// between naive and scientific notation for floating-point numbers when the
/// number being printed becomes so small that printing leading zeroes could end
/// up larger than the scientific notation, or so large that we would be forced
/// to print more significant digits than requested.
///
fn write_engineering(writer: &mut impl Write, x: Float, sig_digits: usize) -> io::Result<()> {
    let mut precision = sig_digits - 1;
    if x == 0. {
        // Zero is special because you can't take its log
        write!(writer, "0")
    } else {
        // Otherwise, use log to evaluate order of magnitude
        let log_x = x.abs().log10();
        if log_x >= -3. && log_x <= (sig_digits as Float) {
            // Print using naive notation
            //
            // Since Rust's precision controls number of digits after the
            // decimal point, we must adjust it depending on magnitude in order
            // to operate at a constant number of significant digits.
            precision = (precision as isize - log_x.trunc() as isize).max(0) as usize;

            // Numbers smaller than 1 must get one extra digit since the leading
            // zero does not count as a significant digit.
            if log_x < 0. {
                precision += 1
            }

            // People don't normally expect trailing zeros or decimal point in
            // naive notation, but be careful with integer numbers...
            let str_with_zeros = format!("{:.1$}", x, precision);
            if str_with_zeros.contains('.') {
                write!(
                    writer,
                    "{}",
                    str_with_zeros.trim_end_matches('0').trim_end_matches('.')
                )
            } else {
                write!(writer, "{}", str_with_zeros)
            }
        } else {
            // Print using scientific notation
            write!(writer, "{:.1$e}", x, precision)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cutflow::CutFlowAccumulator,
        diagnostics::DiagnosticsAccumulator,
        event::tests::signal_event,
    };

    #[test]
    fn engineering_notation() {
        assert_eq!(engineering(0.), "0");
        assert_eq!(engineering(0.5), "0.5");
        assert_eq!(engineering(0.25), "0.25");
        assert_eq!(engineering(1. / 3.), "0.333333");
        assert_eq!(engineering(1234.5), "1234.5");
        assert_eq!(engineering(1.5e-5), "1.50000e-5");
    }

    #[test]
    fn key_value_columns() {
        let mut out = Vec::new();
        writeln_kv(&mut out, ("Number of events", 42usize)).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert_eq!(line, format!(" {:<31}: 42\n", "Number of events"));
    }

    #[test]
    fn report_lists_every_cut_and_category() {
        let cutflow = CutFlowAccumulator::new().finalize();
        let diagnostics = DiagnosticsAccumulator::default().finalize();
        let mut out = Vec::new();
        write_report(
            &mut out,
            &Configuration::default(),
            &cutflow,
            &diagnostics,
            "2024-01-01T00:00:00Z",
            Duration::from_millis(1500),
        )
        .unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with(" 2024-01-01T00:00:00Z\n"));
        assert!(report.contains("distinct_candidates"));
        assert!(report.contains("Out FV"));
        assert!(report.contains(&format!(" {:<31}: 1.5\n", "Elapsed time (s)")));
        assert!(!report.contains("Time per event"));
    }

    #[test]
    fn report_labels_regions_and_kinematic_bins() {
        let cutflow = CutFlowAccumulator::new().finalize();
        let mut diagnostics = DiagnosticsAccumulator::default();
        diagnostics.integrate(&signal_event());
        let diagnostics = diagnostics.finalize();
        let mut out = Vec::new();
        write_report(
            &mut out,
            &Configuration::default(),
            &cutflow,
            &diagnostics,
            "2024-01-01T00:00:00Z",
            Duration::from_secs(1),
        )
        .unwrap();
        let report = String::from_utf8(out).unwrap();
        let kv = |key: &str, value: &str| format!(" {:<31}: {}\n", key, value);
        assert!(report.contains(&kv("Matching region", "purity >= 0.5, completeness >= 0.1")));
        assert!(report.contains(&kv("Muon hit floor", "50")));
        assert!(report.contains(&kv("Best match region", "purity > 0.5, completeness > 0.1")));
        assert!(report.contains(&kv("Hit-count muon region", "purity > 0.75, completeness > 0.9")));
        assert!(report.contains(" Neutrino energy (GeV)\n"));
        // The 0.5 GeV/c muon lands in the [0.4, 0.6) bin and is not
        // reconstructed
        let muon_bin = format!(" {:>10}{:>10}{:>8}{:>8}{:>12}{:>12}\n", "0.4", "0.6", 0, 1, "0", "0");
        assert!(report.contains(&muon_bin), "{}", report);
    }
}

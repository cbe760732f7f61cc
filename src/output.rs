//! Output formatting module for meterstat
//!
//! This module provides formatters for displaying a [`ChartReport`]:
//! - Table format for human-readable terminal output
//! - JSON format for charts, dashboards and other tools
//!
//! # Examples
//!
//! ```
//! use meterstat::aggregation::{Aggregator, EngineOptions, ReportRequest};
//! use meterstat::output::get_formatter;
//! use meterstat::timezone::TimezoneConfig;
//! use meterstat::types::{Metric, TimeframeSpec};
//!
//! let aggregator = Aggregator::new(EngineOptions::new(TimezoneConfig::utc()));
//! let report = aggregator
//!     .build_report(&[], &ReportRequest::new(TimeframeSpec::yearly(2024)))
//!     .unwrap();
//!
//! // Table formatter for human-readable output
//! let formatter = get_formatter(false, false);
//! assert!(formatter.format_report(&report, Metric::Power).contains("TOTAL"));
//!
//! // JSON formatter for machine-readable output
//! let json_formatter = get_formatter(true, false);
//! assert!(json_formatter.format_report(&report, Metric::Power).contains("\"series\""));
//! ```

use crate::aggregation_types::ChartReport;
use crate::types::{Metric, PeakWindow};
use colored::Colorize;
use prettytable::{Table, format, row};
use serde_json::json;

/// Trait for output formatters
///
/// Implementations can provide different output formats (table, JSON, CSV, etc.).
///
/// # Example Implementation
///
/// ```
/// use meterstat::aggregation_types::ChartReport;
/// use meterstat::output::OutputFormatter;
/// use meterstat::types::Metric;
///
/// struct TotalsOnly;
///
/// impl OutputFormatter for TotalsOnly {
///     fn format_report(&self, report: &ChartReport, metric: Metric) -> String {
///         format!("{:.2} {}", report.totals.total_actual, metric.unit())
///     }
/// }
/// ```
pub trait OutputFormatter {
    /// Format one report for the given metric
    fn format_report(&self, report: &ChartReport, metric: Metric) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    /// Whether to colour the summary lines
    pub color: bool,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn format_value(value: f64) -> String {
        format!("{value:.2}")
    }

    fn series_table(report: &ChartReport, metric: Metric) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        table.set_titles(row![
            b -> "Period",
            b -> format!("Usage ({})", metric.unit()),
            b -> "Cumulative",
            b -> "Baseline",
            b -> "Excess"
        ]);

        for entry in &report.series {
            let usage = if entry.has_data {
                Self::format_value(entry.raw_value)
            } else {
                "-".to_string()
            };
            table.add_row(row![
                entry.label,
                r -> usage,
                r -> Self::format_value(entry.cumulative_actual),
                r -> Self::format_value(entry.cumulative_baseline),
                r -> Self::format_value(entry.excess)
            ]);
        }

        table.add_row(row![
            b -> "TOTAL",
            br -> Self::format_value(report.totals.total_actual),
            br -> Self::format_value(report.totals.total_actual),
            br -> Self::format_value(report.flat_baseline),
            br -> Self::format_value(report.max_excess())
        ]);

        table
    }

    fn peak_table(windows: &[PeakWindow]) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Peak Window", b -> "Hours", b -> "Average", b -> "Peak"]);

        for window in windows {
            table.add_row(row![
                window.label,
                c -> window.bucket_count,
                r -> Self::format_value(window.average_value),
                r -> Self::format_value(window.peak_value)
            ]);
        }

        table
    }

    fn summary(&self, report: &ChartReport, metric: Metric) -> String {
        let unit = metric.unit();
        let totals = &report.totals;
        let mut lines = Vec::new();

        lines.push(format!(
            "Total {}: {} {}",
            metric,
            Self::format_value(totals.total_actual),
            unit
        ));
        lines.push(format!(
            "Baseline: {} {} ({})",
            Self::format_value(totals.total_baseline),
            unit,
            report.baseline_source
        ));

        let verdict = if totals.exceeded() {
            format!(
                "Exceeded baseline by {} {}",
                Self::format_value(-totals.total_saved),
                unit
            )
        } else {
            format!("Saved {} {}", Self::format_value(totals.total_saved), unit)
        };
        lines.push(match (self.color, totals.exceeded()) {
            (false, _) => verdict,
            (true, true) => verdict.red().bold().to_string(),
            (true, false) => verdict.green().bold().to_string(),
        });

        let split = &report.active_inactive;
        lines.push(format!(
            "Active hours: {} {}, inactive hours: {} {} ({})",
            Self::format_value(split.value.active),
            unit,
            Self::format_value(split.value.inactive),
            unit,
            split.source
        ));

        let diagnostics = &report.diagnostics;
        if diagnostics.out_of_period > 0 || diagnostics.skipped_malformed > 0 {
            let note = format!(
                "Ignored {} out-of-period and {} malformed records",
                diagnostics.out_of_period, diagnostics.skipped_malformed
            );
            lines.push(if self.color {
                note.yellow().to_string()
            } else {
                note
            });
        }

        lines.join("\n")
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &ChartReport, metric: Metric) -> String {
        let mut output = format!(
            "{} usage for {} ({})\n\n",
            metric,
            report.timeframe,
            report.timeframe.mode_name()
        );

        if !report.has_data() {
            output.push_str("No data for this timeframe\n\n");
        }

        output.push_str(&Self::series_table(report, metric).to_string());

        if !report.peak_windows.is_empty() {
            output.push('\n');
            output.push_str(&Self::peak_table(&report.peak_windows).to_string());
        }

        output.push('\n');
        output.push_str(&self.summary(report, metric));
        output.push('\n');
        output
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ChartReport, metric: Metric) -> String {
        let output = json!({
            "metric": metric,
            "unit": metric.unit(),
            "timeframe": report.timeframe,
            "buckets": report.buckets,
            "series": report.series,
            "peak_windows": report.peak_windows,
            "active_inactive": {
                "active": report.active_inactive.value.active,
                "inactive": report.active_inactive.value.inactive,
                "source": report.active_inactive.source,
            },
            "totals": report.totals,
            "flat_baseline": report.flat_baseline,
            "baseline_source": report.baseline_source,
            "gradient": report.gradient,
            "diagnostics": report.diagnostics,
        });

        serde_json::to_string_pretty(&output)
            .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
    }
}

/// Get the appropriate formatter based on output format
pub fn get_formatter(json: bool, color: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{Aggregator, EngineOptions, ReportRequest};
    use crate::sources::DataSource;
    use crate::timezone::TimezoneConfig;
    use crate::types::{RawRecord, TimeframeSpec};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn daily_report(baseline: f64) -> ChartReport {
        let records: Vec<RawRecord> = [(8, 5.0), (9, 9.0), (10, 9.0), (20, 1.0)]
            .iter()
            .map(|&(h, v)| RawRecord::new(Utc.with_ymd_and_hms(2024, 1, 15, h, 0, 0).unwrap(), v))
            .collect();
        let request = ReportRequest::new(TimeframeSpec::daily(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        ))
        .with_baseline(DataSource::Configured, Some(baseline));
        Aggregator::new(EngineOptions::new(TimezoneConfig::utc()))
            .build_report(&records, &request)
            .unwrap()
    }

    #[test]
    fn test_value_formatting() {
        assert_eq!(TableFormatter::format_value(12.345), "12.35");
        assert_eq!(TableFormatter::format_value(0.0), "0.00");
        assert_eq!(TableFormatter::format_value(-6.0), "-6.00");
    }

    #[test]
    fn test_table_formatter_daily() {
        let output = TableFormatter::new(false).format_report(&daily_report(144.0), Metric::Power);
        assert!(output.contains("2024-01-15"));
        assert!(output.contains("08:00"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("Usage (kWh)"));
        assert!(output.contains("08:00–10:00"));
        assert!(output.contains("Saved 120.00 kWh"));
        assert!(output.contains("(configured)"));
        assert!(output.contains("Active hours: 23.00 kWh, inactive hours: 1.00 kWh"));
    }

    #[test]
    fn test_table_formatter_exceeded() {
        let output = TableFormatter::new(false).format_report(&daily_report(20.0), Metric::Carbon);
        assert!(output.contains("Exceeded baseline by 4.00 kg CO2e"));
    }

    #[test]
    fn test_table_formatter_empty_report() {
        let report = Aggregator::new(EngineOptions::new(TimezoneConfig::utc()))
            .build_report(&[], &ReportRequest::new(TimeframeSpec::yearly(2024)))
            .unwrap();
        let output = TableFormatter::new(false).format_report(&report, Metric::Power);
        assert!(output.contains("No data for this timeframe"));
        assert!(output.contains("Jan"));
        assert!(!output.contains("Peak Window"));
    }

    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter.format_report(&daily_report(144.0), Metric::Power);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["metric"], "power");
        assert_eq!(parsed["unit"], "kWh");
        assert_eq!(parsed["timeframe"]["mode"], "daily");
        assert_eq!(parsed["series"].as_array().unwrap().len(), 24);
        assert_eq!(parsed["series"][23]["cumulative_actual"], 24.0);
        assert_eq!(parsed["totals"]["total_saved"], 120.0);
        assert_eq!(parsed["peak_windows"][0]["label"], "08:00–10:00");
        assert_eq!(parsed["active_inactive"]["source"], "computed");
        assert_eq!(parsed["baseline_source"], "configured");
    }

    #[test]
    fn test_get_formatter() {
        let report = daily_report(144.0);
        assert!(
            get_formatter(true, false)
                .format_report(&report, Metric::Power)
                .contains("\"series\"")
        );
        assert!(
            get_formatter(false, false)
                .format_report(&report, Metric::Power)
                .contains("TOTAL")
        );
    }
}

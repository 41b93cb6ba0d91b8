use crate::aggregation::{GlucoseBand, GmiBand, GmiSummary, TimeInRangeSummary};
use crate::api::{ApiResponse, DashboardData, DashboardMetadata};
use crate::config::Config;
use crate::error::OutcomesResult;
use std::path::{Path, PathBuf};
use std::fs::File;
use log::info;

/// Everything produced for one period's dashboard.
pub struct DashboardReport<'a> {
    pub response: &'a ApiResponse<DashboardData>,
    pub time_in_range: &'a TimeInRangeSummary,
    pub gmi: &'a GmiSummary,
    pub metadata: &'a DashboardMetadata,
    pub config: &'a Config,
}

pub fn save_dashboard<P: AsRef<Path>>(report: &DashboardReport<'_>, output_dir: P) -> OutcomesResult<Vec<PathBuf>> {
    let output_path = output_dir.as_ref();
    std::fs::create_dir_all(output_path)?;
    let days = report.metadata.selected_period.days();

    let json_path = output_path.join(format!("dashboard_{}d.json", days));
    save_envelope(report.response, &json_path)?;

    let csv_path = output_path.join(format!("buckets_{}d.csv", days));
    save_buckets(report.time_in_range, report.gmi, &csv_path)?;

    let report_path = output_path.join(format!("report_{}d.md", days));
    std::fs::write(&report_path, render_report(report))?;

    info!("Dashboard output saved to {:?}", output_path);
    Ok(vec![json_path, csv_path, report_path])
}

fn save_envelope<P: AsRef<Path>>(response: &ApiResponse<DashboardData>, path: P) -> OutcomesResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, response)?;
    Ok(())
}

fn save_buckets<P: AsRef<Path>>(time_in_range: &TimeInRangeSummary, gmi: &GmiSummary, path: P) -> OutcomesResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["VIEW", "BUCKET", "PERCENT"])?;

    for band in GlucoseBand::ALL {
        writer.write_record([
            "timeInRange".to_string(),
            band.name().to_string(),
            time_in_range.percent(band).to_string(),
        ])?;
    }

    for band in GmiBand::ALL {
        writer.write_record([
            "gmi".to_string(),
            band.name().to_string(),
            gmi.percent(band).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Markdown summary of one period's dashboard.
pub fn render_report(report: &DashboardReport<'_>) -> String {
    let tir = report.time_in_range;
    let gmi = report.gmi;
    let g = &report.config.glucose_ranges;
    let r = &report.config.gmi_ranges;
    let range = &report.metadata.date_range;

    format!(
        r#"# Clinic Outcomes Report

## Overview
- **Period**: {} ({} to {})
- **Active patients**: {} (at least {} readings)
- **Generated**: {}

## Time in Range ({} readings)
| Range | Glucose (mg/dL) | Share |
|---|---|---|
| Very Low | < {} | {}% |
| Low | {} to < {} | {}% |
| Target | {} to {} | {}% |
| High | > {} to {} | {}% |
| Very High | > {} | {}% |

## Glucose Management Indicator ({} readings)
- **Average GMI**: {:.1}%

| Range | GMI | Share |
|---|---|---|
| Target | <= {:.1}% | {}% |
| Above | > {:.1}% to {:.1}% | {}% |
| High | > {:.1}% | {}% |

Percentages are rounded per range and may not add up to exactly 100.
"#,
        report.metadata.selected_period,
        range.start,
        range.end,
        report.response.data.patient_count,
        report.config.min_readings_for_active,
        report.metadata.last_updated.format("%Y-%m-%d %H:%M UTC"),
        tir.total_readings,
        g.very_low_below, tir.very_low,
        g.very_low_below, g.target_min, tir.low,
        g.target_min, g.target_max, tir.target,
        g.target_max, g.high_max, tir.high,
        g.high_max, tir.very_high,
        gmi.total_readings,
        gmi.average_gmi,
        r.target_max, gmi.target,
        r.target_max, r.above_max, gmi.above,
        r.above_max, gmi.high,
    )
}

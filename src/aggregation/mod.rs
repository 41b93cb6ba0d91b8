pub mod time_in_range;
pub mod gmi;

use crate::config::Config;
use log::debug;
use crate::eligibility::{count_eligible_patients, filter_active};
use crate::error::OutcomesResult;
use crate::readings::{validate_readings, Reading};

pub use time_in_range::*;
pub use gmi::*;

/// Reduces raw readings to dashboard summaries using one set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: Config,
}

/// Validated, filtered view of one aggregation call's input.
pub(crate) struct EligibleReadings<'a> {
    pub readings: Vec<&'a Reading>,
    pub active_patient_count: usize,
}

impl Aggregator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn eligible<'a>(&self, readings: &'a [Reading]) -> OutcomesResult<EligibleReadings<'a>> {
        validate_readings(readings)?;

        let min_count = self.config.min_readings_for_active;
        let eligible = filter_active(readings, min_count);
        let active_patient_count = count_eligible_patients(readings, min_count);

        let dropped = readings.len() - eligible.len();
        if dropped > 0 {
            debug!(
                "Dropped {} readings from patients with fewer than {} readings",
                dropped, min_count
            );
        }

        Ok(EligibleReadings {
            readings: eligible,
            active_patient_count,
        })
    }
}

/// Time in Range summary with the default clinical thresholds.
pub fn aggregate_time_in_range(readings: &[Reading]) -> OutcomesResult<TimeInRangeSummary> {
    Aggregator::default().time_in_range(readings)
}

/// GMI summary with the default clinical thresholds.
pub fn aggregate_gmi(readings: &[Reading]) -> OutcomesResult<GmiSummary> {
    Aggregator::default().gmi(readings)
}

/// Whole-number share of `count` in `total`, halves rounded away from zero.
///
/// Each bucket is rounded on its own, so a summary's percentages may add
/// up to 99 or 101.
pub fn percent_of(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

pub fn round_to_one_decimal(value: f64) -> f64 {
    let scaled = value * 10.0;
    if !scaled.is_finite() {
        // Magnitudes this large carry no fractional digits.
        return value;
    }
    scaled.round() / 10.0
}

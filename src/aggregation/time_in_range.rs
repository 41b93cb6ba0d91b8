use serde::{Deserialize, Serialize};
use log::debug;
use super::{percent_of, Aggregator};
use crate::config::GlucoseRanges;
use crate::error::OutcomesResult;
use crate::readings::Reading;

/// Consensus glucose bands used for the stacked Time in Range bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlucoseBand {
    VeryLow,
    Low,
    Target,
    High,
    VeryHigh,
}

impl GlucoseBand {
    pub const ALL: [GlucoseBand; 5] = [
        GlucoseBand::VeryLow,
        GlucoseBand::Low,
        GlucoseBand::Target,
        GlucoseBand::High,
        GlucoseBand::VeryHigh,
    ];

    /// Every finite value lands in exactly one band, including fractional
    /// values between the whole-number edges (69.5 is low, 180.5 is high).
    pub fn classify(value: f64, ranges: &GlucoseRanges) -> Self {
        if value < ranges.very_low_below {
            GlucoseBand::VeryLow
        } else if value < ranges.target_min {
            GlucoseBand::Low
        } else if value <= ranges.target_max {
            GlucoseBand::Target
        } else if value <= ranges.high_max {
            GlucoseBand::High
        } else {
            GlucoseBand::VeryHigh
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GlucoseBand::VeryLow => "veryLow",
            GlucoseBand::Low => "low",
            GlucoseBand::Target => "target",
            GlucoseBand::High => "high",
            GlucoseBand::VeryHigh => "veryHigh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInRangeSummary {
    pub very_low: u32,
    pub low: u32,
    pub target: u32,
    pub high: u32,
    pub very_high: u32,
    pub active_patient_count: usize,
    pub total_readings: usize,
}

impl TimeInRangeSummary {
    pub fn percent(&self, band: GlucoseBand) -> u32 {
        match band {
            GlucoseBand::VeryLow => self.very_low,
            GlucoseBand::Low => self.low,
            GlucoseBand::Target => self.target,
            GlucoseBand::High => self.high,
            GlucoseBand::VeryHigh => self.very_high,
        }
    }

    pub fn percent_sum(&self) -> u32 {
        GlucoseBand::ALL.iter().map(|&band| self.percent(band)).sum()
    }
}

#[derive(Debug, Default)]
struct BandCounts {
    very_low: usize,
    low: usize,
    target: usize,
    high: usize,
    very_high: usize,
}

impl BandCounts {
    fn record(&mut self, band: GlucoseBand) {
        match band {
            GlucoseBand::VeryLow => self.very_low += 1,
            GlucoseBand::Low => self.low += 1,
            GlucoseBand::Target => self.target += 1,
            GlucoseBand::High => self.high += 1,
            GlucoseBand::VeryHigh => self.very_high += 1,
        }
    }
}

impl Aggregator {
    pub fn time_in_range(&self, readings: &[Reading]) -> OutcomesResult<TimeInRangeSummary> {
        let eligible = self.eligible(readings)?;
        let total = eligible.readings.len();

        if total == 0 {
            return Ok(TimeInRangeSummary::default());
        }

        let ranges = &self.config().glucose_ranges;
        let mut counts = BandCounts::default();
        for reading in &eligible.readings {
            counts.record(GlucoseBand::classify(reading.value, ranges));
        }
        debug!("Time in Range band counts over {} readings: {:?}", total, counts);

        Ok(TimeInRangeSummary {
            very_low: percent_of(counts.very_low, total),
            low: percent_of(counts.low, total),
            target: percent_of(counts.target, total),
            high: percent_of(counts.high, total),
            very_high: percent_of(counts.very_high, total),
            active_patient_count: eligible.active_patient_count,
            total_readings: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate_time_in_range;

    fn patient(pid: &str, values: &[f64]) -> Vec<Reading> {
        values.iter().map(|&v| Reading::new(pid, v)).collect()
    }

    fn band_of(value: f64) -> GlucoseBand {
        GlucoseBand::classify(value, &GlucoseRanges::default())
    }

    #[test]
    fn test_single_patient_all_in_target() {
        let summary = aggregate_time_in_range(&patient("P1", &[142.0, 156.0, 128.0])).unwrap();
        assert_eq!(summary, TimeInRangeSummary {
            target: 100,
            active_patient_count: 1,
            total_readings: 3,
            ..TimeInRangeSummary::default()
        });
    }

    #[test]
    fn test_patient_with_two_readings_is_excluded() {
        let summary = aggregate_time_in_range(&patient("P1", &[50.0, 50.0])).unwrap();
        assert_eq!(summary.total_readings, 0);
        assert_eq!(summary.active_patient_count, 0);
        assert_eq!(summary.very_low, 0);
    }

    #[test]
    fn test_empty_input() {
        let summary = aggregate_time_in_range(&[]).unwrap();
        assert_eq!(summary, TimeInRangeSummary::default());
        assert_eq!(summary.percent_sum(), 0);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(band_of(53.9), GlucoseBand::VeryLow);
        assert_eq!(band_of(54.0), GlucoseBand::Low);
        assert_eq!(band_of(69.0), GlucoseBand::Low);
        assert_eq!(band_of(69.5), GlucoseBand::Low);
        assert_eq!(band_of(70.0), GlucoseBand::Target);
        assert_eq!(band_of(180.0), GlucoseBand::Target);
        assert_eq!(band_of(180.5), GlucoseBand::High);
        assert_eq!(band_of(181.0), GlucoseBand::High);
        assert_eq!(band_of(250.0), GlucoseBand::High);
        assert_eq!(band_of(250.1), GlucoseBand::VeryHigh);
        assert_eq!(band_of(-5.0), GlucoseBand::VeryLow);
        assert_eq!(band_of(0.0), GlucoseBand::VeryLow);
    }

    #[test]
    fn test_boundary_readings_through_aggregation() {
        let summary = aggregate_time_in_range(&patient("P1", &[69.0, 70.0, 180.0, 181.0])).unwrap();
        assert_eq!(summary.low, 25);
        assert_eq!(summary.target, 50);
        assert_eq!(summary.high, 25);
        assert_eq!(summary.very_low + summary.very_high, 0);
    }

    #[test]
    fn test_only_eligible_readings_are_counted() {
        let mut readings = patient("P1", &[142.0, 156.0, 128.0]);
        readings.extend(patient("P2", &[40.0, 45.0]));

        let summary = aggregate_time_in_range(&readings).unwrap();
        assert_eq!(summary.target, 100);
        assert_eq!(summary.very_low, 0);
        assert_eq!(summary.total_readings, 3);
        assert_eq!(summary.active_patient_count, 1);
    }

    #[test]
    fn test_sum_stays_near_100() {
        let mut readings = patient("P1", &[50.0, 60.0, 100.0]);
        readings.extend(patient("P2", &[200.0, 300.0, 310.0, 120.0]));

        let summary = aggregate_time_in_range(&readings).unwrap();
        assert!((99..=101).contains(&summary.percent_sum()), "sum {}", summary.percent_sum());
    }

    #[test]
    fn test_order_insensitive_and_idempotent() {
        let mut readings = patient("P1", &[50.0, 60.0, 100.0, 240.0]);
        readings.extend(patient("P2", &[200.0, 300.0, 120.0]));

        let first = aggregate_time_in_range(&readings).unwrap();
        assert_eq!(first, aggregate_time_in_range(&readings).unwrap());

        readings.reverse();
        assert_eq!(first, aggregate_time_in_range(&readings).unwrap());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let readings = patient("P1", &[120.0, f64::INFINITY, 130.0]);
        assert!(aggregate_time_in_range(&readings).is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let summary = aggregate_time_in_range(&patient("P1", &[50.0, 60.0, 300.0])).unwrap();
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["veryLow"], 33);
        assert_eq!(json["veryHigh"], 33);
        assert_eq!(json["activePatientCount"], 1);
    }
}

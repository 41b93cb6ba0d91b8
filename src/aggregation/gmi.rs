use serde::{Deserialize, Serialize};
use log::debug;
use super::{percent_of, round_to_one_decimal, Aggregator};
use crate::config::GmiRanges;
use crate::error::OutcomesResult;
use crate::readings::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GmiBand {
    Target,
    Above,
    High,
}

impl GmiBand {
    pub const ALL: [GmiBand; 3] = [GmiBand::Target, GmiBand::Above, GmiBand::High];

    pub fn classify(value: f64, ranges: &GmiRanges) -> Self {
        if value <= ranges.target_max {
            GmiBand::Target
        } else if value <= ranges.above_max {
            GmiBand::Above
        } else {
            GmiBand::High
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GmiBand::Target => "target",
            GmiBand::Above => "above",
            GmiBand::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmiSummary {
    pub target: u32,
    pub above: u32,
    pub high: u32,
    #[serde(rename = "averageGMI")]
    pub average_gmi: f64,
    pub active_patient_count: usize,
    pub total_readings: usize,
}

impl GmiSummary {
    pub fn percent(&self, band: GmiBand) -> u32 {
        match band {
            GmiBand::Target => self.target,
            GmiBand::Above => self.above,
            GmiBand::High => self.high,
        }
    }

    pub fn percent_sum(&self) -> u32 {
        self.target + self.above + self.high
    }
}

impl Aggregator {
    pub fn gmi(&self, readings: &[Reading]) -> OutcomesResult<GmiSummary> {
        let eligible = self.eligible(readings)?;
        let total = eligible.readings.len();

        if total == 0 {
            return Ok(GmiSummary::default());
        }

        let ranges = &self.config().gmi_ranges;
        let (mut target, mut above, mut high) = (0usize, 0usize, 0usize);

        // Sorted so the mean does not depend on input order.
        let mut values: Vec<f64> = eligible.readings.iter().map(|r| r.value).collect();
        values.sort_by(f64::total_cmp);

        let mut average = 0.0;
        for (i, &value) in values.iter().enumerate() {
            let n = (i + 1) as f64;
            average += value / n - average / n;
            match GmiBand::classify(value, ranges) {
                GmiBand::Target => target += 1,
                GmiBand::Above => above += 1,
                GmiBand::High => high += 1,
            }
        }

        debug!(
            "GMI over {} readings: mean {:.3}, target {} above {} high {}",
            total, average, target, above, high
        );

        Ok(GmiSummary {
            target: percent_of(target, total),
            above: percent_of(above, total),
            high: percent_of(high, total),
            average_gmi: round_to_one_decimal(average),
            active_patient_count: eligible.active_patient_count,
            total_readings: total,
        })
    }
}

//! Response envelopes served to the dashboard.
//!
//! Each endpoint has exactly one payload type. The aggregation engine never
//! sees these shapes; they are built from its summaries after the fact.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use crate::aggregation::{GmiSummary, TimeInRangeSummary};
use crate::period::Period;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInRangeBreakdown {
    pub very_low: u32,
    pub low: u32,
    pub target: u32,
    pub high: u32,
    pub very_high: u32,
}

impl From<&TimeInRangeSummary> for TimeInRangeBreakdown {
    fn from(summary: &TimeInRangeSummary) -> Self {
        Self {
            very_low: summary.very_low,
            low: summary.low,
            target: summary.target,
            high: summary.high,
            very_high: summary.very_high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GmiBreakdown {
    #[serde(rename = "averageGMI")]
    pub average_gmi: f64,
    pub target: u32,
    pub above: u32,
    pub high: u32,
}

impl From<&GmiSummary> for GmiBreakdown {
    fn from(summary: &GmiSummary) -> Self {
        Self {
            average_gmi: summary.average_gmi,
            target: summary.target,
            above: summary.above,
            high: summary.high,
        }
    }
}

/// Payload of `GET /api/clinic-outcomes/time-in-range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInRangeData {
    pub patient_count: usize,
    pub period: Period,
    pub data_generated_date: NaiveDate,
    pub time_in_range: TimeInRangeBreakdown,
}

/// Payload of `GET /api/clinic-outcomes/gmi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmiData {
    pub patient_count: usize,
    pub period: Period,
    pub data_generated_date: NaiveDate,
    pub gmi: GmiBreakdown,
}

/// Payload of `GET /api/clinic-outcomes/dashboard`, both views at once.
/// `patient_count` is the Time in Range active-patient count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub patient_count: usize,
    pub period: Period,
    pub data_generated_date: NaiveDate,
    pub time_in_range: TimeInRangeBreakdown,
    pub gmi: GmiBreakdown,
}

impl DashboardData {
    pub fn from_summaries(
        period: Period,
        time_in_range: &TimeInRangeSummary,
        gmi: &GmiSummary,
        generated: NaiveDate,
    ) -> Self {
        Self {
            patient_count: time_in_range.active_patient_count,
            period,
            data_generated_date: generated,
            time_in_range: TimeInRangeBreakdown::from(time_in_range),
            gmi: GmiBreakdown::from(gmi),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetadata {
    pub date_range: DateRange,
    pub last_updated: DateTime<Utc>,
    pub selected_period: Period,
}

impl DashboardMetadata {
    pub fn for_period(period: Period, now: DateTime<Utc>) -> Self {
        let (start, end) = period.date_range(now.date_naive());
        Self {
            date_range: DateRange { start, end },
            last_updated: now,
            selected_period: period,
        }
    }
}

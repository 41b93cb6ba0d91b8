use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use crate::aggregation::{Aggregator, GmiSummary, TimeInRangeSummary};
use crate::api::{
    ApiResponse, DashboardData, GmiBreakdown, GmiData,
    TimeInRangeBreakdown, TimeInRangeData,
};
use crate::error::OutcomesResult;
use crate::period::Period;
use crate::source::ReadingSource;

pub fn dashboard_response(
    period: Period,
    time_in_range: &TimeInRangeSummary,
    gmi: &GmiSummary,
    now: DateTime<Utc>,
) -> ApiResponse<DashboardData> {
    let data = DashboardData::from_summaries(period, time_in_range, gmi, now.date_naive());
    let message = format!("Dashboard data for {} days retrieved successfully", period.days());
    ApiResponse::ok(data, message, now)
}

/// Routes handled by [`ClinicOutcomesService::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TimeInRange,
    Gmi,
    Dashboard,
}

impl Endpoint {
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
        let path = path.trim_end_matches('/');
        if path.ends_with("clinic-outcomes/time-in-range") {
            Some(Endpoint::TimeInRange)
        } else if path.ends_with("clinic-outcomes/gmi") {
            Some(Endpoint::Gmi)
        } else if path.ends_with("clinic-outcomes/dashboard") {
            Some(Endpoint::Dashboard)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EndpointResponse {
    TimeInRange(ApiResponse<TimeInRangeData>),
    Gmi(ApiResponse<GmiData>),
    Dashboard(ApiResponse<DashboardData>),
}

/// Loads readings for a period and turns them into response envelopes.
pub struct ClinicOutcomesService<S: ReadingSource> {
    source: S,
    aggregator: Aggregator,
}

impl<S: ReadingSource> ClinicOutcomesService<S> {
    pub fn new(source: S, aggregator: Aggregator) -> Self {
        Self { source, aggregator }
    }

    pub fn time_in_range(&self, period: Period, now: DateTime<Utc>) -> OutcomesResult<ApiResponse<TimeInRangeData>> {
        let readings = self.source.time_in_range_readings(period)?;
        let summary = self.aggregator.time_in_range(&readings)?;
        info!(
            "Time in Range for {}: {} active patients, {} readings",
            period, summary.active_patient_count, summary.total_readings
        );

        let data = TimeInRangeData {
            patient_count: summary.active_patient_count,
            period,
            data_generated_date: now.date_naive(),
            time_in_range: TimeInRangeBreakdown::from(&summary),
        };
        let message = format!("Time in Range data for {} days retrieved successfully", period.days());
        Ok(ApiResponse::ok(data, message, now))
    }

    pub fn gmi(&self, period: Period, now: DateTime<Utc>) -> OutcomesResult<ApiResponse<GmiData>> {
        let readings = self.source.gmi_readings(period)?;
        let summary = self.aggregator.gmi(&readings)?;
        info!(
            "GMI for {}: {} active patients, average {:.1}",
            period, summary.active_patient_count, summary.average_gmi
        );

        let data = GmiData {
            patient_count: summary.active_patient_count,
            period,
            data_generated_date: now.date_naive(),
            gmi: GmiBreakdown::from(&summary),
        };
        let message = format!("GMI data for {} days retrieved successfully", period.days());
        Ok(ApiResponse::ok(data, message, now))
    }

    /// Both summaries for one period, without an envelope.
    pub fn summarize(&self, period: Period) -> OutcomesResult<(TimeInRangeSummary, GmiSummary)> {
        let time_in_range = self.aggregator.time_in_range(&self.source.time_in_range_readings(period)?)?;
        let gmi = self.aggregator.gmi(&self.source.gmi_readings(period)?)?;
        Ok((time_in_range, gmi))
    }

    pub fn dashboard(&self, period: Period, now: DateTime<Utc>) -> OutcomesResult<ApiResponse<DashboardData>> {
        let (time_in_range, gmi) = self.summarize(period)?;
        Ok(dashboard_response(period, &time_in_range, &gmi, now))
    }

    /// Serves a request URL such as `/api/clinic-outcomes/gmi?period=60`.
    /// Returns `Ok(None)` for URLs outside the clinic-outcomes routes.
    pub fn handle(&self, url: &str, now: DateTime<Utc>) -> OutcomesResult<Option<EndpointResponse>> {
        let endpoint = match Endpoint::from_url(url) {
            Some(endpoint) => endpoint,
            None => return Ok(None),
        };
        let period = Period::from_query(url);

        let response = match endpoint {
            Endpoint::TimeInRange => EndpointResponse::TimeInRange(self.time_in_range(period, now)?),
            Endpoint::Gmi => EndpointResponse::Gmi(self.gmi(period, now)?),
            Endpoint::Dashboard => EndpointResponse::Dashboard(self.dashboard(period, now)?),
        };
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readings::Reading;
    use crate::source::{InMemorySource, PeriodReadings};
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn patient(pid: &str, values: &[f64]) -> Vec<Reading> {
        values.iter().map(|&v| Reading::new(pid, v)).collect()
    }

    fn service() -> ClinicOutcomesService<InMemorySource> {
        let mut tir = patient("P001", &[163.0, 186.0, 62.0, 69.0, 195.0]);
        tir.extend(patient("P006", &[162.0, 63.0, 107.0]));
        tir.extend(patient("P101", &[145.0, 172.0]));

        let mut gmi = patient("P001", &[6.8, 6.9, 6.2, 6.4, 7.1]);
        gmi.extend(patient("P006", &[6.7, 6.2, 6.5]));
        gmi.extend(patient("P102", &[6.5]));

        let source = InMemorySource::new().with_period(
            Period::Days30,
            PeriodReadings { time_in_range: tir, gmi },
        );
        ClinicOutcomesService::new(source, Aggregator::default())
    }

    #[test]
    fn test_time_in_range_response() {
        let response = service().time_in_range(Period::Days30, now()).unwrap();
        assert!(response.success);
        assert_eq!(response.data.patient_count, 2);
        // 8 eligible readings: 3 low, 3 target, 2 high
        assert_eq!(response.data.time_in_range.low, 38);
        assert_eq!(response.data.time_in_range.target, 38);
        assert_eq!(response.data.time_in_range.high, 25);
        assert_eq!(response.timestamp, now());
    }

    #[test]
    fn test_gmi_response() {
        let response = service().gmi(Period::Days30, now()).unwrap();
        assert_eq!(response.data.patient_count, 2);
        assert_eq!(response.data.gmi.above, 13);
        assert_eq!(response.data.gmi.target, 88);
        assert_relative_eq!(response.data.gmi.average_gmi, 6.6);
    }

    #[test]
    fn test_handle_routes_and_normalises_period() {
        let service = service();

        match service.handle("/api/clinic-outcomes/gmi?period=45", now()).unwrap() {
            Some(EndpointResponse::Gmi(response)) => assert_eq!(response.data.period, Period::Days30),
            other => panic!("unexpected response {:?}", other),
        }

        match service.handle("/api/clinic-outcomes/dashboard?period=90", now()).unwrap() {
            Some(EndpointResponse::Dashboard(response)) => {
                assert_eq!(response.data.period, Period::Days90);
                assert_eq!(response.data.patient_count, 0);
                assert_eq!(response.data.time_in_range, TimeInRangeBreakdown::from(&TimeInRangeSummary::default()));
            }
            other => panic!("unexpected response {:?}", other),
        }

        assert!(service.handle("/api/patients", now()).unwrap().is_none());
    }

    #[test]
    fn test_endpoint_from_url() {
        assert_eq!(Endpoint::from_url("/api/clinic-outcomes/time-in-range?period=30"), Some(Endpoint::TimeInRange));
        assert_eq!(Endpoint::from_url("/api/clinic-outcomes/dashboard"), Some(Endpoint::Dashboard));
        assert_eq!(Endpoint::from_url("/api/clinic-outcomes/other"), None);
        assert_eq!(Endpoint::from_url("/api/clinic-outcomes/gmi/"), Some(Endpoint::Gmi));
        assert_eq!(Endpoint::from_url("/api/clinic-outcomes/gmi#chart"), Some(Endpoint::Gmi));
        assert_eq!(Endpoint::from_url("/api/clinic-outcomes/gmi/?period=60#chart"), Some(Endpoint::Gmi));
    }

    #[test]
    fn test_handle_trailing_slash_and_fragment() {
        match service().handle("/api/clinic-outcomes/dashboard/?period=60#summary", now()).unwrap() {
            Some(EndpointResponse::Dashboard(response)) => assert_eq!(response.data.period, Period::Days60),
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_untagged_serialization_is_plain_envelope() {
        let response = service().handle("/api/clinic-outcomes/time-in-range", now()).unwrap().unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"]["timeInRange"]["target"], 38);
        assert_eq!(json["message"], "Time in Range data for 30 days retrieved successfully");
    }
}

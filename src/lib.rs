//! Time in Range and GMI aggregation for clinic outcome dashboards.
//!
//! The [`aggregation`] module holds the pure reduction from raw readings to
//! summaries. Everything else loads readings, wraps summaries in response
//! envelopes, or writes them to disk.

pub mod aggregation;
pub mod api;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod output;
pub mod period;
pub mod readings;
pub mod service;
pub mod simulation;
pub mod source;

pub use aggregation::{aggregate_gmi, aggregate_time_in_range, Aggregator, GmiSummary, TimeInRangeSummary};
pub use config::Config;
pub use eligibility::{count_eligible_patients, filter_active};
pub use error::{OutcomesError, OutcomesResult};
pub use period::Period;
pub use readings::Reading;

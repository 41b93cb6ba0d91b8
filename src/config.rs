use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{OutcomesError, OutcomesResult};

/// Thresholds shared by the aggregators and the cohort generator.
///
/// All clinical boundaries live here so both views read from a single
/// source instead of carrying their own copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub glucose_ranges: GlucoseRanges,
    pub gmi_ranges: GmiRanges,
    pub min_readings_for_active: usize,
    pub cohort: CohortConfig,
}

/// Glucose band boundaries in mg/dL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlucoseRanges {
    pub very_low_below: f64,  // exclusive upper bound of very low
    pub target_min: f64,      // inclusive lower bound of target
    pub target_max: f64,      // inclusive upper bound of target
    pub high_max: f64,        // inclusive upper bound of high
}

/// GMI band boundaries in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmiRanges {
    pub target_max: f64,
    pub above_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    pub active_patients: usize,
    pub inactive_patients: usize,
    pub readings_per_30_days: usize,
    pub glucose_mean: f64,
    pub glucose_sd: f64,
    pub gmi_mean: f64,
    pub gmi_sd: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            glucose_ranges: GlucoseRanges::default(),
            gmi_ranges: GmiRanges::default(),
            min_readings_for_active: 3,
            cohort: CohortConfig::default(),
        }
    }
}

impl Default for GlucoseRanges {
    fn default() -> Self {
        Self {
            very_low_below: 54.0,
            target_min: 70.0,
            target_max: 180.0,
            high_max: 250.0,
        }
    }
}

impl Default for GmiRanges {
    fn default() -> Self {
        Self {
            target_max: 7.0,
            above_max: 8.0,
        }
    }
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            active_patients: 10,
            inactive_patients: 5,
            readings_per_30_days: 4,
            glucose_mean: 150.0,
            glucose_sd: 45.0,
            gmi_mean: 6.8,
            gmi_sd: 0.4,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> OutcomesResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OutcomesResult<()> {
        if self.min_readings_for_active == 0 {
            return Err(OutcomesError::Config(
                "min_readings_for_active must be at least 1".to_string()
            ));
        }

        self.validate_glucose_ranges()?;
        self.validate_gmi_ranges()?;
        self.validate_cohort()?;

        Ok(())
    }

    fn validate_glucose_ranges(&self) -> OutcomesResult<()> {
        let r = &self.glucose_ranges;
        let bounds = [
            ("very_low_below", r.very_low_below),
            ("target_min", r.target_min),
            ("target_max", r.target_max),
            ("high_max", r.high_max),
        ];
        ensure_increasing("glucose_ranges", &bounds)
    }

    fn validate_gmi_ranges(&self) -> OutcomesResult<()> {
        let r = &self.gmi_ranges;
        let bounds = [("target_max", r.target_max), ("above_max", r.above_max)];
        ensure_increasing("gmi_ranges", &bounds)
    }

    fn validate_cohort(&self) -> OutcomesResult<()> {
        let c = &self.cohort;
        if c.readings_per_30_days < self.min_readings_for_active {
            return Err(OutcomesError::Config(format!(
                "cohort.readings_per_30_days ({}) is below min_readings_for_active ({})",
                c.readings_per_30_days, self.min_readings_for_active
            )));
        }

        if !(c.glucose_sd.is_finite() && c.glucose_sd >= 0.0)
            || !(c.gmi_sd.is_finite() && c.gmi_sd >= 0.0)
        {
            return Err(OutcomesError::Config(
                "cohort standard deviations must be finite and non-negative".to_string()
            ));
        }

        if !c.glucose_mean.is_finite() || !c.gmi_mean.is_finite() {
            return Err(OutcomesError::Config(
                "cohort means must be finite".to_string()
            ));
        }

        Ok(())
    }
}

fn ensure_increasing(section: &str, bounds: &[(&str, f64)]) -> OutcomesResult<()> {
    for (name, value) in bounds {
        if !value.is_finite() {
            return Err(OutcomesError::Config(
                format!("{}.{} must be finite", section, name)
            ));
        }
    }

    for pair in bounds.windows(2) {
        let (lower_name, lower) = pair[0];
        let (upper_name, upper) = pair[1];
        if lower >= upper {
            return Err(OutcomesError::Config(format!(
                "{}.{} ({}) must be below {}.{} ({})",
                section, lower_name, lower, section, upper_name, upper
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_readings_for_active, 3);
        assert_eq!(config.glucose_ranges.target_min, 70.0);
        assert_eq!(config.gmi_ranges.above_max, 8.0);
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let config = Config {
            min_readings_for_active: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(OutcomesError::Config(_))));
    }

    #[test]
    fn test_rejects_overlapping_glucose_bounds() {
        let mut config = Config::default();
        config.glucose_ranges.target_max = 60.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("target_min"));
    }

    #[test]
    fn test_rejects_non_finite_gmi_bound() {
        let mut config = Config::default();
        config.gmi_ranges.above_max = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "min_readings_for_active": 4, "gmi_ranges": {{ "target_max": 6.5 }} }}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.min_readings_for_active, 4);
        assert_eq!(config.gmi_ranges.target_max, 6.5);
        assert_eq!(config.gmi_ranges.above_max, 8.0);
        assert_eq!(config.glucose_ranges, GlucoseRanges::default());
    }
}

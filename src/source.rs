use std::collections::HashMap;
use std::path::{Path, PathBuf};
use log::{debug, info};
use crate::error::{OutcomesError, OutcomesResult};
use crate::period::Period;
use crate::readings::{load_readings, save_readings, Reading};

/// Which of the two reading sets a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TimeInRange,
    Gmi,
}

impl Metric {
    pub fn file_stem(self, period: Period) -> String {
        let prefix = match self {
            Metric::TimeInRange => "time_in_range",
            Metric::Gmi => "gmi",
        };
        format!("{}_{}d", prefix, period.days())
    }
}

/// Supplies the raw readings behind each period's dashboard.
pub trait ReadingSource {
    fn readings(&self, metric: Metric, period: Period) -> OutcomesResult<Vec<Reading>>;

    fn time_in_range_readings(&self, period: Period) -> OutcomesResult<Vec<Reading>> {
        self.readings(Metric::TimeInRange, period)
    }

    fn gmi_readings(&self, period: Period) -> OutcomesResult<Vec<Reading>> {
        self.readings(Metric::Gmi, period)
    }
}

/// Both reading sets for one period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodReadings {
    pub time_in_range: Vec<Reading>,
    pub gmi: Vec<Reading>,
}

/// Reading sets held in memory. A period with nothing registered yields
/// empty collections.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    periods: HashMap<Period, PeriodReadings>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, period: Period, readings: PeriodReadings) {
        self.periods.insert(period, readings);
    }

    pub fn with_period(mut self, period: Period, readings: PeriodReadings) -> Self {
        self.insert(period, readings);
        self
    }
}

impl ReadingSource for InMemorySource {
    fn readings(&self, metric: Metric, period: Period) -> OutcomesResult<Vec<Reading>> {
        let readings = match self.periods.get(&period) {
            Some(set) => match metric {
                Metric::TimeInRange => set.time_in_range.clone(),
                Metric::Gmi => set.gmi.clone(),
            },
            None => Vec::new(),
        };
        Ok(readings)
    }
}

/// Pre-partitioned reading files in one directory, e.g.
/// `time_in_range_30d.csv` or `gmi_90d.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn locate(&self, metric: Metric, period: Period) -> OutcomesResult<PathBuf> {
        let stem = metric.file_stem(period);
        for extension in ["csv", "json"] {
            let candidate = self.root.join(format!("{}.{}", stem, extension));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(OutcomesError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no {}.csv or {}.json in {:?}", stem, stem, self.root),
        )))
    }

    /// Writes both reading sets for `period` as CSV files.
    pub fn write_period(&self, period: Period, readings: &PeriodReadings) -> OutcomesResult<()> {
        std::fs::create_dir_all(&self.root)?;

        for (metric, set) in [
            (Metric::TimeInRange, &readings.time_in_range),
            (Metric::Gmi, &readings.gmi),
        ] {
            let path = self.root.join(format!("{}.csv", metric.file_stem(period)));
            save_readings(set, &path)?;
            debug!("Wrote {} readings to {:?}", set.len(), path);
        }

        Ok(())
    }
}

impl ReadingSource for DirectorySource {
    fn readings(&self, metric: Metric, period: Period) -> OutcomesResult<Vec<Reading>> {
        let path = self.locate(metric, period)?;
        let readings = load_readings(&path)?;
        info!("Loaded {} {:?} readings from {:?}", readings.len(), metric, path);
        Ok(readings)
    }
}

pub mod profile;
pub mod variability;

use std::collections::BTreeMap;
use crate::config::Config;
use crate::error::OutcomesResult;
use crate::period::Period;
use crate::readings::Reading;
use crate::source::{InMemorySource, PeriodReadings};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use log::{info, debug};

pub use profile::*;
pub use variability::*;

/// Synthetic reading sets for every period. Each longer period contains
/// all readings of the shorter ones.
#[derive(Debug, Clone, Default)]
pub struct Cohort {
    pub profiles: Vec<PatientProfile>,
    pub periods: BTreeMap<Period, PeriodReadings>,
}

impl From<Cohort> for InMemorySource {
    fn from(cohort: Cohort) -> Self {
        let mut source = InMemorySource::new();
        for (period, readings) in cohort.periods {
            source.insert(period, readings);
        }
        source
    }
}

pub struct CohortSimulator {
    config: Config,
    rng: StdRng,
}

impl CohortSimulator {
    pub fn new(config: Config, seed: Option<u64>) -> OutcomesResult<Self> {
        config.validate()?;

        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Ok(Self { config, rng })
    }

    pub fn simulate(&mut self) -> OutcomesResult<Cohort> {
        let cohort = self.config.cohort.clone();
        info!(
            "Simulating cohort of {} active and {} inactive patients",
            cohort.active_patients, cohort.inactive_patients
        );

        let mut profiles = self.generate_profiles(cohort.active_patients, true, 1)?;
        let mut periods = BTreeMap::new();
        let mut running = PeriodReadings::default();
        let mut next_inactive = (cohort.active_patients + 1).max(101);

        for period in Period::ALL {
            for profile in &profiles {
                if profile.active {
                    self.push_readings(profile, cohort.readings_per_30_days, &mut running)?;
                }
            }

            // every window brings its own short-lived patients
            let inactive = self.generate_profiles(cohort.inactive_patients, false, next_inactive)?;
            next_inactive += inactive.len();
            for profile in &inactive {
                let count = self.inactive_reading_count();
                self.push_readings(profile, count, &mut running)?;
            }
            profiles.extend(inactive);

            debug!(
                "{}: {} Time in Range and {} GMI readings",
                period, running.time_in_range.len(), running.gmi.len()
            );
            periods.insert(period, running.clone());
        }

        Ok(Cohort { profiles, periods })
    }

    fn generate_profiles(&mut self, count: usize, active: bool, first_number: usize) -> OutcomesResult<Vec<PatientProfile>> {
        let cohort = &self.config.cohort;
        let (glucose_mean, glucose_sd) = (cohort.glucose_mean, cohort.glucose_sd / 2.0);
        let (gmi_mean, gmi_sd) = (cohort.gmi_mean, cohort.gmi_sd / 2.0);

        let mut profiles = Vec::with_capacity(count);
        for offset in 0..count {
            profiles.push(PatientProfile {
                patient_id: PatientProfile::patient_id_for(first_number + offset),
                glucose_center: sample_clamped(&mut self.rng, glucose_mean, glucose_sd, 60.0, 300.0)?,
                gmi_center: sample_clamped(&mut self.rng, gmi_mean, gmi_sd, 5.0, 10.0)?,
                active,
            });
        }

        Ok(profiles)
    }

    /// Strictly below the activity threshold, so the filter drops them.
    fn inactive_reading_count(&mut self) -> usize {
        let min = self.config.min_readings_for_active;
        if min <= 1 {
            0
        } else {
            self.rng.gen_range(1..min)
        }
    }

    fn push_readings(&mut self, profile: &PatientProfile, count: usize, out: &mut PeriodReadings) -> OutcomesResult<()> {
        let glucose_sd = self.config.cohort.glucose_sd;
        let gmi_sd = self.config.cohort.gmi_sd;

        for _ in 0..count {
            let glucose = sample_glucose(&mut self.rng, profile.glucose_center, glucose_sd)?;
            let gmi = sample_gmi(&mut self.rng, profile.gmi_center, gmi_sd)?;
            out.time_in_range.push(Reading::new(profile.patient_id.clone(), glucose));
            out.gmi.push(Reading::new(profile.patient_id.clone(), gmi));
        }

        Ok(())
    }
}

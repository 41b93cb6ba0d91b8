//! Active-patient filtering shared by both aggregation views.
//!
//! A patient is "active" when they contribute at least `min_count` readings
//! to the supplied collection. Readings from inactive patients are dropped
//! before any statistic is computed.

use std::collections::HashMap;
use crate::readings::Reading;

/// Readings grouped per patient, patients in first-seen order.
fn group_by_patient(readings: &[Reading]) -> Vec<Vec<&Reading>> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Reading>> = Vec::new();

    for reading in readings {
        let slot = *slots.entry(reading.patient_id.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(reading);
    }

    groups
}

/// Keeps every reading whose patient has at least `min_count` readings.
///
/// Output is grouped by patient (first appearance order) with input order
/// preserved within each patient.
pub fn filter_active(readings: &[Reading], min_count: usize) -> Vec<&Reading> {
    group_by_patient(readings)
        .into_iter()
        .filter(|group| group.len() >= min_count)
        .flatten()
        .collect()
}

/// Number of distinct patients that [`filter_active`] would keep.
pub fn count_eligible_patients(readings: &[Reading], min_count: usize) -> usize {
    group_by_patient(readings)
        .iter()
        .filter(|group| group.len() >= min_count)
        .count()
}

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{OutcomesError, OutcomesResult};

/// A single glucose (mg/dL) or GMI (%) value attributed to a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "pid", alias = "patientId", alias = "patient_id")]
    pub patient_id: String,
    pub value: f64,
}

impl Reading {
    pub fn new(patient_id: impl Into<String>, value: f64) -> Self {
        Self {
            patient_id: patient_id.into(),
            value,
        }
    }
}

/// Rejects readings the aggregators cannot bucket: empty patient ids and
/// non-finite values.
pub fn validate_readings(readings: &[Reading]) -> OutcomesResult<()> {
    for (index, reading) in readings.iter().enumerate() {
        if reading.patient_id.trim().is_empty() {
            return Err(OutcomesError::InvalidReading {
                index,
                reason: "patient id is empty".to_string(),
            });
        }

        if !reading.value.is_finite() {
            return Err(OutcomesError::InvalidReading {
                index,
                reason: format!("value {} for patient {} is not finite", reading.value, reading.patient_id),
            });
        }
    }

    Ok(())
}

/// Loads readings from a `.json` array or a `pid,value` CSV file.
pub fn load_readings<P: AsRef<Path>>(path: P) -> OutcomesResult<Vec<Reading>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let content = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&content)?);
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut readings = Vec::new();
    for record in reader.deserialize() {
        let reading: Reading = record?;
        readings.push(reading);
    }

    Ok(readings)
}

pub fn save_readings<P: AsRef<Path>>(readings: &[Reading], path: P) -> OutcomesResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for reading in readings {
        writer.serialize(reading)?;
    }

    writer.flush()?;
    Ok(())
}

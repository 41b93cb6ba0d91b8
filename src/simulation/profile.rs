use serde::{Deserialize, Serialize};

/// Per-patient centre values the readings scatter around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub patient_id: String,
    pub glucose_center: f64,
    pub gmi_center: f64,
    pub active: bool,
}

impl PatientProfile {
    pub fn patient_id_for(number: usize) -> String {
        format!("P{:03}", number)
    }
}

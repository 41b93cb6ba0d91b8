use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutcomesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid reading at index {index}: {reason}")]
    InvalidReading { index: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Random number generation error")]
    Random,
}

pub type OutcomesResult<T> = Result<T, OutcomesError>;

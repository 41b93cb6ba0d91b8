use rand_distr::{Normal, Distribution};
use crate::error::{OutcomesError, OutcomesResult};

/// Normal draw clamped to a plausible physiological window.
pub fn sample_clamped<R: rand::Rng>(
    rng: &mut R,
    mean: f64,
    sd: f64,
    lower: f64,
    upper: f64,
) -> OutcomesResult<f64> {
    let normal = Normal::new(mean, sd).map_err(|_| OutcomesError::Random)?;
    Ok(normal.sample(rng).max(lower).min(upper))
}

/// Whole mg/dL, as meters report it.
pub fn sample_glucose<R: rand::Rng>(rng: &mut R, mean: f64, sd: f64) -> OutcomesResult<f64> {
    let value = sample_clamped(rng, mean, sd, 40.0, 400.0)?;
    Ok(value.round())
}

/// GMI percent with one decimal.
pub fn sample_gmi<R: rand::Rng>(rng: &mut R, mean: f64, sd: f64) -> OutcomesResult<f64> {
    let value = sample_clamped(rng, mean, sd, 4.0, 14.0)?;
    Ok((value * 10.0).round() / 10.0)
}

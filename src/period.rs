use chrono::{Duration, NaiveDate};
use log::warn;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Trailing window selecting which reading set to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Period {
    #[default]
    Days30,
    Days60,
    Days90,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Days30, Period::Days60, Period::Days90];

    pub fn days(self) -> u32 {
        match self {
            Period::Days30 => 30,
            Period::Days60 => 60,
            Period::Days90 => 90,
        }
    }

    /// Any value outside {30, 60, 90} falls back to 30 days.
    pub fn from_days(days: u32) -> Self {
        match days {
            30 => Period::Days30,
            60 => Period::Days60,
            90 => Period::Days90,
            other => {
                warn!("Unsupported period {} days, using default of 30", other);
                Period::default()
            }
        }
    }

    /// Reads the leading digits of `raw`, so `"60abc"` and `"60.5"` both
    /// select 60 days. No leading digit means the default.
    pub fn parse_lenient(raw: &str) -> Self {
        let trimmed = raw.trim();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());

        match unsigned[..end].parse::<u32>() {
            Ok(days) => Self::from_days(days),
            Err(_) => {
                warn!("Unparsable period {:?}, using default of 30", raw);
                Period::default()
            }
        }
    }

    /// Reads the `period` query parameter from a request URL such as
    /// `/api/clinic-outcomes/gmi?period=60`.
    pub fn from_query(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or(url);
        let query = match url.split_once('?') {
            Some((_, query)) => query,
            None => return Period::default(),
        };

        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "period")
            .map(|(_, value)| Self::parse_lenient(value))
            .unwrap_or_default()
    }

    /// Inclusive `(start, end)` dates of the window ending on `end`.
    pub fn date_range(self, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        (end - Duration::days(i64::from(self.days())), end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.days())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPeriod {
    Days(u64),
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let period = match RawPeriod::deserialize(deserializer)? {
            RawPeriod::Days(days) => match u32::try_from(days) {
                Ok(days) => Period::from_days(days),
                Err(_) => {
                    warn!("Unsupported period {} days, using default of 30", days);
                    Period::default()
                }
            },
            RawPeriod::Number(value) if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 => {
                Period::from_days(value.trunc() as u32)
            }
            RawPeriod::Number(value) => {
                warn!("Unsupported period {}, using default of 30", value);
                Period::default()
            }
            RawPeriod::Text(raw) => Period::parse_lenient(&raw),
            RawPeriod::Other(_) => {
                warn!("Missing or non-numeric period, using default of 30");
                Period::default()
            }
        };
        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_days() {
        assert_eq!(Period::from_days(30), Period::Days30);
        assert_eq!(Period::from_days(60), Period::Days60);
        assert_eq!(Period::from_days(90), Period::Days90);
    }

    #[test]
    fn test_unsupported_days_fall_back_to_30() {
        assert_eq!(Period::from_days(0), Period::Days30);
        assert_eq!(Period::from_days(45), Period::Days30);
        assert_eq!(Period::from_days(365), Period::Days30);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(Period::parse_lenient(" 90 "), Period::Days90);
        assert_eq!(Period::parse_lenient("ninety"), Period::Days30);
        assert_eq!(Period::parse_lenient("-60"), Period::Days30);
        assert_eq!(Period::parse_lenient(""), Period::Days30);
        assert_eq!(Period::parse_lenient("60abc"), Period::Days60);
        assert_eq!(Period::parse_lenient("60.5"), Period::Days60);
        assert_eq!(Period::parse_lenient("+90"), Period::Days90);
        assert_eq!(Period::parse_lenient("99999999999"), Period::Days30);
    }

    #[test]
    fn test_from_query() {
        assert_eq!(Period::from_query("/api/clinic-outcomes/gmi?period=60"), Period::Days60);
        assert_eq!(Period::from_query("/api/clinic-outcomes/gmi?foo=1&period=90"), Period::Days90);
        assert_eq!(Period::from_query("/api/clinic-outcomes/gmi?period=7"), Period::Days30);
        assert_eq!(Period::from_query("/api/clinic-outcomes/gmi"), Period::Days30);
        assert_eq!(Period::from_query("/api/clinic-outcomes/gmi?other=60"), Period::Days30);
        assert_eq!(Period::from_query("/api/clinic-outcomes/gmi?period=90#chart"), Period::Days90);
        assert_eq!(Period::from_query("/api/clinic-outcomes/gmi#chart?period=90"), Period::Days30);
    }

    #[test]
    fn test_date_range() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let (start, stop) = Period::Days30.date_range(end);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(stop, end);
    }

    #[test]
    fn test_serde_as_number() {
        assert_eq!(serde_json::to_string(&Period::Days60).unwrap(), "60");
        let parsed: Period = serde_json::from_str("90").unwrap();
        assert_eq!(parsed, Period::Days90);
        let lenient: Period = serde_json::from_str("14").unwrap();
        assert_eq!(lenient, Period::Days30);
    }

    #[test]
    fn test_deserialize_normalises_any_shape() {
        let cases = [
            ("-5", Period::Days30),
            ("30.5", Period::Days30),
            ("60.0", Period::Days60),
            ("1e20", Period::Days30),
            ("4294967356", Period::Days30),
            ("\"60\"", Period::Days60),
            ("\"soon\"", Period::Days30),
            ("null", Period::Days30),
            ("true", Period::Days30),
            ("[90]", Period::Days30),
        ];
        for (json, expected) in cases {
            let parsed: Period = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, expected, "input {}", json);
        }
    }
}

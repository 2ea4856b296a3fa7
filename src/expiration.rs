use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a paste lives after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Expiration {
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[default]
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "never")]
    Never,
}

impl Expiration {
    pub const ALL: [Expiration; 8] = [
        Expiration::FiveMinutes,
        Expiration::TenMinutes,
        Expiration::OneHour,
        Expiration::OneDay,
        Expiration::OneWeek,
        Expiration::OneMonth,
        Expiration::OneYear,
        Expiration::Never,
    ];

    pub fn duration(self) -> Option<Duration> {
        match self {
            Expiration::FiveMinutes => Some(Duration::minutes(5)),
            Expiration::TenMinutes => Some(Duration::minutes(10)),
            Expiration::OneHour => Some(Duration::hours(1)),
            Expiration::OneDay => Some(Duration::days(1)),
            Expiration::OneWeek => Some(Duration::weeks(1)),
            // months and years are fixed-length
            Expiration::OneMonth => Some(Duration::days(30)),
            Expiration::OneYear => Some(Duration::days(365)),
            Expiration::Never => None,
        }
    }

    /// Absolute expiry relative to `now`, or `None` if the paste never expires.
    pub fn resolve(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|d| now + d)
    }

    pub fn token(self) -> &'static str {
        match self {
            Expiration::FiveMinutes => "5m",
            Expiration::TenMinutes => "10m",
            Expiration::OneHour => "1h",
            Expiration::OneDay => "1d",
            Expiration::OneWeek => "1w",
            Expiration::OneMonth => "1M",
            Expiration::OneYear => "1y",
            Expiration::Never => "never",
        }
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown expiration '{0}' (expected one of 5m, 10m, 1h, 1d, 1w, 1M, 1y, never)")]
pub struct ParseExpirationError(String);

impl FromStr for Expiration {
    type Err = ParseExpirationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expiration::ALL
            .into_iter()
            .find(|e| e.token() == s)
            .ok_or_else(|| ParseExpirationError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_has_no_timestamp() {
        assert_eq!(Expiration::Never.resolve(Utc::now()), None);
    }

    #[test]
    fn resolves_relative_to_now() {
        let now = Utc::now();
        assert_eq!(
            Expiration::FiveMinutes.resolve(now),
            Some(now + Duration::seconds(300))
        );
        assert_eq!(
            Expiration::OneMonth.resolve(now),
            Some(now + Duration::days(30))
        );
        assert_eq!(
            Expiration::OneYear.resolve(now),
            Some(now + Duration::days(365))
        );
    }

    #[test]
    fn tokens_parse_back() {
        for e in Expiration::ALL {
            assert_eq!(e.token().parse::<Expiration>().unwrap(), e);
        }
        // case matters: 1M is a month, 1m is nothing
        assert!("1m".parse::<Expiration>().is_err());
    }

    #[test]
    fn serde_uses_tokens() {
        assert_eq!(
            serde_json::to_string(&Expiration::OneMonth).unwrap(),
            "\"1M\""
        );
        let e: Expiration = serde_json::from_str("\"10m\"").unwrap();
        assert_eq!(e, Expiration::TenMinutes);
        assert_eq!(Expiration::default(), Expiration::OneWeek);
    }
}

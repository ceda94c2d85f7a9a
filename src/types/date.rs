// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::Local;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;
use crate::error::Fallible;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date in the local time zone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Parses `YYYY-MM-DD`. A longer ISO timestamp is accepted and truncated
    /// to its date part.
    pub fn parse(s: &str) -> Fallible<Self> {
        let s = s.trim();
        let prefix = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ErrorReport::new(format!("invalid date: {s:?}")))
    }

    /// Number of whole days from `self` until `later`.
    pub fn days_until(self, later: Date) -> i64 {
        (later.0 - self.0).num_days()
    }

    /// The short US-style rendering used in import suffixes, e.g. `5/1/2024`.
    pub fn to_locale_string(self) -> String {
        self.0.format("%-m/%-d/%Y").to_string()
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s).map_err(|e| serde::de::Error::custom(e.message()))
    }
}

/// Serde helpers for `Option<Date>` fields stored as `""` when absent.
pub mod optional {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    use super::Date;

    pub fn serialize<S: Serializer>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => Date::parse(&s)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(e.message())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() -> Fallible<()> {
        let date = Date::parse("2024-03-09")?;
        assert_eq!(date.to_string(), "2024-03-09");
        Ok(())
    }

    #[test]
    fn test_parse_timestamp_prefix() -> Fallible<()> {
        let date = Date::parse("2024-03-09T10:11:12.000Z")?;
        assert_eq!(date.to_string(), "2024-03-09");
        Ok(())
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Date::parse("March 9").is_err());
        assert!(Date::parse("").is_err());
    }

    #[test]
    fn test_locale_string() -> Fallible<()> {
        let date = Date::parse("2024-03-09")?;
        assert_eq!(date.to_locale_string(), "3/9/2024");
        Ok(())
    }

    #[test]
    fn test_days_until() -> Fallible<()> {
        let a = Date::parse("2024-02-28")?;
        let b = Date::parse("2024-03-01")?;
        assert_eq!(a.days_until(b), 2);
        assert_eq!(b.days_until(a), -2);
        Ok(())
    }
}

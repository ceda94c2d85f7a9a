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

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::date;
use crate::types::date::Date;

const DEFAULT_DAILY: u32 = 1;
const DEFAULT_WEEKLY: u32 = 7;

/// The user's practice targets.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    #[serde(default = "default_daily")]
    pub daily: u32,
    #[serde(default = "default_weekly")]
    pub weekly: u32,
    #[serde(default, with = "date::optional")]
    pub target_date: Option<Date>,
}

fn default_daily() -> u32 {
    DEFAULT_DAILY
}

fn default_weekly() -> u32 {
    DEFAULT_WEEKLY
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            daily: DEFAULT_DAILY,
            weekly: DEFAULT_WEEKLY,
            target_date: None,
        }
    }
}

impl Goals {
    pub fn new(daily: u32, weekly: u32, target_date: Option<Date>) -> Fallible<Self> {
        if daily == 0 || weekly == 0 {
            return fail("goals must be positive.");
        }
        Ok(Self {
            daily,
            weekly,
            target_date,
        })
    }

    /// Shallow merge of an imported goals object: every recognized key
    /// overwrites the current value, everything else is ignored. Values that
    /// are not valid goals are skipped with a warning.
    pub fn merge(&mut self, incoming: &Value) {
        let Some(map) = incoming.as_object() else {
            log::warn!("Ignoring goals that are not an object.");
            return;
        };
        if let Some(value) = map.get("daily") {
            match positive(value) {
                Some(daily) => self.daily = daily,
                None => log::warn!("Ignoring invalid daily goal: {value}"),
            }
        }
        if let Some(value) = map.get("weekly") {
            match positive(value) {
                Some(weekly) => self.weekly = weekly,
                None => log::warn!("Ignoring invalid weekly goal: {value}"),
            }
        }
        if let Some(value) = map.get("targetDate") {
            match value.as_str() {
                Some(s) if s.trim().is_empty() => self.target_date = None,
                Some(s) => match Date::parse(s) {
                    Ok(date) => self.target_date = Some(date),
                    Err(e) => log::warn!("Ignoring target date: {e}"),
                },
                None if value.is_null() => self.target_date = None,
                None => log::warn!("Ignoring invalid target date: {value}"),
            }
        }
    }
}

fn positive(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
}

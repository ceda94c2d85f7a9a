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
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::date;
use crate::types::date::Date;
use crate::types::difficulty::Difficulty;
use crate::types::timestamp;
use crate::types::timestamp::Timestamp;

/// A single practice problem.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub solution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_complexity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub space_complexity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attempts: u32,
    #[serde(default, with = "date::optional")]
    pub last_solved: Option<Date>,
    #[serde(
        default,
        deserialize_with = "timestamp::optional::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_added: Option<Timestamp>,
    #[serde(
        default,
        deserialize_with = "timestamp::optional::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<Timestamp>,
}

impl Problem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Default::default()
        }
    }

    /// Decodes a record from an import payload.
    pub fn from_value(value: Value) -> Fallible<Self> {
        let problem: Problem = serde_json::from_value(value)
            .map_err(|e| ErrorReport::new(format!("malformed problem: {e}")))?;
        problem.validate()?;
        Ok(problem)
    }

    pub fn validate(&self) -> Fallible<()> {
        if self.title.trim().is_empty() {
            return fail("problem title must not be empty.");
        }
        Ok(())
    }

    /// A problem counts as solved once its solution has any non-whitespace
    /// content.
    pub fn is_solved(&self) -> bool {
        !self.solution.trim().is_empty()
    }

    /// Points awarded for this problem. Unsolved problems are worth nothing;
    /// solving in few attempts earns a bonus.
    pub fn score(&self) -> u32 {
        if !self.is_solved() {
            return 0;
        }
        let bonus = match self.attempts {
            0..=1 => 2,
            2..=3 => 1,
            _ => 0,
        };
        self.difficulty.base_score() + bonus
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value: Option<T> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

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

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::reconcile::IncomingProblems;
use crate::store::ProblemStore;
use crate::types::goals::Goals;
use crate::types::timestamp::Timestamp;

const EXPORT_VERSION: &str = "2.0";

/// The shapes an import file may take.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SnapshotFormat {
    /// `{ "problems": {...}, "goals": {...} }`, as written by `export`.
    Standard,
    /// The whole document is the topic mapping.
    Legacy,
    /// `{ "users": { "<id>": { "problems": ..., "goals": ... } } }`.
    Foreign,
}

/// An import file, normalized.
#[derive(Debug)]
pub struct ImportPayload {
    pub format: SnapshotFormat,
    pub problems: IncomingProblems,
    pub goals: Option<Value>,
}

impl ImportPayload {
    pub fn parse(text: &str) -> Fallible<Self> {
        let document: Value = serde_json::from_str(text)?;
        let Value::Object(mut document) = document else {
            return fail("import file must contain a JSON object.");
        };
        let (format, problems, goals) = if let Some(users) = document.remove("users") {
            let (user, mut data) = first_user(users)?;
            log::debug!("Detected foreign export format, taking user {user:?}.");
            let problems = data
                .remove("problems")
                .ok_or_else(|| ErrorReport::new("invalid foreign export: user has no problems."))?;
            (SnapshotFormat::Foreign, problems, data.remove("goals"))
        } else if let Some(problems) = document.remove("problems") {
            log::debug!("Detected standard export format.");
            (SnapshotFormat::Standard, problems, document.remove("goals"))
        } else {
            log::debug!("Detected legacy format.");
            (SnapshotFormat::Legacy, Value::Object(document), None)
        };
        let problems = topic_mapping(problems)?;
        if problems.is_empty() {
            return fail("no problems found in file.");
        }
        let goals = goals.filter(|g| !g.is_null());
        Ok(Self {
            format,
            problems,
            goals,
        })
    }

    /// The number of incoming records across all topics.
    pub fn problem_count(&self) -> usize {
        self.problems.values().map(Vec::len).sum()
    }
}

fn first_user(users: Value) -> Fallible<(String, Map<String, Value>)> {
    let Value::Object(users) = users else {
        return fail("invalid foreign export: `users` is not an object.");
    };
    match users.into_iter().next() {
        Some((user, Value::Object(data))) => Ok((user, data)),
        Some((user, _)) => fail(format!("invalid foreign export: user {user:?} is not an object.")),
        None => fail("invalid foreign export: no users."),
    }
}

fn topic_mapping(value: Value) -> Fallible<IncomingProblems> {
    let Value::Object(topics) = value else {
        return fail("`problems` must be an object mapping topics to lists.");
    };
    let mut mapping = IncomingProblems::new();
    for (topic, records) in topics {
        match records {
            Value::Array(records) => {
                mapping.insert(topic, records);
            }
            _ => return fail(format!("topic {topic:?} must map to a list of problems.")),
        }
    }
    Ok(mapping)
}

/// The document written by `export`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Export<'a> {
    pub problems: &'a ProblemStore,
    pub goals: &'a Goals,
    pub export_date: Timestamp,
    pub version: &'static str,
}

impl<'a> Export<'a> {
    pub fn new(problems: &'a ProblemStore, goals: &'a Goals, now: Timestamp) -> Self {
        Self {
            problems,
            goals,
            export_date: now,
            version: EXPORT_VERSION,
        }
    }

    pub fn to_json(&self) -> Fallible<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The download name for a user's export, e.g.
/// `dsa_tracker_admin_2024-05-01.json`.
pub fn export_file_name(user: &str, now: Timestamp) -> String {
    format!("dsa_tracker_{user}_{}.json", now.utc_date())
}

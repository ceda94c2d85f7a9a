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

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::Fallible;
use crate::store::ProblemStore;
use crate::types::problem::Problem;
use crate::types::timestamp::Timestamp;

/// Raw incoming records, grouped by topic in file order. Records stay
/// undecoded so that one malformed entry only fails itself.
pub type IncomingProblems = IndexMap<String, Vec<Value>>;

/// What to do with an incoming problem that already exists in the store.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Leave the existing problem alone.
    #[default]
    Skip,
    /// Overwrite the existing problem with the incoming one.
    Update,
    /// Insert the incoming problem under a suffixed title.
    Create,
}

impl Display for DuplicatePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicatePolicy::Skip => write!(f, "skip"),
            DuplicatePolicy::Update => write!(f, "update"),
            DuplicatePolicy::Create => write!(f, "create"),
        }
    }
}

/// Per-batch import counters. `total` always equals the sum of the others.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct ImportStats {
    pub total: usize,
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

enum Outcome {
    Imported,
    Updated,
    Skipped,
}

/// Where an incoming problem already exists, if anywhere.
#[derive(PartialEq, Debug)]
pub struct Existence {
    /// Same title in the incoming topic.
    pub by_title: bool,
    /// Topic and title of the first problem in the store with the same link.
    pub by_link: Option<(String, String)>,
}

impl Existence {
    pub fn exists(&self) -> bool {
        self.by_title || self.by_link.is_some()
    }
}

pub fn check_exists(store: &ProblemStore, topic: &str, title: &str, link: &str) -> Existence {
    let by_title = store.find_by_title(topic, title).is_some();
    let by_link = store
        .find_by_link(link)
        .map(|(topic, problem)| (topic.to_string(), problem.title.clone()));
    Existence { by_title, by_link }
}

/// Merges an incoming batch into the store under a single duplicate policy.
///
/// Records are processed in topic order, then list order. A record that
/// fails is counted in `errors` and the batch carries on.
pub fn reconcile(
    store: &mut ProblemStore,
    incoming: &IncomingProblems,
    policy: DuplicatePolicy,
    now: Timestamp,
) -> ImportStats {
    let mut stats = ImportStats::default();
    for (topic, records) in incoming {
        for record in records {
            stats.total += 1;
            match reconcile_one(store, topic, record.clone(), policy, now) {
                Ok(Outcome::Imported) => stats.imported += 1,
                Ok(Outcome::Updated) => stats.updated += 1,
                Ok(Outcome::Skipped) => stats.skipped += 1,
                Err(e) => {
                    log::warn!("Failed to import a problem in {topic:?}: {e}");
                    stats.errors += 1;
                }
            }
        }
    }
    log::debug!(
        "Import finished: {} total, {} imported, {} updated, {} skipped, {} errors.",
        stats.total,
        stats.imported,
        stats.updated,
        stats.skipped,
        stats.errors
    );
    stats
}

fn reconcile_one(
    store: &mut ProblemStore,
    topic: &str,
    record: Value,
    policy: DuplicatePolicy,
    now: Timestamp,
) -> Fallible<Outcome> {
    let mut problem = Problem::from_value(record)?;
    let existence = check_exists(store, topic, &problem.title, &problem.link);
    if existence.exists() {
        match policy {
            DuplicatePolicy::Skip => {
                log::debug!("Skipping duplicate {:?} in {topic:?}.", problem.title);
                return Ok(Outcome::Skipped);
            }
            DuplicatePolicy::Update => {
                // A title match wins over a link match. A link match elsewhere
                // is updated where it lives, not moved.
                let (target_topic, target_title) = match existence.by_link {
                    Some(found) if !existence.by_title => found,
                    _ => (topic.to_string(), problem.title.clone()),
                };
                problem.date_added = None;
                store.replace_at(&target_topic, &target_title, problem, now)?;
                return Ok(Outcome::Updated);
            }
            DuplicatePolicy::Create => {
                problem.title = imported_title(&problem.title, now);
            }
        }
    }
    problem.date_added = problem.date_added.or(Some(now));
    problem.last_modified = Some(now);
    store.insert(topic, problem)?;
    Ok(Outcome::Imported)
}

/// The title given to a duplicate kept under the `create` policy.
pub fn imported_title(title: &str, now: Timestamp) -> String {
    format!("{title} (Imported {})", now.local_date().to_locale_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn incoming(value: Value) -> IncomingProblems {
        serde_json::from_value(value).unwrap()
    }

    /// Store = {"Array": [{title: "Two Sum", link: "L1"}]}.
    fn two_sum_store() -> ProblemStore {
        let mut store = ProblemStore::new();
        let mut problem = Problem::new("Two Sum", "L1");
        problem.date_added = Some(ts("2024-01-01T00:00:00Z"));
        problem.last_modified = Some(ts("2024-01-01T00:00:00Z"));
        store.insert("Array", problem).unwrap();
        store
    }

    fn assert_balanced(stats: &ImportStats) {
        assert_eq!(
            stats.total,
            stats.imported + stats.updated + stats.skipped + stats.errors
        );
    }

    #[test]
    fn test_skip_exact_duplicate() {
        let mut store = two_sum_store();
        let before = store.clone();
        let batch = incoming(json!({"Array": [{"title": "Two Sum", "link": "L1"}]}));
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Skip, Timestamp::now());
        assert_eq!(
            stats,
            ImportStats {
                total: 1,
                imported: 0,
                updated: 0,
                skipped: 1,
                errors: 0,
            }
        );
        assert_eq!(store, before);
    }

    #[test]
    fn test_skip_link_duplicate_in_other_topic() {
        let mut store = two_sum_store();
        let batch = incoming(json!({"Hashing": [{"title": "Pair Sum", "link": "L1"}]}));
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Skip, Timestamp::now());
        assert_eq!(stats.skipped, 1);
        assert_eq!(store.len(), 1);
        assert!(store.topic("Hashing").is_none());
    }

    #[test]
    fn test_skip_is_idempotent() {
        let mut store = ProblemStore::new();
        let batch = incoming(json!({
            "Array": [{"title": "Two Sum", "link": "L1"}, {"title": "3Sum", "link": "L2"}],
            "DP": [{"title": "Fibonacci", "link": "L3"}]
        }));
        let first = reconcile(&mut store, &batch, DuplicatePolicy::Skip, Timestamp::now());
        assert_eq!(first.imported, 3);
        let second = reconcile(&mut store, &batch, DuplicatePolicy::Skip, Timestamp::now());
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_update_by_title() {
        let mut store = two_sum_store();
        let now = ts("2024-06-01T00:00:00Z");
        let batch = incoming(json!({
            "Array": [{
                "title": "Two Sum",
                "link": "L2",
                "difficulty": "Medium",
                "dateAdded": "2020-01-01T00:00:00.000Z"
            }]
        }));
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Update, now);
        assert_eq!(stats.updated, 1);
        assert_balanced(&stats);
        let problem = store.find_by_title("Array", "Two Sum").unwrap();
        assert_eq!(problem.link, "L2");
        assert_eq!(problem.difficulty.as_str(), "Medium");
        assert_eq!(problem.date_added, Some(ts("2024-01-01T00:00:00Z")));
        assert_eq!(problem.last_modified, Some(now));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_by_link_stays_in_original_topic() {
        let mut store = two_sum_store();
        let now = ts("2024-06-01T00:00:00Z");
        let batch = incoming(json!({"Hashing": [{"title": "Two Sum II", "link": "L1"}]}));
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Update, now);
        assert_eq!(stats.updated, 1);
        assert!(store.topic("Hashing").is_none());
        let problem = store.find_by_title("Array", "Two Sum II").unwrap();
        assert_eq!(problem.date_added, Some(ts("2024-01-01T00:00:00Z")));
        assert!(store.find_by_title("Array", "Two Sum").is_none());
    }

    #[test]
    fn test_create_suffixes_title() {
        let mut store = two_sum_store();
        let now = Timestamp::now();
        let batch = incoming(json!({"Array": [{"title": "Two Sum", "link": "L1"}]}));
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Create, now);
        assert_eq!(stats.imported, 1);
        assert_balanced(&stats);
        let titles: Vec<&str> = store
            .topic("Array")
            .unwrap()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        let expected = format!(
            "Two Sum (Imported {})",
            now.local_date().to_locale_string()
        );
        assert_eq!(titles, vec!["Two Sum", expected.as_str()]);
        let original = two_sum_store();
        assert_eq!(
            store.find_by_title("Array", "Two Sum"),
            original.find_by_title("Array", "Two Sum")
        );
    }

    #[test]
    fn test_create_twice_same_day_is_an_error() {
        let mut store = two_sum_store();
        let now = Timestamp::now();
        let batch = incoming(json!({"Array": [{"title": "Two Sum", "link": "L1"}]}));
        reconcile(&mut store, &batch, DuplicatePolicy::Create, now);
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Create, now);
        assert_eq!(stats.errors, 1);
        assert_balanced(&stats);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_insert_stamps_dates() {
        let mut store = ProblemStore::new();
        let now = ts("2024-06-01T00:00:00Z");
        let batch = incoming(json!({
            "Graphs": [
                {"title": "BFS", "link": "G1"},
                {"title": "DFS", "link": "G2", "dateAdded": "2023-03-03T00:00:00.000Z"}
            ]
        }));
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Skip, now);
        assert_eq!(stats.imported, 2);
        let bfs = store.find_by_title("Graphs", "BFS").unwrap();
        assert_eq!(bfs.date_added, Some(now));
        assert_eq!(bfs.last_modified, Some(now));
        let dfs = store.find_by_title("Graphs", "DFS").unwrap();
        assert_eq!(dfs.date_added, Some(ts("2023-03-03T00:00:00Z")));
        assert_eq!(dfs.last_modified, Some(now));
    }

    #[test]
    fn test_bad_records_do_not_abort_batch() {
        let mut store = ProblemStore::new();
        let batch = incoming(json!({
            "Array": [
                {"title": "Two Sum", "link": "L1"},
                {"link": "no title"},
                42,
                {"title": "3Sum", "attempts": "many"},
                {"title": "Valid Anagram", "link": "L4"}
            ]
        }));
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Skip, Timestamp::now());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.imported, 2);
        assert_eq!(stats.errors, 3);
        assert_balanced(&stats);
    }

    #[test]
    fn test_duplicates_within_batch() {
        let mut store = ProblemStore::new();
        let batch = incoming(json!({
            "Array": [{"title": "Two Sum", "link": "L1"}, {"title": "Two Sum", "link": "L1"}]
        }));
        let stats = reconcile(&mut store, &batch, DuplicatePolicy::Skip, Timestamp::now());
        assert_eq!(stats.imported, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_stats_balance_for_every_policy() {
        for policy in [
            DuplicatePolicy::Skip,
            DuplicatePolicy::Update,
            DuplicatePolicy::Create,
        ] {
            let mut store = two_sum_store();
            let batch = incoming(json!({
                "Array": [
                    {"title": "Two Sum", "link": "L1"},
                    {"title": ""},
                    {"title": "New", "link": "L5"}
                ],
                "DP": [{"title": "Other", "link": "L1"}]
            }));
            let stats = reconcile(&mut store, &batch, policy, Timestamp::now());
            assert_eq!(stats.total, 4, "{policy}");
            assert_balanced(&stats);
        }
    }

    #[test]
    fn test_check_exists() {
        let store = two_sum_store();
        assert_eq!(
            check_exists(&store, "Array", "Two Sum", "L9"),
            Existence {
                by_title: true,
                by_link: None
            }
        );
        assert_eq!(
            check_exists(&store, "DP", "Two Sum", "L1"),
            Existence {
                by_title: false,
                by_link: Some(("Array".to_string(), "Two Sum".to_string()))
            }
        );
        assert!(!check_exists(&store, "DP", "Two Sum", "").exists());
    }
}

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

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::date::Date;
use crate::types::problem::Problem;
use crate::types::problem_id::ProblemId;
use crate::types::timestamp::Timestamp;

/// The canonical collection of problems: topic names mapped to problem lists,
/// in insertion order.
///
/// Titles are unique within a topic: every operation that adds a title to a
/// topic rejects one that is already there. Data loaded from disk is taken
/// as-is, so title lookups resolve to the first match.
///
/// A topic with no problems is never kept.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ProblemStore {
    topics: IndexMap<String, Vec<Problem>>,
}

impl<'de> Deserialize<'de> for ProblemStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut topics: IndexMap<String, Vec<Problem>> = IndexMap::deserialize(deserializer)?;
        topics.retain(|_, problems| !problems.is_empty());
        Ok(Self { topics })
    }
}

impl ProblemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The total number of problems across all topics.
    pub fn len(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn topics(&self) -> impl Iterator<Item = (&str, &[Problem])> {
        self.topics
            .iter()
            .map(|(topic, problems)| (topic.as_str(), problems.as_slice()))
    }

    pub fn topic(&self, topic: &str) -> Option<&[Problem]> {
        self.topics.get(topic).map(Vec::as_slice)
    }

    /// Every problem paired with its topic, in store order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Problem)> {
        self.topics.iter().flat_map(|(topic, problems)| {
            problems
                .iter()
                .map(move |problem| (topic.as_str(), problem))
        })
    }

    /// All distinct tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let tags: BTreeSet<&String> = self.iter().flat_map(|(_, p)| p.tags.iter()).collect();
        tags.into_iter().cloned().collect()
    }

    pub fn find_by_title(&self, topic: &str, title: &str) -> Option<&Problem> {
        self.topics
            .get(topic)
            .and_then(|problems| problems.iter().find(|p| p.title == title))
    }

    /// Finds the first problem with this link in any topic. Empty links never
    /// match.
    pub fn find_by_link(&self, link: &str) -> Option<(&str, &Problem)> {
        if link.is_empty() {
            return None;
        }
        self.iter().find(|(_, p)| p.link == link)
    }

    pub fn find_by_id(&self, id: ProblemId) -> Option<(&str, &Problem)> {
        self.iter()
            .find(|(topic, p)| ProblemId::of(topic, &p.title) == id)
    }

    /// Appends a problem to a topic, creating the topic if needed.
    pub fn insert(&mut self, topic: &str, problem: Problem) -> Fallible<()> {
        if topic.trim().is_empty() {
            return fail("topic must not be empty.");
        }
        problem.validate()?;
        if self.find_by_title(topic, &problem.title).is_some() {
            return fail(format!(
                "a problem titled {:?} already exists in {topic:?}.",
                problem.title
            ));
        }
        self.topics.entry(topic.to_string()).or_default().push(problem);
        Ok(())
    }

    /// Overwrites the problem found by title. The original `dateAdded` is kept
    /// unless the replacement carries its own.
    pub fn replace_at(
        &mut self,
        topic: &str,
        title: &str,
        mut problem: Problem,
        now: Timestamp,
    ) -> Fallible<()> {
        problem.validate()?;
        let problems = self.problems_mut(topic)?;
        let index = index_of(problems, topic, title)?;
        if problem.title != title && problems.iter().any(|p| p.title == problem.title) {
            return fail(format!(
                "a problem titled {:?} already exists in {topic:?}.",
                problem.title
            ));
        }
        problem.date_added = problem
            .date_added
            .or(problems[index].date_added)
            .or(Some(now));
        problem.last_modified = Some(now);
        problems[index] = problem;
        Ok(())
    }

    /// Moves a problem to another topic, replacing its contents. The original
    /// `dateAdded` is kept.
    pub fn move_problem(
        &mut self,
        from: &str,
        title: &str,
        to: &str,
        mut problem: Problem,
        now: Timestamp,
    ) -> Fallible<()> {
        if from == to {
            return self.replace_at(from, title, problem, now);
        }
        if to.trim().is_empty() {
            return fail("topic must not be empty.");
        }
        problem.validate()?;
        let index = index_of(self.problems_mut(from)?, from, title)?;
        if self.find_by_title(to, &problem.title).is_some() {
            return fail(format!(
                "a problem titled {:?} already exists in {to:?}.",
                problem.title
            ));
        }
        let old = self.remove_at(from, index);
        problem.date_added = old.date_added.or(Some(now));
        problem.last_modified = Some(now);
        self.topics.entry(to.to_string()).or_default().push(problem);
        Ok(())
    }

    /// Removes the first problem with this title, dropping the topic if it
    /// becomes empty.
    pub fn delete(&mut self, topic: &str, title: &str) -> Fallible<Problem> {
        let index = index_of(self.problems_mut(topic)?, topic, title)?;
        Ok(self.remove_at(topic, index))
    }

    /// Records another solve: bumps the attempt counter and stamps the date.
    pub fn mark_solved(&mut self, topic: &str, title: &str, today: Date) -> Fallible<()> {
        let problem = self.find_mut(topic, title)?;
        problem.attempts += 1;
        problem.last_solved = Some(today);
        Ok(())
    }

    pub fn save_solution(
        &mut self,
        topic: &str,
        title: &str,
        solution: &str,
        today: Date,
    ) -> Fallible<()> {
        if solution.trim().is_empty() {
            return fail("solution must not be empty.");
        }
        let problem = self.find_mut(topic, title)?;
        problem.solution = solution.to_string();
        problem.last_solved = Some(today);
        problem.attempts += 1;
        Ok(())
    }

    fn find_mut(&mut self, topic: &str, title: &str) -> Fallible<&mut Problem> {
        let problems = self.problems_mut(topic)?;
        let index = index_of(problems, topic, title)?;
        Ok(&mut problems[index])
    }

    fn problems_mut(&mut self, topic: &str) -> Fallible<&mut Vec<Problem>> {
        self.topics
            .get_mut(topic)
            .ok_or_else(|| ErrorReport::new(format!("topic {topic:?} does not exist.")))
    }

    /// Callers guarantee the topic exists and `index` is in bounds.
    fn remove_at(&mut self, topic: &str, index: usize) -> Problem {
        let problems = &mut self.topics[topic];
        let problem = problems.remove(index);
        if problems.is_empty() {
            self.topics.shift_remove(topic);
        }
        problem
    }
}

fn index_of(problems: &[Problem], topic: &str, title: &str) -> Fallible<usize> {
    problems
        .iter()
        .position(|p| p.title == title)
        .ok_or_else(|| ErrorReport::new(format!("no problem titled {title:?} in {topic:?}.")))
}

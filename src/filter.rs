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

use clap::ValueEnum;

use crate::store::ProblemStore;
use crate::types::difficulty::Difficulty;
use crate::types::problem::Problem;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
pub enum Status {
    Solved,
    Unsolved,
}

/// Criteria for narrowing down the problem list. Every criterion that is set
/// must match.
#[derive(Default, Clone, Debug)]
pub struct Filter {
    /// Case-insensitive substring of the title, the topic, or any tag.
    pub search: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tag: Option<String>,
    pub status: Option<Status>,
}

/// The problems of one topic that passed a filter.
pub type FilteredTopic<'a> = (&'a str, Vec<&'a Problem>);

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.topic.is_none()
            && self.difficulty.is_none()
            && self.tag.is_none()
            && self.status.is_none()
    }

    pub fn matches(&self, topic: &str, problem: &Problem) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let found = problem.title.to_lowercase().contains(&needle)
                || topic.to_lowercase().contains(&needle)
                || problem
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        if let Some(wanted) = &self.topic {
            if wanted != topic {
                return false;
            }
        }
        if let Some(difficulty) = self.difficulty {
            if problem.difficulty != difficulty {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !problem.has_tag(tag) {
                return false;
            }
        }
        match self.status {
            Some(Status::Solved) => problem.is_solved(),
            Some(Status::Unsolved) => !problem.is_solved(),
            None => true,
        }
    }

    /// Applies the filter, keeping store order. Topics left without problems
    /// are omitted.
    pub fn apply<'a>(&self, store: &'a ProblemStore) -> Vec<FilteredTopic<'a>> {
        store
            .topics()
            .filter_map(|(topic, problems)| {
                let kept: Vec<&Problem> = problems
                    .iter()
                    .filter(|problem| self.matches(topic, problem))
                    .collect();
                if kept.is_empty() {
                    None
                } else {
                    Some((topic, kept))
                }
            })
            .collect()
    }
}

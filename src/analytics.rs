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

use serde::Serialize;

use crate::store::ProblemStore;
use crate::types::date::Date;
use crate::types::difficulty::Difficulty;
use crate::types::problem::Problem;

/// How many problems of one difficulty there are, and how many are solved.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct DifficultyCount {
    pub difficulty: Difficulty,
    pub total: usize,
    pub solved: usize,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_problems: usize,
    pub solved_problems: usize,
    pub progress_percent: u32,
    pub total_score: u32,
    pub current_streak: u32,
    pub by_difficulty: Vec<DifficultyCount>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub topic: String,
    pub total: usize,
    pub solved: usize,
    pub percent: u32,
    pub by_difficulty: Vec<DifficultyCount>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentSolve {
    pub topic: String,
    pub title: String,
    pub date: Date,
}

/// `solved / total` as a rounded percentage; zero when there is nothing.
pub fn percent(solved: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((solved as f64 / total as f64) * 100.0).round() as u32
}

/// The number of consecutive days, ending today, on which some problem was
/// last solved.
pub fn streak(store: &ProblemStore, today: Date) -> u32 {
    let dates: BTreeSet<Date> = store.iter().filter_map(|(_, p)| p.last_solved).collect();
    let mut streak = 0;
    for date in dates.into_iter().rev() {
        if date.days_until(today) == streak as i64 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

fn difficulty_counts<'a>(problems: impl Iterator<Item = &'a Problem>) -> Vec<DifficultyCount> {
    let mut counts: Vec<DifficultyCount> = Difficulty::ALL
        .iter()
        .map(|difficulty| DifficultyCount {
            difficulty: *difficulty,
            total: 0,
            solved: 0,
        })
        .collect();
    for problem in problems {
        if let Some(count) = counts.iter_mut().find(|c| c.difficulty == problem.difficulty) {
            count.total += 1;
            if problem.is_solved() {
                count.solved += 1;
            }
        }
    }
    counts
}

pub fn overview(store: &ProblemStore, today: Date) -> Overview {
    let total_problems = store.len();
    let solved_problems = store.iter().filter(|(_, p)| p.is_solved()).count();
    Overview {
        total_problems,
        solved_problems,
        progress_percent: percent(solved_problems, total_problems),
        total_score: store.iter().map(|(_, p)| p.score()).sum(),
        current_streak: streak(store, today),
        by_difficulty: difficulty_counts(store.iter().map(|(_, p)| p)),
    }
}

pub fn topic_progress(store: &ProblemStore) -> Vec<TopicProgress> {
    store
        .topics()
        .map(|(topic, problems)| {
            let total = problems.len();
            let solved = problems.iter().filter(|p| p.is_solved()).count();
            TopicProgress {
                topic: topic.to_string(),
                total,
                solved,
                percent: percent(solved, total),
                by_difficulty: difficulty_counts(problems.iter()),
            }
        })
        .collect()
}

/// The most recently solved problems, newest first.
pub fn recent_activity(store: &ProblemStore, limit: usize) -> Vec<RecentSolve> {
    let mut recent: Vec<RecentSolve> = store
        .iter()
        .filter_map(|(topic, p)| {
            p.last_solved.map(|date| RecentSolve {
                topic: topic.to_string(),
                title: p.title.clone(),
                date,
            })
        })
        .collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(limit);
    recent
}

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
use std::fmt::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::analytics::Overview;
use crate::analytics::RecentSolve;
use crate::analytics::TopicProgress;
use crate::analytics::overview;
use crate::analytics::recent_activity;
use crate::analytics::topic_progress;
use crate::error::Fallible;
use crate::session::Session;
use crate::types::date::Date;
use crate::types::goals::Goals;

const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(ValueEnum, Clone, Copy, Default)]
pub enum StatsFormat {
    /// Human-readable output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats<'a> {
    user: &'a str,
    overview: Overview,
    topics: Vec<TopicProgress>,
    recent_activity: Vec<RecentSolve>,
    goals: &'a Goals,
}

pub fn get_stats(session: &Session, today: Date) -> Stats<'_> {
    let store = session.store();
    Stats {
        user: session.user(),
        overview: overview(store, today),
        topics: topic_progress(store),
        recent_activity: recent_activity(store, RECENT_ACTIVITY_LIMIT),
        goals: session.goals(),
    }
}

pub fn print_stats(session: &Session, format: StatsFormat) -> Fallible<()> {
    let stats = get_stats(session, Date::today());
    match format {
        StatsFormat::Text => print!("{}", render_text(&stats)),
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{stats_json}");
        }
    }
    Ok(())
}

fn render_text(stats: &Stats<'_>) -> String {
    let o = &stats.overview;
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Progress for {}", stats.user);
    let _ = writeln!(
        out,
        "  Solved:  {} / {} ({}%)",
        o.solved_problems, o.total_problems, o.progress_percent
    );
    let _ = writeln!(out, "  Score:   {}", o.total_score);
    let _ = writeln!(out, "  Streak:  {} days", o.current_streak);
    for count in &o.by_difficulty {
        let _ = writeln!(
            out,
            "  {:<8} {} / {}",
            format!("{}:", count.difficulty.as_str()),
            count.solved,
            count.total
        );
    }
    let _ = writeln!(out, "\nTopics");
    for topic in &stats.topics {
        let _ = writeln!(
            out,
            "  {} {} / {} ({}%)",
            topic.topic, topic.solved, topic.total, topic.percent
        );
    }
    if !stats.recent_activity.is_empty() {
        let _ = writeln!(out, "\nRecent activity");
        for solve in &stats.recent_activity {
            let _ = writeln!(
                out,
                "  {} {} ({})",
                solve.date.to_locale_string(),
                solve.title,
                solve.topic
            );
        }
    }
    let goals = stats.goals;
    let _ = writeln!(out, "\nGoals: {} daily, {} weekly", goals.daily, goals.weekly);
    if let Some(target) = goals.target_date {
        let _ = writeln!(out, "  Target date: {}", target.to_locale_string());
    }
    out
}

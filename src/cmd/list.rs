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

use std::fmt::Write;

use clap::Args;

use crate::filter::Filter;
use crate::filter::FilteredTopic;
use crate::filter::Status;
use crate::session::Session;
use crate::types::difficulty::Difficulty;

#[derive(Args, Default, Debug)]
pub struct FilterArgs {
    /// Case-insensitive search over titles, topics and tags.
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub topic: Option<String>,
    #[arg(long, value_enum)]
    pub difficulty: Option<Difficulty>,
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<Status>,
}

impl From<FilterArgs> for Filter {
    fn from(args: FilterArgs) -> Self {
        Filter {
            search: args.search.filter(|s| !s.trim().is_empty()),
            topic: args.topic,
            difficulty: args.difficulty,
            tag: args.tag,
            status: args.status,
        }
    }
}

pub fn list_problems(session: &Session, filter: Filter) {
    if session.store().is_empty() {
        println!("No problems yet. Add one with `dsatracker add`.");
        return;
    }
    let result = filter.apply(session.store());
    if result.is_empty() {
        println!("No problems match the filter.");
        return;
    }
    print!("{}", render_list(&result));
}

fn render_list(result: &[FilteredTopic<'_>]) -> String {
    let mut out = String::new();
    for (topic, problems) in result {
        let solved = problems.iter().filter(|p| p.is_solved()).count();
        let _ = writeln!(out, "{topic} ({solved}/{})", problems.len());
        for problem in problems {
            let mark = if problem.is_solved() { "x" } else { " " };
            let _ = write!(
                out,
                "  [{mark}] {} ({})",
                problem.title,
                problem.difficulty.as_str()
            );
            if !problem.tags.is_empty() {
                let _ = write!(out, " [{}]", problem.tags.join(", "));
            }
            if let Some(date) = problem.last_solved {
                let _ = write!(out, " solved {}", date.to_locale_string());
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "      {}", problem.link);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::helper::create_test_session;

    #[test]
    fn test_render_list() -> Fallible<()> {
        let mut session = create_test_session()?;
        session.save_solution("Array & String", "Two Sum", "map")?;
        let filter = Filter::from(FilterArgs {
            topic: Some("Array & String".to_string()),
            ..Default::default()
        });
        let text = render_list(&filter.apply(session.store()));
        assert!(text.starts_with("Array & String (1/2)\n"));
        assert!(text.contains("  [x] Two Sum (Easy) [Hash Map, Array] solved "));
        assert!(text.contains("  [ ] 3Sum (Medium)"));
        assert!(!text.contains("Fibonacci"));
        Ok(())
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = Filter::from(FilterArgs {
            search: Some("  ".to_string()),
            ..Default::default()
        });
        assert!(filter.is_empty());
    }
}

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

use clap::Args;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::session::Session;
use crate::types::difficulty::Difficulty;
use crate::types::problem::Problem;

/// Problem fields settable from the command line. Unset fields are left
/// alone when editing.
#[derive(Args, Default, Debug)]
pub struct ProblemArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
    #[arg(long, value_enum)]
    pub difficulty: Option<Difficulty>,
    /// Comma-separated list of tags.
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long)]
    pub solution: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub time_complexity: Option<String>,
    #[arg(long)]
    pub space_complexity: Option<String>,
    #[arg(long)]
    pub attempts: Option<u32>,
}

impl ProblemArgs {
    pub fn apply(self, problem: &mut Problem) {
        if let Some(title) = self.title {
            problem.title = title.trim().to_string();
        }
        if let Some(link) = self.link {
            problem.link = link.trim().to_string();
        }
        if let Some(difficulty) = self.difficulty {
            problem.difficulty = difficulty;
        }
        if let Some(tags) = self.tags {
            problem.tags = parse_tags(&tags);
        }
        if let Some(solution) = self.solution {
            problem.solution = solution;
        }
        if let Some(notes) = self.notes {
            problem.notes = notes;
        }
        if let Some(time_complexity) = self.time_complexity {
            problem.time_complexity = time_complexity;
        }
        if let Some(space_complexity) = self.space_complexity {
            problem.space_complexity = space_complexity;
        }
        if let Some(attempts) = self.attempts {
            problem.attempts = attempts;
        }
    }
}

/// Splits a comma-separated tag list, dropping blanks.
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn add_problem(
    session: &mut Session,
    topic: &str,
    args: ProblemArgs,
    force: bool,
) -> Fallible<()> {
    let mut problem = Problem::default();
    args.apply(&mut problem);
    let title = problem.title.clone();
    session.add_problem(topic.trim(), problem, force)?;
    println!("Problem added successfully: {title:?} in {:?}.", topic.trim());
    Ok(())
}

pub fn edit_problem(
    session: &mut Session,
    topic: &str,
    title: &str,
    new_topic: Option<String>,
    args: ProblemArgs,
) -> Fallible<()> {
    let mut problem = session
        .store()
        .find_by_title(topic, title)
        .cloned()
        .ok_or_else(|| ErrorReport::new(format!("problem {title:?} not found in {topic:?}.")))?;
    args.apply(&mut problem);
    let new_topic = new_topic.map(|t| t.trim().to_string());
    let new_topic = new_topic.as_deref().unwrap_or(topic);
    session.edit_problem(topic, title, new_topic, problem)?;
    println!("Problem updated successfully.");
    Ok(())
}

pub fn mark_solved(session: &mut Session, topic: &str, title: &str) -> Fallible<()> {
    session.mark_solved(topic, title)?;
    println!("Problem marked as solved!");
    Ok(())
}

pub fn save_solution(
    session: &mut Session,
    topic: &str,
    title: &str,
    solution: &str,
) -> Fallible<()> {
    session.save_solution(topic, title, solution)?;
    println!("Solution saved!");
    Ok(())
}

pub fn delete_problem(session: &mut Session, topic: &str, title: &str) -> Fallible<()> {
    let problem = session.delete_problem(topic, title)?;
    println!("Deleted {:?}.", problem.title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_test_session;

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("Array, Hash Map,,  "), vec!["Array", "Hash Map"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_add_requires_title_and_link() -> Fallible<()> {
        let mut session = create_test_session()?;
        let args = ProblemArgs {
            title: Some("Valid Anagram".to_string()),
            ..Default::default()
        };
        assert!(add_problem(&mut session, "Strings", args, false).is_err());
        assert!(session.store().topic("Strings").is_none());
        Ok(())
    }

    #[test]
    fn test_edit_keeps_unset_fields() -> Fallible<()> {
        let mut session = create_test_session()?;
        let args = ProblemArgs {
            difficulty: Some(Difficulty::Hard),
            notes: Some("sort first".to_string()),
            ..Default::default()
        };
        edit_problem(&mut session, "Array & String", "3Sum", None, args)?;
        let problem = session
            .store()
            .find_by_title("Array & String", "3Sum")
            .cloned()
            .ok_or_else(|| ErrorReport::new("missing"))?;
        assert_eq!(problem.difficulty, Difficulty::Hard);
        assert_eq!(problem.notes, "sort first");
        assert_eq!(problem.link, "https://leetcode.com/problems/3sum/");
        Ok(())
    }

    #[test]
    fn test_edit_moves_topic() -> Fallible<()> {
        let mut session = create_test_session()?;
        let new_topic = Some("Two Pointers".to_string());
        let args = ProblemArgs::default();
        edit_problem(&mut session, "Array & String", "3Sum", new_topic, args)?;
        assert!(session.store().find_by_title("Two Pointers", "3Sum").is_some());
        assert!(session.store().find_by_title("Array & String", "3Sum").is_none());
        Ok(())
    }
}

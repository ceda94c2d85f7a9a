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

use crate::error::Fallible;
use crate::session::Session;
use crate::types::date::Date;
use crate::types::goals::Goals;

#[derive(Args, Default, Debug)]
pub struct GoalsArgs {
    /// Problems to solve per day.
    #[arg(long)]
    pub daily: Option<u32>,
    /// Problems to solve per week.
    #[arg(long)]
    pub weekly: Option<u32>,
    /// Target date, as YYYY-MM-DD.
    #[arg(long, conflicts_with = "clear_target")]
    pub target_date: Option<String>,
    /// Remove the target date.
    #[arg(long)]
    pub clear_target: bool,
}

impl GoalsArgs {
    fn is_empty(&self) -> bool {
        self.daily.is_none()
            && self.weekly.is_none()
            && self.target_date.is_none()
            && !self.clear_target
    }

    fn apply(&self, current: &Goals) -> Fallible<Goals> {
        let target_date = if self.clear_target {
            None
        } else {
            match &self.target_date {
                Some(date) => Some(Date::parse(date)?),
                None => current.target_date,
            }
        };
        Goals::new(
            self.daily.unwrap_or(current.daily),
            self.weekly.unwrap_or(current.weekly),
            target_date,
        )
    }
}

/// Prints the goals, or updates them when any option is given.
pub fn goals(session: &mut Session, args: GoalsArgs) -> Fallible<()> {
    if !args.is_empty() {
        let goals = args.apply(session.goals())?;
        session.set_goals(goals)?;
        println!("Goals saved successfully!");
    }
    let goals = session.goals();
    println!("Daily goal:  {}", goals.daily);
    println!("Weekly goal: {}", goals.weekly);
    if let Some(target) = goals.target_date {
        let days = Date::today().days_until(target);
        println!("Target date: {} ({days} days left)", target.to_locale_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_test_session;

    #[test]
    fn test_update_some_goals() -> Fallible<()> {
        let mut session = create_test_session()?;
        let args = GoalsArgs {
            weekly: Some(10),
            target_date: Some("2030-01-31".to_string()),
            ..Default::default()
        };
        goals(&mut session, args)?;
        assert_eq!(session.goals().daily, 1);
        assert_eq!(session.goals().weekly, 10);
        assert_eq!(session.goals().target_date, Some(Date::parse("2030-01-31")?));
        let args = GoalsArgs {
            clear_target: true,
            ..Default::default()
        };
        goals(&mut session, args)?;
        assert_eq!(session.goals().target_date, None);
        Ok(())
    }

    #[test]
    fn test_rejects_zero() -> Fallible<()> {
        let mut session = create_test_session()?;
        let args = GoalsArgs {
            daily: Some(0),
            ..Default::default()
        };
        assert!(goals(&mut session, args).is_err());
        assert_eq!(session.goals().daily, 1);
        Ok(())
    }
}

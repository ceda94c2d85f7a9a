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

use maud::Markup;
use maud::PreEscaped;
use maud::html;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;

use crate::analytics::overview;
use crate::analytics::recent_activity;
use crate::analytics::topic_progress;
use crate::filter::Filter;
use crate::filter::Status;
use crate::markdown::markdown_to_html;
use crate::markdown::solution_to_html;
use crate::session::Session;
use crate::types::date::Date;
use crate::types::difficulty::Difficulty;
use crate::types::problem::Problem;
use crate::types::problem_id::ProblemId;

const RECENT_ACTIVITY_LIMIT: usize = 5;

pub fn topic_url(topic: &str) -> String {
    format!("/topic/{}", utf8_percent_encode(topic, NON_ALPHANUMERIC))
}

pub fn dashboard(session: &Session, filter: &Filter, today: Date) -> Markup {
    let store = session.store();
    let overview = overview(store, today);
    let goals = session.goals();
    html! {
        section.overview {
            h1 { "Welcome, " (session.user()) }
            div.cards {
                div.card {
                    span.value { (overview.solved_problems) " / " (overview.total_problems) }
                    span.label { "Solved (" (overview.progress_percent) "%)" }
                }
                div.card {
                    span.value { (overview.total_score) }
                    span.label { "Score" }
                }
                div.card {
                    span.value { (overview.current_streak) }
                    span.label { "Day streak" }
                }
                div.card {
                    span.value { (goals.daily) " / " (goals.weekly) }
                    span.label { "Daily / weekly goal" }
                }
            }
            ul.difficulty {
                @for count in &overview.by_difficulty {
                    li class=(difficulty_class(count.difficulty)) {
                        (count.difficulty.as_str()) ": " (count.solved) " / " (count.total)
                    }
                }
            }
        }
        section.topics {
            h2 { "Topics" }
            ul {
                @for row in topic_progress(store) {
                    li {
                        a href=(topic_url(&row.topic)) { (row.topic) }
                        " "
                        progress max="100" value=(row.percent) {}
                        " " (row.solved) " / " (row.total)
                    }
                }
            }
        }
        @let recent = recent_activity(store, RECENT_ACTIVITY_LIMIT);
        @if !recent.is_empty() {
            section.recent {
                h2 { "Recent activity" }
                ul {
                    @for solve in &recent {
                        li {
                            span.date { (solve.date.to_locale_string()) }
                            " " (solve.title) " "
                            span.topic { "(" (solve.topic) ")" }
                        }
                    }
                }
            }
        }
        section.problems {
            h2 { "Problems" }
            (filter_form(session, filter))
            @let result = filter.apply(store);
            @if result.is_empty() {
                p.empty {
                    @if filter.is_empty() { "No problems yet." } @else { "No problems match." }
                }
            }
            @for (topic, problems) in &result {
                h3 { a href=(topic_url(topic)) { (topic) } }
                table {
                    @for problem in problems {
                        (problem_row(topic, problem))
                    }
                }
            }
        }
    }
}

fn filter_form(session: &Session, filter: &Filter) -> Markup {
    let topics: Vec<&str> = session.store().topics().map(|(topic, _)| topic).collect();
    let tags = session.store().tags();
    html! {
        form.filter method="get" action="/" {
            input type="search" name="search" placeholder="Search"
                value=(filter.search.as_deref().unwrap_or(""));
            select name="topic" {
                option value="" { "All topics" }
                @for topic in &topics {
                    option value=(topic) selected[filter.topic.as_deref() == Some(*topic)] {
                        (topic)
                    }
                }
            }
            select name="difficulty" {
                option value="" { "All difficulties" }
                @for difficulty in Difficulty::ALL {
                    @let is_selected = filter.difficulty == Some(difficulty);
                    option value=(difficulty.as_str()) selected[is_selected] {
                        (difficulty.as_str())
                    }
                }
            }
            select name="tag" {
                option value="" { "All tags" }
                @for tag in &tags {
                    option value=(tag) selected[filter.tag.as_ref() == Some(tag)] { (tag) }
                }
            }
            select name="status" {
                option value="" { "Any status" }
                option value="solved" selected[filter.status == Some(Status::Solved)] { "Solved" }
                option value="unsolved" selected[filter.status == Some(Status::Unsolved)] {
                    "Unsolved"
                }
            }
            button type="submit" { "Filter" }
        }
    }
}

fn problem_row(topic: &str, problem: &Problem) -> Markup {
    let id = ProblemId::of(topic, &problem.title);
    html! {
        tr.solved[problem.is_solved()] {
            td {
                a href=(problem.link) target="_blank" rel="noopener" { (problem.title) }
            }
            td {
                span class=(difficulty_class(problem.difficulty)) {
                    (problem.difficulty.as_str())
                }
            }
            td.tags {
                @for tag in &problem.tags {
                    span.tag { (tag) }
                }
            }
            td {
                @if let Some(date) = problem.last_solved {
                    (date.to_locale_string())
                }
            }
            td {
                form method="post" action="/solve" {
                    input type="hidden" name="id" value=(id.to_hex());
                    button type="submit" { "Mark solved" }
                }
            }
        }
    }
}

pub fn topic_page(topic: &str, problems: &[Problem]) -> Markup {
    html! {
        h1 { (topic) }
        @for problem in problems {
            article.problem {
                h2 {
                    a href=(problem.link) target="_blank" rel="noopener" { (problem.title) }
                    " "
                    span class=(difficulty_class(problem.difficulty)) {
                        (problem.difficulty.as_str())
                    }
                }
                dl {
                    dt { "Attempts" }
                    dd { (problem.attempts) }
                    @if let Some(date) = problem.last_solved {
                        dt { "Last solved" }
                        dd { (date.to_locale_string()) }
                    }
                    @if !problem.time_complexity.is_empty() {
                        dt { "Time" }
                        dd { code { (problem.time_complexity) } }
                    }
                    @if !problem.space_complexity.is_empty() {
                        dt { "Space" }
                        dd { code { (problem.space_complexity) } }
                    }
                }
                @if !problem.notes.trim().is_empty() {
                    div.notes { (PreEscaped(markdown_to_html(&problem.notes))) }
                }
                @if problem.is_solved() {
                    div.solution { (PreEscaped(solution_to_html(&problem.solution))) }
                }
            }
        }
    }
}

fn difficulty_class(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "difficulty easy",
        Difficulty::Medium => "difficulty medium",
        Difficulty::Hard => "difficulty hard",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::helper::create_test_session;

    #[test]
    fn test_topic_url() {
        assert_eq!(topic_url("Array & String"), "/topic/Array%20%26%20String");
    }

    #[test]
    fn test_dashboard_lists_problems() -> Fallible<()> {
        let session = create_test_session()?;
        let html = dashboard(&session, &Filter::default(), Date::today()).into_string();
        assert!(html.contains("Welcome, admin"));
        assert!(html.contains("Two Sum"));
        assert!(html.contains(&ProblemId::of("Array & String", "3Sum").to_hex()));
        assert!(!html.contains("Recent activity"));
        Ok(())
    }

    #[test]
    fn test_dashboard_applies_filter() -> Fallible<()> {
        let session = create_test_session()?;
        let filter = Filter {
            difficulty: Some(Difficulty::Medium),
            ..Default::default()
        };
        let html = dashboard(&session, &filter, Date::today()).into_string();
        let problems = &html[html.find("<section class=\"problems\">").unwrap_or(0)..];
        assert!(problems.contains("3Sum"));
        assert!(!problems.contains("Fibonacci Number</a></td>"));
        Ok(())
    }

    #[test]
    fn test_topic_page_escapes_notes() -> Fallible<()> {
        let problem = Problem {
            notes: "Use **two pointers**. <b>raw</b>".to_string(),
            solution: "a < b".to_string(),
            ..Problem::new("3Sum", "L")
        };
        let html = topic_page("Array", &[problem]).into_string();
        assert!(html.contains("<strong>two pointers</strong>"));
        assert!(!html.contains("<b>raw</b>"));
        assert!(html.contains("a &lt; b"));
        Ok(())
    }
}

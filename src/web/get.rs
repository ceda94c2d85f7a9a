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

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use maud::html;
use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::filter::Filter;
use crate::filter::Status;
use crate::snapshot::export_file_name;
use crate::types::date::Date;
use crate::types::difficulty::Difficulty;
use crate::types::theme::Theme;
use crate::types::timestamp::Timestamp;
use crate::web::state::ServerState;
use crate::web::template::page_template;
use crate::web::view::dashboard;
use crate::web::view::topic_page;

/// Filter parameters as submitted by the dashboard form. Empty fields mean
/// "any".
#[derive(Deserialize, Default, Debug)]
pub struct FilterQuery {
    search: Option<String>,
    topic: Option<String>,
    difficulty: Option<String>,
    tag: Option<String>,
    status: Option<String>,
}

impl From<FilterQuery> for Filter {
    fn from(query: FilterQuery) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Filter {
            search: non_empty(query.search),
            topic: non_empty(query.topic),
            difficulty: non_empty(query.difficulty).and_then(|name| {
                Difficulty::ALL
                    .into_iter()
                    .find(|d| d.as_str().eq_ignore_ascii_case(&name))
            }),
            tag: non_empty(query.tag),
            status: match non_empty(query.status).as_deref() {
                Some("solved") => Some(Status::Solved),
                Some("unsolved") => Some(Status::Unsolved),
                _ => None,
            },
        }
    }
}

pub async fn root_handler(
    State(state): State<ServerState>,
    Query(query): Query<FilterQuery>,
) -> (StatusCode, Html<String>) {
    render(|| {
        let session = state.lock()?;
        let filter = Filter::from(query);
        let body = dashboard(&session, &filter, Date::today());
        let theme = Theme::load(session.db())?;
        Ok((StatusCode::OK, page_template("Dashboard", theme, body)))
    })
}

pub async fn topic_handler(
    State(state): State<ServerState>,
    Path(topic): Path<String>,
) -> (StatusCode, Html<String>) {
    render(|| {
        let session = state.lock()?;
        let theme = Theme::load(session.db())?;
        let page = match session.store().topic(&topic) {
            Some(problems) => (
                StatusCode::OK,
                page_template(&topic, theme, topic_page(&topic, problems)),
            ),
            None => {
                let body = html! { h1 { "No such topic" } p { (topic) } };
                (StatusCode::NOT_FOUND, page_template("Not Found", theme, body))
            }
        };
        Ok(page)
    })
}

pub async fn export_handler(
    State(state): State<ServerState>,
) -> (StatusCode, [(HeaderName, String); 2], String) {
    match export_json(&state) {
        Ok((file_name, json)) => (
            StatusCode::OK,
            [
                (CONTENT_TYPE, "application/json".to_string()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{file_name}\""),
                ),
            ],
            json,
        ),
        Err(e) => {
            log::error!("{e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [
                    (CONTENT_TYPE, "text/plain".to_string()),
                    (CONTENT_DISPOSITION, "inline".to_string()),
                ],
                e.to_string(),
            )
        }
    }
}

/// The export document and the file name to save it under.
fn export_json(state: &ServerState) -> Fallible<(String, String)> {
    let session = state.lock()?;
    let now = Timestamp::now();
    let json = session.export(now).to_json()?;
    Ok((export_file_name(session.user(), now), json))
}

fn render<F>(page: F) -> (StatusCode, Html<String>)
where
    F: FnOnce() -> Fallible<(StatusCode, maud::Markup)>,
{
    match page() {
        Ok((status, markup)) => (status, Html(markup.into_string())),
        Err(e) => error_page(e),
    }
}

pub fn error_page(e: ErrorReport) -> (StatusCode, Html<String>) {
    log::error!("{e}");
    let body = html! { h1 { "Error" } p { (e.message()) } };
    (StatusCode::INTERNAL_SERVER_ERROR, Html(body.into_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query() {
        let query = FilterQuery {
            search: Some("".to_string()),
            topic: Some("Array".to_string()),
            difficulty: Some("hard".to_string()),
            tag: None,
            status: Some("unsolved".to_string()),
        };
        let filter = Filter::from(query);
        assert_eq!(filter.search, None);
        assert_eq!(filter.topic.as_deref(), Some("Array"));
        assert_eq!(filter.difficulty, Some(Difficulty::Hard));
        assert_eq!(filter.status, Some(Status::Unsolved));
    }

    #[test]
    fn test_unknown_values_are_ignored() {
        let query = FilterQuery {
            difficulty: Some("impossible".to_string()),
            status: Some("maybe".to_string()),
            ..Default::default()
        };
        assert!(Filter::from(query).is_empty());
    }
}

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

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use serde::Deserialize;

use crate::error::Fallible;
use crate::types::problem_id::ProblemId;
use crate::web::get::error_page;
use crate::web::state::ServerState;

#[derive(Deserialize)]
pub struct SolveForm {
    id: String,
}

pub async fn solve_handler(
    State(state): State<ServerState>,
    Form(form): Form<SolveForm>,
) -> Response {
    let Ok(id) = ProblemId::from_hex(&form.id) else {
        return bad_request("invalid problem id.");
    };
    match solve(&state, id) {
        Ok(true) => Redirect::to("/").into_response(),
        Ok(false) => bad_request("problem not found."),
        Err(e) => error_page(e).into_response(),
    }
}

fn bad_request(message: &str) -> Response {
    log::debug!("Bad solve request: {message}");
    (StatusCode::BAD_REQUEST, Html(message.to_string())).into_response()
}

/// Marks the problem as solved. Returns false if no problem has this id.
fn solve(state: &ServerState, id: ProblemId) -> Fallible<bool> {
    let mut session = state.lock()?;
    let Some((topic, title)) = session
        .store()
        .find_by_id(id)
        .map(|(topic, problem)| (topic.to_string(), problem.title.clone()))
    else {
        return Ok(false);
    };
    session.mark_solved(&topic, &title)?;
    log::debug!("Marked {title:?} in {topic:?} as solved.");
    Ok(true)
}

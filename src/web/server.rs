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

use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::signal::ctrl_c;
use tokio::time::sleep;

use crate::config::ServerConfig;
use crate::error::Fallible;
use crate::session::Session;
use crate::session::wait_for_backups;
use crate::web::get::export_handler;
use crate::web::get::root_handler;
use crate::web::get::topic_handler;
use crate::web::post::solve_handler;
use crate::web::state::ServerState;

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(root_handler));
    let app = app.route("/topic/{name}", get(topic_handler));
    let app = app.route("/solve", post(solve_handler));
    let app = app.route("/export.json", get(export_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

/// Serves the dashboard until interrupted, then waits up to `backup_timeout`
/// for outstanding backups.
pub async fn start_server(
    session: Session,
    config: &ServerConfig,
    backup_timeout: Duration,
) -> Fallible<()> {
    let state = ServerState::new(session);
    let app = router(state.clone());
    let bind = format!("127.0.0.1:{}", config.port);

    if config.open_browser {
        // Start a separate task to open the browser.
        let url = format!("http://{bind}/");
        let target = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(target.as_str()).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            let _ = open::that(url);
        });
    }

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind.as_str()).await?;
    println!("Serving the dashboard on http://{bind}/");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = ctrl_c().await;
        })
        .await?;

    log::debug!("Server stopped.");
    let pending = state.lock()?.take_pending();
    wait_for_backups(pending, backup_timeout).await;
    Ok(())
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

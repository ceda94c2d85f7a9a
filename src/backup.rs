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

use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tokio::task::JoinHandle;

use crate::error::Fallible;
use crate::store::ProblemStore;

/// Best-effort copy of a user's data on a Firebase-style REST endpoint
/// (`<url>/users/<user>/<document>.json`).
///
/// Uploads run as detached tasks. Their failures are logged and go nowhere
/// else: the local database is the source of truth.
#[derive(Clone)]
pub struct RemoteBackup {
    client: Client,
    base_url: String,
}

impl RemoteBackup {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, user: &str, document: &str) -> String {
        let user = utf8_percent_encode(user, NON_ALPHANUMERIC);
        format!("{}/users/{user}/{document}.json", self.base_url)
    }

    /// Starts uploading `body` in the background. The handle resolves to the
    /// upload's outcome, which has already been logged.
    pub fn spawn_put(&self, user: &str, document: &str, body: String) -> JoinHandle<Fallible<()>> {
        let client = self.client.clone();
        let url = self.url(user, document);
        let label = format!("{user}/{document}");
        tokio::spawn(async move {
            let result = put(&client, &url, body).await;
            match &result {
                Ok(()) => log::debug!("Backed up {label}."),
                Err(e) => log::warn!("Backup of {label} failed (this is okay): {e}"),
            }
            result
        })
    }

    /// Fetches the backed-up problems. Returns None if there are none.
    pub async fn fetch_problems(&self, user: &str) -> Fallible<Option<ProblemStore>> {
        let response = self.client.get(self.url(user, "problems")).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = response.error_for_status()?.text().await?;
        let store: Option<ProblemStore> = serde_json::from_str(&text)?;
        Ok(store)
    }
}

async fn put(client: &Client, url: &str, body: String) -> Fallible<()> {
    client
        .put(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use axum::Router;
    use axum::extract::Path;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tokio::net::TcpListener;

    use super::*;
    use crate::error::ErrorReport;

    type Received = Arc<Mutex<Vec<(String, String, String)>>>;

    async fn put_handler(
        State(received): State<Received>,
        Path((user, document)): Path<(String, String)>,
        body: String,
    ) -> StatusCode {
        received.lock().unwrap().push((user, document, body));
        StatusCode::OK
    }

    async fn get_handler(Path((user, _)): Path<(String, String)>) -> (StatusCode, String) {
        if user == "admin" {
            (StatusCode::OK, r#"{"Array": [{"title": "Two Sum"}]}"#.to_string())
        } else {
            (StatusCode::OK, "null".to_string())
        }
    }

    async fn start_fake_remote() -> Fallible<(String, Received)> {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/users/{user}/{document}", get(get_handler).put(put_handler))
            .with_state(received.clone());
        let port = portpicker::pick_unused_port()
            .ok_or_else(|| ErrorReport::new("no free port"))?;
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok((format!("http://127.0.0.1:{port}/"), received))
    }

    #[test]
    fn test_url() {
        let backup = RemoteBackup::new("https://db.example.com/");
        assert_eq!(
            backup.url("admin", "problems"),
            "https://db.example.com/users/admin/problems.json"
        );
        assert_eq!(
            backup.url("a b", "goals"),
            "https://db.example.com/users/a%20b/goals.json"
        );
    }

    #[tokio::test]
    async fn test_put() -> Fallible<()> {
        let (url, received) = start_fake_remote().await?;
        let backup = RemoteBackup::new(&url);
        backup
            .spawn_put("admin", "goals", r#"{"daily":1}"#.to_string())
            .await??;
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "admin");
        assert_eq!(received[0].1, "goals.json");
        assert_eq!(received[0].2, r#"{"daily":1}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_failure_is_contained() -> Fallible<()> {
        let port = portpicker::pick_unused_port()
            .ok_or_else(|| ErrorReport::new("no free port"))?;
        let backup = RemoteBackup::new(&format!("http://127.0.0.1:{port}"));
        let result = backup.spawn_put("admin", "problems", "{}".to_string()).await?;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_problems() -> Fallible<()> {
        let (url, _) = start_fake_remote().await?;
        let backup = RemoteBackup::new(&url);
        let store = backup.fetch_problems("admin").await?;
        assert_eq!(store.map(|s| s.len()), Some(1));
        assert_eq!(backup.fetch_problems("demo").await?, None);
        Ok(())
    }
}

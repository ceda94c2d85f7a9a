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

use crate::error::Fallible;
use crate::error::fail;
use crate::session::Session;

/// Pulls the remote backup and keeps it if it has more topics than the
/// local copy.
pub async fn sync(session: &mut Session) -> Fallible<()> {
    let Some(backup) = session.backup().cloned() else {
        return fail("no backup URL configured. Set `backup.url` in tracker.toml.");
    };
    match backup.fetch_problems(session.user()).await? {
        None => println!("No remote data for {}.", session.user()),
        Some(remote) => {
            if session.adopt_remote(remote)? {
                println!("Loaded data from the remote backup.");
            } else {
                println!("Local data is up to date.");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tokio::net::TcpListener;

    use super::*;
    use crate::backup::RemoteBackup;
    use crate::db::Database;
    use crate::error::ErrorReport;
    use crate::helper::create_test_session;

    const REMOTE: &str = r#"{
        "Array": [{"title": "Two Sum", "link": "L1"}],
        "Graphs": [{"title": "Clone Graph", "link": "L2"}],
        "Trees": [{"title": "Invert Binary Tree", "link": "L3"}]
    }"#;

    async fn start_fake_remote() -> Fallible<String> {
        let app = Router::new().route(
            "/users/{user}/{document}",
            get(|| async { (StatusCode::OK, REMOTE) }).put(|| async { StatusCode::OK }),
        );
        let port = portpicker::pick_unused_port()
            .ok_or_else(|| ErrorReport::new("no free port"))?;
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok(format!("http://127.0.0.1:{port}"))
    }

    #[tokio::test]
    async fn test_sync_adopts_larger_remote() -> Fallible<()> {
        let url = start_fake_remote().await?;
        let backup = RemoteBackup::new(&url);
        let mut session = Session::open(Database::in_memory()?, "admin", Some(backup))?;
        assert_eq!(session.store().topic_count(), 2);
        sync(&mut session).await?;
        assert_eq!(session.store().topic_count(), 3);
        assert!(session.store().find_by_title("Trees", "Invert Binary Tree").is_some());
        // Syncing again finds nothing new.
        sync(&mut session).await?;
        assert_eq!(session.store().topic_count(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_without_backup() -> Fallible<()> {
        let mut session = create_test_session()?;
        let err = sync(&mut session).await.unwrap_err();
        assert!(err.message().starts_with("no backup URL configured"));
        Ok(())
    }
}

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

use std::path::PathBuf;

use tempfile::tempdir;

use crate::db::Database;
use crate::error::Fallible;
use crate::session::Session;

/// Creates a scratch directory that outlives the returned path.
pub fn create_tmp_directory() -> Fallible<PathBuf> {
    let directory: PathBuf = tempdir()?.keep().canonicalize()?;
    Ok(directory)
}

/// A session for `admin` over an empty in-memory database, seeded with the
/// default problems.
pub fn create_test_session() -> Fallible<Session> {
    let db = Database::in_memory()?;
    Session::open(db, "admin", None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tmp_directory() -> Fallible<()> {
        let directory = create_tmp_directory()?;
        assert!(directory.exists());
        Ok(())
    }

    #[test]
    fn test_create_test_session() -> Fallible<()> {
        let session = create_test_session()?;
        assert_eq!(session.user(), "admin");
        Ok(())
    }
}

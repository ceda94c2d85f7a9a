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

use std::fs::write;
use std::path::PathBuf;

use crate::error::Fallible;
use crate::session::Session;
use crate::snapshot::export_file_name;
use crate::types::timestamp::Timestamp;

/// Writes the user's problems and goals to `output`, or to a dated file in
/// the current directory. Returns the path written.
pub fn export_problems(session: &Session, output: Option<PathBuf>) -> Fallible<PathBuf> {
    let now = Timestamp::now();
    let path = match output {
        Some(path) => path,
        None => PathBuf::from(export_file_name(session.user(), now)),
    };
    let json = session.export(now).to_json()?;
    write(&path, json)?;
    log::debug!("Wrote export to {}.", path.display());
    println!("Data exported successfully to {}.", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use super::*;
    use crate::helper::create_test_session;
    use crate::helper::create_tmp_directory;
    use crate::snapshot::ImportPayload;
    use crate::snapshot::SnapshotFormat;

    #[test]
    fn test_export_can_be_imported() -> Fallible<()> {
        let session = create_test_session()?;
        let directory = create_tmp_directory()?;
        let path = export_problems(&session, Some(directory.join("out.json")))?;
        let payload = ImportPayload::parse(&read_to_string(path)?)?;
        assert_eq!(payload.format, SnapshotFormat::Standard);
        assert_eq!(payload.problem_count(), 3);
        assert!(payload.goals.is_some());
        Ok(())
    }
}

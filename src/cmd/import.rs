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

use std::fs::read_to_string;
use std::path::Path;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::reconcile::DuplicatePolicy;
use crate::reconcile::ImportStats;
use crate::session::Session;
use crate::snapshot::ImportPayload;

pub fn import_file(session: &mut Session, path: &Path, policy: DuplicatePolicy) -> Fallible<()> {
    let text = read_to_string(path)
        .map_err(|e| ErrorReport::new(format!("error reading file: {e}")))?;
    let payload = ImportPayload::parse(&text)?;
    log::debug!("Import file is in {:?} format.", payload.format);
    if payload.problem_count() == 0 {
        return fail("no problems found in file.");
    }
    let stats = session.import(&payload, policy)?;
    print!("{}", import_summary(&stats));
    Ok(())
}

/// The report shown after an import. Zero counts other than `Imported` are
/// left out.
pub fn import_summary(stats: &ImportStats) -> String {
    let mut lines = vec![
        "Import Summary".to_string(),
        format!("  Total Problems: {}", stats.total),
        format!("  Imported:       {}", stats.imported),
    ];
    if stats.updated > 0 {
        lines.push(format!("  Updated:        {}", stats.updated));
    }
    if stats.skipped > 0 {
        lines.push(format!("  Skipped:        {}", stats.skipped));
    }
    if stats.errors > 0 {
        lines.push(format!("  Errors:         {}", stats.errors));
    }
    let processed = stats.imported + stats.updated;
    if processed > 0 {
        lines.push(format!("Successfully processed {processed} problems!"));
    }
    let mut summary = lines.join("\n");
    summary.push('\n');
    summary
}

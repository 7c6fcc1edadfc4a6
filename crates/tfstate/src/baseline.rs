//! Reading the last-deployed baseline from a single state file.

use crate::document::{StateDocument, Variant};
use crate::error::Result;
use crate::types::Baseline;
use std::path::Path;

/// Read one flat state file.
///
/// Unlike aggregation, nothing is tolerated here: an unreadable file, bad
/// JSON, a non-object top level, or a malformed entry all fail the read.
pub fn read(path: &Path) -> Result<Baseline> {
    let doc = StateDocument::load(path)?;

    if doc.variant() == Variant::Legacy {
        log::warn!(
            "{} is a legacy (modules) state document; baseline reads top-level resources only",
            path.display()
        );
    }

    let resources = doc
        .flat_records()?
        .into_iter()
        .map(|record| record.with_source(path))
        .collect();
    let baseline = Baseline::new(path, resources);

    log::debug!("Baseline resource types: {:?}", baseline.types());
    log::info!(
        "Read {} resources from {}",
        baseline.len(),
        path.display()
    );
    Ok(baseline)
}

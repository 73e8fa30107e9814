//! Parent/child mapping file

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::api::MappingIds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPair {
    pub parent_entity_id: String,
    pub child_entity_id: String,
}

/// Pair parent and child ids by position. The lists must be the same length;
/// ids are never matched up by value.
pub fn pair_ids(ids: MappingIds) -> Result<Vec<MappingPair>> {
    let MappingIds {
        parent_entity_ids,
        child_entity_ids,
    } = ids;

    if parent_entity_ids.len() != child_entity_ids.len() {
        bail!(
            "Malformed mapping response: {} parentEntityIds but {} childEntityIds",
            parent_entity_ids.len(),
            child_entity_ids.len()
        );
    }

    Ok(parent_entity_ids
        .into_iter()
        .zip(child_entity_ids)
        .map(|(parent_entity_id, child_entity_id)| MappingPair {
            parent_entity_id,
            child_entity_id,
        })
        .collect())
}

/// Write `header` followed by one row per pair, replacing any existing file
pub fn write_mapping_csv(path: &Path, header: &[String; 2], pairs: &[MappingPair]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create mapping file: {}", path.display()))?;

    writer.write_record(header)?;
    for pair in pairs {
        writer.write_record([&pair.parent_entity_id, &pair.child_entity_id])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush mapping file: {}", path.display()))?;
    Ok(())
}

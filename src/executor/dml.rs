use crate::core::{JsonDbError, Record, Result};
use std::collections::{HashMap, HashSet};

/// Assign missing ids and reject ids already present in `existing` or
/// repeated within `incoming`. Nothing is returned unless every record
/// passes.
pub fn prepare_insert(existing: &[Record], incoming: Vec<Record>) -> Result<Vec<Record>> {
    let mut taken: HashSet<String> = existing
        .iter()
        .filter_map(|e| e.id().map(str::to_string))
        .collect();

    let mut prepared = Vec::with_capacity(incoming.len());
    for mut record in incoming {
        let id = record.ensure_id()?;
        if !taken.insert(id.clone()) {
            return Err(JsonDbError::DuplicateId(id));
        }
        prepared.push(record);
    }
    Ok(prepared)
}

/// Replace entries whose id matches an incoming record, append the rest.
/// Returns the records as written (with ids filled in).
pub fn apply_upsert(entries: &mut Vec<Record>, incoming: Vec<Record>) -> Result<Vec<Record>> {
    let mut positions: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.id().map(|id| (id.to_string(), i)))
        .collect();

    let mut written = Vec::with_capacity(incoming.len());
    for mut record in incoming {
        let id = record.ensure_id()?;
        match positions.get(&id) {
            Some(&index) => entries[index] = record.clone(),
            None => {
                positions.insert(id, entries.len());
                entries.push(record.clone());
            }
        }
        written.push(record);
    }
    Ok(written)
}

use crate::core::Record;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Outcome of patching a working set and merging it back.
#[derive(Debug)]
pub struct UpdateOutcome {
    /// Full table after the merge, in original order
    pub entries: Vec<Record>,
    /// Number of patched entries that made it into `entries`
    pub updated: usize,
}

/// Two-phase update: patch the filtered `working` set, then merge it into
/// the authoritative full table. Entries with an id are matched by id,
/// entries without one by their pre-patch value (each match consumed
/// once). Entries outside the working set are kept as they are.
pub fn apply_update(
    working: Vec<Record>,
    patch: &Map<String, Value>,
    authoritative: Vec<Record>,
) -> UpdateOutcome {
    let mut by_id: HashMap<String, Record> = HashMap::with_capacity(working.len());
    let mut by_value: Vec<(Record, Record)> = Vec::new();

    for mut record in working {
        let original = record.clone();
        if !record.apply_patch(patch) {
            continue;
        }
        match original.id().map(str::to_string) {
            Some(id) => {
                by_id.insert(id, record);
            }
            None => by_value.push((original, record)),
        }
    }

    let mut updated = 0;
    let entries = authoritative
        .into_iter()
        .map(|entry| {
            let replacement = match entry.id() {
                Some(id) => by_id.remove(id),
                None => by_value
                    .iter()
                    .position(|(original, _)| *original == entry)
                    .map(|i| by_value.remove(i).1),
            };
            match replacement {
                Some(patched) => {
                    updated += 1;
                    patched
                }
                None => entry,
            }
        })
        .collect();

    UpdateOutcome { entries, updated }
}

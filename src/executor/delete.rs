use crate::core::Record;
use std::collections::HashSet;

/// Entries of `all` that are not in `doomed`, plus how many were removed.
/// Identity is the record id; id-less records compare by value.
pub fn difference(all: Vec<Record>, doomed: &[Record]) -> (Vec<Record>, usize) {
    let doomed_ids: HashSet<&str> = doomed.iter().filter_map(|e| e.id()).collect();
    let before = all.len();
    let survivors: Vec<Record> = all
        .into_iter()
        .filter(|entry| match entry.id() {
            Some(id) => !doomed_ids.contains(id),
            None => !doomed.contains(entry),
        })
        .collect();
    let removed = before - survivors.len();
    (survivors, removed)
}

/// Drop entries whose id is listed in `ids`.
pub fn remove_ids<S: AsRef<str>>(all: Vec<Record>, ids: &[S]) -> (Vec<Record>, usize) {
    let wanted: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
    let before = all.len();
    let survivors: Vec<Record> = all
        .into_iter()
        .filter(|entry| !entry.id().is_some_and(|id| wanted.contains(id)))
        .collect();
    let removed = before - survivors.len();
    (survivors, removed)
}

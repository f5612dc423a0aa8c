// ============================================================================
// src/executor/sort.rs - ORDER BY stage
// ============================================================================
//
// - entries without the sort key are dropped before sorting
// - asc/desc use a stable sort, equal keys keep their relative order
// - rand is a uniform shuffle (Fisher-Yates via rand::SliceRandom)
//
// ============================================================================

use crate::core::Record;
use crate::evaluator::comparison::sort_cmp;
use crate::planner::{Order, OrderBy};
use rand::seq::SliceRandom;

pub fn apply_order(entries: Vec<Record>, order_by: &OrderBy) -> Vec<Record> {
    let key = order_by.key.as_str();
    let mut entries: Vec<Record> = entries.into_iter().filter(|e| e.contains(key)).collect();

    match order_by.order {
        Order::Asc => entries.sort_by(|a, b| compare_by_key(a, b, key)),
        Order::Desc => entries.sort_by(|a, b| compare_by_key(b, a, key)),
        Order::Random => entries.shuffle(&mut rand::thread_rng()),
    }

    entries
}

fn compare_by_key(a: &Record, b: &Record, key: &str) -> std::cmp::Ordering {
    match (a.get(key), b.get(key)) {
        (Some(left), Some(right)) => sort_cmp(left, right),
        // Unreachable after the filter above, keep the sort total anyway
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

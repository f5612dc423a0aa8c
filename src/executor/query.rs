// ============================================================================
// src/executor/query.rs - read pipeline
// ============================================================================
//
// Fixed stage order: WHERE -> OR-WHERE -> ORDER -> LIMIT -> PROJECTION.
// Each stage is skipped when the query does not carry it. LIMIT runs after
// ORDER, so offsets are relative to the sorted sequence.
//
// ============================================================================

use super::sort::apply_order;
use crate::core::Record;
use crate::evaluator::PredicateEvaluator;
use crate::planner::{Limit, Projection, QuerySpec};
use std::collections::HashSet;

pub struct QueryExecutor {
    evaluator: PredicateEvaluator,
}

impl QueryExecutor {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            evaluator: PredicateEvaluator::new(case_sensitive),
        }
    }

    /// Evaluate `spec` against the full table `entries`.
    pub fn execute(&self, spec: &QuerySpec, entries: &[Record]) -> Vec<Record> {
        if !spec.use_conditions() {
            return entries.to_vec();
        }

        let mut result = self.filter(spec, entries);

        if let Some(order_by) = spec.order() {
            result = apply_order(result, order_by);
        }

        if let Some(limit) = spec.limit() {
            result = apply_limit(result, limit);
        }

        if let Projection::Fields(fields) = spec.projection() {
            result = result.iter().map(|e| e.project(fields)).collect();
        }

        result
    }

    /// WHERE and OR-WHERE stages only.
    fn filter(&self, spec: &QuerySpec, entries: &[Record]) -> Vec<Record> {
        if spec.filters().is_empty() {
            return entries.to_vec();
        }

        let mut result: Vec<Record> = entries
            .iter()
            .filter(|e| self.evaluator.matches_all(e, spec.filters()))
            .cloned()
            .collect();

        if !spec.or_filters().is_empty() {
            // OR group runs on the untouched table, then unions into the AND result
            let alternatives = entries
                .iter()
                .filter(|e| self.evaluator.matches_all(e, spec.or_filters()));
            union_into(&mut result, alternatives);
        }

        result
    }
}

fn apply_limit(entries: Vec<Record>, limit: Limit) -> Vec<Record> {
    entries
        .into_iter()
        .skip(limit.offset)
        .take(limit.limit.unwrap_or(usize::MAX))
        .collect()
}

/// Append records from `extra` not already in `base`, by id when present
/// and by value otherwise.
fn union_into<'a>(base: &mut Vec<Record>, extra: impl Iterator<Item = &'a Record>) {
    let mut seen: HashSet<String> = base
        .iter()
        .filter_map(|e| e.id().map(str::to_string))
        .collect();
    for record in extra {
        let duplicate = match record.id() {
            Some(id) => !seen.insert(id.to_string()),
            None => base.contains(record),
        };
        if !duplicate {
            base.push(record.clone());
        }
    }
}

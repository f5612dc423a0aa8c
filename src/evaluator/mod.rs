pub mod comparison;

use crate::core::Record;
use crate::planner::{Operator, Predicate};
use comparison::{compare, contains, loose_eq};
use std::cmp::Ordering;

/// Evaluates predicates against records
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateEvaluator {
    case_sensitive: bool,
}

impl PredicateEvaluator {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Does `record` satisfy `predicate`? A record without the field never
    /// matches, whatever the operator.
    pub fn matches(&self, record: &Record, predicate: &Predicate) -> bool {
        let Some(value) = record.get(predicate.field()) else {
            return false;
        };
        let operand = predicate.operand();

        match predicate.op() {
            Operator::Eq => loose_eq(value, operand, self.case_sensitive),
            Operator::NotEq => !loose_eq(value, operand, self.case_sensitive),
            Operator::Gt => compare(value, operand) == Some(Ordering::Greater),
            Operator::Lt => compare(value, operand) == Some(Ordering::Less),
            Operator::GtEq => matches!(
                compare(value, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::LtEq => matches!(
                compare(value, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Contains => contains(value, operand),
            Operator::NotContains => !contains(value, operand),
            Operator::Between => match predicate.bounds() {
                Some((lo, hi)) => {
                    matches!(compare(value, lo), Some(Ordering::Greater | Ordering::Equal))
                        && matches!(compare(value, hi), Some(Ordering::Less | Ordering::Equal))
                }
                None => false,
            },
        }
    }

    /// AND over all predicates, checked in declaration order.
    pub fn matches_all(&self, record: &Record, predicates: &[Predicate]) -> bool {
        predicates.iter().all(|p| self.matches(record, p))
    }
}

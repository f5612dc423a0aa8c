// ============================================================================
// Value comparison rules shared by predicates and ORDER BY
// ============================================================================
//
// - numbers compare numerically, strings lexicographically, booleans
//   false < true
// - a number and a numeric string compare as numbers
// - any other mix is unordered for predicates
// - sorting groups by type before comparing, so it stays a total order
//
// ============================================================================

use serde_json::Value;
use std::cmp::Ordering;

/// Numeric view of a value: numbers, and strings that parse as numbers.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok().filter(|f| !f.is_nan())
            }
        }
        _ => None,
    }
}

/// Textual view of a value, used by containment operators.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose equality. Strings ignore case unless `case_sensitive` is set.
pub fn loose_eq(left: &Value, right: &Value, case_sensitive: bool) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => {
            if case_sensitive {
                a == b
            } else {
                a == b || a.to_lowercase() == b.to_lowercase()
            }
        }
        (Value::Number(_), Value::Number(_))
        | (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_)) => match (as_number(left), as_number(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        _ => left == right,
    }
}

/// Ordering of two comparable values, `None` when they are not comparable.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(_), Value::Number(_))
        | (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_)) => {
            let a = as_number(left)?;
            let b = as_number(right)?;
            a.partial_cmp(&b)
        }
        _ => None,
    }
}

/// `field` contains `needle`: element membership for arrays, substring
/// match on the textual form otherwise. Always case-sensitive.
pub fn contains(field: &Value, needle: &Value) -> bool {
    match field {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle, true)),
        other => as_text(other).contains(&as_text(needle)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order for sorting: values are grouped by type first, then
/// compared within the group. Arrays and objects tie.
pub fn sort_cmp(left: &Value, right: &Value) -> Ordering {
    type_rank(left)
        .cmp(&type_rank(right))
        .then_with(|| compare(left, right).unwrap_or(Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loose_eq_strings() {
        assert!(loose_eq(&json!("Alice"), &json!("alice"), false));
        assert!(!loose_eq(&json!("Alice"), &json!("alice"), true));
    }

    #[test]
    fn test_loose_eq_numbers() {
        assert!(loose_eq(&json!(1), &json!(1.0), true));
        assert!(loose_eq(&json!("1"), &json!(1), true));
        assert!(!loose_eq(&json!("one"), &json!(1), false));
        assert!(!loose_eq(&json!(true), &json!(1), false));
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(&json!(2), &json!(10)), Some(Ordering::Less));
        assert_eq!(compare(&json!("b"), &json!("a")), Some(Ordering::Greater));
        assert_eq!(compare(&json!("10"), &json!(9)), Some(Ordering::Greater));
        assert_eq!(compare(&json!([1]), &json!(1)), None);
        assert_eq!(compare(&json!(null), &json!(1)), None);
    }

    #[test]
    fn test_contains() {
        assert!(contains(&json!("hello world"), &json!("lo w")));
        assert!(!contains(&json!("hello"), &json!("HELLO")));
        assert!(contains(&json!(12345), &json!(234)));
        assert!(contains(&json!(["red", "blue"]), &json!("blue")));
        assert!(!contains(&json!(["red", "blue"]), &json!("re")));
    }

    #[test]
    fn test_sort_cmp_total() {
        let mut values = vec![json!("b"), json!(3), json!(null), json!(1), json!("a")];
        values.sort_by(sort_cmp);
        assert_eq!(values, vec![json!(null), json!(1), json!(3), json!("a"), json!("b")]);
    }
}

use crate::core::{JsonDbError, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operators accepted by `filter` / `or_filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=` or `<>`
    NotEq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    GtEq,
    /// `<=`
    LtEq,
    /// `in` or `like`: substring (or array element) containment
    Contains,
    /// `not in` or `not like`
    NotContains,
    /// `between`: inclusive range, operand is `[lo, hi]`
    Between,
}

impl Operator {
    pub const ALLOWED: &'static [&'static str] = &[
        "=", "!=", "<>", ">", "<", ">=", "<=", "in", "like", "not in", "not like", "between",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::GtEq => ">=",
            Self::LtEq => "<=",
            Self::Contains => "like",
            Self::NotContains => "not like",
            Self::Between => "between",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = JsonDbError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "=" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::NotEq),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::GtEq),
            "<=" => Ok(Self::LtEq),
            "in" | "like" => Ok(Self::Contains),
            "not in" | "not like" => Ok(Self::NotContains),
            "between" => Ok(Self::Between),
            _ => Err(JsonDbError::UnsupportedOperator {
                operator: s.to_string(),
                allowed: Self::ALLOWED.join(", "),
            }),
        }
    }
}

/// One `field <op> operand` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    op: Operator,
    operand: Value,
}

impl Predicate {
    /// Fails with `InvalidOperand` when `between` is not given `[lo, hi]`.
    pub fn new(field: impl Into<String>, op: Operator, operand: impl Into<Value>) -> Result<Self> {
        let field = field.into();
        let operand = operand.into();
        if op == Operator::Between && !matches!(&operand, Value::Array(bounds) if bounds.len() == 2)
        {
            return Err(JsonDbError::InvalidOperand(format!(
                "operator 'between' on field '{}' needs a two element array, got {}",
                field, operand
            )));
        }
        Ok(Self { field, op, operand })
    }

    /// Like [`Predicate::new`] with the operator given as text.
    pub fn parse(field: impl Into<String>, op: &str, operand: impl Into<Value>) -> Result<Self> {
        Self::new(field, op.parse()?, operand)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn operand(&self) -> &Value {
        &self.operand
    }

    /// `(lo, hi)` for a `between` predicate.
    pub fn bounds(&self) -> Option<(&Value, &Value)> {
        match &self.operand {
            Value::Array(bounds) if self.op == Operator::Between && bounds.len() == 2 => {
                Some((&bounds[0], &bounds[1]))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_all_spellings() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("<>".parse::<Operator>().unwrap(), Operator::NotEq);
        assert_eq!("LIKE".parse::<Operator>().unwrap(), Operator::Contains);
        assert_eq!("in".parse::<Operator>().unwrap(), Operator::Contains);
        assert_eq!("not  in".parse::<Operator>().unwrap(), Operator::NotContains);
        assert_eq!("between".parse::<Operator>().unwrap(), Operator::Between);
    }

    #[test]
    fn test_unknown_operator_lists_allowed() {
        let err = "~=".parse::<Operator>().unwrap_err();
        match err {
            JsonDbError::UnsupportedOperator { operator, allowed } => {
                assert_eq!(operator, "~=");
                assert!(allowed.contains("not like"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_between_needs_pair() {
        assert!(Predicate::new("score", Operator::Between, json!([1, 2])).is_ok());
        assert!(matches!(
            Predicate::new("score", Operator::Between, json!(5)),
            Err(JsonDbError::InvalidOperand(_))
        ));
        assert!(matches!(
            Predicate::parse("score", "between", json!([1, 2, 3])),
            Err(JsonDbError::InvalidOperand(_))
        ));
    }

    #[test]
    fn test_bounds() {
        let predicate = Predicate::new("s", Operator::Between, json!([6, 15])).unwrap();
        assert_eq!(predicate.bounds(), Some((&json!(6), &json!(15))));
        assert_eq!(predicate.to_string(), "s between [6,15]");
    }
}

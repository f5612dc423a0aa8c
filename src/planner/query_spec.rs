use super::predicate::{Operator, Predicate};
use crate::core::{JsonDbError, Result};
use std::fmt;
use std::str::FromStr;

/// Sort direction for `order_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
    /// Uniform shuffle, not reproducible
    Random,
}

impl FromStr for Order {
    type Err = JsonDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            "rand" | "random" => Ok(Self::Random),
            other => Err(JsonDbError::InvalidQuery(format!(
                "unknown sort order '{}', expected asc, desc or rand",
                other
            ))),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Random => "rand",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub key: String,
    pub order: Order,
}

/// Page window: `offset` entries skipped, at most `limit` kept (`None` = to the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limit {
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Field projection applied last.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    All,
    Fields(Vec<String>),
}

impl Projection {
    /// `["*"]` (or an empty list) selects everything.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() || fields.iter().any(|f| f == "*") {
            Self::All
        } else {
            Self::Fields(fields)
        }
    }
}

/// Join request. Recorded on the query but never evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub field: String,
    pub operator: Operator,
    pub local_field: String,
}

/// Accumulated query description.
///
/// Every `with_*` method consumes the spec and returns the extended one, so
/// a spec value never changes behind the back of whoever holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    table: String,
    filters: Vec<Predicate>,
    or_filters: Vec<Predicate>,
    order: Option<OrderBy>,
    limit: Option<Limit>,
    projection: Projection,
    join: Option<Join>,
    use_conditions: bool,
}

impl QuerySpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            or_filters: Vec::new(),
            order: None,
            limit: None,
            projection: Projection::All,
            join: None,
            use_conditions: true,
        }
    }

    pub fn with_filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// OR group predicates are only meaningful next to an AND group.
    pub fn with_or_filter(mut self, predicate: Predicate) -> Result<Self> {
        if self.filters.is_empty() {
            return Err(JsonDbError::InvalidQuery(format!(
                "or-filter on '{}' requires at least one filter",
                predicate.field()
            )));
        }
        self.or_filters.push(predicate);
        Ok(self)
    }

    pub fn with_order(mut self, key: impl Into<String>, order: Order) -> Self {
        self.order = Some(OrderBy {
            key: key.into(),
            order,
        });
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>, offset: usize) -> Self {
        self.limit = Some(Limit { limit, offset });
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.join = Some(join);
        self
    }

    /// Same spec, but evaluation returns the full unfiltered table.
    pub fn without_conditions(mut self) -> Self {
        self.use_conditions = false;
        self
    }

    pub fn without_or_filters(mut self) -> Self {
        self.or_filters.clear();
        self
    }

    /// Drops projection, for working sets that get written back.
    pub fn without_projection(mut self) -> Self {
        self.projection = Projection::All;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    pub fn or_filters(&self) -> &[Predicate] {
        &self.or_filters
    }

    pub fn order(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn join(&self) -> Option<&Join> {
        self.join.as_ref()
    }

    pub fn use_conditions(&self) -> bool {
        self.use_conditions
    }

    /// True when evaluation would do anything besides returning the table.
    pub fn has_conditions(&self) -> bool {
        self.use_conditions
            && (!self.filters.is_empty()
                || !self.or_filters.is_empty()
                || self.order.is_some()
                || self.limit.is_some()
                || self.projection != Projection::All)
    }
}

pub mod predicate;
pub mod query_spec;

pub use predicate::{Operator, Predicate};
pub use query_spec::{Join, Limit, Order, OrderBy, Projection, QuerySpec};

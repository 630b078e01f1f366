//! Composable query predicates over a single entity table.
//!
//! A [`Predicate`] is a conjunction of per-column [`Condition`]s and of
//! conditions on the id of a related entity. The same predicate is rendered
//! to SQL by [`sql`] and evaluated against in-memory rows by
//! [`Predicate::matches`]; both follow SQL null semantics.

pub mod page;
pub mod sql;

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

pub use page::{Direction, Page, Pageable, PageableError, Sort};

/// A column of an entity table.
pub trait Column: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    type Relation: Relation;

    const TABLE: &'static str;
    const ID: Self;

    /// Column name in the table.
    fn name(self) -> &'static str;

    /// Resolves the field name used in query parameters and JSON.
    fn from_field(field: &str) -> Option<Self>;
}

/// A join from an entity table to a related table whose `id` is filtered on.
pub trait Relation: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    fn table(self) -> &'static str;

    /// Join condition linking a row of the related table to the outer row.
    fn join_on(self) -> &'static str;
}

/// A row the in-memory backend can evaluate predicates against.
pub trait Record<C: Column> {
    fn value(&self, column: C) -> Value;

    /// Ids of the existing related entities reachable through `relation`.
    fn related_ids(&self, relation: C::Relation) -> Vec<i64>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Native ordering of two values of the same kind. `None` for nulls and
    /// for mismatched kinds.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Ordering used for sorting: nulls sort after every value, as they do
    /// for an ascending ORDER BY in PostgreSQL.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    fn is(&self, other: &Value, wanted: &[Ordering]) -> bool {
        self.compare(other).map_or(false, |o| wanted.contains(&o))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A single test applied to one column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `true`: the value must be non-null, `false`: it must be null.
    Specified(bool),
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    GreaterThan(Value),
    GreaterOrEqualThan(Value),
    LessThan(Value),
    LessOrEqualThan(Value),
    /// Case-insensitive substring match.
    Contains(String),
    DoesNotContain(String),
}

impl Condition {
    pub fn test(&self, value: &Value) -> bool {
        match self {
            Condition::Specified(specified) => value.is_null() != *specified,
            Condition::In(values) if values.is_empty() => false,
            Condition::NotIn(values) if values.is_empty() => true,
            _ if value.is_null() => false,
            Condition::Equals(v) => value.is(v, &[Ordering::Equal]),
            Condition::NotEquals(v) => value.is(v, &[Ordering::Less, Ordering::Greater]),
            Condition::In(values) => values.iter().any(|v| value.is(v, &[Ordering::Equal])),
            Condition::NotIn(values) => values
                .iter()
                .all(|v| value.is(v, &[Ordering::Less, Ordering::Greater])),
            Condition::GreaterThan(v) => value.is(v, &[Ordering::Greater]),
            Condition::GreaterOrEqualThan(v) => value.is(v, &[Ordering::Greater, Ordering::Equal]),
            Condition::LessThan(v) => value.is(v, &[Ordering::Less]),
            Condition::LessOrEqualThan(v) => value.is(v, &[Ordering::Less, Ordering::Equal]),
            Condition::Contains(needle) => text_contains(value, needle).unwrap_or(false),
            Condition::DoesNotContain(needle) => text_contains(value, needle).map_or(false, |found| !found),
        }
    }
}

fn text_contains(value: &Value, needle: &str) -> Option<bool> {
    match value {
        Value::Text(text) => Some(text.to_uppercase().contains(&needle.to_uppercase())),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<C: Column> {
    Field(C, Condition),
    /// Holds when a related entity whose id satisfies the condition exists.
    /// `Specified(false)` holds when no related entity exists.
    Related(C::Relation, Condition),
    /// Conjunction; the empty conjunction matches everything.
    And(Vec<Predicate<C>>),
}

impl<C: Column> Predicate<C> {
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn and(self, other: Predicate<C>) -> Self {
        let mut parts = match self {
            Predicate::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Predicate::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Predicate::And(parts)
    }

    pub fn is_all(&self) -> bool {
        match self {
            Predicate::And(parts) => parts.iter().all(Predicate::is_all),
            _ => false,
        }
    }

    pub fn matches<R: Record<C>>(&self, record: &R) -> bool {
        match self {
            Predicate::Field(column, condition) => condition.test(&record.value(*column)),
            Predicate::Related(relation, condition) => {
                let ids = record.related_ids(*relation);
                match condition {
                    Condition::Specified(specified) => ids.is_empty() != *specified,
                    _ => ids.into_iter().any(|id| condition.test(&Value::Int(id))),
                }
            }
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
        }
    }
}

//! Criteria objects: one optional filter per queryable field, read from the
//! request's query string and translated into a [`Predicate`] that is the
//! conjunction of every filter the caller supplied.

pub mod department;
pub mod employee;

use std::fmt;

use crate::filter::{FilterError, FilterSpec};
use crate::query::{Column, Predicate};

pub use department::DepartmentCriteria;
pub use employee::EmployeeCriteria;

/// Query parameters that belong to paging, not filtering.
const PAGING_PARAMS: [&str; 3] = ["page", "size", "sort"];

#[derive(Debug, PartialEq)]
pub enum CriteriaError {
    UnknownParameter(String),
    UnknownField(String),
    InvalidFilter { field: String, source: FilterError },
}

impl fmt::Display for CriteriaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaError::UnknownParameter(name) => write!(f, "Unknown query parameter: {}", name),
            CriteriaError::UnknownField(field) => write!(f, "Unknown filter field: {}", field),
            CriteriaError::InvalidFilter { field, source } => write!(f, "Invalid filter on {}: {}", field, source),
        }
    }
}

/// Decoded `key=value` pairs of a query string, in order.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        QueryParams {
            pairs: url::form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
        }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub trait Criteria: Default + fmt::Debug {
    type Column: Column;

    /// Routes one `<field>.<op>=<raw>` parameter to the field's filter.
    fn apply(&mut self, field: &str, op: &str, raw: &str) -> Result<(), CriteriaError>;

    fn to_predicate(&self) -> Predicate<Self::Column>;

    /// Builds the criteria from every filter parameter, skipping paging
    /// parameters. Anything that is neither is rejected.
    fn from_params(params: &QueryParams) -> Result<Self, CriteriaError> {
        let mut criteria = Self::default();
        for (key, raw) in params.pairs() {
            if PAGING_PARAMS.contains(&key) {
                continue;
            }
            let (field, op) = key
                .split_once('.')
                .ok_or_else(|| CriteriaError::UnknownParameter(key.to_string()))?;
            criteria.apply(field, op, raw)?;
        }
        Ok(criteria)
    }
}

/// Sets `op` on the filter in `slot`, creating the filter on first use.
pub fn apply_filter<F: FilterSpec>(slot: &mut Option<F>, field: &str, op: &str, raw: &str) -> Result<(), CriteriaError> {
    slot.get_or_insert_with(F::default)
        .apply(op, raw)
        .map_err(|source| CriteriaError::InvalidFilter {
            field: field.to_string(),
            source,
        })
}

/// Predicate for a filter on a column of the entity itself.
pub fn build_specification<C: Column, F: FilterSpec>(column: C, filter: &F) -> Predicate<C> {
    Predicate::And(
        filter
            .conditions()
            .into_iter()
            .map(|condition| Predicate::Field(column, condition))
            .collect(),
    )
}

/// Predicate for a filter on the id of a related entity, evaluated through
/// the relation's join.
pub fn build_referring_entity_specification<C: Column, F: FilterSpec>(relation: C::Relation, filter: &F) -> Predicate<C> {
    Predicate::And(
        filter
            .conditions()
            .into_iter()
            .map(|condition| Predicate::Related(relation, condition))
            .collect(),
    )
}

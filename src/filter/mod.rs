//! Per-field filters parsed from `<field>.<operator>=<value>` query
//! parameters. A filter turns into the list of [`Condition`]s its set
//! operators describe; an unset operator contributes nothing.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::query::{Condition, Value};

#[derive(Debug, PartialEq)]
pub enum FilterError {
    UnknownOperator(String),
    InvalidValue { value: String, reason: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::UnknownOperator(op) => write!(f, "unknown operator '{}'", op),
            FilterError::InvalidValue { value, reason } => write!(f, "invalid value {:?}: {}", value, reason),
        }
    }
}

/// A type that can be filtered on.
pub trait FilterValue: Clone + fmt::Debug + Into<Value> {
    fn parse_value(raw: &str) -> Result<Self, String>;
}

impl FilterValue for i64 {
    fn parse_value(raw: &str) -> Result<Self, String> {
        raw.trim().parse().map_err(|err| format!("{}", err))
    }
}

impl FilterValue for i32 {
    fn parse_value(raw: &str) -> Result<Self, String> {
        raw.trim().parse().map_err(|err| format!("{}", err))
    }
}

impl FilterValue for bool {
    fn parse_value(raw: &str) -> Result<Self, String> {
        parse_bool(raw)
    }
}

impl FilterValue for String {
    fn parse_value(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FilterValue for DateTime<Utc> {
    fn parse_value(raw: &str) -> Result<Self, String> {
        parse_timestamp(raw)
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

/// Accepts RFC 3339 with or without seconds, optionally followed by a
/// bracketed zone id (`2018-01-01T10:00+01:00[Europe/Paris]`). The offset
/// decides the instant; the zone id is ignored.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    let raw = match raw.find('[') {
        Some(start) if raw.ends_with(']') => &raw[..start],
        _ => raw,
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(local) => format!("{}+00:00", local),
        None => raw.to_string(),
    };
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z")
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| format!("not an ISO-8601 date-time ({})", err))
}

fn parse_one<T: FilterValue>(raw: &str) -> Result<T, FilterError> {
    T::parse_value(raw).map_err(|reason| FilterError::InvalidValue {
        value: raw.to_string(),
        reason,
    })
}

/// Comma-separated list; an empty value is an empty list.
fn parse_list<T: FilterValue>(raw: &str) -> Result<Vec<T>, FilterError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',').map(parse_one).collect()
}

fn values<T: FilterValue>(list: &[T]) -> Vec<Value> {
    list.iter().cloned().map(Into::into).collect()
}

/// Common surface of every filter shape.
pub trait FilterSpec: Default + fmt::Debug {
    /// Sets one operator from its raw query value.
    fn apply(&mut self, op: &str, raw: &str) -> Result<(), FilterError>;

    fn conditions(&self) -> Vec<Condition>;
}

/// Exact-match filter: `equals`, `notEquals`, `in`, `notIn`, `specified`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<T> {
    pub equals: Option<T>,
    pub not_equals: Option<T>,
    pub in_list: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
    pub specified: Option<bool>,
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter {
            equals: None,
            not_equals: None,
            in_list: None,
            not_in: None,
            specified: None,
        }
    }
}

impl<T: FilterValue> Filter<T> {
    pub fn equals(value: T) -> Self {
        Filter {
            equals: Some(value),
            ..Default::default()
        }
    }
}

impl<T: FilterValue> FilterSpec for Filter<T> {
    fn apply(&mut self, op: &str, raw: &str) -> Result<(), FilterError> {
        match op {
            "equals" => self.equals = Some(parse_one(raw)?),
            "notEquals" => self.not_equals = Some(parse_one(raw)?),
            "in" => self.in_list.get_or_insert_with(Vec::new).extend(parse_list::<T>(raw)?),
            "notIn" => self.not_in.get_or_insert_with(Vec::new).extend(parse_list::<T>(raw)?),
            "specified" => {
                self.specified = Some(parse_bool(raw).map_err(|reason| FilterError::InvalidValue {
                    value: raw.to_string(),
                    reason,
                })?)
            }
            other => return Err(FilterError::UnknownOperator(other.to_string())),
        }
        Ok(())
    }

    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = Vec::new();
        if let Some(v) = &self.equals {
            conditions.push(Condition::Equals(v.clone().into()));
        }
        if let Some(v) = &self.not_equals {
            conditions.push(Condition::NotEquals(v.clone().into()));
        }
        if let Some(list) = &self.in_list {
            conditions.push(Condition::In(values(list)));
        }
        if let Some(list) = &self.not_in {
            conditions.push(Condition::NotIn(values(list)));
        }
        if let Some(specified) = self.specified {
            conditions.push(Condition::Specified(specified));
        }
        conditions
    }
}

/// Exact-match filter plus the four ordering bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter<T> {
    pub base: Filter<T>,
    pub greater_than: Option<T>,
    pub greater_or_equal_than: Option<T>,
    pub less_than: Option<T>,
    pub less_or_equal_than: Option<T>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        RangeFilter {
            base: Filter::default(),
            greater_than: None,
            greater_or_equal_than: None,
            less_than: None,
            less_or_equal_than: None,
        }
    }
}

impl<T: FilterValue> RangeFilter<T> {
    pub fn equals(value: T) -> Self {
        RangeFilter {
            base: Filter::equals(value),
            ..Default::default()
        }
    }
}

impl<T: FilterValue> FilterSpec for RangeFilter<T> {
    fn apply(&mut self, op: &str, raw: &str) -> Result<(), FilterError> {
        match op {
            "greaterThan" => self.greater_than = Some(parse_one(raw)?),
            "greaterOrEqualThan" => self.greater_or_equal_than = Some(parse_one(raw)?),
            "lessThan" => self.less_than = Some(parse_one(raw)?),
            "lessOrEqualThan" => self.less_or_equal_than = Some(parse_one(raw)?),
            _ => return self.base.apply(op, raw),
        }
        Ok(())
    }

    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.base.conditions();
        if let Some(v) = &self.greater_than {
            conditions.push(Condition::GreaterThan(v.clone().into()));
        }
        if let Some(v) = &self.greater_or_equal_than {
            conditions.push(Condition::GreaterOrEqualThan(v.clone().into()));
        }
        if let Some(v) = &self.less_than {
            conditions.push(Condition::LessThan(v.clone().into()));
        }
        if let Some(v) = &self.less_or_equal_than {
            conditions.push(Condition::LessOrEqualThan(v.clone().into()));
        }
        conditions
    }
}

/// Exact-match filter on text plus `contains` / `doesNotContain`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringFilter {
    pub base: Filter<String>,
    pub contains: Option<String>,
    pub does_not_contain: Option<String>,
}

impl FilterSpec for StringFilter {
    fn apply(&mut self, op: &str, raw: &str) -> Result<(), FilterError> {
        match op {
            "contains" => self.contains = Some(raw.to_string()),
            "doesNotContain" => self.does_not_contain = Some(raw.to_string()),
            _ => return self.base.apply(op, raw),
        }
        Ok(())
    }

    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = self.base.conditions();
        if let Some(needle) = &self.contains {
            conditions.push(Condition::Contains(needle.clone()));
        }
        if let Some(needle) = &self.does_not_contain {
            conditions.push(Condition::DoesNotContain(needle.clone()));
        }
        conditions
    }
}

pub type LongFilter = RangeFilter<i64>;
pub type BooleanFilter = Filter<bool>;
pub type IntegerFilter = RangeFilter<i32>;
pub type ZonedDateTimeFilter = RangeFilter<DateTime<Utc>>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn applied<F: FilterSpec>(ops: &[(&str, &str)]) -> Result<F, FilterError> {
        let mut filter = F::default();
        for (op, raw) in ops {
            filter.apply(op, raw)?;
        }
        Ok(filter)
    }

    #[test]
    fn unset_filter_has_no_conditions() {
        assert!(LongFilter::default().conditions().is_empty());
        assert!(StringFilter::default().conditions().is_empty());
        assert!(ZonedDateTimeFilter::default().conditions().is_empty());
    }

    #[test]
    fn exact_match_operators() {
        let filter: LongFilter = applied(&[("equals", "5"), ("notEquals", "6"), ("specified", "true")]).unwrap();
        assert_eq!(
            filter.conditions(),
            vec![
                Condition::Equals(Value::Int(5)),
                Condition::NotEquals(Value::Int(6)),
                Condition::Specified(true),
            ]
        );
    }

    #[test]
    fn in_lists_split_and_accumulate() {
        let filter: StringFilter = applied(&[("in", "AAAAAAAAAA,BBBBBBBBBB"), ("in", "CCC")]).unwrap();
        assert_eq!(
            filter.conditions(),
            vec![Condition::In(vec!["AAAAAAAAAA".into(), "BBBBBBBBBB".into(), "CCC".into()])]
        );
    }

    #[test]
    fn empty_in_is_an_empty_list_not_no_filter() {
        let filter: LongFilter = applied(&[("in", "")]).unwrap();
        assert_eq!(filter.conditions(), vec![Condition::In(vec![])]);
    }

    #[test]
    fn range_operators() {
        let filter: IntegerFilter = applied(&[("greaterThan", "1"), ("lessOrEqualThan", "9"), ("equals", "4")]).unwrap();
        assert_eq!(
            filter.conditions(),
            vec![
                Condition::Equals(Value::Int(4)),
                Condition::GreaterThan(Value::Int(1)),
                Condition::LessOrEqualThan(Value::Int(9)),
            ]
        );
    }

    #[test]
    fn long_filter_supports_ranges() {
        let filter: LongFilter = applied(&[("greaterThan", "5"), ("lessThan", "9")]).unwrap();
        assert_eq!(
            filter.conditions(),
            vec![Condition::GreaterThan(Value::Int(5)), Condition::LessThan(Value::Int(9))]
        );
    }

    #[test]
    fn string_operators() {
        let filter: StringFilter = applied(&[("contains", "aa"), ("doesNotContain", "zz")]).unwrap();
        assert_eq!(
            filter.conditions(),
            vec![Condition::Contains("aa".to_string()), Condition::DoesNotContain("zz".to_string())]
        );
    }

    #[test]
    fn boolean_filter() {
        let filter: BooleanFilter = applied(&[("equals", "TRUE")]).unwrap();
        assert_eq!(filter.conditions(), vec![Condition::Equals(Value::Bool(true))]);
        assert!(applied::<BooleanFilter>(&[("equals", "yes")]).is_err());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            applied::<IntegerFilter>(&[("equals", "one")]),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            applied::<IntegerFilter>(&[("in", "1,x")]),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            applied::<LongFilter>(&[("specified", "maybe")]),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            applied::<ZonedDateTimeFilter>(&[("lessThan", "yesterday")]),
            Err(FilterError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unknown_operators_are_rejected() {
        assert_eq!(
            applied::<BooleanFilter>(&[("greaterThan", "true")]).unwrap_err(),
            FilterError::UnknownOperator("greaterThan".to_string())
        );
        assert_eq!(
            applied::<IntegerFilter>(&[("contains", "1")]).unwrap_err(),
            FilterError::UnknownOperator("contains".to_string())
        );
    }

    #[test]
    fn timestamp_formats() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(parse_timestamp("1970-01-01T00:00Z").unwrap(), epoch);
        assert_eq!(parse_timestamp("1970-01-01T00:00:00Z").unwrap(), epoch);
        assert_eq!(parse_timestamp("1970-01-01T01:00:00+01:00").unwrap(), epoch);
        assert_eq!(parse_timestamp("1970-01-01T01:00+01:00[Europe/Paris]").unwrap(), epoch);
        assert_eq!(parse_timestamp("1970-01-01T00:00:00.000Z[UTC]").unwrap(), epoch);
        assert!(parse_timestamp("1970-01-01").is_err());
    }
}

use crate::filter::{LongFilter, StringFilter};
use crate::models::department::{DepartmentColumn, DepartmentRelation};
use crate::query::Predicate;

use super::{apply_filter, build_referring_entity_specification, build_specification, Criteria, CriteriaError};

/// Filters accepted by `GET /api/departments`. `employeeId` matches a
/// department when any of its employees has a matching id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentCriteria {
    pub id: Option<LongFilter>,
    pub name: Option<StringFilter>,
    pub area: Option<LongFilter>,
    pub employee_id: Option<LongFilter>,
}

impl Criteria for DepartmentCriteria {
    type Column = DepartmentColumn;

    fn apply(&mut self, field: &str, op: &str, raw: &str) -> Result<(), CriteriaError> {
        match field {
            "id" => apply_filter(&mut self.id, field, op, raw),
            "name" => apply_filter(&mut self.name, field, op, raw),
            "area" => apply_filter(&mut self.area, field, op, raw),
            "employeeId" => apply_filter(&mut self.employee_id, field, op, raw),
            other => Err(CriteriaError::UnknownField(other.to_string())),
        }
    }

    fn to_predicate(&self) -> Predicate<DepartmentColumn> {
        let mut specification = Predicate::all();
        if let Some(filter) = &self.id {
            specification = specification.and(build_specification(DepartmentColumn::Id, filter));
        }
        if let Some(filter) = &self.name {
            specification = specification.and(build_specification(DepartmentColumn::Name, filter));
        }
        if let Some(filter) = &self.area {
            specification = specification.and(build_specification(DepartmentColumn::Area, filter));
        }
        if let Some(filter) = &self.employee_id {
            specification =
                specification.and(build_referring_entity_specification(DepartmentRelation::Employees, filter));
        }
        specification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::QueryParams;
    use crate::query::{Condition, Value};

    fn criteria(query: &str) -> Result<DepartmentCriteria, CriteriaError> {
        DepartmentCriteria::from_params(&QueryParams::parse(query))
    }

    #[test]
    fn area_is_a_range_filter() {
        let c = criteria("area.lessThan=2&area.in=1,2").unwrap();
        assert_eq!(
            c.to_predicate(),
            Predicate::And(vec![
                Predicate::Field(DepartmentColumn::Area, Condition::In(vec![Value::Int(1), Value::Int(2)])),
                Predicate::Field(DepartmentColumn::Area, Condition::LessThan(Value::Int(2))),
            ])
        );
    }

    #[test]
    fn employee_id_filters_the_reverse_collection() {
        let c = criteria("employeeId.specified=false").unwrap();
        assert_eq!(
            c.to_predicate(),
            Predicate::And(vec![Predicate::Related(
                DepartmentRelation::Employees,
                Condition::Specified(false)
            )])
        );
    }

    #[test]
    fn id_and_employee_id_accept_ranges() {
        let c = criteria("id.greaterThan=5&employeeId.lessOrEqualThan=7").unwrap();
        assert_eq!(
            c.to_predicate(),
            Predicate::And(vec![
                Predicate::Field(DepartmentColumn::Id, Condition::GreaterThan(Value::Int(5))),
                Predicate::Related(DepartmentRelation::Employees, Condition::LessOrEqualThan(Value::Int(7))),
            ])
        );
    }

    #[test]
    fn name_supports_contains() {
        let c = criteria("name.contains=eng").unwrap();
        assert_eq!(c.name.unwrap().contains.as_deref(), Some("eng"));
    }

    #[test]
    fn age_is_not_a_department_field() {
        assert_eq!(criteria("age.equals=1").unwrap_err(), CriteriaError::UnknownField("age".to_string()));
    }
}

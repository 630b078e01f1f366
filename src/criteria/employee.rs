use crate::filter::{IntegerFilter, LongFilter, StringFilter, ZonedDateTimeFilter};
use crate::models::employee::{EmployeeColumn, EmployeeRelation};
use crate::query::Predicate;

use super::{apply_filter, build_referring_entity_specification, build_specification, Criteria, CriteriaError};

/// Filters accepted by `GET /api/employees`, e.g.
/// `/api/employees?age.greaterThan=30&name.contains=ann&departmentId.equals=2`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeCriteria {
    pub id: Option<LongFilter>,
    pub name: Option<StringFilter>,
    pub age: Option<IntegerFilter>,
    pub birthday: Option<ZonedDateTimeFilter>,
    pub department_id: Option<LongFilter>,
}

impl Criteria for EmployeeCriteria {
    type Column = EmployeeColumn;

    fn apply(&mut self, field: &str, op: &str, raw: &str) -> Result<(), CriteriaError> {
        match field {
            "id" => apply_filter(&mut self.id, field, op, raw),
            "name" => apply_filter(&mut self.name, field, op, raw),
            "age" => apply_filter(&mut self.age, field, op, raw),
            "birthday" => apply_filter(&mut self.birthday, field, op, raw),
            "departmentId" => apply_filter(&mut self.department_id, field, op, raw),
            other => Err(CriteriaError::UnknownField(other.to_string())),
        }
    }

    fn to_predicate(&self) -> Predicate<EmployeeColumn> {
        let mut specification = Predicate::all();
        if let Some(filter) = &self.id {
            specification = specification.and(build_specification(EmployeeColumn::Id, filter));
        }
        if let Some(filter) = &self.name {
            specification = specification.and(build_specification(EmployeeColumn::Name, filter));
        }
        if let Some(filter) = &self.age {
            specification = specification.and(build_specification(EmployeeColumn::Age, filter));
        }
        if let Some(filter) = &self.birthday {
            specification = specification.and(build_specification(EmployeeColumn::Birthday, filter));
        }
        if let Some(filter) = &self.department_id {
            specification =
                specification.and(build_referring_entity_specification(EmployeeRelation::Department, filter));
        }
        specification
    }
}

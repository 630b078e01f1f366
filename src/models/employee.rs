use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::{Column, Relation, Value};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
    pub birthday: Option<DateTime<Utc>>,
    pub department_id: Option<i64>,
}

/// Identity is the id alone.
impl PartialEq for Employee {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Employee {}

/// An employee that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub age: Option<i32>,
    pub birthday: Option<DateTime<Utc>>,
    pub department_id: Option<i64>,
}

impl NewEmployee {
    pub fn with_id(self, id: i64) -> Employee {
        Employee {
            id,
            name: self.name,
            age: self.age,
            birthday: self.birthday,
            department_id: self.department_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeColumn {
    Id,
    Name,
    Age,
    Birthday,
    DepartmentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeRelation {
    Department,
}

impl Column for EmployeeColumn {
    type Relation = EmployeeRelation;

    const TABLE: &'static str = "employees";
    const ID: Self = EmployeeColumn::Id;

    fn name(self) -> &'static str {
        match self {
            EmployeeColumn::Id => "id",
            EmployeeColumn::Name => "name",
            EmployeeColumn::Age => "age",
            EmployeeColumn::Birthday => "birthday",
            EmployeeColumn::DepartmentId => "department_id",
        }
    }

    fn from_field(field: &str) -> Option<Self> {
        match field {
            "id" => Some(EmployeeColumn::Id),
            "name" => Some(EmployeeColumn::Name),
            "age" => Some(EmployeeColumn::Age),
            "birthday" => Some(EmployeeColumn::Birthday),
            "departmentId" => Some(EmployeeColumn::DepartmentId),
            _ => None,
        }
    }
}

impl Relation for EmployeeRelation {
    fn table(self) -> &'static str {
        match self {
            EmployeeRelation::Department => "departments",
        }
    }

    fn join_on(self) -> &'static str {
        match self {
            EmployeeRelation::Department => "departments.id = employees.department_id",
        }
    }
}

impl Employee {
    pub fn value(&self, column: EmployeeColumn) -> Value {
        match column {
            EmployeeColumn::Id => self.id.into(),
            EmployeeColumn::Name => self.name.as_str().into(),
            EmployeeColumn::Age => self.age.into(),
            EmployeeColumn::Birthday => self.birthday.into(),
            EmployeeColumn::DepartmentId => self.department_id.into(),
        }
    }
}

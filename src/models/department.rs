use serde::{Deserialize, Serialize};

use crate::query::{Column, Relation, Value};

/// The reverse `employees` collection is not stored here; employees own the
/// foreign key and are reached through [`DepartmentRelation::Employees`].
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: Option<String>,
    pub area: Option<i64>,
}

impl PartialEq for Department {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Department {}

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub name: Option<String>,
    pub area: Option<i64>,
}

impl NewDepartment {
    pub fn with_id(self, id: i64) -> Department {
        Department {
            id,
            name: self.name,
            area: self.area,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentColumn {
    Id,
    Name,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentRelation {
    Employees,
}

impl Column for DepartmentColumn {
    type Relation = DepartmentRelation;

    const TABLE: &'static str = "departments";
    const ID: Self = DepartmentColumn::Id;

    fn name(self) -> &'static str {
        match self {
            DepartmentColumn::Id => "id",
            DepartmentColumn::Name => "name",
            DepartmentColumn::Area => "area",
        }
    }

    fn from_field(field: &str) -> Option<Self> {
        match field {
            "id" => Some(DepartmentColumn::Id),
            "name" => Some(DepartmentColumn::Name),
            "area" => Some(DepartmentColumn::Area),
            _ => None,
        }
    }
}

impl Relation for DepartmentRelation {
    fn table(self) -> &'static str {
        match self {
            DepartmentRelation::Employees => "employees",
        }
    }

    fn join_on(self) -> &'static str {
        match self {
            DepartmentRelation::Employees => "employees.department_id = departments.id",
        }
    }
}

impl Department {
    pub fn value(&self, column: DepartmentColumn) -> Value {
        match column {
            DepartmentColumn::Id => self.id.into(),
            DepartmentColumn::Name => self.name.as_deref().into(),
            DepartmentColumn::Area => self.area.into(),
        }
    }
}

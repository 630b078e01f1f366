//! In-process storage backend. Both tables live behind one `RwLock`: queries
//! take the read lock, mutations the write lock, so every operation sees a
//! consistent view of both tables.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::department::{Department, DepartmentColumn, DepartmentRelation, NewDepartment};
use crate::models::employee::{Employee, EmployeeColumn, EmployeeRelation, NewEmployee};
use crate::query::page::with_id_tiebreak;
use crate::query::{Column, Direction, Page, Pageable, Predicate, Record, Sort, Value};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    departments: BTreeMap<i64, Department>,
    employees: BTreeMap<i64, Employee>,
    last_department_id: i64,
    last_employee_id: i64,
}

impl Tables {
    fn employee_rows(&self) -> impl Iterator<Item = EmployeeRow<'_>> {
        self.employees.values().map(move |employee| EmployeeRow { employee, tables: self })
    }

    fn department_rows(&self) -> impl Iterator<Item = DepartmentRow<'_>> {
        self.departments.values().map(move |department| DepartmentRow { department, tables: self })
    }

    fn check_department_exists(&self, department_id: Option<i64>) -> Result<(), AppError> {
        match department_id {
            Some(id) if !self.departments.contains_key(&id) => Err(AppError::BadRequest(format!(
                "Referenced entity does not exist: department {}",
                id
            ))),
            _ => Ok(()),
        }
    }
}

struct EmployeeRow<'a> {
    employee: &'a Employee,
    tables: &'a Tables,
}

impl Record<EmployeeColumn> for EmployeeRow<'_> {
    fn value(&self, column: EmployeeColumn) -> Value {
        self.employee.value(column)
    }

    fn related_ids(&self, relation: EmployeeRelation) -> Vec<i64> {
        match relation {
            EmployeeRelation::Department => self
                .employee
                .department_id
                .filter(|id| self.tables.departments.contains_key(id))
                .into_iter()
                .collect(),
        }
    }
}

struct DepartmentRow<'a> {
    department: &'a Department,
    tables: &'a Tables,
}

impl Record<DepartmentColumn> for DepartmentRow<'_> {
    fn value(&self, column: DepartmentColumn) -> Value {
        self.department.value(column)
    }

    fn related_ids(&self, relation: DepartmentRelation) -> Vec<i64> {
        match relation {
            DepartmentRelation::Employees => self
                .tables
                .employees
                .values()
                .filter(|e| e.department_id == Some(self.department.id))
                .map(|e| e.id)
                .collect(),
        }
    }
}

fn select<C, R>(rows: impl Iterator<Item = R>, predicate: &Predicate<C>, sort: &[Sort<C>]) -> Vec<R>
where
    C: Column,
    R: Record<C>,
{
    let order = with_id_tiebreak(sort);
    let mut matched: Vec<R> = rows.filter(|row| predicate.matches(row)).collect();
    matched.sort_by(|a, b| compare(a, b, &order));
    matched
}

fn compare<C: Column, R: Record<C>>(a: &R, b: &R, order: &[Sort<C>]) -> Ordering {
    for sort in order {
        let ordering = a.value(sort.column).sort_cmp(&b.value(sort.column));
        let ordering = match sort.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn page_of<C: Column, T>(matched: Vec<T>, pageable: &Pageable<C>) -> Page<T> {
    let total = matched.len() as i64;
    let content = matched
        .into_iter()
        .skip(usize::try_from(pageable.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(pageable.size).unwrap_or(0))
        .collect();
    Page::new(content, total, pageable)
}

impl MemoryStore {
    pub async fn find_employees(&self, predicate: &Predicate<EmployeeColumn>, pageable: &Pageable<EmployeeColumn>) -> Page<Employee> {
        let tables = self.tables.read().await;
        let matched: Vec<Employee> = select(tables.employee_rows(), predicate, &pageable.sort)
            .into_iter()
            .map(|row| row.employee.clone())
            .collect();
        page_of(matched, pageable)
    }

    pub async fn find_all_employees(&self, predicate: &Predicate<EmployeeColumn>, sort: &[Sort<EmployeeColumn>]) -> Vec<Employee> {
        let tables = self.tables.read().await;
        select(tables.employee_rows(), predicate, sort)
            .into_iter()
            .map(|row| row.employee.clone())
            .collect()
    }

    pub async fn count_employees(&self, predicate: &Predicate<EmployeeColumn>) -> i64 {
        let tables = self.tables.read().await;
        tables.employee_rows().filter(|row| predicate.matches(row)).count() as i64
    }

    pub async fn find_employee(&self, id: i64) -> Option<Employee> {
        self.tables.read().await.employees.get(&id).cloned()
    }

    pub async fn insert_employee(&self, new_employee: NewEmployee) -> Result<Employee, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_department_exists(new_employee.department_id)?;
        tables.last_employee_id += 1;
        let employee = new_employee.with_id(tables.last_employee_id);
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    pub async fn update_employee(&self, employee: Employee) -> Result<Option<Employee>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.employees.contains_key(&employee.id) {
            return Ok(None);
        }
        tables.check_department_exists(employee.department_id)?;
        tables.employees.insert(employee.id, employee.clone());
        Ok(Some(employee))
    }

    pub async fn delete_employee(&self, id: i64) -> bool {
        self.tables.write().await.employees.remove(&id).is_some()
    }

    pub async fn find_departments(
        &self,
        predicate: &Predicate<DepartmentColumn>,
        pageable: &Pageable<DepartmentColumn>,
    ) -> Page<Department> {
        let tables = self.tables.read().await;
        let matched: Vec<Department> = select(tables.department_rows(), predicate, &pageable.sort)
            .into_iter()
            .map(|row| row.department.clone())
            .collect();
        page_of(matched, pageable)
    }

    pub async fn count_departments(&self, predicate: &Predicate<DepartmentColumn>) -> i64 {
        let tables = self.tables.read().await;
        tables.department_rows().filter(|row| predicate.matches(row)).count() as i64
    }

    pub async fn find_department(&self, id: i64) -> Option<Department> {
        self.tables.read().await.departments.get(&id).cloned()
    }

    pub async fn insert_department(&self, new_department: NewDepartment) -> Department {
        let mut tables = self.tables.write().await;
        tables.last_department_id += 1;
        let department = new_department.with_id(tables.last_department_id);
        tables.departments.insert(department.id, department.clone());
        department
    }

    pub async fn update_department(&self, department: Department) -> Option<Department> {
        let mut tables = self.tables.write().await;
        let slot = tables.departments.get_mut(&department.id)?;
        *slot = department.clone();
        Some(department)
    }

    /// Refuses to delete a department that employees still reference.
    pub async fn delete_department(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.employees.values().any(|e| e.department_id == Some(id)) {
            return Err(AppError::Conflict("Department still contains employees".to_string()));
        }
        Ok(tables.departments.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Condition;

    fn new_employee(name: &str, age: Option<i32>, department_id: Option<i64>) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            age,
            birthday: None,
            department_id,
        }
    }

    fn new_department(name: &str) -> NewDepartment {
        NewDepartment {
            name: Some(name.to_string()),
            area: Some(1),
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let store = MemoryStore::default();
        let a = store.insert_employee(new_employee("a", None, None)).await.unwrap();
        let b = store.insert_employee(new_employee("b", None, None)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        store.delete_employee(b.id).await;
        let c = store.insert_employee(new_employee("c", None, None)).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn rejects_unknown_department_reference() {
        let store = MemoryStore::default();
        let err = store.insert_employee(new_employee("a", None, Some(42))).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.count_employees(&Predicate::all()).await, 0);
    }

    #[tokio::test]
    async fn sorts_with_nulls_last_and_pages() {
        let store = MemoryStore::default();
        for (name, age) in [("a", Some(30)), ("b", None), ("c", Some(20)), ("d", Some(30))] {
            store.insert_employee(new_employee(name, age, None)).await.unwrap();
        }
        let pageable = Pageable::of(0, 3).sorted(Sort::asc(EmployeeColumn::Age));
        let page = store.find_employees(&Predicate::all(), &pageable).await;
        let names: Vec<&str> = page.content.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "d"]);
        assert_eq!(page.total_elements, 4);

        let page = store.find_employees(&Predicate::all(), &Pageable::of(1, 3).sorted(Sort::asc(EmployeeColumn::Age))).await;
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].name, "b");

        let all = store.find_all_employees(&Predicate::all(), &[Sort::desc(EmployeeColumn::Age)]).await;
        assert_eq!(all[0].name, "b");
    }

    #[tokio::test]
    async fn department_relation_follows_employees() {
        let store = MemoryStore::default();
        let staffed = store.insert_department(new_department("staffed")).await;
        let empty = store.insert_department(new_department("empty")).await;
        let employee = store.insert_employee(new_employee("a", None, Some(staffed.id))).await.unwrap();

        let with_employee = Predicate::Related(DepartmentRelation::Employees, Condition::Equals(employee.id.into()));
        let found = store.find_departments(&with_employee, &Pageable::default()).await;
        assert_eq!(found.content, vec![staffed.clone()]);

        let without = Predicate::Related(DepartmentRelation::Employees, Condition::Specified(false));
        let found = store.find_departments(&without, &Pageable::default()).await;
        assert_eq!(found.content, vec![empty]);
    }

    #[tokio::test]
    async fn blocks_deleting_departments_with_employees() {
        let store = MemoryStore::default();
        let department = store.insert_department(new_department("d")).await;
        let employee = store.insert_employee(new_employee("a", None, Some(department.id))).await.unwrap();

        assert!(matches!(store.delete_department(department.id).await, Err(AppError::Conflict(_))));
        assert!(store.delete_employee(employee.id).await);
        assert!(store.delete_department(department.id).await.unwrap());
        assert!(!store.delete_department(department.id).await.unwrap());
    }
}

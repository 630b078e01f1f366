use log::debug;
use sqlx::PgPool;

use super::{postgres, Storage};
use crate::db;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeColumn, NewEmployee};
use crate::query::{Page, Pageable, Predicate, Sort};

const RETURNING: &str = "RETURNING id, name, age, birthday, department_id";

impl Storage {
    pub async fn find_employees(
        &self,
        predicate: &Predicate<EmployeeColumn>,
        pageable: &Pageable<EmployeeColumn>,
    ) -> Result<Page<Employee>, AppError> {
        debug!("find by criteria : {:?}, page: {:?}", predicate, pageable);
        match self {
            Storage::Postgres(pool) => Ok(postgres::find_page(pool, predicate, pageable).await?),
            Storage::Memory(store) => Ok(store.find_employees(predicate, pageable).await),
        }
    }

    pub async fn find_all_employees(
        &self,
        predicate: &Predicate<EmployeeColumn>,
        sort: &[Sort<EmployeeColumn>],
    ) -> Result<Vec<Employee>, AppError> {
        debug!("find by criteria : {:?}", predicate);
        match self {
            Storage::Postgres(pool) => Ok(postgres::find_all(pool, predicate, sort).await?),
            Storage::Memory(store) => Ok(store.find_all_employees(predicate, sort).await),
        }
    }

    pub async fn count_employees(&self, predicate: &Predicate<EmployeeColumn>) -> Result<i64, AppError> {
        debug!("count by criteria : {:?}", predicate);
        match self {
            Storage::Postgres(pool) => Ok(postgres::count(pool, predicate).await?),
            Storage::Memory(store) => Ok(store.count_employees(predicate).await),
        }
    }

    pub async fn find_employee(&self, id: i64) -> Result<Option<Employee>, AppError> {
        match self {
            Storage::Postgres(pool) => Ok(postgres::find_by_id::<Employee, EmployeeColumn>(pool, id).await?),
            Storage::Memory(store) => Ok(store.find_employee(id).await),
        }
    }

    pub async fn insert_employee(&self, new_employee: NewEmployee) -> Result<Employee, AppError> {
        match self {
            Storage::Postgres(pool) => insert(pool, &new_employee).await,
            Storage::Memory(store) => store.insert_employee(new_employee).await,
        }
    }

    /// `None` when no employee has the given id.
    pub async fn update_employee(&self, employee: Employee) -> Result<Option<Employee>, AppError> {
        match self {
            Storage::Postgres(pool) => update(pool, &employee).await,
            Storage::Memory(store) => store.update_employee(employee).await,
        }
    }

    pub async fn delete_employee(&self, id: i64) -> Result<bool, AppError> {
        match self {
            Storage::Postgres(pool) => Ok(postgres::delete_by_id::<EmployeeColumn>(pool, id).await?),
            Storage::Memory(store) => Ok(store.delete_employee(id).await),
        }
    }
}

async fn insert(pool: &PgPool, new_employee: &NewEmployee) -> Result<Employee, AppError> {
    let mut tx = db::begin_read_write(pool).await?;
    let employee = sqlx::query_as::<_, Employee>(&format!(
        "INSERT INTO employees (name, age, birthday, department_id) VALUES ($1, $2, $3, $4) {}",
        RETURNING
    ))
    .bind(new_employee.name.as_str())
    .bind(new_employee.age)
    .bind(new_employee.birthday)
    .bind(new_employee.department_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(employee)
}

async fn update(pool: &PgPool, employee: &Employee) -> Result<Option<Employee>, AppError> {
    let mut tx = db::begin_read_write(pool).await?;
    let updated = sqlx::query_as::<_, Employee>(&format!(
        "UPDATE employees SET name = $1, age = $2, birthday = $3, department_id = $4 WHERE id = $5 {}",
        RETURNING
    ))
    .bind(employee.name.as_str())
    .bind(employee.age)
    .bind(employee.birthday)
    .bind(employee.department_id)
    .bind(employee.id)
    .fetch_optional(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(updated)
}

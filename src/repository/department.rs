use log::debug;
use sqlx::PgPool;

use super::{postgres, Storage};
use crate::db;
use crate::errors::AppError;
use crate::models::department::{Department, DepartmentColumn, NewDepartment};
use crate::query::{Page, Pageable, Predicate};

const RETURNING: &str = "RETURNING id, name, area";

impl Storage {
    pub async fn find_departments(
        &self,
        predicate: &Predicate<DepartmentColumn>,
        pageable: &Pageable<DepartmentColumn>,
    ) -> Result<Page<Department>, AppError> {
        debug!("find by criteria : {:?}, page: {:?}", predicate, pageable);
        match self {
            Storage::Postgres(pool) => Ok(postgres::find_page(pool, predicate, pageable).await?),
            Storage::Memory(store) => Ok(store.find_departments(predicate, pageable).await),
        }
    }

    pub async fn count_departments(&self, predicate: &Predicate<DepartmentColumn>) -> Result<i64, AppError> {
        debug!("count by criteria : {:?}", predicate);
        match self {
            Storage::Postgres(pool) => Ok(postgres::count(pool, predicate).await?),
            Storage::Memory(store) => Ok(store.count_departments(predicate).await),
        }
    }

    pub async fn find_department(&self, id: i64) -> Result<Option<Department>, AppError> {
        match self {
            Storage::Postgres(pool) => Ok(postgres::find_by_id::<Department, DepartmentColumn>(pool, id).await?),
            Storage::Memory(store) => Ok(store.find_department(id).await),
        }
    }

    pub async fn insert_department(&self, new_department: NewDepartment) -> Result<Department, AppError> {
        match self {
            Storage::Postgres(pool) => insert(pool, &new_department).await,
            Storage::Memory(store) => Ok(store.insert_department(new_department).await),
        }
    }

    pub async fn update_department(&self, department: Department) -> Result<Option<Department>, AppError> {
        match self {
            Storage::Postgres(pool) => update(pool, &department).await,
            Storage::Memory(store) => Ok(store.update_department(department).await),
        }
    }

    /// Fails with `Conflict` while employees still reference the department.
    pub async fn delete_department(&self, id: i64) -> Result<bool, AppError> {
        match self {
            Storage::Postgres(pool) => delete(pool, id).await,
            Storage::Memory(store) => store.delete_department(id).await,
        }
    }
}

async fn insert(pool: &PgPool, new_department: &NewDepartment) -> Result<Department, AppError> {
    let mut tx = db::begin_read_write(pool).await?;
    let department = sqlx::query_as::<_, Department>(&format!(
        "INSERT INTO departments (name, area) VALUES ($1, $2) {}",
        RETURNING
    ))
    .bind(new_department.name.as_deref())
    .bind(new_department.area)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(department)
}

async fn update(pool: &PgPool, department: &Department) -> Result<Option<Department>, AppError> {
    let mut tx = db::begin_read_write(pool).await?;
    let updated = sqlx::query_as::<_, Department>(&format!(
        "UPDATE departments SET name = $1, area = $2 WHERE id = $3 {}",
        RETURNING
    ))
    .bind(department.name.as_deref())
    .bind(department.area)
    .bind(department.id)
    .fetch_optional(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(updated)
}

async fn delete(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let mut tx = db::begin_read_write(pool).await?;

    let has_employees: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE department_id = $1)")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if has_employees {
        return Err(AppError::Conflict("Department still contains employees".to_string()));
    }

    let result = sqlx::query("DELETE FROM departments WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|err| match AppError::from(err) {
            // an employee was attached after the check above
            AppError::BadRequest(_) => AppError::Conflict("Department still contains employees".to_string()),
            other => other,
        })?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

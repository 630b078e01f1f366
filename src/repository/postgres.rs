//! Predicate execution against PostgreSQL. Reads run inside a read-only
//! transaction so the count and the page see the same snapshot.

use futures_util::TryStreamExt;
use log::debug;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use crate::db;
use crate::query::{sql, Column, Page, Pageable, Predicate, Sort};

pub async fn find_page<T, C>(pool: &PgPool, predicate: &Predicate<C>, pageable: &Pageable<C>) -> Result<Page<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    C: Column,
{
    let mut tx = db::begin_read_only(pool).await?;

    let mut count_query = sql::count(predicate);
    debug!("{}", count_query.sql());
    let total: i64 = count_query.build_query_scalar().fetch_one(&mut *tx).await?;

    let mut select_query = sql::select(predicate, &pageable.sort, Some(pageable));
    debug!("{}", select_query.sql());
    let content = select_query.build_query_as::<T>().fetch_all(&mut *tx).await?;

    tx.commit().await?;
    Ok(Page::new(content, total, pageable))
}

pub async fn find_all<T, C>(pool: &PgPool, predicate: &Predicate<C>, sort: &[Sort<C>]) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    C: Column,
{
    let mut tx = db::begin_read_only(pool).await?;

    let mut select_query = sql::select(predicate, sort, None);
    debug!("{}", select_query.sql());
    let rows: Vec<T> = select_query
        .build_query_as::<T>()
        .fetch(&mut *tx)
        .try_collect()
        .await?;

    tx.commit().await?;
    Ok(rows)
}

pub async fn count<C: Column>(pool: &PgPool, predicate: &Predicate<C>) -> Result<i64, sqlx::Error> {
    let mut tx = db::begin_read_only(pool).await?;

    let mut count_query = sql::count(predicate);
    debug!("{}", count_query.sql());
    let total: i64 = count_query.build_query_scalar().fetch_one(&mut *tx).await?;

    tx.commit().await?;
    Ok(total)
}

pub async fn find_by_id<T, C>(pool: &PgPool, id: i64) -> Result<Option<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    C: Column,
{
    let mut tx = db::begin_read_only(pool).await?;
    let row = sqlx::query_as::<_, T>(&format!("SELECT * FROM {} WHERE id = $1", C::TABLE))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(row)
}

/// Returns whether a row was removed.
pub async fn delete_by_id<C: Column>(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = db::begin_read_write(pool).await?;
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", C::TABLE))
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

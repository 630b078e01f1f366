//! Renders predicates into PostgreSQL through `sqlx::QueryBuilder`. Every
//! value is bound as a parameter; only column and table names, which come
//! from [`Column`] and [`Relation`] implementations, are written inline.

use sqlx::{Postgres, QueryBuilder};

use super::page::with_id_tiebreak;
use super::{Column, Condition, Direction, Pageable, Predicate, Relation, Sort, Value};

pub fn qualified<C: Column>(column: C) -> String {
    format!("{}.{}", C::TABLE, column.name())
}

/// `SELECT * FROM <table> WHERE <predicate> ORDER BY <sort>`, limited to the
/// page window when one is given.
pub fn select<C: Column>(
    predicate: &Predicate<C>,
    sort: &[Sort<C>],
    window: Option<&Pageable<C>>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", C::TABLE));
    push_where(&mut qb, predicate);
    push_order_by(&mut qb, sort);
    if let Some(pageable) = window {
        qb.push(" LIMIT ");
        qb.push_bind(pageable.size);
        qb.push(" OFFSET ");
        qb.push_bind(pageable.offset());
    }
    qb
}

pub fn count<C: Column>(predicate: &Predicate<C>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", C::TABLE));
    push_where(&mut qb, predicate);
    qb
}

fn push_where<C: Column>(qb: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate<C>) {
    if predicate.is_all() {
        return;
    }
    qb.push(" WHERE ");
    push_predicate(qb, predicate);
}

fn push_order_by<C: Column>(qb: &mut QueryBuilder<'static, Postgres>, sort: &[Sort<C>]) {
    qb.push(" ORDER BY ");
    for (i, s) in with_id_tiebreak(sort).iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(qualified(s.column));
        qb.push(match s.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        });
    }
}

pub fn push_predicate<C: Column>(qb: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate<C>) {
    match predicate {
        Predicate::Field(column, condition) => push_condition(qb, &qualified(*column), condition),
        Predicate::Related(relation, condition) => push_related(qb, *relation, condition),
        Predicate::And(parts) if parts.is_empty() => {
            qb.push("TRUE");
        }
        Predicate::And(parts) => {
            qb.push("(");
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    qb.push(" AND ");
                }
                push_predicate(qb, part);
            }
            qb.push(")");
        }
    }
}

fn push_related<R: Relation>(qb: &mut QueryBuilder<'static, Postgres>, relation: R, condition: &Condition) {
    let exists = format!("EXISTS (SELECT 1 FROM {} WHERE {}", relation.table(), relation.join_on());
    match condition {
        Condition::Specified(true) => {
            qb.push(exists);
        }
        Condition::Specified(false) => {
            qb.push("NOT ");
            qb.push(exists);
        }
        other => {
            qb.push(exists);
            qb.push(" AND ");
            push_condition(qb, &format!("{}.id", relation.table()), other);
        }
    }
    qb.push(")");
}

fn push_condition(qb: &mut QueryBuilder<'static, Postgres>, column: &str, condition: &Condition) {
    match condition {
        Condition::Specified(true) => {
            qb.push(format!("{} IS NOT NULL", column));
        }
        Condition::Specified(false) => {
            qb.push(format!("{} IS NULL", column));
        }
        Condition::Equals(v) => push_comparison(qb, column, "=", v),
        Condition::NotEquals(v) => push_comparison(qb, column, "<>", v),
        Condition::GreaterThan(v) => push_comparison(qb, column, ">", v),
        Condition::GreaterOrEqualThan(v) => push_comparison(qb, column, ">=", v),
        Condition::LessThan(v) => push_comparison(qb, column, "<", v),
        Condition::LessOrEqualThan(v) => push_comparison(qb, column, "<=", v),
        Condition::In(values) if values.is_empty() => {
            qb.push("FALSE");
        }
        Condition::NotIn(values) if values.is_empty() => {
            qb.push("TRUE");
        }
        Condition::In(values) => push_list(qb, column, "IN", values),
        Condition::NotIn(values) => push_list(qb, column, "NOT IN", values),
        Condition::Contains(needle) => push_like(qb, column, "LIKE", needle),
        Condition::DoesNotContain(needle) => push_like(qb, column, "NOT LIKE", needle),
    }
}

fn push_comparison(qb: &mut QueryBuilder<'static, Postgres>, column: &str, op: &str, value: &Value) {
    qb.push(format!("{} {} ", column, op));
    push_value(qb, value);
}

fn push_list(qb: &mut QueryBuilder<'static, Postgres>, column: &str, op: &str, values: &[Value]) {
    qb.push(format!("{} {} (", column, op));
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(qb, value);
    }
    qb.push(")");
}

fn push_like(qb: &mut QueryBuilder<'static, Postgres>, column: &str, op: &str, needle: &str) {
    qb.push(format!("UPPER({}) {} UPPER(", column, op));
    qb.push_bind(format!("%{}%", escape_like(needle)));
    qb.push(")");
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &Value) {
    match value {
        Value::Null => {
            qb.push("NULL");
        }
        Value::Int(v) => {
            qb.push_bind(*v);
        }
        Value::Text(v) => {
            qb.push_bind(v.clone());
        }
        Value::Timestamp(v) => {
            qb.push_bind(*v);
        }
        Value::Bool(v) => {
            qb.push_bind(*v);
        }
    }
}

/// Escapes LIKE wildcards so the needle is matched literally. Backslash is
/// the default LIKE escape character in PostgreSQL.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tests::{TestColumn, TestRelation};

    fn where_sql(predicate: &Predicate<TestColumn>) -> String {
        count(predicate).sql().to_string()
    }

    #[test]
    fn match_all_has_no_where_clause() {
        assert_eq!(where_sql(&Predicate::all()), "SELECT COUNT(*) FROM things");
    }

    #[test]
    fn conjunction_of_bound_conditions() {
        let p = Predicate::Field(TestColumn::Name, Condition::Equals("AAAAAAAAAA".into()))
            .and(Predicate::Field(TestColumn::Score, Condition::GreaterOrEqualThan(1i64.into())))
            .and(Predicate::Field(TestColumn::Score, Condition::Specified(true)));
        assert_eq!(
            where_sql(&p),
            "SELECT COUNT(*) FROM things WHERE (things.name = $1 AND things.score >= $2 AND things.score IS NOT NULL)"
        );
    }

    #[test]
    fn lists_and_empty_lists() {
        let p = Predicate::Field(TestColumn::Id, Condition::In(vec![1i64.into(), 2i64.into()]));
        assert_eq!(where_sql(&p), "SELECT COUNT(*) FROM things WHERE things.id IN ($1, $2)");
        let p = Predicate::Field(TestColumn::Id, Condition::In(vec![]));
        assert_eq!(where_sql(&p), "SELECT COUNT(*) FROM things WHERE FALSE");
        let p = Predicate::Field(TestColumn::Id, Condition::NotIn(vec![3i64.into()]));
        assert_eq!(where_sql(&p), "SELECT COUNT(*) FROM things WHERE things.id NOT IN ($1)");
    }

    #[test]
    fn contains_is_case_insensitive_like() {
        let p = Predicate::Field(TestColumn::Name, Condition::DoesNotContain("a_b".to_string()));
        assert_eq!(where_sql(&p), "SELECT COUNT(*) FROM things WHERE UPPER(things.name) NOT LIKE UPPER($1)");
        let p = Predicate::Field(TestColumn::Name, Condition::Contains("straße".to_string()));
        assert_eq!(where_sql(&p), "SELECT COUNT(*) FROM things WHERE UPPER(things.name) LIKE UPPER($1)");
        assert_eq!(escape_like("50%_\\"), "50\\%\\_\\\\");
    }

    #[test]
    fn related_conditions_use_exists() {
        let p = Predicate::<TestColumn>::Related(TestRelation::Owner, Condition::Equals(7i64.into()));
        assert_eq!(
            where_sql(&p),
            "SELECT COUNT(*) FROM things WHERE EXISTS (SELECT 1 FROM owners WHERE owners.id = things.owner_id AND owners.id = $1)"
        );
        let p = Predicate::<TestColumn>::Related(TestRelation::Owner, Condition::Specified(false));
        assert_eq!(
            where_sql(&p),
            "SELECT COUNT(*) FROM things WHERE NOT EXISTS (SELECT 1 FROM owners WHERE owners.id = things.owner_id)"
        );
    }

    #[test]
    fn select_orders_and_limits() {
        let pageable = Pageable::of(2, 10).sorted(Sort::desc(TestColumn::Score));
        let qb = select(&Predicate::<TestColumn>::all(), &pageable.sort, Some(&pageable));
        assert_eq!(
            qb.sql(),
            "SELECT * FROM things ORDER BY things.score DESC, things.id ASC LIMIT $1 OFFSET $2"
        );
        let qb = select(&Predicate::<TestColumn>::all(), &[], None);
        assert_eq!(qb.sql(), "SELECT * FROM things ORDER BY things.id ASC");
    }
}

//! Generic persistence over PostgreSQL
//!
//! One `Repository<E>` contract, one `PgRepository<E>` adapter. An entity
//! describes its table through the `Entity` trait and the adapter builds the
//! SQL from that description, so adding a table means adding an `Entity`
//! impl rather than another repository.

mod entities;

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    Encode, FromRow, PgExecutor, PgPool, Postgres, Type,
};

use crate::error::{AppError, AppResult};

/// A row type stored in its own table with a `BIGINT` id
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    /// Column values written on insert and update
    type Draft: Send + Sync;

    /// Human readable name used in not-found errors
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Columns selected, `id` first
    const COLUMNS: &'static str;
    /// Columns bound by `bind_draft`, in bind order
    const WRITE_COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str = "id";
    /// Rows may be appended but never rewritten or removed
    const APPEND_ONLY: bool = false;

    fn bind_draft<'q>(
        draft: &'q Self::Draft,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments>;
}

/// Row predicate applied after loading
pub type Predicate<E> = dyn Fn(&E) -> bool + Send + Sync;

/// Uniform CRUD contract over one entity type
///
/// Rows come back bare. Related rows (a product's category and supplier) are
/// attached by the calling service from their own repositories, so the
/// include list lives there rather than on `get_all`.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<Option<E>>;

    /// All rows in table order, optionally filtered
    async fn get_all(&self, predicate: Option<&Predicate<E>>) -> AppResult<Vec<E>>;

    async fn add(&self, draft: &E::Draft) -> AppResult<E>;

    async fn update(&self, id: i64, draft: &E::Draft) -> AppResult<E>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// The PostgreSQL adapter for every entity
pub struct PgRepository<E> {
    db: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> PgRepository<E> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Fetch a row that must exist
    pub async fn require(&self, id: i64) -> AppResult<E> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(E::NAME.to_string()))
    }

    /// Rows matching a fixed SQL condition, in table order
    pub async fn find_where(&self, condition: &'static str) -> AppResult<Vec<E>> {
        let sql = select_where_sql::<E>(condition);
        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(&self.db).await?;
        Ok(rows)
    }

    /// Rows whose `column` holds `value`, in table order
    pub async fn find_by(&self, column: &str, value: i64) -> AppResult<Vec<E>> {
        writable::<E>(column)?;
        let sql = select_where_sql::<E>(&format!("{} = $1", column));
        let rows = sqlx::query_as::<_, E>(&sql)
            .bind(value)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Whether another row already uses `name`, ignoring `except_id`
    pub async fn name_taken(&self, name: &str, except_id: Option<i64>) -> AppResult<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
            E::TABLE
        );
        let taken = sqlx::query_scalar::<_, bool>(&sql)
            .bind(name)
            .bind(except_id)
            .fetch_one(&self.db)
            .await?;
        Ok(taken)
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PgRepository<E> {
    async fn get_by_id(&self, id: i64) -> AppResult<Option<E>> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", E::COLUMNS, E::TABLE);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn get_all(&self, predicate: Option<&Predicate<E>>) -> AppResult<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            E::COLUMNS,
            E::TABLE,
            E::ORDER_BY
        );
        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(&self.db).await?;

        Ok(match predicate {
            Some(keep) => rows.into_iter().filter(|row| keep(row)).collect(),
            None => rows,
        })
    }

    async fn add(&self, draft: &E::Draft) -> AppResult<E> {
        insert::<E, _>(&self.db, draft).await
    }

    async fn update(&self, id: i64, draft: &E::Draft) -> AppResult<E> {
        update_in::<E, _>(&self.db, id, draft).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        if E::APPEND_ONLY {
            return Err(append_only::<E>());
        }

        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.db).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(E::NAME.to_string()));
        }
        Ok(())
    }
}

fn append_only<E: Entity>() -> AppError {
    AppError::Conflict {
        resource: E::NAME.to_string(),
        message: format!("{} entries cannot be changed once recorded", E::NAME),
    }
}

fn writable<E: Entity>(column: &str) -> AppResult<()> {
    if E::WRITE_COLUMNS.contains(&column) {
        Ok(())
    } else {
        Err(AppError::Internal(format!("{} has no column {}", E::TABLE, column)))
    }
}

fn select_where_sql<E: Entity>(condition: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {}",
        E::COLUMNS,
        E::TABLE,
        condition,
        E::ORDER_BY
    )
}

fn set_column_sql<E: Entity>(column: &str) -> String {
    format!(
        "UPDATE {} SET {} = $1 WHERE id = $2 RETURNING {}",
        E::TABLE,
        column,
        E::COLUMNS
    )
}

fn insert_sql<E: Entity>() -> String {
    let placeholders: Vec<String> = (1..=E::WRITE_COLUMNS.len())
        .map(|i| format!("${}", i))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        E::TABLE,
        E::WRITE_COLUMNS.join(", "),
        placeholders.join(", "),
        E::COLUMNS
    )
}

fn update_sql<E: Entity>() -> String {
    let assignments: Vec<String> = E::WRITE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
        E::TABLE,
        assignments.join(", "),
        E::WRITE_COLUMNS.len() + 1,
        E::COLUMNS
    )
}

/// Insert a row on any executor, including an open transaction
pub async fn insert<'e, E, X>(executor: X, draft: &E::Draft) -> AppResult<E>
where
    E: Entity,
    X: PgExecutor<'e>,
{
    let sql = insert_sql::<E>();
    let row = E::bind_draft(draft, sqlx::query_as::<_, E>(&sql))
        .fetch_one(executor)
        .await?;
    Ok(row)
}

/// Rewrite a row's writable columns on any executor
pub async fn update_in<'e, E, X>(executor: X, id: i64, draft: &E::Draft) -> AppResult<E>
where
    E: Entity,
    X: PgExecutor<'e>,
{
    if E::APPEND_ONLY {
        return Err(append_only::<E>());
    }

    let sql = update_sql::<E>();
    E::bind_draft(draft, sqlx::query_as::<_, E>(&sql))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(E::NAME.to_string()))
}

/// Write one column and leave the others as the database has them
///
/// Concurrent writers to other columns of the same row are not overwritten.
pub async fn update_column<'e, E, X, T>(executor: X, id: i64, column: &str, value: T) -> AppResult<E>
where
    E: Entity,
    X: PgExecutor<'e>,
    T: for<'q> Encode<'q, Postgres> + Type<Postgres> + Send + 'static,
{
    if E::APPEND_ONLY {
        return Err(append_only::<E>());
    }
    writable::<E>(column)?;

    let sql = set_column_sql::<E>(column);
    sqlx::query_as::<_, E>(&sql)
        .bind(value)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(E::NAME.to_string()))
}

/// Read a row and hold its lock until the surrounding transaction ends
pub async fn fetch_for_update<'e, E, X>(executor: X, id: i64) -> AppResult<E>
where
    E: Entity,
    X: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
        E::COLUMNS,
        E::TABLE
    );
    sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(E::NAME.to_string()))
}

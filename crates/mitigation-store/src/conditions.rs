use mitigation_common::Condition;
use sqlx::{FromRow, SqlitePool};

use crate::error::StoreError;
use crate::serialize;

#[derive(FromRow)]
struct ConditionRow {
    id: i64,
    name: String,
    description: String,
    params: String,
    args: String,
    query: String,
    checks: String,
}

impl From<ConditionRow> for Condition {
    fn from(row: ConditionRow) -> Self {
        Condition {
            id: row.id,
            name: row.name,
            description: row.description,
            params: serialize::decode_params(&row.params),
            args: serialize::decode_args(&row.args),
            query: row.query,
            checks: serialize::decode_checks(&row.checks),
        }
    }
}

pub async fn store(pool: &SqlitePool, condition: &Condition) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO conditions (id, name, description, params, args, query, checks)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            params = excluded.params,
            args = excluded.args,
            query = excluded.query,
            checks = excluded.checks",
    )
    .bind(condition.id)
    .bind(&condition.name)
    .bind(&condition.description)
    .bind(serialize::encode_params(&condition.params))
    .bind(serialize::encode_args(&condition.args))
    .bind(&condition.query)
    .bind(serialize::encode_checks(&condition.checks))
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn retrieve(pool: &SqlitePool, id: i64) -> Result<Option<Condition>, StoreError> {
    let row: Option<ConditionRow> =
        sqlx::query_as("SELECT id, name, description, params, args, query, checks FROM conditions WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Condition::from))
}

pub async fn retrieve_many(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Condition>, StoreError> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(condition) = retrieve(pool, *id).await? {
            out.push(condition);
        }
    }
    Ok(out)
}

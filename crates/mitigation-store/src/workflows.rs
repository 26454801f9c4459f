use mitigation_common::Workflow;
use sqlx::{FromRow, SqlitePool};

use crate::conditions;
use crate::error::StoreError;
use crate::serialize;

#[derive(FromRow)]
struct WorkflowRow {
    id: i64,
    name: String,
    description: String,
    url: String,
    cost: i64,
    effective_attacks: String,
    params: String,
    args: String,
    condition_ids: String,
}

async fn hydrate(pool: &SqlitePool, row: WorkflowRow) -> Result<Workflow, StoreError> {
    let condition_ids = serialize::decode_id_list(&row.condition_ids);
    let conditions = conditions::retrieve_many(pool, &condition_ids).await?;
    Ok(Workflow {
        id: row.id,
        name: row.name,
        description: row.description,
        url: row.url,
        cost: row.cost,
        effective_attacks: serialize::decode_str_list(&row.effective_attacks),
        params: serialize::decode_params(&row.params),
        args: serialize::decode_args(&row.args),
        conditions,
    })
}

pub async fn store(pool: &SqlitePool, workflow: &Workflow) -> Result<(), StoreError> {
    let condition_ids: Vec<i64> = workflow.conditions.iter().map(|c| c.id).collect();
    sqlx::query(
        "INSERT INTO workflows (id, name, description, url, cost, effective_attacks, params, args, condition_ids)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            url = excluded.url,
            cost = excluded.cost,
            effective_attacks = excluded.effective_attacks,
            params = excluded.params,
            args = excluded.args,
            condition_ids = excluded.condition_ids",
    )
    .bind(workflow.id)
    .bind(&workflow.name)
    .bind(&workflow.description)
    .bind(&workflow.url)
    .bind(workflow.cost)
    .bind(serialize::encode_str_list(&workflow.effective_attacks))
    .bind(serialize::encode_params(&workflow.params))
    .bind(serialize::encode_args(&workflow.args))
    .bind(serialize::encode_id_list(&condition_ids))
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn retrieve(pool: &SqlitePool, id: i64) -> Result<Option<Workflow>, StoreError> {
    let row: Option<WorkflowRow> = sqlx::query_as(
        "SELECT id, name, description, url, cost, effective_attacks, params, args, condition_ids
         FROM workflows WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    match row {
        Some(row) => Ok(Some(hydrate(pool, row).await?)),
        None => Ok(None),
    }
}

/// Workflows whose `effective_attacks` contains `technique`, treated as a
/// set (spec §9 REDESIGN FLAGS: a semantic tightening of the original's
/// substring match over a comma-separated string).
pub async fn retrieve_applicable(pool: &SqlitePool, technique: &str) -> Result<Vec<Workflow>, StoreError> {
    let rows: Vec<WorkflowRow> = sqlx::query_as(
        "SELECT id, name, description, url, cost, effective_attacks, params, args, condition_ids FROM workflows",
    )
    .fetch_all(pool)
    .await?;
    let mut out = Vec::new();
    for row in rows {
        if serialize::decode_str_list(&row.effective_attacks).iter().any(|t| t == technique) {
            out.push(hydrate(pool, row).await?);
        }
    }
    Ok(out)
}

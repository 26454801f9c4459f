use mitigation_common::AttackNode;
use sqlx::{FromRow, SqlitePool};

use crate::conditions;
use crate::error::StoreError;
use crate::serialize;

#[derive(FromRow)]
struct NodeRow {
    id: i64,
    technique: String,
    condition_ids: String,
    probability_history: String,
    prv: Option<i64>,
    nxt: Option<i64>,
    description: String,
}

async fn hydrate(pool: &SqlitePool, row: NodeRow) -> Result<AttackNode, StoreError> {
    let condition_ids = serialize::decode_id_list(&row.condition_ids);
    let conditions = conditions::retrieve_many(pool, &condition_ids).await?;
    Ok(AttackNode {
        id: row.id,
        technique: row.technique,
        conditions,
        probability_history: serialize::decode_probability_history(&row.probability_history),
        prv: row.prv,
        nxt: row.nxt,
        description: row.description,
    })
}

pub async fn store(pool: &SqlitePool, node: &AttackNode) -> Result<(), StoreError> {
    let condition_ids: Vec<i64> = node.conditions.iter().map(|c| c.id).collect();
    sqlx::query(
        "INSERT INTO attack_nodes (id, technique, condition_ids, probability_history, prv, nxt, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            technique = excluded.technique,
            condition_ids = excluded.condition_ids,
            probability_history = excluded.probability_history,
            prv = excluded.prv,
            nxt = excluded.nxt,
            description = excluded.description",
    )
    .bind(node.id)
    .bind(&node.technique)
    .bind(serialize::encode_id_list(&condition_ids))
    .bind(serialize::encode_probability_history(&node.probability_history))
    .bind(node.prv)
    .bind(node.nxt)
    .bind(&node.description)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn retrieve(pool: &SqlitePool, id: i64) -> Result<Option<AttackNode>, StoreError> {
    let row: Option<NodeRow> = sqlx::query_as(
        "SELECT id, technique, condition_ids, probability_history, prv, nxt, description
         FROM attack_nodes WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    match row {
        Some(row) => Ok(Some(hydrate(pool, row).await?)),
        None => Ok(None),
    }
}

/// Persists only `probability_history`, per the State Store's
/// `update_probability(node)` contract (spec §4.4).
pub async fn update_probability_history(
    pool: &SqlitePool,
    node_id: i64,
    history: &[f64],
) -> Result<(), StoreError> {
    sqlx::query("UPDATE attack_nodes SET probability_history = ?1 WHERE id = ?2")
        .bind(serialize::encode_probability_history(history))
        .bind(node_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Number of nodes whose `prv` points at `id` — more than one indicates a
/// branching chain, which violates the linear-chain invariant (spec §3).
pub async fn successor_count(pool: &SqlitePool, id: i64) -> Result<i64, StoreError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attack_nodes WHERE prv = ?1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

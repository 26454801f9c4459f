use std::collections::HashMap;

use mitigation_common::{Attack, ContextValue};
use sqlx::{FromRow, SqlitePool};

use crate::error::StoreError;

#[derive(FromRow)]
struct AttackRow {
    id: i64,
    attack_graph: i64,
    attack_front: i64,
    context: String,
    is_complete: i64,
}

fn decode_context(s: &str) -> HashMap<String, ContextValue> {
    serde_json::from_str(s).unwrap_or_default()
}

fn encode_context(ctx: &HashMap<String, ContextValue>) -> String {
    serde_json::to_string(ctx).unwrap_or_else(|_| "{}".to_string())
}

impl From<AttackRow> for Attack {
    fn from(row: AttackRow) -> Self {
        Attack {
            id: row.id,
            attack_graph: row.attack_graph,
            attack_front: row.attack_front,
            context: decode_context(&row.context),
            is_complete: row.is_complete != 0,
        }
    }
}

pub async fn retrieve_state(pool: &SqlitePool) -> Result<Vec<Attack>, StoreError> {
    let rows: Vec<AttackRow> =
        sqlx::query_as("SELECT id, attack_graph, attack_front, context, is_complete FROM attacks")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(Attack::from).collect())
}

pub async fn retrieve(pool: &SqlitePool, id: i64) -> Result<Option<Attack>, StoreError> {
    let row: Option<AttackRow> = sqlx::query_as(
        "SELECT id, attack_graph, attack_front, context, is_complete FROM attacks WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Attack::from))
}

pub async fn for_graph(pool: &SqlitePool, attack_graph: i64) -> Result<Vec<Attack>, StoreError> {
    let rows: Vec<AttackRow> = sqlx::query_as(
        "SELECT id, attack_graph, attack_front, context, is_complete FROM attacks WHERE attack_graph = ?1",
    )
    .bind(attack_graph)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Attack::from).collect())
}

pub async fn start(pool: &SqlitePool, initial_node: i64) -> Result<Attack, StoreError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO attacks (attack_graph, attack_front, context, is_complete)
         VALUES (?1, ?1, '{}', 0)
         RETURNING id",
    )
    .bind(initial_node)
    .fetch_one(pool)
    .await?;
    Ok(Attack {
        id,
        attack_graph: initial_node,
        attack_front: initial_node,
        context: HashMap::new(),
        is_complete: false,
    })
}

/// Persists an in-progress attack's front and context (the attack is still
/// live — see `delete` for the completion path).
pub async fn persist(pool: &SqlitePool, attack: &Attack) -> Result<(), StoreError> {
    sqlx::query("UPDATE attacks SET attack_front = ?1, context = ?2 WHERE id = ?3")
        .bind(attack.attack_front)
        .bind(encode_context(&attack.context))
        .bind(attack.id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM attacks WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(())
}

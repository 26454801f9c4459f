use mitigation_common::AttackGraph;
use sqlx::SqlitePool;

use crate::error::StoreError;

pub async fn store(pool: &SqlitePool, graph: &AttackGraph) -> Result<(), StoreError> {
    sqlx::query("INSERT OR IGNORE INTO attack_graphs (initial_node) VALUES (?1)")
        .bind(graph.initial_node)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn retrieve(pool: &SqlitePool, initial_node: i64) -> Result<Option<AttackGraph>, StoreError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT initial_node FROM attack_graphs WHERE initial_node = ?1")
        .bind(initial_node)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(initial_node,)| AttackGraph { initial_node }))
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<AttackGraph>, StoreError> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT initial_node FROM attack_graphs").fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(initial_node,)| AttackGraph { initial_node }).collect())
}

use sqlx::SqlitePool;

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS conditions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    params TEXT NOT NULL,
    args TEXT NOT NULL,
    query TEXT NOT NULL,
    checks TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attack_nodes (
    id INTEGER PRIMARY KEY,
    technique TEXT NOT NULL,
    condition_ids TEXT NOT NULL DEFAULT '',
    probability_history TEXT NOT NULL DEFAULT '',
    prv INTEGER REFERENCES attack_nodes(id),
    nxt INTEGER REFERENCES attack_nodes(id),
    description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attack_graphs (
    initial_node INTEGER PRIMARY KEY REFERENCES attack_nodes(id)
);

CREATE TABLE IF NOT EXISTS workflows (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    url TEXT NOT NULL,
    cost INTEGER NOT NULL,
    effective_attacks TEXT NOT NULL DEFAULT '',
    params TEXT NOT NULL,
    args TEXT NOT NULL,
    condition_ids TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS attacks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    attack_graph INTEGER NOT NULL REFERENCES attack_graphs(initial_node),
    attack_front INTEGER NOT NULL REFERENCES attack_nodes(id),
    context TEXT NOT NULL DEFAULT '{}',
    is_complete INTEGER NOT NULL DEFAULT 0
);
"#;

/// Creates the relational schema if it doesn't already exist.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in DDL.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

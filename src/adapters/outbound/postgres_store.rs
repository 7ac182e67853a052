use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use std::path::PathBuf;
use tokio_postgres::NoTls;
use tracing::warn;

use crate::common::{DomainError, DomainResult};
use crate::config::PostgresConfig;
use crate::domains::planning::{loader, ResultRecord, Scenario, ScenarioStore};

/// Scenario store backed by PostgreSQL. Connections are checked out of the
/// pool per operation and returned when the guard drops, on every exit path.
pub struct PostgresScenarioStore {
    pool: Pool,
    map_dir: PathBuf,
}

impl PostgresScenarioStore {
    pub fn new(config: &PostgresConfig, map_dir: PathBuf) -> DomainResult<Self> {
        let mut pg_config = Config::new();
        pg_config.host = Some(config.host.clone());
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database.clone());
        pg_config.user = Some(config.username.clone());
        pg_config.password = Some(config.password.clone());
        pg_config.pool = Some(PoolConfig::new(config.max_connections as usize));

        let pool = pg_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DomainError::Persistence(format!("create PostgreSQL pool: {}", e)))?;

        Ok(Self { pool, map_dir })
    }
}

#[async_trait]
impl ScenarioStore for PostgresScenarioStore {
    async fn load_scenarios(&self) -> DomainResult<Vec<Scenario>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::Persistence(format!("get database connection: {}", e)))?;

        let rows = client
            .query(
                "SELECT scenario_id::BIGINT, start_state, goal_state, map_name FROM scenarios",
                &[],
            )
            .await
            .map_err(|e| DomainError::Persistence(format!("query scenarios: {}", e)))?;

        let mut scenarios = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get(0);
            let start_text: String = row.get(1);
            let goal_text: String = row.get(2);
            let map_name: String = row.get(3);

            // A malformed row costs that scenario only.
            match loader::scenario_from_row(id, &start_text, &goal_text, &map_name, &self.map_dir)
            {
                Ok(scenario) => scenarios.push(scenario),
                Err(e) => warn!("Skipping scenario {}: {}", id, e),
            }
        }
        Ok(scenarios)
    }

    async fn insert_result(&self, record: &ResultRecord) -> DomainResult<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::Persistence(format!("get database connection: {}", e)))?;

        client
            .execute(
                r#"INSERT INTO "Lamy_results" ("File_ID", "Calculation_Time", "Algorithm_Name", "File_name")
                   VALUES ($1, $2, $3, $4)"#,
                &[
                    &record.file_id.to_string(),
                    &record.calculation_time,
                    &record.algorithm_name,
                    &record.file_name,
                ],
            )
            .await
            .map_err(|e| DomainError::Persistence(format!("insert result record: {}", e)))?;
        Ok(())
    }
}

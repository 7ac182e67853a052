use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domains::planning::PlanningAlgorithm;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub postgres: PostgresConfig,
    pub simulator: SimulatorConfig,
    pub planner: PlannerConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for establishing the session. The remote side may block
    /// individual calls arbitrarily long; only the connect is bounded here.
    pub connect_timeout_secs: u64,
    /// Upper bound for one path traversal in the simulator.
    pub traversal_timeout_secs: u64,
    pub poll_initial_ms: u64,
    pub poll_max_ms: u64,
    /// Scene object name the planner operates on.
    pub robot_name: String,
    pub target_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub algorithm: PlanningAlgorithm,
    /// How many times the planner searches for a given task.
    pub search_count: i64,
    /// Interpolation states requested for the resulting path.
    pub interpolation_density: i64,
    pub collision_checking: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the collision maps referenced by scenarios.
    pub map_dir: PathBuf,
    /// Directory the per-scenario path files are written to.
    pub output_dir: PathBuf,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            postgres: PostgresConfig {
                host: "localhost".to_string(),
                port: 5432,
                database: "scenarios".to_string(),
                username: "postgres".to_string(),
                password: "password".to_string(),
                max_connections: 10,
            },
            simulator: SimulatorConfig {
                host: "127.0.0.1".to_string(),
                port: 19997,
                connect_timeout_secs: 500,
                traversal_timeout_secs: 120,
                poll_initial_ms: 10,
                poll_max_ms: 500,
                robot_name: "UR5".to_string(),
                target_name: "testPose1".to_string(),
            },
            planner: PlannerConfig {
                algorithm: PlanningAlgorithm::RrtConnect,
                search_count: 1,
                interpolation_density: 400,
                collision_checking: true,
            },
            paths: PathsConfig {
                map_dir: PathBuf::from("maps"),
                output_dir: PathBuf::from("path_files"),
            },
        }
    }
}

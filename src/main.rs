use std::error::Error;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ompl_bench::adapters::outbound::{PostgresScenarioStore, RemoteApiClient};
use ompl_bench::application::{BatchRunner, ResultWriter, TraversalWait};
use ompl_bench::domains::planning::{PlanningSimulator, ScenarioStore};
use ompl_bench::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting planner benchmark run");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::from_file(&config_path).await?;

    info!("Configuration loaded successfully");
    info!("PostgreSQL host: {}", config.postgres.host);
    info!("Algorithm: {}", config.planner.algorithm.name());

    let store = Arc::new(PostgresScenarioStore::new(
        &config.postgres,
        config.paths.map_dir.clone(),
    )?);
    let scenarios = store.load_scenarios().await?;
    info!("Loaded {} scenarios", scenarios.len());

    // Failing to reach the simulator aborts before any scenario is attempted.
    let simulator = Arc::new(RemoteApiClient::connect(&config.simulator).await?);
    info!(
        "Connected to remote API server at {}:{}",
        config.simulator.host, config.simulator.port
    );

    simulator.start_simulation().await?;
    match simulator.robot_state().await {
        Ok(state) => info!("Initial robot state has {} joints", state.len()),
        Err(e) => warn!("Could not read initial robot state: {}", e),
    }
    match simulator.object_pose(&config.simulator.target_name).await {
        Ok(pose) => info!(
            "Target {} pose has {} values",
            config.simulator.target_name,
            pose.len()
        ),
        Err(e) => warn!("Could not read target pose: {}", e),
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let writer = ResultWriter::new(store.clone(), config.paths.output_dir.clone());
    let runner = BatchRunner::new(
        simulator.clone(),
        writer,
        config.planner.clone(),
        TraversalWait::from(&config.simulator),
        cancel,
    );

    // Per-scenario failures are tallied, never fatal.
    let summary = runner.run(&scenarios).await;
    info!(
        "Batch finished: {} attempted, {} planned, {} without path, {} failed ({} .. {})",
        summary.attempted,
        summary.planned,
        summary.no_path,
        summary.failed,
        summary.started_at,
        summary.finished_at
    );

    if let Err(e) = simulator.stop_simulation().await {
        warn!("Failed to stop simulation: {}", e);
    }

    Ok(())
}

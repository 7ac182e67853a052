use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::result_writer::ResultWriter;
use crate::common::{DomainError, DomainResult};
use crate::config::{PlannerConfig, SimulatorConfig};
use crate::domains::planning::{
    format_state_vector, PlanningRequest, PlanningResult, PlanningSimulator, Scenario,
};

/// How the traversal-completion wait behaves: exponential backoff between
/// status polls, bounded by an overall timeout.
#[derive(Debug, Clone)]
pub struct TraversalWait {
    pub initial: Duration,
    pub max: Duration,
    pub timeout: Duration,
}

impl From<&SimulatorConfig> for TraversalWait {
    fn from(config: &SimulatorConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.poll_initial_ms),
            max: Duration::from_millis(config.poll_max_ms),
            timeout: Duration::from_secs(config.traversal_timeout_secs),
        }
    }
}

/// Outcome of one scenario that made it through planning and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioOutcome {
    /// A path was found, persisted, and traversed in the simulator.
    Traversed,
    /// The planner reported no solution; persisted, nothing to visualize.
    NoPath,
}

/// Tally of one batch run.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub attempted: usize,
    pub planned: usize,
    pub no_path: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives the scenario batch: one planning attempt per scenario, timed,
/// persisted, and optionally traversed in the simulator. Per-scenario
/// failures are logged and the batch moves on; only cancellation stops the
/// loop early.
pub struct BatchRunner {
    simulator: Arc<dyn PlanningSimulator>,
    writer: ResultWriter,
    planner: PlannerConfig,
    wait: TraversalWait,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(
        simulator: Arc<dyn PlanningSimulator>,
        writer: ResultWriter,
        planner: PlannerConfig,
        wait: TraversalWait,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            simulator,
            writer,
            planner,
            wait,
            cancel,
        }
    }

    pub async fn run(&self, scenarios: &[Scenario]) -> BatchSummary {
        let started_at = Utc::now();
        let mut summary = BatchSummary {
            attempted: 0,
            planned: 0,
            no_path: 0,
            failed: 0,
            started_at,
            finished_at: started_at,
        };

        for scenario in scenarios {
            if self.cancel.is_cancelled() {
                warn!("Cancelled; stopping before scenario {}", scenario.id);
                break;
            }
            summary.attempted += 1;
            match self.run_scenario(scenario).await {
                Ok(ScenarioOutcome::Traversed) => summary.planned += 1,
                Ok(ScenarioOutcome::NoPath) => {
                    info!("Scenario {}: planner found no path", scenario.id);
                    summary.no_path += 1;
                }
                Err(DomainError::Cancelled) => {
                    warn!("Cancelled during scenario {}", scenario.id);
                    summary.failed += 1;
                    break;
                }
                Err(e) => {
                    warn!("Scenario {} failed: {}", scenario.id, e);
                    summary.failed += 1;
                }
            }
        }

        summary.finished_at = Utc::now();
        summary
    }

    /// One full pass for a single scenario: map update, timed planning call,
    /// persistence, and (when a path exists) visualization and traversal.
    async fn run_scenario(&self, scenario: &Scenario) -> DomainResult<ScenarioOutcome> {
        self.simulator.update_map(&scenario.map_path).await?;

        info!(
            "Scenario {}: start {} goal {}",
            scenario.id,
            format_state_vector(&scenario.start_state),
            format_state_vector(&scenario.goal_state)
        );
        let request = self.build_request(scenario);

        let started = Instant::now();
        let response = self.simulator.find_path(&request).await?;
        let result = PlanningResult::from_response(response, started.elapsed());
        info!(
            "Scenario {}: status {} in {:.3}s, {} samples",
            scenario.id,
            result.status_code,
            result.elapsed.as_secs_f64(),
            result.path.len()
        );

        let record = self.writer.persist(&result, self.planner.algorithm).await?;
        info!("Scenario {}: results saved as {}", scenario.id, record.file_name);

        if result.found_path() {
            self.traverse(&result.path).await?;
            Ok(ScenarioOutcome::Traversed)
        } else {
            Ok(ScenarioOutcome::NoPath)
        }
    }

    fn build_request(&self, scenario: &Scenario) -> PlanningRequest {
        let combined_config = scenario
            .start_state
            .iter()
            .chain(scenario.goal_state.iter())
            .copied()
            .collect();
        PlanningRequest {
            combined_config,
            algorithm: self.planner.algorithm,
            search_count: self.planner.search_count,
            interpolation_density: self.planner.interpolation_density,
            collision_checking: self.planner.collision_checking,
        }
    }

    /// Visualize the path, command the robot through it, and wait for the
    /// traversal to finish. The wait polls the simulator with exponential
    /// backoff, honours cancellation between polls, and gives up after the
    /// configured timeout. The visualization is removed on the success path
    /// only; a timed-out traversal leaves the line for inspection.
    async fn traverse(&self, path: &[f64]) -> DomainResult<()> {
        let line_handle = self.simulator.visualize_path(path).await?;
        self.simulator.run_through_path(path).await?;

        let deadline = Instant::now() + self.wait.timeout;
        let mut delay = self.wait.initial;
        while self.simulator.is_running_through_path().await? {
            if Instant::now() >= deadline {
                return Err(DomainError::Timeout("path traversal".to_string()));
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(DomainError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            delay = (delay * 2).min(self.wait.max);
        }

        self.simulator.remove_line(line_handle).await?;
        Ok(())
    }
}

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

use ompl_bench::application::{BatchRunner, ResultWriter, TraversalWait};
use ompl_bench::common::{DomainError, DomainResult};
use ompl_bench::config::PlannerConfig;
use ompl_bench::domains::planning::{
    PlannerResponse, PlanningAlgorithm, PlanningRequest, PlanningSimulator, ResultRecord,
    Scenario, ScenarioStore,
};

/// In-process simulator double. Records every call by name; maps whose path
/// contains "bad" fail the map update, and the traversal flag reports
/// running for a configurable number of polls.
struct MockSimulator {
    calls: Mutex<Vec<String>>,
    response: PlannerResponse,
    running_polls: AtomicUsize,
}

impl MockSimulator {
    fn new(response: PlannerResponse, running_polls: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response,
            running_polls: AtomicUsize::new(running_polls),
        }
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }
}

#[async_trait]
impl PlanningSimulator for MockSimulator {
    async fn start_simulation(&self) -> DomainResult<()> {
        self.record("startSimulation");
        Ok(())
    }

    async fn stop_simulation(&self) -> DomainResult<()> {
        self.record("stopSimulation");
        Ok(())
    }

    async fn update_map(&self, map_path: &Path) -> DomainResult<()> {
        self.record("UpdateMap");
        if map_path.to_string_lossy().contains("bad") {
            return Err(DomainError::RemoteCall {
                call: "UpdateMap".to_string(),
                status: 3,
            });
        }
        Ok(())
    }

    async fn robot_state(&self) -> DomainResult<Vec<f64>> {
        self.record("getRobotState");
        Ok(vec![0.0; 6])
    }

    async fn object_pose(&self, _name: &str) -> DomainResult<Vec<f64>> {
        self.record("getObjectPose");
        Ok(vec![0.0; 12])
    }

    async fn find_path(&self, _request: &PlanningRequest) -> DomainResult<PlannerResponse> {
        self.record("findPath_goalIsState");
        Ok(self.response.clone())
    }

    async fn visualize_path(&self, _path: &[f64]) -> DomainResult<i64> {
        self.record("visualizePath");
        Ok(42)
    }

    async fn run_through_path(&self, _path: &[f64]) -> DomainResult<()> {
        self.record("runThroughPath");
        Ok(())
    }

    async fn is_running_through_path(&self) -> DomainResult<bool> {
        self.record("isRunningThroughPath");
        let remaining = self.running_polls.load(Ordering::SeqCst);
        if remaining > 0 {
            self.running_polls.store(remaining - 1, Ordering::SeqCst);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn remove_line(&self, _line_handle: i64) -> DomainResult<()> {
        self.record("removeLine");
        Ok(())
    }
}

/// In-memory results store.
struct MemoryStore {
    inserted: Mutex<Vec<ResultRecord>>,
    fail_insert: bool,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            inserted: Mutex::new(Vec::new()),
            fail_insert: false,
        }
    }

    fn failing() -> Self {
        Self {
            inserted: Mutex::new(Vec::new()),
            fail_insert: true,
        }
    }

    fn records(&self) -> Vec<ResultRecord> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScenarioStore for MemoryStore {
    async fn load_scenarios(&self) -> DomainResult<Vec<Scenario>> {
        Ok(Vec::new())
    }

    async fn insert_result(&self, record: &ResultRecord) -> DomainResult<()> {
        if self.fail_insert {
            return Err(DomainError::Persistence("insert refused".to_string()));
        }
        self.inserted.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn scenario(id: i64, map: &str) -> Scenario {
    Scenario {
        id,
        start_state: vec![0.0; 6],
        goal_state: vec![1.0; 6],
        map_path: PathBuf::from(format!("maps/{}.stl", map)),
    }
}

fn planner_config() -> PlannerConfig {
    PlannerConfig {
        algorithm: PlanningAlgorithm::RrtConnect,
        search_count: 1,
        interpolation_density: 400,
        collision_checking: true,
    }
}

fn fast_wait() -> TraversalWait {
    TraversalWait {
        initial: Duration::from_millis(1),
        max: Duration::from_millis(5),
        timeout: Duration::from_secs(1),
    }
}

fn runner(
    simulator: Arc<MockSimulator>,
    store: Arc<MemoryStore>,
    output_dir: PathBuf,
) -> BatchRunner {
    let writer = ResultWriter::new(store, output_dir);
    BatchRunner::new(
        simulator,
        writer,
        planner_config(),
        fast_wait(),
        CancellationToken::new(),
    )
}

fn two_config_path() -> Vec<f64> {
    let mut samples = vec![0.0; 6];
    samples.extend(vec![1.0; 6]);
    samples
}

#[tokio::test]
async fn test_planned_scenario_writes_file_row_and_traverses() {
    let dir = tempdir().unwrap();
    let simulator = Arc::new(MockSimulator::new(
        PlannerResponse {
            status_code: 0,
            path: two_config_path(),
        },
        2,
    ));
    let store = Arc::new(MemoryStore::new());
    let runner = runner(simulator.clone(), store.clone(), dir.path().to_path_buf());

    let summary = runner.run(&[scenario(1, "office")]).await;
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.planned, 1);
    assert_eq!(summary.failed, 0);

    // Exactly one row, named after the uuid, with the configured algorithm.
    let records = store.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.algorithm_name, "RRTConnect");
    assert_eq!(record.file_name, format!("{}.txt", record.file_id));

    // The file exists and carries two lines, the second in degrees.
    let contents = std::fs::read_to_string(dir.path().join(&record.file_name)).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    for token in lines[1].split(", ") {
        let degrees: f64 = token.parse().unwrap();
        assert!((degrees - 57.29577951308232).abs() < 1e-9);
    }

    // Full traversal sequence ran, including the backoff polls.
    assert_eq!(simulator.count("visualizePath"), 1);
    assert_eq!(simulator.count("runThroughPath"), 1);
    assert_eq!(simulator.count("isRunningThroughPath"), 3);
    assert_eq!(simulator.count("removeLine"), 1);
}

#[tokio::test]
async fn test_planning_failure_skips_visualization_but_persists() {
    let dir = tempdir().unwrap();
    let simulator = Arc::new(MockSimulator::new(
        PlannerResponse {
            status_code: 2,
            path: Vec::new(),
        },
        0,
    ));
    let store = Arc::new(MemoryStore::new());
    let runner = runner(simulator.clone(), store.clone(), dir.path().to_path_buf());

    let summary = runner.run(&[scenario(1, "office")]).await;
    assert_eq!(summary.no_path, 1);
    assert_eq!(summary.failed, 0);

    // Row still inserted, file still written (empty).
    let records = store.records();
    assert_eq!(records.len(), 1);
    let contents = std::fs::read_to_string(dir.path().join(&records[0].file_name)).unwrap();
    assert!(contents.is_empty());

    // No visualization or traversal calls.
    assert_eq!(simulator.count("visualizePath"), 0);
    assert_eq!(simulator.count("runThroughPath"), 0);
    assert_eq!(simulator.count("removeLine"), 0);
}

#[tokio::test]
async fn test_failed_map_update_skips_scenario_and_batch_continues() {
    let dir = tempdir().unwrap();
    let simulator = Arc::new(MockSimulator::new(
        PlannerResponse {
            status_code: 0,
            path: two_config_path(),
        },
        0,
    ));
    let store = Arc::new(MemoryStore::new());
    let runner = runner(simulator.clone(), store.clone(), dir.path().to_path_buf());

    let summary = runner
        .run(&[scenario(1, "bad_mesh"), scenario(2, "office")])
        .await;
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.planned, 1);

    // Planning never ran for the skipped scenario.
    assert_eq!(simulator.count("findPath_goalIsState"), 1);
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn test_insert_failure_is_scenario_local() {
    let dir = tempdir().unwrap();
    let simulator = Arc::new(MockSimulator::new(
        PlannerResponse {
            status_code: 0,
            path: two_config_path(),
        },
        0,
    ));
    let store = Arc::new(MemoryStore::failing());
    let runner = runner(simulator.clone(), store.clone(), dir.path().to_path_buf());

    let summary = runner
        .run(&[scenario(1, "office"), scenario(2, "office")])
        .await;
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.failed, 2);

    // Persistence failed before any visualization was attempted, and the
    // batch still tried both scenarios.
    assert_eq!(simulator.count("findPath_goalIsState"), 2);
    assert_eq!(simulator.count("visualizePath"), 0);
}

#[tokio::test]
async fn test_each_attempt_gets_a_fresh_identifier() {
    let dir = tempdir().unwrap();
    let simulator = Arc::new(MockSimulator::new(
        PlannerResponse {
            status_code: 0,
            path: two_config_path(),
        },
        0,
    ));
    let store = Arc::new(MemoryStore::new());
    let runner = runner(simulator, store.clone(), dir.path().to_path_buf());

    runner.run(&[scenario(1, "office")]).await;
    runner.run(&[scenario(1, "office")]).await;

    let records = store.records();
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].file_id, records[1].file_id);
    assert!(dir.path().join(&records[0].file_name).exists());
    assert!(dir.path().join(&records[1].file_name).exists());
}

#[tokio::test]
async fn test_traversal_timeout_fails_scenario() {
    let dir = tempdir().unwrap();
    // Traversal flag never clears.
    let simulator = Arc::new(MockSimulator::new(
        PlannerResponse {
            status_code: 0,
            path: two_config_path(),
        },
        usize::MAX,
    ));
    let store = Arc::new(MemoryStore::new());
    let writer = ResultWriter::new(store.clone(), dir.path().to_path_buf());
    let runner = BatchRunner::new(
        simulator.clone(),
        writer,
        planner_config(),
        TraversalWait {
            initial: Duration::from_millis(1),
            max: Duration::from_millis(2),
            timeout: Duration::from_millis(20),
        },
        CancellationToken::new(),
    );

    let summary = runner.run(&[scenario(1, "office")]).await;
    assert_eq!(summary.failed, 1);
    // The result row was persisted before the traversal timed out.
    assert_eq!(store.records().len(), 1);
    // The line is left in place for inspection on the timeout path.
    assert_eq!(simulator.count("removeLine"), 0);
}

#[tokio::test]
async fn test_cancelled_token_stops_before_first_scenario() {
    let dir = tempdir().unwrap();
    let simulator = Arc::new(MockSimulator::new(
        PlannerResponse {
            status_code: 0,
            path: two_config_path(),
        },
        0,
    ));
    let store = Arc::new(MemoryStore::new());
    let writer = ResultWriter::new(store.clone(), dir.path().to_path_buf());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let runner = BatchRunner::new(
        simulator.clone(),
        writer,
        planner_config(),
        fast_wait(),
        cancel,
    );

    let summary = runner.run(&[scenario(1, "office")]).await;
    assert_eq!(summary.attempted, 0);
    assert_eq!(simulator.count("findPath_goalIsState"), 0);
    assert!(store.records().is_empty());
}

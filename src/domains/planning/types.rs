use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// One planning task as stored in the scenario table: where the robot
/// starts, where it should end up, and which collision map applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: i64,
    pub start_state: Vec<f64>,
    pub goal_state: Vec<f64>,
    pub map_path: PathBuf,
}

/// Sampling-based planners exposed by the simulator's scripting API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanningAlgorithm {
    #[serde(rename = "RRT")]
    Rrt,
    #[serde(rename = "RRTConnect")]
    RrtConnect,
    #[serde(rename = "SBL")]
    Sbl,
}

impl PlanningAlgorithm {
    /// Numeric id the scripting API expects.
    pub fn wire_id(&self) -> i64 {
        match self {
            PlanningAlgorithm::Rrt => 30018,
            PlanningAlgorithm::RrtConnect => 30019,
            PlanningAlgorithm::Sbl => 30021,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlanningAlgorithm::Rrt => "RRT",
            PlanningAlgorithm::RrtConnect => "RRTConnect",
            PlanningAlgorithm::Sbl => "SBL",
        }
    }
}

/// Transient request for one planning attempt. The remote planner takes the
/// start and goal configurations as a single concatenated vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub combined_config: Vec<f64>,
    pub algorithm: PlanningAlgorithm,
    pub search_count: i64,
    pub interpolation_density: i64,
    pub collision_checking: bool,
}

/// Raw planner reply: a status code and the flat stream of joint samples
/// (six values per configuration for the 6-DOF arm). The path is empty when
/// no solution was found.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerResponse {
    pub status_code: i32,
    pub path: Vec<f64>,
}

/// Planner reply plus the wall-clock duration measured around the call.
#[derive(Debug, Clone)]
pub struct PlanningResult {
    pub status_code: i32,
    pub path: Vec<f64>,
    pub elapsed: Duration,
}

impl PlanningResult {
    pub fn from_response(response: PlannerResponse, elapsed: Duration) -> Self {
        Self {
            status_code: response.status_code,
            path: response.path,
            elapsed,
        }
    }

    pub fn found_path(&self) -> bool {
        self.status_code == 0 && !self.path.is_empty()
    }
}

/// One durable row in the results table. `file_name` is always
/// `"<file_id>.txt"`; that shared identifier joins the database row to the
/// path file on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub file_id: Uuid,
    pub calculation_time: f64,
    pub algorithm_name: String,
    pub file_name: String,
}

impl ResultRecord {
    pub fn new(file_id: Uuid, calculation_time: f64, algorithm: PlanningAlgorithm) -> Self {
        Self {
            file_id,
            calculation_time,
            algorithm_name: algorithm.name().to_string(),
            file_name: format!("{}.txt", file_id),
        }
    }
}

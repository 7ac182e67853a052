use async_trait::async_trait;
use std::path::Path;

use crate::common::DomainResult;
use crate::domains::planning::types::{PlannerResponse, PlanningRequest, ResultRecord, Scenario};

/// Port to the relational store holding scenario inputs and result records.
#[async_trait]
pub trait ScenarioStore: Send + Sync {
    /// Load every scenario row, in the order the store returns them.
    async fn load_scenarios(&self) -> DomainResult<Vec<Scenario>>;

    /// Insert one result record. Values are always bound as parameters.
    async fn insert_result(&self, record: &ResultRecord) -> DomainResult<()>;
}

/// Port to the remote simulator's scripting API. All calls are synchronous
/// request/response on one pre-established session.
#[async_trait]
pub trait PlanningSimulator: Send + Sync {
    async fn start_simulation(&self) -> DomainResult<()>;

    async fn stop_simulation(&self) -> DomainResult<()>;

    /// Swap the active collision map for the given mesh file.
    async fn update_map(&self, map_path: &Path) -> DomainResult<()>;

    /// Current joint state of the robot the session was opened for.
    async fn robot_state(&self) -> DomainResult<Vec<f64>>;

    /// Pose (transformation matrix, 12 values) of a named scene object.
    async fn object_pose(&self, name: &str) -> DomainResult<Vec<f64>>;

    /// Run the planner once. Returns whatever the planner produced; a
    /// non-zero status or empty path is a valid reply, not an error.
    async fn find_path(&self, request: &PlanningRequest) -> DomainResult<PlannerResponse>;

    /// Draw the path in the scene; returns a handle for later removal.
    async fn visualize_path(&self, path: &[f64]) -> DomainResult<i64>;

    /// Command the robot to traverse the path. Returns immediately; poll
    /// [`is_running_through_path`](Self::is_running_through_path) for completion.
    async fn run_through_path(&self, path: &[f64]) -> DomainResult<()>;

    async fn is_running_through_path(&self) -> DomainResult<bool>;

    async fn remove_line(&self, line_handle: i64) -> DomainResult<()>;
}

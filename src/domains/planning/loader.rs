use std::path::{Path, PathBuf};

use crate::common::DomainResult;
use crate::domains::planning::parse::parse_state_vector;
use crate::domains::planning::types::Scenario;

/// Resolve a stored map name against the configured map directory. Maps are
/// shipped as STL meshes; existence is checked by the simulator when the
/// map is loaded, not here.
pub fn resolve_map_path(map_dir: &Path, map_name: &str) -> PathBuf {
    map_dir.join(format!("{}.stl", map_name))
}

/// Assemble one scenario from its raw row. Start and goal state come as
/// bracketed numeric text; a malformed vector fails this scenario only.
pub fn scenario_from_row(
    id: i64,
    start_text: &str,
    goal_text: &str,
    map_name: &str,
    map_dir: &Path,
) -> DomainResult<Scenario> {
    Ok(Scenario {
        id,
        start_state: parse_state_vector(start_text)?,
        goal_state: parse_state_vector(goal_text)?,
        map_path: resolve_map_path(map_dir, map_name),
    })
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::common::{DomainError, DomainResult};
use crate::config::SimulatorConfig;
use crate::domains::planning::{PlannerResponse, PlanningRequest, PlanningSimulator};

/// One scripting call: a named function with integer, float and string
/// argument lists, answered by a [`ScriptReply`]. Sent as one JSON object
/// per line on the session socket.
#[derive(Serialize)]
struct ScriptCall<'a> {
    function: &'a str,
    ints: &'a [i64],
    floats: &'a [f64],
    strings: &'a [&'a str],
}

#[derive(Deserialize)]
struct ScriptReply {
    status: i32,
    #[serde(default)]
    ints: Vec<i64>,
    #[serde(default)]
    floats: Vec<f64>,
}

#[derive(Debug)]
struct Session {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Client for the simulator's remote scripting API. One TCP session, opened
/// once at startup and held for the whole run; every call is a strictly
/// sequential request/response exchange, serialized behind a mutex.
#[derive(Debug)]
pub struct RemoteApiClient {
    session: Mutex<Session>,
    robot_handle: i64,
}

impl RemoteApiClient {
    /// Establish the session and resolve the robot handle. Any failure here
    /// is fatal for the run.
    pub async fn connect(config: &SimulatorConfig) -> DomainResult<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let connect = TcpStream::connect(&addr);
        let stream = tokio::time::timeout(
            Duration::from_secs(config.connect_timeout_secs),
            connect,
        )
        .await
        .map_err(|_| DomainError::Connection(format!("timed out connecting to {}", addr)))?
        .map_err(|e| DomainError::Connection(format!("{}: {}", addr, e)))?;

        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            session: Mutex::new(Session {
                reader: BufReader::new(read_half),
                writer: write_half,
            }),
            robot_handle: 0,
        };

        let robot_handle = client.object_handle(&config.robot_name).await?;
        client.robot_handle = robot_handle;
        Ok(client)
    }

    async fn call(
        &self,
        function: &str,
        ints: &[i64],
        floats: &[f64],
        strings: &[&str],
    ) -> DomainResult<ScriptReply> {
        let mut session = self.session.lock().await;

        let mut line = serde_json::to_string(&ScriptCall {
            function,
            ints,
            floats,
            strings,
        })?;
        line.push('\n');
        session
            .writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::Connection(format!("send {}: {}", function, e)))?;

        let mut reply_line = String::new();
        let n = session
            .reader
            .read_line(&mut reply_line)
            .await
            .map_err(|e| DomainError::Connection(format!("receive {}: {}", function, e)))?;
        if n == 0 {
            return Err(DomainError::Connection(format!(
                "session closed during {}",
                function
            )));
        }
        let reply: ScriptReply = serde_json::from_str(reply_line.trim_end())?;
        Ok(reply)
    }

    /// Like [`call`](Self::call), but a non-zero status is an error. Used for
    /// every function except `findPath_goalIsState`, where a non-zero status
    /// is a legitimate planner verdict.
    async fn checked_call(
        &self,
        function: &str,
        ints: &[i64],
        floats: &[f64],
        strings: &[&str],
    ) -> DomainResult<ScriptReply> {
        let reply = self.call(function, ints, floats, strings).await?;
        if reply.status != 0 {
            return Err(DomainError::RemoteCall {
                call: function.to_string(),
                status: reply.status,
            });
        }
        Ok(reply)
    }

    async fn object_handle(&self, name: &str) -> DomainResult<i64> {
        let reply = self.checked_call("getObjectHandle", &[], &[], &[name]).await?;
        reply.ints.first().copied().ok_or_else(|| {
            DomainError::Connection("malformed reply to getObjectHandle".to_string())
        })
    }
}

#[async_trait]
impl PlanningSimulator for RemoteApiClient {
    async fn start_simulation(&self) -> DomainResult<()> {
        self.checked_call("startSimulation", &[], &[], &[]).await?;
        Ok(())
    }

    async fn stop_simulation(&self) -> DomainResult<()> {
        self.checked_call("stopSimulation", &[], &[], &[]).await?;
        Ok(())
    }

    async fn update_map(&self, map_path: &Path) -> DomainResult<()> {
        let path = map_path.to_string_lossy();
        self.checked_call("UpdateMap", &[path.len() as i64], &[], &[path.as_ref()])
            .await?;
        Ok(())
    }

    async fn robot_state(&self) -> DomainResult<Vec<f64>> {
        let reply = self
            .checked_call("getRobotState", &[self.robot_handle], &[], &[])
            .await?;
        Ok(reply.floats)
    }

    async fn object_pose(&self, name: &str) -> DomainResult<Vec<f64>> {
        let handle = self.object_handle(name).await?;
        let reply = self.checked_call("getObjectPose", &[handle], &[], &[]).await?;
        Ok(reply.floats)
    }

    async fn find_path(&self, request: &PlanningRequest) -> DomainResult<PlannerResponse> {
        let ints = [
            self.robot_handle,
            request.collision_checking as i64,
            request.interpolation_density,
            request.search_count,
            request.algorithm.wire_id(),
        ];
        let reply = self
            .call("findPath_goalIsState", &ints, &request.combined_config, &[])
            .await?;
        Ok(PlannerResponse {
            status_code: reply.status,
            path: reply.floats,
        })
    }

    async fn visualize_path(&self, path: &[f64]) -> DomainResult<i64> {
        // 255,0,255: magenta path line, as drawn by the scene script.
        let reply = self
            .checked_call("visualizePath", &[self.robot_handle, 255, 0, 255], path, &[])
            .await?;
        reply.ints.first().copied().ok_or_else(|| {
            DomainError::Connection("malformed reply to visualizePath".to_string())
        })
    }

    async fn run_through_path(&self, path: &[f64]) -> DomainResult<()> {
        self.checked_call("runThroughPath", &[self.robot_handle], path, &[])
            .await?;
        Ok(())
    }

    async fn is_running_through_path(&self) -> DomainResult<bool> {
        let reply = self
            .checked_call("isRunningThroughPath", &[self.robot_handle], &[], &[])
            .await?;
        Ok(reply.ints.first().copied() == Some(1))
    }

    async fn remove_line(&self, line_handle: i64) -> DomainResult<()> {
        self.checked_call("removeLine", &[line_handle], &[], &[])
            .await?;
        Ok(())
    }
}

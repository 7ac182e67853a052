use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::common::{DomainError, DomainResult};
use crate::domains::planning::{
    format_path_file, PlanningAlgorithm, PlanningResult, ResultRecord, ScenarioStore,
};

/// Persists one planning attempt: a path file on disk and a row in the
/// results table, both keyed by the same freshly generated uuid.
pub struct ResultWriter {
    store: Arc<dyn ScenarioStore>,
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(store: Arc<dyn ScenarioStore>, output_dir: PathBuf) -> Self {
        Self { store, output_dir }
    }

    /// Write `<output_dir>/<uuid>.txt` and insert the matching row. The file
    /// is created with `create_new`, so an existing file is never clobbered.
    /// An empty path still produces both artifacts (empty file, zero-length
    /// path row) so failed attempts stay accounted for.
    pub async fn persist(
        &self,
        result: &PlanningResult,
        algorithm: PlanningAlgorithm,
    ) -> DomainResult<ResultRecord> {
        let record = ResultRecord::new(Uuid::new_v4(), result.elapsed.as_secs_f64(), algorithm);
        let target = self.output_dir.join(&record.file_name);

        let contents = format_path_file(&result.path);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| {
                DomainError::Persistence(format!("create {}: {}", target.display(), e))
            })?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| DomainError::Persistence(format!("write {}: {}", target.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| DomainError::Persistence(format!("flush {}: {}", target.display(), e)))?;

        self.store.insert_result(&record).await?;
        Ok(record)
    }
}

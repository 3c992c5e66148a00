use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::snapshot;

#[derive(Serialize, utoipa::ToSchema)]
pub struct SnapshotResponse {
    pub id: i32,
    pub uploaded_at: DateTime<Utc>,
    pub source_filename: Option<String>,
    /// Number of observation rows this snapshot carries.
    pub observation_count: u64,
}

impl SnapshotResponse {
    pub fn from_model(model: snapshot::Model, observation_count: u64) -> Self {
        Self {
            id: model.id,
            uploaded_at: model.uploaded_at,
            source_filename: model.source_filename,
            observation_count,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadSnapshotResponse {
    pub snapshot: SnapshotResponse,
    /// Rows written as observations.
    pub rows_written: u64,
    /// Rows skipped for lacking an external id.
    pub rows_skipped: u64,
}

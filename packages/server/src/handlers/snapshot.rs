use std::collections::HashMap;

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{listing_observation, snapshot};
use crate::error::{AppError, ErrorBody};
use crate::ingest;
use crate::ingest::tabular::{self, UploadFormat};
use crate::models::snapshot::{SnapshotResponse, UploadSnapshotResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Snapshots",
    operation_id = "listSnapshots",
    summary = "List all snapshots, newest first",
    responses(
        (status = 200, description = "Snapshots", body = Vec<SnapshotResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_snapshots(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let snapshots = snapshot::Entity::find()
        .order_by_desc(snapshot::Column::UploadedAt)
        .order_by_desc(snapshot::Column::Id)
        .all(&state.db)
        .await?;

    let counts: HashMap<i32, i64> = listing_observation::Entity::find()
        .select_only()
        .column(listing_observation::Column::SnapshotId)
        .column_as(listing_observation::Column::Id.count(), "count")
        .group_by(listing_observation::Column::SnapshotId)
        .into_tuple::<(i32, i64)>()
        .all(&state.db)
        .await?
        .into_iter()
        .collect();

    let data: Vec<SnapshotResponse> = snapshots
        .into_iter()
        .map(|s| {
            let count = counts.get(&s.id).copied().unwrap_or(0) as u64;
            SnapshotResponse::from_model(s, count)
        })
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Snapshots",
    operation_id = "uploadSnapshot",
    summary = "Upload a scrape export as a new snapshot",
    description = "Ingests an `.xlsx`, `.xls` or `.csv` export. Every data row with an `id` column becomes one observation; rows without one are skipped. The whole file lands as a single snapshot or not at all. Body limit: 32 MB.",
    request_body(content_type = "multipart/form-data", description = "Spreadsheet file in a `file` field"),
    responses(
        (status = 201, description = "Snapshot created", body = UploadSnapshotResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_snapshot(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string).unwrap_or_default();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
            file = Some((filename, data.to_vec()));
            break;
        }
    }
    let (filename, bytes) = file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let format = UploadFormat::from_filename(&filename).ok_or_else(|| {
        AppError::Validation("Unsupported file type; expected .xlsx, .xls or .csv".into())
    })?;
    let rows = tabular::parse_upload(format, &bytes)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if rows.is_empty() {
        return Err(AppError::Validation("File contains no data rows".into()));
    }

    let outcome = ingest::ingest_rows(&state.db, Some(filename), &rows).await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadSnapshotResponse {
            snapshot: SnapshotResponse::from_model(outcome.snapshot, outcome.rows_written),
            rows_written: outcome.rows_written,
            rows_skipped: outcome.rows_skipped,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Snapshots",
    operation_id = "deleteSnapshot",
    summary = "Delete a snapshot and its observations",
    params(("id" = i32, Path, description = "Snapshot ID")),
    responses(
        (status = 204, description = "Snapshot deleted"),
        (status = 404, description = "Snapshot not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(snapshot_id = id))]
pub async fn delete_snapshot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let snap = snapshot::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Snapshot not found".into()))?;

    listing_observation::Entity::delete_many()
        .filter(listing_observation::Column::SnapshotId.eq(snap.id))
        .exec(&txn)
        .await?;
    snapshot::Entity::delete_by_id(snap.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Body limit layer for the upload route (32MB).
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(32 * 1024 * 1024)
}

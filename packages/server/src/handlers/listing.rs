use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use sea_orm::*;
use tracing::{debug, instrument};

use crate::entity::{annotation, listing, listing_observation, snapshot};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::filters::ListingFilter;
use crate::models::annotation::{AnnotationResponse, INTERESTING_VALUES, UpsertAnnotationRequest};
use crate::models::listing::{ListingResponse, ObservationResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Listings",
    operation_id = "listListings",
    summary = "List tracked listings with their observation history",
    description = "Returns every listing matching the filter set, joined with its full observation history and analyst annotation. With observation-level filters, only listings with at least one matching observation are returned.",
    params(ListingFilter),
    responses(
        (status = 200, description = "Matching listings", body = Vec<ListingResponse>),
    ),
)]
#[instrument(skip(state, filter))]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut select = listing::Entity::find();
    let listing_cond = filter.listing_condition();
    if !listing_cond.is_empty() {
        select = select.filter(listing_cond);
    }
    if filter.has_observation_constraints() {
        select = select.filter(
            listing::Column::Id.in_subquery(filter.observed_listing_id_subquery()),
        );
    }
    let listings = select.order_by_asc(listing::Column::Id).all(&state.db).await?;
    debug!(count = listings.len(), "listings matched");

    let ids: Vec<i32> = listings.iter().map(|l| l.id).collect();

    let observations = listing_observation::Entity::find()
        .filter(listing_observation::Column::ListingId.is_in(ids.clone()))
        .order_by_asc(listing_observation::Column::Id)
        .all(&state.db)
        .await?;

    let uploaded_at: HashMap<i32, DateTime<Utc>> = snapshot::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.uploaded_at))
        .collect();

    let mut annotations: HashMap<i32, annotation::Model> = annotation::Entity::find()
        .filter(annotation::Column::ListingId.is_in(ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| (a.listing_id, a))
        .collect();

    let mut by_listing: HashMap<i32, Vec<ObservationResponse>> = HashMap::new();
    for obs in observations {
        let observed_at = uploaded_at
            .get(&obs.snapshot_id)
            .copied()
            .unwrap_or(DateTime::UNIX_EPOCH);
        by_listing
            .entry(obs.listing_id)
            .or_default()
            .push(ObservationResponse::from_model(obs, observed_at));
    }

    let data: Vec<ListingResponse> = listings
        .into_iter()
        .map(|l| {
            let obs = by_listing.remove(&l.id).unwrap_or_default();
            let ann = annotations.remove(&l.id).map(AnnotationResponse::from);
            ListingResponse::from_parts(l, obs, ann)
        })
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/{id}/annotation",
    tag = "Listings",
    operation_id = "getAnnotation",
    summary = "Get the annotation for a listing",
    params(("id" = i32, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Annotation, or null when none exists", body = Option<AnnotationResponse>),
        (status = 404, description = "Listing not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(listing_id = id))]
pub async fn get_annotation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    find_listing(&state.db, id).await?;
    let ann = annotation::Entity::find()
        .filter(annotation::Column::ListingId.eq(id))
        .one(&state.db)
        .await?;
    Ok(Json(ann.map(AnnotationResponse::from)))
}

#[utoipa::path(
    put,
    path = "/{id}/annotation",
    tag = "Listings",
    operation_id = "upsertAnnotation",
    summary = "Create or update the annotation for a listing",
    description = "Each listing has at most one annotation. Absent fields are left untouched; explicit `null` clears `notes` or resets `interesting` to undecided.",
    params(("id" = i32, Path, description = "Listing ID")),
    request_body = UpsertAnnotationRequest,
    responses(
        (status = 200, description = "Annotation after the update", body = AnnotationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Listing not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(listing_id = id))]
pub async fn upsert_annotation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpsertAnnotationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(Some(value)) = &payload.interesting
        && !INTERESTING_VALUES.contains(&value.as_str())
    {
        return Err(AppError::Validation(
            "interesting must be \"Yes\" or \"No\"".into(),
        ));
    }

    find_listing(&state.db, id).await?;

    let existing = annotation::Entity::find()
        .filter(annotation::Column::ListingId.eq(id))
        .one(&state.db)
        .await?;

    let model = match existing {
        Some(model) => {
            if payload == UpsertAnnotationRequest::default() {
                model
            } else {
                let mut active = model.into_active_model();
                apply_annotation_fields(&mut active, &payload);
                active.update(&state.db).await?
            }
        }
        None => {
            let mut active = annotation::ActiveModel {
                listing_id: Set(id),
                reviewed: Set(false),
                contacted: Set(false),
                ..Default::default()
            };
            apply_annotation_fields(&mut active, &payload);
            match active.insert(&state.db).await {
                Ok(model) => model,
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    // Concurrent upsert won; apply our fields to its row.
                    let model = annotation::Entity::find()
                        .filter(annotation::Column::ListingId.eq(id))
                        .one(&state.db)
                        .await?
                        .ok_or_else(|| {
                            DbErr::Custom("annotation vanished after unique violation".into())
                        })?;
                    let mut active = model.into_active_model();
                    apply_annotation_fields(&mut active, &payload);
                    active.update(&state.db).await?
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    Ok(Json(AnnotationResponse::from(model)))
}

fn apply_annotation_fields(active: &mut annotation::ActiveModel, payload: &UpsertAnnotationRequest) {
    if let Some(reviewed) = payload.reviewed {
        active.reviewed = Set(reviewed);
    }
    if let Some(contacted) = payload.contacted {
        active.contacted = Set(contacted);
    }
    if let Some(notes) = &payload.notes {
        active.notes = Set(notes.clone());
    }
    if let Some(interesting) = &payload.interesting {
        active.interesting = Set(interesting.clone());
    }
}

async fn find_listing(db: &DatabaseConnection, id: i32) -> Result<listing::Model, AppError> {
    listing::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))
}

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use sea_orm::*;
use tracing::instrument;

use crate::analytics::{self, MonthSample};
use crate::entity::{listing_observation, snapshot};
use crate::error::AppError;
use crate::filters::ListingFilter;
use crate::models::analytics::{MonthlyCount, MonthlyDistribution, MonthlyValue};
use crate::state::AppState;

/// Fetch the filtered observations as (snapshot upload time, price-per-m2)
/// samples. The snapshot timestamp is the time axis.
async fn month_samples(
    db: &DatabaseConnection,
    filter: &ListingFilter,
) -> Result<Vec<MonthSample>, AppError> {
    let rows: Vec<(i32, Option<f64>)> = listing_observation::Entity::find()
        .select_only()
        .column(listing_observation::Column::SnapshotId)
        .column(listing_observation::Column::PricePerM2)
        .filter(filter.observation_scope())
        .into_tuple()
        .all(db)
        .await?;

    let uploaded_at: HashMap<i32, DateTime<Utc>> = snapshot::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.uploaded_at))
        .collect();

    Ok(rows
        .into_iter()
        .filter_map(|(snapshot_id, price_per_m2)| {
            let observed_at = *uploaded_at.get(&snapshot_id)?;
            Some(MonthSample {
                observed_at,
                price_per_m2,
            })
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/avg-price-per-m2",
    tag = "Analytics",
    operation_id = "avgPricePerM2",
    summary = "Monthly average price per m2",
    description = "Mean price-per-m2 of matching observations, bucketed by the month their snapshot was uploaded. Months with no present value are omitted.",
    params(ListingFilter),
    responses(
        (status = 200, description = "Ascending (month, value) pairs", body = Vec<MonthlyValue>),
    ),
)]
#[instrument(skip(state, filter))]
pub async fn avg_price_per_m2(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let samples = month_samples(&state.db, &filter).await?;
    let data: Vec<MonthlyValue> = analytics::monthly_average(&samples)
        .into_iter()
        .map(|(month, value)| MonthlyValue { month, value })
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/price-distribution",
    tag = "Analytics",
    operation_id = "priceDistribution",
    summary = "Monthly min/max/median price per m2",
    description = "Median uses linear interpolation at the 50th percentile. Months whose observations all lack a price-per-m2 still appear, with all three values null.",
    params(ListingFilter),
    responses(
        (status = 200, description = "Ascending monthly spreads", body = Vec<MonthlyDistribution>),
    ),
)]
#[instrument(skip(state, filter))]
pub async fn price_distribution(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let samples = month_samples(&state.db, &filter).await?;
    let data: Vec<MonthlyDistribution> = analytics::monthly_distribution(&samples)
        .into_iter()
        .map(|(month, spread)| MonthlyDistribution::from_spread(month, spread))
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/listings-per-month",
    tag = "Analytics",
    operation_id = "listingsPerMonth",
    summary = "Monthly observation counts",
    description = "Number of matching observations per month, including ones with no price-per-m2.",
    params(ListingFilter),
    responses(
        (status = 200, description = "Ascending monthly counts", body = Vec<MonthlyCount>),
    ),
)]
#[instrument(skip(state, filter))]
pub async fn listings_per_month(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let samples = month_samples(&state.db, &filter).await?;
    let data: Vec<MonthlyCount> = analytics::monthly_count(&samples)
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect();
    Ok(Json(data))
}

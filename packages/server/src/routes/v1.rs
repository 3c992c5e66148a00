use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/listings", listing_routes())
        .nest("/snapshots", snapshot_routes())
        .nest("/analytics", analytics_routes())
}

fn listing_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::listing::list_listings))
        .routes(routes!(
            handlers::listing::get_annotation,
            handlers::listing::upsert_annotation
        ))
}

fn snapshot_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::snapshot::list_snapshots))
        .routes(routes!(handlers::snapshot::delete_snapshot))
        .routes(routes!(handlers::snapshot::upload_snapshot))
        .layer(handlers::snapshot::upload_body_limit())
}

fn analytics_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::analytics::avg_price_per_m2))
        .routes(routes!(handlers::analytics::price_distribution))
        .routes(routes!(handlers::analytics::listings_per_month))
}

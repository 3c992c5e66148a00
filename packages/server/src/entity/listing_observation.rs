use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One historical fact row: the state of a listing as observed in one
/// snapshot. Append-only; rows are never updated, only cascade-deleted with
/// their snapshot or listing.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing_observation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub listing_id: i32,
    #[sea_orm(belongs_to, from = "listing_id", to = "id")]
    pub listing: HasOne<super::listing::Entity>,

    #[sea_orm(indexed)]
    pub snapshot_id: i32,
    #[sea_orm(belongs_to, from = "snapshot_id", to = "id")]
    pub snapshot: HasOne<super::snapshot::Entity>,

    pub price: Option<f64>,
    pub price_per_m2: Option<f64>,

    #[sea_orm(indexed)]
    pub district: Option<String>,
    #[sea_orm(indexed)]
    pub city: Option<String>,
    #[sea_orm(indexed)]
    pub zone: Option<String>,
    #[sea_orm(indexed)]
    pub typology: Option<String>,
    #[sea_orm(indexed)]
    pub agency: Option<String>,
    pub address: Option<String>,
    pub tags: Option<String>,
    pub floor_info: Option<String>,
    pub land_status: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,

    /// Amenity flags are tri-state: NULL means the source did not say,
    /// which is distinct from `false`.
    pub parking: Option<bool>,
    pub elevator: Option<bool>,
    pub new_construction: Option<bool>,
    pub rented: Option<bool>,
    pub trespasse: Option<bool>,

    pub image_url: Option<String>,
    pub video_url: Option<String>,

    /// Verbatim source row as JSON, kept for audit.
    #[sea_orm(column_type = "Text")]
    pub raw_json: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}

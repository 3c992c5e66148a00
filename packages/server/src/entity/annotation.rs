use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Analyst review state for a listing. At most one row per listing; the
/// write path upserts rather than appends.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "annotation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub listing_id: i32,
    #[sea_orm(belongs_to, from = "listing_id", to = "id")]
    pub listing: HasOne<super::listing::Entity>,

    #[sea_orm(default_value = false)]
    pub reviewed: bool,
    #[sea_orm(default_value = false)]
    pub contacted: bool,

    #[sea_orm(column_type = "Text")]
    pub notes: Option<String>,

    /// Restricted to the literal values `Yes` and `No`; NULL means unset.
    pub interesting: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}

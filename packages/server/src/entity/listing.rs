use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A tracked real-world property. Descriptive fields hold the latest known
/// values and are refreshed on every sighting; history lives in
/// `listing_observation`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Identifier assigned by the scraped source, stable across scrapes.
    #[sea_orm(unique)]
    pub external_id: String,

    pub title: String,
    pub url: Option<String>,
    pub area: Option<f64>,
    /// Free-form typology code, conventionally "T<n>" bedroom counts.
    pub typology: Option<String>,

    #[sea_orm(has_many)]
    pub observations: HasMany<super::listing_observation::Entity>,

    #[sea_orm(has_one)]
    pub annotation: HasOne<super::annotation::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

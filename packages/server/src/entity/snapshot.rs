use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ingestion batch. Immutable once its rows are committed; deleting a
/// snapshot removes all of its observations.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "snapshot")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub uploaded_at: DateTimeUtc,

    /// Name of the uploaded file, kept for audit.
    pub source_filename: Option<String>,

    #[sea_orm(has_many)]
    pub observations: HasMany<super::listing_observation::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

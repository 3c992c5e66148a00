use serde::{Deserialize, Serialize};

use crate::entity::annotation;
use crate::models::shared::double_option;

pub const INTERESTING_VALUES: &[&str] = &["Yes", "No"];

#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct AnnotationResponse {
    pub id: i32,
    pub listing_id: i32,
    pub reviewed: bool,
    pub contacted: bool,
    pub notes: Option<String>,
    /// `"Yes"`, `"No"`, or `null` for undecided.
    pub interesting: Option<String>,
}

impl From<annotation::Model> for AnnotationResponse {
    fn from(model: annotation::Model) -> Self {
        Self {
            id: model.id,
            listing_id: model.listing_id,
            reviewed: model.reviewed,
            contacted: model.contacted,
            notes: model.notes,
            interesting: model.interesting,
        }
    }
}

/// Partial update; absent fields are left untouched, explicit `null` clears
/// the nullable ones.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpsertAnnotationRequest {
    pub reviewed: Option<bool>,
    pub contacted: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    /// `"Yes"`, `"No"`, or `null` to reset to undecided.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub interesting: Option<Option<String>>,
}

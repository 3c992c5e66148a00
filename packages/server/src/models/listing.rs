use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::{listing, listing_observation};
use crate::models::annotation::AnnotationResponse;

/// One observed state of a listing, stamped with its snapshot's upload time.
#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct ObservationResponse {
    pub id: i32,
    pub snapshot_id: i32,
    /// Upload time of the snapshot this observation belongs to.
    pub observed_at: DateTime<Utc>,
    pub price: Option<f64>,
    pub price_per_m2: Option<f64>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub zone: Option<String>,
    pub typology: Option<String>,
    pub agency: Option<String>,
    pub address: Option<String>,
    pub tags: Option<String>,
    pub floor_info: Option<String>,
    pub land_status: Option<String>,
    pub description: Option<String>,
    /// Tri-state flags: `null` means the source sheet left the cell blank.
    pub parking: Option<bool>,
    pub elevator: Option<bool>,
    pub new_construction: Option<bool>,
    pub rented: Option<bool>,
    pub trespasse: Option<bool>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl ObservationResponse {
    pub fn from_model(model: listing_observation::Model, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: model.id,
            snapshot_id: model.snapshot_id,
            observed_at,
            price: model.price,
            price_per_m2: model.price_per_m2,
            district: model.district,
            city: model.city,
            zone: model.zone,
            typology: model.typology,
            agency: model.agency,
            address: model.address,
            tags: model.tags,
            floor_info: model.floor_info,
            land_status: model.land_status,
            description: model.description,
            parking: model.parking,
            elevator: model.elevator,
            new_construction: model.new_construction,
            rented: model.rented,
            trespasse: model.trespasse,
            image_url: model.image_url,
            video_url: model.video_url,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ListingResponse {
    pub id: i32,
    pub external_id: String,
    pub title: String,
    pub url: Option<String>,
    pub area: Option<f64>,
    pub typology: Option<String>,
    pub created_at: DateTime<Utc>,
    /// The observation from the most recent snapshot, when any exist.
    pub latest_observation: Option<ObservationResponse>,
    /// Full observation history, oldest first.
    pub observations: Vec<ObservationResponse>,
    pub annotation: Option<AnnotationResponse>,
}

impl ListingResponse {
    pub fn from_parts(
        model: listing::Model,
        observations: Vec<ObservationResponse>,
        annotation: Option<AnnotationResponse>,
    ) -> Self {
        let latest_observation = observations
            .iter()
            .max_by_key(|o| (o.observed_at, o.id))
            .cloned();
        Self {
            id: model.id,
            external_id: model.external_id,
            title: model.title,
            url: model.url,
            area: model.area,
            typology: model.typology,
            created_at: model.created_at,
            latest_observation,
            observations,
            annotation,
        }
    }
}

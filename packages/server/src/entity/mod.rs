pub mod annotation;
pub mod listing;
pub mod listing_observation;
pub mod snapshot;

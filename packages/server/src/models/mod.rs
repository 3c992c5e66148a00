pub mod analytics;
pub mod annotation;
pub mod listing;
pub mod shared;
pub mod snapshot;

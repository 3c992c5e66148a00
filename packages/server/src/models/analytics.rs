use serde::Serialize;

use crate::analytics::MonthSpread;

/// `(month, value)` pair for the average aggregation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MonthlyValue {
    /// `YYYY-MM`.
    #[schema(example = "2024-03")]
    pub month: String,
    pub value: f64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MonthlyDistribution {
    /// `YYYY-MM`.
    #[schema(example = "2024-03")]
    pub month: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

impl MonthlyDistribution {
    pub fn from_spread(month: String, spread: MonthSpread) -> Self {
        Self {
            month,
            min: spread.min,
            max: spread.max,
            median: spread.median,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MonthlyCount {
    /// `YYYY-MM`.
    #[schema(example = "2024-03")]
    pub month: String,
    pub count: u64,
}

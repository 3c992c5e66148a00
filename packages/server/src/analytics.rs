//! Monthly aggregation over observation samples. The time axis is the
//! parent snapshot's upload timestamp; observations carry no timestamp of
//! their own.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

/// One observation paired with its snapshot's upload time.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSample {
    pub observed_at: DateTime<Utc>,
    pub price_per_m2: Option<f64>,
}

/// `YYYY-MM` bucket key.
fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// BTreeMap keeps months sorted ascending, which is the output order.
fn bucket(samples: &[MonthSample]) -> BTreeMap<String, Vec<Option<f64>>> {
    let mut buckets: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for sample in samples {
        buckets
            .entry(month_key(sample.observed_at))
            .or_default()
            .push(sample.price_per_m2);
    }
    buckets
}

/// Mean price-per-m2 per month. Months where every sample is missing the
/// value are omitted entirely.
pub fn monthly_average(samples: &[MonthSample]) -> Vec<(String, f64)> {
    bucket(samples)
        .into_iter()
        .filter_map(|(month, values)| {
            let present: Vec<f64> = values.into_iter().flatten().collect();
            if present.is_empty() {
                return None;
            }
            let mean = present.iter().sum::<f64>() / present.len() as f64;
            Some((month, mean))
        })
        .collect()
}

/// Min, max and interpolated median per month. A month whose samples all
/// lack the value is still reported, with all three absent.
pub fn monthly_distribution(samples: &[MonthSample]) -> Vec<(String, MonthSpread)> {
    bucket(samples)
        .into_iter()
        .map(|(month, values)| {
            let mut present: Vec<f64> = values.into_iter().flatten().collect();
            present.sort_by(|a, b| a.total_cmp(b));
            let spread = if present.is_empty() {
                MonthSpread::default()
            } else {
                MonthSpread {
                    min: present.first().copied(),
                    max: present.last().copied(),
                    median: Some(interpolated_median(&present)),
                }
            };
            (month, spread)
        })
        .collect()
}

/// Observation count per month, missing values included.
pub fn monthly_count(samples: &[MonthSample]) -> Vec<(String, u64)> {
    bucket(samples)
        .into_iter()
        .map(|(month, values)| (month, values.len() as u64))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthSpread {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

/// 50th percentile with linear interpolation between the two straddling
/// ranks. `sorted` must be non-empty and ascending.
fn interpolated_median(sorted: &[f64]) -> f64 {
    let pos = 0.5 * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

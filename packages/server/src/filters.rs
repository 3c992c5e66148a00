//! Shared filter composition for listing search and analytics. Both call
//! sites narrow their scope through the same `ListingFilter`, so filter
//! semantics cannot drift between them.

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery, SelectStatement, SimpleExpr};
use sea_orm::sea_query::ExprTrait;
use sea_orm::{ColumnTrait, Condition};
use serde::Deserialize;

use crate::entity::{listing, listing_observation};
use crate::models::shared::escape_like;

/// Sparse filter set. Every supplied key ANDs with the rest; omitted keys
/// impose nothing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingFilter {
    /// Exact district match.
    pub district: Option<String>,
    /// Exact city (concelho) match.
    pub city: Option<String>,
    /// Exact zone match.
    pub zone: Option<String>,
    /// Exact agency match.
    pub agency: Option<String>,
    /// Typology, single value or comma-separated set (e.g. `T1,T2`).
    pub typology: Option<String>,
    /// Case-insensitive substring of the address.
    pub address: Option<String>,
    /// Case-insensitive substring of the tags field.
    pub tags: Option<String>,
    /// Tri-state flags: `true`/`false` match only observations where the
    /// flag is known; unknown never matches.
    pub parking: Option<bool>,
    pub elevator: Option<bool>,
    pub new_construction: Option<bool>,
    pub rented: Option<bool>,
    pub trespasse: Option<bool>,
    /// Inclusive price bounds.
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Inclusive price-per-m2 bounds.
    pub min_price_per_m2: Option<f64>,
    pub max_price_per_m2: Option<f64>,
    /// Inclusive area bounds, applied to the listing itself.
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
}

impl ListingFilter {
    /// Constraints that apply to observation rows.
    pub fn observation_condition(&self) -> Condition {
        let mut cond = Condition::all();

        if let Some(v) = trimmed(&self.district) {
            cond = cond.add(listing_observation::Column::District.eq(v));
        }
        if let Some(v) = trimmed(&self.city) {
            cond = cond.add(listing_observation::Column::City.eq(v));
        }
        if let Some(v) = trimmed(&self.zone) {
            cond = cond.add(listing_observation::Column::Zone.eq(v));
        }
        if let Some(v) = trimmed(&self.agency) {
            cond = cond.add(listing_observation::Column::Agency.eq(v));
        }
        if let Some(raw) = trimmed(&self.typology) {
            let set = split_set(raw);
            if !set.is_empty() {
                cond = cond.add(listing_observation::Column::Typology.is_in(set));
            }
        }
        if let Some(v) = trimmed(&self.address) {
            cond = cond.add(contains_ci(listing_observation::Column::Address, v));
        }
        if let Some(v) = trimmed(&self.tags) {
            cond = cond.add(contains_ci(listing_observation::Column::Tags, v));
        }

        if let Some(b) = self.parking {
            cond = cond.add(listing_observation::Column::Parking.eq(b));
        }
        if let Some(b) = self.elevator {
            cond = cond.add(listing_observation::Column::Elevator.eq(b));
        }
        if let Some(b) = self.new_construction {
            cond = cond.add(listing_observation::Column::NewConstruction.eq(b));
        }
        if let Some(b) = self.rented {
            cond = cond.add(listing_observation::Column::Rented.eq(b));
        }
        if let Some(b) = self.trespasse {
            cond = cond.add(listing_observation::Column::Trespasse.eq(b));
        }

        if let Some(v) = self.min_price {
            cond = cond.add(listing_observation::Column::Price.gte(v));
        }
        if let Some(v) = self.max_price {
            cond = cond.add(listing_observation::Column::Price.lte(v));
        }
        if let Some(v) = self.min_price_per_m2 {
            cond = cond.add(listing_observation::Column::PricePerM2.gte(v));
        }
        if let Some(v) = self.max_price_per_m2 {
            cond = cond.add(listing_observation::Column::PricePerM2.lte(v));
        }

        cond
    }

    /// Constraints that apply to listing rows (area bounds).
    pub fn listing_condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(v) = self.min_area {
            cond = cond.add(listing::Column::Area.gte(v));
        }
        if let Some(v) = self.max_area {
            cond = cond.add(listing::Column::Area.lte(v));
        }
        cond
    }

    pub fn has_observation_constraints(&self) -> bool {
        !self.observation_condition().is_empty()
    }

    /// `SELECT listing_id FROM listing_observation WHERE <observation filters>`,
    /// for narrowing a listing query to listings with at least one match.
    pub fn observed_listing_id_subquery(&self) -> SelectStatement {
        SeaQuery::select()
            .column(listing_observation::Column::ListingId)
            .from(listing_observation::Entity)
            .cond_where(self.observation_condition())
            .to_owned()
    }

    /// Full condition on observation rows, folding listing-level area bounds
    /// in through a subquery. This is the scope analytics aggregates over.
    pub fn observation_scope(&self) -> Condition {
        let mut cond = self.observation_condition();
        let area = self.listing_condition();
        if !area.is_empty() {
            cond = cond.add(
                listing_observation::Column::ListingId.in_subquery(
                    SeaQuery::select()
                        .column(listing::Column::Id)
                        .from(listing::Entity)
                        .cond_where(area)
                        .to_owned(),
                ),
            );
        }
        cond
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    let v = value.as_deref()?.trim();
    (!v.is_empty()).then_some(v)
}

fn split_set(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_ci<C: ColumnTrait>(col: C, needle: &str) -> SimpleExpr {
    let term = escape_like(needle).to_lowercase();
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(format!("%{term}%")).escape('\\'))
}

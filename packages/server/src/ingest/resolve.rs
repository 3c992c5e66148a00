//! Listing identity resolution: one stable listing row per external id,
//! shared by every snapshot that observes it.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, SqlErr, TransactionSession, TransactionTrait,
};
use tracing::debug;

use crate::entity::listing;
use crate::ingest::normalize::CanonicalRecord;

/// Resolve the listing a record belongs to, creating it on first sight and
/// refreshing its descriptive fields otherwise. Returns the listing id.
pub async fn resolve_listing<C>(conn: &C, record: &CanonicalRecord) -> Result<i32, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let existing = listing::Entity::find()
        .filter(listing::Column::ExternalId.eq(record.external_id.as_str()))
        .one(conn)
        .await?;
    if let Some(model) = existing {
        return refresh_listing(conn, model, record).await;
    }

    match insert_listing(conn, record).await {
        Ok(id) => Ok(id),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            // Another row in the same upload (or a concurrent upload) created
            // the listing between our lookup and insert.
            debug!(external_id = %record.external_id, "listing insert lost race, re-resolving");
            let model = listing::Entity::find()
                .filter(listing::Column::ExternalId.eq(record.external_id.as_str()))
                .one(conn)
                .await?
                .ok_or_else(|| {
                    DbErr::Custom(format!(
                        "listing {} vanished after unique violation",
                        record.external_id
                    ))
                })?;
            refresh_listing(conn, model, record).await
        }
        Err(e) => Err(e),
    }
}

/// Insert inside a nested transaction so a unique violation rolls back to a
/// savepoint instead of poisoning the caller's transaction.
async fn insert_listing<C>(conn: &C, record: &CanonicalRecord) -> Result<i32, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = conn.begin().await?;
    let result = listing::ActiveModel {
        external_id: Set(record.external_id.clone()),
        title: Set(record.title.clone().unwrap_or_else(|| "Untitled".to_string())),
        url: Set(record.url.clone()),
        area: Set(record.area),
        typology: Set(record.typology.clone()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await;
    match result {
        Ok(model) => {
            txn.commit().await?;
            Ok(model.id)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Last non-null value wins for the descriptive fields; blanks in a later
/// upload never erase what an earlier one knew.
async fn refresh_listing<C>(
    conn: &C,
    model: listing::Model,
    record: &CanonicalRecord,
) -> Result<i32, DbErr>
where
    C: ConnectionTrait,
{
    let id = model.id;
    let mut active = model.into_active_model();
    let mut changed = false;

    if let Some(title) = &record.title {
        if active.title.as_ref() != title {
            active.title = Set(title.clone());
            changed = true;
        }
    }
    if record.url.is_some() && active.url.as_ref() != &record.url {
        active.url = Set(record.url.clone());
        changed = true;
    }
    if record.area.is_some() && active.area.as_ref() != &record.area {
        active.area = Set(record.area);
        changed = true;
    }
    if record.typology.is_some() && active.typology.as_ref() != &record.typology {
        active.typology = Set(record.typology.clone());
        changed = true;
    }

    if changed {
        active.update(conn).await?;
    }
    Ok(id)
}

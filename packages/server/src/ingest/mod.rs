//! Snapshot ingestion pipeline: decode, normalize, resolve, write.

pub mod normalize;
pub mod resolve;
pub mod tabular;

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set, TransactionTrait};
use tracing::{info, warn};

use crate::entity::{listing_observation, snapshot};
use crate::ingest::normalize::{CanonicalRecord, normalize_row};
use crate::ingest::resolve::resolve_listing;
use crate::ingest::tabular::RawRow;

/// Result of ingesting one upload.
#[derive(Debug)]
pub struct IngestOutcome {
    pub snapshot: snapshot::Model,
    pub rows_written: u64,
    pub rows_skipped: u64,
}

/// Write one snapshot and its observations in a single transaction. Either
/// everything lands or nothing does.
pub async fn ingest_rows(
    db: &DatabaseConnection,
    source_filename: Option<String>,
    rows: &[RawRow],
) -> Result<IngestOutcome, DbErr> {
    let txn = db.begin().await?;

    let snapshot = snapshot::ActiveModel {
        uploaded_at: Set(chrono::Utc::now()),
        source_filename: Set(source_filename),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut rows_written = 0u64;
    let mut rows_skipped = 0u64;
    for (index, raw) in rows.iter().enumerate() {
        let Some(record) = normalize_row(raw) else {
            warn!(row = index + 1, "skipping row without external id");
            rows_skipped += 1;
            continue;
        };
        let listing_id = resolve_listing(&txn, &record).await?;
        write_observation(&txn, snapshot.id, listing_id, &record, raw).await?;
        rows_written += 1;
    }

    txn.commit().await?;
    info!(
        snapshot_id = snapshot.id,
        rows_written, rows_skipped, "snapshot ingested"
    );
    Ok(IngestOutcome {
        snapshot,
        rows_written,
        rows_skipped,
    })
}

async fn write_observation<C: sea_orm::ConnectionTrait>(
    conn: &C,
    snapshot_id: i32,
    listing_id: i32,
    record: &CanonicalRecord,
    raw: &RawRow,
) -> Result<(), DbErr> {
    listing_observation::ActiveModel {
        listing_id: Set(listing_id),
        snapshot_id: Set(snapshot_id),
        price: Set(record.price),
        price_per_m2: Set(record.price_per_m2),
        district: Set(record.district.clone()),
        city: Set(record.city.clone()),
        zone: Set(record.zone.clone()),
        typology: Set(record.typology.clone()),
        agency: Set(record.agency.clone()),
        address: Set(record.address.clone()),
        tags: Set(record.tags.clone()),
        floor_info: Set(record.floor_info.clone()),
        land_status: Set(record.land_status.clone()),
        description: Set(record.description.clone()),
        parking: Set(record.parking),
        elevator: Set(record.elevator),
        new_construction: Set(record.new_construction),
        rented: Set(record.rented),
        trespasse: Set(record.trespasse),
        image_url: Set(record.image_url.clone()),
        video_url: Set(record.video_url.clone()),
        raw_json: Set(serde_json::to_string(raw).ok()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

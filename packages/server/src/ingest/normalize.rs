//! Row normalization: source column headers to canonical fields, with
//! per-type coercion. Blank cells always mean "unknown", never false or zero.

use crate::ingest::tabular::{Cell, RawRow};

/// Source header -> canonical field. Headers not listed here are ignored
/// (they still survive verbatim in the stored raw row).
const COLUMN_DICTIONARY: &[(&str, &str)] = &[
    ("Distrito", "district"),
    ("Concelho", "city"),
    ("Zone", "zone"),
    ("id", "external_id"),
    ("href", "url"),
    ("title", "title"),
    ("price", "price"),
    ("price_per_m2", "price_per_m2"),
    ("area", "area"),
    ("typology", "typology"),
    ("piso", "floor_info"),
    ("estado", "land_status"),
    ("agency", "agency"),
    ("parking", "parking"),
    ("address", "address"),
    ("description", "description"),
    ("trespasse", "trespasse"),
    ("tag", "tags"),
    ("arrendada", "rented"),
    ("elevador", "elevator"),
    ("nova_construcao", "new_construction"),
    ("image_url", "image_url"),
    ("video_url", "video_url"),
];

const TRUTHY: &[&str] = &["1", "true", "yes", "y", "sim"];

/// A row after header mapping and coercion. `external_id` is the only
/// mandatory field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRecord {
    pub external_id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub price: Option<f64>,
    pub price_per_m2: Option<f64>,
    pub area: Option<f64>,
    pub typology: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub zone: Option<String>,
    pub agency: Option<String>,
    pub address: Option<String>,
    pub tags: Option<String>,
    pub floor_info: Option<String>,
    pub land_status: Option<String>,
    pub description: Option<String>,
    pub parking: Option<bool>,
    pub elevator: Option<bool>,
    pub new_construction: Option<bool>,
    pub rented: Option<bool>,
    pub trespasse: Option<bool>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

/// Normalize one raw row. Returns `None` when the row carries no usable
/// external id, in which case the caller must skip (and count) it.
pub fn normalize_row(raw: &RawRow) -> Option<CanonicalRecord> {
    let field = |name: &str| -> Option<&Cell> {
        COLUMN_DICTIONARY
            .iter()
            .find(|(_, canonical)| *canonical == name)
            .and_then(|(header, _)| raw.get(*header))
    };

    let external_id = coerce_string(field("external_id")?)?;

    Some(CanonicalRecord {
        external_id,
        title: field("title").and_then(coerce_string),
        url: field("url").and_then(coerce_string),
        price: field("price").and_then(coerce_number),
        price_per_m2: field("price_per_m2").and_then(coerce_number),
        area: field("area").and_then(coerce_number),
        typology: field("typology").and_then(coerce_string),
        district: field("district").and_then(coerce_string),
        city: field("city").and_then(coerce_string),
        zone: field("zone").and_then(coerce_string),
        agency: field("agency").and_then(coerce_string),
        address: field("address").and_then(coerce_string),
        tags: field("tags").and_then(coerce_string),
        floor_info: field("floor_info").and_then(coerce_string),
        land_status: field("land_status").and_then(coerce_string),
        description: field("description").and_then(coerce_string),
        parking: field("parking").and_then(coerce_flag),
        elevator: field("elevator").and_then(coerce_flag),
        new_construction: field("new_construction").and_then(coerce_flag),
        rented: field("rented").and_then(coerce_flag),
        trespasse: field("trespasse").and_then(coerce_flag),
        image_url: field("image_url").and_then(coerce_string),
        video_url: field("video_url").and_then(coerce_string),
    })
}

fn coerce_string(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Cell::Number(n) => Some(format_number(*n)),
        Cell::Bool(b) => Some(b.to_string()),
    }
}

/// Spreadsheet ids often arrive as floats; keep integral values free of a
/// trailing `.0`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn coerce_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

fn coerce_flag(cell: &Cell) -> Option<bool> {
    match cell {
        Cell::Empty => None,
        Cell::Bool(b) => Some(*b),
        Cell::Number(n) => Some(*n != 0.0),
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(TRUTHY.contains(&trimmed.to_ascii_lowercase().as_str()))
        }
    }
}

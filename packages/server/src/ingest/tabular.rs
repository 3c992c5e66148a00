//! Upload decoding: turns a tabular file buffer into an ordered sequence of
//! raw rows keyed by source header.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{Data, Reader};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Supported upload formats, gated on file extension before any parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Excel workbook (`.xlsx` / `.xls`). Only the first worksheet is read.
    Workbook,
    /// Comma-delimited text (`.csv`).
    Csv,
}

impl UploadFormat {
    /// Detect the format from the uploaded filename, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xls" => Some(Self::Workbook),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// A single cell as read from the source, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// One raw row: source column header -> cell value.
pub type RawRow = BTreeMap<String, Cell>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse an upload into rows. The first row is the header row; rows with no
/// non-empty mapped cell are dropped.
pub fn parse_upload(format: UploadFormat, bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    match format {
        UploadFormat::Workbook => parse_workbook(bytes),
        UploadFormat::Csv => parse_csv(bytes),
    }
}

fn parse_workbook(bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)??;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for row in rows_iter {
        push_row(&mut rows, &headers, row.iter().map(convert_cell));
    }
    Ok(rows)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => text_cell(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => text_cell(s),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        push_row(&mut rows, &headers, record.iter().map(text_cell));
    }
    Ok(rows)
}

fn text_cell(value: &str) -> Cell {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(trimmed.to_string())
    }
}

fn push_row(rows: &mut Vec<RawRow>, headers: &[String], cells: impl Iterator<Item = Cell>) {
    let mut row = RawRow::new();
    let mut non_empty = false;
    for (header, cell) in headers.iter().zip(cells) {
        if header.is_empty() {
            continue;
        }
        if !matches!(cell, Cell::Empty) {
            non_empty = true;
        }
        row.insert(header.clone(), cell);
    }
    if non_empty {
        rows.push(row);
    }
}

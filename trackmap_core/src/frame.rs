//! The Field Decoder - typed row access over a columnar frame.
//!
//! A frame arrives as parallel columns (one `Field` per column) plus a
//! declared row count. The decoder checks the column layout once and then
//! hands out rows as borrowed views. Values are never coerced or cleaned:
//! whatever the feed put in a cell is what the aggregator sees.
//!
//! Column layout (schema v1, positional):
//!
//! | # | column      | meaning                          |
//! |---|-------------|----------------------------------|
//! | 0 | `key`       | entity key the row belongs to    |
//! | 1 | `lat`       | latitude, degrees                |
//! | 2 | `lon`       | longitude, degrees               |
//! | 3 | `weight`    | marker radius, pixels            |
//! | 4 | `label`     | display label for the entity     |
//! | 5 | `timestamp` | observation time, epoch millis   |

use crate::error::{Result, TrackMapError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use trackmap_env::LonLat;

/// Number of columns the decoder requires.
pub const COLUMN_COUNT: usize = 6;

// ============================================================================
// CELL VALUES
// ============================================================================

/// A single cell, kept exactly as the feed delivered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric reading of the cell.
    ///
    /// Anything that is not a number reads as `NaN`; it is carried through
    /// to the geometry untouched rather than replaced by a guess.
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            _ => f64::NAN,
        }
    }

    /// Text reading of the cell, used for entity keys and labels.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Bool(b) => Cow::Owned(b.to_string()),
            FieldValue::Null => Cow::Borrowed("null"),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// The six columns of a position frame, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Key,
    Lat,
    Lon,
    Weight,
    Label,
    Timestamp,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Key,
        Column::Lat,
        Column::Lon,
        Column::Weight,
        Column::Label,
        Column::Timestamp,
    ];

    /// Position of the column in the frame.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Declared field name for schema v1.
    pub fn name(self) -> &'static str {
        match self {
            Column::Key => "key",
            Column::Lat => "lat",
            Column::Lon => "lon",
            Column::Weight => "weight",
            Column::Label => "label",
            Column::Timestamp => "timestamp",
        }
    }
}

/// How strictly the decoder matches fields to columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
    /// Trust field positions only (what dashboards deliver today)
    #[default]
    Positional,

    /// Also require each field's name to match its column (case-insensitive)
    Named,
}

// ============================================================================
// RAW FRAME (Input)
// ============================================================================

/// One column of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(default)]
    pub values: Vec<FieldValue>,
}

impl Field {
    pub fn new(name: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// One observation, used to assemble frames row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub key: String,
    pub lat: f64,
    pub lon: f64,
    pub weight: f64,
    pub label: String,
    pub timestamp: f64,
}

/// A batch of columnar observations as delivered by the data feed.
///
/// `length` is the declared row count `N`. `N == 0` means "no data yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    pub fields: Vec<Field>,
    pub length: usize,
}

impl RawFrame {
    /// A frame with all six columns and no rows.
    pub fn empty() -> Self {
        Self::from_observations(&[])
    }

    /// Builds a frame in schema v1 layout from row-shaped observations.
    pub fn from_observations(rows: &[Observation]) -> Self {
        let mut columns: [Vec<FieldValue>; COLUMN_COUNT] = Default::default();
        for row in rows {
            columns[Column::Key.index()].push(FieldValue::Text(row.key.clone()));
            columns[Column::Lat.index()].push(FieldValue::Number(row.lat));
            columns[Column::Lon.index()].push(FieldValue::Number(row.lon));
            columns[Column::Weight.index()].push(FieldValue::Number(row.weight));
            columns[Column::Label.index()].push(FieldValue::Text(row.label.clone()));
            columns[Column::Timestamp.index()].push(FieldValue::Number(row.timestamp));
        }

        let fields = Column::ALL
            .iter()
            .zip(columns)
            .map(|(column, values)| Field::new(column.name(), values))
            .collect();

        Self {
            fields,
            length: rows.len(),
        }
    }

    /// Parses a frame from its JSON wire shape.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| TrackMapError::malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(TrackMapError::malformed("frame must be a JSON object"));
        }
        serde_json::from_value(value).map_err(|e| TrackMapError::malformed(e.to_string()))
    }

    /// Declared row count.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

// ============================================================================
// DECODED FRAME (Row access)
// ============================================================================

/// One row of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    pub index: usize,
    pub key: &'a FieldValue,
    pub lat: &'a FieldValue,
    pub lon: &'a FieldValue,
    pub weight: &'a FieldValue,
    pub label: &'a FieldValue,
    pub timestamp: &'a FieldValue,
}

impl Row<'_> {
    /// Geographic position of the row.
    pub fn position(&self) -> LonLat {
        LonLat::new(self.lon.as_f64(), self.lat.as_f64())
    }
}

/// A frame whose column layout has been checked.
#[derive(Debug, Clone, Copy)]
pub struct DecodedFrame<'a> {
    columns: [&'a [FieldValue]; COLUMN_COUNT],
    len: usize,
}

impl<'a> DecodedFrame<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn cell(&self, column: Column, i: usize) -> &'a FieldValue {
        &self.columns[column.index()][i]
    }

    /// Returns row `i`, or `None` past the end.
    pub fn row(&self, i: usize) -> Option<Row<'a>> {
        if i >= self.len {
            return None;
        }

        Some(Row {
            index: i,
            key: self.cell(Column::Key, i),
            lat: self.cell(Column::Lat, i),
            lon: self.cell(Column::Lon, i),
            weight: self.cell(Column::Weight, i),
            label: self.cell(Column::Label, i),
            timestamp: self.cell(Column::Timestamp, i),
        })
    }

    /// Iterates rows in frame order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'a>> + '_ {
        (0..self.len).filter_map(move |i| self.row(i))
    }

    /// Position of the first row, if the frame has any.
    pub fn first_position(&self) -> Option<LonLat> {
        self.row(0).map(|row| row.position())
    }
}

/// Checks the column layout of `frame` and exposes its rows.
///
/// # Errors
/// `TrackMapError::MalformedFrame` when a required column is missing, a
/// column holds fewer values than the declared row count, or (in
/// `SchemaMode::Named`) a field name does not match its column. Value
/// types are not checked.
pub fn decode(frame: &RawFrame, mode: SchemaMode) -> Result<DecodedFrame<'_>> {
    if frame.fields.len() < COLUMN_COUNT {
        return Err(TrackMapError::malformed(format!(
            "expected {} fields, found {}",
            COLUMN_COUNT,
            frame.fields.len()
        )));
    }

    let mut columns: [&[FieldValue]; COLUMN_COUNT] = [&[]; COLUMN_COUNT];

    for column in Column::ALL {
        let field = &frame.fields[column.index()];

        if mode == SchemaMode::Named && !field.name.eq_ignore_ascii_case(column.name()) {
            return Err(TrackMapError::malformed(format!(
                "field {} is named {:?}, expected {:?}",
                column.index(),
                field.name,
                column.name()
            )));
        }

        if field.values.len() < frame.length {
            return Err(TrackMapError::malformed(format!(
                "column {:?} has {} values, frame declares {} rows",
                column.name(),
                field.values.len(),
                frame.length
            )));
        }

        columns[column.index()] = &field.values[..frame.length];
    }

    Ok(DecodedFrame {
        columns,
        len: frame.length,
    })
}

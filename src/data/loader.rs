use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{columns, CrimeDataset, CrimeRecord, Month};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the crime table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the merged-table column names
/// * `.json`    – `[{ "Month": "2025-01", "LSOA name": ..., ... }, ...]`
/// * `.parquet` – same column names, string or numeric columns
///
/// A missing file is reported as [`LoadError::NotFound`] so the caller can
/// stop before the server binds.
pub fn load_file(path: &Path) -> Result<CrimeDataset> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()).into());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    build_dataset(rows)
}

// ---------------------------------------------------------------------------
// Format-independent row representation
// ---------------------------------------------------------------------------

/// Cells of one input row before validation.
#[derive(Debug, Default)]
struct RawRow {
    crime_id: Option<String>,
    month: Option<String>,
    lsoa_code: Option<String>,
    lsoa_name: Option<String>,
    crime_type: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    population_density: Option<f64>,
}

impl RawRow {
    /// `Ok(None)` for rows that cannot be attributed to a location or a
    /// crime type; those are dropped.
    fn into_record(self, row: usize) -> Result<Option<CrimeRecord>, LoadError> {
        let (Some(lsoa_name), Some(crime_type)) = (self.lsoa_name, self.crime_type) else {
            return Ok(None);
        };
        let raw_month = self.month.unwrap_or_default();
        let month: Month = raw_month
            .parse()
            .map_err(|_| LoadError::InvalidMonth { row, value: raw_month })?;

        let mut record = CrimeRecord::new(month, lsoa_name, crime_type);
        record.crime_id = self.crime_id;
        record.lsoa_code = self.lsoa_code;
        record.latitude = self.latitude;
        record.longitude = self.longitude;
        record.population_density = self.population_density;
        Ok(Some(record))
    }
}

fn build_dataset(rows: Vec<RawRow>) -> Result<CrimeDataset> {
    let total = rows.len();
    let mut records = Vec::with_capacity(total);

    for (i, raw) in rows.into_iter().enumerate() {
        if let Some(record) = raw.into_record(i + 1)? {
            records.push(record);
        }
    }

    let skipped = total - records.len();
    if skipped > 0 {
        log::warn!("Skipped {skipped} of {total} rows without an LSOA name or crime type");
    }

    let dataset = CrimeDataset::from_records(records);
    log::info!(
        "Loaded {} crime records: {} months, {} crime types, {} LSOAs, {} common locations",
        dataset.len(),
        dataset.months.len(),
        dataset.crime_types.len(),
        dataset.lsoa_names.len(),
        dataset.common_locations.len()
    );
    Ok(dataset)
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Empty cells and NaN markers are missing values, anything else must parse.
fn parse_number(value: &str, row: usize, column: &'static str) -> Result<Option<f64>, LoadError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let parsed: f64 = trimmed.parse().map_err(|_| LoadError::InvalidNumber {
        row,
        column,
        value: value.to_string(),
    })?;
    Ok((!parsed.is_nan()).then_some(parsed))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the column names from [`columns`].
/// Unknown columns are ignored; `Month`, `LSOA name` and `Crime type` are
/// required.
fn load_csv(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let require = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

    let month_idx = require(columns::MONTH)?;
    let lsoa_name_idx = require(columns::LSOA_NAME)?;
    let crime_type_idx = require(columns::CRIME_TYPE)?;
    let crime_id_idx = find(columns::CRIME_ID);
    let lsoa_code_idx = find(columns::LSOA_CODE);
    let lat_idx = find(columns::LATITUDE);
    let lon_idx = find(columns::LONGITUDE);
    let density_idx = find(columns::POPULATION_DENSITY);

    let mut rows = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row_no = i + 1;
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let text = |idx: Option<usize>| idx.and_then(|i| record.get(i)).and_then(non_blank);
        let number = |idx: Option<usize>, column: &'static str| {
            parse_number(idx.and_then(|i| record.get(i)).unwrap_or(""), row_no, column)
        };

        rows.push(RawRow {
            crime_id: text(crime_id_idx),
            month: text(Some(month_idx)),
            lsoa_code: text(lsoa_code_idx),
            lsoa_name: text(Some(lsoa_name_idx)),
            crime_type: text(Some(crime_type_idx)),
            latitude: number(lat_idx, columns::LATITUDE)?,
            longitude: number(lon_idx, columns::LONGITUDE)?,
            population_density: number(density_idx, columns::POPULATION_DENSITY)?,
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Crime ID": "ab12…",
///     "Month": "2025-01",
///     "LSOA name": "Leeds 001A",
///     "Crime type": "Burglary",
///     "Latitude": 53.8,
///     "Longitude": -1.55,
///     "Population Density (people per km^2)": 4120.5
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    if let Some(first) = records.first().and_then(|r| r.as_object()) {
        for required in [columns::MONTH, columns::LSOA_NAME, columns::CRIME_TYPE] {
            if !first.contains_key(required) {
                return Err(LoadError::MissingColumn(required).into());
            }
        }
    }

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let row_no = i + 1;
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {row_no} is not a JSON object"))?;
            Ok(RawRow {
                crime_id: json_text(obj, columns::CRIME_ID),
                month: json_text(obj, columns::MONTH),
                lsoa_code: json_text(obj, columns::LSOA_CODE),
                lsoa_name: json_text(obj, columns::LSOA_NAME),
                crime_type: json_text(obj, columns::CRIME_TYPE),
                latitude: json_number(obj, columns::LATITUDE, row_no)?,
                longitude: json_number(obj, columns::LONGITUDE, row_no)?,
                population_density: json_number(obj, columns::POPULATION_DENSITY, row_no)?,
            })
        })
        .collect()
}

fn json_text(obj: &Map<String, JsonValue>, key: &str) -> Option<String> {
    match obj.get(key)? {
        JsonValue::String(s) => non_blank(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_number(
    obj: &Map<String, JsonValue>,
    key: &'static str,
    row: usize,
) -> Result<Option<f64>, LoadError> {
    match obj.get(key) {
        Some(JsonValue::Number(n)) => Ok(n.as_f64().filter(|v| !v.is_nan())),
        Some(JsonValue::String(s)) => parse_number(s, row, key),
        Some(JsonValue::Null) | None => Ok(None),
        Some(other) => Err(LoadError::InvalidNumber {
            row,
            column: key,
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the merged crime table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Text columns may be Utf8 or LargeUtf8;
/// numeric columns may be any float/int width or text.
fn load_parquet(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let find = |name: &str| schema.index_of(name).ok().map(|i| batch.column(i).clone());
        let require = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

        let month_col = require(columns::MONTH)?;
        let lsoa_name_col = require(columns::LSOA_NAME)?;
        let crime_type_col = require(columns::CRIME_TYPE)?;
        let crime_id_col = find(columns::CRIME_ID);
        let lsoa_code_col = find(columns::LSOA_CODE);
        let lat_col = find(columns::LATITUDE);
        let lon_col = find(columns::LONGITUDE);
        let density_col = find(columns::POPULATION_DENSITY);

        for row in 0..batch.num_rows() {
            let row_no = rows.len() + 1;
            let text = |col: Option<&ArrayRef>| col.and_then(|c| cell_text(c, row));
            let number = |col: Option<&ArrayRef>, column: &'static str| match col {
                Some(c) => cell_number(c, row, row_no, column),
                None => Ok(None),
            };

            rows.push(RawRow {
                crime_id: text(crime_id_col.as_ref()),
                month: text(Some(&month_col)),
                lsoa_code: text(lsoa_code_col.as_ref()),
                lsoa_name: text(Some(&lsoa_name_col)),
                crime_type: text(Some(&crime_type_col)),
                latitude: number(lat_col.as_ref(), columns::LATITUDE)?,
                longitude: number(lon_col.as_ref(), columns::LONGITUDE)?,
                population_density: number(density_col.as_ref(), columns::POPULATION_DENSITY)?,
            });
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

/// Read a cell as text, whatever its Arrow type.
fn cell_text(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .and_then(|a| non_blank(a.value(row))),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .and_then(|a| non_blank(a.value(row))),
        _ => arrow::util::display::array_value_to_string(col.as_ref(), row)
            .ok()
            .and_then(|s| non_blank(&s)),
    }
}

/// Read a cell as a number.  Null and NaN are missing values.
fn cell_number(
    col: &ArrayRef,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<Option<f64>, LoadError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        _ => return parse_number(&cell_text(col, row).unwrap_or_default(), row_no, column),
    };
    Ok(value.filter(|v| !v.is_nan()))
}

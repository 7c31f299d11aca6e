// src/services/loader.rs
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::models::Observation;

const YEAR_COLUMN: &str = "year";
const PRICE_COLUMN: &str = "price";

/// Load the yearly price table at `path`.
///
/// Rows are returned in file order; the table is expected to be sorted by
/// year already and is not re-sorted here.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    info!("Loading price table from {}", path.display());
    let file = File::open(path).map_err(|e| AnalysisError::data_load(path, e))?;
    load_observations_from_reader(file, path)
}

/// Same as [`load_observations`] over any reader. `origin` is only used to
/// label errors.
pub fn load_observations_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Vec<Observation>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    // Locate the year and price columns by name
    let headers = rdr
        .headers()
        .map_err(|e| AnalysisError::data_load(origin, e))?
        .clone();
    let idx_year = column_index(&headers, YEAR_COLUMN)
        .ok_or_else(|| AnalysisError::data_load(origin, "no 'year' column in header"))?;
    let idx_price = column_index(&headers, PRICE_COLUMN)
        .ok_or_else(|| AnalysisError::data_load(origin, "no 'price' column in header"))?;

    let mut observations = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|e| AnalysisError::data_load(origin, e))?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let year = parse_cell::<i32>(&row, idx_year, YEAR_COLUMN, line, origin)?;
        let price = parse_cell::<f64>(&row, idx_price, PRICE_COLUMN, line, origin)?;
        debug!("Row {}: year {} price {}", line, year, price);
        observations.push(Observation { year, price });
    }

    info!("Loaded {} observations", observations.len());
    Ok(observations)
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn parse_cell<T>(row: &StringRecord, idx: usize, column: &str, line: u64, origin: &Path) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let cell = row.get(idx).ok_or_else(|| {
        AnalysisError::data_load(origin, format!("line {}: missing '{}' field", line, column))
    })?;
    cell.parse::<T>().map_err(|e| {
        AnalysisError::data_load(
            origin,
            format!("line {}: bad '{}' value '{}': {}", line, column, cell, e),
        )
    })
}

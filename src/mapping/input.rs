//! Measurement table reader
//!
//! Tab-separated, one row per measured peptide, column names from
//! [`ColumnNames`]. A protein-group cell listing several accessions yields
//! one record per accession.

use super::config::{ColumnNames, MappingConfig};
use super::error::{MappingError, MappingResult};
use super::peptide::PeptideRecord;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Column positions resolved against a header row
struct ColumnIndex {
    accession: usize,
    peptide: usize,
    value: usize,
    experiment: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnNames) -> MappingResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| MappingError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            accession: find(&columns.accession)?,
            peptide: find(&columns.peptide)?,
            value: find(&columns.value)?,
            experiment: find(&columns.experiment)?,
        })
    }
}

/// Parse a quantitative cell; blanks, NA/NaN and garbage are "no value"
pub fn parse_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    match cell.to_ascii_lowercase().as_str() {
        "na" | "nan" | "n/a" | "null" => None,
        _ => cell.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// Read peptide records from a tab-separated source
pub fn read_measurements<R: Read>(
    reader: R,
    config: &MappingConfig,
) -> MappingResult<Vec<PeptideRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, &config.columns)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in rdr.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).unwrap_or("").trim();

        let peptide = cell(index.peptide);
        let experiment = cell(index.experiment);
        let value = parse_value(cell(index.value));

        let accessions: Vec<&str> = cell(index.accession)
            .split(config.accession_separator)
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();

        if accessions.is_empty() {
            skipped += 1;
            continue;
        }

        for accession in accessions {
            records.push(PeptideRecord::new(accession, peptide, value, experiment));
        }
    }

    if skipped > 0 {
        warn!(skipped, "Rows without accession skipped");
    }
    debug!(records = records.len(), "Read measurement records");

    Ok(records)
}

pub fn read_measurements_file(
    path: impl AsRef<Path>,
    config: &MappingConfig,
) -> MappingResult<Vec<PeptideRecord>> {
    let file = File::open(path)?;
    read_measurements(file, config)
}

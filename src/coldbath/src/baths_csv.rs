use std::{io, path::Path};

use chrono::NaiveDate;
use coldbath_types::ColdBathObservation;
use csv::{Reader, Writer};

use crate::LoadError;

const DATE_COLUMN: &str = "date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Loads bath days from a CSV file with a `date` column.
pub fn load_cold_baths(path: impl AsRef<Path>) -> Result<Vec<ColdBathObservation>, LoadError> {
    let path = path.as_ref();
    let baths = read_cold_baths(Reader::from_path(path)?)?;
    debug!("loaded {} cold baths from {}", baths.len(), path.display());
    Ok(baths)
}

pub fn read_cold_baths<R: io::Read>(
    mut reader: Reader<R>,
) -> Result<Vec<ColdBathObservation>, LoadError> {
    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == DATE_COLUMN)
        .ok_or(LoadError::MissingColumn(DATE_COLUMN))?;

    let mut baths = Vec::new();
    for record in reader.records() {
        let record = record?;
        let value = record.get(column).unwrap_or_default().trim();
        let line = record.position().map(|p| p.line() as usize).unwrap_or_default();

        let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
            LoadError::InvalidDate {
                line,
                value: value.to_owned(),
            }
        })?;
        baths.push(ColdBathObservation::new(date));
    }

    Ok(baths)
}

/// Writes bath days in the format [`load_cold_baths`] reads.
pub fn write_cold_baths(
    path: impl AsRef<Path>,
    baths: &[ColdBathObservation],
) -> Result<(), LoadError> {
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record([DATE_COLUMN])?;

    for bath in baths {
        wtr.write_record([bath.date.format(DATE_FORMAT).to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

//! CSV output for harvested records.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::harvest::HarvestError;
use crate::models::BookRecord;

/// One CSV row. List fields are written as JSON array text, absent values as empty cells.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    title: Option<&'a str>,
    authors: Option<String>,
    published_date: Option<&'a str>,
    categories: Option<String>,
    average_rating: Option<f64>,
    ratings_count: Option<u64>,
    description: Option<&'a str>,
    page_count: Option<u64>,
    language: Option<&'a str>,
    preview_link: Option<&'a str>,
    query: &'a str,
}

fn list_text(values: Option<&Vec<String>>) -> Result<Option<String>, HarvestError> {
    values
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(HarvestError::from)
}

impl<'a> CsvRow<'a> {
    fn from_record(record: &'a BookRecord) -> Result<Self, HarvestError> {
        Ok(Self {
            title: record.title.as_deref(),
            authors: list_text(record.authors.as_ref())?,
            published_date: record.published_date.as_deref(),
            categories: list_text(record.categories.as_ref())?,
            average_rating: record.average_rating,
            ratings_count: record.ratings_count,
            description: record.description.as_deref(),
            page_count: record.page_count,
            language: record.language.as_deref(),
            preview_link: record.preview_link.as_deref(),
            query: &record.query,
        })
    }
}

/// Write a header row and one row per record.
///
/// The header is written even when `records` is empty.
pub fn write_csv<W: Write>(writer: W, records: &[BookRecord]) -> Result<(), HarvestError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(BookRecord::COLUMNS)?;
    for record in records {
        csv_writer.serialize(CsvRow::from_record(record)?)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write records to `path`, creating parent directories. Returns the number of rows written.
pub fn write_csv_file(path: &Path, records: &[BookRecord]) -> Result<usize, HarvestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    write_csv(BufWriter::new(file), records)?;
    Ok(records.len())
}

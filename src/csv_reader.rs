// CSV loading into raw PlotData

use crate::data::PlotData;
use anyhow::{Context, Result};
use std::io::{self, Read};

/// Read CSV with a header row from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<PlotData> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_idx, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", row_idx + 1))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    tracing::debug!(columns = headers.len(), rows = rows.len(), "read csv");
    Ok(PlotData::new(headers, rows))
}

/// Read CSV from stdin
pub fn read_csv_from_stdin() -> Result<PlotData> {
    let stdin = io::stdin();
    read_csv(stdin.lock())
}

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;

/// Header-addressed view over a CSV snapshot. Columns are looked up by their
/// trimmed header text; short rows read as blank cells.
///
/// Cells that are not valid UTF-8 are decoded lossily and remembered in
/// `lossy_cells` so the caller can report them.
#[derive(Debug)]
pub(crate) struct RawTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<csv::StringRecord>,
    lossy_cells: Vec<LossyCell>,
}

/// A cell whose bytes were replaced during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LossyCell {
    /// 1-based data row, not counting the header.
    pub(crate) row: usize,
    pub(crate) column: usize,
}

impl RawTable {
    pub(crate) fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn rows(&self) -> &[csv::StringRecord] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn header(&self, column: usize) -> &str {
        self.headers.get(column).map(String::as_str).unwrap_or_default()
    }

    pub(crate) fn lossy_cells(&self) -> &[LossyCell] {
        &self.lossy_cells
    }
}

pub(crate) fn read_table<R: Read>(reader: R) -> Result<RawTable, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|header| {
            String::from_utf8_lossy(header)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();

    let mut index = HashMap::new();
    for (position, header) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        index.entry(header.clone()).or_insert(position);
    }

    let mut rows = Vec::new();
    let mut lossy_cells = Vec::new();
    for (row, record) in csv_reader.byte_records().enumerate() {
        let record = record?;
        let mut cells = Vec::with_capacity(record.len());
        for (column, raw) in record.iter().enumerate() {
            let decoded = String::from_utf8_lossy(raw);
            if let Cow::Owned(_) = decoded {
                lossy_cells.push(LossyCell {
                    row: row + 1,
                    column,
                });
            }
            cells.push(decoded.into_owned());
        }
        rows.push(csv::StringRecord::from(cells));
    }

    Ok(RawTable {
        headers,
        index,
        rows,
        lossy_cells,
    })
}

pub(crate) fn cell(row: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column.and_then(|position| row.get(position))
}

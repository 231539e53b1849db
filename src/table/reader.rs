use crate::table::format::TableFormat;
use crate::url::Origin;
use crate::InputError;
use calamine::{open_workbook_auto, Data, Reader};
use csv::StringRecord;
use std::fs::File;
use std::io;
use std::path::Path;

/// Accepted spellings of the website column
pub const WEBSITE_COLUMNS: &[&str] = &["website", "Website"];

/// Accepted spellings of the scrapability column
pub const SCRAPABILITY_COLUMNS: &[&str] = &["scrapability", "Scrapability"];

/// Accepted spellings of the emails column
pub const EMAILS_COLUMNS: &[&str] = &["emails", "Emails"];

/// An input row selected for crawling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Position of the row in the table (header excluded)
    pub row: usize,

    pub origin: Origin,
}

/// The input table, held in memory as strings
///
/// Rows shorter than the header are padded with empty cells, so every row
/// has at least one cell per column. Extra trailing cells are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl InputTable {
    /// Reads a `.csv` or `.xlsx` file, choosing the format by extension
    ///
    /// Workbooks are read from their first sheet. Any other extension is an
    /// unsupported format.
    pub fn read(path: &Path) -> Result<Self, InputError> {
        let shown = path.display().to_string();

        let format = TableFormat::from_path(path)
            .ok_or_else(|| InputError::UnsupportedFormat(shown.clone()))?;
        if !path.is_file() {
            return Err(InputError::NotFound(shown));
        }

        let (headers, rows) = match format {
            TableFormat::Csv => read_csv(path, &shown)?,
            TableFormat::Xlsx => read_xlsx(path, &shown)?,
        };

        tracing::debug!("Read {} rows from {}", rows.len(), shown);
        Ok(Self::from_rows(headers, rows))
    }

    /// Builds a table directly from headers and rows
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column named by any of `names`
    pub fn find_column(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h == name))
    }

    fn require_column(&self, names: &[&str]) -> Result<usize, InputError> {
        self.find_column(names)
            .ok_or_else(|| InputError::MissingColumn(names[0].to_string()))
    }

    pub fn has_emails_column(&self) -> bool {
        self.find_column(EMAILS_COLUMNS).is_some()
    }

    /// The website cell of every row, `None` where the cell is blank
    pub fn website_cells(&self) -> Result<Vec<Option<String>>, InputError> {
        let column = self.require_column(WEBSITE_COLUMNS)?;
        Ok(self
            .rows
            .iter()
            .map(|row| {
                let cell = row[column].trim();
                (!cell.is_empty()).then(|| cell.to_string())
            })
            .collect())
    }

    /// Rows to crawl: a website is present, it normalizes, and the
    /// scrapability cell is `true` in any letter case
    ///
    /// Both the website and scrapability columns must exist.
    pub fn crawl_targets(&self) -> Result<Vec<CrawlTarget>, InputError> {
        let website = self.require_column(WEBSITE_COLUMNS)?;
        let scrapability = self.require_column(SCRAPABILITY_COLUMNS)?;

        let mut targets = Vec::new();
        for (row_index, row) in self.rows.iter().enumerate() {
            let cell = row[website].trim();
            if cell.is_empty() || !is_true(&row[scrapability]) {
                continue;
            }
            match Origin::parse(cell, true) {
                Ok(origin) => targets.push(CrawlTarget {
                    row: row_index,
                    origin,
                }),
                Err(e) => tracing::warn!("Skipping row {} ({:?}): {}", row_index + 1, cell, e),
            }
        }

        Ok(targets)
    }

    /// Sets every cell of a column, creating it at the end if none of
    /// `names` exists
    ///
    /// `values` shorter than the table leave the remaining cells empty.
    pub fn set_column(&mut self, names: &[&str], values: Vec<String>) {
        let column = match self.find_column(names) {
            Some(column) => column,
            None => {
                self.headers.push(names[0].to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };

        let mut values = values.into_iter();
        for row in &mut self.rows {
            row[column] = values.next().unwrap_or_default();
        }
    }
}

type RawTable = (Vec<String>, Vec<Vec<String>>);

fn read_csv(path: &Path, shown: &str) -> Result<RawTable, InputError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => InputError::NotFound(shown.to_string()),
        _ => InputError::Io(e),
    })?;

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let parse_error = |source| InputError::Parse {
        path: shown.to_string(),
        source,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record: StringRecord = record.map_err(parse_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok((headers, rows))
}

/// Reads the first sheet of a workbook; its first row is the header
fn read_xlsx(path: &Path, shown: &str) -> Result<RawTable, InputError> {
    let workbook_error = |message: String| InputError::Workbook {
        path: shown.to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_error("workbook has no sheets".to_string()))?
        .map_err(|e| workbook_error(e.to_string()))?;

    let mut cells = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let headers = cells.next().unwrap_or_default();
    let rows = cells.collect();

    Ok((headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn is_true(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("true")
}

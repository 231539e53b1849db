use crate::crawler::AggregatedEmails;
use crate::robots::ScrapeStatus;
use crate::table::format::TableFormat;
use crate::table::reader::{CrawlTarget, InputTable, EMAILS_COLUMNS, SCRAPABILITY_COLUMNS};
use crate::OutputError;
use rust_xlsxwriter::{ColNum, RowNum, Workbook};
use std::path::Path;

/// Separator between addresses in the emails column
pub const EMAIL_SEPARATOR: &str = "; ";

/// Fills the emails column from per-origin aggregates
///
/// `targets[i]` is the row crawled as origin index `i`. Rows that were not
/// crawled, or whose origin has no aggregate, get an empty cell.
pub fn fill_emails(table: &mut InputTable, targets: &[CrawlTarget], aggregated: &AggregatedEmails) {
    let mut cells = vec![String::new(); table.len()];
    for (index, target) in targets.iter().enumerate() {
        if let Some(emails) = aggregated.get(&index) {
            cells[target.row] = emails.join(EMAIL_SEPARATOR);
        }
    }
    table.set_column(EMAILS_COLUMNS, cells);
}

/// Fills the scrapability column with one status per row
pub fn fill_scrapability(table: &mut InputTable, statuses: &[ScrapeStatus]) {
    let cells = statuses.iter().map(|s| s.as_cell().to_string()).collect();
    table.set_column(SCRAPABILITY_COLUMNS, cells);
}

/// Writes the table, header first, as CSV or a single-sheet workbook
/// depending on the extension of `path`
///
/// Rows longer than the header are written as they are.
pub fn write_table(table: &InputTable, path: &Path) -> Result<(), OutputError> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => write_csv(table, path)?,
        Some(TableFormat::Xlsx) => write_xlsx(table, path)?,
        None => return Err(OutputError::UnsupportedFormat(path.display().to_string())),
    }
    tracing::debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn write_csv(table: &InputTable, path: &Path) -> Result<(), OutputError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn write_xlsx(table: &InputTable, path: &Path) -> Result<(), OutputError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let lines = std::iter::once(table.headers()).chain(table.rows().iter().map(Vec::as_slice));
    for (row_index, cells) in lines.enumerate() {
        let row = RowNum::try_from(row_index)
            .map_err(|_| OutputError::TooLarge(format!("{} rows", table.len() + 1)))?;
        for (col_index, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let col = ColNum::try_from(col_index)
                .map_err(|_| OutputError::TooLarge(format!("{} columns", cells.len())))?;
            worksheet.write_string(row, col, cell.as_str())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

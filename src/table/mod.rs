//! Tabular input and output
//!
//! Reads the organization table (`.csv` or `.xlsx`), selects the rows to crawl, and writes the
//! table back out with the emails or scrapability column filled in. Column
//! names are accepted in lower or title case and keep their original casing
//! on output.

mod format;
mod reader;
mod writer;

pub use format::TableFormat;
pub use reader::{
    CrawlTarget, InputTable, EMAILS_COLUMNS, SCRAPABILITY_COLUMNS, WEBSITE_COLUMNS,
};
pub use writer::{fill_emails, fill_scrapability, write_table, EMAIL_SEPARATOR};

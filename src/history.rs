use std::path::PathBuf;

use chrono::{Datelike, Local};
use log::info;
use scraper::{ElementRef, Html};

use crate::{
    AuthenticatedSession, PageContext, StatementTableError,
    csv_export::write_history_csv,
    text_manipulators::{extract_text, parse_selector},
};

/// The statement page keeps its transactions in the 5th table of the document.
const STATEMENT_TABLE_INDEX: usize = 4;

/// Rows with this many cells carry a redundant leading column.
const WIDE_ROW_CELLS: usize = HISTORY_FIELDS + 1;
pub const HISTORY_FIELDS: usize = 8;

/// A billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> anyhow::Result<Self> {
        if !(1..=12).contains(&month) {
            anyhow::bail!("month must be within 1..=12, got {month}");
        }
        if !(0..=9999).contains(&year) {
            anyhow::bail!("year must have four digits, got {year}");
        }
        Ok(Self { year, month })
    }

    pub fn current() -> anyhow::Result<Self> {
        let today = Local::now();
        Self::new(today.year(), today.month())
    }

    /// The following month. Fails past December 9999, where the key would lose its shape.
    pub fn succ(self) -> anyhow::Result<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// `YYYYMM`, as used in the statement query string and the csv file name.
    pub fn key(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

/// One transaction line of a monthly statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow(pub [String; HISTORY_FIELDS]);

impl HistoryRow {
    /// Drops the leading column of 9-cell rows; anything that isn't 8 or 9 cells wide is skipped.
    pub fn from_cells(mut cells: Vec<String>) -> Option<Self> {
        if cells.len() == WIDE_ROW_CELLS {
            cells.remove(0);
        }
        let fields: [String; HISTORY_FIELDS] = cells.try_into().ok()?;
        Some(Self(fields))
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

/// The table the statement rows live in. Layout changes on the portal only need this updated.
pub fn statement_table(document: &Html) -> anyhow::Result<ElementRef<'_>> {
    let table_selector = parse_selector("table")?;
    let tables: Vec<_> = document.select(&table_selector).collect();
    match tables.get(STATEMENT_TABLE_INDEX) {
        Some(table) => Ok(*table),
        None => Err(StatementTableError::Missing {
            index: STATEMENT_TABLE_INDEX,
            found: tables.len(),
        }
        .into()),
    }
}

pub fn parse_history(document: &Html) -> anyhow::Result<Vec<HistoryRow>> {
    let tbody_selector = parse_selector("tbody")?;
    let row_selector = parse_selector("tr")?;
    let cell_selector = parse_selector("td")?;

    let table = statement_table(document)?;
    let tbody = table
        .select(&tbody_selector)
        .next()
        .ok_or(StatementTableError::NoBody)?;

    let rows = tbody
        .select(&row_selector)
        .filter_map(|tr| {
            let cells = tr.select(&cell_selector).map(extract_text).collect();
            HistoryRow::from_cells(cells)
        })
        .collect();
    Ok(rows)
}

pub struct HistoryFetcher {
    csv_dir: PathBuf,
}

impl HistoryFetcher {
    pub fn new(csv_dir: PathBuf) -> Self {
        Self { csv_dir }
    }

    pub async fn fetch_month(
        &self,
        session: &AuthenticatedSession,
        year_month: YearMonth,
    ) -> anyhow::Result<Vec<HistoryRow>> {
        let url = session.endpoints.get_statement_url_for(year_month);
        let page = PageContext::parse(session.client.get_page(&url).await?)?;
        let rows = parse_history(&page.document)?;
        info!("{} histories found!", rows.len());
        Ok(rows)
    }

    /// Fetches a month and writes it to `<csv_dir>/<YYYYMM>.csv`.
    pub async fn save_month(
        &self,
        session: &AuthenticatedSession,
        year_month: YearMonth,
    ) -> anyhow::Result<PathBuf> {
        info!("Saving {}/{}...", year_month.year(), year_month.month());
        let rows = self.fetch_month(session, year_month).await?;
        let path = self.csv_dir.join(format!("{}.csv", year_month.key()));
        write_history_csv(&path, &rows)?;
        Ok(path)
    }
}

//! Gamelog table extractor.
//!
//! The upstream gamelog page is scraped rather than queried through an API, and
//! it does not fail when the requested season is unavailable. A team without a
//! playoff record gets its regular-season log back, and an unavailable season
//! yields the latest one. The table title is therefore checked against the
//! requested season before any row is trusted; a mismatch yields no records.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::HttpClientPort;
use crate::config::GamelogConfig;
use crate::constants::{DATA_TABLE_SELECTOR, GAMELOG_ENTITY};
use crate::error::{EtlError, Result};
use crate::protocol::{make_header, StreamWriter};
use crate::transliterate::latinize;
use crate::types::{GameType, Record};

static CONTROL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n\t\x0B\x0C]").unwrap());

/// Cell texts of one `<tr>`, in column order
pub type RawRow = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamelogQuery {
    pub team_name: String,
    pub from_year: i32,
    pub to_year: i32,
    pub game_type: GameType,
}

impl GamelogQuery {
    /// Fails with `UnsupportedGameType` unless `game_type` is `regular` or `playoffs`.
    pub fn new(team_name: &str, from_year: i32, to_year: i32, game_type: &str) -> Result<Self> {
        Ok(Self {
            team_name: team_name.to_string(),
            from_year,
            to_year,
            game_type: game_type.parse()?,
        })
    }

    /// The `season` query value, e.g. `20172018`
    pub fn years_param(&self) -> String {
        format!("{}{}", self.from_year, self.to_year)
    }

    /// What a matching table title starts with, e.g. `2017-2018 regular`
    pub fn expected_title_prefix(&self) -> String {
        format!("{}-{} {}", self.from_year, self.to_year, self.game_type)
    }

    pub fn url(&self, endpoint_template: &str) -> String {
        endpoint_template
            .replace("{team_name}", &self.team_name)
            .replace("{years}", &self.years_param())
            .replace("{game_type}", &self.game_type.source_code().to_string())
    }
}

/// Fetches the raw gamelog page for `query`.
pub fn fetch_page<H>(
    http: &H,
    query: &GamelogQuery,
    endpoint_template: &str,
    timeout: Duration,
) -> Result<String>
where
    H: HttpClientPort + ?Sized,
{
    let url = query.url(endpoint_template);
    debug!(%url, "state=FETCHING");
    super::fetch_text(http, &url, timeout)
}

/// The data table as scraped: the title row's text and every row after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameTable {
    pub title: String,
    pub rows: Vec<RawRow>,
}

impl GameTable {
    /// Total `<tr>` count including the title row
    pub fn row_count(&self) -> usize {
        if self.title.is_empty() && self.rows.is_empty() {
            0
        } else {
            self.rows.len() + 1
        }
    }
}

/// Locates the unique `table.data` and collects its rows.
pub fn extract_rows(html_text: &str) -> Result<GameTable> {
    let document = Html::parse_document(html_text);
    let table_selector = Selector::parse(DATA_TABLE_SELECTOR).unwrap();
    let row_selector = Selector::parse("tr").unwrap();

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| EtlError::TableNotFound {
            selector: DATA_TABLE_SELECTOR.to_string(),
        })?;

    let mut rows = table.select(&row_selector);
    let Some(title_row) = rows.next() else {
        return Ok(GameTable::default());
    };

    Ok(GameTable {
        title: title_text(&title_row),
        rows: rows.map(|row| row_cells(&row)).collect(),
    })
}

/// The title lives in a `<div>` inside the first row; fall back to the row text.
fn title_text(row: &ElementRef) -> String {
    let div_selector = Selector::parse("div").unwrap();
    match row.select(&div_selector).next() {
        Some(div) => div.text().collect(),
        None => row.text().collect(),
    }
}

fn row_cells(row: &ElementRef) -> RawRow {
    let cell_selector = Selector::parse("td, th").unwrap();
    row.select(&cell_selector)
        .map(|cell| cell.text().collect::<String>())
        .collect()
}

/// Lowercases and collapses whitespace runs so layout noise does not affect matching.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when the table title starts with the requested season and game type.
///
/// Only the leading substring as wide as the expected prefix is compared, since
/// the rest of the title ("season", team name, ...) varies.
pub fn validate_season(title: &str, query: &GamelogQuery) -> bool {
    let expected = query.expected_title_prefix();
    let leading: String = normalize_title(title)
        .chars()
        .take(expected.chars().count())
        .collect();
    leading == expected
}

/// Column labels from the header row, transliterated to Latin when needed.
pub fn column_names(header_row: &[String]) -> Vec<String> {
    header_row
        .iter()
        .map(|label| latinize(label.trim()).into_owned())
        .collect()
}

/// Removes embedded control whitespace and trims the cell.
pub fn clean_cell(raw: &str) -> String {
    CONTROL_WS.replace_all(raw, "").trim().to_string()
}

/// Lazily decodes data rows into records keyed by `columns`.
pub fn decode_rows<I>(data_rows: I, columns: Vec<String>) -> GameRecords
where
    I: IntoIterator<Item = RawRow>,
    I::IntoIter: 'static,
{
    GameRecords {
        columns,
        rows: Box::new(data_rows.into_iter()),
    }
}

/// Single-pass sequence of gamelog records in table order.
///
/// Cells are zipped positionally with the columns; a short row produces a
/// record missing its trailing fields and surplus cells are dropped.
pub struct GameRecords {
    columns: Vec<String>,
    rows: Box<dyn Iterator<Item = RawRow>>,
}

impl GameRecords {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Box::new(std::iter::empty()),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl fmt::Debug for GameRecords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRecords")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl Iterator for GameRecords {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let row = self.rows.next()?;
        Some(
            self.columns
                .iter()
                .zip(row.iter())
                .map(|(column, cell)| (column.clone(), Value::String(clean_cell(cell))))
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Outcome of one extraction call.
#[derive(Debug)]
pub enum Extraction {
    Records(GameRecords),
    /// The page carried a different season or game type than requested
    SeasonMismatch { expected: String, found: String },
}

impl Extraction {
    /// Records to emit; a season mismatch yields none.
    pub fn into_records(self) -> GameRecords {
        match self {
            Extraction::Records(records) => records,
            Extraction::SeasonMismatch { .. } => GameRecords::empty(),
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Extraction::SeasonMismatch { .. })
    }
}

/// Turns a fetched page into records for `query`, checking the season first.
pub fn game_facts(html_text: &str, query: &GamelogQuery) -> Result<Extraction> {
    let table = extract_rows(html_text)?;
    debug!(rows = table.row_count(), "state=PARSED");

    if !validate_season(&table.title, query) {
        let expected = query.expected_title_prefix();
        let found = normalize_title(&table.title);
        warn!(%expected, %found, "gamelog title does not match the requested season; emitting no records");
        return Ok(Extraction::SeasonMismatch { expected, found });
    }
    debug!("state=YIELDING");

    let mut rows = table.rows.into_iter();
    let columns = rows.next().map(|header| column_names(&header)).unwrap_or_default();
    Ok(Extraction::Records(decode_rows(rows, columns)))
}

/// Fetches and decodes gamelog pages through an `HttpClientPort`.
pub struct GamelogExtractor<H> {
    http: H,
    endpoint_template: String,
    timeout: Duration,
}

impl<H: HttpClientPort> GamelogExtractor<H> {
    pub fn new(http: H, config: &GamelogConfig) -> Self {
        Self {
            http,
            endpoint_template: config.endpoint_template.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// Validates the raw parameters, then extracts. An unsupported game type
    /// fails here without touching the network.
    pub fn extract_for(
        &self,
        team_name: &str,
        from_year: i32,
        to_year: i32,
        game_type: &str,
    ) -> Result<Extraction> {
        let query = GamelogQuery::new(team_name, from_year, to_year, game_type)?;
        self.extract(&query)
    }

    #[instrument(skip(self), fields(team = %query.team_name, game_type = %query.game_type))]
    pub fn extract(&self, query: &GamelogQuery) -> Result<Extraction> {
        let html = fetch_page(&self.http, query, &self.endpoint_template, self.timeout)?;
        game_facts(&html, query)
    }
}

/// Writes the `gamelog` stream: header with the table's columns, then each record.
///
/// A season mismatch writes a header with no fields and no records.
pub fn write_stream<W: Write>(extraction: Extraction, output: W) -> Result<usize> {
    let records = extraction.into_records();
    let mut writer = StreamWriter::new(output);
    writer.write_header(&make_header(GAMELOG_ENTITY, records.columns().to_vec()))?;
    for record in records {
        writer.write_record(&record)?;
    }
    let written = writer.records_written();
    writer.flush()?;
    info!(records = written, "state=DONE");
    Ok(written)
}

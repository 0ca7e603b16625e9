//! Parsing CSV text into validated create commands
//!
//! The first row names the columns; every later row is one record. Parsing
//! reads the whole table and fails on the first bad row, so callers only
//! ever see a fully validated batch.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;

use crate::domain::validation_constants::fields;
use crate::domain::{CreateApplicationRequest, CreateServerRequest, NewApplication, NewServer};
use crate::{Error, Result};

const REQUIRED_APPLICATION_COLUMNS: &[&str] = &[fields::NAME, fields::OWNER];
const REQUIRED_SERVER_COLUMNS: &[&str] = &[fields::HOSTNAME, fields::IP_ADDRESS, fields::APP_ID];

/// Column positions keyed by header name
#[derive(Debug)]
struct ColumnMap {
    positions: HashMap<String, usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord, required: &[&str]) -> Result<Self> {
        let mut positions = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            positions.entry(header.to_string()).or_insert(index);
        }

        let missing = required
            .iter()
            .find(|column| !positions.contains_key(**column));
        if let Some(missing) = missing {
            return Err(Error::format(format!(
                "CSV header is missing required column '{missing}'"
            )));
        }

        Ok(Self { positions })
    }

    /// Trimmed value of a column, `None` when the column or value is absent
    fn field(&self, record: &StringRecord, column: &str) -> Option<String> {
        self.positions
            .get(column)
            .and_then(|&index| record.get(index))
            .filter(|value| !value.is_empty())
            .map(String::from)
    }

    fn integer(&self, record: &StringRecord, column: &'static str) -> Result<Option<i64>> {
        self.field(record, column)
            .map(|value| {
                value.parse::<i64>().map_err(|_| {
                    Error::format(format!("{column} value '{value}' is not an integer"))
                })
            })
            .transpose()
    }
}

/// Parsed table: a column map plus every data record
struct Table {
    columns: ColumnMap,
    records: Vec<StringRecord>,
}

impl Table {
    fn parse(text: &str, required: &[&str]) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| Error::format(format!("Unreadable CSV header: {e}")))?
            .clone();
        let columns = ColumnMap::from_headers(&headers, required)?;

        let records = reader
            .records()
            .enumerate()
            .map(|(index, record)| {
                record.map_err(|e| Error::format(format!("Malformed CSV: {e}")).at_row(index + 1))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, records })
    }

    /// Convert each record, attributing any failure to its 1-based row
    ///
    /// Rows count data records only; the header and blank lines are not
    /// numbered.
    fn rows<T>(&self, convert: impl Fn(&ColumnMap, &StringRecord) -> Result<T>) -> Result<Vec<T>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| convert(&self.columns, record).map_err(|e| e.at_row(index + 1)))
            .collect()
    }
}

/// Parse an application import table
pub fn parse_applications(text: &str) -> Result<Vec<NewApplication>> {
    Table::parse(text, REQUIRED_APPLICATION_COLUMNS)?.rows(|columns, record| {
        NewApplication::try_from(CreateApplicationRequest {
            name: columns.field(record, fields::NAME),
            owner: columns.field(record, fields::OWNER),
            web_ui: columns.field(record, fields::WEB_UI),
            db_port: columns.integer(record, fields::DB_PORT)?,
        })
    })
}

/// Parse a server import table
///
/// `app_id` must be present and numeric; whether it names an existing
/// application is checked when the batch is stored.
pub fn parse_servers(text: &str) -> Result<Vec<NewServer>> {
    Table::parse(text, REQUIRED_SERVER_COLUMNS)?.rows(|columns, record| {
        let app_id = columns
            .integer(record, fields::APP_ID)?
            .ok_or_else(|| Error::format("app_id is missing"))?;

        NewServer::try_from(CreateServerRequest {
            hostname: columns.field(record, fields::HOSTNAME),
            ip_address: columns.field(record, fields::IP_ADDRESS),
            app_id: Some(app_id),
        })
    })
}

//! Header-only CSV templates for bulk import

use crate::domain::validation_constants::fields;
use crate::Result;

pub const APPLICATION_COLUMNS: [&str; 4] =
    [fields::NAME, fields::OWNER, fields::WEB_UI, fields::DB_PORT];
pub const SERVER_COLUMNS: [&str; 3] = [fields::HOSTNAME, fields::IP_ADDRESS, fields::APP_ID];

/// A downloadable CSV payload and the file name to offer it under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTemplate {
    pub file_name: &'static str,
    pub contents: Vec<u8>,
}

pub fn application_template() -> Result<CsvTemplate> {
    header_only("applications_template.csv", &APPLICATION_COLUMNS)
}

pub fn server_template() -> Result<CsvTemplate> {
    header_only("servers_template.csv", &SERVER_COLUMNS)
}

fn header_only(file_name: &'static str, columns: &[&str]) -> Result<CsvTemplate> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns).map_err(std::io::Error::from)?;
    let contents = writer.into_inner().map_err(|e| e.into_error())?;

    Ok(CsvTemplate { file_name, contents })
}

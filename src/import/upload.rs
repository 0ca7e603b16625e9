//! Uploaded CSV files
//!
//! An upload is accepted only when its file name ends in `.csv` and its
//! bytes decode as UTF-8.

use bytes::Bytes;

use crate::{Error, Result};

const CSV_EXTENSION: &str = ".csv";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// A file received for bulk import
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub file_name: String,
    pub contents: Bytes,
}

impl CsvUpload {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    /// Fails with a format error when no file was supplied at all
    pub fn require(upload: Option<Self>) -> Result<Self> {
        upload.ok_or_else(|| Error::format("No file provided"))
    }

    /// The upload's text, after the file type and encoding checks
    pub fn text(&self) -> Result<&str> {
        if !self.file_name.to_ascii_lowercase().ends_with(CSV_EXTENSION) {
            return Err(Error::format("File must be a CSV"));
        }

        let text = std::str::from_utf8(&self.contents)
            .map_err(|e| Error::format(format!("File is not valid UTF-8: {e}")))?;
        Ok(text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text))
    }
}

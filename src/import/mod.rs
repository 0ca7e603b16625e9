//! CSV import and export
//!
//! Templates give clients the exact header row an import expects; imports
//! parse and validate an uploaded file completely, then hand the batch to
//! the store to commit in one transaction.

pub mod pipeline;
pub mod records;
pub mod template;
pub mod upload;

pub use pipeline::{ImportPipeline, ImportReport};
pub use template::{application_template, server_template, CsvTemplate};
pub use upload::CsvUpload;

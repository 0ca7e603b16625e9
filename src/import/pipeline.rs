//! Bulk import: upload checks, parsing, then one atomic batch insert

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::records::{parse_applications, parse_servers};
use super::upload::CsvUpload;
use crate::error::EntityKind;
use crate::infrastructure::InventoryStore;
use crate::Result;

/// Outcome of a committed import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub message: String,
    pub imported: usize,
}

impl ImportReport {
    fn new(entity: EntityKind, imported: usize) -> Self {
        Self {
            message: format!("Imported {imported} {entity}(s) successfully"),
            imported,
        }
    }
}

/// Runs CSV imports against a store
///
/// The whole file is read and validated before anything is written; the
/// write itself is a single transaction, so a failure anywhere leaves the
/// store exactly as it was.
#[derive(Clone)]
pub struct ImportPipeline {
    store: Arc<dyn InventoryStore>,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, upload))]
    pub async fn import_applications(&self, upload: Option<CsvUpload>) -> Result<ImportReport> {
        let outcome = async {
            let upload = CsvUpload::require(upload)?;
            let batch = parse_applications(upload.text()?)?;
            self.store.create_applications(&batch).await
        }
        .await;

        report(EntityKind::Application, outcome.map(|ids| ids.len()))
    }

    #[instrument(skip(self, upload))]
    pub async fn import_servers(&self, upload: Option<CsvUpload>) -> Result<ImportReport> {
        let outcome = async {
            let upload = CsvUpload::require(upload)?;
            let batch = parse_servers(upload.text()?)?;
            self.store.create_servers(&batch).await
        }
        .await;

        report(EntityKind::Server, outcome.map(|ids| ids.len()))
    }
}

fn report(entity: EntityKind, outcome: Result<usize>) -> Result<ImportReport> {
    match outcome {
        Ok(imported) => {
            info!(%entity, imported, "Import committed");
            Ok(ImportReport::new(entity, imported))
        }
        Err(failure) => {
            error!(%entity, error = %failure, "Import failed");
            Err(failure)
        }
    }
}

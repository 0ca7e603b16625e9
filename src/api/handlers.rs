//! Request handlers
//!
//! Handlers only translate between HTTP and the typed operations: they
//! decode bodies, call the store or the import pipeline, and encode the
//! result. Any error is rendered through [`crate::Error`]'s response impl.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::paths::UPLOAD_FIELD;
use super::AppState;
use crate::domain::{
    Application, ApplicationId, ApplicationUpdate, CreateApplicationRequest, CreateServerRequest,
    NewApplication, NewServer, Server, ServerId, UpdateApplicationRequest,
};
use crate::import::{self, CsvTemplate, CsvUpload, ImportReport};
use crate::{Error, Result};

/// Confirmation returned by create operations
#[derive(Debug, Serialize)]
pub struct Created<Id> {
    pub id: Id,
    pub message: &'static str,
}

/// Confirmation returned by update operations
#[derive(Debug, Serialize)]
pub struct Confirmation {
    pub message: &'static str,
}

/// Undecodable JSON bodies are reported as format errors
fn json_body<T: DeserializeOwned>(
    payload: std::result::Result<Json<T>, JsonRejection>,
) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::format(rejection.body_text()))
}

/// Unparseable path segments are reported as format errors
fn path_param<T>(param: std::result::Result<Path<T>, PathRejection>) -> Result<T> {
    param
        .map(|Path(value)| value)
        .map_err(|rejection| Error::format(rejection.body_text()))
}

pub async fn list_applications(State(state): State<AppState>) -> Result<Json<Vec<Application>>> {
    Ok(Json(state.store.list_applications().await?))
}

pub async fn create_application(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> Result<Json<Created<ApplicationId>>> {
    let new_app = NewApplication::try_from(json_body(payload)?)?;
    let id = state.store.create_application(&new_app).await?;
    Ok(Json(Created {
        id,
        message: "Application created successfully",
    }))
}

pub async fn update_application(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<UpdateApplicationRequest>, JsonRejection>,
) -> Result<Json<Confirmation>> {
    let id = path_param(id)?;
    let update = ApplicationUpdate::try_from(json_body(payload)?)?;
    state
        .store
        .update_application(ApplicationId::new(id), &update)
        .await?;
    Ok(Json(Confirmation {
        message: "Application updated successfully",
    }))
}

pub async fn list_servers(State(state): State<AppState>) -> Result<Json<Vec<Server>>> {
    Ok(Json(state.store.list_servers().await?))
}

pub async fn create_server(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateServerRequest>, JsonRejection>,
) -> Result<Json<Created<ServerId>>> {
    let new_server = NewServer::try_from(json_body(payload)?)?;
    let id = state.store.create_server(&new_server).await?;
    Ok(Json(Created {
        id,
        message: "Server created successfully",
    }))
}

pub async fn application_template() -> Result<Response> {
    Ok(csv_attachment(import::application_template()?))
}

pub async fn server_template() -> Result<Response> {
    Ok(csv_attachment(import::server_template()?))
}

pub async fn import_applications(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportReport>> {
    let upload = read_upload(multipart).await?;
    Ok(Json(state.imports.import_applications(upload).await?))
}

pub async fn import_servers(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportReport>> {
    let upload = read_upload(multipart).await?;
    Ok(Json(state.imports.import_servers(upload).await?))
}

pub async fn health(State(state): State<AppState>) -> Result<&'static str> {
    state.database.health_check().await?;
    Ok("OK")
}

fn csv_attachment(template: CsvTemplate) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", template.file_name),
            ),
        ],
        template.contents,
    )
        .into_response()
}

/// The `file` part of a multipart body, if there is one
async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Option<CsvUpload>> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "Request carried no multipart body");
            return Ok(None);
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(unreadable)? {
        if field.name() == Some(UPLOAD_FIELD) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let contents = field.bytes().await.map_err(unreadable)?;
            return Ok(Some(CsvUpload::new(file_name, contents)));
        }
    }

    Ok(None)
}

fn unreadable(error: MultipartError) -> Error {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(error.body_text())
    } else {
        Error::format(format!("Unreadable upload: {}", error.body_text()))
    }
}

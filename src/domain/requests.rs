//! Typed request payloads and their validation
//!
//! Each operation has a raw request (everything optional, as it arrives off
//! the wire or out of a CSV row) and a validated command. Conversion is a
//! pure function: it never touches the store.

use serde::Deserialize;
use std::fmt::Display;

use super::identifiers::ApplicationId;
use super::types::{ApplicationName, ApplicationStatus, DbPort, Hostname, IpAddress, Owner, WebUi};
use super::validation_constants::fields;
use crate::error::{Error, Result};

/// Body of a create-application request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateApplicationRequest {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub web_ui: Option<String>,
    pub db_port: Option<i64>,
}

/// Validated input for creating an application
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub name: ApplicationName,
    pub owner: Owner,
    pub web_ui: Option<WebUi>,
    pub db_port: Option<DbPort>,
}

impl TryFrom<CreateApplicationRequest> for NewApplication {
    type Error = Error;

    fn try_from(request: CreateApplicationRequest) -> Result<Self> {
        Ok(Self {
            name: required(request.name, fields::NAME, ApplicationName::try_new)?,
            owner: required(request.owner, fields::OWNER, Owner::try_new)?,
            web_ui: optional(request.web_ui, fields::WEB_UI, WebUi::try_new)?,
            db_port: request.db_port.map(db_port).transpose()?,
        })
    }
}

/// Body of an update-application request; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: Option<String>,
    pub shutdown_verified: Option<bool>,
}

/// Validated partial update of an application
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationUpdate {
    pub status: Option<ApplicationStatus>,
    pub shutdown_verified: Option<bool>,
}

impl ApplicationUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.shutdown_verified.is_none()
    }
}

impl TryFrom<UpdateApplicationRequest> for ApplicationUpdate {
    type Error = Error;

    fn try_from(request: UpdateApplicationRequest) -> Result<Self> {
        let status = request
            .status
            .map(|status| {
                ApplicationStatus::try_new(status)
                    .map_err(|e| Error::validation(fields::STATUS, e.to_string()))
            })
            .transpose()?;

        Ok(Self {
            status,
            shutdown_verified: request.shutdown_verified,
        })
    }
}

/// Body of a create-server request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateServerRequest {
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub app_id: Option<i64>,
}

/// Validated input for creating a server
#[derive(Debug, Clone, PartialEq)]
pub struct NewServer {
    pub hostname: Hostname,
    pub ip_address: IpAddress,
    pub app_id: ApplicationId,
}

impl TryFrom<CreateServerRequest> for NewServer {
    type Error = Error;

    fn try_from(request: CreateServerRequest) -> Result<Self> {
        Ok(Self {
            hostname: required(request.hostname, fields::HOSTNAME, Hostname::try_new)?,
            ip_address: required(request.ip_address, fields::IP_ADDRESS, IpAddress::try_new)?,
            app_id: request
                .app_id
                .map(ApplicationId::new)
                .ok_or_else(|| Error::missing(fields::APP_ID))?,
        })
    }
}

fn required<T, E: Display>(
    value: Option<String>,
    field: &'static str,
    parse: impl FnOnce(String) -> std::result::Result<T, E>,
) -> Result<T> {
    let value = value.ok_or_else(|| Error::missing(field))?;
    parse(value).map_err(|e| Error::validation(field, e.to_string()))
}

/// Blank optional values are treated as absent
fn optional<T, E: Display>(
    value: Option<String>,
    field: &'static str,
    parse: impl FnOnce(String) -> std::result::Result<T, E>,
) -> Result<Option<T>> {
    match value {
        Some(value) if !value.trim().is_empty() => parse(value)
            .map(Some)
            .map_err(|e| Error::validation(field, e.to_string())),
        _ => Ok(None),
    }
}

fn db_port(port: i64) -> Result<DbPort> {
    u16::try_from(port)
        .map(DbPort::new)
        .map_err(|_| Error::validation(fields::DB_PORT, format!("{port} is not a valid port")))
}

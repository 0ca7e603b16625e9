//! Applications and the servers that host them

use serde::{Deserialize, Serialize};

use super::identifiers::{ApplicationId, ServerId};
use super::types::{ApplicationName, ApplicationStatus, DbPort, Hostname, IpAddress, Owner, WebUi};

/// A deployed software system tracked through decommission
///
/// Serializes with its servers embedded; servers refer back only by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub name: ApplicationName,
    pub owner: Owner,
    pub web_ui: Option<WebUi>,
    pub db_port: Option<DbPort>,
    pub status: ApplicationStatus,
    pub shutdown_verified: bool,
    pub servers: Vec<Server>,
}

/// A host belonging to exactly one application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    pub hostname: Hostname,
    pub ip_address: IpAddress,
    pub ping_status: bool,
    pub app_id: ApplicationId,
}

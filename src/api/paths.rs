//! Route paths and header names for the HTTP interface

/// Header name for request ID used for tracing and correlation
pub const X_REQUEST_ID: &str = "x-request-id";

/// Multipart field carrying an uploaded CSV file
pub const UPLOAD_FIELD: &str = "file";

pub const APPLICATIONS: &str = "/api/applications";
pub const APPLICATION: &str = "/api/applications/{id}";
pub const APPLICATION_TEMPLATE: &str = "/api/applications/template";
pub const APPLICATION_IMPORT: &str = "/api/applications/import";

pub const SERVERS: &str = "/api/servers";
pub const SERVER_TEMPLATE: &str = "/api/servers/template";
pub const SERVER_IMPORT: &str = "/api/servers/import";

/// Health check endpoint path
pub const HEALTH: &str = "/health";

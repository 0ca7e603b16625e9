//! Validation constants for inventory fields
//!
//! Length limits mirror the column widths of the persisted tables so that
//! anything accepted here can be stored without truncation.

/// Application name constants
pub mod application_name {
    /// Maximum application name length
    pub const MAX_LENGTH: usize = 100;
}

/// Owner constants
pub mod owner {
    /// Maximum owner length
    pub const MAX_LENGTH: usize = 100;
}

/// Web UI reference constants
pub mod web_ui {
    /// Maximum web UI reference length
    pub const MAX_LENGTH: usize = 200;
}

/// Lifecycle status constants
pub mod status {
    /// Maximum status length
    pub const MAX_LENGTH: usize = 50;

    /// Status assigned to every newly created application
    pub const DEFAULT: &str = "active";
}

/// Hostname constants
pub mod hostname {
    /// Maximum hostname length
    pub const MAX_LENGTH: usize = 100;
}

/// IP address constants
pub mod ip_address {
    /// Maximum IP address length (dotted quad)
    pub const MAX_LENGTH: usize = 15;

    /// Example addresses that fit the limit
    pub const TEST_VALID: &[&str] = &["10.0.0.1", "192.168.1.1", "255.255.255.255"];

    /// Example values that exceed the limit
    pub const TEST_TOO_LONG: &[&str] = &["255.255.255.2550", "2001:db8::8a2e:370:7334"];
}

/// Field names as they appear in requests and CSV headers
pub mod fields {
    pub const NAME: &str = "name";
    pub const OWNER: &str = "owner";
    pub const WEB_UI: &str = "web_ui";
    pub const DB_PORT: &str = "db_port";
    pub const STATUS: &str = "status";
    pub const HOSTNAME: &str = "hostname";
    pub const IP_ADDRESS: &str = "ip_address";
    pub const APP_ID: &str = "app_id";
}

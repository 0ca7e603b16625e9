//! Validated field types for applications and servers
//!
//! Every text field is trimmed on construction and rejected when empty or
//! longer than the column it is stored in.

use nutype::nutype;
#[allow(unused_imports)] // These are used by nutype derive macros
use serde::{Deserialize, Serialize};

use super::validation_constants::{application_name, hostname, ip_address, owner, status, web_ui};

/// Display name of a tracked application
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = application_name::MAX_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct ApplicationName(String);

/// Party responsible for an application
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = owner::MAX_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct Owner(String);

/// URL or free-text pointer to an application's web interface
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = web_ui::MAX_LENGTH),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct WebUi(String);

/// Lifecycle status of an application, e.g. "active" or "retired"
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = status::MAX_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct ApplicationStatus(String);

impl ApplicationStatus {
    /// Status every application starts with
    pub fn initial() -> Self {
        Self::try_new(status::DEFAULT.to_string())
            .expect("default status constant should be a valid status")
    }
}

/// Database port an application listens on
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    From,
    AsRef
))]
pub struct DbPort(u16);

/// Host name of a server
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = hostname::MAX_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct Hostname(String);

/// Server address in dotted-quad form
///
/// Only the length is checked; the stored column holds at most 15 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = ip_address::MAX_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct IpAddress(String);

//! Store-assigned identifiers
//!
//! Ids come from the store's autoincrement sequence, so they are never
//! reused even after the row they named is deleted.

use nutype::nutype;

/// Unique identifier of an application
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    AsRef
))]
pub struct ApplicationId(i64);

/// Unique identifier of a server
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    AsRef
))]
pub struct ServerId(i64);

//! Domain types for the shutdown manager
//!
//! Applications, their servers, the validated field types they are built
//! from, and the typed requests that create and update them.

pub mod identifiers;
pub mod inventory;
pub mod requests;
pub mod types;
pub mod validation_constants;

pub use identifiers::*;
pub use inventory::*;
pub use requests::*;
pub use types::*;

//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod accounts;
pub mod audit;
pub mod auth;
pub mod capling;
pub mod goals;
pub mod profile;
pub mod transactions;

// Re-export all handlers for use in router
pub use accounts::*;
pub use audit::*;
pub use auth::*;
pub use capling::*;
pub use goals::*;
pub use profile::*;
pub use transactions::*;

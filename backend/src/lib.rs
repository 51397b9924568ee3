//! Sweet-shop inventory backend.
//!
//! Users register and log in, authenticated users create and browse sweets,
//! administrators restock and delete. The inventory engine is the core:
//! stock decrements are storage-level conditional updates that can never
//! drive a quantity negative, even under concurrent purchases.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;

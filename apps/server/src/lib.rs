//! loket — a protocol-translation gateway between a legacy XML/SOAP
//! case-management dialect and a canonical linked-object repository.
//!
//! Inbound messages identify entities by human-assigned natural keys; the
//! repository holds a fully linked graph of typed, uniquely-identified
//! objects. The reconciliation engine in [`services`] decides per entity
//! whether to reuse an existing object or create a new one, links it into
//! its parent's relationships, and turns ambiguous natural-key matches
//! into protocol-level errors instead of silent data corruption.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod services;
pub mod state;

pub use error::{Error, Result};
